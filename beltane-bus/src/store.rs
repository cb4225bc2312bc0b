//! The dispatch primitive into the live parameter store.
//!
//! The store that actually owns synthesis parameters is an external
//! collaborator; the bus only needs one entry point from it:
//! [`ParamStore::resolve`], which serves limit queries, reads and writes
//! through the same descriptor shape. [`MemoryStore`] is the reference
//! implementation backing the console binary and the cross-component
//! tests; it knows bounds and defaults for the control vocabulary but no
//! DSP.

use std::collections::HashMap;

use beltane_types::control::{EffectKind, ScaleControl};
use beltane_types::{Address, Descriptor, Engine, Insert, Kind, LimitSelector, Section};

/// Resolve a descriptor against live parameter state.
///
/// The implementation must mutate `descriptor.kind` in place to report
/// what it knows: `INTEGER` and `LEARNABLE` for a recognised control,
/// `ERROR` for an address that names nothing. For a limits query the
/// return value is the bound picked by the kind's selector; for a write
/// the value is applied and echoed back; otherwise the current value is
/// returned.
pub trait ParamStore: Send {
    fn resolve(&mut self, descriptor: &mut Descriptor) -> f32;
}

/// Bounds and flags for one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub integer: bool,
    pub learnable: bool,
}

impl ParamSpec {
    /// The common 7-bit MIDI-style range.
    fn midi(default: f32) -> ParamSpec {
        ParamSpec {
            min: 0.0,
            max: 127.0,
            default,
            integer: true,
            learnable: true,
        }
    }

    fn toggle(default: f32) -> ParamSpec {
        ParamSpec {
            min: 0.0,
            max: 1.0,
            default,
            integer: true,
            learnable: true,
        }
    }

    fn unlearnable(mut self) -> ParamSpec {
        self.learnable = false;
        self
    }
}

/// The address context a control code is interpreted in. Two addresses
/// with the same context share one spec per control code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Context {
    Main,
    Part,
    Add,
    Sub,
    Pad,
    Lfo,
    Filter,
    Envelope,
    Oscillator,
    Resonance,
    Effect(EffectKind),
    EffectSlot,
    Bank,
    Scales,
    Config,
    Learn,
}

fn context_of(address: &Address, control: u8) -> Option<Context> {
    use beltane_types::control::EffectControl;
    match address.section {
        Section::Main => Some(Context::Main),
        Section::Bank => Some(Context::Bank),
        Section::Scales => Some(Context::Scales),
        Section::Config => Some(Context::Config),
        Section::MidiLearn => Some(Context::Learn),
        Section::SystemEffects | Section::InsertEffects => {
            if control == EffectControl::SelectKind.code()
                || control == EffectControl::Destination.code()
            {
                Some(Context::EffectSlot)
            } else {
                address.kit.and_then(EffectKind::from_wire).map(Context::Effect)
            }
        }
        Section::Part(_) => match address.insert {
            Some(Insert::Lfo) => Some(Context::Lfo),
            Some(Insert::Filter) => Some(Context::Filter),
            Some(Insert::Envelope) => Some(Context::Envelope),
            Some(Insert::Oscillator) => Some(Context::Oscillator),
            Some(Insert::Resonance) => Some(Context::Resonance),
            Some(Insert::SystemEffectSend) | Some(Insert::KitGroup) => Some(Context::Part),
            None => match address.engine {
                None => Some(Context::Part),
                Some(Engine::AddSynth) | Some(Engine::AddVoice(_)) => Some(Context::Add),
                Some(Engine::SubSynth) => Some(Context::Sub),
                Some(Engine::PadSynth) => Some(Context::Pad),
                Some(Engine::Effect(_)) => {
                    if control == EffectControl::SelectKind.code()
                        || control == EffectControl::Destination.code()
                    {
                        Some(Context::EffectSlot)
                    } else {
                        address.kit.and_then(EffectKind::from_wire).map(Context::Effect)
                    }
                }
            },
        },
    }
}

/// In-memory parameter store with a bounds table for the whole control
/// vocabulary.
pub struct MemoryStore {
    specs: HashMap<(Context, u8), ParamSpec>,
    values: HashMap<(Address, u8), f32>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        let mut store = MemoryStore {
            specs: HashMap::new(),
            values: HashMap::new(),
        };
        store.install_specs();
        store
    }

    fn spec(&mut self, context: Context, control: u8, spec: ParamSpec) {
        self.specs.insert((context, control), spec);
    }

    fn install_specs(&mut self) {
        use beltane_types::control::*;

        self.spec(Context::Main, MainControl::Volume.code(), ParamSpec::midi(90.0));
        self.spec(
            Context::Main,
            MainControl::PartNumber.code(),
            ParamSpec {
                min: 0.0,
                max: 63.0,
                default: 0.0,
                integer: true,
                learnable: false,
            },
        );
        self.spec(
            Context::Main,
            MainControl::AvailableParts.code(),
            ParamSpec {
                min: 16.0,
                max: 64.0,
                default: 16.0,
                integer: true,
                learnable: false,
            },
        );
        self.spec(
            Context::Main,
            MainControl::Detune.code(),
            ParamSpec {
                min: -8192.0,
                max: 8191.0,
                default: 0.0,
                integer: true,
                learnable: true,
            },
        );
        self.spec(
            Context::Main,
            MainControl::KeyShift.code(),
            ParamSpec {
                min: -36.0,
                max: 36.0,
                default: 0.0,
                integer: true,
                learnable: false,
            },
        );
        self.spec(
            Context::Main,
            MainControl::LoadPatchSet.code(),
            ParamSpec::toggle(0.0).unlearnable(),
        );
        self.spec(
            Context::Main,
            MainControl::SavePatchSet.code(),
            ParamSpec::toggle(0.0).unlearnable(),
        );
        self.spec(
            Context::Main,
            MainControl::Stop.code(),
            ParamSpec::toggle(0.0).unlearnable(),
        );

        for (control, spec) in [
            (PartControl::Volume, ParamSpec::midi(96.0)),
            (PartControl::VelocitySense, ParamSpec::midi(64.0)),
            (PartControl::Panning, ParamSpec::midi(64.0)),
            (PartControl::VelocityOffset, ParamSpec::midi(64.0)),
            (
                PartControl::MidiChannel,
                ParamSpec {
                    min: 0.0,
                    max: 15.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                PartControl::KeyMode,
                ParamSpec {
                    min: 0.0,
                    max: 2.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (PartControl::Portamento, ParamSpec::toggle(0.0)),
            (PartControl::Enable, ParamSpec::toggle(0.0)),
            (PartControl::MinNote, ParamSpec::midi(0.0).unlearnable()),
            (PartControl::MaxNote, ParamSpec::midi(127.0).unlearnable()),
            (
                PartControl::EffectNumber,
                ParamSpec {
                    min: 0.0,
                    max: 2.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                PartControl::EffectType,
                ParamSpec {
                    min: 0.0,
                    max: 8.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                PartControl::EffectDestination,
                ParamSpec {
                    min: 0.0,
                    max: 2.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (PartControl::EffectBypass, ParamSpec::toggle(0.0)),
        ] {
            self.spec(Context::Part, control.code(), spec);
        }

        for context in [Context::Add, Context::Sub, Context::Pad] {
            self.spec(context, 0, ParamSpec::midi(90.0)); // volume
            self.spec(context, 1, ParamSpec::midi(64.0)); // velocity sense
            self.spec(context, 2, ParamSpec::midi(64.0)); // panning
            self.spec(
                context,
                32, // detune
                ParamSpec {
                    min: -8192.0,
                    max: 8191.0,
                    default: 0.0,
                    integer: true,
                    learnable: true,
                },
            );
            self.spec(
                context,
                35, // octave
                ParamSpec {
                    min: -8.0,
                    max: 7.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            );
            self.spec(context, 112, ParamSpec::toggle(1.0)); // stereo
        }
        self.spec(Context::Add, AddControl::DePop.code(), ParamSpec::toggle(0.0));
        self.spec(Context::Sub, SubControl::Bandwidth.code(), ParamSpec::midi(40.0));
        self.spec(Context::Sub, SubControl::BandwidthScale.code(), ParamSpec::midi(0.0));
        self.spec(
            Context::Sub,
            SubControl::FilterStages.code(),
            ParamSpec {
                min: 1.0,
                max: 5.0,
                default: 1.0,
                integer: true,
                learnable: false,
            },
        );
        self.spec(
            Context::Sub,
            SubControl::MagType.code(),
            ParamSpec {
                min: 0.0,
                max: 4.0,
                default: 0.0,
                integer: true,
                learnable: false,
            },
        );
        self.spec(Context::Pad, PadControl::Bandwidth.code(), ParamSpec::midi(40.0));
        self.spec(
            Context::Pad,
            PadControl::ApplyChanges.code(),
            ParamSpec::toggle(0.0).unlearnable(),
        );

        for (control, spec) in [
            (LfoControl::Speed, ParamSpec::midi(64.0)),
            (LfoControl::Depth, ParamSpec::midi(0.0)),
            (LfoControl::Delay, ParamSpec::midi(0.0)),
            (LfoControl::Start, ParamSpec::midi(64.0)),
            (LfoControl::AmplitudeRandomness, ParamSpec::midi(0.0)),
            (
                LfoControl::Shape,
                ParamSpec {
                    min: 0.0,
                    max: 8.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (LfoControl::Continuous, ParamSpec::toggle(0.0)),
            (LfoControl::FrequencyRandomness, ParamSpec::midi(0.0)),
            (LfoControl::Stretch, ParamSpec::midi(64.0)),
        ] {
            self.spec(Context::Lfo, control.code(), spec);
        }

        for (control, spec) in [
            (FilterControl::CenterFrequency, ParamSpec::midi(64.0)),
            (FilterControl::Q, ParamSpec::midi(40.0)),
            (FilterControl::FrequencyTracking, ParamSpec::midi(64.0)),
            (FilterControl::VelocitySensitivity, ParamSpec::midi(64.0)),
            (FilterControl::Gain, ParamSpec::midi(64.0)),
            (
                FilterControl::Stages,
                ParamSpec {
                    min: 1.0,
                    max: 5.0,
                    default: 1.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                FilterControl::BaseType,
                ParamSpec {
                    min: 0.0,
                    max: 2.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                FilterControl::AnalogType,
                ParamSpec {
                    min: 0.0,
                    max: 8.0,
                    default: 2.0,
                    integer: true,
                    learnable: false,
                },
            ),
        ] {
            self.spec(Context::Filter, control.code(), spec);
        }

        for (control, spec) in [
            (EnvelopeControl::AttackLevel, ParamSpec::midi(64.0)),
            (EnvelopeControl::AttackTime, ParamSpec::midi(0.0)),
            (EnvelopeControl::DecayLevel, ParamSpec::midi(64.0)),
            (EnvelopeControl::DecayTime, ParamSpec::midi(40.0)),
            (EnvelopeControl::SustainLevel, ParamSpec::midi(127.0)),
            (EnvelopeControl::ReleaseTime, ParamSpec::midi(10.0)),
            (EnvelopeControl::ReleaseLevel, ParamSpec::midi(64.0)),
            (EnvelopeControl::Stretch, ParamSpec::midi(64.0)),
            (EnvelopeControl::ForcedRelease, ParamSpec::toggle(1.0)),
            (EnvelopeControl::LinearEnvelope, ParamSpec::toggle(0.0)),
        ] {
            self.spec(Context::Envelope, control.code(), spec);
        }

        for (control, spec) in [
            (OscillatorControl::PhaseRandomness, ParamSpec::midi(64.0)),
            (
                OscillatorControl::MagType,
                ParamSpec {
                    min: 0.0,
                    max: 4.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (OscillatorControl::BaseFunctionParameter, ParamSpec::midi(64.0)),
            (
                OscillatorControl::BaseFunctionType,
                ParamSpec {
                    min: 0.0,
                    max: 17.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                OscillatorControl::ClearHarmonics,
                ParamSpec::toggle(0.0).unlearnable(),
            ),
        ] {
            self.spec(Context::Oscillator, control.code(), spec);
        }

        for (control, spec) in [
            (
                ResonanceControl::MaxDb,
                ParamSpec {
                    min: 1.0,
                    max: 90.0,
                    default: 20.0,
                    integer: true,
                    learnable: true,
                },
            ),
            (ResonanceControl::CenterFrequency, ParamSpec::midi(64.0)),
            (
                ResonanceControl::Octaves,
                ParamSpec {
                    min: 0.0,
                    max: 127.0,
                    default: 64.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (ResonanceControl::Enable, ParamSpec::toggle(0.0)),
            (
                ResonanceControl::ClearGraph,
                ParamSpec::toggle(0.0).unlearnable(),
            ),
        ] {
            self.spec(Context::Resonance, control.code(), spec);
        }

        // Every effect algorithm gets level/pan plus its own numbered
        // parameters; 7-bit ranges cover all of them.
        for kind in [
            EffectKind::Reverb,
            EffectKind::Echo,
            EffectKind::Chorus,
            EffectKind::Phaser,
            EffectKind::AlienWah,
            EffectKind::Distortion,
            EffectKind::Eq,
            EffectKind::DynFilter,
        ] {
            let context = Context::Effect(kind);
            self.spec(context, 0, ParamSpec::midi(64.0)); // level
            self.spec(context, 1, ParamSpec::midi(64.0)); // panning
            for code in 2..10 {
                self.spec(context, code, ParamSpec::midi(64.0));
            }
        }
        self.spec(
            Context::EffectSlot,
            beltane_types::control::EffectControl::SelectKind.code(),
            ParamSpec {
                min: 0.0,
                max: 8.0,
                default: 0.0,
                integer: true,
                learnable: false,
            },
        );
        self.spec(
            Context::EffectSlot,
            beltane_types::control::EffectControl::Destination.code(),
            ParamSpec {
                min: 0.0,
                max: 64.0,
                default: 0.0,
                integer: true,
                learnable: false,
            },
        );

        for control in [
            BankControl::SelectInstrument,
            BankControl::RenameInstrument,
            BankControl::SaveInstrument,
            BankControl::DeleteInstrument,
            BankControl::SelectBank,
            BankControl::RenameBank,
            BankControl::SelectRoot,
        ] {
            self.spec(
                Context::Bank,
                control.code(),
                ParamSpec {
                    min: 0.0,
                    max: 159.0,
                    default: 0.0,
                    integer: true,
                    learnable: false,
                },
            );
        }

        self.spec(
            Context::Scales,
            ScaleControl::AFrequency.code(),
            ParamSpec {
                min: 30.0,
                max: 1100.0,
                default: 440.0,
                integer: false,
                learnable: false,
            },
        );
        self.spec(Context::Scales, ScaleControl::ANote.code(), ParamSpec::midi(69.0).unlearnable());
        self.spec(Context::Scales, ScaleControl::InvertKeys.code(), ParamSpec::toggle(0.0).unlearnable());
        self.spec(
            Context::Scales,
            ScaleControl::InvertedKeyCenter.code(),
            ParamSpec::midi(60.0).unlearnable(),
        );
        self.spec(
            Context::Scales,
            ScaleControl::ScaleShift.code(),
            ParamSpec {
                min: -63.0,
                max: 64.0,
                default: 0.0,
                integer: true,
                learnable: false,
            },
        );
        self.spec(
            Context::Scales,
            ScaleControl::EnableMicrotonal.code(),
            ParamSpec::toggle(0.0).unlearnable(),
        );
        self.spec(
            Context::Scales,
            ScaleControl::EnableKeyboardMap.code(),
            ParamSpec::toggle(0.0).unlearnable(),
        );
        self.spec(Context::Scales, ScaleControl::MiddleNote.code(), ParamSpec::midi(60.0).unlearnable());
        for control in [ScaleControl::Tuning, ScaleControl::Keymap, ScaleControl::Name] {
            self.spec(Context::Scales, control.code(), ParamSpec::toggle(0.0).unlearnable());
        }
        self.spec(
            Context::Scales,
            ScaleControl::ClearAll.code(),
            ParamSpec::toggle(0.0).unlearnable(),
        );

        for (control, spec) in [
            (
                ConfigControl::OscillatorSize,
                ParamSpec {
                    min: 256.0,
                    max: 16384.0,
                    default: 1024.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                ConfigControl::BufferSize,
                ParamSpec {
                    min: 16.0,
                    max: 4096.0,
                    default: 256.0,
                    integer: true,
                    learnable: false,
                },
            ),
            (
                ConfigControl::ReportsDestination,
                ParamSpec::toggle(0.0).unlearnable(),
            ),
            (
                ConfigControl::HideNonFatalErrors,
                ParamSpec::toggle(0.0).unlearnable(),
            ),
            (ConfigControl::EnableGui, ParamSpec::toggle(1.0).unlearnable()),
            (ConfigControl::EnableCli, ParamSpec::toggle(1.0).unlearnable()),
            (
                ConfigControl::SaveCurrentConfig,
                ParamSpec::toggle(0.0).unlearnable(),
            ),
        ] {
            self.spec(Context::Config, control.code(), spec);
        }

        for control in [
            LearnControl::Mute,
            LearnControl::Minimum,
            LearnControl::Maximum,
            LearnControl::DeleteLine,
            LearnControl::ClearAll,
            LearnControl::LoadList,
            LearnControl::SaveList,
        ] {
            self.spec(
                Context::Learn,
                control.code(),
                ParamSpec::midi(0.0).unlearnable(),
            );
        }
    }

    fn lookup(&self, descriptor: &Descriptor) -> Option<ParamSpec> {
        let context = context_of(&descriptor.address, descriptor.control)?;
        self.specs.get(&(context, descriptor.control)).copied()
    }

    /// Current value of a control without going through a descriptor.
    pub fn value_of(&self, address: &Address, control: u8) -> Option<f32> {
        self.values
            .get(&(*address, control))
            .copied()
            .or_else(|| {
                let probe = Descriptor::read(
                    *address,
                    control,
                    beltane_types::Source::default(),
                );
                self.lookup(&probe).map(|spec| spec.default)
            })
    }
}

impl Default for MemoryStore {
    fn default() -> MemoryStore {
        MemoryStore::new()
    }
}

impl ParamStore for MemoryStore {
    fn resolve(&mut self, descriptor: &mut Descriptor) -> f32 {
        let spec = match self.lookup(descriptor) {
            Some(spec) => spec,
            None => {
                descriptor.kind = descriptor.kind.with(Kind::ERROR);
                return descriptor.value;
            }
        };
        let mut reported = descriptor.kind;
        if spec.integer {
            reported = reported.with(Kind::INTEGER);
        }
        if spec.learnable {
            reported = reported.with(Kind::LEARNABLE);
        }
        descriptor.kind = reported;

        if descriptor.kind.is_limit_query() {
            return match descriptor.kind.selector() {
                LimitSelector::Minimum => spec.min,
                LimitSelector::Maximum => spec.max,
                LimitSelector::Default => spec.default,
                LimitSelector::Adjusted => descriptor.value.clamp(spec.min, spec.max),
            };
        }

        let key = (descriptor.address, descriptor.control);
        if descriptor.kind.is_write() {
            self.values.insert(key, descriptor.value);
            descriptor.value
        } else {
            self.values.get(&key).copied().unwrap_or(spec.default)
        }
    }
}
