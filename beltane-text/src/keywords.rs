//! Keyword tables for the command grammar.
//!
//! One table per grammar level, each entry carrying the keyword, its
//! minimum unambiguous length and the control code it resolves to.
//! Keeping the vocabulary declarative keeps encode and decode from
//! drifting apart: decode names controls by looking the code back up in
//! the same table.

use beltane_types::control::*;

#[derive(Debug, Clone, Copy)]
pub struct Keyword {
    pub word: &'static str,
    pub min: usize,
    pub code: u8,
}

const fn kw(word: &'static str, min: usize, code: u8) -> Keyword {
    Keyword { word, min, code }
}

/// Look a control code back up for decoding. Returns the full keyword.
pub fn name_of(table: &[Keyword], code: u8) -> Option<&'static str> {
    table.iter().find(|k| k.code == code).map(|k| k.word)
}

pub const MAIN_CONTROLS: &[Keyword] = &[
    kw("volume", 1, MainControl::Volume as u8),
    kw("detune", 3, MainControl::Detune as u8),
    kw("keyshift", 3, MainControl::KeyShift as u8),
    kw("parts", 3, MainControl::AvailableParts as u8),
    kw("stop", 3, MainControl::Stop as u8),
];

pub const PART_CONTROLS: &[Keyword] = &[
    kw("volume", 1, PartControl::Volume as u8),
    kw("panning", 3, PartControl::Panning as u8),
    kw("velocity", 2, PartControl::VelocitySense as u8),
    kw("offset", 2, PartControl::VelocityOffset as u8),
    kw("channel", 2, PartControl::MidiChannel as u8),
    kw("keymode", 4, PartControl::KeyMode as u8),
    kw("portamento", 2, PartControl::Portamento as u8),
    kw("enable", 2, PartControl::Enable as u8),
    kw("minnote", 4, PartControl::MinNote as u8),
    kw("maxnote", 4, PartControl::MaxNote as u8),
];

/// Engine-common controls; add/sub/pad share these codes.
pub const ENGINE_COMMON_CONTROLS: &[Keyword] = &[
    kw("volume", 1, 0),
    kw("velocity", 2, 1),
    kw("panning", 3, 2),
    kw("detune", 3, 32),
    kw("octave", 2, 35),
    kw("stereo", 3, 112),
];

pub const ADD_CONTROLS: &[Keyword] = &[kw("depop", 3, AddControl::DePop as u8)];

pub const SUB_CONTROLS: &[Keyword] = &[
    kw("bandwidth", 2, SubControl::Bandwidth as u8),
    kw("bandscale", 5, SubControl::BandwidthScale as u8),
    kw("stages", 3, SubControl::FilterStages as u8),
    kw("magtype", 3, SubControl::MagType as u8),
];

pub const PAD_CONTROLS: &[Keyword] = &[
    kw("bandwidth", 2, PadControl::Bandwidth as u8),
    kw("apply", 2, PadControl::ApplyChanges as u8),
];

pub const LFO_CONTROLS: &[Keyword] = &[
    kw("rate", 2, LfoControl::Speed as u8),
    kw("depth", 2, LfoControl::Depth as u8),
    kw("delay", 3, LfoControl::Delay as u8),
    kw("start", 3, LfoControl::Start as u8),
    kw("shape", 2, LfoControl::Shape as u8),
    kw("continuous", 3, LfoControl::Continuous as u8),
    kw("stretch", 3, LfoControl::Stretch as u8),
];

pub const FILTER_CONTROLS: &[Keyword] = &[
    kw("center", 2, FilterControl::CenterFrequency as u8),
    kw("q", 1, FilterControl::Q as u8),
    kw("tracking", 2, FilterControl::FrequencyTracking as u8),
    kw("velocity", 2, FilterControl::VelocitySensitivity as u8),
    kw("gain", 2, FilterControl::Gain as u8),
    kw("stages", 2, FilterControl::Stages as u8),
    kw("type", 2, FilterControl::BaseType as u8),
];

/// Envelope leaves are two-word phrases; encode resolves the pair, the
/// table stores the combined name for decode.
pub const ENVELOPE_CONTROLS: &[Keyword] = &[
    kw("attack level", 2, EnvelopeControl::AttackLevel as u8),
    kw("attack time", 2, EnvelopeControl::AttackTime as u8),
    kw("decay level", 2, EnvelopeControl::DecayLevel as u8),
    kw("decay time", 2, EnvelopeControl::DecayTime as u8),
    kw("sustain level", 2, EnvelopeControl::SustainLevel as u8),
    kw("release time", 2, EnvelopeControl::ReleaseTime as u8),
    kw("release level", 2, EnvelopeControl::ReleaseLevel as u8),
    kw("stretch", 3, EnvelopeControl::Stretch as u8),
    kw("forced", 3, EnvelopeControl::ForcedRelease as u8),
    kw("linear", 3, EnvelopeControl::LinearEnvelope as u8),
];

pub const OSCILLATOR_CONTROLS: &[Keyword] = &[
    kw("phase", 2, OscillatorControl::PhaseRandomness as u8),
    kw("magtype", 3, OscillatorControl::MagType as u8),
    kw("parameter", 3, OscillatorControl::BaseFunctionParameter as u8),
    kw("wave", 2, OscillatorControl::BaseFunctionType as u8),
    kw("clear", 3, OscillatorControl::ClearHarmonics as u8),
];

pub const RESONANCE_CONTROLS: &[Keyword] = &[
    kw("maxdb", 3, ResonanceControl::MaxDb as u8),
    kw("center", 2, ResonanceControl::CenterFrequency as u8),
    kw("octaves", 2, ResonanceControl::Octaves as u8),
    kw("enable", 2, ResonanceControl::Enable as u8),
    kw("clear", 3, ResonanceControl::ClearGraph as u8),
];

/// Effect algorithm names; codes here are [`EffectKind`] wire bytes.
pub const EFFECT_KINDS: &[Keyword] = &[
    kw("reverb", 3, 0x81),
    kw("echo", 3, 0x82),
    kw("chorus", 3, 0x83),
    kw("phaser", 3, 0x84),
    kw("alienwah", 3, 0x85),
    kw("distortion", 3, 0x86),
    kw("eq", 2, 0x87),
    kw("dynfilter", 3, 0x88),
];

pub const EFFECT_COMMON_CONTROLS: &[Keyword] = &[
    kw("level", 2, EffectControl::Level as u8),
    kw("panning", 3, EffectControl::Panning as u8),
];

pub const REVERB_CONTROLS: &[Keyword] = &[
    kw("time", 2, 2),
    kw("predelay", 3, 3),
    kw("damping", 3, 4),
    kw("roomsize", 3, 5),
];

pub const ECHO_CONTROLS: &[Keyword] = &[
    kw("delay", 3, 2),
    kw("feedback", 3, 3),
    kw("crossover", 3, 4),
];

pub const CHORUS_CONTROLS: &[Keyword] = &[
    kw("frequency", 3, 2),
    kw("depth", 3, 3),
    kw("delay", 3, 4),
    kw("feedback", 3, 5),
];

pub const PHASER_CONTROLS: &[Keyword] = &[
    kw("frequency", 3, 2),
    kw("depth", 3, 3),
    kw("stages", 3, 4),
];

pub const ALIENWAH_CONTROLS: &[Keyword] = &[
    kw("frequency", 3, 2),
    kw("depth", 3, 3),
    kw("delay", 3, 4),
];

pub const DISTORTION_CONTROLS: &[Keyword] = &[kw("drive", 3, 2), kw("shape", 3, 3)];

pub const EQ_CONTROLS: &[Keyword] = &[kw("gain", 2, 2)];

pub const DYNFILTER_CONTROLS: &[Keyword] = &[
    kw("frequency", 3, 2),
    kw("depth", 3, 3),
    kw("sense", 3, 4),
];

/// Parameters of one effect algorithm beyond the common level/pan.
pub fn effect_controls(kind: EffectKind) -> &'static [Keyword] {
    match kind {
        EffectKind::Reverb => REVERB_CONTROLS,
        EffectKind::Echo => ECHO_CONTROLS,
        EffectKind::Chorus => CHORUS_CONTROLS,
        EffectKind::Phaser => PHASER_CONTROLS,
        EffectKind::AlienWah => ALIENWAH_CONTROLS,
        EffectKind::Distortion => DISTORTION_CONTROLS,
        EffectKind::Eq => EQ_CONTROLS,
        EffectKind::DynFilter => DYNFILTER_CONTROLS,
        EffectKind::None => &[],
    }
}

pub const SCALE_CONTROLS: &[Keyword] = &[
    kw("frequency", 2, ScaleControl::AFrequency as u8),
    kw("note", 2, ScaleControl::ANote as u8),
    kw("invert", 3, ScaleControl::InvertKeys as u8),
    kw("center", 3, ScaleControl::InvertedKeyCenter as u8),
    kw("shift", 2, ScaleControl::ScaleShift as u8),
    kw("microtonal", 2, ScaleControl::EnableMicrotonal as u8),
    kw("keyboard", 3, ScaleControl::EnableKeyboardMap as u8),
    kw("middle", 3, ScaleControl::MiddleNote as u8),
    kw("tuning", 2, ScaleControl::Tuning as u8),
    kw("keymap", 4, ScaleControl::Keymap as u8),
    kw("name", 2, ScaleControl::Name as u8),
    kw("clear", 3, ScaleControl::ClearAll as u8),
];

pub const BANK_CONTROLS: &[Keyword] = &[
    kw("instrument", 2, BankControl::SelectInstrument as u8),
    kw("rename", 3, BankControl::RenameInstrument as u8),
    kw("save", 2, BankControl::SaveInstrument as u8),
    kw("delete", 3, BankControl::DeleteInstrument as u8),
    kw("select", 3, BankControl::SelectBank as u8),
    kw("root", 2, BankControl::SelectRoot as u8),
];

pub const CONFIG_CONTROLS: &[Keyword] = &[
    kw("oscillator", 2, ConfigControl::OscillatorSize as u8),
    kw("buffer", 2, ConfigControl::BufferSize as u8),
    kw("reports", 3, ConfigControl::ReportsDestination as u8),
    kw("hide", 3, ConfigControl::HideNonFatalErrors as u8),
    kw("gui", 3, ConfigControl::EnableGui as u8),
    kw("cli", 3, ConfigControl::EnableCli as u8),
    kw("save", 2, ConfigControl::SaveCurrentConfig as u8),
];

pub const LEARN_CONTROLS: &[Keyword] = &[
    kw("mute", 2, LearnControl::Mute as u8),
    kw("minimum", 3, LearnControl::Minimum as u8),
    kw("maximum", 3, LearnControl::Maximum as u8),
    kw("delete", 3, LearnControl::DeleteLine as u8),
    kw("clear", 3, LearnControl::ClearAll as u8),
    kw("load", 2, LearnControl::LoadList as u8),
    kw("save", 2, LearnControl::SaveList as u8),
];
