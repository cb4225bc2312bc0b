//! Control code vocabulary.
//!
//! A control code is a small integer that is only meaningful relative to
//! the address it travels with; the same number is freely reused across
//! unrelated contexts. Each enum below covers one context. The sets are
//! representative rather than exhaustive: they cover every sentence the
//! text codec understands, not every control a finished instrument would
//! expose.

/// Reserved top-level control codes that bypass normal address routing.
pub mod reserved {
    /// Payload is a plain text message in the side-channel pool.
    pub const TEXT_MESSAGE: u8 = 0xFE;
    /// Payload is a raw data block for a registered receiver.
    pub const DATA_EXCHANGE: u8 = 0xFD;
    /// The text codec could not resolve any control; the descriptor is
    /// inert and its source carries no action.
    pub const UNRECOGNISED: u8 = 0xFF;
}

/// Generates a control enum with wire-code conversion methods.
macro_rules! define_controls {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident = $code:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant = $code, )*
        }
        impl $name {
            pub fn code(self) -> u8 {
                self as u8
            }
            pub fn from_code(code: u8) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )*
                    _ => None,
                }
            }
        }
    }
}

define_controls! {
    /// Controls of the main/mixer section.
    pub enum MainControl {
        Volume = 0,
        PartNumber = 14,
        AvailableParts = 15,
        Detune = 32,
        KeyShift = 35,
        LoadPatchSet = 80,
        SavePatchSet = 81,
        Stop = 128,
    }
}

define_controls! {
    /// Part-level controls, shared by every part regardless of engine.
    pub enum PartControl {
        Volume = 0,
        VelocitySense = 1,
        Panning = 2,
        VelocityOffset = 4,
        MidiChannel = 5,
        KeyMode = 6,
        Portamento = 7,
        Enable = 8,
        MinNote = 16,
        MaxNote = 17,
        EffectNumber = 64,
        EffectType = 65,
        EffectDestination = 66,
        EffectBypass = 67,
    }
}

define_controls! {
    /// Additive engine controls. `Engine::AddVoice` reuses these codes for
    /// its per-voice versions of the same parameters.
    pub enum AddControl {
        Volume = 0,
        VelocitySense = 1,
        Panning = 2,
        DetuneFrequency = 32,
        Octave = 35,
        Stereo = 112,
        DePop = 120,
    }
}

define_controls! {
    /// Subtractive engine controls.
    pub enum SubControl {
        Volume = 0,
        VelocitySense = 1,
        Panning = 2,
        Bandwidth = 16,
        BandwidthScale = 17,
        DetuneFrequency = 32,
        Octave = 35,
        FilterStages = 80,
        MagType = 81,
        Stereo = 112,
    }
}

define_controls! {
    /// Pad-style engine controls.
    pub enum PadControl {
        Volume = 0,
        VelocitySense = 1,
        Panning = 2,
        Bandwidth = 16,
        DetuneFrequency = 32,
        Octave = 35,
        ApplyChanges = 104,
        Stereo = 112,
    }
}

define_controls! {
    /// LFO insert controls; the address parameter byte selects the
    /// amplitude/frequency/filter group.
    pub enum LfoControl {
        Speed = 0,
        Depth = 1,
        Delay = 2,
        Start = 3,
        AmplitudeRandomness = 4,
        Shape = 5,
        Continuous = 6,
        FrequencyRandomness = 7,
        Stretch = 8,
    }
}

define_controls! {
    /// Filter insert controls.
    pub enum FilterControl {
        CenterFrequency = 0,
        Q = 1,
        FrequencyTracking = 2,
        VelocitySensitivity = 3,
        Gain = 5,
        Stages = 6,
        BaseType = 7,
        AnalogType = 8,
    }
}

define_controls! {
    /// Envelope insert controls; the address parameter byte selects the
    /// amplitude/frequency/filter/bandwidth group.
    pub enum EnvelopeControl {
        AttackLevel = 0,
        AttackTime = 1,
        DecayLevel = 2,
        DecayTime = 3,
        SustainLevel = 4,
        ReleaseTime = 5,
        ReleaseLevel = 6,
        Stretch = 7,
        ForcedRelease = 16,
        LinearEnvelope = 17,
    }
}

define_controls! {
    /// Oscillator insert controls.
    pub enum OscillatorControl {
        PhaseRandomness = 0,
        MagType = 1,
        BaseFunctionParameter = 16,
        BaseFunctionType = 17,
        ClearHarmonics = 96,
    }
}

define_controls! {
    /// Resonance insert controls.
    pub enum ResonanceControl {
        MaxDb = 0,
        CenterFrequency = 1,
        Octaves = 2,
        Enable = 8,
        ClearGraph = 96,
    }
}

/// Effect algorithm identifiers; carried in the address kit byte for
/// effect addresses so the control codes 2 and up can be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    None,
    Reverb,
    Echo,
    Chorus,
    Phaser,
    AlienWah,
    Distortion,
    Eq,
    DynFilter,
}

impl EffectKind {
    pub fn to_wire(self) -> u8 {
        0x80 + match self {
            EffectKind::None => 0,
            EffectKind::Reverb => 1,
            EffectKind::Echo => 2,
            EffectKind::Chorus => 3,
            EffectKind::Phaser => 4,
            EffectKind::AlienWah => 5,
            EffectKind::Distortion => 6,
            EffectKind::Eq => 7,
            EffectKind::DynFilter => 8,
        }
    }

    pub fn from_wire(byte: u8) -> Option<EffectKind> {
        match byte {
            0x80 => Some(EffectKind::None),
            0x81 => Some(EffectKind::Reverb),
            0x82 => Some(EffectKind::Echo),
            0x83 => Some(EffectKind::Chorus),
            0x84 => Some(EffectKind::Phaser),
            0x85 => Some(EffectKind::AlienWah),
            0x86 => Some(EffectKind::Distortion),
            0x87 => Some(EffectKind::Eq),
            0x88 => Some(EffectKind::DynFilter),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::None => "No Effect",
            EffectKind::Reverb => "Reverb",
            EffectKind::Echo => "Echo",
            EffectKind::Chorus => "Chorus",
            EffectKind::Phaser => "Phaser",
            EffectKind::AlienWah => "AlienWah",
            EffectKind::Distortion => "Distortion",
            EffectKind::Eq => "EQ",
            EffectKind::DynFilter => "DynFilter",
        }
    }
}

define_controls! {
    /// Controls common to every effect algorithm. Codes 2 and up are
    /// algorithm-specific and named by the text codec's per-kind tables;
    /// 16/17 operate on the slot itself rather than the running effect.
    pub enum EffectControl {
        Level = 0,
        Panning = 1,
        SelectKind = 16,
        Destination = 17,
    }
}

define_controls! {
    /// Bank section controls.
    pub enum BankControl {
        SelectInstrument = 0,
        RenameInstrument = 1,
        SaveInstrument = 2,
        DeleteInstrument = 3,
        SelectBank = 16,
        RenameBank = 17,
        SelectRoot = 32,
    }
}

define_controls! {
    /// Scale / tuning section controls.
    pub enum ScaleControl {
        AFrequency = 0,
        ANote = 1,
        InvertKeys = 2,
        InvertedKeyCenter = 3,
        ScaleShift = 4,
        EnableMicrotonal = 8,
        EnableKeyboardMap = 16,
        MiddleNote = 17,
        Tuning = 32,
        Keymap = 33,
        Name = 64,
        ClearAll = 96,
    }
}

define_controls! {
    /// Configuration section controls.
    pub enum ConfigControl {
        OscillatorSize = 0,
        BufferSize = 1,
        ReportsDestination = 5,
        HideNonFatalErrors = 17,
        EnableGui = 22,
        EnableCli = 23,
        SaveCurrentConfig = 80,
    }
}

define_controls! {
    /// MIDI-learn section controls; most act on the learned line whose
    /// index rides in the address offset byte.
    pub enum LearnControl {
        Mute = 2,
        Minimum = 5,
        Maximum = 6,
        DeleteLine = 8,
        ClearAll = 96,
        LoadList = 241,
        SaveList = 245,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for c in [
            PartControl::Volume,
            PartControl::Panning,
            PartControl::EffectBypass,
        ] {
            assert_eq!(PartControl::from_code(c.code()), Some(c));
        }
        assert_eq!(PartControl::from_code(200), None);
    }

    #[test]
    fn codes_are_context_relative() {
        // The same number means different things in different contexts.
        assert_eq!(LfoControl::from_code(5), Some(LfoControl::Shape));
        assert_eq!(FilterControl::from_code(5), Some(FilterControl::Gain));
        assert_eq!(EnvelopeControl::from_code(5), Some(EnvelopeControl::ReleaseTime));
    }

    #[test]
    fn effect_kind_wire_round_trip() {
        for k in [
            EffectKind::None,
            EffectKind::Reverb,
            EffectKind::DynFilter,
        ] {
            assert_eq!(EffectKind::from_wire(k.to_wire()), Some(k));
        }
        assert_eq!(EffectKind::from_wire(0x89), None);
        assert_eq!(EffectKind::from_wire(1), None);
    }
}
