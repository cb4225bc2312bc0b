//! Hierarchical parameter addresses.
//!
//! An address names the *place* a control code is interpreted at:
//! section, then kit item, then sound engine, then insertion point, then
//! sub-parameter and positional offset. Unused levels are `None`; a
//! concrete `0` is always a valid, distinct value and never means
//! "not set".
//!
//! Effect addressing convention: the effect slot lives in `engine`
//! (`Engine::Effect(slot)`) and the effect algorithm the control codes are
//! relative to lives in `kit` as the [`control::EffectKind`] wire code.
//!
//! [`control::EffectKind`]: crate::control::EffectKind

use serde::{Deserialize, Serialize};

/// Number of playable parts.
pub const NUM_PARTS: u8 = 64;
/// Kit items per part.
pub const NUM_KIT_ITEMS: u8 = 16;
/// Voices per additive engine.
pub const NUM_VOICES: u8 = 8;
/// System effect slots.
pub const NUM_SYSTEM_EFFECTS: u8 = 4;
/// Insertion effect slots.
pub const NUM_INSERT_EFFECTS: u8 = 8;
/// Effect slots per part.
pub const NUM_PART_EFFECTS: u8 = 3;

/// Wire byte meaning "level not in use" at any address position.
pub const UNUSED: u8 = 0xFF;

/// Top level of the address hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// A numbered part, 0-based, `< NUM_PARTS`.
    Part(u8),
    MidiLearn,
    Scales,
    Main,
    SystemEffects,
    InsertEffects,
    Bank,
    Config,
}

impl Section {
    pub fn to_wire(self) -> u8 {
        match self {
            Section::Part(n) => n,
            Section::MidiLearn => 0xD8,
            Section::Scales => 0xE8,
            Section::Main => 0xF0,
            Section::SystemEffects => 0xF1,
            Section::InsertEffects => 0xF2,
            Section::Bank => 0xF4,
            Section::Config => 0xF8,
        }
    }

    pub fn from_wire(byte: u8) -> Option<Section> {
        match byte {
            n if n < NUM_PARTS => Some(Section::Part(n)),
            0xD8 => Some(Section::MidiLearn),
            0xE8 => Some(Section::Scales),
            0xF0 => Some(Section::Main),
            0xF1 => Some(Section::SystemEffects),
            0xF2 => Some(Section::InsertEffects),
            0xF4 => Some(Section::Bank),
            0xF8 => Some(Section::Config),
            _ => None,
        }
    }

    /// True for the three sections that hold effect chains.
    pub fn has_effects(self) -> bool {
        matches!(
            self,
            Section::Part(_) | Section::SystemEffects | Section::InsertEffects
        )
    }
}

/// Sound engine within a part, or an effect slot within an effect section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    AddSynth,
    SubSynth,
    PadSynth,
    /// A single voice of the additive engine, `< NUM_VOICES`.
    AddVoice(u8),
    /// An effect slot, `< 64`.
    Effect(u8),
}

impl Engine {
    pub fn to_wire(self) -> u8 {
        match self {
            Engine::AddSynth => 0,
            Engine::SubSynth => 1,
            Engine::PadSynth => 2,
            Engine::Effect(slot) => 0x40 | slot,
            Engine::AddVoice(n) => 0x80 | n,
        }
    }

    pub fn from_wire(byte: u8) -> Option<Engine> {
        match byte {
            0 => Some(Engine::AddSynth),
            1 => Some(Engine::SubSynth),
            2 => Some(Engine::PadSynth),
            b if b & 0xC0 == 0x40 => Some(Engine::Effect(b & 0x3F)),
            b if b & 0x80 == 0x80 && b & 0x7F < NUM_VOICES => Some(Engine::AddVoice(b & 0x7F)),
            _ => None,
        }
    }
}

/// Insertion point below an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Insert {
    Lfo,
    Filter,
    Envelope,
    Oscillator,
    Resonance,
    SystemEffectSend,
    KitGroup,
}

impl Insert {
    pub fn to_wire(self) -> u8 {
        match self {
            Insert::Lfo => 0,
            Insert::Filter => 1,
            Insert::Envelope => 2,
            Insert::Oscillator => 5,
            Insert::Resonance => 8,
            Insert::SystemEffectSend => 16,
            Insert::KitGroup => 32,
        }
    }

    pub fn from_wire(byte: u8) -> Option<Insert> {
        match byte {
            0 => Some(Insert::Lfo),
            1 => Some(Insert::Filter),
            2 => Some(Insert::Envelope),
            5 => Some(Insert::Oscillator),
            8 => Some(Insert::Resonance),
            16 => Some(Insert::SystemEffectSend),
            32 => Some(Insert::KitGroup),
            _ => None,
        }
    }
}

/// Full hierarchical address. Together with a control code this names
/// exactly one logical parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub section: Section,
    pub kit: Option<u8>,
    pub engine: Option<Engine>,
    pub insert: Option<Insert>,
    /// Sub-parameter selector, e.g. which of the amplitude/frequency/filter
    /// groups an LFO or envelope insert belongs to.
    pub parameter: Option<u8>,
    pub offset: Option<u8>,
}

impl Address {
    /// Address with every level below the section unused.
    pub fn section(section: Section) -> Address {
        Address {
            section,
            kit: None,
            engine: None,
            insert: None,
            parameter: None,
            offset: None,
        }
    }

    pub fn with_kit(mut self, kit: u8) -> Address {
        self.kit = Some(kit);
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Address {
        self.engine = Some(engine);
        self
    }

    pub fn with_insert(mut self, insert: Insert) -> Address {
        self.insert = Some(insert);
        self
    }

    pub fn with_parameter(mut self, parameter: u8) -> Address {
        self.parameter = Some(parameter);
        self
    }

    pub fn with_offset(mut self, offset: u8) -> Address {
        self.offset = Some(offset);
        self
    }
}

/// Sub-parameter group selectors used with `Insert::Lfo` and
/// `Insert::Envelope`.
pub mod group {
    pub const AMPLITUDE: u8 = 0;
    pub const FREQUENCY: u8 = 1;
    pub const FILTER: u8 = 2;
    /// Envelope only (sub-synth bandwidth envelope).
    pub const BANDWIDTH: u8 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_wire_round_trip() {
        let all = [
            Section::Part(0),
            Section::Part(63),
            Section::MidiLearn,
            Section::Scales,
            Section::Main,
            Section::SystemEffects,
            Section::InsertEffects,
            Section::Bank,
            Section::Config,
        ];
        for s in all {
            assert_eq!(Section::from_wire(s.to_wire()), Some(s));
        }
        // Gap bytes decode to nothing rather than a part.
        assert_eq!(Section::from_wire(64), None);
        assert_eq!(Section::from_wire(UNUSED), None);
    }

    #[test]
    fn engine_wire_round_trip() {
        let all = [
            Engine::AddSynth,
            Engine::SubSynth,
            Engine::PadSynth,
            Engine::AddVoice(0),
            Engine::AddVoice(7),
            Engine::Effect(0),
            Engine::Effect(7),
        ];
        for e in all {
            assert_eq!(Engine::from_wire(e.to_wire()), Some(e));
        }
        // Voice numbers beyond the engine's range are invalid.
        assert_eq!(Engine::from_wire(0x80 | NUM_VOICES), None);
    }

    #[test]
    fn builder_leaves_unset_levels_none() {
        let addr = Address::section(Section::Part(2)).with_engine(Engine::SubSynth);
        assert_eq!(addr.kit, None);
        assert_eq!(addr.insert, None);
        assert_eq!(addr.engine, Some(Engine::SubSynth));
    }
}
