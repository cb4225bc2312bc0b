//! Request kind and origin flag bytes.

use serde::{Deserialize, Serialize};

/// Which of the resolved limit values a bounds query asks for.
///
/// Occupies the low two bits of [`Kind`]. `Adjusted` doubles as "plain
/// read" when the `LIMITS` bit is clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSelector {
    Adjusted,
    Minimum,
    Maximum,
    Default,
}

impl LimitSelector {
    fn to_bits(self) -> u8 {
        match self {
            LimitSelector::Adjusted => 0,
            LimitSelector::Minimum => 1,
            LimitSelector::Maximum => 2,
            LimitSelector::Default => 3,
        }
    }

    fn from_bits(bits: u8) -> LimitSelector {
        match bits & 0x03 {
            1 => LimitSelector::Minimum,
            2 => LimitSelector::Maximum,
            3 => LimitSelector::Default,
            _ => LimitSelector::Adjusted,
        }
    }
}

/// The descriptor's type byte: what the request is and how its value is
/// typed.
///
/// `WRITE` and `LIMITS` are mutually exclusive request modes; the
/// constructors keep them apart and `is_write`/`is_limit_query` are how
/// consumers branch. The remaining bits are reported back by the parameter
/// store: `INTEGER`, `LEARNABLE` and `ERROR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Kind(u8);

impl Kind {
    pub const LIMITS: u8 = 4;
    pub const ERROR: u8 = 8;
    pub const LEARN_REQUEST: u8 = 16;
    pub const LEARNABLE: u8 = 32;
    pub const WRITE: u8 = 64;
    pub const INTEGER: u8 = 128;

    /// A plain read request.
    pub fn read() -> Kind {
        Kind(0)
    }

    /// A write request.
    pub fn write() -> Kind {
        Kind(Self::WRITE)
    }

    /// A bounds query for the given selector.
    pub fn limits(selector: LimitSelector) -> Kind {
        Kind(Self::LIMITS | selector.to_bits())
    }

    pub fn from_byte(byte: u8) -> Kind {
        Kind(byte)
    }

    pub fn to_byte(self) -> u8 {
        self.0
    }

    pub fn is_write(self) -> bool {
        self.0 & Self::WRITE != 0
    }

    pub fn is_limit_query(self) -> bool {
        self.0 & Self::LIMITS != 0
    }

    pub fn is_error(self) -> bool {
        self.0 & Self::ERROR != 0
    }

    pub fn is_learn_request(self) -> bool {
        self.0 & Self::LEARN_REQUEST != 0
    }

    pub fn is_learnable(self) -> bool {
        self.0 & Self::LEARNABLE != 0
    }

    pub fn is_integer(self) -> bool {
        self.0 & Self::INTEGER != 0
    }

    pub fn selector(self) -> LimitSelector {
        LimitSelector::from_bits(self.0)
    }

    pub fn with(self, bits: u8) -> Kind {
        Kind(self.0 | bits)
    }

    pub fn without(self, bits: u8) -> Kind {
        Kind(self.0 & !bits)
    }
}

/// Where a descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// Update everything that listens, MIDI excepted.
    #[default]
    ToAll,
    Midi,
    Cli,
    Gui,
    /// Resolution failed; nothing should act on this descriptor.
    NoAction,
}

impl Origin {
    fn to_bits(self) -> u8 {
        match self {
            Origin::ToAll => 0,
            Origin::Midi => 1,
            Origin::Cli => 2,
            Origin::Gui => 3,
            Origin::NoAction => 15,
        }
    }

    fn from_bits(bits: u8) -> Origin {
        match bits & 0x0F {
            1 => Origin::Midi,
            2 => Origin::Cli,
            3 => Origin::Gui,
            15 => Origin::NoAction,
            _ => Origin::ToAll,
        }
    }
}

/// Origin plus action modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Source {
    pub origin: Origin,
    /// Push the change to observers even if it appears redundant.
    pub force_update: bool,
    /// Descriptor re-entered the exchange from the returns path.
    pub loopback: bool,
    /// May be deferred to the slow lane.
    pub low_prio: bool,
}

impl Source {
    const FORCE_UPDATE: u8 = 32;
    const LOOPBACK: u8 = 64;
    const LOW_PRIO: u8 = 128;

    pub fn new(origin: Origin) -> Source {
        Source {
            origin,
            force_update: false,
            loopback: false,
            low_prio: false,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = self.origin.to_bits();
        if self.force_update {
            byte |= Self::FORCE_UPDATE;
        }
        if self.loopback {
            byte |= Self::LOOPBACK;
        }
        if self.low_prio {
            byte |= Self::LOW_PRIO;
        }
        byte
    }

    pub fn from_byte(byte: u8) -> Source {
        Source {
            origin: Origin::from_bits(byte),
            force_update: byte & Self::FORCE_UPDATE != 0,
            loopback: byte & Self::LOOPBACK != 0,
            low_prio: byte & Self::LOW_PRIO != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_request_modes_are_distinct() {
        assert!(Kind::write().is_write());
        assert!(!Kind::write().is_limit_query());
        let q = Kind::limits(LimitSelector::Maximum);
        assert!(q.is_limit_query());
        assert!(!q.is_write());
        assert_eq!(q.selector(), LimitSelector::Maximum);
    }

    #[test]
    fn kind_store_reported_bits() {
        let k = Kind::read().with(Kind::INTEGER | Kind::LEARNABLE);
        assert!(k.is_integer());
        assert!(k.is_learnable());
        assert!(!k.is_error());
        assert!(k.without(Kind::LEARNABLE).is_integer());
    }

    #[test]
    fn source_byte_round_trip() {
        let mut s = Source::new(Origin::Cli);
        s.force_update = true;
        s.low_prio = true;
        assert_eq!(Source::from_byte(s.to_byte()), s);
        assert_eq!(Source::from_byte(15).origin, Origin::NoAction);
    }
}
