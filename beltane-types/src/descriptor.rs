//! The fixed-layout command descriptor and its wire codec.
//!
//! A descriptor is small enough to copy by value and to cross a thread
//! boundary as a flat block of bytes. Strings never travel inside it; a
//! descriptor that logically carries text instead holds a [`MsgId`]
//! referencing a slot in the side-channel text pool.

use serde::{Deserialize, Serialize};

use crate::address::{Address, Engine, Insert, Section, UNUSED};
use crate::flags::{Kind, Source};

/// Size of one descriptor on the wire. Transport rings move blocks of
/// exactly this many bytes.
pub const DESCRIPTOR_BYTES: usize = 16;

/// Wire byte meaning "no message attached".
pub const NO_MSG: u8 = 0xFF;

/// Index of a slot in the side-channel text pool, `< NO_MSG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MsgId(u8);

impl MsgId {
    /// `None` for the reserved no-message byte.
    pub fn new(index: u8) -> Option<MsgId> {
        if index == NO_MSG {
            None
        } else {
            Some(MsgId(index))
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn to_wire(self) -> u8 {
        self.0
    }
}

/// One control-bus request or reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descriptor {
    pub value: f32,
    pub kind: Kind,
    pub source: Source,
    /// Control code, meaningful only relative to `address`.
    pub control: u8,
    pub address: Address,
    pub msg: Option<MsgId>,
}

/// A received byte block that does not decode to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    BadSection(u8),
    BadEngine(u8),
    BadInsert(u8),
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::BadSection(b) => write!(f, "unknown section byte 0x{b:02X}"),
            WireError::BadEngine(b) => write!(f, "unknown engine byte 0x{b:02X}"),
            WireError::BadInsert(b) => write!(f, "unknown insert byte 0x{b:02X}"),
        }
    }
}

impl std::error::Error for WireError {}

impl Descriptor {
    /// A read request for one control.
    pub fn read(address: Address, control: u8, source: Source) -> Descriptor {
        Descriptor {
            value: 0.0,
            kind: Kind::read(),
            source,
            control,
            address,
            msg: None,
        }
    }

    /// A value carrying request; becomes a write once validated.
    pub fn value(address: Address, control: u8, source: Source, value: f32) -> Descriptor {
        Descriptor {
            value,
            kind: Kind::read(),
            source,
            control,
            address,
            msg: None,
        }
    }

    pub fn to_bytes(&self) -> [u8; DESCRIPTOR_BYTES] {
        let mut bytes = [0u8; DESCRIPTOR_BYTES];
        bytes[0..4].copy_from_slice(&self.value.to_le_bytes());
        bytes[4] = self.kind.to_byte();
        bytes[5] = self.source.to_byte();
        bytes[6] = self.control;
        bytes[7] = self.address.section.to_wire();
        bytes[8] = self.address.kit.unwrap_or(UNUSED);
        bytes[9] = self.address.engine.map(Engine::to_wire).unwrap_or(UNUSED);
        bytes[10] = self.address.insert.map(Insert::to_wire).unwrap_or(UNUSED);
        bytes[11] = self.address.parameter.unwrap_or(UNUSED);
        bytes[12] = self.address.offset.unwrap_or(UNUSED);
        bytes[13] = self.msg.map(MsgId::to_wire).unwrap_or(NO_MSG);
        bytes
    }

    pub fn from_bytes(bytes: &[u8; DESCRIPTOR_BYTES]) -> Result<Descriptor, WireError> {
        let section = Section::from_wire(bytes[7]).ok_or(WireError::BadSection(bytes[7]))?;
        let engine = match bytes[9] {
            UNUSED => None,
            b => Some(Engine::from_wire(b).ok_or(WireError::BadEngine(b))?),
        };
        let insert = match bytes[10] {
            UNUSED => None,
            b => Some(Insert::from_wire(b).ok_or(WireError::BadInsert(b))?),
        };
        let optional = |b: u8| if b == UNUSED { None } else { Some(b) };
        Ok(Descriptor {
            value: f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            kind: Kind::from_byte(bytes[4]),
            source: Source::from_byte(bytes[5]),
            control: bytes[6],
            address: Address {
                section,
                kit: optional(bytes[8]),
                engine,
                insert,
                parameter: optional(bytes[11]),
                offset: optional(bytes[12]),
            },
            msg: MsgId::new(bytes[13]),
        })
    }
}
