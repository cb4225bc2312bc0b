//! Shared vocabulary for the beltane control bus.
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here: the [`Descriptor`] record, its hierarchical [`Address`], and the
//! flag bytes that qualify a request. This crate has no behavior beyond
//! field layout, wire encoding and the control-code vocabulary; the
//! components that move and interpret descriptors live in `beltane-bus`
//! and `beltane-text`.

pub mod address;
pub mod control;
pub mod descriptor;
pub mod flags;

pub use address::{Address, Engine, Insert, Section};
pub use descriptor::{Descriptor, MsgId, WireError, DESCRIPTOR_BYTES};
pub use flags::{Kind, LimitSelector, Origin, Source};
