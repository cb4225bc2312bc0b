//! Text codec for the beltane control bus.
//!
//! Translates between the console's command language and descriptors, in
//! both directions. The grammar is a strict top-down hierarchy of
//! space-separated, case-insensitive, prefix-abbreviated keywords:
//! section first, then engine, then insertion group, then the control
//! itself, then an optional value. Decoding walks the same hierarchy in
//! the other direction and produces the human sentence for a resolved
//! descriptor.

pub mod decode;
pub mod encode;
pub mod keywords;
pub mod parser;

pub use decode::decode;
pub use encode::{encode_line, no_action, EncodeError, Encoded};
pub use parser::Parser;
