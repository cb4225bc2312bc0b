//! The beltane control bus.
//!
//! Everything between a control surface (console, GUI, MIDI-learn) and the
//! running audio engine: the side-channel text pool, the lock-free
//! descriptor transport, the limit/default resolution step that validates
//! every write before it is queued, the audio-side exchange loop, and the
//! push-update dispatcher that routes replies back to observers.
//!
//! The live parameter store itself is an external collaborator reached
//! through the [`ParamStore`] trait; [`MemoryStore`] is the in-repo
//! reference implementation used by the console binary and the tests.

pub mod dispatcher;
pub mod exchange;
pub mod learn;
pub mod limits;
pub mod ring;
pub mod store;
pub mod text_pool;
pub mod transport;

pub use dispatcher::{Filter, ObserverId, Scope, SectionFilter, UpdateDispatcher};
pub use exchange::{ConsoleGate, Exchange};
pub use learn::{LearnTable, LearnedLine};
pub use limits::{prepare_write, resolve_limits, Limits, WriteError};
pub use ring::{descriptor_ring, RingReader, RingWriter};
pub use store::{MemoryStore, ParamSpec, ParamStore};
pub use text_pool::TextPool;
pub use transport::{Broadcast, DataBlock, EngineEnds, Transport};
