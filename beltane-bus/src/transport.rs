//! The four logical transport channels of the bus.
//!
//! Three descriptor rings cross the control/audio boundary: console to
//! engine, GUI to engine, and engine back to the GUI side. The fourth
//! channel is the broadcast lane for raw data payloads (not parameter
//! changes), fanned out to whoever subscribed.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::ring::{descriptor_ring, RingReader, RingWriter};

/// A raw payload pushed past normal address routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    /// Application-defined routing tag.
    pub tag: u8,
    pub bytes: Vec<u8>,
}

/// Fan-out channel for [`DataBlock`]s. Delivery is best effort: a
/// subscriber whose queue is full misses the block.
#[derive(Clone)]
pub struct Broadcast {
    subscribers: Arc<Mutex<Vec<Sender<DataBlock>>>>,
    depth: usize,
}

impl Broadcast {
    fn new(depth: usize) -> Broadcast {
        Broadcast {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            depth,
        }
    }

    pub fn subscribe(&self) -> Receiver<DataBlock> {
        let (tx, rx) = bounded(self.depth);
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Send `block` to every live subscriber without blocking; dead
    /// subscribers are dropped along the way.
    pub fn publish(&self, block: &DataBlock) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| match tx.try_send(block.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!(target: "bus", "broadcast subscriber full, block dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

/// Control-side ends of the transport.
pub struct Transport {
    /// Console thread writes validated descriptors here.
    pub from_console: RingWriter,
    /// GUI thread writes validated descriptors here.
    pub from_gui: RingWriter,
    /// The push-update dispatcher drains this.
    pub to_gui: RingReader,
    pub broadcast: Broadcast,
}

/// Audio-side ends of the transport, owned by the exchange loop.
pub struct EngineEnds {
    pub from_console: RingReader,
    pub from_gui: RingReader,
    pub to_gui: RingWriter,
}

impl Transport {
    /// Build the channel set; every ring holds `capacity` descriptors.
    pub fn new(capacity: usize) -> (Transport, EngineEnds) {
        let (console_tx, console_rx) = descriptor_ring(capacity);
        let (gui_tx, gui_rx) = descriptor_ring(capacity);
        let (returns_tx, returns_rx) = descriptor_ring(capacity);
        (
            Transport {
                from_console: console_tx,
                from_gui: gui_tx,
                to_gui: returns_rx,
                broadcast: Broadcast::new(capacity),
            },
            EngineEnds {
                from_console: console_rx,
                from_gui: gui_rx,
                to_gui: returns_tx,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltane_types::{Address, Descriptor, Origin, Section, Source};

    #[test]
    fn channels_are_independent() {
        let (transport, engine) = Transport::new(8);
        let d = Descriptor::value(
            Address::section(Section::Main),
            0,
            Source::new(Origin::Cli),
            1.0,
        );
        assert!(transport.from_console.write(&d));
        assert!(engine.from_gui.read().is_none());
        assert_eq!(engine.from_console.read().unwrap().value, 1.0);
    }

    #[test]
    fn broadcast_reaches_every_subscriber() {
        let (transport, _engine) = Transport::new(8);
        let a = transport.broadcast.subscribe();
        let b = transport.broadcast.subscribe();
        let block = DataBlock {
            tag: 7,
            bytes: vec![1, 2, 3],
        };
        transport.broadcast.publish(&block);
        assert_eq!(a.try_recv().unwrap(), block);
        assert_eq!(b.try_recv().unwrap(), block);
    }

    #[test]
    fn broadcast_drops_for_full_subscribers_only() {
        let (transport, _engine) = Transport::new(1);
        let slow = transport.broadcast.subscribe();
        let fast = transport.broadcast.subscribe();
        let block = DataBlock {
            tag: 0,
            bytes: vec![],
        };
        transport.broadcast.publish(&block);
        // `slow` never drains; its copy of the second block is lost.
        transport.broadcast.publish(&block);
        fast.try_recv().unwrap();
        fast.try_recv().unwrap();
        assert!(fast.try_recv().is_err());
        assert!(slow.try_recv().is_ok());
        assert!(slow.try_recv().is_err());
    }

    #[test]
    fn dead_subscribers_are_pruned() {
        let (transport, _engine) = Transport::new(4);
        let rx = transport.broadcast.subscribe();
        drop(rx);
        let block = DataBlock {
            tag: 1,
            bytes: vec![9],
        };
        transport.broadcast.publish(&block);
        assert!(transport.broadcast.subscribers.lock().unwrap().is_empty());
    }
}
