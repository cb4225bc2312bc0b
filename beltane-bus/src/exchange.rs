//! The audio-side end of the bus: drain, apply, reflect.
//!
//! `Exchange::mediate` is called once per processing cycle from the audio
//! callback (or whatever stands in for it). It never blocks, never locks,
//! never allocates and never logs; anything that needs those happens on
//! the control side before a descriptor is queued or after a reply is
//! read back.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use beltane_types::{Descriptor, Origin};

use crate::store::ParamStore;
use crate::transport::EngineEnds;

/// Read-after-write ordering between the console thread and the engine.
///
/// The console arms the gate, queues one command, then busy-sleeps until
/// the exchange marks it done. Latency is traded for simplicity: the
/// console is allowed to block, the audio thread is not.
#[derive(Clone)]
pub struct ConsoleGate {
    done: Arc<AtomicBool>,
}

impl ConsoleGate {
    pub fn new() -> ConsoleGate {
        ConsoleGate {
            done: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Call before queueing the command the gate should wait for.
    pub fn arm(&self) {
        self.done.store(false, Ordering::Release);
    }

    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// Poll until the armed command has been processed. Returns `false`
    /// on timeout (the engine is not running or badly behind).
    pub fn wait(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while !self.done.load(Ordering::Acquire) {
            if start.elapsed() > timeout {
                return false;
            }
            std::thread::sleep(Duration::from_micros(500));
        }
        true
    }
}

impl Default for ConsoleGate {
    fn default() -> ConsoleGate {
        ConsoleGate::new()
    }
}

/// Audio-side exchange state.
pub struct Exchange<S: ParamStore> {
    ends: EngineEnds,
    store: S,
    gate: ConsoleGate,
    dropped_returns: Arc<AtomicUsize>,
}

impl<S: ParamStore> Exchange<S> {
    pub fn new(ends: EngineEnds, store: S, gate: ConsoleGate) -> Exchange<S> {
        Exchange {
            ends,
            store,
            gate,
            dropped_returns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of replies lost to a full returns ring, readable from any
    /// thread.
    pub fn dropped_returns(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.dropped_returns)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Drain both inbound queues and apply every pending descriptor.
    /// Keeps going while any queue still has blocks so a burst settles
    /// within one cycle.
    pub fn mediate(&mut self) {
        loop {
            let mut more = false;
            if let Some(mut d) = self.ends.from_console.read() {
                more |= self.ends.from_console.pending() > 0;
                self.apply(&mut d);
                self.gate.mark_done();
            }
            if let Some(mut d) = self.ends.from_gui.read() {
                more |= self.ends.from_gui.pending() > 0;
                self.apply(&mut d);
            }
            if !more {
                break;
            }
        }
    }

    fn apply(&mut self, descriptor: &mut Descriptor) {
        if descriptor.source.origin == Origin::NoAction {
            return;
        }
        descriptor.value = self.store.resolve(descriptor);
        // The writer sees its own change; everyone else learns about it
        // from the returns ring. GUI-origin changes are only reflected
        // back when explicitly forced.
        if descriptor.source.origin != Origin::Gui || descriptor.source.force_update {
            if !self.ends.to_gui.write(descriptor) {
                self.dropped_returns.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::transport::Transport;
    use beltane_types::control::PartControl;
    use beltane_types::{Address, Kind, Section, Source};

    fn write_descriptor(origin: Origin, value: f32) -> Descriptor {
        let mut d = Descriptor::value(
            Address::section(Section::Part(0)),
            PartControl::Volume.code(),
            Source::new(origin),
            value,
        );
        d.kind = Kind::write();
        d
    }

    #[test]
    fn cli_write_is_applied_reflected_and_gated() {
        let (transport, ends) = Transport::new(8);
        let gate = ConsoleGate::new();
        let mut exchange = Exchange::new(ends, MemoryStore::new(), gate.clone());

        gate.arm();
        assert!(transport.from_console.write(&write_descriptor(Origin::Cli, 64.0)));
        exchange.mediate();

        assert!(gate.wait(Duration::from_millis(50)));
        let reply = transport.to_gui.read().expect("reply on the returns ring");
        assert_eq!(reply.value, 64.0);
        assert_eq!(
            exchange.store().value_of(
                &Address::section(Section::Part(0)),
                PartControl::Volume.code()
            ),
            Some(64.0)
        );
    }

    #[test]
    fn gui_write_is_not_echoed_back_unless_forced() {
        let (transport, ends) = Transport::new(8);
        let mut exchange = Exchange::new(ends, MemoryStore::new(), ConsoleGate::new());

        assert!(transport.from_gui.write(&write_descriptor(Origin::Gui, 30.0)));
        exchange.mediate();
        assert!(transport.to_gui.read().is_none());

        let mut forced = write_descriptor(Origin::Gui, 31.0);
        forced.source.force_update = true;
        assert!(transport.from_gui.write(&forced));
        exchange.mediate();
        assert_eq!(transport.to_gui.read().unwrap().value, 31.0);
    }

    #[test]
    fn no_action_descriptors_are_ignored() {
        let (transport, ends) = Transport::new(8);
        let mut exchange = Exchange::new(ends, MemoryStore::new(), ConsoleGate::new());

        assert!(transport.from_console.write(&write_descriptor(Origin::NoAction, 5.0)));
        exchange.mediate();
        assert!(transport.to_gui.read().is_none());
        assert_eq!(
            exchange.store().value_of(
                &Address::section(Section::Part(0)),
                PartControl::Volume.code()
            ),
            Some(96.0) // still the default
        );
    }

    #[test]
    fn a_burst_settles_in_one_mediate_call() {
        let (transport, ends) = Transport::new(16);
        let mut exchange = Exchange::new(ends, MemoryStore::new(), ConsoleGate::new());

        for n in 0..10 {
            assert!(transport.from_console.write(&write_descriptor(Origin::Cli, n as f32)));
        }
        exchange.mediate();
        assert_eq!(transport.to_gui.pending(), 10);
    }

    #[test]
    fn full_returns_ring_counts_drops() {
        let (transport, ends) = Transport::new(2);
        let mut exchange = Exchange::new(ends, MemoryStore::new(), ConsoleGate::new());
        let drops = exchange.dropped_returns();

        for n in 0..4 {
            assert!(transport.from_console.write(&write_descriptor(Origin::Cli, n as f32)));
        }
        exchange.mediate();
        assert_eq!(transport.to_gui.pending(), 2);
        assert_eq!(drops.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn gate_times_out_when_nothing_answers() {
        let gate = ConsoleGate::new();
        gate.arm();
        assert!(!gate.wait(Duration::from_millis(5)));
    }
}
