//! The command loop: encode, validate, queue, wait, decode.
//!
//! One command is in flight at a time: the console arms the gate before
//! queueing and busy-waits for the engine pump to process the descriptor
//! before accepting the next line. Bounds metadata is static, so the
//! console holds its own store instance for the synchronous limit pass;
//! live values stay with the engine and come back over the returns ring.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};

use beltane_bus::{
    prepare_write, ConsoleGate, MemoryStore, RingWriter, Scope, TextPool, Transport,
    UpdateDispatcher,
};
use beltane_text::{decode, encode_line, EncodeError};
use beltane_types::{Descriptor, Origin};

pub struct Console {
    pool: TextPool,
    limits: MemoryStore,
    to_engine: RingWriter,
    gate: ConsoleGate,
    dispatcher: UpdateDispatcher,
    replies: Receiver<Descriptor>,
    timeout: Duration,
}

impl Console {
    /// Take over the control-side transport ends. The returns ring feeds
    /// the dispatcher; a catch-all observer collects replies for
    /// printing.
    pub fn new(
        pool: TextPool,
        transport: Transport,
        gate: ConsoleGate,
        timeout: Duration,
    ) -> Console {
        let mut dispatcher = UpdateDispatcher::new(transport.to_gui, pool.clone());
        let (reply_tx, replies) = unbounded();
        dispatcher.observe(Scope::any(), move |d: &Descriptor| {
            let _ = reply_tx.send(*d);
        });
        Console {
            pool,
            limits: MemoryStore::new(),
            to_engine: transport.from_console,
            gate,
            dispatcher,
            replies,
            timeout,
        }
    }

    pub fn pool(&self) -> &TextPool {
        &self.pool
    }

    /// Process one command line, returning the lines to print.
    pub fn run_line(&mut self, line: &str) -> Vec<String> {
        let encoded = match encode_line(line, Origin::Cli, &self.pool) {
            Ok(encoded) => encoded,
            Err(EncodeError::Empty) => return Vec::new(),
            Err(e) => return vec![e.to_string()],
        };

        let outgoing = if encoded.has_value {
            match prepare_write(&mut self.limits, &encoded.descriptor) {
                Ok(ready) => ready,
                Err(e) => return vec![e.to_string()],
            }
        } else {
            encoded.descriptor
        };

        self.gate.arm();
        if !self.to_engine.write(&outgoing) {
            log::warn!(target: "console", "transport full, command dropped");
            return vec!["Unable to write to buffer".to_string()];
        }
        if !self.gate.wait(self.timeout) {
            return vec!["Engine did not respond".to_string()];
        }

        self.dispatcher.poll();
        let mut out = Vec::new();
        while let Ok(reply) = self.replies.try_recv() {
            out.push(decode(&reply, &self.pool, true));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltane_bus::Exchange;

    /// Background pump that mediates continuously until dropped.
    struct Pump {
        stop: std::sync::Arc<std::sync::atomic::AtomicBool>,
        handle: Option<std::thread::JoinHandle<()>>,
    }

    impl Pump {
        fn start(mut exchange: Exchange<MemoryStore>) -> Pump {
            let stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
            let flag = std::sync::Arc::clone(&stop);
            let handle = std::thread::spawn(move || {
                while !flag.load(std::sync::atomic::Ordering::Relaxed) {
                    exchange.mediate();
                    std::thread::sleep(Duration::from_millis(1));
                }
            });
            Pump {
                stop,
                handle: Some(handle),
            }
        }
    }

    impl Drop for Pump {
        fn drop(&mut self) {
            self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    fn running_console() -> (Console, Pump) {
        let pool = TextPool::new();
        let gate = ConsoleGate::new();
        let (transport, ends) = Transport::new(16);
        let exchange = Exchange::new(ends, MemoryStore::new(), gate.clone());
        let console = Console::new(pool, transport, gate, Duration::from_millis(500));
        (console, Pump::start(exchange))
    }

    #[test]
    fn write_command_round_trips_to_a_sentence() {
        let (mut console, _pump) = running_console();
        let out = console.run_line("part 1 volume 64");
        assert_eq!(out, vec!["Part 1 Volume Value 64".to_string()]);
    }

    #[test]
    fn read_command_reports_the_current_value() {
        let (mut console, _pump) = running_console();
        console.run_line("part 2 panning 100");
        let out = console.run_line("part 2 panning");
        assert_eq!(out, vec!["Part 2 Panning Value 100".to_string()]);
    }

    #[test]
    fn unknown_control_is_reported_not_queued() {
        let (mut console, _pump) = running_console();
        let out = console.run_line("part 1 wibble 3");
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("unrecognised control"), "{}", out[0]);
    }

    #[test]
    fn empty_line_prints_nothing() {
        let (mut console, _pump) = running_console();
        assert!(console.run_line("   ").is_empty());
    }
}
