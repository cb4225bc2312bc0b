//! Lock-free single-producer/single-consumer descriptor transport.
//!
//! A ring of fixed-size byte blocks, one descriptor per block. The single
//! writer and single reader each own one end, so a pair of free-running
//! counters with acquire/release ordering is enough; there is no mutex
//! anywhere near the audio thread. Writes never block: a full ring
//! refuses the block and the caller decides how to surface the drop.
//! Reads are polled by the consumer on its own cadence.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use beltane_types::{Descriptor, DESCRIPTOR_BYTES};

struct RingShared {
    blocks: Box<[UnsafeCell<[u8; DESCRIPTOR_BYTES]>]>,
    /// capacity - 1; capacity is always a power of two
    mask: usize,
    read: AtomicUsize,
    write: AtomicUsize,
}

// Safety: the writer half only ever dereferences the block at its private
// write index and the reader half the block at its private read index, and
// the counter handover is acquire/release. Each half is held by one thread.
unsafe impl Send for RingShared {}
unsafe impl Sync for RingShared {}

/// Producer half of a descriptor ring.
pub struct RingWriter {
    shared: Arc<RingShared>,
}

/// Consumer half of a descriptor ring.
pub struct RingReader {
    shared: Arc<RingShared>,
}

/// Create a ring holding `capacity` descriptors (rounded up to a power of
/// two, minimum 2).
pub fn descriptor_ring(capacity: usize) -> (RingWriter, RingReader) {
    let capacity = capacity.max(2).next_power_of_two();
    let blocks = (0..capacity)
        .map(|_| UnsafeCell::new([0u8; DESCRIPTOR_BYTES]))
        .collect::<Vec<_>>()
        .into_boxed_slice();
    let shared = Arc::new(RingShared {
        blocks,
        mask: capacity - 1,
        read: AtomicUsize::new(0),
        write: AtomicUsize::new(0),
    });
    (
        RingWriter {
            shared: Arc::clone(&shared),
        },
        RingReader { shared },
    )
}

impl RingWriter {
    /// Append one descriptor. Returns `false`, leaving the ring untouched,
    /// when the ring is full.
    pub fn write(&self, descriptor: &Descriptor) -> bool {
        let shared = &self.shared;
        let write = shared.write.load(Ordering::Relaxed);
        let read = shared.read.load(Ordering::Acquire);
        if write.wrapping_sub(read) > shared.mask {
            return false;
        }
        // Safety: this slot is outside the readable region until the
        // write counter is published below.
        unsafe {
            *shared.blocks[write & shared.mask].get() = descriptor.to_bytes();
        }
        shared.write.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    pub fn is_full(&self) -> bool {
        let write = self.shared.write.load(Ordering::Relaxed);
        let read = self.shared.read.load(Ordering::Acquire);
        write.wrapping_sub(read) > self.shared.mask
    }
}

impl RingReader {
    /// Take the oldest pending descriptor, or `None` when the ring is
    /// empty.
    pub fn read(&self) -> Option<Descriptor> {
        let shared = &self.shared;
        let read = shared.read.load(Ordering::Relaxed);
        let write = shared.write.load(Ordering::Acquire);
        if write == read {
            return None;
        }
        // Safety: the writer published this slot before moving its counter
        // past it.
        let bytes = unsafe { *shared.blocks[read & shared.mask].get() };
        shared.read.store(read.wrapping_add(1), Ordering::Release);
        // Blocks only enter the ring through `write`, which serializes a
        // valid descriptor.
        Descriptor::from_bytes(&bytes).ok()
    }

    /// Number of descriptors waiting to be read.
    pub fn pending(&self) -> usize {
        let read = self.shared.read.load(Ordering::Relaxed);
        let write = self.shared.write.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltane_types::{Address, Origin, Section, Source};

    fn numbered(n: f32) -> Descriptor {
        Descriptor::value(
            Address::section(Section::Main),
            0,
            Source::new(Origin::Cli),
            n,
        )
    }

    #[test]
    fn fifo_order() {
        let (tx, rx) = descriptor_ring(8);
        for n in 0..5 {
            assert!(tx.write(&numbered(n as f32)));
        }
        for n in 0..5 {
            assert_eq!(rx.read().unwrap().value, n as f32);
        }
        assert!(rx.read().is_none());
    }

    #[test]
    fn full_ring_refuses_without_losing_contents() {
        let (tx, rx) = descriptor_ring(4);
        for n in 0..4 {
            assert!(tx.write(&numbered(n as f32)));
        }
        assert!(tx.is_full());
        assert!(!tx.write(&numbered(99.0)));
        // Everything written before the refused write is intact.
        assert_eq!(rx.pending(), 4);
        for n in 0..4 {
            assert_eq!(rx.read().unwrap().value, n as f32);
        }
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let (tx, rx) = descriptor_ring(5);
        for n in 0..8 {
            assert!(tx.write(&numbered(n as f32)));
        }
        assert!(!tx.write(&numbered(8.0)));
        assert_eq!(rx.pending(), 8);
    }

    #[test]
    fn drained_slots_free_capacity() {
        let (tx, rx) = descriptor_ring(2);
        assert!(tx.write(&numbered(1.0)));
        assert!(tx.write(&numbered(2.0)));
        assert!(!tx.write(&numbered(3.0)));
        assert_eq!(rx.read().unwrap().value, 1.0);
        assert!(tx.write(&numbered(3.0)));
    }

    #[test]
    fn cross_thread_handoff() {
        let (tx, rx) = descriptor_ring(64);
        let producer = std::thread::spawn(move || {
            let mut sent = 0u32;
            for n in 0..1000 {
                while !tx.write(&numbered(n as f32)) {
                    std::thread::yield_now();
                }
                sent += 1;
            }
            sent
        });
        let mut received = 0u32;
        let mut next = 0.0f32;
        while received < 1000 {
            if let Some(d) = rx.read() {
                assert_eq!(d.value, next);
                next += 1.0;
                received += 1;
            } else {
                std::thread::yield_now();
            }
        }
        assert_eq!(producer.join().unwrap(), 1000);
    }
}
