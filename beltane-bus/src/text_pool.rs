//! Side-channel pool of string slots.
//!
//! Descriptors have a fixed numeric layout, so any string payload
//! (a filename, a display name, diagnostic text) is parked here and the
//! descriptor carries only the slot's [`MsgId`]. The pool is an explicitly
//! owned handle: clone it and hand it to whichever component needs it,
//! there is no process-wide instance.
//!
//! `fetch` is destructive and returns a slot's text exactly once. A second
//! fetch of the same slot yields an empty string rather than an error;
//! some call sites rely on empty-on-miss, so the behavior is part of the
//! contract (see DESIGN.md). Only control threads touch the pool; the
//! critical sections are O(1)-ish and the audio thread never takes the
//! lock.

use std::sync::{Arc, Mutex};

use beltane_types::MsgId;

/// Slot count; the one remaining byte value is reserved for "no message".
const POOL_SLOTS: usize = 255;

/// Clonable handle to a bounded pool of string slots.
#[derive(Clone)]
pub struct TextPool {
    slots: Arc<Mutex<Vec<String>>>,
}

impl TextPool {
    pub fn new() -> TextPool {
        TextPool {
            slots: Arc::new(Mutex::new(vec![String::new(); POOL_SLOTS])),
        }
    }

    /// Claim the first empty slot for `text`. Returns `None` when the pool
    /// is exhausted or `text` is empty; exhaustion is a recoverable
    /// condition for the caller, never a panic.
    pub fn push(&self, text: &str) -> Option<MsgId> {
        if text.is_empty() {
            return None;
        }
        let mut slots = self.slots.lock().unwrap();
        match slots.iter().position(|slot| slot.is_empty()) {
            Some(index) => {
                slots[index] = text.to_string();
                MsgId::new(index as u8)
            }
            None => {
                log::warn!(target: "bus", "text pool exhausted, dropping: {text}");
                None
            }
        }
    }

    /// Take the slot's text, clearing the slot. An already-cleared slot
    /// returns the empty string.
    pub fn fetch(&self, id: MsgId) -> String {
        let mut slots = self.slots.lock().unwrap();
        match slots.get_mut(id.index()) {
            Some(slot) => std::mem::take(slot),
            None => String::new(),
        }
    }

    /// Read the slot's text without clearing it.
    pub fn peek(&self, id: MsgId) -> String {
        let slots = self.slots.lock().unwrap();
        slots.get(id.index()).cloned().unwrap_or_default()
    }

    /// Clear every slot. Catches message leaks between test scenarios.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap();
        for slot in slots.iter_mut() {
            slot.clear();
        }
    }

    /// Number of occupied slots.
    pub fn in_use(&self) -> usize {
        let slots = self.slots.lock().unwrap();
        slots.iter().filter(|slot| !slot.is_empty()).count()
    }
}

impl Default for TextPool {
    fn default() -> TextPool {
        TextPool::new()
    }
}
