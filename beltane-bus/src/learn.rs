//! MIDI-learn table: learned controller lines and their mapping onto
//! write descriptors.
//!
//! A write flagged as a learn request never reaches the transport;
//! instead its target lands here, bound to the next incoming controller.
//! From then on `(channel, cc)` triples coming off the MIDI thread map
//! through the table into ordinary value descriptors that take the same
//! prepare/queue path as any other write. Decoding the MIDI wire itself
//! is someone else's job.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use beltane_types::{Address, Descriptor, Origin, Source};

use crate::limits::Limits;

/// One learned controller binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedLine {
    pub cc: u8,
    pub channel: u8,
    /// Output range the 7-bit controller value is scaled into.
    pub min: f32,
    pub max: f32,
    pub muted: bool,
    pub address: Address,
    pub control: u8,
}

impl LearnedLine {
    fn scaled(&self, value7: u8) -> f32 {
        let norm = f32::from(value7.min(127)) / 127.0;
        self.min + norm * (self.max - self.min)
    }
}

/// Ordered list of learned lines. Earlier lines fire first; several lines
/// may bind the same controller.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LearnTable {
    lines: Vec<LearnedLine>,
}

impl LearnTable {
    pub fn new() -> LearnTable {
        LearnTable::default()
    }

    /// Bind the target of a validated learn request to `(channel, cc)`.
    /// The line's output range starts as the control's full live range.
    pub fn learn(
        &mut self,
        descriptor: &Descriptor,
        channel: u8,
        cc: u8,
        limits: &Limits,
    ) -> usize {
        let line = LearnedLine {
            cc,
            channel,
            min: limits.min,
            max: limits.max,
            muted: false,
            address: descriptor.address,
            control: descriptor.control,
        };
        log::info!(
            target: "learn",
            "learned CC {cc} (channel {channel}) -> {:?} control {}",
            line.address,
            line.control
        );
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// Map one incoming controller event onto pending write descriptors,
    /// one per matching unmuted line. The results still need the normal
    /// limit/queue treatment.
    pub fn map(&self, channel: u8, cc: u8, value7: u8) -> Vec<Descriptor> {
        self.lines
            .iter()
            .filter(|line| !line.muted && line.cc == cc && line.channel == channel)
            .map(|line| {
                Descriptor::value(
                    line.address,
                    line.control,
                    Source::new(Origin::Midi),
                    line.scaled(value7),
                )
            })
            .collect()
    }

    pub fn lines(&self) -> &[LearnedLine] {
        &self.lines
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut LearnedLine> {
        self.lines.get_mut(index)
    }

    pub fn delete(&mut self, index: usize) -> bool {
        if index < self.lines.len() {
            self.lines.remove(index);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("could not serialize learn table: {e}"))?;
        fs::write(path, json).map_err(|e| format!("could not write {}: {e}", path.display()))
    }

    pub fn load(path: &Path) -> Result<LearnTable, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("could not read {}: {e}", path.display()))?;
        serde_json::from_str(&json)
            .map_err(|e| format!("malformed learn table {}: {e}", path.display()))
    }
}
