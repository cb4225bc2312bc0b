//! Limit/default resolution: the query pass every write takes before it
//! is allowed anywhere near a transport queue.
//!
//! All validation happens here, on the calling control thread. The audio
//! thread only ever sees descriptors whose value is already inside the
//! control's live bounds, so it never needs to defend itself against
//! malformed input mid-callback.

use thiserror::Error;

use beltane_types::{Descriptor, Kind, LimitSelector};

use crate::store::ParamStore;

/// Requesting a value at or above this resolves to the control's default
/// instead.
pub const DEFAULT_REQUEST: f32 = f32::MAX / 2.0;

/// Resolved bounds and flags for one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub integer: bool,
    pub learnable: bool,
}

/// Why a write was refused before queueing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("unrecognised parameter address")]
    AddressUnknown,
    #[error("that control cannot be MIDI-learned")]
    NotLearnable,
}

/// Run the bounds query triple for the control `descriptor` addresses.
pub fn resolve_limits<S: ParamStore>(
    store: &mut S,
    descriptor: &Descriptor,
) -> Result<Limits, WriteError> {
    let mut probe = *descriptor;
    probe.kind = Kind::limits(LimitSelector::Minimum);
    let min = store.resolve(&mut probe);
    if probe.kind.is_error() {
        return Err(WriteError::AddressUnknown);
    }
    let integer = probe.kind.is_integer();
    let learnable = probe.kind.is_learnable();

    probe.kind = Kind::limits(LimitSelector::Maximum);
    let max = store.resolve(&mut probe);
    probe.kind = Kind::limits(LimitSelector::Default);
    let default = store.resolve(&mut probe);

    Ok(Limits {
        min,
        max,
        default,
        integer,
        learnable,
    })
}

/// Validate and clamp a pending write, returning the descriptor that may
/// be queued: value inside the resolved bounds, `WRITE` set alongside the
/// caller's origin bits, integer flag as reported by the store.
///
/// Out-of-range values are adjusted rather than rejected; only an
/// unresolvable address or a learn request against a fixed control stops
/// the write entirely.
pub fn prepare_write<S: ParamStore>(
    store: &mut S,
    descriptor: &Descriptor,
) -> Result<Descriptor, WriteError> {
    let limits = resolve_limits(store, descriptor)?;
    if descriptor.kind.is_learn_request() && !limits.learnable {
        return Err(WriteError::NotLearnable);
    }

    let requested = descriptor.value;
    let value = if requested >= DEFAULT_REQUEST || requested.is_nan() {
        limits.default
    } else {
        requested.clamp(limits.min, limits.max)
    };
    if value != requested {
        log::info!(
            target: "bus",
            "Range adjusted: {requested} -> {value} (limits {} .. {})",
            limits.min,
            limits.max
        );
    }

    let mut ready = *descriptor;
    ready.value = value;
    ready.kind = descriptor.kind.with(Kind::WRITE);
    if limits.integer {
        ready.kind = ready.kind.with(Kind::INTEGER);
    }
    Ok(ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use beltane_types::control::{MainControl, PartControl};
    use beltane_types::{Address, Origin, Section, Source};

    fn volume_request(value: f32) -> Descriptor {
        Descriptor::value(
            Address::section(Section::Part(0)),
            PartControl::Volume.code(),
            Source::new(Origin::Cli),
            value,
        )
    }

    #[test]
    fn in_range_value_passes_untouched() {
        let mut store = MemoryStore::new();
        let ready = prepare_write(&mut store, &volume_request(64.0)).unwrap();
        assert_eq!(ready.value, 64.0);
        assert!(ready.kind.is_write());
        assert!(ready.kind.is_integer());
        assert_eq!(ready.source.origin, Origin::Cli);
    }

    #[test]
    fn out_of_range_values_are_clamped_not_rejected() {
        let mut store = MemoryStore::new();
        assert_eq!(prepare_write(&mut store, &volume_request(500.0)).unwrap().value, 127.0);
        assert_eq!(prepare_write(&mut store, &volume_request(-3.0)).unwrap().value, 0.0);
        // Far outside, and nastier floats, still land inside the bounds.
        for bad in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN, 1.0e30, -1.0e30] {
            let v = prepare_write(&mut store, &volume_request(bad)).unwrap().value;
            assert!((0.0..=127.0).contains(&v), "{bad} clamped to {v}");
        }
    }

    #[test]
    fn huge_request_means_use_the_default() {
        let mut store = MemoryStore::new();
        let ready = prepare_write(&mut store, &volume_request(f32::MAX)).unwrap();
        assert_eq!(ready.value, 96.0);
    }

    #[test]
    fn unknown_address_is_surfaced() {
        let mut store = MemoryStore::new();
        let d = Descriptor::value(
            Address::section(Section::Main),
            77, // nothing lives at this code
            Source::new(Origin::Cli),
            1.0,
        );
        assert_eq!(prepare_write(&mut store, &d), Err(WriteError::AddressUnknown));
    }

    #[test]
    fn learn_request_on_fixed_control_is_rejected() {
        let mut store = MemoryStore::new();
        let mut d = Descriptor::value(
            Address::section(Section::Main),
            MainControl::KeyShift.code(),
            Source::new(Origin::Cli),
            5.0,
        );
        d.kind = d.kind.with(Kind::LEARN_REQUEST);
        assert_eq!(prepare_write(&mut store, &d), Err(WriteError::NotLearnable));

        // The same request against a learnable control goes through.
        let mut ok = volume_request(64.0);
        ok.kind = ok.kind.with(Kind::LEARN_REQUEST);
        assert!(prepare_write(&mut store, &ok).is_ok());
    }

    #[test]
    fn resolved_limits_match_the_store_table() {
        let mut store = MemoryStore::new();
        let limits = resolve_limits(&mut store, &volume_request(0.0)).unwrap();
        assert_eq!(limits.min, 0.0);
        assert_eq!(limits.max, 127.0);
        assert_eq!(limits.default, 96.0);
        assert!(limits.integer);
        assert!(limits.learnable);
    }
}
