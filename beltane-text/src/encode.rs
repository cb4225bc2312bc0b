//! Command text to descriptor.
//!
//! The grammar is resolved strictly top-down: the section keyword first,
//! then whatever engine, insertion group and control are legal below it.
//! Control resolution and value parsing are separate steps so an unknown
//! control and an unusable value produce different errors. String
//! arguments (names, filenames) go into the side-channel pool and only
//! their slot id travels in the descriptor.

use thiserror::Error;

use beltane_bus::TextPool;
use beltane_types::address::{
    group, NUM_INSERT_EFFECTS, NUM_PARTS, NUM_PART_EFFECTS, NUM_SYSTEM_EFFECTS, NUM_VOICES,
};
use beltane_types::control::{reserved, EffectControl, EffectKind, MainControl, PartControl};
use beltane_types::{Address, Descriptor, Engine, Insert, Origin, Section, Source};

use crate::keywords::{self, Keyword};
use crate::parser::Parser;

/// A successfully encoded line. `has_value` distinguishes a pending
/// write from a plain read of the same control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoded {
    pub descriptor: Descriptor,
    pub has_value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("empty command")]
    Empty,
    #[error("no section matches '{0}'")]
    UnknownSection(String),
    #[error("unrecognised control: '{0}'")]
    Unrecognised(String),
    #[error("'{0}' is not a usable value")]
    BadValue(String),
    #[error("missing {0}")]
    MissingIndex(&'static str),
    #[error("{1} {0} is out of range")]
    IndexRange(u32, &'static str),
    #[error("missing text argument")]
    MissingText,
    #[error("side-channel pool is full")]
    PoolFull,
}

/// The inert descriptor a failed encode stands for: unrecognised control,
/// no action at the source.
pub fn no_action() -> Descriptor {
    Descriptor::read(
        Address::section(Section::Main),
        reserved::UNRECOGNISED,
        Source::new(Origin::NoAction),
    )
}

/// Encode one console line. `origin` is stamped into the descriptor's
/// source byte.
pub fn encode_line(
    line: &str,
    origin: Origin,
    pool: &TextPool,
) -> Result<Encoded, EncodeError> {
    let mut p = Parser::new(line);
    if p.is_at_end() {
        return Err(EncodeError::Empty);
    }
    let source = Source::new(origin);

    if p.accept(1, "part") {
        let n = index_of(&mut p, "part number", NUM_PARTS as u32)?;
        return encode_part(&mut p, Section::Part(n), source);
    }
    if p.accept(2, "main") {
        return encode_main(&mut p, source);
    }
    if p.accept(3, "system") {
        expect_effect_word(&mut p)?;
        let slot = index_of(&mut p, "effect number", NUM_SYSTEM_EFFECTS as u32)?;
        return encode_effect(&mut p, Section::SystemEffects, slot, source);
    }
    if p.accept(3, "insert") {
        expect_effect_word(&mut p)?;
        let slot = index_of(&mut p, "effect number", NUM_INSERT_EFFECTS as u32)?;
        return encode_effect(&mut p, Section::InsertEffects, slot, source);
    }
    if p.accept(2, "scale") {
        return encode_scales(&mut p, source, pool);
    }
    if p.accept(2, "bank") {
        return encode_bank(&mut p, source, pool);
    }
    if p.accept(3, "config") {
        return encode_config(&mut p, source);
    }
    if p.accept(3, "mlearn") {
        return encode_learn(&mut p, source, pool);
    }
    Err(EncodeError::UnknownSection(p.remainder().to_string()))
}

/// 1-based index argument, returned 0-based and range checked.
fn index_of(p: &mut Parser, what: &'static str, count: u32) -> Result<u8, EncodeError> {
    let n = p.next_index().ok_or(EncodeError::MissingIndex(what))?;
    if n == 0 || n > count {
        return Err(EncodeError::IndexRange(n, what));
    }
    Ok((n - 1) as u8)
}

fn expect_effect_word(p: &mut Parser) -> Result<(), EncodeError> {
    if p.accept(2, "effect") {
        Ok(())
    } else {
        Err(unrecognised(p))
    }
}

fn unrecognised(p: &Parser) -> EncodeError {
    let remainder = p.remainder().to_string();
    log::warn!(target: "text", "unrecognised control, stopped at: '{remainder}'");
    EncodeError::Unrecognised(remainder)
}

/// Try every keyword in `table`, consuming the matching one.
fn match_control(p: &mut Parser, table: &[Keyword]) -> Option<u8> {
    table
        .iter()
        .find(|k| p.accept(k.min, k.word))
        .map(|k| k.code)
}

/// Terminal step: optional value. At the end of the line the command is
/// a read, unless `action_default` makes the bare control itself a
/// write (clear/apply/stop style commands).
fn finish(
    p: &mut Parser,
    descriptor: Descriptor,
    action_default: Option<f32>,
) -> Result<Encoded, EncodeError> {
    if p.is_at_end() {
        return match action_default {
            Some(value) => Ok(Encoded {
                descriptor: Descriptor { value, ..descriptor },
                has_value: true,
            }),
            None => Ok(Encoded {
                descriptor,
                has_value: false,
            }),
        };
    }
    if let Some(toggled) = p.toggle() {
        return Ok(Encoded {
            descriptor: Descriptor {
                value: if toggled { 1.0 } else { 0.0 },
                ..descriptor
            },
            has_value: true,
        });
    }
    match p.next_number() {
        Ok(value) => Ok(Encoded {
            descriptor: Descriptor { value, ..descriptor },
            has_value: true,
        }),
        Err(word) if word.is_empty() => Err(EncodeError::MissingText),
        Err(word) => Err(EncodeError::BadValue(word)),
    }
}

/// Push the rest of the line into the pool as the command's string
/// argument.
fn finish_with_text(
    p: &mut Parser,
    mut descriptor: Descriptor,
    pool: &TextPool,
) -> Result<Encoded, EncodeError> {
    let text = p.remainder().trim();
    if text.is_empty() {
        return Err(EncodeError::MissingText);
    }
    descriptor.msg = Some(pool.push(text).ok_or(EncodeError::PoolFull)?);
    Ok(Encoded {
        descriptor,
        has_value: true,
    })
}

fn encode_main(p: &mut Parser, source: Source) -> Result<Encoded, EncodeError> {
    let control = match_control(p, keywords::MAIN_CONTROLS).ok_or_else(|| unrecognised(p))?;
    let descriptor = Descriptor::read(Address::section(Section::Main), control, source);
    let action = (control == MainControl::Stop as u8).then_some(1.0);
    finish(p, descriptor, action)
}

fn encode_part(
    p: &mut Parser,
    section: Section,
    source: Source,
) -> Result<Encoded, EncodeError> {
    let base = Address::section(section);

    if p.accept(3, "addsynth") {
        let engine = if p.accept(2, "voice") {
            Engine::AddVoice(index_of(p, "voice number", NUM_VOICES as u32)?)
        } else {
            Engine::AddSynth
        };
        return encode_engine(p, base.with_engine(engine), source, keywords::ADD_CONTROLS);
    }
    if p.accept(3, "subsynth") {
        return encode_engine(
            p,
            base.with_engine(Engine::SubSynth),
            source,
            keywords::SUB_CONTROLS,
        );
    }
    if p.accept(3, "padsynth") {
        return encode_engine(
            p,
            base.with_engine(Engine::PadSynth),
            source,
            keywords::PAD_CONTROLS,
        );
    }
    if p.accept(2, "effect") {
        let slot = index_of(p, "effect number", NUM_PART_EFFECTS as u32)?;
        return encode_effect(p, section, slot, source);
    }

    // A bare "amplitude" group header carries no information at part
    // level; match and discard.
    p.accept(3, "amplitude");
    let control = match_control(p, keywords::PART_CONTROLS).ok_or_else(|| unrecognised(p))?;
    let descriptor = Descriptor::read(base, control, source);
    let action = (control == PartControl::Enable as u8).then_some(1.0);
    finish(p, descriptor, action)
}

/// Controls and inserts below a synth engine. `extra` is the engine's own
/// control table, tried after the engine-common one.
fn encode_engine(
    p: &mut Parser,
    address: Address,
    source: Source,
    extra: &[Keyword],
) -> Result<Encoded, EncodeError> {
    if p.accept(3, "lfo") {
        let grp = match_group(p).unwrap_or(group::AMPLITUDE);
        let address = address.with_insert(Insert::Lfo).with_parameter(grp);
        let control =
            match_control(p, keywords::LFO_CONTROLS).ok_or_else(|| unrecognised(p))?;
        return finish(p, Descriptor::read(address, control, source), None);
    }
    if p.accept(3, "filter") {
        let address = address.with_insert(Insert::Filter);
        let control =
            match_control(p, keywords::FILTER_CONTROLS).ok_or_else(|| unrecognised(p))?;
        return finish(p, Descriptor::read(address, control, source), None);
    }
    if p.accept(3, "envelope") {
        let grp = match_group(p).unwrap_or(group::AMPLITUDE);
        let address = address.with_insert(Insert::Envelope).with_parameter(grp);
        return encode_envelope(p, address, source);
    }
    if p.accept(4, "oscillator") {
        let address = address.with_insert(Insert::Oscillator);
        let control =
            match_control(p, keywords::OSCILLATOR_CONTROLS).ok_or_else(|| unrecognised(p))?;
        let action = (control == 96).then_some(1.0); // clear harmonics
        return finish(p, Descriptor::read(address, control, source), action);
    }
    if p.accept(3, "resonance") {
        let address = address.with_insert(Insert::Resonance);
        let control =
            match_control(p, keywords::RESONANCE_CONTROLS).ok_or_else(|| unrecognised(p))?;
        let action = (control == 96).then_some(1.0); // clear graph
        return finish(p, Descriptor::read(address, control, source), action);
    }

    p.accept(3, "amplitude"); // filler header
    let control = match_control(p, keywords::ENGINE_COMMON_CONTROLS)
        .or_else(|| match_control(p, extra))
        .ok_or_else(|| unrecognised(p))?;
    let action = (control == 104).then_some(1.0); // pad apply
    finish(p, Descriptor::read(address, control, source), action)
}

fn match_group(p: &mut Parser) -> Option<u8> {
    if p.accept(3, "amplitude") {
        Some(group::AMPLITUDE)
    } else if p.accept(3, "frequency") {
        Some(group::FREQUENCY)
    } else if p.accept(3, "filter") {
        Some(group::FILTER)
    } else if p.accept(3, "bandwidth") {
        Some(group::BANDWIDTH)
    } else {
        None
    }
}

/// Envelope leaves are two-word phrases: attack/decay/release plus
/// level/time, sustain is always a level.
fn encode_envelope(
    p: &mut Parser,
    address: Address,
    source: Source,
) -> Result<Encoded, EncodeError> {
    use beltane_types::control::EnvelopeControl as E;
    let control = if p.accept(2, "attack") {
        if p.accept(1, "time") {
            E::AttackTime
        } else {
            p.accept(1, "level");
            E::AttackLevel
        }
    } else if p.accept(2, "decay") {
        if p.accept(1, "time") {
            E::DecayTime
        } else {
            p.accept(1, "level");
            E::DecayLevel
        }
    } else if p.accept(2, "sustain") {
        p.accept(1, "level");
        E::SustainLevel
    } else if p.accept(3, "release") {
        if p.accept(1, "level") {
            E::ReleaseLevel
        } else {
            p.accept(1, "time");
            E::ReleaseTime
        }
    } else if p.accept(3, "stretch") {
        E::Stretch
    } else if p.accept(3, "forced") {
        E::ForcedRelease
    } else if p.accept(3, "linear") {
        E::LinearEnvelope
    } else {
        return Err(unrecognised(p));
    };
    finish(p, Descriptor::read(address, control.code(), source), None)
}

/// One effect slot in a part or in the system/insert chains.
fn encode_effect(
    p: &mut Parser,
    section: Section,
    slot: u8,
    source: Source,
) -> Result<Encoded, EncodeError> {
    let base = Address::section(section).with_engine(Engine::Effect(slot));

    // Slot-level commands first: they are legal before any algorithm
    // name.
    if p.accept(2, "type") {
        let kind_code =
            match_control(p, keywords::EFFECT_KINDS).ok_or_else(|| unrecognised(p))?;
        let descriptor = Descriptor::value(
            base,
            EffectControl::SelectKind.code(),
            source,
            (kind_code - 0x80) as f32,
        );
        return Ok(Encoded {
            descriptor,
            has_value: true,
        });
    }
    if section == Section::InsertEffects && p.accept(3, "destination") {
        let descriptor = Descriptor::read(base, EffectControl::Destination.code(), source);
        return finish(p, descriptor, None);
    }

    let kind_code = match_control(p, keywords::EFFECT_KINDS).ok_or_else(|| unrecognised(p))?;
    let kind = EffectKind::from_wire(kind_code).ok_or_else(|| unrecognised(p))?;
    let address = base.with_kit(kind.to_wire());

    let control = match_control(p, keywords::EFFECT_COMMON_CONTROLS)
        .or_else(|| match_control(p, keywords::effect_controls(kind)))
        .ok_or_else(|| unrecognised(p))?;
    finish(p, Descriptor::read(address, control, source), None)
}

fn encode_scales(
    p: &mut Parser,
    source: Source,
    pool: &TextPool,
) -> Result<Encoded, EncodeError> {
    use beltane_types::control::ScaleControl as S;
    let control = match_control(p, keywords::SCALE_CONTROLS).ok_or_else(|| unrecognised(p))?;
    let descriptor = Descriptor::read(Address::section(Section::Scales), control, source);
    if control == S::Tuning as u8 || control == S::Keymap as u8 || control == S::Name as u8 {
        return finish_with_text(p, descriptor, pool);
    }
    let action = (control == S::ClearAll as u8).then_some(1.0);
    finish(p, descriptor, action)
}

fn encode_bank(
    p: &mut Parser,
    source: Source,
    pool: &TextPool,
) -> Result<Encoded, EncodeError> {
    use beltane_types::control::BankControl as B;
    let control = match_control(p, keywords::BANK_CONTROLS).ok_or_else(|| unrecognised(p))?;
    let descriptor = Descriptor::read(Address::section(Section::Bank), control, source);
    if control == B::RenameInstrument as u8 || control == B::RenameBank as u8 {
        return finish_with_text(p, descriptor, pool);
    }
    let action =
        (control == B::SaveInstrument as u8 || control == B::DeleteInstrument as u8).then_some(1.0);
    finish(p, descriptor, action)
}

fn encode_config(p: &mut Parser, source: Source) -> Result<Encoded, EncodeError> {
    use beltane_types::control::ConfigControl as C;
    let control = match_control(p, keywords::CONFIG_CONTROLS).ok_or_else(|| unrecognised(p))?;
    let descriptor = Descriptor::read(Address::section(Section::Config), control, source);
    let action = (control == C::SaveCurrentConfig as u8).then_some(1.0);
    finish(p, descriptor, action)
}

fn encode_learn(
    p: &mut Parser,
    source: Source,
    pool: &TextPool,
) -> Result<Encoded, EncodeError> {
    use beltane_types::control::LearnControl as L;
    let control = match_control(p, keywords::LEARN_CONTROLS).ok_or_else(|| unrecognised(p))?;
    let mut descriptor = Descriptor::read(Address::section(Section::MidiLearn), control, source);

    if control == L::LoadList as u8 || control == L::SaveList as u8 {
        return finish_with_text(p, descriptor, pool);
    }
    if control == L::ClearAll as u8 {
        return finish(p, descriptor, Some(1.0));
    }
    // The remaining controls operate on one learned line.
    let line = index_of(p, "line number", 200)?;
    descriptor.address = descriptor.address.with_offset(line);
    let action = (control == L::DeleteLine as u8).then_some(1.0);
    finish(p, descriptor, action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltane_types::control::{EnvelopeControl, LfoControl, ScaleControl};

    fn encode(line: &str) -> Result<Encoded, EncodeError> {
        encode_line(line, Origin::Cli, &TextPool::new())
    }

    #[test]
    fn part_volume_with_value() {
        let e = encode("Part 1 Volume 64").unwrap();
        assert_eq!(e.descriptor.address.section, Section::Part(0));
        assert_eq!(e.descriptor.control, PartControl::Volume.code());
        assert_eq!(e.descriptor.value, 64.0);
        assert!(e.has_value);
        assert_eq!(e.descriptor.source.origin, Origin::Cli);
    }

    #[test]
    fn abbreviations_resolve_like_full_words() {
        let full = encode("part 2 addsynth volume 90").unwrap();
        let short = encode("p 2 adds v 90").unwrap();
        assert_eq!(full, short);
    }

    #[test]
    fn trailing_nothing_is_a_read() {
        let e = encode("part 1 volume").unwrap();
        assert!(!e.has_value);
    }

    #[test]
    fn system_effect_reverb_time_query() {
        let e = encode("System Effect 1 Reverb Time").unwrap();
        assert_eq!(e.descriptor.address.section, Section::SystemEffects);
        assert_eq!(e.descriptor.address.engine, Some(Engine::Effect(0)));
        assert_eq!(
            e.descriptor.address.kit,
            Some(EffectKind::Reverb.to_wire())
        );
        assert_eq!(e.descriptor.control, 2);
        assert!(!e.has_value);
    }

    #[test]
    fn effect_kind_selection_carries_the_kind_index() {
        let e = encode("system effect 2 type echo").unwrap();
        assert_eq!(e.descriptor.control, EffectControl::SelectKind.code());
        assert_eq!(e.descriptor.address.engine, Some(Engine::Effect(1)));
        assert_eq!(e.descriptor.value, 2.0);
        assert!(e.has_value);
    }

    #[test]
    fn subsection_matches_before_local_controls() {
        // "filter" must resolve to the filter insert, not fall through to
        // any control word; the insert's own controls follow it.
        let e = encode("part 1 subsynth filter q 40").unwrap();
        assert_eq!(e.descriptor.address.insert, Some(Insert::Filter));
        assert_eq!(e.descriptor.control, 1);
        assert_eq!(e.descriptor.value, 40.0);
    }

    #[test]
    fn lfo_group_defaults_to_amplitude() {
        let e = encode("part 1 addsynth lfo rate 70").unwrap();
        assert_eq!(e.descriptor.address.insert, Some(Insert::Lfo));
        assert_eq!(e.descriptor.address.parameter, Some(group::AMPLITUDE));
        assert_eq!(e.descriptor.control, LfoControl::Speed.code());

        let e = encode("part 1 addsynth lfo frequency rate 70").unwrap();
        assert_eq!(e.descriptor.address.parameter, Some(group::FREQUENCY));
    }

    #[test]
    fn envelope_two_word_phrases() {
        let e = encode("part 1 padsynth envelope attack time 20").unwrap();
        assert_eq!(e.descriptor.control, EnvelopeControl::AttackTime.code());
        let e = encode("part 1 padsynth envelope attack 20").unwrap();
        assert_eq!(e.descriptor.control, EnvelopeControl::AttackLevel.code());
        let e = encode("part 1 subsynth envelope bandwidth release time").unwrap();
        assert_eq!(e.descriptor.address.parameter, Some(group::BANDWIDTH));
        assert_eq!(e.descriptor.control, EnvelopeControl::ReleaseTime.code());
    }

    #[test]
    fn voice_number_rides_in_the_engine() {
        let e = encode("part 1 addsynth voice 2 volume 80").unwrap();
        assert_eq!(e.descriptor.address.engine, Some(Engine::AddVoice(1)));
    }

    #[test]
    fn amplitude_header_is_discarded() {
        let with = encode("part 1 amplitude volume 90").unwrap();
        let without = encode("part 1 volume 90").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn toggle_words_become_values() {
        let e = encode("part 3 portamento on").unwrap();
        assert_eq!(e.descriptor.value, 1.0);
        assert!(e.has_value);
        let e = encode("part 3 portamento off").unwrap();
        assert_eq!(e.descriptor.value, 0.0);
    }

    #[test]
    fn unknown_control_reports_the_remainder() {
        match encode("part 1 wibble 3") {
            Err(EncodeError::Unrecognised(rest)) => assert_eq!(rest, "wibble 3"),
            other => panic!("expected Unrecognised, got {other:?}"),
        }
    }

    #[test]
    fn unknown_value_is_a_different_error() {
        match encode("part 1 volume loud") {
            Err(EncodeError::BadValue(word)) => assert_eq!(word, "loud"),
            other => panic!("expected BadValue, got {other:?}"),
        }
    }

    #[test]
    fn unknown_section_is_reported() {
        assert!(matches!(
            encode("frobnicate 3"),
            Err(EncodeError::UnknownSection(_))
        ));
    }

    #[test]
    fn part_index_is_range_checked() {
        assert!(matches!(
            encode("part 65 volume 1"),
            Err(EncodeError::IndexRange(65, _))
        ));
        assert!(matches!(
            encode("part 0 volume 1"),
            Err(EncodeError::IndexRange(0, _))
        ));
        assert!(matches!(
            encode("part volume"),
            Err(EncodeError::MissingIndex(_))
        ));
    }

    #[test]
    fn scale_name_goes_through_the_pool() {
        let pool = TextPool::new();
        let e = encode_line("scale name just intonation", Origin::Cli, &pool).unwrap();
        assert_eq!(e.descriptor.control, ScaleControl::Name.code());
        let id = e.descriptor.msg.unwrap();
        assert_eq!(pool.fetch(id), "just intonation");
    }

    #[test]
    fn missing_text_argument() {
        assert_eq!(encode("scale name"), Err(EncodeError::MissingText));
    }

    #[test]
    fn learn_line_index_rides_in_the_offset() {
        let e = encode("mlearn mute 3 on").unwrap();
        assert_eq!(e.descriptor.address.section, Section::MidiLearn);
        assert_eq!(e.descriptor.address.offset, Some(2));
        assert_eq!(e.descriptor.value, 1.0);
    }

    #[test]
    fn bare_action_controls_write_without_a_value() {
        let e = encode("main stop").unwrap();
        assert!(e.has_value);
        assert_eq!(e.descriptor.value, 1.0);
        let e = encode("scale clear").unwrap();
        assert!(e.has_value);
    }

    #[test]
    fn no_action_descriptor_is_inert() {
        let d = no_action();
        assert_eq!(d.control, reserved::UNRECOGNISED);
        assert_eq!(d.source.origin, Origin::NoAction);
    }
}
