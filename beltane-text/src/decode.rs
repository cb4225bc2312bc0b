//! Descriptor to human sentence.
//!
//! The dispatch hierarchy mirrors encoding exactly: section, then engine,
//! then insertion group, then the control. Each leaf contributes a phrase
//! fragment and sets two rendering flags: whether the numeric value is
//! appended at all, and whether it reads as an on/off toggle instead of a
//! number. Integer-kind values print rounded. A handful of operations use
//! reserved negative values to report failure; those map to fixed error
//! phrases instead of numbers.

use beltane_bus::TextPool;
use beltane_types::control::{
    reserved, BankControl, ConfigControl, EffectControl, EffectKind, LearnControl, MainControl,
    PartControl, ScaleControl,
};
use beltane_types::{address::group, Descriptor, Engine, Insert, Section};

use crate::keywords;

/// Render a resolved descriptor as the sentence describing it.
/// `add_value` is false when the caller only wants the description, e.g.
/// for an error report about the addressed control.
pub fn decode(descriptor: &Descriptor, pool: &TextPool, add_value: bool) -> String {
    if descriptor.control == reserved::TEXT_MESSAGE {
        return match descriptor.msg {
            Some(id) => pool.fetch(id),
            None => String::new(),
        };
    }
    if descriptor.control == reserved::UNRECOGNISED {
        return "No action taken".to_string();
    }

    let mut r = Renderer {
        pool,
        show_value: true,
        yesno: false,
    };
    let phrase = r.resolve(descriptor);
    r.with_value(phrase, descriptor, add_value)
}

struct Renderer<'a> {
    pool: &'a TextPool,
    show_value: bool,
    yesno: bool,
}

impl<'a> Renderer<'a> {
    fn with_value(&self, phrase: String, descriptor: &Descriptor, add_value: bool) -> String {
        if !add_value || phrase.is_empty() {
            return phrase;
        }
        if self.yesno {
            return if descriptor.value > 0.5 {
                format!("{phrase} - on")
            } else {
                format!("{phrase} - off")
            };
        }
        if self.show_value {
            if descriptor.kind.is_integer() {
                return format!("{phrase} Value {}", descriptor.value.round() as i64);
            }
            return format!("{phrase} Value {}", descriptor.value);
        }
        phrase
    }

    fn resolve(&mut self, d: &Descriptor) -> String {
        match d.address.section {
            Section::Main => self.resolve_main(d),
            Section::Part(n) => self.resolve_part(d, n),
            Section::SystemEffects => self.resolve_effect(d, "System"),
            Section::InsertEffects => self.resolve_effect(d, "Insert"),
            Section::Scales => self.resolve_scales(d),
            Section::Bank => self.resolve_bank(d),
            Section::Config => self.resolve_config(d),
            Section::MidiLearn => self.resolve_learn(d),
        }
    }

    fn resolve_main(&mut self, d: &Descriptor) -> String {
        if d.control == MainControl::Stop.code() {
            self.show_value = false;
            return "Main Stop".to_string();
        }
        match keywords::name_of(keywords::MAIN_CONTROLS, d.control) {
            Some(word) => format!("Main {}", cap(word)),
            None => self.unknown(d),
        }
    }

    fn resolve_part(&mut self, d: &Descriptor, n: u8) -> String {
        let prefix = format!("Part {}", n + 1);
        if let Some(Engine::Effect(_)) = d.address.engine {
            let tail = self.resolve_effect(d, "");
            return format!("{prefix} {tail}");
        }
        match d.address.engine {
            None => {
                if d.control == PartControl::Portamento.code()
                    || d.control == PartControl::Enable.code()
                {
                    self.yesno = true;
                }
                match keywords::name_of(keywords::PART_CONTROLS, d.control) {
                    Some(word) => format!("{prefix} {}", cap(word)),
                    None => self.unknown(d),
                }
            }
            Some(engine) => {
                let engine_name = match engine {
                    Engine::AddSynth => "AddSynth".to_string(),
                    Engine::SubSynth => "SubSynth".to_string(),
                    Engine::PadSynth => "PadSynth".to_string(),
                    Engine::AddVoice(v) => format!("AddSynth Voice {}", v + 1),
                    Engine::Effect(_) => unreachable!("handled above"),
                };
                let tail = self.resolve_engine(d, engine);
                if tail.is_empty() {
                    return self.unknown(d);
                }
                format!("{prefix} {engine_name} {tail}")
            }
        }
    }

    /// Everything below an engine: insert groups first, engine controls
    /// otherwise. Empty return means unresolvable.
    fn resolve_engine(&mut self, d: &Descriptor, engine: Engine) -> String {
        match d.address.insert {
            Some(Insert::Lfo) => match keywords::name_of(keywords::LFO_CONTROLS, d.control) {
                Some(word) => {
                    if d.control == 6 {
                        self.yesno = true; // continuous
                    }
                    format!("LFO {}{}", group_prefix(d.address.parameter), cap(word))
                }
                None => String::new(),
            },
            Some(Insert::Filter) => match keywords::name_of(keywords::FILTER_CONTROLS, d.control) {
                Some(word) => format!("Filter {}", cap(word)),
                None => String::new(),
            },
            Some(Insert::Envelope) => {
                match keywords::name_of(keywords::ENVELOPE_CONTROLS, d.control) {
                    Some(word) => {
                        if d.control == 16 || d.control == 17 {
                            self.yesno = true; // forced release / linear
                        }
                        format!("Envelope {}{}", group_prefix(d.address.parameter), cap(word))
                    }
                    None => String::new(),
                }
            }
            Some(Insert::Oscillator) => {
                match keywords::name_of(keywords::OSCILLATOR_CONTROLS, d.control) {
                    Some(word) => {
                        if d.control == 96 {
                            self.show_value = false; // clear harmonics
                        }
                        format!("Oscillator {}", cap(word))
                    }
                    None => String::new(),
                }
            }
            Some(Insert::Resonance) => {
                match keywords::name_of(keywords::RESONANCE_CONTROLS, d.control) {
                    Some(word) => {
                        match d.control {
                            8 => self.yesno = true,
                            96 => self.show_value = false,
                            _ => {}
                        }
                        format!("Resonance {}", cap(word))
                    }
                    None => String::new(),
                }
            }
            Some(_) | None => {
                let extra = match engine {
                    Engine::SubSynth => keywords::SUB_CONTROLS,
                    Engine::PadSynth => keywords::PAD_CONTROLS,
                    _ => keywords::ADD_CONTROLS,
                };
                if matches!(engine, Engine::PadSynth) && d.control == 104 {
                    self.show_value = false; // apply changes
                }
                if d.control == 112 || d.control == 120 {
                    self.yesno = true; // stereo / depop
                }
                keywords::name_of(keywords::ENGINE_COMMON_CONTROLS, d.control)
                    .or_else(|| keywords::name_of(extra, d.control))
                    .map(cap)
                    .unwrap_or_default()
            }
        }
    }

    fn resolve_effect(&mut self, d: &Descriptor, chain: &str) -> String {
        let slot = match d.address.engine {
            Some(Engine::Effect(slot)) => slot,
            _ => return self.unknown(d),
        };
        let prefix = if chain.is_empty() {
            format!("Effect {}", slot + 1)
        } else {
            format!("{chain} Effect {}", slot + 1)
        };

        if d.control == EffectControl::SelectKind.code() {
            self.show_value = false;
            let kind = EffectKind::from_wire(0x80 + d.value as u8)
                .map(EffectKind::name)
                .unwrap_or("?");
            return format!("{prefix} Type {kind}");
        }
        if d.control == EffectControl::Destination.code() {
            return format!("{prefix} Destination");
        }

        let kind = match d.address.kit.and_then(EffectKind::from_wire) {
            Some(kind) => kind,
            None => return self.unknown(d),
        };
        let word = keywords::name_of(keywords::EFFECT_COMMON_CONTROLS, d.control)
            .or_else(|| keywords::name_of(keywords::effect_controls(kind), d.control));
        match word {
            Some(word) => format!("{prefix} {} {}", kind.name(), cap(word)),
            None => self.unknown(d),
        }
    }

    fn resolve_scales(&mut self, d: &Descriptor) -> String {
        let string_op = d.control == ScaleControl::Tuning.code()
            || d.control == ScaleControl::Keymap.code()
            || d.control == ScaleControl::Name.code();
        if string_op {
            self.show_value = false;
            let word = keywords::name_of(keywords::SCALE_CONTROLS, d.control).unwrap_or("?");
            if let Some(phrase) = error_phrase(d.value) {
                return format!("Scale {}: {phrase}", cap(word));
            }
            let text = match d.msg {
                Some(id) => self.pool.fetch(id),
                None => String::new(),
            };
            return format!("Scale {} {text}", cap(word));
        }
        if d.control == ScaleControl::ClearAll.code() {
            self.show_value = false;
            return "Scale Clear".to_string();
        }
        if d.control == ScaleControl::InvertKeys.code()
            || d.control == ScaleControl::EnableMicrotonal.code()
            || d.control == ScaleControl::EnableKeyboardMap.code()
        {
            self.yesno = true;
        }
        match keywords::name_of(keywords::SCALE_CONTROLS, d.control) {
            Some(word) => format!("Scale {}", cap(word)),
            None => self.unknown(d),
        }
    }

    fn resolve_bank(&mut self, d: &Descriptor) -> String {
        let string_op = d.control == BankControl::RenameInstrument.code()
            || d.control == BankControl::RenameBank.code();
        if string_op {
            self.show_value = false;
            let word = keywords::name_of(keywords::BANK_CONTROLS, d.control).unwrap_or("?");
            let text = match d.msg {
                Some(id) => self.pool.fetch(id),
                None => String::new(),
            };
            return format!("Bank {} {text}", cap(word));
        }
        if let Some(phrase) = error_phrase(d.value) {
            self.show_value = false;
            let word = keywords::name_of(keywords::BANK_CONTROLS, d.control).unwrap_or("?");
            return format!("Bank {}: {phrase}", cap(word));
        }
        match keywords::name_of(keywords::BANK_CONTROLS, d.control) {
            Some(word) => format!("Bank {}", cap(word)),
            None => self.unknown(d),
        }
    }

    fn resolve_config(&mut self, d: &Descriptor) -> String {
        if d.control == ConfigControl::SaveCurrentConfig.code() {
            self.show_value = false;
            return "Config Save".to_string();
        }
        if d.control == ConfigControl::EnableGui.code()
            || d.control == ConfigControl::EnableCli.code()
            || d.control == ConfigControl::HideNonFatalErrors.code()
            || d.control == ConfigControl::ReportsDestination.code()
        {
            self.yesno = true;
        }
        match keywords::name_of(keywords::CONFIG_CONTROLS, d.control) {
            Some(word) => format!("Config {}", cap(word)),
            None => self.unknown(d),
        }
    }

    fn resolve_learn(&mut self, d: &Descriptor) -> String {
        let string_op =
            d.control == LearnControl::LoadList.code() || d.control == LearnControl::SaveList.code();
        if string_op {
            self.show_value = false;
            let word = keywords::name_of(keywords::LEARN_CONTROLS, d.control).unwrap_or("?");
            if let Some(phrase) = error_phrase(d.value) {
                return format!("MLearn {}: {phrase}", cap(word));
            }
            let text = match d.msg {
                Some(id) => self.pool.fetch(id),
                None => String::new(),
            };
            return format!("MLearn {} {text}", cap(word));
        }
        if d.control == LearnControl::ClearAll.code() {
            self.show_value = false;
            return "MLearn Clear".to_string();
        }
        if d.control == LearnControl::Mute.code() {
            self.yesno = true;
        }
        if d.control == LearnControl::DeleteLine.code() {
            self.show_value = false;
        }
        let line = d.address.offset.map(|o| o + 1).unwrap_or(0);
        match keywords::name_of(keywords::LEARN_CONTROLS, d.control) {
            Some(word) => format!("MLearn {} {line}", cap(word)),
            None => self.unknown(d),
        }
    }

    fn unknown(&mut self, d: &Descriptor) -> String {
        self.show_value = false;
        format!("Unrecognised control {} at {:?}", d.control, d.address.section)
    }
}

/// LFO/envelope group word, trailing space included.
fn group_prefix(parameter: Option<u8>) -> &'static str {
    match parameter {
        Some(group::FREQUENCY) => "Frequency ",
        Some(group::FILTER) => "Filter ",
        Some(group::BANDWIDTH) => "Bandwidth ",
        _ => "Amplitude ",
    }
}

/// Fixed phrases for the reserved failure values of file-backed
/// operations. Anything at or above zero is an ordinary value.
fn error_phrase(value: f32) -> Option<&'static str> {
    if value >= 0.0 {
        return None;
    }
    Some(match value as i32 {
        -1 => "value too small",
        -2 => "invalid entry",
        -3 => "file not found",
        _ => "operation failed",
    })
}

fn cap(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut upper = true;
    for c in word.chars() {
        if c == ' ' {
            out.push(' ');
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltane_types::{Address, Kind, Origin, Source};

    fn pool() -> TextPool {
        TextPool::new()
    }

    fn int_write(mut d: Descriptor, value: f32) -> Descriptor {
        d.kind = Kind::write().with(Kind::INTEGER);
        d.value = value;
        d
    }

    #[test]
    fn cap_capitalizes_each_word() {
        assert_eq!(cap("volume"), "Volume");
        assert_eq!(cap("attack time"), "Attack Time");
    }

    #[test]
    fn part_volume_sentence() {
        let d = int_write(
            Descriptor::read(
                Address::section(Section::Part(0)),
                PartControl::Volume.code(),
                Source::new(Origin::Cli),
            ),
            64.0,
        );
        assert_eq!(decode(&d, &pool(), true), "Part 1 Volume Value 64");
        assert_eq!(decode(&d, &pool(), false), "Part 1 Volume");
    }

    #[test]
    fn integer_values_print_rounded() {
        let d = int_write(
            Descriptor::read(
                Address::section(Section::Part(2)),
                PartControl::Panning.code(),
                Source::new(Origin::Cli),
            ),
            63.7,
        );
        assert_eq!(decode(&d, &pool(), true), "Part 3 Panning Value 64");
    }

    #[test]
    fn float_values_print_as_given() {
        let mut d = Descriptor::read(
            Address::section(Section::Scales),
            ScaleControl::AFrequency.code(),
            Source::new(Origin::Cli),
        );
        d.value = 432.5;
        assert_eq!(decode(&d, &pool(), true), "Scale Frequency Value 432.5");
    }

    #[test]
    fn toggles_render_as_on_off() {
        let mut d = Descriptor::read(
            Address::section(Section::Part(0)),
            PartControl::Portamento.code(),
            Source::new(Origin::Cli),
        );
        d.value = 1.0;
        assert_eq!(decode(&d, &pool(), true), "Part 1 Portamento - on");
        d.value = 0.0;
        assert_eq!(decode(&d, &pool(), true), "Part 1 Portamento - off");
    }

    #[test]
    fn reverb_time_phrase_without_value() {
        let d = Descriptor::read(
            Address::section(Section::SystemEffects)
                .with_engine(Engine::Effect(0))
                .with_kit(EffectKind::Reverb.to_wire()),
            2,
            Source::new(Origin::Cli),
        );
        assert_eq!(decode(&d, &pool(), false), "System Effect 1 Reverb Time");
    }

    #[test]
    fn lfo_phrase_names_the_group() {
        let d = Descriptor::read(
            Address::section(Section::Part(0))
                .with_engine(Engine::AddSynth)
                .with_insert(Insert::Lfo)
                .with_parameter(group::FREQUENCY),
            0,
            Source::new(Origin::Cli),
        );
        assert_eq!(
            decode(&d, &pool(), false),
            "Part 1 AddSynth LFO Frequency Rate"
        );
    }

    #[test]
    fn voice_engine_is_spelled_out() {
        let d = Descriptor::read(
            Address::section(Section::Part(0)).with_engine(Engine::AddVoice(1)),
            0,
            Source::new(Origin::Cli),
        );
        assert_eq!(decode(&d, &pool(), false), "Part 1 AddSynth Voice 2 Volume");
    }

    #[test]
    fn text_message_renders_its_payload() {
        let pool = pool();
        let id = pool.push("patch set loaded").unwrap();
        let mut d = Descriptor::read(
            Address::section(Section::Main),
            reserved::TEXT_MESSAGE,
            Source::new(Origin::ToAll),
        );
        d.msg = Some(id);
        assert_eq!(decode(&d, &pool, true), "patch set loaded");
        // The fetch was destructive.
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn scale_tuning_error_values_map_to_phrases() {
        let mut d = Descriptor::read(
            Address::section(Section::Scales),
            ScaleControl::Tuning.code(),
            Source::new(Origin::Cli),
        );
        d.value = -3.0;
        assert_eq!(decode(&d, &pool(), true), "Scale Tuning: file not found");
        d.value = -1.0;
        assert_eq!(decode(&d, &pool(), true), "Scale Tuning: value too small");
    }

    #[test]
    fn effect_type_selection_names_the_kind() {
        let mut d = Descriptor::read(
            Address::section(Section::SystemEffects).with_engine(Engine::Effect(1)),
            EffectControl::SelectKind.code(),
            Source::new(Origin::Cli),
        );
        d.value = 2.0;
        assert_eq!(decode(&d, &pool(), true), "System Effect 2 Type Echo");
    }

    #[test]
    fn unknown_control_is_described_not_invented() {
        let d = Descriptor::read(
            Address::section(Section::Main),
            77,
            Source::new(Origin::Cli),
        );
        let text = decode(&d, &pool(), true);
        assert!(text.starts_with("Unrecognised control 77"));
    }

    #[test]
    fn no_action_descriptor_decodes_to_a_notice() {
        let d = crate::encode::no_action();
        assert_eq!(decode(&d, &pool(), true), "No action taken");
    }
}
