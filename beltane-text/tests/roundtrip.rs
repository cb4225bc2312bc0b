//! Encode/decode round trips over the command grammar.
//!
//! A decoded sentence is not required to be byte-identical to the input
//! line (abbreviations expand, capitalisation normalises), but it must
//! re-encode to an equivalent descriptor.

use beltane_bus::TextPool;
use beltane_text::{decode, encode_line};
use beltane_types::{Kind, Origin};

const COMMANDS: &[&str] = &[
    "main volume 90",
    "main detune",
    "part 1 volume 64",
    "part 16 panning 32",
    "part 2 velocity 100",
    "part 3 portamento on",
    "part 1 enable",
    "part 1 addsynth volume 85",
    "part 1 addsynth stereo on",
    "part 4 addsynth voice 3 detune -20",
    "part 1 subsynth bandwidth 44",
    "part 2 padsynth octave -1",
    "part 1 addsynth lfo rate 70",
    "part 1 addsynth lfo frequency depth 12",
    "part 1 subsynth filter q 40",
    "part 1 padsynth filter center 88",
    "part 1 addsynth envelope attack time 20",
    "part 1 addsynth envelope frequency release time 30",
    "part 2 subsynth envelope bandwidth sustain level 90",
    "part 1 addsynth voice 1 oscillator phase 64",
    "part 1 addsynth resonance maxdb 20",
    "system effect 1 reverb time 50",
    "system effect 2 echo feedback 70",
    "insert effect 3 chorus depth 60",
    "part 1 effect 1 distortion drive 80",
    "scale frequency 432.5",
    "scale shift -2",
    "config buffer 256",
    "bank instrument 42",
    "mlearn minimum 2 10",
];

#[test]
fn every_command_round_trips_through_its_sentence() {
    let pool = TextPool::new();
    for line in COMMANDS {
        let first = encode_line(line, Origin::Cli, &pool)
            .unwrap_or_else(|e| panic!("'{line}' failed to encode: {e}"));
        let sentence = decode(&first.descriptor, &pool, false);
        let second = encode_line(&sentence, Origin::Cli, &pool)
            .unwrap_or_else(|e| panic!("'{sentence}' (from '{line}') failed to re-encode: {e}"));
        assert_eq!(
            first.descriptor.address, second.descriptor.address,
            "address drifted for '{line}' via '{sentence}'"
        );
        assert_eq!(
            first.descriptor.control, second.descriptor.control,
            "control drifted for '{line}' via '{sentence}'"
        );
    }
}

#[test]
fn values_survive_the_sentence_too() {
    let pool = TextPool::new();
    let first = encode_line("part 1 volume 64", Origin::Cli, &pool).unwrap();
    // As the engine would echo it: a resolved integer write.
    let mut resolved = first.descriptor;
    resolved.kind = Kind::write().with(Kind::INTEGER);
    let sentence = decode(&resolved, &pool, true);
    assert_eq!(sentence, "Part 1 Volume Value 64");

    // "Value" is not part of the input grammar; everything around it is.
    let trimmed = sentence.replace(" Value", "");
    let second = encode_line(&trimmed, Origin::Cli, &pool).unwrap();
    assert_eq!(second.descriptor.address, first.descriptor.address);
    assert_eq!(second.descriptor.value, 64.0);
}

#[test]
fn abbreviated_and_full_spellings_agree() {
    let pool = TextPool::new();
    for (short, long) in [
        ("p 1 v 64", "part 1 volume 64"),
        ("sys eff 1 rev ti", "system effect 1 reverb time"),
        ("p 2 adds lfo ra 70", "part 2 addsynth lfo rate 70"),
        ("sc freq 440", "scale frequency 440"),
    ] {
        let a = encode_line(short, Origin::Cli, &pool).unwrap();
        let b = encode_line(long, Origin::Cli, &pool).unwrap();
        assert_eq!(a, b, "'{short}' vs '{long}'");
    }
}
