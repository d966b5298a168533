// End-to-end composition scenarios.
//
// Drives the public `compose` entry point the way a caller would and checks
// the properties every result must have: notes inside the duration bound,
// legal velocities, full slot coverage, seed determinism, chord-text
// recovery and style-gated drums. Runs every mood against every style.

use moodscore_music::chord::{CHORD_TYPES, ChordProgression, parse_progression};
use moodscore_music::config::{EngineConfig, ProfileRegistry};
use moodscore_music::note::Role;
use moodscore_music::profile::{MoodId, StyleId};
use moodscore_music::{CompositionRequest, CompositionResult, compose, compose_with};
use moodscore_prng::ScoreRng;

fn run(
    style: StyleId,
    mood: MoodId,
    duration: f64,
    tempo: u32,
    chords: &str,
    seed: u64,
) -> CompositionResult {
    let request = CompositionRequest::new(style, mood, duration, tempo).with_chords(chords);
    compose(&request, &mut ScoreRng::new(seed))
}

/// Helper: assert the bound, velocity and coverage invariants.
fn assert_well_formed(result: &CompositionResult) {
    let bound = result.duration_seconds;
    for track in result.tracks() {
        for note in &track.notes {
            assert!(note.start >= 0.0, "{:?}: start {} < 0", track.role, note.start);
            assert!(note.start < note.end, "{:?}: empty note {note:?}", track.role);
            assert!(note.end <= bound, "{:?}: end {} past {bound}", track.role, note.end);
            assert!((1..=127).contains(&note.velocity), "{:?}: velocity", track.role);
            assert!(note.pitch <= 127);
        }
    }
    assert!(
        result.covered_seconds() >= bound,
        "slots cover {} of {bound} s",
        result.covered_seconds()
    );
}

#[test]
fn scenario_a_happy_pop_sixteen_seconds() {
    let result = run(StyleId::Pop, MoodId::Happy, 16.0, 120, "C G Am F", 1);
    assert_well_formed(&result);

    assert_eq!(result.slot_seconds, 2.0);
    assert_eq!(result.slot_count, 8);
    assert_eq!(result.covered_seconds(), 16.0);
    assert!(!result.chords.is_empty());
    assert!(!result.melody.is_empty());
    assert!(!result.drums.is_empty());

    // One sustained bass root per slot, cycling C G A F an octave down.
    let bass: Vec<u8> = result.bass.notes.iter().map(|n| n.pitch).collect();
    assert_eq!(bass, vec![48, 55, 57, 53, 48, 55, 57, 53]);
}

#[test]
fn scenario_b_empty_chord_text_uses_default_progression() {
    for duration in [8.0, 32.0] {
        let result = run(StyleId::Pop, MoodId::Happy, duration, 120, "", 2);
        assert_well_formed(&result);
        assert_eq!(result.slot_count % ChordProgression::default().len(), 0);
        assert_eq!(result.bass.len(), result.slot_count);
        let roots: Vec<u8> = result.bass.notes.iter().map(|n| n.pitch).collect();
        for (i, root) in roots.iter().enumerate() {
            assert_eq!(*root, [48, 55, 57, 48][i % 4]);
        }
    }
}

#[test]
fn scenario_c_unknown_suffix_degrades_to_major_triad() {
    let result = run(StyleId::Pop, MoodId::Happy, 8.0, 120, "Cxyz", 3);
    assert_well_formed(&result);
    assert!(result.bass.notes.iter().all(|n| n.pitch == 48));
    let mut pitches: Vec<u8> = result.chords.notes.iter().map(|n| n.pitch).collect();
    pitches.sort_unstable();
    pitches.dedup();
    assert_eq!(pitches, vec![60, 64, 67]);
}

#[test]
fn scenario_d_drumless_style_is_silent_for_every_mood() {
    assert!(!StyleId::Classical.profile().drums_enabled);
    for &mood in MoodId::ALL {
        for seed in 0..3 {
            let result = run(StyleId::Classical, mood, 20.0, 140, "C F G C", seed);
            assert!(result.drums.is_empty(), "{mood} produced drums");
        }
    }
}

#[test]
fn every_mood_and_style_is_well_formed() {
    for &style in StyleId::ALL {
        for &mood in MoodId::ALL {
            for (seed, duration) in [(11, 7.3), (12, 30.0)] {
                let result = run(style, mood, duration, 120, "Am F C G", seed);
                assert_well_formed(&result);
                assert!(!result.melody.is_empty(), "{style}/{mood}: no melody");
                assert!(!result.chords.is_empty(), "{style}/{mood}: no chords");
                assert!(!result.bass.is_empty(), "{style}/{mood}: no bass");
                assert_eq!(result.drums.is_empty(), !style.profile().drums_enabled);
            }
        }
    }
}

#[test]
fn same_seed_is_identical() {
    for &mood in MoodId::ALL {
        let a = run(StyleId::Jazz, mood, 24.0, 110, "Dm7 G7 Cmaj7 A7", 77);
        let b = run(StyleId::Jazz, mood, 24.0, 110, "Dm7 G7 Cmaj7 A7", 77);
        assert_eq!(a, b, "{mood} not deterministic");
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }
}

#[test]
fn different_seeds_differ() {
    let a = run(StyleId::Rock, MoodId::Energetic, 30.0, 120, "", 1);
    let b = run(StyleId::Rock, MoodId::Energetic, 30.0, 120, "", 2);
    assert_ne!(a.melody, b.melody);
}

#[test]
fn malformed_chord_text_matches_default_progression() {
    let default = run(StyleId::Electronic, MoodId::Dreamy, 20.0, 128, "", 9);
    for text in ["H7 C", "C G x7", "   ", "7th"] {
        let recovered = run(StyleId::Electronic, MoodId::Dreamy, 20.0, 128, text, 9);
        assert_eq!(recovered, default, "chord text {text:?}");
    }
}

#[test]
fn registered_suffixes_have_matching_chord_sizes() {
    for (suffix, intervals) in CHORD_TYPES {
        let parsed = parse_progression(&format!("D{suffix}"), 60).unwrap();
        assert!(parsed.diagnostics.is_empty(), "suffix {suffix:?} flagged");
        assert_eq!(parsed.progression.chords()[0].pitches.len(), intervals.len());
    }
}

#[test]
fn partial_last_slot_is_clipped_not_dropped() {
    // 5 s at 120 BPM: slots at 0, 2 and 4 s; the third only half fits.
    let result = run(StyleId::Rock, MoodId::Happy, 5.0, 120, "C G", 4);
    assert_well_formed(&result);
    assert_eq!(result.slot_count, 3);
    let last_bass = result.bass.notes.last().unwrap();
    assert_eq!(last_bass.start, 4.0);
    assert_eq!(last_bass.end, 5.0);
}

#[test]
fn config_overrides_flow_through_compose() {
    let mut config = EngineConfig {
        beats_per_chord: 2,
        ..EngineConfig::default()
    };
    config.moods.insert(
        MoodId::Happy,
        moodscore_music::profile::MoodProfile {
            octave_shift: 1,
            ..MoodId::Happy.profile()
        },
    );
    let registry = ProfileRegistry::new(config);
    let request = CompositionRequest::new(StyleId::Pop, MoodId::Happy, 8.0, 120).with_chords("C");
    let result = compose_with(&request, &registry, &mut ScoreRng::new(5));

    assert_eq!(result.slot_count, 8);
    assert!(result.chords.notes.iter().all(|n| [72, 76, 79].contains(&n.pitch)));
    // Bass ignores the octave shift.
    assert!(result.track(Role::Bass).notes.iter().all(|n| n.pitch == 48));
}
