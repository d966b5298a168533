// Percussion pattern generator.
//
// Each slot is split into two sub-beats per beat. On every sub-beat:
// - kick on even sub-beats, plus occasional extra kicks on odd ones when
//   the style's rhythm complexity is above 0.6,
// - snare on odd sub-beats, plus occasional extra snares when complexity
//   is above 0.7,
// - closed hi-hat with probability equal to the complexity.
// The first sub-beat of a slot also gets a crash when the mood uses the
// rhythmic voicing style. Styles without drums produce nothing.
//
// Pitches are General MIDI percussion keys (channel 10).

use crate::compose::SlotTiming;
use crate::note::Note;
use crate::profile::{StyleProfile, VoicingStyle};
use moodscore_prng::ScoreRng;

pub const KICK: i32 = 36;
pub const SNARE: i32 = 38;
pub const CLOSED_HIHAT: i32 = 42;
pub const CRASH: i32 = 49;

const HIT_SECONDS: f64 = 0.1;
const CRASH_SECONDS: f64 = 0.3;

/// Drum hits for one slot.
pub fn generate_drums(
    style: &StyleProfile,
    voicing: VoicingStyle,
    slot: &SlotTiming,
    rng: &mut ScoreRng,
) -> Vec<Note> {
    if !style.drums_enabled {
        return Vec::new();
    }
    let complexity = style.rhythm_complexity;
    let sub_beats = slot.beats as usize * 2;
    let mut notes = Vec::new();
    let mut hit = |pitch: i32, velocity: i32, start: f64, length: f64| {
        notes.push(Note::new(pitch, velocity, start, start + length));
    };

    for i in 0..sub_beats {
        let start = slot.time_at(i as f64 * 0.5);
        let even = i % 2 == 0;

        if even || (complexity > 0.6 && rng.random_bool(0.3)) {
            hit(KICK, 100, start, HIT_SECONDS);
        }
        if !even || (complexity > 0.7 && rng.random_bool(0.2)) {
            hit(SNARE, 90, start, HIT_SECONDS);
        }
        if rng.random_bool(complexity) {
            hit(CLOSED_HIHAT, 80, start, HIT_SECONDS);
        }
        if i == 0 && voicing == VoicingStyle::Rhythmic {
            hit(CRASH, 90, start, CRASH_SECONDS);
        }
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::StyleId;

    fn slot() -> SlotTiming {
        SlotTiming {
            index: 0,
            start: 2.0,
            beats: 4,
            seconds_per_beat: 0.5,
        }
    }

    fn count(notes: &[Note], pitch: i32) -> usize {
        notes.iter().filter(|n| n.pitch as i32 == pitch).count()
    }

    #[test]
    fn test_disabled_drums_are_silent() {
        let classical = StyleId::Classical.profile();
        assert!(!classical.drums_enabled);
        for seed in 0..20 {
            let mut rng = ScoreRng::new(seed);
            let notes = generate_drums(&classical, VoicingStyle::Rhythmic, &slot(), &mut rng);
            assert!(notes.is_empty());
        }
    }

    #[test]
    fn test_backbeat_skeleton() {
        let simple = StyleProfile {
            rhythm_complexity: 0.0,
            ..StyleId::Pop.profile()
        };
        let notes = generate_drums(&simple, VoicingStyle::Normal, &slot(), &mut ScoreRng::new(1));
        assert_eq!(count(&notes, KICK), 4);
        assert_eq!(count(&notes, SNARE), 4);
        assert_eq!(count(&notes, CLOSED_HIHAT), 0);
        assert_eq!(count(&notes, CRASH), 0);
    }

    #[test]
    fn test_full_complexity_hats_every_sub_beat() {
        let busy = StyleProfile {
            rhythm_complexity: 1.0,
            ..StyleId::Rock.profile()
        };
        let notes = generate_drums(&busy, VoicingStyle::Normal, &slot(), &mut ScoreRng::new(1));
        assert_eq!(count(&notes, CLOSED_HIHAT), 8);
        assert!(count(&notes, KICK) >= 4);
        assert!(count(&notes, SNARE) >= 4);
    }

    #[test]
    fn test_crash_on_first_sub_beat_for_rhythmic_voicing() {
        let pop = StyleId::Pop.profile();
        let notes = generate_drums(&pop, VoicingStyle::Rhythmic, &slot(), &mut ScoreRng::new(9));
        let crashes: Vec<&Note> = notes.iter().filter(|n| n.pitch as i32 == CRASH).collect();
        assert_eq!(crashes.len(), 1);
        assert_eq!(crashes[0].start, 2.0);
        assert!((crashes[0].duration() - 0.3).abs() < 1e-9);
    }
}
