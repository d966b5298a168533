// Bass line renderer.
//
// One octave below the chord root, never octave-shifted by the mood. The
// default line is a single note held for `sustain_fraction` of the slot;
// the rhythmic voicing style drives the bass too, restriking the root on
// every beat for 80% of the beat.

use crate::chord::Chord;
use crate::compose::SlotTiming;
use crate::note::Note;
use crate::profile::{MoodProfile, VoicingStyle};

/// Fraction of a beat each rhythmic bass note is held.
const RHYTHMIC_HOLD: f64 = 0.8;

pub fn render_bass(
    chord: &Chord,
    mood: &MoodProfile,
    slot: &SlotTiming,
    sustain_fraction: f64,
) -> Vec<Note> {
    let pitch = chord.root() - 12;
    let velocity = mood.velocity_bass as i32;

    if mood.chord_voicing_style == VoicingStyle::Rhythmic {
        (0..slot.beats)
            .map(|beat| {
                let beat = beat as f64;
                Note::new(
                    pitch,
                    velocity,
                    slot.time_at(beat),
                    slot.time_at(beat + RHYTHMIC_HOLD),
                )
            })
            .collect()
    } else {
        let end = slot.start + slot.duration() * sustain_fraction;
        vec![Note::new(pitch, velocity, slot.start, end)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MoodId;

    fn slot() -> SlotTiming {
        SlotTiming {
            index: 2,
            start: 8.0,
            beats: 4,
            seconds_per_beat: 0.5,
        }
    }

    #[test]
    fn test_default_bass_is_one_sustained_root() {
        let chord = Chord::from_pitches(vec![69, 72, 76]);
        let mood = MoodId::Sad.profile();
        let notes = render_bass(&chord, &mood, &slot(), 0.95);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch, 57);
        assert_eq!(notes[0].velocity, mood.velocity_bass);
        assert_eq!(notes[0].start, 8.0);
        assert!((notes[0].end - 9.9).abs() < 1e-9);
    }

    #[test]
    fn test_rhythmic_bass_hits_every_beat() {
        let chord = Chord::from_pitches(vec![60, 64, 67]);
        let mood = MoodId::Energetic.profile();
        assert_eq!(mood.chord_voicing_style, VoicingStyle::Rhythmic);
        let notes = render_bass(&chord, &mood, &slot(), 0.95);
        assert_eq!(notes.len(), 4);
        for (i, n) in notes.iter().enumerate() {
            assert_eq!(n.pitch, 48);
            assert!((n.start - (8.0 + i as f64 * 0.5)).abs() < 1e-9);
            assert!((n.duration() - 0.4).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bass_ignores_octave_shift() {
        let chord = Chord::from_pitches(vec![60, 64, 67]);
        let mood = MoodId::Dark.profile();
        assert_eq!(mood.octave_shift, -2);
        let notes = render_bass(&chord, &mood, &slot(), 0.95);
        assert_eq!(notes[0].pitch, 48);
    }
}
