// Ornament layer: grace notes and per-beat embellishments.
//
// `inject_grace_notes` runs once per slot. With the mood's ornament
// probability it picks a bounded number of the slot's melody notes and puts
// a short grace note just before each, a step or a third away, ending
// exactly where the base note begins. A grace note that would start before
// the slot start is discarded, so ornaments never reach back into the
// previous slot or before time zero.
//
// `beat_embellishments` adds light chord-tone accents an octave above the
// chord on individual beats, again gated by the ornament probability.

use crate::chord::Chord;
use crate::compose::SlotTiming;
use crate::note::{Note, scale_velocity};
use crate::profile::MoodProfile;
use moodscore_prng::ScoreRng;

/// Semitone offsets a grace note may take from its base note.
pub const GRACE_OFFSETS: [i32; 5] = [-2, -1, 1, 2, 4];

/// Grace note placement parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraceSettings {
    pub probability: f64,
    /// Grace note length in seconds.
    pub length_seconds: f64,
    /// Upper bound on grace notes per slot.
    pub max_notes: usize,
}

/// Grace notes for one slot's melody. `melody` must be that slot's notes.
pub fn inject_grace_notes(
    melody: &[Note],
    slot_start: f64,
    settings: &GraceSettings,
    rng: &mut ScoreRng,
) -> Vec<Note> {
    if melody.is_empty() || !rng.random_bool(settings.probability) {
        return Vec::new();
    }
    let count = (melody.len() / 3).min(settings.max_notes);
    let mut graces = Vec::with_capacity(count);
    for _ in 0..count {
        let base = rng.pick(melody);
        let pitch = base.pitch as i32 + rng.pick(&GRACE_OFFSETS);
        let start = base.start - settings.length_seconds;
        if start >= slot_start && start >= 0.0 {
            graces.push(Note::new(
                pitch,
                scale_velocity(base.velocity, 0.9),
                start,
                base.start,
            ));
        }
    }
    graces
}

/// Per-beat chord-tone accents an octave up, each half a beat long.
pub fn beat_embellishments(
    chord: &Chord,
    mood: &MoodProfile,
    slot: &SlotTiming,
    rng: &mut ScoreRng,
) -> Vec<Note> {
    let velocity = scale_velocity(mood.velocity_main, 0.8);
    let offset = 12 + mood.pitch_offset();
    let mut notes = Vec::new();
    for beat in 0..slot.beats {
        if rng.random_bool(mood.ornament_probability) {
            let pitch = rng.pick(&chord.pitches) as i32 + offset;
            let beat = beat as f64;
            notes.push(Note::new(
                pitch,
                velocity,
                slot.time_at(beat),
                slot.time_at(beat + 0.5),
            ));
        }
    }
    notes
}
