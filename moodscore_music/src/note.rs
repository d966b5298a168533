// Note events and per-role tracks: the timeline representation.
//
// A composition is four independent role tracks (melody, chords, bass,
// drums), each an ordered list of `Note`s with absolute start/end times in
// seconds. This is the piano-roll form handed to MIDI export and rendering.
//
// `Track::push` is the single place where the duration bound is enforced:
// - notes starting at or after the bound are dropped,
// - notes running past the bound have their end clamped to it,
// - notes whose clamped length is not positive are dropped.
// Every generator routes its output through a track, so the policy is the
// same for every strategy. Pitch and velocity are clamped in `Note::new`.

use serde::{Deserialize, Serialize};

/// Lowest legal MIDI velocity for a sounding note.
pub const MIN_VELOCITY: u8 = 1;
/// Highest legal MIDI velocity / pitch.
pub const MAX_MIDI: u8 = 127;

/// The four instrument roles of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Melody = 0,
    Chords = 1,
    Bass = 2,
    Drums = 3,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Melody, Role::Chords, Role::Bass, Role::Drums];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Melody => "Melody",
            Role::Chords => "Chords",
            Role::Bass => "Bass",
            Role::Drums => "Drums",
        }
    }
}

/// One sounding note. Times are seconds from the start of the composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub velocity: u8,
    pub start: f64,
    pub end: f64,
}

impl Note {
    /// Build a note, clamping pitch to 0–127 and velocity to 1–127.
    ///
    /// Time validity is not checked here; that is `Track::push`'s job.
    pub fn new(pitch: i32, velocity: i32, start: f64, end: f64) -> Self {
        Note {
            pitch: pitch.clamp(0, MAX_MIDI as i32) as u8,
            velocity: velocity.clamp(MIN_VELOCITY as i32, MAX_MIDI as i32) as u8,
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Scale a base velocity by a dynamic factor, truncating like integer
/// MIDI velocity math does. The result is clamped later by `Note::new`.
pub fn scale_velocity(base: u8, factor: f64) -> i32 {
    (base as f64 * factor) as i32
}

/// An ordered note list for one role, bounded by the composition duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub role: Role,
    /// No note in this track ends after this time (seconds).
    pub bound: f64,
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(role: Role, bound: f64) -> Self {
        Track {
            role,
            bound,
            notes: Vec::new(),
        }
    }

    /// Append a note under the clipping policy. Returns whether it was kept.
    pub fn push(&mut self, note: Note) -> bool {
        if note.start.is_nan() || note.start < 0.0 || note.start >= self.bound {
            return false;
        }
        let end = note.end.min(self.bound);
        if end <= note.start {
            return false;
        }
        self.notes.push(Note { end, ..note });
        true
    }

    /// Push every note, returning how many survived clipping.
    pub fn extend<I: IntoIterator<Item = Note>>(&mut self, notes: I) -> usize {
        notes.into_iter().filter(|n| self.push(*n)).count()
    }

    /// Stable sort by start time. Notes spilling over from one slot can
    /// start after notes of the next, so the assembler sorts once at the end.
    pub fn sort_by_start(&mut self) {
        self.notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Convert a MIDI pitch to a note name with octave (e.g. "C4", "F#3").
pub fn pitch_name(pitch: u8) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
    ];
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", NAMES[(pitch % 12) as usize], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_clamps_pitch_and_velocity() {
        let n = Note::new(140, 0, 0.0, 1.0);
        assert_eq!(n.pitch, 127);
        assert_eq!(n.velocity, 1);
        let n = Note::new(-5, 300, 0.0, 1.0);
        assert_eq!(n.pitch, 0);
        assert_eq!(n.velocity, 127);
    }

    #[test]
    fn test_track_clips_end_to_bound() {
        let mut track = Track::new(Role::Melody, 4.0);
        assert!(track.push(Note::new(60, 80, 3.5, 5.0)));
        assert_eq!(track.notes[0].end, 4.0);
    }

    #[test]
    fn test_track_drops_notes_at_or_after_bound() {
        let mut track = Track::new(Role::Bass, 4.0);
        assert!(!track.push(Note::new(48, 80, 4.0, 4.5)));
        assert!(!track.push(Note::new(48, 80, 6.0, 7.0)));
        assert!(track.is_empty());
    }

    #[test]
    fn test_track_drops_degenerate_and_negative_notes() {
        let mut track = Track::new(Role::Chords, 10.0);
        assert!(!track.push(Note::new(60, 80, 1.0, 1.0)));
        assert!(!track.push(Note::new(60, 80, -0.05, 0.5)));
        assert!(!track.push(Note::new(60, 80, f64::NAN, 0.5)));
        assert_eq!(track.extend([Note::new(60, 80, 0.0, 0.5), Note::new(62, 80, 0.5, 0.4)]), 1);
    }

    #[test]
    fn test_sort_by_start_is_stable() {
        let mut track = Track::new(Role::Melody, 10.0);
        track.extend([
            Note::new(64, 80, 2.0, 3.0),
            Note::new(60, 80, 1.0, 2.0),
            Note::new(62, 80, 1.0, 1.5),
        ]);
        track.sort_by_start();
        let pitches: Vec<u8> = track.notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 62, 64]);
    }

    #[test]
    fn test_scale_velocity_truncates() {
        assert_eq!(scale_velocity(90, 0.8), 72);
        assert_eq!(scale_velocity(115, 1.3), 149);
    }

    #[test]
    fn test_pitch_name() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(69), "A4");
        assert_eq!(pitch_name(66), "F#4");
        assert_eq!(pitch_name(0), "C-1");
    }
}
