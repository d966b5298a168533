// Timeline assembler.
//
// `compose` turns a `CompositionRequest` into a `CompositionResult`: four
// role tracks bounded by the requested duration. The chord progression is
// parsed once (falling back to the default progression on empty or
// malformed text), then walked cyclically, one chord per slot, until the
// slot cursor reaches the duration.
//
// Slot scheduling is a small state machine, `SlotSchedule`:
//   Init -> Looping(cursor < duration) -> Done(cursor >= duration)
// A slot that starts before the bound is always generated in full; notes
// that cross the bound are clipped by `Track::push`, never by cutting a
// strategy short. Slot start times are computed as `index * slot_seconds`
// so rounding does not accumulate over long pieces.
//
// Melody (with its ornaments) and drums draw from two child generators
// forked from the caller's `ScoreRng`, melody first. Per slot, in this order:
// 1. chord voicing (`voicing.rs`)
// 2. bass (`bass.rs`)
// 3. melody strategy for the mood's pattern (`melody.rs`)
// 4. grace notes on that slot's melody, then per-beat embellishments
//    (`ornament.rs`)
// 5. drums (`drums.rs`)
//
// The only state is the caller's `ScoreRng`; the same request, registry and
// seed always yield the same result.

use crate::bass::render_bass;
use crate::chord::parse_progression_or_default;
use crate::config::ProfileRegistry;
use crate::drums::generate_drums;
use crate::melody::{MelodyContext, generate_melody};
use crate::note::{Role, Track};
use crate::ornament::{GraceSettings, beat_embellishments, inject_grace_notes};
use crate::profile::{MoodId, StyleId, StyleProfile};
use crate::scale::{ScaleKind, note_pool};
use crate::voicing::{VoicingContext, render_chord};
use log::{debug, warn};
use moodscore_prng::ScoreRng;
use serde::{Deserialize, Serialize};

/// What to compose. Range validation of duration and tempo belongs to the
/// caller; the engine only stops generating at the duration bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub style: StyleId,
    pub mood: MoodId,
    pub duration_seconds: f64,
    pub tempo_bpm: u32,
    /// Chord symbols separated by whitespace, e.g. "C Am F G". May be empty.
    #[serde(default)]
    pub chord_text: String,
}

impl CompositionRequest {
    pub fn new(style: StyleId, mood: MoodId, duration_seconds: f64, tempo_bpm: u32) -> Self {
        Self {
            style,
            mood,
            duration_seconds,
            tempo_bpm,
            chord_text: String::new(),
        }
    }

    /// Build from free-form names; unknown names resolve to the defaults.
    pub fn from_names(style: &str, mood: &str, duration_seconds: f64, tempo_bpm: u32) -> Self {
        Self::new(
            StyleId::resolve(style),
            MoodId::resolve(mood),
            duration_seconds,
            tempo_bpm,
        )
    }

    pub fn with_chords(mut self, chord_text: impl Into<String>) -> Self {
        self.chord_text = chord_text.into();
        self
    }
}

/// Timing of one chord slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotTiming {
    /// Position in the slot sequence; the chord is `progression[index % len]`.
    pub index: usize,
    /// Slot start in seconds.
    pub start: f64,
    pub beats: u32,
    pub seconds_per_beat: f64,
}

impl SlotTiming {
    pub fn duration(&self) -> f64 {
        self.beats as f64 * self.seconds_per_beat
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration()
    }

    /// Absolute time of a slot-local beat position.
    pub fn time_at(&self, beat: f64) -> f64 {
        self.start + beat * self.seconds_per_beat
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AssemblyState {
    Init,
    Looping { index: usize },
    Done,
}

/// Iterator over the slots needed to cover a duration.
#[derive(Debug, Clone)]
pub struct SlotSchedule {
    state: AssemblyState,
    duration: f64,
    beats: u32,
    seconds_per_beat: f64,
}

impl SlotSchedule {
    pub fn new(duration: f64, beats: u32, seconds_per_beat: f64) -> Self {
        Self {
            state: AssemblyState::Init,
            duration,
            beats,
            seconds_per_beat,
        }
    }

    fn slot_seconds(&self) -> f64 {
        self.beats as f64 * self.seconds_per_beat
    }
}

impl Iterator for SlotSchedule {
    type Item = SlotTiming;

    fn next(&mut self) -> Option<SlotTiming> {
        loop {
            match self.state {
                AssemblyState::Init => {
                    let step = self.slot_seconds();
                    let step_ok = step.is_finite() && step > 0.0;
                    self.state = if !step_ok {
                        warn!("slot length {step} s is not positive, nothing to schedule");
                        AssemblyState::Done
                    } else if !self.duration.is_finite() {
                        warn!("duration {} s is not finite, nothing to schedule", self.duration);
                        AssemblyState::Done
                    } else {
                        AssemblyState::Looping { index: 0 }
                    };
                }
                AssemblyState::Looping { index } => {
                    let cursor = index as f64 * self.slot_seconds();
                    if cursor >= self.duration {
                        self.state = AssemblyState::Done;
                        continue;
                    }
                    self.state = AssemblyState::Looping { index: index + 1 };
                    return Some(SlotTiming {
                        index,
                        start: cursor,
                        beats: self.beats,
                        seconds_per_beat: self.seconds_per_beat,
                    });
                }
                AssemblyState::Done => return None,
            }
        }
    }
}

/// The four role tracks of a finished composition plus what produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub style: StyleId,
    pub mood: MoodId,
    /// Instrumentation used, after config overrides.
    pub instruments: StyleProfile,
    pub scale_kind: ScaleKind,
    /// Pitch class of the first chord's root, used as the key tonic.
    pub tonic_pitch_class: u8,
    pub duration_seconds: f64,
    /// Realized tempo: requested tempo times the mood's multiplier.
    pub tempo_bpm: f64,
    pub slot_count: usize,
    pub slot_seconds: f64,
    pub melody: Track,
    pub chords: Track,
    pub bass: Track,
    pub drums: Track,
}

impl CompositionResult {
    pub fn track(&self, role: Role) -> &Track {
        match role {
            Role::Melody => &self.melody,
            Role::Chords => &self.chords,
            Role::Bass => &self.bass,
            Role::Drums => &self.drums,
        }
    }

    /// Tracks in role order.
    pub fn tracks(&self) -> [&Track; 4] {
        Role::ALL.map(|role| self.track(role))
    }

    pub fn note_count(&self) -> usize {
        self.tracks().iter().map(|t| t.len()).sum()
    }

    /// Total time spanned by generated slots. Reaches the duration whenever
    /// the tempo is positive.
    pub fn covered_seconds(&self) -> f64 {
        self.slot_count as f64 * self.slot_seconds
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Compose with the builtin tables and default timing.
pub fn compose(request: &CompositionRequest, rng: &mut ScoreRng) -> CompositionResult {
    compose_with(request, &ProfileRegistry::builtin(), rng)
}

/// Compose with a resolved registry (config timing plus profile overrides).
pub fn compose_with(
    request: &CompositionRequest,
    registry: &ProfileRegistry,
    rng: &mut ScoreRng,
) -> CompositionResult {
    let config = registry.config();
    let mood = registry.mood(request.mood);
    let style = registry.style(request.style);
    let progression = parse_progression_or_default(&request.chord_text, config.reference_pitch);

    let tempo_bpm = request.tempo_bpm as f64 * mood.tempo_multiplier;
    let seconds_per_beat = 60.0 / tempo_bpm;
    let bound = request.duration_seconds;
    let grace = GraceSettings {
        probability: mood.ornament_probability,
        length_seconds: config.grace_note_seconds,
        max_notes: config.max_grace_notes,
    };

    let mut melody = Track::new(Role::Melody, bound);
    let mut chords = Track::new(Role::Chords, bound);
    let mut bass = Track::new(Role::Bass, bound);
    let mut drums = Track::new(Role::Drums, bound);
    let mut slot_count = 0;
    let mut melody_rng = rng.fork();
    let mut drum_rng = rng.fork();

    for slot in SlotSchedule::new(bound, config.beats_per_chord, seconds_per_beat) {
        let chord = progression.cyclic(slot.index);
        let pool = note_pool(chord);

        chords.extend(render_chord(&VoicingContext {
            chord,
            slot: &slot,
            mood: &mood,
            sustain_fraction: config.sustain_fraction,
            spread_offset_beats: config.spread_offset_beats,
        }));
        bass.extend(render_bass(chord, &mood, &slot, config.sustain_fraction));

        let context = MelodyContext {
            pool: &pool,
            beats: slot.beats as f64,
            start: slot.start,
            seconds_per_beat,
            mood: &mood,
        };
        let mut line = generate_melody(&context, &mut melody_rng);
        let graces = inject_grace_notes(&line, slot.start, &grace, &mut melody_rng);
        line.extend(graces);
        line.extend(beat_embellishments(chord, &mood, &slot, &mut melody_rng));
        line.sort_by(|a, b| a.start.total_cmp(&b.start));
        melody.extend(line);

        drums.extend(generate_drums(&style, mood.chord_voicing_style, &slot, &mut drum_rng));
        slot_count += 1;
    }

    for track in [&mut melody, &mut chords, &mut bass, &mut drums] {
        track.sort_by_start();
    }

    debug!(
        "composed {} {} for {:.1} s at {:.1} bpm: {} slots, \
         {} melody / {} chord / {} bass / {} drum notes",
        request.mood,
        request.style,
        bound,
        tempo_bpm,
        slot_count,
        melody.len(),
        chords.len(),
        bass.len(),
        drums.len()
    );

    let tonic_pitch_class = progression.cyclic(0).root().rem_euclid(12) as u8;
    CompositionResult {
        style: request.style,
        mood: request.mood,
        instruments: style,
        scale_kind: mood.scale_kind,
        tonic_pitch_class,
        duration_seconds: bound,
        tempo_bpm,
        slot_count,
        slot_seconds: config.beats_per_chord as f64 * seconds_per_beat,
        melody,
        chords,
        bass,
        drums,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_covers_duration() {
        let slots: Vec<SlotTiming> = SlotSchedule::new(16.0, 4, 0.5).collect();
        assert_eq!(slots.len(), 8);
        assert_eq!(slots[0].start, 0.0);
        assert_eq!(slots[7].end(), 16.0);
        for (i, s) in slots.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn test_partial_slot_is_still_scheduled() {
        let slots: Vec<SlotTiming> = SlotSchedule::new(5.0, 4, 0.5).collect();
        assert_eq!(slots.len(), 3);
        assert!(slots.last().unwrap().end() >= 5.0);
    }

    #[test]
    fn test_degenerate_schedules_are_empty() {
        assert_eq!(SlotSchedule::new(0.0, 4, 0.5).count(), 0);
        assert_eq!(SlotSchedule::new(-3.0, 4, 0.5).count(), 0);
        assert_eq!(SlotSchedule::new(f64::NAN, 4, 0.5).count(), 0);
        assert_eq!(SlotSchedule::new(f64::INFINITY, 4, 0.5).count(), 0);
        assert_eq!(SlotSchedule::new(f64::NEG_INFINITY, 4, 0.5).count(), 0);
        assert_eq!(SlotSchedule::new(10.0, 4, f64::INFINITY).count(), 0);
        assert_eq!(SlotSchedule::new(10.0, 0, 0.5).count(), 0);
    }

    #[test]
    fn test_tempo_multiplier_sets_realized_tempo() {
        let request = CompositionRequest::new(StyleId::Pop, MoodId::Sad, 10.0, 100);
        let result = compose(&request, &mut ScoreRng::new(1));
        assert!((result.tempo_bpm - 80.0).abs() < 1e-9);
        assert!((result.slot_seconds - 3.0).abs() < 1e-9);
        assert_eq!(result.slot_count, 4);
    }

    #[test]
    fn test_zero_tempo_yields_empty_result() {
        let request = CompositionRequest::new(StyleId::Pop, MoodId::Happy, 10.0, 0);
        let result = compose(&request, &mut ScoreRng::new(1));
        assert_eq!(result.slot_count, 0);
        assert_eq!(result.note_count(), 0);
    }

    #[test]
    fn test_infinite_duration_yields_empty_result() {
        let request = CompositionRequest::new(StyleId::Pop, MoodId::Happy, f64::INFINITY, 120);
        let result = compose(&request, &mut ScoreRng::new(1));
        assert_eq!(result.slot_count, 0);
        assert_eq!(result.note_count(), 0);
    }

    #[test]
    fn test_drums_do_not_depend_on_melody_draws() {
        // Different chords change what the melody strategies draw; the drum
        // stream is forked separately and stays the same.
        let a = CompositionRequest::new(StyleId::Rock, MoodId::Energetic, 12.0, 120)
            .with_chords("C G");
        let b = a.clone().with_chords("Am7 Fmaj7 Dm G7");
        let result_a = compose(&a, &mut ScoreRng::new(21));
        let result_b = compose(&b, &mut ScoreRng::new(21));
        assert!(!result_a.drums.is_empty());
        assert_eq!(result_a.drums, result_b.drums);
        assert_ne!(result_a.chords, result_b.chords);
    }

    #[test]
    fn test_tracks_are_sorted_by_start() {
        let request = CompositionRequest::new(StyleId::Rock, MoodId::Passionate, 30.0, 140);
        let result = compose(&request, &mut ScoreRng::new(11));
        for track in result.tracks() {
            assert!(track.notes.windows(2).all(|w| w[0].start <= w[1].start));
        }
    }

    #[test]
    fn test_from_names_falls_back() {
        let request = CompositionRequest::from_names("polka", "Grumpy", 8.0, 120);
        assert_eq!(request.style, StyleId::Pop);
        assert_eq!(request.mood, MoodId::Happy);
    }

    #[test]
    fn test_tonic_follows_first_chord() {
        let request = CompositionRequest::new(StyleId::Jazz, MoodId::Calm, 8.0, 120)
            .with_chords("Dm7 G7 Cmaj7");
        let result = compose(&request, &mut ScoreRng::new(2));
        assert_eq!(result.tonic_pitch_class, 2);
    }

    #[test]
    fn test_result_json_export() {
        let request = CompositionRequest::new(StyleId::Pop, MoodId::Happy, 4.0, 120);
        let result = compose(&request, &mut ScoreRng::new(5));
        let json = result.to_json().unwrap();
        let restored: CompositionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.slot_count, result.slot_count);
        assert_eq!(restored.mood, MoodId::Happy);
        for (a, b) in restored.tracks().iter().zip(result.tracks()) {
            assert_eq!(a.len(), b.len());
            assert!(a.notes.iter().zip(&b.notes).all(|(x, y)| x.pitch == y.pitch));
        }
    }
}
