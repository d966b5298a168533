// Chord voicing renderer.
//
// Turns one chord into accompaniment notes for one slot according to the
// mood's `VoicingStyle`. Styles vary note count (adding doublings or a
// clashing second), how long notes are held, and whether the chord repeats
// within the slot. Sustained styles hold for `sustain_fraction` of the slot
// so consecutive chords do not blur together.
//
// Chord pitches get the mood's octave shift; velocity is `velocity_chord`.
// Voicings are deterministic: all randomness in a composition lives in the
// melody, ornaments and drums.

use crate::chord::Chord;
use crate::compose::SlotTiming;
use crate::note::{Note, scale_velocity};
use crate::profile::{MoodProfile, VoicingStyle};

/// Everything a voicing needs for one slot.
#[derive(Debug, Clone, Copy)]
pub struct VoicingContext<'a> {
    pub chord: &'a Chord,
    pub slot: &'a SlotTiming,
    pub mood: &'a MoodProfile,
    /// Fraction of the slot a sustained chord is held for.
    pub sustain_fraction: f64,
    /// Stagger between successive tones of a spread chord, in beats.
    pub spread_offset_beats: f64,
}

impl VoicingContext<'_> {
    /// Chord pitches with the mood's octave shift applied.
    fn tones(&self) -> Vec<i32> {
        let offset = self.mood.pitch_offset();
        self.chord.pitches.iter().map(|&p| p as i32 + offset).collect()
    }

    fn root(&self) -> i32 {
        self.chord.root() + self.mood.pitch_offset()
    }

    fn sustained(&self, pitches: &[i32], velocity: i32) -> Vec<Note> {
        let start = self.slot.start;
        let end = start + self.slot.duration() * self.sustain_fraction;
        pitches
            .iter()
            .map(|&p| Note::new(p, velocity, start, end))
            .collect()
    }

    /// The whole chord struck on a regular grid of `step` beats, each hit
    /// lasting `length` beats. `accent` maps the hit index to a velocity.
    fn repeated(&self, step: f64, length: f64, accent: impl Fn(usize) -> i32) -> Vec<Note> {
        let tones = self.tones();
        let hits = (self.slot.beats as f64 / step).round() as usize;
        let mut notes = Vec::with_capacity(hits * tones.len());
        for hit in 0..hits {
            let beat = hit as f64 * step;
            let start = self.slot.time_at(beat);
            let end = self.slot.time_at(beat + length);
            let velocity = accent(hit);
            notes.extend(tones.iter().map(|&p| Note::new(p, velocity, start, end)));
        }
        notes
    }

    fn velocity(&self) -> i32 {
        self.mood.velocity_chord as i32
    }
}

/// A voicing strategy.
pub type VoicingStrategy = fn(&VoicingContext<'_>) -> Vec<Note>;

/// Registry of every voicing style and its strategy.
pub const VOICINGS: &[(VoicingStyle, VoicingStrategy)] = &[
    (VoicingStyle::Normal, normal),
    (VoicingStyle::Spread, spread),
    (VoicingStyle::Arpeggiated, arpeggiated),
    (VoicingStyle::Rhythmic, rhythmic),
    (VoicingStyle::Sparse, sparse),
    (VoicingStyle::Dissonant, dissonant),
    (VoicingStyle::Full, full),
    (VoicingStyle::Percussive, percussive),
    (VoicingStyle::Playful, playful),
    (VoicingStyle::Staccato, staccato),
];

/// Look up the strategy for a voicing style, defaulting to `normal`.
pub fn strategy_for(style: VoicingStyle) -> VoicingStrategy {
    VOICINGS
        .iter()
        .find(|(s, _)| *s == style)
        .map(|(_, f)| *f)
        .unwrap_or(normal)
}

/// Render the mood's voicing of one chord for one slot.
pub fn render_chord(ctx: &VoicingContext<'_>) -> Vec<Note> {
    strategy_for(ctx.mood.chord_voicing_style)(ctx)
}

/// Block chord held for most of the slot.
fn normal(ctx: &VoicingContext<'_>) -> Vec<Note> {
    ctx.sustained(&ctx.tones(), ctx.velocity())
}

/// Tones enter one after another, bottom up, and release together.
fn spread(ctx: &VoicingContext<'_>) -> Vec<Note> {
    let end = ctx.slot.start + ctx.slot.duration() * ctx.sustain_fraction;
    ctx.tones()
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let start = ctx.slot.time_at(i as f64 * ctx.spread_offset_beats);
            Note::new(p, ctx.velocity(), start, end)
        })
        .collect()
}

/// Tones cycled one per half beat across the slot.
fn arpeggiated(ctx: &VoicingContext<'_>) -> Vec<Note> {
    let tones = ctx.tones();
    let steps = ctx.slot.beats as usize * 2;
    (0..steps)
        .map(|k| {
            let beat = k as f64 * 0.5;
            Note::new(
                tones[k % tones.len()],
                ctx.velocity(),
                ctx.slot.time_at(beat),
                ctx.slot.time_at(beat + 0.5 * ctx.sustain_fraction),
            )
        })
        .collect()
}

/// Chord restruck every beat, held for 80% of the beat.
fn rhythmic(ctx: &VoicingContext<'_>) -> Vec<Note> {
    ctx.repeated(1.0, 0.8, |_| ctx.velocity())
}

/// Only the outer voices: root and top tone.
fn sparse(ctx: &VoicingContext<'_>) -> Vec<Note> {
    let tones = ctx.tones();
    let mut pitches = vec![tones[0]];
    if tones.len() > 1 {
        pitches.push(tones[tones.len() - 1]);
    }
    ctx.sustained(&pitches, ctx.velocity())
}

/// Block chord with a minor second rubbing against the root.
fn dissonant(ctx: &VoicingContext<'_>) -> Vec<Note> {
    let mut pitches = ctx.tones();
    pitches.push(ctx.root() + 1);
    ctx.sustained(&pitches, ctx.velocity())
}

/// Block chord doubled an octave below and above the root.
fn full(ctx: &VoicingContext<'_>) -> Vec<Note> {
    let root = ctx.root();
    let mut pitches = vec![root - 12];
    pitches.extend(ctx.tones());
    pitches.push(root + 12);
    ctx.sustained(&pitches, ctx.velocity())
}

/// Short stabs every half beat, accented on the beat.
fn percussive(ctx: &VoicingContext<'_>) -> Vec<Note> {
    let base = ctx.mood.velocity_chord;
    ctx.repeated(0.5, 0.15, |hit| {
        if hit % 2 == 0 {
            base as i32
        } else {
            scale_velocity(base, 0.8)
        }
    })
}

/// Light off-beat hits.
fn playful(ctx: &VoicingContext<'_>) -> Vec<Note> {
    let tones = ctx.tones();
    let mut notes = Vec::new();
    for beat in 0..ctx.slot.beats {
        let start = ctx.slot.time_at(beat as f64 + 0.5);
        let end = ctx.slot.time_at(beat as f64 + 0.8);
        let velocity = scale_velocity(ctx.mood.velocity_chord, 0.9);
        notes.extend(tones.iter().map(|&p| Note::new(p, velocity, start, end)));
    }
    notes
}

/// Detached chord on every beat.
fn staccato(ctx: &VoicingContext<'_>) -> Vec<Note> {
    ctx.repeated(1.0, 0.3, |_| ctx.velocity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MoodId;

    fn c_major() -> Chord {
        Chord::from_pitches(vec![60, 64, 67])
    }

    fn slot() -> SlotTiming {
        SlotTiming {
            index: 0,
            start: 4.0,
            beats: 4,
            seconds_per_beat: 0.5,
        }
    }

    fn render(style: VoicingStyle, octave_shift: i32) -> Vec<Note> {
        let chord = c_major();
        let slot = slot();
        let mood = MoodProfile {
            chord_voicing_style: style,
            octave_shift,
            ..MoodId::Happy.profile()
        };
        render_chord(&VoicingContext {
            chord: &chord,
            slot: &slot,
            mood: &mood,
            sustain_fraction: 0.95,
            spread_offset_beats: 0.2,
        })
    }

    #[test]
    fn test_registry_covers_every_style() {
        for &style in VoicingStyle::ALL {
            assert!(VOICINGS.iter().any(|(s, _)| *s == style), "{style} missing");
        }
    }

    #[test]
    fn test_normal_holds_block_chord() {
        let notes = render(VoicingStyle::Normal, 0);
        assert_eq!(notes.len(), 3);
        for n in &notes {
            assert_eq!(n.start, 4.0);
            assert!((n.end - (4.0 + 2.0 * 0.95)).abs() < 1e-9);
            assert_eq!(n.velocity, 80);
        }
    }

    #[test]
    fn test_spread_staggers_tones() {
        let notes = render(VoicingStyle::Spread, 0);
        let starts: Vec<f64> = notes.iter().map(|n| n.start).collect();
        assert!((starts[1] - starts[0] - 0.1).abs() < 1e-9);
        assert!((starts[2] - starts[0] - 0.2).abs() < 1e-9);
        assert!(notes.iter().all(|n| n.end == notes[0].end));
    }

    #[test]
    fn test_octave_shift_applies_to_chords() {
        let notes = render(VoicingStyle::Normal, -1);
        let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![48, 52, 55]);
    }

    #[test]
    fn test_repeating_styles_hit_counts() {
        assert_eq!(render(VoicingStyle::Rhythmic, 0).len(), 4 * 3);
        assert_eq!(render(VoicingStyle::Staccato, 0).len(), 4 * 3);
        assert_eq!(render(VoicingStyle::Percussive, 0).len(), 8 * 3);
        assert_eq!(render(VoicingStyle::Playful, 0).len(), 4 * 3);
        assert_eq!(render(VoicingStyle::Arpeggiated, 0).len(), 8);
    }

    #[test]
    fn test_note_count_variants() {
        assert_eq!(render(VoicingStyle::Sparse, 0).len(), 2);
        let dissonant = render(VoicingStyle::Dissonant, 0);
        assert!(dissonant.iter().any(|n| n.pitch == 61));
        let full = render(VoicingStyle::Full, 0);
        let pitches: Vec<u8> = full.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![48, 60, 64, 67, 72]);
    }

    #[test]
    fn test_percussive_accents_downbeats() {
        let notes = render(VoicingStyle::Percussive, 0);
        assert_eq!(notes[0].velocity, 80);
        assert_eq!(notes[3].velocity, 64);
    }

    #[test]
    fn test_all_styles_stay_inside_slot() {
        for &style in VoicingStyle::ALL {
            for n in render(style, 0) {
                assert!(n.start >= 4.0 && n.end <= 6.0 + 1e-9, "{style}: {n:?}");
                assert!(n.end > n.start);
            }
        }
    }
}
