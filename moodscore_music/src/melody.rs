// Melody pattern library.
//
// Each pattern is an independent strategy with the same signature:
// `fn(&MelodyContext, &mut ScoreRng) -> Vec<Note>`. A strategy walks a local
// beat cursor from 0 up to the slot's beat budget, deciding at each step
// whether to sound a note, which pool pitch to use, how long to hold it and
// how hard to play it. Patterns differ along three axes:
// - density: notes per beat and the chance of emitting at each step,
// - length bias: staccato through legato,
// - dynamic shaping: fixed, alternating, jittered or trending velocity.
//
// Strategies only emit notes at or after the slot start and always advance
// their cursor by a positive amount, so they terminate. A few add trailing
// notes (repeats, echoes, grace leaps) after the main note; `generate_melody`
// stably sorts the result by start time so every slot's notes come out in
// non-decreasing start order. Duration clipping is not done here; the
// assembler pushes notes through `Track::push`.
//
// The mood's `base_note_length` scales every sampled main-note length.
// Decorative sub-notes (tremolo segments, echoes, grace leaps, harmony
// doublings) keep their fixed lengths.
//
// `PATTERNS` is the registry from `MelodyPatternId` to strategy.

use crate::note::{Note, scale_velocity};
use crate::profile::{MelodyPatternId, MoodProfile};
use moodscore_prng::ScoreRng;

/// Timing and harmonic context for one chord slot.
#[derive(Debug, Clone, Copy)]
pub struct MelodyContext<'a> {
    /// Sorted note pool from `scale::note_pool`, at reference octave. Never empty.
    pub pool: &'a [i32],
    /// Beat budget for the slot.
    pub beats: f64,
    /// Slot start time in seconds.
    pub start: f64,
    pub seconds_per_beat: f64,
    pub mood: &'a MoodProfile,
}

impl MelodyContext<'_> {
    /// Absolute time of a slot-local beat position.
    pub fn time_at(&self, beat: f64) -> f64 {
        self.start + beat * self.seconds_per_beat
    }

    /// A main melody note: pool pitch shifted by the mood octave, length
    /// scaled by the mood's note-length bias.
    fn note(&self, pool_pitch: i32, beat: f64, length_beats: f64, velocity: i32) -> Note {
        let length = length_beats * self.mood.base_note_length;
        self.exact(pool_pitch + self.mood.pitch_offset(), beat, length, velocity)
    }

    /// A note at an absolute pitch with an unscaled length.
    fn exact(&self, pitch: i32, beat: f64, length_beats: f64, velocity: i32) -> Note {
        let start = self.time_at(beat);
        Note::new(pitch, velocity, start, start + length_beats * self.seconds_per_beat)
    }

    /// Beat position of an absolute time within this slot.
    fn beat_of(&self, time: f64) -> f64 {
        (time - self.start) / self.seconds_per_beat
    }

    fn pick(&self, rng: &mut ScoreRng) -> i32 {
        rng.pick(self.pool)
    }

    fn in_pool(&self, pitch: i32) -> bool {
        self.pool.contains(&pitch)
    }

    fn velocity(&self) -> i32 {
        self.mood.velocity_main as i32
    }

    fn scaled_velocity(&self, factor: f64) -> i32 {
        scale_velocity(self.mood.velocity_main, factor)
    }
}

/// A melody strategy.
pub type MelodyStrategy = fn(&MelodyContext<'_>, &mut ScoreRng) -> Vec<Note>;

/// Registry of every pattern id and its strategy.
pub const PATTERNS: &[(MelodyPatternId, MelodyStrategy)] = &[
    (MelodyPatternId::Active, active),
    (MelodyPatternId::Flowing, flowing),
    (MelodyPatternId::Rhythmic, rhythmic),
    (MelodyPatternId::Staccato, staccato),
    (MelodyPatternId::Dramatic, dramatic),
    (MelodyPatternId::Smooth, smooth),
    (MelodyPatternId::Reflective, reflective),
    (MelodyPatternId::Floating, floating),
    (MelodyPatternId::Intense, intense),
    (MelodyPatternId::Heroic, heroic),
    (MelodyPatternId::Bouncy, bouncy),
    (MelodyPatternId::Haunting, haunting),
    (MelodyPatternId::Uplifting, uplifting),
    (MelodyPatternId::Suspenseful, suspenseful),
    (MelodyPatternId::Quirky, quirky),
    (MelodyPatternId::Victorious, victorious),
    (MelodyPatternId::Regal, regal),
    (MelodyPatternId::Gentle, gentle),
];

/// Look up the strategy for a pattern id. Ids missing from the registry
/// use the gentle strategy.
pub fn strategy_for(id: MelodyPatternId) -> MelodyStrategy {
    PATTERNS
        .iter()
        .find(|(pid, _)| *pid == id)
        .map(|(_, s)| *s)
        .unwrap_or(gentle)
}

/// Run the mood's melody pattern for one slot. Output is sorted by start.
pub fn generate_melody(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = strategy_for(ctx.mood.melody_pattern_id)(ctx, rng);
    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    notes
}

// ---------------------------------------------------------------------------
// Length distributions
// ---------------------------------------------------------------------------

/// Four weighted length bands (short, medium, long, extra long), in beats.
struct LengthBands {
    weights: [f64; 4],
    ranges: [(f64, f64); 4],
}

impl LengthBands {
    fn sample(&self, rng: &mut ScoreRng) -> f64 {
        let (low, high) = self.ranges[rng.weighted_index(&self.weights)];
        rng.range_f64(low, high)
    }
}

const VARIED: LengthBands = LengthBands {
    weights: [0.3, 0.4, 0.2, 0.1],
    ranges: [(0.2, 0.4), (0.5, 0.7), (0.8, 1.0), (1.1, 1.8)],
};

const CLIPPED: LengthBands = LengthBands {
    weights: [0.5, 0.3, 0.15, 0.05],
    ranges: [(0.1, 0.3), (0.4, 0.6), (0.7, 0.9), (1.0, 1.2)],
};

const SUSTAINED: LengthBands = LengthBands {
    weights: [0.1, 0.4, 0.4, 0.1],
    ranges: [(0.3, 0.5), (0.6, 0.8), (0.9, 1.1), (1.2, 1.6)],
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Dense eighth-note activity with varied, mostly short lengths.
fn active(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let steps = (ctx.beats * 2.0) as usize;
    for step in 0..steps {
        if rng.random_bool(0.8) {
            let pitch = ctx.pick(rng);
            let length = VARIED.sample(rng) * 0.5;
            notes.push(ctx.note(pitch, step as f64 * 0.5, length, ctx.velocity()));
        }
    }
    notes
}

/// Long, connected phrases; the cursor moves with each note's length.
fn flowing(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut beat = 0.0;
    while beat < ctx.beats {
        let pitch = ctx.pick(rng);
        let length = VARIED.sample(rng);
        notes.push(ctx.note(pitch, beat, length, ctx.velocity()));
        beat += f64::max(0.5, length * 0.8);
    }
    notes
}

/// Triplet-grid syncopation with irregular gaps.
fn rhythmic(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut step = 0.0;
    while step < ctx.beats * 3.0 {
        if rng.random_bool(0.7) {
            let pitch = ctx.pick(rng);
            let length = CLIPPED.sample(rng) / 2.0;
            notes.push(ctx.note(pitch, step / 3.0, length, ctx.velocity()));
        }
        step += 0.5 + rng.next_f64() * 0.5;
    }
    notes
}

/// Short detached notes, slightly louder, with a small late offset.
fn staccato(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let steps = (ctx.beats * 2.0) as usize;
    for step in 0..steps {
        if rng.random_bool(0.75) {
            let pitch = ctx.pick(rng);
            let length = rng.range_f64(0.1, 0.3);
            let offset = rng.range_f64(0.0, 0.1);
            let velocity = ctx.scaled_velocity(1.1);
            notes.push(ctx.note(pitch, step as f64 * 0.5 + offset, length, velocity));
        }
    }
    notes
}

/// Alternating accented and soft notes over an irregular pulse.
fn dramatic(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut beat = 0.0;
    let mut accented = true;
    while beat < ctx.beats {
        if rng.random_bool(0.85) {
            let pitch = ctx.pick(rng);
            let (length, velocity) = if accented {
                (rng.range_f64(0.3, 1.0), ctx.scaled_velocity(1.2))
            } else {
                (rng.range_f64(0.1, 0.4), ctx.scaled_velocity(0.8))
            };
            notes.push(ctx.note(pitch, beat, length, velocity));
            accented = !accented;
        }
        beat += rng.pick(&[0.5, 0.75, 1.0]);
    }
    notes
}

/// Legato: each note starts slightly before the previous one ends. Starts
/// advance by at least `MIN_STEP` beats.
fn smooth(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    const MIN_STEP: f64 = 0.25;
    let mut notes = Vec::new();
    let mut beat = 0.0;
    while beat < ctx.beats {
        let pitch = ctx.pick(rng);
        let length = rng.range_f64(0.6, 1.2);
        let note = ctx.note(pitch, beat, length, ctx.velocity());
        beat = f64::max(beat + MIN_STEP, ctx.beat_of(note.end) - 0.05);
        notes.push(note);
    }
    notes
}

/// Medium-long notes with deliberate breathing pauses.
fn reflective(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut beat = 0.0;
    while beat < ctx.beats {
        if rng.random_bool(0.7) {
            let pitch = ctx.pick(rng);
            let length = rng.range_f64(0.7, 1.2);
            notes.push(ctx.note(pitch, beat, length, ctx.scaled_velocity(0.9)));
            beat += length;
            if rng.random_bool(0.3) {
                beat += rng.range_f64(0.5, 1.0);
            }
        } else {
            beat += 0.5;
        }
    }
    notes
}

/// Drifting line: small random steps from the previous pitch, pulled back
/// into the pool when it wanders more than an octave from the pool centre.
fn floating(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    const MAX_DRIFT: f64 = 12.0;
    let offset = ctx.mood.pitch_offset();
    let centre = ctx.pool.iter().sum::<i32>() as f64 / ctx.pool.len() as f64 + offset as f64;

    let mut notes = Vec::new();
    let mut previous = ctx.pick(rng) + offset;
    let mut beat = 0.0;
    while beat < ctx.beats {
        let mut pitch = previous + rng.pick(&[-4, -3, -2, -1, 1, 2, 3, 4]);
        if (pitch as f64 - centre).abs() > MAX_DRIFT {
            pitch = ctx.pick(rng) + offset;
        }
        let length = rng.range_f64(0.3, 1.5) * ctx.mood.base_note_length;
        let velocity = ctx.scaled_velocity(rng.range_f64(0.8, 1.0));
        notes.push(ctx.exact(pitch, beat, length, velocity));
        previous = pitch;
        beat += f64::max(0.25, length * rng.range_f64(0.6, 1.0));
    }
    notes
}

/// Fast, hard triplet-grid notes with occasional louder same-pitch repeats.
fn intense(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut step = 0.0;
    while step < ctx.beats * 3.0 {
        if rng.random_bool(0.85) {
            let pitch = ctx.pick(rng);
            let length = rng.range_f64(0.1, 0.4);
            let velocity = ctx.scaled_velocity(rng.range_f64(0.9, 1.3));
            let note = ctx.note(pitch, step / 3.0, length, velocity);
            notes.push(note);

            if rng.random_bool(0.3) {
                let repeat_beat = ctx.beat_of(note.end) + 0.05;
                let repeat_velocity = scale_velocity(note.velocity, 1.1);
                let repeat_pitch = note.pitch as i32;
                notes.push(ctx.exact(repeat_pitch, repeat_beat, length * 0.7, repeat_velocity));
            }
        }
        step += rng.range_f64(0.2, 0.5);
    }
    notes
}

/// One note per beat, alternating long-strong and short-lighter.
fn heroic(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let beats = ctx.beats.ceil() as usize;
    for beat in 0..beats {
        if rng.random_bool(0.75) {
            let pitch = ctx.pick(rng);
            let (length, velocity) = if beat % 2 == 0 {
                (rng.range_f64(0.8, 1.5), ctx.scaled_velocity(1.2))
            } else {
                (rng.range_f64(0.3, 0.5), ctx.scaled_velocity(0.9))
            };
            notes.push(ctx.note(pitch, beat as f64, length, velocity));
        }
    }
    notes
}

/// Springy sixteenth-grid notes with small timing jitter and occasional
/// grace leaps to a nearby pool pitch right after the note.
fn bouncy(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let limit = ctx.beats * 2.0;
    let mut step = 0.0;
    while step < limit {
        if rng.random_bool(0.8) {
            let pitch = ctx.pick(rng);
            let length = rng.range_f64(0.2, 0.4);
            let velocity = ctx.scaled_velocity(rng.range_f64(0.9, 1.1));
            let offset = rng.range_f64(0.0, 0.05);
            let note = ctx.note(pitch, step * 0.5 + offset, length, velocity);
            notes.push(note);

            if rng.random_bool(0.4) && step + 0.25 < limit {
                let leap = pitch + rng.pick(&[-3, -2, 2, 3, 4]);
                if ctx.in_pool(leap) {
                    let leap_beat = ctx.beat_of(note.end) + 0.02;
                    let leap_velocity = scale_velocity(note.velocity, 0.9);
                    notes.push(ctx.exact(
                        leap + ctx.mood.pitch_offset(),
                        leap_beat,
                        0.15,
                        leap_velocity,
                    ));
                }
            }
        }
        step += 0.5;
    }
    notes
}

/// Sparse, long, quiet notes with faint dissonant echoes.
fn haunting(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut beat = 0.0;
    while beat < ctx.beats {
        if rng.random_bool(0.65) {
            let pitch = ctx.pick(rng);
            let length = rng.range_f64(0.8, 1.8);
            let velocity = ctx.scaled_velocity(rng.range_f64(0.7, 0.9));
            let note = ctx.note(pitch, beat, length, velocity);
            notes.push(note);

            if rng.random_bool(0.3) {
                let echo = pitch + rng.pick(&[-1, 1, 6, 11]) + ctx.mood.pitch_offset();
                let echo_velocity = scale_velocity(note.velocity, 0.6);
                notes.push(ctx.exact(echo, beat + 0.2, 0.5, echo_velocity));
            }
        }
        beat += rng.range_f64(0.7, 1.3);
    }
    notes
}

/// Walks the sorted pool upwards in half-beat steps, restarting from the
/// bottom after the top.
fn uplifting(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut index = 0;
    let mut beat = 0.0;
    while beat < ctx.beats {
        if rng.random_bool(0.85) {
            if index >= ctx.pool.len() {
                index = 0;
            }
            let pitch = ctx.pool[index];
            index += 1;
            let length = rng.range_f64(0.4, 0.8);
            notes.push(ctx.note(pitch, beat, length, ctx.velocity()));
        }
        beat += 0.5;
    }
    notes
}

/// Low-register notes near the bottom of the pool, with tremolo bursts and
/// long silences.
fn suspenseful(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    const REGISTER: i32 = 5;
    let centre = ctx.pool[0] + 2;
    let nearby: Vec<i32> = ctx
        .pool
        .iter()
        .copied()
        .filter(|p| (p - centre).abs() <= REGISTER)
        .collect();
    let choices: &[i32] = if nearby.is_empty() { ctx.pool } else { &nearby };

    let mut notes = Vec::new();
    let mut beat = 0.0;
    while beat < ctx.beats {
        if rng.random_bool(0.7) {
            let pitch = rng.pick(choices);
            let length = if rng.random_bool(0.6) {
                rng.range_f64(0.3, 0.6)
            } else {
                rng.range_f64(1.0, 1.8)
            };

            if rng.random_bool(0.2) {
                let count = rng.range_usize(3, 6);
                let segment = length * ctx.mood.base_note_length / count as f64;
                let absolute = pitch + ctx.mood.pitch_offset();
                for t in 0..count {
                    let velocity = ctx.scaled_velocity(rng.range_f64(0.9, 1.0));
                    notes.push(ctx.exact(
                        absolute,
                        beat + t as f64 * segment,
                        0.8 * segment,
                        velocity,
                    ));
                }
            } else {
                notes.push(ctx.note(pitch, beat, length, ctx.velocity()));
            }
        }
        beat += if rng.random_bool(0.3) {
            rng.range_f64(1.0, 2.0)
        } else {
            rng.range_f64(0.5, 0.8)
        };
    }
    notes
}

/// Big leaps (more than a major third from the previous pitch) with sudden
/// loud or soft accents.
fn quirky(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    const MIN_LEAP: i32 = 3;
    const STEPS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];
    const STEP_WEIGHTS: [f64; 4] = [0.2, 0.4, 0.3, 0.1];

    let mut notes = Vec::new();
    let mut previous = ctx.pick(rng);
    let mut beat = 0.0;
    while beat < ctx.beats {
        if rng.random_bool(0.8) {
            let leaps: Vec<i32> = ctx
                .pool
                .iter()
                .copied()
                .filter(|p| (p - previous).abs() > MIN_LEAP)
                .collect();
            let pitch = if leaps.is_empty() {
                ctx.pick(rng)
            } else {
                rng.pick(&leaps)
            };
            previous = pitch;

            let length = if rng.random_bool(0.7) {
                rng.range_f64(0.1, 0.3)
            } else {
                rng.range_f64(0.5, 0.9)
            };
            let velocity = if rng.random_bool(0.2) {
                ctx.scaled_velocity(1.3)
            } else if rng.random_bool(0.2) {
                ctx.scaled_velocity(0.7)
            } else {
                ctx.velocity()
            };
            notes.push(ctx.note(pitch, beat, length, velocity));
        }
        beat += STEPS[rng.weighted_index(&STEP_WEIGHTS)];
    }
    notes
}

/// Rising scale walk with climactic long notes and occasional harmony.
fn victorious(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut index = 0;
    let mut beat = 0.0;
    while beat < ctx.beats {
        if rng.random_bool(0.85) {
            if index >= ctx.pool.len() {
                index = 0;
            }
            let pitch = ctx.pool[index];
            index += 1;

            let (length, velocity) = if rng.random_bool(0.3) {
                (rng.range_f64(0.8, 1.2), ctx.scaled_velocity(1.2))
            } else {
                (rng.range_f64(0.4, 0.7), ctx.velocity())
            };
            let note = ctx.note(pitch, beat, length, velocity);
            notes.push(note);

            if rng.random_bool(0.25) && ctx.pool.len() > 3 {
                let harmony = pitch + rng.pick(&[3, 4, 5, 7]);
                if ctx.in_pool(harmony) {
                    notes.push(Note::new(
                        harmony + ctx.mood.pitch_offset(),
                        scale_velocity(note.velocity, 0.8),
                        note.start,
                        note.end,
                    ));
                }
            }
        }
        beat += 0.5;
    }
    notes
}

/// Stately long/short pairs with light third/fifth flourishes.
fn regal(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let beats = ctx.beats.ceil() as usize;
    for beat in 0..beats {
        if rng.random_bool(0.75) {
            let pitch = ctx.pick(rng);
            let length = if beat % 2 == 0 {
                rng.range_f64(1.0, 1.5)
            } else {
                rng.range_f64(0.5, 0.8)
            };
            let velocity = ctx.scaled_velocity(rng.range_f64(0.95, 1.05));
            let note = ctx.note(pitch, beat as f64, length, velocity);
            notes.push(note);

            if rng.random_bool(0.3) {
                for step in [2, 4] {
                    if ctx.in_pool(pitch + step) {
                        notes.push(ctx.exact(
                            pitch + step + ctx.mood.pitch_offset(),
                            beat as f64 + 0.1,
                            0.2,
                            scale_velocity(note.velocity, 0.75),
                        ));
                    }
                }
            }
        }
    }
    notes
}

/// Default: relaxed medium-long notes at a moderate, slightly uneven pace.
fn gentle(ctx: &MelodyContext<'_>, rng: &mut ScoreRng) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut beat = 0.0;
    while beat < ctx.beats {
        if rng.random_bool(0.6) {
            let pitch = ctx.pick(rng);
            let length = SUSTAINED.sample(rng);
            notes.push(ctx.note(pitch, beat, length, ctx.velocity()));
        }
        beat += 0.7 + rng.next_f64() * 0.6;
    }
    notes
}
