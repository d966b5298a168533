// Style and mood profile tables.
//
// A request names a style (instrumentation + rhythmic busyness) and a mood
// (dynamics, register, tempo feel, accompaniment texture, melodic pattern).
// Both are closed enumerations resolved to plain profile structs; every
// generator reads the struct, never the id. Name lookup is the only place
// where free-form strings enter, and it always resolves: unknown names log
// a warning and fall back to the designated default entry (pop, happy,
// normal voicing, gentle pattern).
//
// The builtin tables below can be overridden per entry from the engine
// config (see `config.rs`).

use crate::scale::ScaleKind;
use log::warn;
use serde::{Deserialize, Serialize};

/// Generates `ALL`, `name()`, `from_name()` and `resolve()` for a
/// name-keyed enumeration with a designated fallback variant.
macro_rules! named_enum {
    (
        $ty:ident, $kind:literal, default = $default:ident,
        { $($variant:ident => $name:literal),+ $(,)? }
    ) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }

            /// Exact (case-insensitive) lookup.
            pub fn from_name(name: &str) -> Option<Self> {
                let lowered = name.trim().to_ascii_lowercase();
                Self::ALL.iter().copied().find(|v| v.name() == lowered)
            }

            /// Lookup that never fails: unknown names resolve to the default.
            pub fn resolve(name: &str) -> Self {
                Self::from_name(name).unwrap_or_else(|| {
                    warn!(
                        "unknown {} {:?}, falling back to {:?}",
                        $kind,
                        name,
                        $ty::$default.name()
                    );
                    $ty::$default
                })
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                $ty::$default
            }
        }

        impl From<String> for $ty {
            fn from(name: String) -> Self {
                $ty::resolve(&name)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleId {
    Pop,
    Rock,
    Classical,
    Electronic,
    Jazz,
}

named_enum!(StyleId, "style", default = Pop, {
    Pop => "pop",
    Rock => "rock",
    Classical => "classical",
    Electronic => "electronic",
    Jazz => "jazz",
});

/// Instrumentation and percussion behaviour of a style.
///
/// Instruments are General MIDI program numbers (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub melody_program: u8,
    pub chord_program: u8,
    pub bass_program: u8,
    pub drums_enabled: bool,
    /// 0.0–1.0; drives extra kick/snare hits and hi-hat density.
    pub rhythm_complexity: f64,
}

impl StyleId {
    pub fn profile(self) -> StyleProfile {
        let (melody_program, chord_program, bass_program, drums_enabled, rhythm_complexity) =
            match self {
                // Acoustic Grand Piano / String Ensemble / Acoustic Bass
                StyleId::Pop => (0, 48, 32, true, 0.5),
                // Overdriven Guitar / Distortion Guitar / Electric Bass (finger)
                StyleId::Rock => (29, 30, 33, true, 0.8),
                // Acoustic Grand Piano / String Ensemble / Contrabass
                StyleId::Classical => (0, 48, 43, false, 0.3),
                // Lead 2 (sawtooth) / Synth Strings / Synth Bass 2
                StyleId::Electronic => (81, 51, 39, true, 0.7),
                // Alto Sax / Acoustic Grand Piano / Acoustic Bass
                StyleId::Jazz => (66, 0, 32, true, 0.6),
            };
        StyleProfile {
            melody_program,
            chord_program,
            bass_program,
            drums_enabled,
            rhythm_complexity,
        }
    }
}

// ---------------------------------------------------------------------------
// Voicing styles and melody patterns
// ---------------------------------------------------------------------------

/// How the accompaniment arranges a chord within its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum VoicingStyle {
    Normal,
    Spread,
    Arpeggiated,
    Rhythmic,
    Sparse,
    Dissonant,
    Full,
    Percussive,
    Playful,
    Staccato,
}

named_enum!(VoicingStyle, "voicing style", default = Normal, {
    Normal => "normal",
    Spread => "spread",
    Arpeggiated => "arpeggiated",
    Rhythmic => "rhythmic",
    Sparse => "sparse",
    Dissonant => "dissonant",
    Full => "full",
    Percussive => "percussive",
    Playful => "playful",
    Staccato => "staccato",
});

/// Identifier of a melody generation strategy (see `melody.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum MelodyPatternId {
    Active,
    Flowing,
    Rhythmic,
    Staccato,
    Dramatic,
    Smooth,
    Reflective,
    Floating,
    Intense,
    Heroic,
    Bouncy,
    Haunting,
    Uplifting,
    Suspenseful,
    Quirky,
    Victorious,
    Regal,
    Gentle,
}

named_enum!(MelodyPatternId, "melody pattern", default = Gentle, {
    Active => "active",
    Flowing => "flowing",
    Rhythmic => "rhythmic",
    Staccato => "staccato",
    Dramatic => "dramatic",
    Smooth => "smooth",
    Reflective => "reflective",
    Floating => "floating",
    Intense => "intense",
    Heroic => "heroic",
    Bouncy => "bouncy",
    Haunting => "haunting",
    Uplifting => "uplifting",
    Suspenseful => "suspenseful",
    Quirky => "quirky",
    Victorious => "victorious",
    Regal => "regal",
    Gentle => "gentle",
});

// ---------------------------------------------------------------------------
// Moods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodId {
    Happy,
    Sad,
    Energetic,
    Calm,
    Romantic,
    Mysterious,
    Dramatic,
    Peaceful,
    Nostalgic,
    Dreamy,
    Passionate,
    Melancholic,
    Epic,
    Playful,
    Dark,
    Hopeful,
    Tense,
    Ethereal,
    Whimsical,
    Aggressive,
    Triumphant,
    Majestic,
}

named_enum!(MoodId, "mood", default = Happy, {
    Happy => "happy",
    Sad => "sad",
    Energetic => "energetic",
    Calm => "calm",
    Romantic => "romantic",
    Mysterious => "mysterious",
    Dramatic => "dramatic",
    Peaceful => "peaceful",
    Nostalgic => "nostalgic",
    Dreamy => "dreamy",
    Passionate => "passionate",
    Melancholic => "melancholic",
    Epic => "epic",
    Playful => "playful",
    Dark => "dark",
    Hopeful => "hopeful",
    Tense => "tense",
    Ethereal => "ethereal",
    Whimsical => "whimsical",
    Aggressive => "aggressive",
    Triumphant => "triumphant",
    Majestic => "majestic",
});

/// Everything a mood contributes to generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub scale_kind: ScaleKind,
    pub velocity_main: u8,
    pub velocity_bass: u8,
    pub velocity_chord: u8,
    /// Octaves added to melody and chord pitches (bass is unaffected).
    pub octave_shift: i32,
    /// Multiplier on every sampled melody note length.
    pub base_note_length: f64,
    /// Multiplier on the requested tempo.
    pub tempo_multiplier: f64,
    pub chord_voicing_style: VoicingStyle,
    /// 0.0–1.0; chance of grace notes per slot and of embellishments per beat.
    pub ornament_probability: f64,
    pub melody_pattern_id: MelodyPatternId,
}

impl MoodProfile {
    /// Melody/chord pitch offset from `octave_shift`.
    pub fn pitch_offset(&self) -> i32 {
        self.octave_shift * 12
    }
}

#[allow(clippy::too_many_arguments)]
fn mood(
    scale_kind: ScaleKind,
    velocity_main: u8,
    velocity_bass: u8,
    velocity_chord: u8,
    octave_shift: i32,
    base_note_length: f64,
    tempo_multiplier: f64,
    chord_voicing_style: VoicingStyle,
    ornament_probability: f64,
    melody_pattern_id: MelodyPatternId,
) -> MoodProfile {
    MoodProfile {
        scale_kind,
        velocity_main,
        velocity_bass,
        velocity_chord,
        octave_shift,
        base_note_length,
        tempo_multiplier,
        chord_voicing_style,
        ornament_probability,
        melody_pattern_id,
    }
}

impl MoodId {
    pub fn profile(self) -> MoodProfile {
        use MelodyPatternId as P;
        use ScaleKind::{Major, Minor};
        use VoicingStyle as V;
        match self {
            MoodId::Happy => mood(Major, 90, 100, 80, 0, 0.8, 1.0, V::Normal, 0.3, P::Active),
            MoodId::Sad => mood(Minor, 70, 85, 65, -1, 0.9, 0.8, V::Spread, 0.15, P::Flowing),
            MoodId::Energetic => {
                mood(Major, 100, 110, 90, 0, 0.7, 1.2, V::Rhythmic, 0.4, P::Rhythmic)
            }
            MoodId::Calm => mood(Major, 65, 75, 60, -1, 1.0, 0.7, V::Arpeggiated, 0.1, P::Smooth),
            MoodId::Romantic => {
                mood(Major, 80, 85, 75, 0, 0.9, 0.9, V::Arpeggiated, 0.25, P::Flowing)
            }
            MoodId::Mysterious => {
                mood(Minor, 75, 85, 70, -1, 0.85, 0.75, V::Sparse, 0.2, P::Staccato)
            }
            MoodId::Dramatic => mood(Minor, 95, 105, 90, 0, 0.8, 1.0, V::Full, 0.3, P::Dramatic),
            MoodId::Peaceful => {
                mood(Major, 60, 70, 55, -1, 1.1, 0.6, V::Arpeggiated, 0.05, P::Smooth)
            }
            MoodId::Nostalgic => {
                mood(Major, 70, 80, 65, 0, 0.85, 0.8, V::Normal, 0.2, P::Reflective)
            }
            MoodId::Dreamy => {
                mood(Major, 65, 75, 60, 0, 0.95, 0.75, V::Arpeggiated, 0.15, P::Floating)
            }
            MoodId::Passionate => {
                mood(Minor, 100, 110, 95, 0, 0.8, 1.1, V::Rhythmic, 0.35, P::Intense)
            }
            MoodId::Melancholic => {
                mood(Minor, 65, 75, 60, -1, 0.9, 0.7, V::Sparse, 0.1, P::Flowing)
            }
            MoodId::Epic => mood(Minor, 110, 120, 100, 0, 0.85, 1.0, V::Full, 0.4, P::Heroic),
            MoodId::Playful => mood(Major, 85, 90, 80, 1, 0.7, 1.1, V::Staccato, 0.45, P::Bouncy),
            MoodId::Dark => mood(Minor, 80, 90, 75, -2, 0.9, 0.85, V::Sparse, 0.2, P::Haunting),
            MoodId::Hopeful => {
                mood(Major, 85, 90, 80, 0, 0.85, 0.9, V::Normal, 0.25, P::Uplifting)
            }
            MoodId::Tense => {
                mood(Minor, 85, 95, 80, -1, 0.75, 1.05, V::Dissonant, 0.3, P::Suspenseful)
            }
            MoodId::Ethereal => {
                mood(Major, 60, 70, 55, 1, 1.2, 0.65, V::Arpeggiated, 0.15, P::Floating)
            }
            MoodId::Whimsical => mood(Major, 80, 85, 75, 1, 0.75, 1.0, V::Playful, 0.5, P::Quirky),
            MoodId::Aggressive => {
                mood(Minor, 115, 125, 110, 0, 0.7, 1.3, V::Percussive, 0.3, P::Intense)
            }
            MoodId::Triumphant => {
                mood(Major, 105, 115, 100, 0, 0.85, 1.1, V::Full, 0.35, P::Victorious)
            }
            MoodId::Majestic => mood(Major, 100, 110, 95, 0, 0.9, 0.95, V::Full, 0.25, P::Regal),
        }
    }
}
