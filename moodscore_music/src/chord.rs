// Chord grammar: chord-symbol text to absolute-pitch chords.
//
// Grammar, one token per whitespace-separated word:
//
//   token      := root [accidental] [suffix]
//   root       := A | B | C | D | E | F | G      (lowercase accepted)
//   accidental := '#' | 'b'
//   suffix     := a key of CHORD_TYPES, or empty
//
// The root maps to a pitch class (C=0 .. B=11), the accidental shifts it by
// one semitone mod 12, and the suffix selects a root-relative interval set.
// Chords are voiced at a fixed reference pitch (C4 = 60 by default), so the
// same progression always lands in the same register regardless of what
// came before.
//
// Recovery rules:
// - unknown suffix: that chord becomes a major triad and a `ChordDiagnostic`
//   is recorded (logged by the recovering wrapper),
// - bad root letter: the strict parser fails with `MalformedChordToken`,
// - empty text: the strict parser fails with `EmptyProgression`.
// `parse_progression_or_default` turns both failures into the fixed
// default progression, so a composition request never fails on chord text.

use crate::error::ChordParseError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Reference pitch that pitch class 0 is voiced at (C4).
pub const DEFAULT_REFERENCE_PITCH: u8 = 60;

/// Fallback progression: C G Am C, a I–V–vi–I cadence.
pub const DEFAULT_PROGRESSION_TEXT: &str = "C G Am C";

const MAJOR_TRIAD: &[i32] = &[0, 4, 7];

/// Registered chord-type suffixes and their root-relative intervals.
pub const CHORD_TYPES: &[(&str, &[i32])] = &[
    ("", MAJOR_TRIAD),
    ("maj", MAJOR_TRIAD),
    ("M", MAJOR_TRIAD),
    ("min", &[0, 3, 7]),
    ("m", &[0, 3, 7]),
    ("dim", &[0, 3, 6]),
    ("°", &[0, 3, 6]),
    ("aug", &[0, 4, 8]),
    ("+", &[0, 4, 8]),
    ("maj7", &[0, 4, 7, 11]),
    ("M7", &[0, 4, 7, 11]),
    ("min7", &[0, 3, 7, 10]),
    ("m7", &[0, 3, 7, 10]),
    ("dom7", &[0, 4, 7, 10]),
    ("7", &[0, 4, 7, 10]),
    ("dim7", &[0, 3, 6, 9]),
    ("maj9", &[0, 4, 7, 11, 14]),
    ("min9", &[0, 3, 7, 10, 14]),
    ("9", &[0, 4, 7, 10, 14]),
    ("sus2", &[0, 2, 7]),
    ("sus4", &[0, 5, 7]),
    ("add9", &[0, 4, 7, 14]),
    ("maj6", &[0, 4, 7, 9]),
    ("6", &[0, 4, 7, 9]),
    ("min6", &[0, 3, 7, 9]),
    ("m6", &[0, 3, 7, 9]),
    ("m7b5", &[0, 3, 6, 10]),
    ("aug7", &[0, 4, 8, 10]),
    ("7sus4", &[0, 5, 7, 10]),
    ("9sus4", &[0, 5, 7, 10, 14]),
    ("add11", &[0, 4, 7, 17]),
    ("maj13", &[0, 4, 7, 11, 14, 21]),
    ("min11", &[0, 3, 7, 10, 14, 17]),
    ("13", &[0, 4, 7, 10, 14, 21]),
    ("7b9", &[0, 4, 7, 10, 13]),
    ("7#9", &[0, 4, 7, 10, 15]),
];

/// Look up the intervals registered for a chord-type suffix.
pub fn chord_intervals(suffix: &str) -> Option<&'static [i32]> {
    CHORD_TYPES
        .iter()
        .find(|(name, _)| *name == suffix)
        .map(|(_, intervals)| *intervals)
}

/// Pitch class of a root letter, or None for anything outside A–G.
pub fn root_pitch_class(letter: char) -> Option<i32> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// A chord voiced as absolute MIDI pitches, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    /// Symbol the chord was parsed from (e.g. "Am7"); empty for synthetic chords.
    pub symbol: String,
    /// Absolute pitches, root first, ascending. Never empty.
    pub pitches: Vec<u8>,
}

impl Chord {
    /// Build a chord directly from pitches. The first pitch is the root.
    ///
    /// Panics if `pitches` is empty.
    pub fn from_pitches(pitches: Vec<u8>) -> Self {
        assert!(!pitches.is_empty(), "a chord needs at least one pitch");
        Chord {
            symbol: String::new(),
            pitches,
        }
    }

    /// Voice `intervals` above root pitch class `root_pc` at `reference_pitch`.
    pub fn voice(symbol: &str, root_pc: i32, intervals: &[i32], reference_pitch: u8) -> Self {
        let base = reference_pitch as i32 + root_pc.rem_euclid(12);
        let pitches = intervals
            .iter()
            .map(|iv| (base + iv).clamp(0, 127) as u8)
            .collect();
        Chord {
            symbol: symbol.to_string(),
            pitches,
        }
    }

    pub fn root(&self) -> i32 {
        self.pitches[0] as i32
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// A non-empty, cyclic chord sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordProgression {
    chords: Vec<Chord>,
}

impl ChordProgression {
    /// Wrap a chord list. Returns None for an empty list.
    pub fn new(chords: Vec<Chord>) -> Option<Self> {
        if chords.is_empty() {
            None
        } else {
            Some(ChordProgression { chords })
        }
    }

    /// The fixed fallback progression (C G Am C) at `reference_pitch`.
    pub fn default_at(reference_pitch: u8) -> Self {
        let chords = vec![
            Chord::voice("C", 0, MAJOR_TRIAD, reference_pitch),
            Chord::voice("G", 7, MAJOR_TRIAD, reference_pitch),
            Chord::voice("Am", 9, &[0, 3, 7], reference_pitch),
            Chord::voice("C", 0, MAJOR_TRIAD, reference_pitch),
        ];
        ChordProgression { chords }
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Chord for slot `index`, wrapping past the end.
    pub fn cyclic(&self, index: usize) -> &Chord {
        &self.chords[index % self.chords.len()]
    }
}

impl Default for ChordProgression {
    fn default() -> Self {
        ChordProgression::default_at(DEFAULT_REFERENCE_PITCH)
    }
}

/// A recognized root with an unregistered suffix, degraded to a major triad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordDiagnostic {
    pub token: String,
    pub suffix: String,
    pub position: usize,
}

/// Strict parse output: the progression plus any non-fatal diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProgression {
    pub progression: ChordProgression,
    pub diagnostics: Vec<ChordDiagnostic>,
}

/// Parse a single chord token.
///
/// Returns the chord and, if the suffix was not registered, a diagnostic.
pub fn parse_chord_token(
    token: &str,
    position: usize,
    reference_pitch: u8,
) -> Result<(Chord, Option<ChordDiagnostic>), ChordParseError> {
    let malformed = || ChordParseError::MalformedChordToken {
        token: token.to_string(),
        position,
    };

    let mut chars = token.chars();
    let letter = chars.next().ok_or_else(malformed)?;
    let mut root_pc = root_pitch_class(letter).ok_or_else(malformed)?;

    let rest = chars.as_str();
    let suffix = match rest.chars().next() {
        Some('#') => {
            root_pc += 1;
            &rest[1..]
        }
        Some('b') => {
            root_pc -= 1;
            &rest[1..]
        }
        _ => rest,
    };

    match chord_intervals(suffix) {
        Some(intervals) => Ok((Chord::voice(token, root_pc, intervals, reference_pitch), None)),
        None => {
            let diagnostic = ChordDiagnostic {
                token: token.to_string(),
                suffix: suffix.to_string(),
                position,
            };
            Ok((
                Chord::voice(token, root_pc, MAJOR_TRIAD, reference_pitch),
                Some(diagnostic),
            ))
        }
    }
}

/// Strictly parse chord text.
pub fn parse_progression(
    text: &str,
    reference_pitch: u8,
) -> Result<ParsedProgression, ChordParseError> {
    let mut chords = Vec::new();
    let mut diagnostics = Vec::new();
    for (position, token) in text.split_whitespace().enumerate() {
        let (chord, diagnostic) = parse_chord_token(token, position, reference_pitch)?;
        chords.push(chord);
        diagnostics.extend(diagnostic);
    }
    let progression = ChordProgression::new(chords).ok_or(ChordParseError::EmptyProgression)?;
    Ok(ParsedProgression {
        progression,
        diagnostics,
    })
}

/// Parse chord text, recovering from every failure.
///
/// Unknown suffixes are logged; malformed roots and empty text yield the
/// default progression.
pub fn parse_progression_or_default(text: &str, reference_pitch: u8) -> ChordProgression {
    match parse_progression(text, reference_pitch) {
        Ok(parsed) => {
            for d in &parsed.diagnostics {
                warn!(
                    "unknown chord type {:?} in token {:?} (position {}), using major triad",
                    d.suffix, d.token, d.position
                );
            }
            debug!(
                "parsed chord progression {:?} -> {} chords",
                text,
                parsed.progression.len()
            );
            parsed.progression
        }
        Err(ChordParseError::EmptyProgression) => {
            debug!("empty chord progression, using default {DEFAULT_PROGRESSION_TEXT:?}");
            ChordProgression::default_at(reference_pitch)
        }
        Err(e) => {
            warn!("{e}; using default progression {DEFAULT_PROGRESSION_TEXT:?}");
            ChordProgression::default_at(reference_pitch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitches(p: &ChordProgression) -> Vec<Vec<u8>> {
        p.chords().iter().map(|c| c.pitches.clone()).collect()
    }

    #[test]
    fn test_default_progression_pitches() {
        let p = ChordProgression::default();
        assert_eq!(
            pitches(&p),
            vec![
                vec![60, 64, 67],
                vec![67, 71, 74],
                vec![69, 72, 76],
                vec![60, 64, 67],
            ]
        );
    }

    #[test]
    fn test_default_text_parses_to_default_progression() {
        let parsed = parse_progression(DEFAULT_PROGRESSION_TEXT, 60).unwrap();
        assert_eq!(pitches(&parsed.progression), pitches(&ChordProgression::default()));
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_roots_and_accidentals() {
        let parsed = parse_progression("C C# Db D Eb E F F# G Ab A Bb B", 60).unwrap();
        let roots: Vec<i32> = parsed.progression.chords().iter().map(|c| c.root()).collect();
        assert_eq!(roots, vec![60, 61, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71]);
    }

    #[test]
    fn test_flat_wraps_below_c() {
        // Cb is pitch class 11, voiced above the reference pitch.
        let (chord, _) = parse_chord_token("Cb", 0, 60).unwrap();
        assert_eq!(chord.root(), 71);
    }

    #[test]
    fn test_minor_and_seventh_suffixes() {
        let parsed = parse_progression("Am Dm7 G7 Cmaj7", 60).unwrap();
        assert_eq!(
            pitches(&parsed.progression),
            vec![
                vec![69, 72, 76],
                vec![62, 65, 69, 72],
                vec![67, 71, 74, 77],
                vec![60, 64, 67, 71],
            ]
        );
    }

    #[test]
    fn test_every_registered_suffix_has_matching_length() {
        for (suffix, intervals) in CHORD_TYPES {
            let token = format!("D{suffix}");
            let (chord, diag) = parse_chord_token(&token, 0, 60).unwrap();
            assert!(diag.is_none(), "suffix {suffix:?} should be registered");
            assert_eq!(chord.len(), intervals.len(), "suffix {suffix:?}");
        }
    }

    #[test]
    fn test_unknown_suffix_degrades_to_major() {
        let parsed = parse_progression("Cxyz", 60).unwrap();
        assert_eq!(pitches(&parsed.progression), vec![vec![60, 64, 67]]);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].suffix, "xyz");
    }

    #[test]
    fn test_malformed_root_fails_strict_parse() {
        let err = parse_progression("C H7 G", 60).unwrap_err();
        assert_eq!(
            err,
            ChordParseError::MalformedChordToken {
                token: "H7".to_string(),
                position: 1
            }
        );
    }

    #[test]
    fn test_empty_and_whitespace_fail_strict_parse() {
        assert_eq!(parse_progression("", 60).unwrap_err(), ChordParseError::EmptyProgression);
        assert_eq!(
            parse_progression("  \t\n ", 60).unwrap_err(),
            ChordParseError::EmptyProgression
        );
    }

    #[test]
    fn test_recovering_parser_falls_back_to_default() {
        let default = ChordProgression::default();
        for text in ["", "   ", "X Y Z", "C G 7 F", "1 2 3"] {
            assert_eq!(parse_progression_or_default(text, 60), default, "text {text:?}");
        }
    }

    #[test]
    fn test_lowercase_root_accepted() {
        let parsed = parse_progression("am f", 60).unwrap();
        assert_eq!(pitches(&parsed.progression), vec![vec![69, 72, 76], vec![65, 69, 72]]);
    }

    #[test]
    fn test_cyclic_wraps() {
        let p = parse_progression("C F G", 60).unwrap().progression;
        assert_eq!(p.cyclic(3).root(), 60);
        assert_eq!(p.cyclic(5).root(), 67);
    }
}
