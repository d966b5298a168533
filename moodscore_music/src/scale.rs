// Scale kinds and the per-chord note pool.
//
// Melody strategies do not draw from a key-wide scale. Each chord slot gets
// its own pool: the chord's own pitches plus four characteristic extensions
// above the chord root (major 2nd, perfect 4th, major 6th, major 7th),
// deduplicated and sorted ascending. Chord tones are always present, so
// every pool contains a consonant choice for every strategy.
//
// `ScaleKind` (major/minor) comes from the mood profile. It picks the key
// signature written by `midi.rs`.

use crate::chord::Chord;
use serde::{Deserialize, Serialize};

/// Extension intervals (semitones above the chord root) added to every pool.
pub const POOL_EXTENSIONS: [i32; 4] = [2, 5, 9, 11];

/// Tonal flavour of a mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Major,
    Minor,
}

impl ScaleKind {
    pub fn is_minor(self) -> bool {
        self == ScaleKind::Minor
    }
}

/// Derive the melodic note pool for a chord.
///
/// Returns the chord pitches plus `POOL_EXTENSIONS` above the root, sorted
/// and deduplicated. Pitches stay at the chord's reference octave; octave
/// shifting is applied by the consumer.
pub fn note_pool(chord: &Chord) -> Vec<i32> {
    let root = chord.root();
    let mut pool: Vec<i32> = chord.pitches.iter().map(|&p| p as i32).collect();
    pool.extend(POOL_EXTENSIONS.iter().map(|ext| root + ext));
    pool.sort_unstable();
    pool.dedup();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_major_pool() {
        let chord = Chord::from_pitches(vec![60, 64, 67]);
        assert_eq!(note_pool(&chord), vec![60, 62, 64, 65, 67, 69, 71]);
    }

    #[test]
    fn test_pool_dedups_shared_extensions() {
        // Csus2 already contains the +2 extension.
        let chord = Chord::from_pitches(vec![60, 62, 67]);
        let pool = note_pool(&chord);
        assert_eq!(pool, vec![60, 62, 65, 67, 69, 71]);
    }

    #[test]
    fn test_pool_contains_every_chord_tone() {
        let chord = Chord::from_pitches(vec![69, 72, 76, 79, 83]);
        let pool = note_pool(&chord);
        assert!(pool.len() >= chord.pitches.len());
        for p in &chord.pitches {
            assert!(pool.contains(&(*p as i32)), "pool missing chord tone {p}");
        }
        assert!(pool.windows(2).all(|w| w[0] < w[1]), "pool must be sorted and unique");
    }

    #[test]
    fn test_is_minor() {
        assert!(ScaleKind::Minor.is_minor());
        assert!(!ScaleKind::Major.is_minor());
    }
}
