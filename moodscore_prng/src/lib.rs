// Deterministic, portable pseudo-random number generator for composition.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled with no RNG crate dependency so that identical seeds produce
// identical compositions on every platform and compiler version.
//
// This crate is the only source of randomness in the moodscore engine. Every
// generator in `moodscore_music` (melody patterns, voicings, ornaments,
// percussion) receives a `&mut ScoreRng` explicitly; nothing reaches for a
// global or thread-local generator. One request = one `ScoreRng`, so
// concurrent compositions never share state.
//
// **Critical constraint: determinism.** The integer core must not use
// floating point. The float helpers derive from the integer stream with a
// fixed bit-extraction, so their output is platform-independent too.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG used by every composition strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRng {
    s: [u64; 4],
}

impl ScoreRng {
    /// Create a new generator from a `u64` seed.
    ///
    /// SplitMix64 expands the seed into the 256-bit state. Equal seeds give
    /// equal output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Derive an independent child generator, e.g. one per generator family.
    ///
    /// Advances this generator by one step and seeds the child from it.
    pub fn fork(&mut self) -> Self {
        ScoreRng::new(self.next_u64())
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform `f64` in `[low, high)`. Returns `low` when the range is empty,
    /// so a degenerate range never aborts a composition.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + self.next_f64() * (high - low)
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform `usize` in `[low, high)`. Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Return `true` with probability `p`. `p <= 0` is always false and
    /// `p >= 1` always true.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly. Panics if `items` is empty.
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        assert!(!items.is_empty(), "pick: items must not be empty");
        items[self.range_usize(0, items.len())]
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Non-positive weights are never chosen unless every weight is
    /// non-positive, in which case index 0 is returned. Panics if `weights`
    /// is empty.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weighted_index: weights must not be empty");
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return 0;
        }
        let r = self.next_f64() * total;
        let mut cum = 0.0;
        let mut last_positive = 0;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            cum += w;
            last_positive = i;
            if r < cum {
                return i;
            }
        }
        // Rounding can leave r a hair above the final cumulative sum.
        last_positive
    }
}

/// SplitMix64, used only to expand a `u64` seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
