//! Seedable randomness shared by generation and simulation.

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

/// All randomness in the engine flows through one of these, so a run is fully
/// determined by its seed and input sequence.
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform draw from `min..=max`.
    pub fn range_usize(&mut self, min: usize, max: usize) -> usize {
        debug_assert!(min <= max);
        let span = max - min + 1;
        min + (self.rng.next_u64() as usize % span)
    }

    /// Uniform draw from `min..=max`.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = (max - min + 1) as u64;
        min + (self.rng.next_u64() % span) as i32
    }

    /// True with the given probability, resolved at parts-per-million scale.
    pub fn chance(&mut self, probability: f32) -> bool {
        let threshold = (f64::from(probability) * 1_000_000.0) as u64;
        self.rng.next_u64() % 1_000_000 < threshold
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        debug_assert!(!items.is_empty());
        &items[self.rng.next_u64() as usize % items.len()]
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rng.next_u64() as usize % (i + 1);
            items.swap(i, j);
        }
    }
}

/// Splitmix-style mix of a run seed with a stream tag, used to hand
/// decorrelated seeds to independent subsystems (generation attempts, the
/// runtime action stream) without consuming RNG state.
pub fn derive_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_draws_stay_inside_requested_bounds() {
        let mut rng = RandomSource::from_seed(12_345);
        for _ in 0..200 {
            assert!((7..=13).contains(&rng.range_usize(7, 13)));
            assert!((-3..=2).contains(&rng.range_i32(-3, 2)));
        }
    }

    #[test]
    fn chance_is_exact_at_the_extremes() {
        let mut rng = RandomSource::from_seed(9);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn same_seed_produces_identical_sequences() {
        let mut a = RandomSource::from_seed(77);
        let mut b = RandomSource::from_seed(77);
        for _ in 0..50 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut rng = RandomSource::from_seed(31);
        let mut items = [1, 2, 3, 4, 5, 6, 7];
        rng.shuffle(&mut items);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn stream_derivation_changes_when_inputs_change() {
        let baseline = derive_stream(99, 2);
        assert_ne!(baseline, derive_stream(98, 2));
        assert_ne!(baseline, derive_stream(99, 3));
        assert_eq!(baseline, derive_stream(99, 2));
    }
}
