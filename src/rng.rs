use rand::rngs::{SmallRng, StdRng};
use rand::Rng;
use std::collections::VecDeque;

/// Source of uniform draws in `[0, 1)`.
///
/// Battles and moveset generation only ever consume unit draws, so tests can script
/// exact outcomes with [`ScriptedRandom`].
pub trait RandomSource: Send {
    fn unit(&mut self) -> f64;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let idx = (self.unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

impl RandomSource for SmallRng {
    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl RandomSource for StdRng {
    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn unit(&mut self) -> f64 {
        (**self).unit()
    }
}

/// Replays a fixed list of draws, then repeats `fallback`.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: 0.5,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(self.fallback)
    }
}

/// In-place Fisher-Yates shuffle, walking from the back.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn scripted_values_then_fallback() {
        let mut rng = ScriptedRandom::new([0.1, 0.9]).with_fallback(0.25);
        assert_eq!(rng.unit(), 0.1);
        assert_eq!(rng.unit(), 0.9);
        assert_eq!(rng.unit(), 0.25);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn index_stays_in_range() {
        let mut rng = ScriptedRandom::new([0.0, 0.999_999, 0.5]);
        assert_eq!(rng.index(4), 0);
        assert_eq!(rng.index(4), 3);
        assert_eq!(rng.index(4), 2);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn zero_draws_rotate_deterministically() {
        // Every draw picks index 0, so each position swaps with the front.
        let mut rng = ScriptedRandom::new(Vec::new()).with_fallback(0.0);
        let mut items = vec!['a', 'b', 'c', 'd'];
        shuffle(&mut items, &mut rng);
        assert_eq!(items, vec!['b', 'c', 'd', 'a']);
    }
}
