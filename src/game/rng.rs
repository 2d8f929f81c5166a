use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of randomness for damage rolls and AI choices.
pub trait RngPort {
    /// Uniform draw in `[0, 1)`.
    fn float64(&mut self) -> f64;

    /// Uniform index in `0..n`. Returns 0 when `n` is 0.
    fn intn(&mut self, n: usize) -> usize;
}

/// Seeded generator used in production. Each applied action gets its own instance derived
/// from the session seed and the action counter, so replays draw the same sequence.
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn for_step(seed: u64, step: u64) -> Self {
        Self::new(mix(seed ^ mix(step)))
    }
}

impl RngPort for SeededRng {
    fn float64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    fn intn(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.inner.random_range(0..n)
    }
}

// splitmix64 finalizer
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Replays a fixed list of draws, then repeats `fallback`. Used to pin damage rolls in tests.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: VecDeque<f64>,
    fallback: f64,
    consumed: usize,
}

impl ScriptedRng {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0.5,
            consumed: 0,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of draws served so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RngPort for ScriptedRng {
    fn float64(&mut self) -> f64 {
        self.consumed += 1;
        self.draws.pop_front().unwrap_or(self.fallback)
    }

    fn intn(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let draw = self.float64();
        ((draw * n as f64) as usize).min(n - 1)
    }
}
