//! Pseudo-random "exchange rates". These have nothing to do with market data.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalogue::Catalogue;

pub const MIN_RATE: f64 = 0.5;
pub const MAX_RATE: f64 = 2.0;

/// Source of uniform randomness, swappable so callers can pin the sequence.
pub trait RandomSource: Send + Sync {
    /// Uniform in `[0, 1)`.
    fn next_f64(&self) -> f64;
    /// Uniform in `[0, len)`. `len` is never zero.
    fn index(&self, len: usize) -> usize;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }

    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

#[derive(Debug)]
pub struct SeededRandom(Mutex<StdRng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        let mut rng = self.0.lock().unwrap_or_else(|e| e.into_inner());
        rng.r#gen::<f64>()
    }

    fn index(&self, len: usize) -> usize {
        let mut rng = self.0.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "up 📈",
            Direction::Down => "down 📉",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    /// In `[MIN_RATE, MAX_RATE]`, four fractional digits.
    pub value: f64,
    pub direction: Direction,
}

#[derive(Clone)]
pub struct RateGenerator {
    source: Arc<dyn RandomSource>,
}

impl RateGenerator {
    pub fn new(source: Arc<dyn RandomSource>) -> Self {
        RateGenerator { source }
    }

    pub fn generate(&self) -> Rate {
        let raw = MIN_RATE + (MAX_RATE - MIN_RATE) * self.source.next_f64();
        let value = ((raw * 10_000.0).round() / 10_000.0).clamp(MIN_RATE, MAX_RATE);
        let direction = match self.source.index(2) {
            0 => Direction::Up,
            _ => Direction::Down,
        };
        Rate { value, direction }
    }

    pub fn pick_pair<'a>(&self, catalogue: &'a Catalogue) -> Option<&'a str> {
        if catalogue.is_empty() {
            return None;
        }
        catalogue.get(self.source.index(catalogue.len()))
    }

    /// Uniform in `[min, max)`.
    pub fn delay(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        min + (max - min).mul_f64(self.source.next_f64())
    }
}

impl Default for RateGenerator {
    fn default() -> Self {
        RateGenerator::new(Arc::new(ThreadRandom))
    }
}

impl fmt::Debug for RateGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateGenerator").finish_non_exhaustive()
    }
}
