use std::collections::VecDeque;
use rand::{Rng, SeedableRng};
use rand::rngs::{StdRng, ThreadRng};


/// Produces die faces.
///
/// Implementations must return a value in `1..=sides` for any `sides > 0`.
pub trait RollSource {
    /// Rolls one die with `sides` faces.
    fn roll(&mut self, sides: u16) -> u16;
}


/// A [`RollSource`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    /// Wraps an existing random number generator.
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<ThreadRng> {
    /// Uses the thread-local generator from [`rand::rng()`].
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl RngSource<StdRng> {
    /// A reproducible source, handy for tests and replays.
    ///
    /// # Examples
    /// ```
    /// use bracket_dice::{RngSource, RollSource};
    ///
    /// let mut a = RngSource::seeded(7);
    /// let mut b = RngSource::seeded(7);
    /// assert_eq!(a.roll(20), b.roll(20));
    /// ```
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RollSource for RngSource<R> {
    fn roll(&mut self, sides: u16) -> u16 {
        self.0.random_range(1..=sides.max(1))
    }
}


/// Hands out predetermined faces first, then falls back to a seeded generator.
///
/// Queued values are clamped into `1..=sides` of the die being rolled.
#[derive(Debug, Clone)]
pub struct QueuedSource {
    queue: VecDeque<u16>,
    fallback: RngSource<StdRng>
}

impl QueuedSource {
    /// Creates a source that yields `values` in order.
    pub fn new<I: IntoIterator<Item = u16>>(values: I) -> Self {
        Self {
            queue: values.into_iter().collect(),
            fallback: RngSource::seeded(0)
        }
    }

    /// Number of queued values not consumed yet.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RollSource for QueuedSource {
    fn roll(&mut self, sides: u16) -> u16 {
        match self.queue.pop_front() {
            Some(value) => value.clamp(1, sides.max(1)),
            None => self.fallback.roll(sides)
        }
    }
}
