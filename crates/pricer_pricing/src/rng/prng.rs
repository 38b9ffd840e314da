//! Pseudo-random number generator wrapper for Monte Carlo simulations.
//!
//! This module provides [`PricerRng`], a seeded PRNG wrapper, and
//! [`stream_seed`], which derives an independent stream seed for every trial
//! index so that a trial's variates do not depend on which worker ran it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Golden-ratio increment of the SplitMix64 sequence.
const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derives the seed of trial `index` from the simulation's base seed.
///
/// The mix is the SplitMix64 finaliser applied to `base + (index + 1)·γ`, so
/// neighbouring indices land on unrelated seeds and index 0 never reuses the
/// base seed itself.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::rng::stream_seed;
///
/// assert_eq!(stream_seed(42, 7), stream_seed(42, 7));
/// assert_ne!(stream_seed(42, 7), stream_seed(42, 8));
/// assert_ne!(stream_seed(42, 0), 42);
/// ```
#[inline]
pub fn stream_seed(base_seed: u64, index: u64) -> u64 {
    let mut z = base_seed.wrapping_add(index.wrapping_add(1).wrapping_mul(SPLITMIX_GAMMA));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Monte Carlo simulation random number generator.
///
/// Provides seeded, reproducible standard normal variates. One instance is
/// created per trial via [`PricerRng::for_trial`]; it is never shared across
/// threads.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::rng::PricerRng;
///
/// let mut rng = PricerRng::from_seed(42);
/// let n: f64 = rng.gen_normal();
/// assert!(n.is_finite());
///
/// let mut buffer = vec![0.0; 100];
/// rng.fill_normal(&mut buffer);
/// ```
pub struct PricerRng {
    /// The underlying PRNG instance.
    inner: StdRng,
}

impl PricerRng {
    /// Creates a new RNG instance initialised with the given seed.
    ///
    /// The same seed will always produce the same sequence of random numbers.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the generator for trial `index` of a simulation seeded with
    /// `base_seed`.
    ///
    /// ```rust
    /// use pricer_pricing::rng::PricerRng;
    ///
    /// let mut a = PricerRng::for_trial(7, 1_000);
    /// let mut b = PricerRng::for_trial(7, 1_000);
    /// assert_eq!(a.gen_normal(), b.gen_normal());
    /// ```
    #[inline]
    pub fn for_trial(base_seed: u64, index: u64) -> Self {
        Self::from_seed(stream_seed(base_seed, index))
    }

    /// Generates a single standard normal variate (mean=0, std=1).
    ///
    /// Uses the Ziggurat algorithm via `rand_distr::StandardNormal`.
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills the buffer with standard normal variates.
    ///
    /// Zero-allocation; empty buffers are a no-op.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}
