//! # Random Number Generation
//!
//! Seeded, indexable random streams for Monte Carlo trials.
//!
//! ## Design
//!
//! - **Reproducibility**: every trial draws from its own stream seeded by
//!   [`stream_seed`]`(seed, trial_index)`, so the variates a trial sees are
//!   fixed by its index alone
//! - **Worker independence**: no generator is shared between threads; the
//!   engine can schedule trials on any number of workers without changing
//!   a single draw
//! - **Efficiency**: batch generation into caller-owned `&mut [f64]` buffers
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::PricerRng;
//!
//! let mut rng = PricerRng::for_trial(12345, 0);
//! let mut buffer = vec![0.0; 252];
//! rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::{stream_seed, PricerRng};
