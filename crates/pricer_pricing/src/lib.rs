//! # Pricer Pricing (L3: Monte Carlo Engine)
//!
//! Monte Carlo pricing of European and path-dependent options under
//! Geometric Brownian Motion.
//!
//! This crate provides:
//! - Indexable per-trial random streams ([`rng`])
//! - Path generation, payoff evaluation and estimation ([`mc`])
//! - Antithetic and control-variate variance reduction
//! - Bump-and-revalue Greeks with common random numbers
//!
//! ## Design Principles
//!
//! - **Reproducible**: each trial's variates derive from `(seed, trial_index)`;
//!   the same inputs give bit-identical prices for any worker count
//! - **Closed payoff set**: [`mc::PayoffVariant`] is matched exhaustively
//! - **Validated up front**: every error is raised before the first path is
//!   simulated, apart from samples lost to cancellation
//!
//! ## Logging
//!
//! The engine emits `tracing` events and spans; installing a subscriber is
//! left to the embedding application.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod mc;
pub mod rng;
