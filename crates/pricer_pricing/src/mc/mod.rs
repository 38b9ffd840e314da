//! # Monte Carlo Pricing Engine
//!
//! Path simulation, payoff evaluation and estimation for European, Asian
//! and Lookback options under Geometric Brownian Motion.
//!
//! ## Module Structure
//!
//! - [`config`]: [`SimulationConfig`] builder, variance-reduction and
//!   averaging choices, TOML loading
//! - [`paths`]: [`PathGenerator`] and the reusable [`PricedPath`] buffer
//! - [`payoff`]: the closed [`PayoffVariant`] set
//! - [`estimator`]: mergeable [`Accumulator`] of payoff and control moments
//! - [`engine`]: [`MonteCarloEngine`], [`PricingResult`] and [`Greek`]
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::types::MarketParameters;
//! use pricer_pricing::mc::{MonteCarloEngine, PayoffVariant, SimulationConfig, VarianceReduction};
//!
//! let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
//! let config = SimulationConfig::builder()
//!     .n_paths(10_000)
//!     .n_steps(1)
//!     .seed(42)
//!     .variance_reduction(VarianceReduction::Antithetic)
//!     .build()
//!     .unwrap();
//!
//! let result = MonteCarloEngine::new(config)
//!     .unwrap()
//!     .price(&market, PayoffVariant::EuropeanCall)
//!     .unwrap();
//! println!("Price: {} +/- {}", result.price, result.confidence_95());
//! ```

pub mod config;
pub mod engine;
pub mod estimator;
pub mod paths;
pub mod payoff;

pub use config::{
    AveragingConvention, SimulationConfig, SimulationConfigBuilder, VarianceReduction,
    DEFAULT_CHUNK_SIZE, DEFAULT_SEED, MAX_PATHS, MAX_RETAINED_PATHS, MAX_STEPS,
};
pub use engine::{Greek, MonteCarloEngine, PricingResult};
pub use estimator::{Accumulator, Estimate};
pub use paths::{PathGenerator, PricedPath};
pub use payoff::PayoffVariant;
