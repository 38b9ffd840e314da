//! # Pricer Models (L2: Analytical Reference)
//!
//! Closed-form Black-Scholes pricing for European options.
//!
//! This crate provides:
//! - Standard normal CDF and PDF
//! - Black-Scholes call and put prices
//! - Analytical Greeks
//! - Implied volatility by bisection
//!
//! The Monte Carlo engine in `pricer_pricing` uses these formulas both as a
//! reference value for European payoffs and as the expectation of its
//! control variate.
//!
//! ## Usage
//!
//! ```
//! use pricer_core::types::{MarketParameters, OptionKind};
//! use pricer_models::analytical::BlackScholes;
//!
//! let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
//! let bs = BlackScholes::new(market);
//! assert!((bs.price(OptionKind::Call) - 10.4506).abs() < 1e-4);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
