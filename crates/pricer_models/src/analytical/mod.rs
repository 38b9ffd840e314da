//! Analytical pricing formulas for European options.
//!
//! This module provides closed-form solutions under Black-Scholes dynamics:
//! - Call and put prices
//! - Analytical Greeks (Delta, Gamma, Vega, Theta, Rho)
//! - Implied volatility inversion
//!
//! ## Design Principles
//!
//! - **Validated inputs**: every formula takes a [`MarketParameters`], so no
//!   function here needs to guard against zero volatility or maturity
//! - **Numerical Stability**: the normal CDF is exactly symmetric, which keeps
//!   put-call parity tight in the far tails
//!
//! [`MarketParameters`]: pricer_core::types::MarketParameters

pub mod black_scholes;
pub mod distributions;
pub mod implied_vol;

// Re-export main types at module level
pub use black_scholes::{BlackScholes, Greeks, D1D2};
pub use distributions::{norm_cdf, norm_pdf};
pub use implied_vol::{implied_volatility, ImpliedVolSolver};
