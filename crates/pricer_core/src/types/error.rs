//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: every failure surfaced by the closed-form pricer and the
//!   Monte Carlo engine
//!
//! Validation failures are caller bugs, not transient conditions, so none of
//! these variants are retried anywhere in the workspace.

use thiserror::Error;

/// Categorised pricing errors.
///
/// # Variants
/// - `InvalidParameter`: a market or simulation input violates its invariant
/// - `InsufficientResolution`: too few time steps for a path-dependent payoff
/// - `DegenerateSample`: too few samples for a standard error to exist
/// - `ConvergenceFailure`: an iterative solver ran out of iterations
/// - `WorkerPool`: the parallel worker pool could not be built
/// - `Config`: a configuration source could not be read or parsed
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::invalid_parameter("volatility", -0.2, "must be strictly positive");
/// assert_eq!(
///     format!("{}", err),
///     "Invalid parameter 'volatility' = -0.2: must be strictly positive"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A scalar input violates its invariant.
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value, rendered for display
        value: String,
        /// Which invariant was violated
        reason: String,
    },

    /// The step count cannot resolve the selected payoff.
    #[error("Insufficient resolution: {variant} requires at least 2 time steps, got {n_steps}")]
    InsufficientResolution {
        /// Payoff variant name
        variant: &'static str,
        /// Configured step count
        n_steps: usize,
    },

    /// Too few samples for the sample variance to be defined.
    #[error("Degenerate sample: {samples} sample(s) cannot define a standard error")]
    DegenerateSample {
        /// Number of independent samples available to the estimator
        samples: usize,
    },

    /// Iterative solver did not converge.
    #[error("Failed to converge after {iterations} iterations: {message}")]
    ConvergenceFailure {
        /// Number of iterations attempted
        iterations: usize,
        /// Solver context
        message: String,
    },

    /// Worker pool construction failed.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Configuration source could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PricingError {
    /// Builds an `InvalidParameter` error from any displayable value.
    pub fn invalid_parameter(
        name: &'static str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        PricingError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
