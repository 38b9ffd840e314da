//! Core market and error types.
//!
//! This module provides:
//! - `market`: validated [`MarketParameters`] and the call/put [`OptionKind`]
//! - `error`: the workspace-wide [`PricingError`]

pub mod error;
pub mod market;

pub use error::PricingError;
pub use market::{MarketParameters, OptionKind};
