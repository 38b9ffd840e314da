//! # pricer_core: Foundation types for option pricing
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - Validated market inputs: `MarketParameters`, `OptionKind` (`types::market`)
//! - Error types: `PricingError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates:
//! - thiserror: Error derivation
//! - serde / toml: Loading market inputs from configuration files
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::types::{MarketParameters, OptionKind, PricingError};
//!
//! let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
//! assert_eq!(OptionKind::Call.intrinsic(market.spot(), 90.0), 10.0);
//!
//! let err = MarketParameters::new(-1.0, 100.0, 1.0, 0.05, 0.2).unwrap_err();
//! assert!(matches!(err, PricingError::InvalidParameter { name: "spot", .. }));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod types;
