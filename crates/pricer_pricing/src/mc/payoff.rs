//! Payoff variants evaluated on a completed path.
//!
//! The set is closed: every consumer matches exhaustively, so adding a
//! variant is a compile error at each site that must handle it.

use serde::{Deserialize, Serialize};

use pricer_core::types::{OptionKind, PricingError};

use super::config::AveragingConvention;
use super::paths::PricedPath;

/// Option payoff priced by the Monte Carlo engine.
///
/// | Variant | Payoff |
/// |---------|--------|
/// | `EuropeanCall` | `max(S_T - K, 0)` |
/// | `EuropeanPut` | `max(K - S_T, 0)` |
/// | `AsianCall` | `max(mean(path) - K, 0)` |
/// | `AsianPut` | `max(K - mean(path), 0)` |
/// | `LookbackCall` | `max(max(path) - K, 0)` |
/// | `LookbackPut` | `max(K - min(path), 0)` |
///
/// Lookbacks are discretely monitored at the path's step resolution, with
/// the initial spot counted as an observation.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{AveragingConvention, PayoffVariant, PricedPath};
///
/// let path = PricedPath::from_prices(vec![100.0, 120.0, 110.0]).unwrap();
/// let convention = AveragingConvention::IncludeInitial;
/// let asian = PayoffVariant::AsianCall.evaluate(&path, 100.0, convention);
/// assert!((asian - 10.0).abs() < 1e-12);
/// assert_eq!(PayoffVariant::LookbackCall.evaluate(&path, 100.0, convention), 20.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffVariant {
    /// European call on the terminal price.
    EuropeanCall,
    /// European put on the terminal price.
    EuropeanPut,
    /// Arithmetic-average Asian call.
    AsianCall,
    /// Arithmetic-average Asian put.
    AsianPut,
    /// Fixed-strike lookback call on the path maximum.
    LookbackCall,
    /// Fixed-strike lookback put on the path minimum.
    LookbackPut,
}

impl PayoffVariant {
    /// Every variant, in declaration order.
    pub const ALL: [PayoffVariant; 6] = [
        PayoffVariant::EuropeanCall,
        PayoffVariant::EuropeanPut,
        PayoffVariant::AsianCall,
        PayoffVariant::AsianPut,
        PayoffVariant::LookbackCall,
        PayoffVariant::LookbackPut,
    ];

    /// Display name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            PayoffVariant::EuropeanCall => "EuropeanCall",
            PayoffVariant::EuropeanPut => "EuropeanPut",
            PayoffVariant::AsianCall => "AsianCall",
            PayoffVariant::AsianPut => "AsianPut",
            PayoffVariant::LookbackCall => "LookbackCall",
            PayoffVariant::LookbackPut => "LookbackPut",
        }
    }

    /// Call or put side.
    #[inline]
    pub fn kind(&self) -> OptionKind {
        match self {
            PayoffVariant::EuropeanCall
            | PayoffVariant::AsianCall
            | PayoffVariant::LookbackCall => OptionKind::Call,
            PayoffVariant::EuropeanPut | PayoffVariant::AsianPut | PayoffVariant::LookbackPut => {
                OptionKind::Put
            }
        }
    }

    /// True when the payoff depends on more than the terminal price.
    #[inline]
    pub fn is_path_dependent(&self) -> bool {
        match self {
            PayoffVariant::EuropeanCall | PayoffVariant::EuropeanPut => false,
            PayoffVariant::AsianCall
            | PayoffVariant::AsianPut
            | PayoffVariant::LookbackCall
            | PayoffVariant::LookbackPut => true,
        }
    }

    /// Fewest time steps that can resolve this payoff.
    #[inline]
    pub fn min_steps(&self) -> usize {
        if self.is_path_dependent() {
            2
        } else {
            1
        }
    }

    /// Rejects step counts that cannot resolve this payoff.
    ///
    /// # Errors
    ///
    /// `InsufficientResolution` for a path-dependent variant with fewer
    /// than two steps.
    pub fn check_resolution(&self, n_steps: usize) -> Result<(), PricingError> {
        if n_steps < self.min_steps() {
            return Err(PricingError::InsufficientResolution {
                variant: self.name(),
                n_steps,
            });
        }
        Ok(())
    }

    /// Undiscounted payoff of `path` at `strike`; never negative.
    #[inline]
    pub fn evaluate(&self, path: &PricedPath, strike: f64, averaging: AveragingConvention) -> f64 {
        let kind = self.kind();
        match self {
            PayoffVariant::EuropeanCall | PayoffVariant::EuropeanPut => {
                kind.intrinsic(path.terminal(), strike)
            }
            PayoffVariant::AsianCall | PayoffVariant::AsianPut => {
                kind.intrinsic(path.average(averaging), strike)
            }
            PayoffVariant::LookbackCall => kind.intrinsic(path.maximum(), strike),
            PayoffVariant::LookbackPut => kind.intrinsic(path.minimum(), strike),
        }
    }
}

impl std::fmt::Display for PayoffVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
