//! Implied volatility by bisection on the Black-Scholes price.
//!
//! The Black-Scholes price is strictly increasing in σ, so bisection on a
//! bracket that straddles the target always converges when the target lies
//! inside the no-arbitrage bounds.

use pricer_core::types::{MarketParameters, OptionKind, PricingError};

use super::black_scholes::BlackScholes;

/// Bisection solver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpliedVolSolver {
    /// Lower volatility bracket.
    pub lower: f64,
    /// Upper volatility bracket.
    pub upper: f64,
    /// Absolute price tolerance.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for ImpliedVolSolver {
    fn default() -> Self {
        Self {
            lower: 1e-7,
            upper: 5.0,
            tolerance: 1e-7,
            max_iterations: 1000,
        }
    }
}

impl ImpliedVolSolver {
    /// Solves for σ such that the model price of `kind` equals `target_price`.
    ///
    /// The volatility carried by `market` is ignored; spot, strike, maturity
    /// and rate are used as given.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `target_price` is outside the no-arbitrage
    ///   bounds or the bracket does not straddle it
    /// - `ConvergenceFailure` if `max_iterations` is exhausted
    ///
    /// # Examples
    /// ```
    /// use pricer_core::types::{MarketParameters, OptionKind};
    /// use pricer_models::analytical::ImpliedVolSolver;
    ///
    /// let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
    /// let vol = ImpliedVolSolver::default()
    ///     .solve(&market, OptionKind::Call, 10.450583572185565)
    ///     .unwrap();
    /// assert!((vol - 0.2).abs() < 1e-6);
    /// ```
    pub fn solve(
        &self,
        market: &MarketParameters,
        kind: OptionKind,
        target_price: f64,
    ) -> Result<f64, PricingError> {
        let discounted_strike = market.strike() * market.discount_factor();
        let (floor, cap) = match kind {
            OptionKind::Call => ((market.spot() - discounted_strike).max(0.0), market.spot()),
            OptionKind::Put => ((discounted_strike - market.spot()).max(0.0), discounted_strike),
        };
        if !target_price.is_finite() || target_price <= floor || target_price >= cap {
            return Err(PricingError::invalid_parameter(
                "target_price",
                target_price,
                format!("must lie strictly inside ({}, {})", floor, cap),
            ));
        }

        let price_at = |vol: f64| -> Result<f64, PricingError> {
            Ok(BlackScholes::new(market.with_volatility(vol)?).price(kind))
        };

        let mut low = self.lower;
        let mut high = self.upper;
        if price_at(low)? > target_price || price_at(high)? < target_price {
            return Err(PricingError::invalid_parameter(
                "target_price",
                target_price,
                format!("not bracketed by volatility [{}, {}]", low, high),
            ));
        }

        for _ in 0..self.max_iterations {
            let mid = 0.5 * (low + high);
            let estimate = price_at(mid)?;
            if (estimate - target_price).abs() < self.tolerance {
                return Ok(mid);
            }
            if estimate > target_price {
                high = mid;
            } else {
                low = mid;
            }
        }

        Err(PricingError::ConvergenceFailure {
            iterations: self.max_iterations,
            message: format!("implied volatility bisection for target {}", target_price),
        })
    }
}

/// Implied volatility with the default solver settings.
pub fn implied_volatility(
    market: &MarketParameters,
    kind: OptionKind,
    target_price: f64,
) -> Result<f64, PricingError> {
    ImpliedVolSolver::default().solve(market, kind, target_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market(vol: f64) -> MarketParameters {
        MarketParameters::new(100.0, 110.0, 0.75, 0.03, vol).unwrap()
    }

    #[test]
    fn test_round_trip_call_and_put() {
        for kind in [OptionKind::Call, OptionKind::Put] {
            for vol in [0.05, 0.2, 0.6, 1.5] {
                let price = BlackScholes::new(market(vol)).price(kind);
                let solved = implied_volatility(&market(0.3), kind, price).unwrap();
                assert_relative_eq!(solved, vol, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_rejects_price_below_intrinsic() {
        let result = implied_volatility(&market(0.2), OptionKind::Put, 1.0);
        assert!(matches!(
            result,
            Err(PricingError::InvalidParameter {
                name: "target_price",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_price_above_spot() {
        let result = implied_volatility(&market(0.2), OptionKind::Call, 150.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unbracketed_target() {
        let solver = ImpliedVolSolver {
            upper: 0.1,
            ..ImpliedVolSolver::default()
        };
        let price = BlackScholes::new(market(0.8)).price_call();
        assert!(matches!(
            solver.solve(&market(0.2), OptionKind::Call, price),
            Err(PricingError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_iteration_cap() {
        let solver = ImpliedVolSolver {
            max_iterations: 2,
            tolerance: 1e-14,
            ..ImpliedVolSolver::default()
        };
        let price = BlackScholes::new(market(0.37)).price_call();
        assert!(matches!(
            solver.solve(&market(0.2), OptionKind::Call, price),
            Err(PricingError::ConvergenceFailure { iterations: 2, .. })
        ));
    }
}
