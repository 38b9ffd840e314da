//! Path generation for Monte Carlo simulation.
//!
//! This module implements Geometric Brownian Motion (GBM) path generation
//! with the exact log-space step
//!
//! ```text
//! S[t+1] = S[t] × exp((r - σ²/2)·dt + σ·√dt·Z)
//! ```
//!
//! so a single step already samples the terminal distribution without
//! discretisation bias.
//!
//! # Memory Layout
//!
//! A [`PricedPath`] holds `n_steps + 1` prices where index 0 is the initial
//! spot. One buffer is reused across all trials a worker runs.

use serde::Serialize;

use pricer_core::types::MarketParameters;

use super::config::AveragingConvention;

/// Time-stepped price sequence of a single trial.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::PricedPath;
///
/// let path = PricedPath::from_prices(vec![100.0, 104.0, 98.0]).unwrap();
/// assert_eq!(path.initial(), 100.0);
/// assert_eq!(path.terminal(), 98.0);
/// assert_eq!(path.maximum(), 104.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricedPath {
    prices: Vec<f64>,
}

impl PricedPath {
    /// Creates a path buffer for `n_steps` steps, every point set to `spot`.
    pub fn flat(spot: f64, n_steps: usize) -> Self {
        Self {
            prices: vec![spot; n_steps + 1],
        }
    }

    /// Wraps an explicit price sequence; `None` if it is empty.
    pub fn from_prices(prices: Vec<f64>) -> Option<Self> {
        if prices.is_empty() {
            None
        } else {
            Some(Self { prices })
        }
    }

    /// All `n_steps + 1` prices, starting at spot.
    #[inline]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Number of time steps.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.prices.len() - 1
    }

    /// Price at time zero.
    #[inline]
    pub fn initial(&self) -> f64 {
        self.prices[0]
    }

    /// Price at maturity.
    #[inline]
    pub fn terminal(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Highest sampled price, including the initial spot.
    #[inline]
    pub fn maximum(&self) -> f64 {
        self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Lowest sampled price, including the initial spot.
    #[inline]
    pub fn minimum(&self) -> f64 {
        self.prices.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Arithmetic average under the given convention.
    ///
    /// A zero-step path has no post-initial points, so `ExcludeInitial`
    /// falls back to the initial spot there.
    pub fn average(&self, convention: AveragingConvention) -> f64 {
        let points = match convention {
            AveragingConvention::IncludeInitial => &self.prices[..],
            AveragingConvention::ExcludeInitial if self.prices.len() > 1 => &self.prices[1..],
            AveragingConvention::ExcludeInitial => &self.prices[..],
        };
        points.iter().sum::<f64>() / points.len() as f64
    }
}

/// GBM path generator with per-simulation precomputed coefficients.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::MarketParameters;
/// use pricer_pricing::mc::{PathGenerator, PricedPath};
///
/// let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
/// let generator = PathGenerator::new(&market, 4);
/// let mut path = PricedPath::flat(market.spot(), 4);
///
/// generator.generate(&[0.0; 4], 1.0, &mut path);
/// assert!(path.terminal() > market.spot());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathGenerator {
    spot: f64,
    n_steps: usize,
    dt: f64,
    drift_dt: f64,
    vol_sqrt_dt: f64,
}

impl PathGenerator {
    /// Precomputes `drift_dt = (r - σ²/2)·dt` and `vol_sqrt_dt = σ·√dt`.
    pub fn new(market: &MarketParameters, n_steps: usize) -> Self {
        let dt = market.maturity() / n_steps as f64;
        let sigma = market.volatility();
        Self {
            spot: market.spot(),
            n_steps,
            dt,
            drift_dt: (market.rate() - 0.5 * sigma * sigma) * dt,
            vol_sqrt_dt: sigma * dt.sqrt(),
        }
    }

    /// Initial spot of every generated path.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Number of time steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Time step size in years.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Fills `path` from the variates `normals`, scaled by `sign`.
    ///
    /// `sign = -1.0` yields the antithetic partner of the `sign = 1.0` path.
    /// `normals` must hold `n_steps` values and `path` must have been
    /// created for `n_steps` steps.
    #[inline]
    pub fn generate(&self, normals: &[f64], sign: f64, path: &mut PricedPath) {
        debug_assert_eq!(normals.len(), self.n_steps);
        debug_assert_eq!(path.prices.len(), self.n_steps + 1);

        let prices = &mut path.prices;
        prices[0] = self.spot;
        for (step, &z) in normals.iter().enumerate() {
            let increment = self.drift_dt + self.vol_sqrt_dt * sign * z;
            prices[step + 1] = prices[step] * increment.exp();
        }
    }
}
