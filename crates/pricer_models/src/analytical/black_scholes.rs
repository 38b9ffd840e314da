//! Black-Scholes pricing model for European options.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! Inputs arrive as validated [`MarketParameters`], so every formula here can
//! assume strictly positive spot, strike, maturity and volatility.

use pricer_core::types::{MarketParameters, OptionKind};
use serde::{Deserialize, Serialize};

use super::distributions::{norm_cdf, norm_pdf};

/// The intermediate `d₁`, `d₂` quantities of the Black-Scholes formula.
///
/// Exposed so callers pricing both sides can compute them once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct D1D2 {
    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
    pub d1: f64,
    /// d₂ = d₁ - σ√T
    pub d2: f64,
}

/// First-order and second-order sensitivities of a European option.
///
/// All values are raw partial derivatives. Use the `*_per_*` helpers for the
/// market quoting conventions (per vol point, per calendar day, per rate point).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂σ
    pub vega: f64,
    /// ∂V/∂t (calendar time, usually negative)
    pub theta: f64,
    /// ∂V/∂r
    pub rho: f64,
}

impl Greeks {
    /// Vega for a one-point (0.01) volatility move.
    #[inline]
    pub fn vega_per_point(&self) -> f64 {
        self.vega / 100.0
    }

    /// Theta per calendar day (365-day year).
    #[inline]
    pub fn theta_per_day(&self) -> f64 {
        self.theta / 365.0
    }

    /// Rho for a one-point (0.01) rate move.
    #[inline]
    pub fn rho_per_point(&self) -> f64 {
        self.rho / 100.0
    }
}

/// Closed-form pricer for European options under lognormal dynamics.
///
/// # Examples
/// ```
/// use pricer_core::types::{MarketParameters, OptionKind};
/// use pricer_models::analytical::BlackScholes;
///
/// let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
/// let bs = BlackScholes::new(market);
///
/// let call = bs.price(OptionKind::Call);
/// let put = bs.price(OptionKind::Put);
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call - put - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// assert!((call - 10.4506).abs() < 1e-3);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BlackScholes {
    market: MarketParameters,
}

impl BlackScholes {
    /// Creates a pricer over validated market parameters.
    #[inline]
    pub fn new(market: MarketParameters) -> Self {
        Self { market }
    }

    /// Returns the underlying market parameters.
    #[inline]
    pub fn market(&self) -> &MarketParameters {
        &self.market
    }

    #[inline]
    fn vol_sqrt_t(&self) -> f64 {
        self.market.volatility() * self.market.maturity().sqrt()
    }

    /// Computes the d1 term.
    #[inline]
    pub fn d1(&self) -> f64 {
        self.terms().d1
    }

    /// Computes the d2 term.
    #[inline]
    pub fn d2(&self) -> f64 {
        self.terms().d2
    }

    /// Computes both `d₁` and `d₂` in one pass.
    pub fn terms(&self) -> D1D2 {
        let m = &self.market;
        let vol_sqrt_t = self.vol_sqrt_t();
        let log_moneyness = (m.spot() / m.strike()).ln();
        let drift = (m.rate() + 0.5 * m.volatility() * m.volatility()) * m.maturity();
        let d1 = (log_moneyness + drift) / vol_sqrt_t;

        D1D2 {
            d1,
            d2: d1 - vol_sqrt_t,
        }
    }

    /// Present value from precomputed terms.
    pub fn price_from_terms(&self, kind: OptionKind, terms: D1D2) -> f64 {
        let m = &self.market;
        let discounted_strike = m.strike() * m.discount_factor();

        match kind {
            OptionKind::Call => {
                m.spot() * norm_cdf(terms.d1) - discounted_strike * norm_cdf(terms.d2)
            }
            OptionKind::Put => {
                discounted_strike * norm_cdf(-terms.d2) - m.spot() * norm_cdf(-terms.d1)
            }
        }
    }

    /// Present value of a European call or put.
    #[inline]
    pub fn price(&self, kind: OptionKind) -> f64 {
        self.price_from_terms(kind, self.terms())
    }

    /// Present value of a European call.
    #[inline]
    pub fn price_call(&self) -> f64 {
        self.price(OptionKind::Call)
    }

    /// Present value of a European put.
    #[inline]
    pub fn price_put(&self) -> f64 {
        self.price(OptionKind::Put)
    }

    /// Computes Delta (∂V/∂S).
    ///
    /// - Call Delta = N(d₁)
    /// - Put Delta = N(d₁) - 1
    pub fn delta(&self, kind: OptionKind) -> f64 {
        let n_d1 = norm_cdf(self.d1());
        match kind {
            OptionKind::Call => n_d1,
            OptionKind::Put => n_d1 - 1.0,
        }
    }

    /// Computes Gamma (∂²V/∂S²), identical for calls and puts.
    pub fn gamma(&self) -> f64 {
        norm_pdf(self.d1()) / (self.market.spot() * self.vol_sqrt_t())
    }

    /// Computes Vega (∂V/∂σ), identical for calls and puts.
    pub fn vega(&self) -> f64 {
        self.market.spot() * self.market.maturity().sqrt() * norm_pdf(self.d1())
    }

    /// Computes Theta (∂V/∂t).
    ///
    /// - Call Theta = -(S·σ·φ(d₁))/(2√T) - r·K·e^(-rT)·N(d₂)
    /// - Put Theta = -(S·σ·φ(d₁))/(2√T) + r·K·e^(-rT)·N(-d₂)
    pub fn theta(&self, kind: OptionKind) -> f64 {
        let m = &self.market;
        let terms = self.terms();
        let decay =
            -(m.spot() * m.volatility() * norm_pdf(terms.d1)) / (2.0 * m.maturity().sqrt());
        let carry = m.rate() * m.strike() * m.discount_factor();

        match kind {
            OptionKind::Call => decay - carry * norm_cdf(terms.d2),
            OptionKind::Put => decay + carry * norm_cdf(-terms.d2),
        }
    }

    /// Computes Rho (∂V/∂r).
    ///
    /// - Call Rho = K·T·e^(-rT)·N(d₂)
    /// - Put Rho = -K·T·e^(-rT)·N(-d₂)
    pub fn rho(&self, kind: OptionKind) -> f64 {
        let m = &self.market;
        let scale = m.strike() * m.maturity() * m.discount_factor();
        let d2 = self.d2();

        match kind {
            OptionKind::Call => scale * norm_cdf(d2),
            OptionKind::Put => -scale * norm_cdf(-d2),
        }
    }

    /// All Greeks for one side.
    pub fn greeks(&self, kind: OptionKind) -> Greeks {
        Greeks {
            delta: self.delta(kind),
            gamma: self.gamma(),
            vega: self.vega(),
            theta: self.theta(kind),
            rho: self.rho(kind),
        }
    }
}
