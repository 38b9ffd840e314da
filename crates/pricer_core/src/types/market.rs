//! Market inputs shared by the closed-form and Monte Carlo pricers.
//!
//! [`MarketParameters`] is validated once at construction and is immutable
//! afterwards, so every downstream pricer can rely on its invariants without
//! re-checking them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::PricingError;

/// Call or put side of an option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Right to buy at the strike.
    Call,
    /// Right to sell at the strike.
    Put,
}

impl OptionKind {
    /// Returns true for a call.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, OptionKind::Call)
    }

    /// Signed intrinsic value `max(±(underlying - strike), 0)`.
    #[inline]
    pub fn intrinsic(&self, underlying: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (underlying - strike).max(0.0),
            OptionKind::Put => (strike - underlying).max(0.0),
        }
    }
}

/// Unvalidated wire form used by serde before the invariants are checked.
#[derive(Deserialize)]
struct RawMarketParameters {
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
}

impl TryFrom<RawMarketParameters> for MarketParameters {
    type Error = PricingError;

    fn try_from(raw: RawMarketParameters) -> Result<Self, Self::Error> {
        MarketParameters::new(raw.spot, raw.strike, raw.maturity, raw.rate, raw.volatility)
    }
}

/// Five scalar inputs describing one pricing request.
///
/// # Invariants
///
/// - `spot`, `strike`, `maturity`, `volatility` are finite and strictly positive
/// - `rate` is finite (negative rates are allowed)
///
/// # Examples
///
/// ```
/// use pricer_core::types::MarketParameters;
///
/// let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
/// assert!((market.discount_factor() - (-0.05_f64).exp()).abs() < 1e-15);
///
/// assert!(MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMarketParameters")]
pub struct MarketParameters {
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
}

fn require_positive(name: &'static str, value: f64) -> Result<(), PricingError> {
    if !value.is_finite() {
        return Err(PricingError::invalid_parameter(name, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(PricingError::invalid_parameter(
            name,
            value,
            "must be strictly positive",
        ));
    }
    Ok(())
}

impl MarketParameters {
    /// Creates validated market parameters.
    ///
    /// # Arguments
    ///
    /// * `spot` - Current underlying price
    /// * `strike` - Option strike
    /// * `maturity` - Time to maturity in years
    /// * `rate` - Continuously compounded risk-free rate
    /// * `volatility` - Annualised volatility
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidParameter` naming the first input that
    /// violates its invariant.
    pub fn new(
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        volatility: f64,
    ) -> Result<Self, PricingError> {
        require_positive("spot", spot)?;
        require_positive("strike", strike)?;
        require_positive("maturity", maturity)?;
        if !rate.is_finite() {
            return Err(PricingError::invalid_parameter("rate", rate, "must be finite"));
        }
        require_positive("volatility", volatility)?;

        Ok(Self {
            spot,
            strike,
            maturity,
            rate,
            volatility,
        })
    }

    /// Parses and validates parameters from a TOML document.
    ///
    /// ```
    /// use pricer_core::types::MarketParameters;
    ///
    /// let market = MarketParameters::from_toml_str(
    ///     "spot = 100.0\nstrike = 95.0\nmaturity = 0.5\nrate = 0.01\nvolatility = 0.3\n",
    /// )
    /// .unwrap();
    /// assert_eq!(market.strike(), 95.0);
    /// ```
    ///
    /// # Errors
    ///
    /// - `Config` if the document is not valid TOML or lacks a field
    /// - `InvalidParameter` if a parsed value violates its invariant
    pub fn from_toml_str(content: &str) -> Result<Self, PricingError> {
        let raw: RawMarketParameters = toml::from_str(content)
            .map_err(|e| PricingError::Config(format!("Failed to parse market TOML: {}", e)))?;
        Self::try_from(raw)
    }

    /// Reads and validates parameters from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PricingError::Config(format!("Failed to read market file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Returns the strike price.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Returns the time to maturity in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Present value factor `exp(-rate·maturity)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    /// Returns a copy with the spot replaced, re-validated.
    pub fn with_spot(&self, spot: f64) -> Result<Self, PricingError> {
        Self::new(spot, self.strike, self.maturity, self.rate, self.volatility)
    }

    /// Returns a copy with the volatility replaced, re-validated.
    pub fn with_volatility(&self, volatility: f64) -> Result<Self, PricingError> {
        Self::new(self.spot, self.strike, self.maturity, self.rate, volatility)
    }

    /// Returns a copy with the rate replaced, re-validated.
    pub fn with_rate(&self, rate: f64) -> Result<Self, PricingError> {
        Self::new(self.spot, self.strike, self.maturity, rate, self.volatility)
    }

    /// Returns a copy with the maturity replaced, re-validated.
    pub fn with_maturity(&self, maturity: f64) -> Result<Self, PricingError> {
        Self::new(self.spot, self.strike, maturity, self.rate, self.volatility)
    }
}
