//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//!
//! Both are generic over `T: Float` so the same code serves `f64` pricing and
//! `f32` bulk evaluation.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// sqrt(2 * pi)
const SQRT_2PI: f64 = 2.506_628_274_631_000_7;

/// Beyond this |x| the lower tail underflows to zero in double precision.
const TAIL_CUTOFF: f64 = 37.0;

/// Switch point between the rational and continued-fraction branches.
const RATIONAL_LIMIT: f64 = 7.071_067_811_865_47;

/// Numerator coefficients of the rational branch, highest degree first.
const NUMERATOR: [f64; 7] = [
    3.526_249_659_989_11e-2,
    0.700_383_064_443_688,
    6.373_962_203_531_65,
    33.912_866_078_383,
    112.079_291_497_871,
    221.213_596_169_931,
    220.206_867_912_376,
];

/// Denominator coefficients of the rational branch, highest degree first.
const DENOMINATOR: [f64; 8] = [
    8.838_834_764_831_84e-2,
    1.755_667_163_182_64,
    16.064_177_579_207,
    86.780_732_202_946_1,
    296.564_248_779_674,
    637.333_633_378_831,
    793.826_512_519_948,
    440.413_735_824_752,
];

#[inline]
fn horner<T: Float>(coefficients: &[f64], x: T) -> T {
    coefficients
        .iter()
        .fold(T::zero(), |acc, &c| acc * x + T::from(c).unwrap_or_else(T::zero))
}

/// Lower tail probability Φ(-|x|).
///
/// Hart's double-precision rational approximation (as arranged by West, 2005),
/// with a continued fraction for the far tail. Absolute error is below 1e-14.
#[inline]
fn lower_tail<T: Float>(abs_x: T) -> T {
    let cutoff = T::from(TAIL_CUTOFF).unwrap_or_else(T::infinity);
    if abs_x > cutoff {
        return T::zero();
    }

    let half = T::from(0.5).unwrap_or_else(T::zero);
    let gaussian = (-half * abs_x * abs_x).exp();
    let rational_limit = T::from(RATIONAL_LIMIT).unwrap_or_else(T::zero);

    if abs_x < rational_limit {
        gaussian * horner(&NUMERATOR, abs_x) / horner(&DENOMINATOR, abs_x)
    } else {
        let c = |v: f64| T::from(v).unwrap_or_else(T::zero);
        let mut fraction = abs_x + c(0.65);
        fraction = abs_x + c(4.0) / fraction;
        fraction = abs_x + c(3.0) / fraction;
        fraction = abs_x + c(2.0) / fraction;
        fraction = abs_x + c(1.0) / fraction;
        gaussian / fraction / c(SQRT_2PI)
    }
}

/// Standard normal cumulative distribution function.
///
/// Computes P(X <= x) where X ~ N(0, 1).
///
/// The two tails are computed from the same lower-tail value, so
/// `norm_cdf(x) + norm_cdf(-x) == 1` up to a single rounding. Put-call parity
/// of the closed-form pricer relies on this.
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-15);
/// assert!((norm_cdf(1.96_f64) - 0.9750021048517795).abs() < 1e-12);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let tail = lower_tail(x.abs());
    if x > T::zero() {
        T::one() - tail
    } else {
        tail
    }
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804014327).abs() < 1e-15);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let frac_1_sqrt_2pi = T::from(FRAC_1_SQRT_2PI).unwrap_or_else(T::zero);
    let half = T::from(0.5).unwrap_or_else(T::zero);
    frac_1_sqrt_2pi * (-half * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_norm_cdf_at_zero() {
        assert_relative_eq!(norm_cdf(0.0_f64), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(1.0_f64), 0.8413447460685429, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(-1.0_f64), 0.15865525393145707, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(2.0_f64), 0.9772498680518208, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(-2.0_f64), 0.022750131948179195, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(3.0_f64), 0.9986501019683699, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_cdf_far_tail() {
        // Φ(-8) ≈ 6.22e-16, continued-fraction branch
        let far = norm_cdf(-8.0_f64);
        assert!(far > 6.0e-16 && far < 6.5e-16, "Φ(-8) = {}", far);

        assert_eq!(norm_cdf(-40.0_f64), 0.0);
        assert_eq!(norm_cdf(40.0_f64), 1.0);
    }

    #[test]
    fn test_norm_cdf_monotonic() {
        let values: Vec<f64> = (-60..=60).map(|i| i as f64 * 0.1).collect();
        for pair in values.windows(2) {
            assert!(
                norm_cdf(pair[1]) > norm_cdf(pair[0]),
                "CDF not monotonic at x = {}",
                pair[0]
            );
        }
    }

    #[test]
    fn test_norm_cdf_f32_compatibility() {
        assert!((norm_cdf(0.0_f32) - 0.5).abs() < 1e-6);
        assert!((norm_cdf(1.0_f32) - 0.841_344_7).abs() < 1e-5);
    }

    #[test]
    fn test_norm_pdf_reference_values() {
        assert_relative_eq!(norm_pdf(0.0_f64), FRAC_1_SQRT_2PI, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(1.0_f64), 0.24197072451914337, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(3.0_f64), 0.004431848411938008, epsilon = 1e-15);
    }

    #[test]
    fn test_cdf_pdf_relationship() {
        let h = 1e-5;
        for x in [-3.0, -1.5, 0.0, 0.7, 2.5] {
            let numerical = (norm_cdf(x + h) - norm_cdf(x - h)) / (2.0 * h);
            assert_relative_eq!(numerical, norm_pdf(x), epsilon = 1e-6);
        }
    }

    proptest! {
        #[test]
        fn prop_norm_cdf_symmetry(x in -12.0..12.0_f64) {
            prop_assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-15);
        }

        #[test]
        fn prop_norm_cdf_bounded(x in -50.0..50.0_f64) {
            let p = norm_cdf(x);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn prop_norm_pdf_symmetric(x in 0.0..10.0_f64) {
            prop_assert_eq!(norm_pdf(x), norm_pdf(-x));
        }
    }
}
