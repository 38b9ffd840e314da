//! Streaming mean, variance and co-moment accumulation.
//!
//! [`Accumulator`] tracks a sample `x` (the discounted payoff) alongside a
//! control `y` using Welford updates, and merges with another accumulator
//! by Chan's pairwise formula. The engine folds per-chunk accumulators in
//! chunk order, so the merged moments depend only on the chunk layout.

/// Variance of the control below which the regression coefficient is zero.
const MIN_CONTROL_VARIANCE: f64 = 1e-16;

/// Mergeable first and second moments of `(x, y)` pairs.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::Accumulator;
///
/// let mut acc = Accumulator::new();
/// for x in [1.0, 2.0, 3.0, 4.0] {
///     acc.push(x, 0.0);
/// }
/// assert_eq!(acc.count(), 4);
/// assert!((acc.mean_x() - 2.5).abs() < 1e-15);
/// assert!((acc.variance_x() - 5.0 / 3.0).abs() < 1e-15);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    count: usize,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    c_xy: f64,
}

impl Accumulator {
    /// Creates an empty accumulator.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation.
    #[inline]
    pub fn push(&mut self, x: f64, y: f64) {
        self.count += 1;
        let n = self.count as f64;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.c_xy += dx * (y - self.mean_y);
    }

    /// Folds `other` into `self`.
    ///
    /// Merging is exact in real arithmetic; in floating point the result
    /// depends on merge order, which is why callers fix that order.
    pub fn merge(&mut self, other: &Accumulator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let weight = n_a * n_b / n;

        self.mean_x += dx * n_b / n;
        self.mean_y += dy * n_b / n;
        self.m2_x += other.m2_x + dx * dx * weight;
        self.m2_y += other.m2_y + dy * dy * weight;
        self.c_xy += other.c_xy + dx * dy * weight;
        self.count += other.count;
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sample mean of `x`.
    #[inline]
    pub fn mean_x(&self) -> f64 {
        self.mean_x
    }

    /// Sample mean of `y`.
    #[inline]
    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    /// Unbiased sample variance of `x`; NaN below two observations.
    #[inline]
    pub fn variance_x(&self) -> f64 {
        self.unbiased(self.m2_x)
    }

    /// Unbiased sample variance of `y`; NaN below two observations.
    #[inline]
    pub fn variance_y(&self) -> f64 {
        self.unbiased(self.m2_y)
    }

    /// Unbiased sample covariance of `x` and `y`; NaN below two observations.
    #[inline]
    pub fn covariance(&self) -> f64 {
        self.unbiased(self.c_xy)
    }

    /// Regression coefficient `cov(x, y) / var(y)`.
    ///
    /// Zero when the control is (numerically) constant or fewer than two
    /// observations exist.
    pub fn regression_beta(&self) -> f64 {
        let var_y = self.variance_y();
        if var_y.is_nan() || var_y < MIN_CONTROL_VARIANCE {
            0.0
        } else {
            self.covariance() / var_y
        }
    }

    /// Estimate of `E[x]` without correction.
    pub fn plain_estimate(&self) -> Estimate {
        Estimate::from_variance(self.mean_x, self.variance_x(), self.count)
    }

    /// Estimate of `E[x]` using `x - β·(y - y_ref)`.
    ///
    /// The corrected variance is `var_x - 2β·cov + β²·var_y`, floored at zero
    /// against rounding.
    pub fn controlled_estimate(&self, beta: f64, control_reference: f64) -> Estimate {
        let mean = self.mean_x - beta * (self.mean_y - control_reference);
        let variance = if self.count < 2 {
            f64::NAN
        } else {
            (self.variance_x() - 2.0 * beta * self.covariance() + beta * beta * self.variance_y())
                .max(0.0)
        };
        Estimate::from_variance(mean, variance, self.count)
    }

    fn unbiased(&self, moment: f64) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            moment / (self.count - 1) as f64
        }
    }
}

/// Point estimate and its standard error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    /// Sample mean.
    pub mean: f64,
    /// `sqrt(sample_variance / n)`, NaN when fewer than two samples.
    pub std_error: f64,
    /// Number of samples.
    pub samples: usize,
}

impl Estimate {
    fn from_variance(mean: f64, variance: f64, samples: usize) -> Self {
        let std_error = if samples < 2 {
            f64::NAN
        } else {
            (variance / samples as f64).sqrt()
        };
        Self {
            mean,
            std_error,
            samples,
        }
    }
}
