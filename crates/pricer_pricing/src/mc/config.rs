//! Monte Carlo simulation configuration.
//!
//! This module provides [`SimulationConfig`] and its builder, the
//! variance-reduction and Asian-averaging choices, and TOML loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use pricer_core::types::PricingError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: usize = 10_000;

/// Maximum number of paths that may be retained for diagnostics.
pub const MAX_RETAINED_PATHS: usize = 10_000;

/// Trials per reduction chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Seed used when the builder is not given one.
pub const DEFAULT_SEED: u64 = 42;

/// Variance-reduction technique applied by the estimator.
///
/// - `None`: plain independent trials
/// - `Antithetic`: each variate sequence `Z` also drives a `-Z` path and the
///   two payoffs are averaged into one sample
/// - `ControlVariate`: the estimator corrects each payoff with a control whose
///   expectation is known in closed form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceReduction {
    /// No variance reduction.
    #[default]
    None,
    /// Antithetic variate pairs.
    Antithetic,
    /// Control variate correction.
    ControlVariate,
}

/// Which points of a path enter the Asian arithmetic average.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingConvention {
    /// All `n_steps + 1` points, including the initial spot.
    #[default]
    IncludeInitial,
    /// The `n_steps` simulated points only.
    ExcludeInitial,
}

/// Monte Carlo simulation configuration.
///
/// Immutable configuration specifying simulation parameters.
/// Use [`SimulationConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{SimulationConfig, VarianceReduction};
///
/// let config = SimulationConfig::builder()
///     .n_paths(10_000)
///     .n_steps(252)
///     .seed(42)
///     .variance_reduction(VarianceReduction::Antithetic)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_paths(), 10_000);
/// assert_eq!(config.n_steps(), 252);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimulationConfig", into = "RawSimulationConfig")]
pub struct SimulationConfig {
    n_paths: usize,
    n_steps: usize,
    seed: u64,
    variance_reduction: VarianceReduction,
    averaging: AveragingConvention,
    control_beta: Option<f64>,
    workers: Option<usize>,
    chunk_size: usize,
    time_budget: Option<Duration>,
    retain_paths: usize,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Returns the number of simulation paths requested.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Returns the number of time steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Returns the base seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the variance-reduction mode.
    #[inline]
    pub fn variance_reduction(&self) -> VarianceReduction {
        self.variance_reduction
    }

    /// Returns the Asian averaging convention.
    #[inline]
    pub fn averaging(&self) -> AveragingConvention {
        self.averaging
    }

    /// Returns the fixed control-variate coefficient, if any.
    ///
    /// `None` means β is estimated by regression on the simulated sample.
    #[inline]
    pub fn control_beta(&self) -> Option<f64> {
        self.control_beta
    }

    /// Returns the worker count (`None` uses the global rayon pool).
    #[inline]
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    /// Returns the number of trials per reduction chunk.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the wall-clock budget, if any.
    #[inline]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    /// Returns the number of leading paths kept for diagnostics.
    #[inline]
    pub fn retain_paths(&self) -> usize {
        self.retain_paths
    }

    /// Number of independent samples the estimator will see.
    ///
    /// In antithetic mode each sample is a pair of paths and an odd path
    /// count leaves its last path unused.
    #[inline]
    pub fn sample_count(&self) -> usize {
        match self.variance_reduction {
            VarianceReduction::Antithetic => self.n_paths / 2,
            VarianceReduction::None | VarianceReduction::ControlVariate => self.n_paths,
        }
    }

    /// Number of paths a sample consumes.
    #[inline]
    pub fn paths_per_sample(&self) -> usize {
        match self.variance_reduction {
            VarianceReduction::Antithetic => 2,
            VarianceReduction::None | VarianceReduction::ControlVariate => 1,
        }
    }

    /// Returns a copy with the wall-clock budget removed.
    pub fn without_time_budget(&self) -> Self {
        Self {
            time_budget: None,
            ..self.clone()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidParameter` if:
    /// - `n_paths` is 0 or greater than 10,000,000
    /// - `n_steps` is 0 or greater than 10,000
    /// - `chunk_size` is 0
    /// - `workers` is `Some(0)`
    /// - `control_beta` is not finite
    /// - `retain_paths` exceeds 10,000
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(PricingError::invalid_parameter(
                "n_paths",
                self.n_paths,
                "must be in range [1, 10_000_000]",
            ));
        }
        if self.n_steps == 0 || self.n_steps > MAX_STEPS {
            return Err(PricingError::invalid_parameter(
                "n_steps",
                self.n_steps,
                "must be in range [1, 10_000]",
            ));
        }
        if self.chunk_size == 0 {
            return Err(PricingError::invalid_parameter(
                "chunk_size",
                self.chunk_size,
                "must be at least 1",
            ));
        }
        if self.workers == Some(0) {
            return Err(PricingError::invalid_parameter(
                "workers",
                0,
                "must be at least 1",
            ));
        }
        if let Some(beta) = self.control_beta {
            if !beta.is_finite() {
                return Err(PricingError::invalid_parameter(
                    "control_beta",
                    beta,
                    "must be finite",
                ));
            }
        }
        if self.retain_paths > MAX_RETAINED_PATHS {
            return Err(PricingError::invalid_parameter(
                "retain_paths",
                self.retain_paths,
                "must not exceed 10_000",
            ));
        }
        Ok(())
    }

    /// Parses and validates a configuration from a TOML document.
    ///
    /// Only `n_paths` and `n_steps` are required; `time_budget_ms` gives the
    /// wall-clock budget in milliseconds.
    ///
    /// ```rust
    /// use pricer_pricing::mc::{SimulationConfig, VarianceReduction};
    ///
    /// let config = SimulationConfig::from_toml_str(
    ///     r#"
    ///     n_paths = 50000
    ///     n_steps = 50
    ///     seed = 7
    ///     variance_reduction = "antithetic"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.variance_reduction(), VarianceReduction::Antithetic);
    /// ```
    ///
    /// # Errors
    ///
    /// - `Config` for malformed TOML, missing counts or unknown keys
    /// - `InvalidParameter` if a parsed value fails [`validate`](Self::validate)
    pub fn from_toml_str(content: &str) -> Result<Self, PricingError> {
        let raw: RawSimulationConfig = toml::from_str(content).map_err(|e| {
            PricingError::Config(format!("Failed to parse simulation TOML: {}", e))
        })?;
        Self::try_from(raw)
    }

    /// Reads and validates a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PricingError::Config(format!("Failed to read simulation config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Builder for [`SimulationConfig`].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use pricer_pricing::mc::{AveragingConvention, SimulationConfig};
///
/// let config = SimulationConfig::builder()
///     .n_paths(50_000)
///     .n_steps(252)
///     .averaging(AveragingConvention::ExcludeInitial)
///     .workers(4)
///     .time_budget(Duration::from_secs(2))
///     .build()
///     .expect("valid config");
/// assert_eq!(config.workers(), Some(4));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    n_paths: Option<usize>,
    n_steps: Option<usize>,
    seed: Option<u64>,
    variance_reduction: VarianceReduction,
    averaging: AveragingConvention,
    control_beta: Option<f64>,
    workers: Option<usize>,
    chunk_size: Option<usize>,
    time_budget: Option<Duration>,
    retain_paths: usize,
}

impl SimulationConfigBuilder {
    /// Sets the number of simulation paths, in [1, 10_000_000].
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the number of time steps per path, in [1, 10_000].
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    /// Sets the base seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the variance-reduction mode.
    #[inline]
    pub fn variance_reduction(mut self, mode: VarianceReduction) -> Self {
        self.variance_reduction = mode;
        self
    }

    /// Sets the Asian averaging convention.
    #[inline]
    pub fn averaging(mut self, averaging: AveragingConvention) -> Self {
        self.averaging = averaging;
        self
    }

    /// Fixes the control-variate coefficient instead of estimating it.
    #[inline]
    pub fn control_beta(mut self, beta: f64) -> Self {
        self.control_beta = Some(beta);
        self
    }

    /// Runs on a dedicated pool of `workers` threads; 1 runs sequentially.
    #[inline]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets the number of trials per reduction chunk.
    #[inline]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Sets a wall-clock budget after which no further chunks are started.
    #[inline]
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Keeps the first `count` simulated paths in the result.
    #[inline]
    pub fn retain_paths(mut self, count: usize) -> Self {
        self.retain_paths = count;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidParameter` if `n_paths` or `n_steps` is
    /// not set, or if [`SimulationConfig::validate`] rejects the result.
    pub fn build(self) -> Result<SimulationConfig, PricingError> {
        let n_paths = self.n_paths.ok_or_else(|| {
            PricingError::invalid_parameter("n_paths", "unset", "must be specified")
        })?;
        let n_steps = self.n_steps.ok_or_else(|| {
            PricingError::invalid_parameter("n_steps", "unset", "must be specified")
        })?;

        let config = SimulationConfig {
            n_paths,
            n_steps,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            variance_reduction: self.variance_reduction,
            averaging: self.averaging,
            control_beta: self.control_beta,
            workers: self.workers,
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            time_budget: self.time_budget,
            retain_paths: self.retain_paths,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Flat wire form of [`SimulationConfig`].
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSimulationConfig {
    n_paths: usize,
    n_steps: usize,
    #[serde(default = "default_seed")]
    seed: u64,
    #[serde(default)]
    variance_reduction: VarianceReduction,
    #[serde(default)]
    averaging: AveragingConvention,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    control_beta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workers: Option<usize>,
    #[serde(default = "default_chunk_size")]
    chunk_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_budget_ms: Option<u64>,
    #[serde(default)]
    retain_paths: usize,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl TryFrom<RawSimulationConfig> for SimulationConfig {
    type Error = PricingError;

    fn try_from(raw: RawSimulationConfig) -> Result<Self, Self::Error> {
        let mut builder = SimulationConfig::builder()
            .n_paths(raw.n_paths)
            .n_steps(raw.n_steps)
            .seed(raw.seed)
            .variance_reduction(raw.variance_reduction)
            .averaging(raw.averaging)
            .chunk_size(raw.chunk_size)
            .retain_paths(raw.retain_paths);
        if let Some(beta) = raw.control_beta {
            builder = builder.control_beta(beta);
        }
        if let Some(workers) = raw.workers {
            builder = builder.workers(workers);
        }
        if let Some(ms) = raw.time_budget_ms {
            builder = builder.time_budget(Duration::from_millis(ms));
        }
        builder.build()
    }
}

impl From<SimulationConfig> for RawSimulationConfig {
    fn from(config: SimulationConfig) -> Self {
        Self {
            n_paths: config.n_paths,
            n_steps: config.n_steps,
            seed: config.seed,
            variance_reduction: config.variance_reduction,
            averaging: config.averaging,
            control_beta: config.control_beta,
            workers: config.workers,
            chunk_size: config.chunk_size,
            time_budget_ms: config
                .time_budget
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            retain_paths: config.retain_paths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimulationConfigBuilder {
        SimulationConfig::builder().n_paths(1000).n_steps(100)
    }

    fn rejected_name(result: Result<SimulationConfig, PricingError>) -> &'static str {
        match result {
            Err(PricingError::InvalidParameter { name, .. }) => name,
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    #[test]
    fn test_builder_defaults() {
        let config = base().build().unwrap();

        assert_eq!(config.n_paths(), 1000);
        assert_eq!(config.n_steps(), 100);
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.variance_reduction(), VarianceReduction::None);
        assert_eq!(config.averaging(), AveragingConvention::IncludeInitial);
        assert_eq!(config.control_beta(), None);
        assert_eq!(config.workers(), None);
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.time_budget(), None);
        assert_eq!(config.retain_paths(), 0);
    }

    #[test]
    fn test_builder_all_fields() {
        let config = base()
            .seed(7)
            .variance_reduction(VarianceReduction::ControlVariate)
            .averaging(AveragingConvention::ExcludeInitial)
            .control_beta(0.9)
            .workers(3)
            .chunk_size(128)
            .time_budget(Duration::from_millis(250))
            .retain_paths(5)
            .build()
            .unwrap();

        assert_eq!(config.seed(), 7);
        assert_eq!(config.control_beta(), Some(0.9));
        assert_eq!(config.workers(), Some(3));
        assert_eq!(config.chunk_size(), 128);
        assert_eq!(config.time_budget(), Some(Duration::from_millis(250)));
        assert_eq!(config.retain_paths(), 5);
    }

    #[test]
    fn test_missing_counts() {
        assert_eq!(rejected_name(SimulationConfig::builder().n_steps(10).build()), "n_paths");
        assert_eq!(rejected_name(SimulationConfig::builder().n_paths(10).build()), "n_steps");
    }

    #[test]
    fn test_out_of_range_values() {
        assert_eq!(rejected_name(base().n_paths(0).build()), "n_paths");
        assert_eq!(rejected_name(base().n_paths(MAX_PATHS + 1).build()), "n_paths");
        assert_eq!(rejected_name(base().n_steps(0).build()), "n_steps");
        assert_eq!(rejected_name(base().n_steps(MAX_STEPS + 1).build()), "n_steps");
        assert_eq!(rejected_name(base().chunk_size(0).build()), "chunk_size");
        assert_eq!(rejected_name(base().workers(0).build()), "workers");
        assert_eq!(rejected_name(base().control_beta(f64::NAN).build()), "control_beta");
        assert_eq!(
            rejected_name(base().retain_paths(MAX_RETAINED_PATHS + 1).build()),
            "retain_paths"
        );
    }

    #[test]
    fn test_sample_count_antithetic_discards_remainder() {
        let config = base()
            .n_paths(1001)
            .variance_reduction(VarianceReduction::Antithetic)
            .build()
            .unwrap();
        assert_eq!(config.sample_count(), 500);
        assert_eq!(config.paths_per_sample(), 2);

        let plain = base().n_paths(1001).build().unwrap();
        assert_eq!(plain.sample_count(), 1001);
        assert_eq!(plain.paths_per_sample(), 1);
    }

    #[test]
    fn test_without_budget() {
        let config = base().time_budget(Duration::from_secs(1)).build().unwrap();
        assert_eq!(config.without_time_budget().time_budget(), None);
        assert_eq!(config.without_time_budget().n_paths(), 1000);
    }

    // ========================================================================
    // TOML
    // ========================================================================

    #[test]
    fn test_from_toml_full() {
        let config = SimulationConfig::from_toml_str(
            r#"
            n_paths = 20000
            n_steps = 12
            seed = 99
            variance_reduction = "control_variate"
            averaging = "exclude_initial"
            control_beta = 1.0
            workers = 2
            chunk_size = 512
            time_budget_ms = 1500
            retain_paths = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.n_paths(), 20_000);
        assert_eq!(config.variance_reduction(), VarianceReduction::ControlVariate);
        assert_eq!(config.averaging(), AveragingConvention::ExcludeInitial);
        assert_eq!(config.time_budget(), Some(Duration::from_millis(1500)));
        assert_eq!(config.retain_paths(), 3);
    }

    #[test]
    fn test_from_toml_validates() {
        let result = SimulationConfig::from_toml_str("n_paths = 0\nn_steps = 10\n");
        assert_eq!(rejected_name(result), "n_paths");

        let result = SimulationConfig::from_toml_str("n_paths = 10\nn_steps = 10\nworkers = 0\n");
        assert_eq!(rejected_name(result), "workers");

        let result = SimulationConfig::from_toml_str("n_paths = 10\nn_steps = 20000\n");
        assert_eq!(rejected_name(result), "n_steps");
    }

    #[test]
    fn test_from_toml_parse_errors_are_config() {
        let result = SimulationConfig::from_toml_str("n_steps = 10\n");
        assert!(matches!(result, Err(PricingError::Config(_))));

        let result = SimulationConfig::from_toml_str("n_paths = -1\nn_steps = 10\n");
        assert!(matches!(result, Err(PricingError::Config(_))));

        let result = SimulationConfig::from_toml_str("n_paths = 10\nn_steps = 10\nbogus = 1\n");
        assert!(matches!(result, Err(PricingError::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = base()
            .variance_reduction(VarianceReduction::Antithetic)
            .time_budget(Duration::from_millis(40))
            .build()
            .unwrap();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SimulationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file_missing() {
        let result = SimulationConfig::from_file("/nonexistent/simulation.toml");
        assert!(matches!(result, Err(PricingError::Config(_))));
    }
}
