//! Monte Carlo pricing engine.
//!
//! This module provides the orchestration layer for Monte Carlo pricing.
//!
//! # Overview
//!
//! The [`MonteCarloEngine`] coordinates:
//! 1. Per-trial random streams (via [`PricerRng::for_trial`])
//! 2. Path generation (via [`PathGenerator`])
//! 3. Payoff evaluation (via [`PayoffVariant::evaluate`])
//! 4. Discounting and accumulation (via [`Accumulator`])
//! 5. Greeks via bump-and-revalue with common random numbers
//!
//! # Deterministic Reduction
//!
//! Samples are grouped into fixed-size chunks by index. Each chunk owns its
//! path buffer and accumulator; chunk results are collected in index order
//! and folded sequentially. Neither the worker count nor the scheduling
//! order can change the merged moments, so identical inputs give
//! bit-identical prices on one thread or many.
//!
//! # Early Termination
//!
//! A chunk checks the cancellation flag and the wall-clock budget before it
//! starts. Chunks that never start are skipped and the estimate is formed
//! from the completed ones; [`PricingResult::completed`] reports whether any
//! chunk was skipped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use pricer_core::types::{MarketParameters, PricingError};
use pricer_models::analytical::BlackScholes;

use super::config::{AveragingConvention, SimulationConfig, VarianceReduction};
use super::estimator::Accumulator;
use super::paths::{PathGenerator, PricedPath};
use super::payoff::PayoffVariant;
use crate::rng::PricerRng;

/// Greek type for selection.
///
/// - `Delta`: ∂V/∂S - Sensitivity to spot price
/// - `Gamma`: ∂²V/∂S² - Convexity with respect to spot
/// - `Vega`: ∂V/∂σ - Sensitivity to volatility
/// - `Theta`: -∂V/∂T - Value change as calendar time passes
/// - `Rho`: ∂V/∂r - Sensitivity to interest rate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Greek {
    /// Delta: ∂V/∂S
    Delta,
    /// Gamma: ∂²V/∂S²
    Gamma,
    /// Vega: ∂V/∂σ
    Vega,
    /// Theta: -∂V/∂T
    Theta,
    /// Rho: ∂V/∂r
    Rho,
}

impl Greek {
    /// Every Greek the engine can estimate.
    pub const ALL: [Greek; 5] = [Greek::Delta, Greek::Gamma, Greek::Vega, Greek::Theta, Greek::Rho];
}

/// Pricing result with optional Greeks.
///
/// `std_error` is NaN when fewer than two samples completed; such a result
/// is degenerate and [`PricingResult::confidence_interval`] refuses it.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::MarketParameters;
/// use pricer_pricing::mc::{MonteCarloEngine, PayoffVariant, SimulationConfig};
///
/// let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
/// let config = SimulationConfig::builder().n_paths(2_000).n_steps(1).seed(1).build().unwrap();
/// let result = MonteCarloEngine::new(config)
///     .unwrap()
///     .price(&market, PayoffVariant::EuropeanCall)
///     .unwrap();
///
/// let (low, high) = result.confidence_interval(4.0).unwrap();
/// assert!(low < 10.45 && 10.45 < high);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricingResult {
    /// Discounted price estimate.
    pub price: f64,
    /// Standard error of the price estimate (NaN when undefined).
    pub std_error: f64,
    /// Paths simulated, counting both legs of an antithetic pair.
    pub paths_used: usize,
    /// Independent samples the estimator saw.
    pub samples: usize,
    /// Closed-form price for European variants.
    pub reference_value: Option<f64>,
    /// Variance-reduction mode in effect.
    pub variance_reduction: VarianceReduction,
    /// Control-variate coefficient used, in control-variate mode.
    pub control_beta: Option<f64>,
    /// Leading paths retained for diagnostics.
    pub diagnostic_paths: Vec<PricedPath>,
    /// False if cancellation or the time budget skipped any chunk.
    pub completed: bool,
    /// Delta: ∂V/∂S.
    pub delta: Option<f64>,
    /// Gamma: ∂²V/∂S².
    pub gamma: Option<f64>,
    /// Vega: ∂V/∂σ.
    pub vega: Option<f64>,
    /// Theta: -∂V/∂T.
    pub theta: Option<f64>,
    /// Rho: ∂V/∂r.
    pub rho: Option<f64>,
}

impl PricingResult {
    /// Returns true when the standard error is undefined.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.std_error.is_nan()
    }

    /// Returns the 95% confidence interval half-width.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }

    /// Returns the 99% confidence interval half-width.
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.std_error
    }

    /// Returns `price ± z·std_error`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `z` is not finite and positive
    /// - `DegenerateSample` if the standard error is undefined
    pub fn confidence_interval(&self, z: f64) -> Result<(f64, f64), PricingError> {
        if !z.is_finite() || z <= 0.0 {
            return Err(PricingError::invalid_parameter(
                "z",
                z,
                "must be finite and strictly positive",
            ));
        }
        if self.is_degenerate() {
            return Err(PricingError::DegenerateSample {
                samples: self.samples,
            });
        }
        let half_width = z * self.std_error;
        Ok((self.price - half_width, self.price + half_width))
    }
}

/// Where chunks run.
///
/// A dedicated pool is built once per engine and shared by its clones.
#[derive(Clone)]
enum Executor {
    Sequential,
    Global,
    Dedicated(Arc<rayon::ThreadPool>),
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executor::Sequential => f.write_str("Sequential"),
            Executor::Global => f.write_str("Global"),
            Executor::Dedicated(pool) => f
                .debug_tuple("Dedicated")
                .field(&pool.current_num_threads())
                .finish(),
        }
    }
}

impl Executor {
    fn new(workers: Option<usize>) -> Result<Self, PricingError> {
        match workers {
            None => Ok(Executor::Global),
            Some(1) => Ok(Executor::Sequential),
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map(|pool| Executor::Dedicated(Arc::new(pool)))
                .map_err(|e| PricingError::WorkerPool(e.to_string())),
        }
    }

    /// Runs `task` for every chunk index; the output is in index order.
    fn run<F>(&self, n_chunks: usize, task: F) -> Vec<Option<ChunkOutcome>>
    where
        F: Fn(usize) -> Option<ChunkOutcome> + Send + Sync,
    {
        match self {
            Executor::Sequential => (0..n_chunks).map(task).collect(),
            Executor::Global => (0..n_chunks).into_par_iter().map(task).collect(),
            Executor::Dedicated(pool) => {
                pool.install(|| (0..n_chunks).into_par_iter().map(task).collect())
            }
        }
    }
}

/// Early-termination signals checked before each chunk.
struct StopCondition<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a AtomicBool>,
}

impl StopCondition<'_> {
    fn never() -> Self {
        Self {
            deadline: None,
            cancel: None,
        }
    }

    fn should_stop(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Immutable per-run inputs shared by every chunk.
struct RunPlan {
    generator: PathGenerator,
    payoff: PayoffVariant,
    strike: f64,
    discount_factor: f64,
    averaging: AveragingConvention,
    mode: VarianceReduction,
    seed: u64,
    samples: usize,
    chunk_size: usize,
    retain_paths: usize,
}

struct ChunkOutcome {
    accumulator: Accumulator,
    paths: Vec<PricedPath>,
}

impl RunPlan {
    /// Discounted control value of one path.
    ///
    /// European variants use `df·S_T` (expectation: spot); path-dependent
    /// variants use the discounted European payoff of the same side.
    #[inline]
    fn control(&self, path: &PricedPath) -> f64 {
        if self.payoff.is_path_dependent() {
            self.discount_factor * self.payoff.kind().intrinsic(path.terminal(), self.strike)
        } else {
            self.discount_factor * path.terminal()
        }
    }

    fn run_chunk(&self, chunk: usize, stop: &StopCondition<'_>) -> Option<ChunkOutcome> {
        if stop.should_stop() {
            return None;
        }

        let start = chunk * self.chunk_size;
        let end = (start + self.chunk_size).min(self.samples);
        let n_steps = self.generator.n_steps();
        let antithetic = self.mode == VarianceReduction::Antithetic;
        let with_control = self.mode == VarianceReduction::ControlVariate;
        let paths_per_sample = if antithetic { 2 } else { 1 };

        let mut normals = vec![0.0; n_steps];
        let mut path = PricedPath::flat(self.generator.spot(), n_steps);
        let mut accumulator = Accumulator::new();
        let mut retained = Vec::new();

        for sample in start..end {
            let mut rng = PricerRng::for_trial(self.seed, sample as u64);
            rng.fill_normal(&mut normals);

            self.generator.generate(&normals, 1.0, &mut path);
            let mut payoff = self.payoff.evaluate(&path, self.strike, self.averaging);
            let control = if with_control { self.control(&path) } else { 0.0 };
            if sample * paths_per_sample < self.retain_paths {
                retained.push(path.clone());
            }

            if antithetic {
                self.generator.generate(&normals, -1.0, &mut path);
                let mirrored = self.payoff.evaluate(&path, self.strike, self.averaging);
                payoff = 0.5 * (payoff + mirrored);
                if sample * 2 + 1 < self.retain_paths {
                    retained.push(path.clone());
                }
            }

            accumulator.push(self.discount_factor * payoff, control);
        }

        Some(ChunkOutcome {
            accumulator,
            paths: retained,
        })
    }
}

/// Monte Carlo pricing engine.
///
/// Holds a validated [`SimulationConfig`] and the worker pool it asks for;
/// every pricing call is independent and the engine can be shared across
/// threads. Clones share the pool.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::MarketParameters;
/// use pricer_pricing::mc::{MonteCarloEngine, PayoffVariant, SimulationConfig};
///
/// let market = MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
/// let config = SimulationConfig::builder()
///     .n_paths(5_000)
///     .n_steps(50)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let engine = MonteCarloEngine::new(config).unwrap();
/// let asian = engine.price(&market, PayoffVariant::AsianCall).unwrap();
/// assert!(asian.price > 0.0);
/// assert!(asian.reference_value.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct MonteCarloEngine {
    config: SimulationConfig,
    executor: Executor,
}

impl MonteCarloEngine {
    /// Creates a new engine.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if the configuration fails validation
    /// - `WorkerPool` if a dedicated worker pool cannot be built
    pub fn new(config: SimulationConfig) -> Result<Self, PricingError> {
        config.validate()?;
        let executor = Executor::new(config.workers())?;
        Ok(Self { config, executor })
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Prices `payoff` under `market`.
    ///
    /// # Errors
    ///
    /// - `InsufficientResolution` if the payoff needs more time steps
    /// - `DegenerateSample` if no sample completes
    pub fn price(
        &self,
        market: &MarketParameters,
        payoff: PayoffVariant,
    ) -> Result<PricingResult, PricingError> {
        let stop = StopCondition {
            deadline: self.deadline(),
            cancel: None,
        };
        self.simulate(&self.config, market, payoff, &stop)
    }

    /// Prices `payoff`, stopping early once `cancel` is set.
    ///
    /// Chunks already running finish; the estimate uses every completed
    /// chunk and `completed` is false if any chunk was skipped.
    pub fn price_with_cancel(
        &self,
        market: &MarketParameters,
        payoff: PayoffVariant,
        cancel: &AtomicBool,
    ) -> Result<PricingResult, PricingError> {
        let stop = StopCondition {
            deadline: self.deadline(),
            cancel: Some(cancel),
        };
        self.simulate(&self.config, market, payoff, &stop)
    }

    /// Prices `payoff` and estimates the requested Greeks by central
    /// bump-and-revalue.
    ///
    /// Every revaluation reuses the base seed, so bumped runs see the same
    /// variates (common random numbers). The time budget is ignored here:
    /// a truncated revaluation would no longer share its sample with the
    /// base run.
    ///
    /// | Greek | Bump |
    /// |-------|------|
    /// | Delta, Gamma | 1% of spot |
    /// | Vega | 0.01 absolute, at most σ/2 |
    /// | Rho | 0.01 absolute |
    /// | Theta | one calendar day, at most T/2 (forward difference) |
    pub fn price_with_greeks(
        &self,
        market: &MarketParameters,
        payoff: PayoffVariant,
        greeks: &[Greek],
    ) -> Result<PricingResult, PricingError> {
        let config = self.config.without_time_budget();
        let stop = StopCondition::never();
        let revalue = |bumped: MarketParameters| -> Result<f64, PricingError> {
            Ok(self.simulate(&config, &bumped, payoff, &stop)?.price)
        };

        let mut result = self.simulate(&config, market, payoff, &stop)?;
        let base = result.price;

        let needs_spot = greeks.iter().any(|g| matches!(g, Greek::Delta | Greek::Gamma));
        let spot_ladder = if needs_spot {
            let h = 0.01 * market.spot();
            let up = revalue(market.with_spot(market.spot() + h)?)?;
            let down = revalue(market.with_spot(market.spot() - h)?)?;
            Some((h, up, down))
        } else {
            None
        };

        for greek in greeks {
            match greek {
                Greek::Delta => {
                    if let Some((h, up, down)) = spot_ladder {
                        result.delta = Some((up - down) / (2.0 * h));
                    }
                }
                Greek::Gamma => {
                    if let Some((h, up, down)) = spot_ladder {
                        result.gamma = Some((up - 2.0 * base + down) / (h * h));
                    }
                }
                Greek::Vega => {
                    let h = 0.01_f64.min(0.5 * market.volatility());
                    let up = revalue(market.with_volatility(market.volatility() + h)?)?;
                    let down = revalue(market.with_volatility(market.volatility() - h)?)?;
                    result.vega = Some((up - down) / (2.0 * h));
                }
                Greek::Rho => {
                    let h = 0.01;
                    let up = revalue(market.with_rate(market.rate() + h)?)?;
                    let down = revalue(market.with_rate(market.rate() - h)?)?;
                    result.rho = Some((up - down) / (2.0 * h));
                }
                Greek::Theta => {
                    let h = (1.0 / 365.0_f64).min(0.5 * market.maturity());
                    let shorter = revalue(market.with_maturity(market.maturity() - h)?)?;
                    result.theta = Some((shorter - base) / h);
                }
            }
            debug!("Estimated {:?} for {}", greek, payoff);
        }

        Ok(result)
    }

    fn deadline(&self) -> Option<Instant> {
        self.config
            .time_budget()
            .and_then(|budget| Instant::now().checked_add(budget))
    }

    fn simulate(
        &self,
        config: &SimulationConfig,
        market: &MarketParameters,
        payoff: PayoffVariant,
        stop: &StopCondition<'_>,
    ) -> Result<PricingResult, PricingError> {
        let span = info_span!("mc_price", payoff = %payoff, seed = config.seed());
        let _guard = span.enter();

        payoff.check_resolution(config.n_steps())?;
        let mode = config.variance_reduction();
        let samples = config.sample_count();
        if samples == 0 {
            return Err(PricingError::DegenerateSample { samples: 0 });
        }

        info!(
            "Monte Carlo pricing {}: {} paths, {} steps, seed {}, {:?}",
            payoff,
            config.n_paths(),
            config.n_steps(),
            config.seed(),
            mode
        );

        let plan = RunPlan {
            generator: PathGenerator::new(market, config.n_steps()),
            payoff,
            strike: market.strike(),
            discount_factor: market.discount_factor(),
            averaging: config.averaging(),
            mode,
            seed: config.seed(),
            samples,
            chunk_size: config.chunk_size(),
            retain_paths: config.retain_paths(),
        };
        let n_chunks = samples.div_ceil(plan.chunk_size);
        debug!(
            "{} samples in {} chunks of up to {}, dt = {:.6}",
            samples,
            n_chunks,
            plan.chunk_size,
            plan.generator.dt()
        );

        let outcomes = self.executor.run(n_chunks, |chunk| plan.run_chunk(chunk, stop));

        let mut accumulator = Accumulator::new();
        let mut diagnostic_paths = Vec::new();
        let mut completed_chunks = 0;
        for outcome in outcomes.into_iter().flatten() {
            accumulator.merge(&outcome.accumulator);
            diagnostic_paths.extend(outcome.paths);
            completed_chunks += 1;
        }
        diagnostic_paths.truncate(plan.retain_paths);
        let completed = completed_chunks == n_chunks;
        if !completed {
            warn!(
                "Simulation stopped early: {} of {} chunks completed",
                completed_chunks, n_chunks
            );
        }
        if accumulator.count() == 0 {
            return Err(PricingError::DegenerateSample { samples: 0 });
        }

        let closed_form = BlackScholes::new(*market).price(payoff.kind());
        let (estimate, control_beta) = match mode {
            VarianceReduction::ControlVariate => {
                let beta = config
                    .control_beta()
                    .unwrap_or_else(|| accumulator.regression_beta());
                let reference = if payoff.is_path_dependent() {
                    closed_form
                } else {
                    market.spot()
                };
                debug!("Control variate beta = {:.6}", beta);
                (accumulator.controlled_estimate(beta, reference), Some(beta))
            }
            VarianceReduction::None | VarianceReduction::Antithetic => {
                (accumulator.plain_estimate(), None)
            }
        };

        if estimate.std_error.is_nan() {
            warn!(
                "Degenerate sample: {} sample(s), standard error undefined",
                estimate.samples
            );
        }
        info!(
            "Monte Carlo {} price {:.6} (std error {:.6}, {} samples)",
            payoff, estimate.mean, estimate.std_error, estimate.samples
        );

        Ok(PricingResult {
            price: estimate.mean,
            std_error: estimate.std_error,
            paths_used: estimate.samples * config.paths_per_sample(),
            samples: estimate.samples,
            reference_value: (!payoff.is_path_dependent()).then_some(closed_form),
            variance_reduction: mode,
            control_beta,
            diagnostic_paths,
            completed,
            delta: None,
            gamma: None,
            vega: None,
            theta: None,
            rho: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn market() -> MarketParameters {
        MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).unwrap()
    }

    fn engine(builder: crate::mc::SimulationConfigBuilder) -> MonteCarloEngine {
        MonteCarloEngine::new(builder.build().unwrap()).unwrap()
    }

    fn base(n_paths: usize, n_steps: usize) -> crate::mc::SimulationConfigBuilder {
        SimulationConfig::builder()
            .n_paths(n_paths)
            .n_steps(n_steps)
            .seed(2024)
    }

    // ========================================================================
    // Validation and degenerate samples
    // ========================================================================

    #[test]
    fn test_path_dependent_rejects_single_step() {
        let engine = engine(base(100, 1));
        for payoff in [
            PayoffVariant::AsianCall,
            PayoffVariant::AsianPut,
            PayoffVariant::LookbackCall,
            PayoffVariant::LookbackPut,
        ] {
            let err = engine.price(&market(), payoff).unwrap_err();
            assert!(matches!(
                err,
                PricingError::InsufficientResolution { n_steps: 1, .. }
            ));
        }
        assert!(engine.price(&market(), PayoffVariant::EuropeanPut).is_ok());
    }

    #[test]
    fn test_single_path_is_degenerate() {
        let result = engine(base(1, 1))
            .price(&market(), PayoffVariant::EuropeanCall)
            .unwrap();
        assert!(result.std_error.is_nan());
        assert!(result.is_degenerate());
        assert_eq!(result.samples, 1);
        assert!(matches!(
            result.confidence_interval(1.96),
            Err(PricingError::DegenerateSample { samples: 1 })
        ));
    }

    #[test]
    fn test_antithetic_single_path_has_no_sample() {
        let engine = engine(base(1, 1).variance_reduction(VarianceReduction::Antithetic));
        assert_eq!(
            engine.price(&market(), PayoffVariant::EuropeanCall),
            Err(PricingError::DegenerateSample { samples: 0 })
        );
    }

    #[test]
    fn test_antithetic_odd_count_discards_remainder() {
        let result = engine(base(1001, 1).variance_reduction(VarianceReduction::Antithetic))
            .price(&market(), PayoffVariant::EuropeanCall)
            .unwrap();
        assert_eq!(result.samples, 500);
        assert_eq!(result.paths_used, 1000);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = AtomicBool::new(true);
        let result = engine(base(1000, 1)).price_with_cancel(
            &market(),
            PayoffVariant::EuropeanCall,
            &cancel,
        );
        assert_eq!(result, Err(PricingError::DegenerateSample { samples: 0 }));
    }

    #[test]
    fn test_zero_time_budget_completes_nothing() {
        let engine = engine(base(1000, 1).time_budget(Duration::ZERO));
        assert_eq!(
            engine.price(&market(), PayoffVariant::EuropeanCall),
            Err(PricingError::DegenerateSample { samples: 0 })
        );
    }

    #[test]
    fn test_uncancelled_run_completes() {
        let cancel = AtomicBool::new(false);
        let result = engine(base(1000, 4).chunk_size(100))
            .price_with_cancel(&market(), PayoffVariant::AsianPut, &cancel)
            .unwrap();
        assert!(result.completed);
        assert_eq!(result.samples, 1000);
    }

    // ========================================================================
    // Result shape
    // ========================================================================

    #[test]
    fn test_reference_value_only_for_european() {
        let engine = engine(base(500, 4));
        let european = engine.price(&market(), PayoffVariant::EuropeanCall).unwrap();
        let reference = european.reference_value.unwrap();
        assert_relative_eq!(reference, 10.450583572185565, epsilon = 1e-8);

        let lookback = engine.price(&market(), PayoffVariant::LookbackCall).unwrap();
        assert!(lookback.reference_value.is_none());
    }

    #[test]
    fn test_retained_paths() {
        let result = engine(base(100, 5).retain_paths(3).chunk_size(2))
            .price(&market(), PayoffVariant::AsianCall)
            .unwrap();
        assert_eq!(result.diagnostic_paths.len(), 3);
        for path in &result.diagnostic_paths {
            assert_eq!(path.n_steps(), 5);
            assert_eq!(path.initial(), 100.0);
        }

        let antithetic = engine(
            base(100, 5)
                .retain_paths(4)
                .variance_reduction(VarianceReduction::Antithetic),
        )
        .price(&market(), PayoffVariant::AsianCall)
        .unwrap();
        assert_eq!(antithetic.diagnostic_paths.len(), 4);
    }

    #[test]
    fn test_chunk_layout_independent_of_worker_count() {
        let sequential = engine(base(3000, 3).workers(1).chunk_size(256))
            .price(&market(), PayoffVariant::LookbackPut)
            .unwrap();
        let parallel = engine(base(3000, 3).workers(3).chunk_size(256))
            .price(&market(), PayoffVariant::LookbackPut)
            .unwrap();
        assert_eq!(sequential.price.to_bits(), parallel.price.to_bits());
        assert_eq!(sequential.std_error.to_bits(), parallel.std_error.to_bits());
    }

    #[test]
    fn test_confidence_helpers() {
        let result = engine(base(2000, 1))
            .price(&market(), PayoffVariant::EuropeanPut)
            .unwrap();
        assert_relative_eq!(result.confidence_95(), 1.96 * result.std_error, epsilon = 1e-15);
        assert_relative_eq!(result.confidence_99(), 2.576 * result.std_error, epsilon = 1e-15);
        let (low, high) = result.confidence_interval(2.0).unwrap();
        assert_relative_eq!(high - low, 4.0 * result.std_error, epsilon = 1e-12);
        assert!(result.confidence_interval(0.0).is_err());
    }

    // ========================================================================
    // Control variate
    // ========================================================================

    #[test]
    fn test_control_variate_reports_beta() {
        let result = engine(base(5000, 1).variance_reduction(VarianceReduction::ControlVariate))
            .price(&market(), PayoffVariant::EuropeanCall)
            .unwrap();
        let beta = result.control_beta.unwrap();
        assert!(beta > 0.0 && beta < 1.5, "beta = {}", beta);

        let fixed = engine(
            base(5000, 1)
                .variance_reduction(VarianceReduction::ControlVariate)
                .control_beta(0.0),
        )
        .price(&market(), PayoffVariant::EuropeanCall)
        .unwrap();
        let plain = engine(base(5000, 1))
            .price(&market(), PayoffVariant::EuropeanCall)
            .unwrap();
        assert_relative_eq!(fixed.price, plain.price, epsilon = 1e-10);
    }

    // ========================================================================
    // Greeks
    // ========================================================================

    #[test]
    fn test_greeks_only_requested_are_filled() {
        let result = engine(base(2000, 1))
            .price_with_greeks(&market(), PayoffVariant::EuropeanCall, &[Greek::Delta])
            .unwrap();
        assert!(result.delta.is_some());
        assert!(result.gamma.is_none());
        assert!(result.vega.is_none());
        assert!(result.theta.is_none());
        assert!(result.rho.is_none());
    }

    #[test]
    fn test_greeks_serialise() {
        let result = engine(base(10, 1))
            .price_with_greeks(&market(), PayoffVariant::EuropeanCall, &Greek::ALL)
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["samples"], 10);
        assert!(json["delta"].is_number());
        assert_eq!(json["variance_reduction"], "none");
    }

    // ========================================================================
    // Worker pool
    // ========================================================================

    #[test]
    fn test_executor_follows_worker_count() {
        assert!(matches!(engine(base(10, 1)).executor, Executor::Global));
        assert!(matches!(engine(base(10, 1).workers(1)).executor, Executor::Sequential));
        match &engine(base(10, 1).workers(3)).executor {
            Executor::Dedicated(pool) => assert_eq!(pool.current_num_threads(), 3),
            other => panic!("Expected a dedicated pool, got {:?}", other),
        }
    }

    #[test]
    fn test_dedicated_pool_built_once_and_shared_by_clones() {
        let engine = engine(base(2_000, 4).workers(2));
        let pool = match &engine.executor {
            Executor::Dedicated(pool) => Arc::clone(pool),
            other => panic!("Expected a dedicated pool, got {:?}", other),
        };

        let first = engine.price(&market(), PayoffVariant::AsianCall).unwrap();
        let second = engine.price(&market(), PayoffVariant::AsianCall).unwrap();
        assert_eq!(first.price.to_bits(), second.price.to_bits());

        let cloned = engine.clone();
        match &cloned.executor {
            Executor::Dedicated(shared) => assert!(Arc::ptr_eq(shared, &pool)),
            other => panic!("Expected a dedicated pool, got {:?}", other),
        }
        // Engine, its clone and the local handle
        assert_eq!(Arc::strong_count(&pool), 3);
    }
}
