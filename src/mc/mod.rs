//! Seeded Monte Carlo valuation of European calls under GBM.
//!
//! One algorithm: `steps` log-space Euler steps over `paths` paths, discounted mean
//! of the terminal call payoff. The implementation walks time steps and updates all
//! paths per step; variance reduction (antithetic pairs, moment matching, terminal
//! spot control variate) is opt-in through [`McConfig`].
//!
//! Reproducibility: every run seeds a fresh `StdRng` from [`McConfig::seed`], so the
//! same configuration yields a bit-identical estimate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::validate_sigma;
use crate::core::{OptionContract, OptionType, PricingError};

pub mod convergence;
pub mod simulation;

pub use convergence::{ConvergencePoint, convergence_study};
pub use simulation::{LogEulerGbm, SimulationPath};

use simulation::StepNormals;

/// Monte Carlo run settings.
///
/// # Examples
/// ```
/// use bsmvol::core::OptionContract;
/// use bsmvol::mc::{McConfig, simulate_with};
///
/// let contract = OptionContract::new(100.0, 105.0, 1.0, 0.05);
/// let config = McConfig::new(50, 20_000, 7).with_control_variate(true);
/// let estimate = simulate_with(&contract, 0.2, &config).unwrap();
/// assert!((estimate.price - 8.021).abs() < 5.0 * estimate.stderr + 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McConfig {
    /// Time steps `M` per path.
    pub steps: usize,
    /// Path count `I`; rounded up to even under antithetic sampling.
    pub paths: usize,
    /// RNG seed.
    pub seed: u64,
    /// Mirror every draw (`z`, `-z`).
    pub antithetic: bool,
    /// Standardize each step's draws to exact sample moments.
    pub moment_matching: bool,
    /// Regress the payoff on the discounted terminal spot (known mean `S0`).
    pub control_variate: bool,
}

impl Default for McConfig {
    fn default() -> Self {
        Self {
            steps: 50,
            paths: 250_000,
            seed: 42,
            antithetic: false,
            moment_matching: false,
            control_variate: false,
        }
    }
}

impl McConfig {
    /// Plain Monte Carlo with the given discretization, path count and seed.
    pub fn new(steps: usize, paths: usize, seed: u64) -> Self {
        Self {
            steps,
            paths,
            seed,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_paths(mut self, paths: usize) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    pub fn with_moment_matching(mut self, moment_matching: bool) -> Self {
        self.moment_matching = moment_matching;
        self
    }

    pub fn with_control_variate(mut self, control_variate: bool) -> Self {
        self.control_variate = control_variate;
        self
    }

    /// Checks `steps >= 1`, `paths >= 1`, and that the simulated path count fits.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.steps == 0 {
            return Err(PricingError::InvalidInput("steps must be > 0".to_string()));
        }
        if self.paths == 0 {
            return Err(PricingError::InvalidInput("paths must be > 0".to_string()));
        }
        self.simulated_paths().map(|_| ())
    }

    /// Paths actually simulated: `paths`, rounded up to even under antithetic sampling.
    pub fn simulated_paths(&self) -> Result<usize, PricingError> {
        if !self.antithetic {
            return Ok(self.paths);
        }
        self.paths.div_ceil(2).checked_mul(2).ok_or_else(|| {
            PricingError::InvalidInput(format!(
                "{} paths cannot be rounded up to an even count",
                self.paths
            ))
        })
    }
}

/// Monte Carlo price with its sampling error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McEstimate {
    /// Discounted sample-mean payoff.
    pub price: f64,
    /// Standard error of `price`, over antithetic pair means when pairs are used.
    pub stderr: f64,
    /// Paths simulated.
    pub paths: usize,
    /// Time steps per path.
    pub steps: usize,
}

fn check_inputs(
    contract: &OptionContract,
    sigma: f64,
    config: &McConfig,
) -> Result<(), PricingError> {
    contract.validate()?;
    validate_sigma(sigma)?;
    config.validate()
}

/// Steps every path in batch and hands the levels after each step to `on_step`.
/// Returns the terminal levels.
fn walk_paths(
    contract: &OptionContract,
    sigma: f64,
    config: &McConfig,
    mut on_step: impl FnMut(&[f64]),
) -> Result<Vec<f64>, PricingError> {
    let n = config.simulated_paths()?;
    let dt = contract.maturity / config.steps as f64;
    let gbm = LogEulerGbm::new(contract.rate, sigma, dt);
    let mut normals = StepNormals::new(config.seed, n, config.antithetic, config.moment_matching);

    let mut levels = vec![contract.spot; n];
    for _ in 0..config.steps {
        let z = normals.next_step();
        for (s, &z) in levels.iter_mut().zip(z) {
            *s = gbm.step(*s, z);
        }
        on_step(&levels);
    }
    Ok(levels)
}

/// Sample mean and standard error of `(payoff, control)` samples after the optional
/// control-variate adjustment `x + β (E[y] - y)`, `β = cov(x, y) / var(y)`.
fn estimate_from_samples(samples: &[(f64, f64)], control_mean: Option<f64>) -> (f64, f64) {
    let n = samples.len() as f64;
    let denom = (n - 1.0).max(1.0);

    let adjusted: Vec<f64> = if let Some(expected) = control_mean {
        let mean_x = samples.iter().map(|(x, _)| *x).sum::<f64>() / n;
        let mean_y = samples.iter().map(|(_, y)| *y).sum::<f64>() / n;
        let cov_xy = samples
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum::<f64>()
            / denom;
        let var_y = samples
            .iter()
            .map(|(_, y)| (y - mean_y).powi(2))
            .sum::<f64>()
            / denom;
        let beta = if var_y > 1e-16 { cov_xy / var_y } else { 0.0 };
        samples
            .iter()
            .map(|(x, y)| x + beta * (expected - y))
            .collect()
    } else {
        samples.iter().map(|(x, _)| *x).collect()
    };

    let mean = adjusted.iter().sum::<f64>() / n;
    let var = if adjusted.len() > 1 {
        adjusted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / denom
    } else {
        0.0
    };
    (mean, (var / n).sqrt())
}

/// Monte Carlo estimate of the BSM call on `contract` with volatility `sigma`.
///
/// # Errors
/// [`PricingError::Domain`] for an invalid contract or σ <= 0;
/// [`PricingError::InvalidInput`] for zero steps or paths.
pub fn simulate_with(
    contract: &OptionContract,
    sigma: f64,
    config: &McConfig,
) -> Result<McEstimate, PricingError> {
    check_inputs(contract, sigma, config)?;

    let levels = walk_paths(contract, sigma, config, |_| {})?;
    let df = contract.discount_factor();
    let discounted = |s: f64| {
        (
            df * OptionType::Call.payoff(s, contract.strike),
            df * s,
        )
    };

    let samples: Vec<(f64, f64)> = if config.antithetic {
        let half = levels.len() / 2;
        (0..half)
            .map(|j| {
                let (x1, y1) = discounted(levels[j]);
                let (x2, y2) = discounted(levels[j + half]);
                (0.5 * (x1 + x2), 0.5 * (y1 + y2))
            })
            .collect()
    } else {
        levels.iter().map(|&s| discounted(s)).collect()
    };

    let control_mean = config.control_variate.then_some(contract.spot);
    let (price, stderr) = estimate_from_samples(&samples, control_mean);

    debug!(
        price,
        stderr,
        paths = levels.len(),
        steps = config.steps,
        seed = config.seed,
        "monte carlo estimate"
    );

    Ok(McEstimate {
        price,
        stderr,
        paths: levels.len(),
        steps: config.steps,
    })
}

/// Every simulated path, generated from the same draws as [`simulate_with`].
///
/// Memory grows as `paths × (steps + 1)`; intended for inspection and plotting of
/// modest runs.
pub fn simulate_paths(
    contract: &OptionContract,
    sigma: f64,
    config: &McConfig,
) -> Result<Vec<SimulationPath>, PricingError> {
    check_inputs(contract, sigma, config)?;

    let mut paths: Vec<SimulationPath> = (0..config.simulated_paths()?)
        .map(|_| {
            let mut levels = Vec::with_capacity(config.steps + 1);
            levels.push(contract.spot);
            SimulationPath { levels }
        })
        .collect();

    walk_paths(contract, sigma, config, |step| {
        for (path, &s) in paths.iter_mut().zip(step) {
            path.levels.push(s);
        }
    })?;
    Ok(paths)
}

/// Seeded Monte Carlo price of a European call with plain sampling.
///
/// # Examples
/// ```
/// use bsmvol::mc::simulate;
///
/// let a = simulate(100.0, 105.0, 1.0, 0.05, 0.2, 10, 5_000, 1).unwrap();
/// let b = simulate(100.0, 105.0, 1.0, 0.05, 0.2, 10, 5_000, 1).unwrap();
/// assert_eq!(a, b);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn simulate(
    s0: f64,
    k: f64,
    t: f64,
    r: f64,
    sigma: f64,
    steps: usize,
    paths: usize,
    seed: u64,
) -> Result<f64, PricingError> {
    simulate_with(
        &OptionContract::new(s0, k, t, r),
        sigma,
        &McConfig::new(steps, paths, seed),
    )
    .map(|estimate| estimate.price)
}
