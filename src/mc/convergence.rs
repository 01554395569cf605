//! Monte Carlo convergence against the closed-form price.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{OptionContract, PricingError};
use crate::mc::{McConfig, simulate_with};
use crate::pricing::european::bsm_price;
use crate::pricing::OptionType;

/// One row of a convergence study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    /// Paths simulated.
    pub paths: usize,
    pub estimate: f64,
    pub stderr: f64,
    /// `|estimate - closed form|`.
    pub abs_error: f64,
    /// `abs_error / closed form`.
    pub rel_error: f64,
}

/// Runs the estimator once per entry of `path_counts`, keeping every other setting of
/// `base` (seed included), and compares each run with the BSM price.
///
/// Standard errors shrink as `1/√paths`; absolute errors follow on average but are
/// themselves random for any single seed.
pub fn convergence_study(
    contract: &OptionContract,
    sigma: f64,
    base: &McConfig,
    path_counts: &[usize],
) -> Result<Vec<ConvergencePoint>, PricingError> {
    let reference = bsm_price(OptionType::Call, contract, sigma)?;

    path_counts
        .iter()
        .map(|&paths| {
            let estimate = simulate_with(contract, sigma, &base.with_paths(paths))?;
            let abs_error = (estimate.price - reference).abs();
            let point = ConvergencePoint {
                paths: estimate.paths,
                estimate: estimate.price,
                stderr: estimate.stderr,
                abs_error,
                rel_error: if reference > 0.0 {
                    abs_error / reference
                } else {
                    f64::NAN
                },
            };
            info!(
                paths = point.paths,
                estimate = point.estimate,
                stderr = point.stderr,
                abs_error = point.abs_error,
                "convergence point"
            );
            Ok(point)
        })
        .collect()
}
