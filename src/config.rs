//! JSON-backed settings for the `bsm_report` workflow.
//!
//! Every field has a default, so a config file only needs the values it changes:
//!
//! ```rust
//! use bsmvol::config::ReportConfig;
//!
//! let config = ReportConfig::from_json_str(r#"{"sigma": 0.3, "monte_carlo": {"paths": 10000}}"#)
//!     .unwrap();
//! assert_eq!(config.sigma, 0.3);
//! assert_eq!(config.monte_carlo.paths, 10_000);
//! assert_eq!(config.monte_carlo.steps, 50);
//! assert_eq!(config.contract.strike, 105.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::serialization::{from_json, from_json_file};
use crate::core::types::validate_sigma;
use crate::core::{OptionContract, PricingError};
use crate::mc::McConfig;
use crate::vol::implied::ImpliedVolSolver;

/// Contract, volatility, solver and simulator settings for one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub contract: OptionContract,
    /// Volatility used for the closed-form price and the simulation.
    pub sigma: f64,
    pub solver: ImpliedVolSolver,
    pub monte_carlo: McConfig,
    /// Path counts for the convergence table; empty skips it.
    pub convergence_paths: Vec<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            contract: OptionContract::new(100.0, 105.0, 1.0, 0.05),
            sigma: 0.2,
            solver: ImpliedVolSolver::default(),
            monte_carlo: McConfig::default(),
            convergence_paths: vec![1_000, 10_000, 100_000],
        }
    }
}

impl ReportConfig {
    /// Parses and validates a JSON payload.
    pub fn from_json_str(payload: &str) -> Result<Self, PricingError> {
        let config: Self = from_json(payload)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let config: Self = from_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the contract, σ, solver start and tolerance, and simulator sizes.
    pub fn validate(&self) -> Result<(), PricingError> {
        let invalid = |e: PricingError| PricingError::Config(e.to_string());
        self.contract.validate().map_err(invalid)?;
        validate_sigma(self.sigma).map_err(invalid)?;
        validate_sigma(self.solver.initial_guess).map_err(invalid)?;
        if let Some(tol) = self.solver.tolerance
            && (tol.is_nan() || tol <= 0.0)
        {
            return Err(PricingError::Config(format!(
                "solver tolerance must be > 0, got {tol}"
            )));
        }
        self.monte_carlo.validate().map_err(invalid)?;
        if self.convergence_paths.contains(&0) {
            return Err(PricingError::Config(
                "convergence_paths entries must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::to_json_pretty;

    #[test]
    fn default_is_the_reference_scenario() {
        let config = ReportConfig::default();
        assert_eq!(config.contract, OptionContract::new(100.0, 105.0, 1.0, 0.05));
        assert_eq!(config.sigma, 0.2);
        assert_eq!(config.monte_carlo.paths, 250_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(
            ReportConfig::from_json_str("{}").unwrap(),
            ReportConfig::default()
        );
    }

    #[test]
    fn serialized_config_reloads() {
        let mut config = ReportConfig::default();
        config.solver = config.solver.with_tolerance(1e-10);
        config.monte_carlo = config.monte_carlo.with_antithetic(true);
        let json = to_json_pretty(&config).unwrap();
        assert_eq!(ReportConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for payload in [
            r#"{"sigma": 0.0}"#,
            r#"{"contract": {"spot": 100.0, "strike": 105.0, "maturity": -1.0, "rate": 0.05}}"#,
            r#"{"solver": {"initial_guess": -0.5}}"#,
            r#"{"solver": {"tolerance": 0.0}}"#,
            r#"{"solver": {"tolerance": -1e-8}}"#,
            r#"{"monte_carlo": {"steps": 0}}"#,
            r#"{"convergence_paths": [100, 0]}"#,
            r#"{"sigma": "high"}"#,
        ] {
            assert!(
                matches!(ReportConfig::from_json_str(payload), Err(PricingError::Config(_))),
                "payload={payload}"
            );
        }
    }
}
