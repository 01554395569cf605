//! Core domain types, the library-wide error enum, and serialization helpers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::MathError;

pub mod serialization;
pub mod types;

pub use serialization::{from_json, to_json_pretty};
pub use types::*;

/// Closed-form valuation output.
///
/// Derived on demand, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Present value.
    pub value: f64,
    /// First derivative to volatility, when requested.
    pub vega: Option<f64>,
}

/// Errors surfaced by pricing, inversion, simulation, and configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Input outside the model domain (non-positive σ, T, S0 or K, unreachable price).
    #[error("domain error: {0}")]
    Domain(String),
    /// Vega underflow or a non-finite Newton step.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
    /// Iteration budget exhausted with the residual still above tolerance.
    #[error("no convergence after {iterations} iterations (residual {residual:e})")]
    NoConvergence {
        /// Iterations performed.
        iterations: usize,
        /// Final pricing residual.
        residual: f64,
    },
    /// Malformed engine or signal settings.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Configuration could not be read or decoded.
    #[error("config error: {0}")]
    Config(String),
}

impl From<MathError> for PricingError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::NonConvergence {
                iterations,
                residual,
            } => Self::NoConvergence {
                iterations,
                residual,
            },
            MathError::ZeroDerivative { .. } | MathError::NonFinite { .. } => {
                Self::NumericalInstability(err.to_string())
            }
            MathError::InvalidInput(msg) => Self::InvalidInput(msg.to_string()),
        }
    }
}
