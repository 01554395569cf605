//! bsmvol prices European calls under Black-Scholes-Merton, inverts observed
//! premiums to implied volatility with Newton-Raphson, and cross-checks the closed
//! form with a seeded Monte Carlo estimator.
//!
//! References:
//! - Hull, *Options, Futures, and Other Derivatives* (11th ed.), Ch. 15 and 19.
//! - Glasserman (2004) for Monte Carlo estimators and variance reduction.
//!
//! Numerical considerations:
//! - Every entry point validates its domain (σ > 0, T > 0, S0 > 0, K > 0) and returns
//!   a [`core::PricingError`] instead of NaN.
//! - The implied-vol solver runs a fixed iteration budget by default; a residual
//!   tolerance is opt-in and then enforced.
//! - Monte Carlo runs are reproducible for a fixed seed and carry a standard error.
//!
//! # Quick Start
//! Price a call and its Vega:
//! ```rust
//! use bsmvol::pricing::european::{price, vega};
//!
//! let c = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
//! assert!((c - 8.021).abs() < 1e-3);
//! assert!(vega(100.0, 105.0, 1.0, 0.05, 0.2).unwrap() > 0.0);
//! ```
//!
//! Invert implied volatility:
//! ```rust
//! use bsmvol::pricing::european::price;
//! use bsmvol::vol::implied::implied_volatility;
//!
//! let market = price(100.0, 105.0, 1.0, 0.05, 0.25).unwrap();
//! let sigma = implied_volatility(100.0, 105.0, 1.0, 0.05, market, 0.375, 100).unwrap();
//! assert!((sigma - 0.25).abs() < 1e-4);
//! ```
//!
//! Cross-check with Monte Carlo:
//! ```rust
//! use bsmvol::core::OptionContract;
//! use bsmvol::mc::{McConfig, simulate_with};
//!
//! let contract = OptionContract::new(100.0, 105.0, 1.0, 0.05);
//! let est = simulate_with(&contract, 0.2, &McConfig::new(10, 20_000, 42)).unwrap();
//! assert!((est.price - 8.021).abs() < 5.0 * est.stderr);
//! ```

pub mod config;
pub mod core;
pub mod math;
pub mod mc;
pub mod pricing;
pub mod signal;
pub mod vol;

pub use crate::core::{OptionContract, OptionType, PricingError, PricingResult};
pub use crate::mc::simulate;
pub use crate::pricing::european::{price, vega};
pub use crate::vol::implied::implied_volatility;
