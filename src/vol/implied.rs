//! Black-Scholes-Merton implied-volatility inversion by Newton-Raphson.
//!
//! The solver iterates `σ_{n+1} = σ_n - (C(σ_n) - C*) / Vega(σ_n)` from a caller
//! supplied starting point. By default it runs the full iteration budget without a
//! residual check; a tolerance turns on early exit and a hard convergence failure.
//!
//! Price is concave in σ at high total volatility, so a start above the root can
//! step below zero. Such a step is replaced by `σ_n / 2`, which keeps every iterate
//! positive.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::types::validate_sigma;
use crate::core::{OptionContract, PricingError};
use crate::math::{NewtonConfig, newton_raphson};
use crate::pricing::european::call_value_and_vega;

/// Vega below this aborts the iteration instead of dividing by it.
///
/// The floor is absolute. Quotes a few days from expiry and far from the money
/// (S0=100, K=110, T=0.01, σ=0.1 prices at about 1.4e-22) reach it before the root
/// and fail with [`PricingError::NumericalInstability`].
pub const VEGA_FLOOR: f64 = 1e-10;

/// Fixed-iteration runs ending with `|C(σ) - C*|` above this are flagged unconverged.
pub const RESIDUAL_WARN_THRESHOLD: f64 = 1e-6;

/// Newton-Raphson implied-vol solver settings.
///
/// # Examples
/// ```
/// use bsmvol::core::OptionContract;
/// use bsmvol::pricing::european::price;
/// use bsmvol::vol::implied::ImpliedVolSolver;
///
/// let contract = OptionContract::new(100.0, 105.0, 1.0, 0.05);
/// let market = price(100.0, 105.0, 1.0, 0.05, 0.25).unwrap();
/// let report = ImpliedVolSolver::new(0.4, 100)
///     .with_tolerance(1e-10)
///     .solve(&contract, market)
///     .unwrap();
/// assert!((report.sigma - 0.25).abs() < 1e-8);
/// assert!(report.converged);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpliedVolSolver {
    /// Starting volatility σ₀; must be > 0.
    pub initial_guess: f64,
    /// Iteration budget.
    pub max_iter: usize,
    /// Absolute pricing tolerance; `None` runs exactly `max_iter` steps.
    pub tolerance: Option<f64>,
}

impl Default for ImpliedVolSolver {
    fn default() -> Self {
        Self {
            initial_guess: 0.5,
            max_iter: 100,
            tolerance: None,
        }
    }
}

/// Solver output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolReport {
    /// Volatility after the last step.
    pub sigma: f64,
    /// Newton steps taken.
    pub iterations: usize,
    /// `C(sigma) - C*`.
    pub residual: f64,
    /// Residual within the requested tolerance, or within
    /// [`RESIDUAL_WARN_THRESHOLD`] for fixed-iteration runs.
    pub converged: bool,
}

impl ImpliedVolSolver {
    /// Fixed-iteration solver.
    pub fn new(initial_guess: f64, max_iter: usize) -> Self {
        Self {
            initial_guess,
            max_iter,
            tolerance: None,
        }
    }

    /// Enables early exit once `|C(σ) - C*| <= tolerance`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Inverts the BSM call price of `contract` to match `market_price`.
    ///
    /// # Errors
    /// - [`PricingError::Domain`] for σ₀ <= 0, an invalid contract, or a market price
    ///   outside the open interval `(max(S0 - K e^{-rT}, 0), S0)`. A price exactly at
    ///   the lower no-arbitrage bound is rejected too: short-dated, deep in-the-money
    ///   BSM prices round to that bound in `f64`, and no σ is identifiable there.
    /// - [`PricingError::NumericalInstability`] when Vega falls below [`VEGA_FLOOR`].
    /// - [`PricingError::NoConvergence`] when a tolerance is set and not reached.
    pub fn solve(
        &self,
        contract: &OptionContract,
        market_price: f64,
    ) -> Result<ImpliedVolReport, PricingError> {
        validate_sigma(self.initial_guess)
            .map_err(|e| PricingError::Domain(format!("initial guess rejected: {e}")))?;
        contract.validate()?;

        let lower = contract.call_lower_bound();
        let upper = contract.spot;
        if market_price == lower {
            return Err(PricingError::Domain(format!(
                "market price {market_price} sits at the no-arbitrage bound {lower}; \
                 volatility is not identifiable"
            )));
        }
        if !market_price.is_finite() || market_price < lower || market_price >= upper {
            return Err(PricingError::Domain(format!(
                "market price {market_price} outside attainable call range ({lower}, {upper})"
            )));
        }

        let config = NewtonConfig {
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            derivative_floor: VEGA_FLOOR,
            lower_bound: Some(0.0),
        };
        let outcome = newton_raphson(
            |sigma| {
                let (value, vega) = call_value_and_vega(contract, sigma)?;
                Ok::<_, PricingError>((value - market_price, vega))
            },
            self.initial_guess,
            &config,
        )?;

        let converged = match self.tolerance {
            Some(_) => true,
            None => outcome.residual.abs() <= RESIDUAL_WARN_THRESHOLD,
        };
        if !converged {
            warn!(
                sigma = outcome.root,
                residual = outcome.residual,
                iterations = outcome.iterations,
                "implied vol iteration budget exhausted without matching the market price"
            );
        }
        debug!(
            sigma = outcome.root,
            iterations = outcome.iterations,
            residual = outcome.residual,
            "implied vol solved"
        );

        Ok(ImpliedVolReport {
            sigma: outcome.root,
            iterations: outcome.iterations,
            residual: outcome.residual,
            converged,
        })
    }
}

/// Implied volatility of a European call after exactly `iterations` Newton steps.
///
/// Parameters follow [`crate::pricing::european::price`]; `market_price` is the
/// observed call premium and `initial_guess` the starting σ₀.
///
/// # Errors
/// See [`ImpliedVolSolver::solve`]. A non-positive `initial_guess` fails before any
/// pricing call.
///
/// # Examples
/// ```
/// use bsmvol::pricing::european::price;
/// use bsmvol::vol::implied::implied_volatility;
///
/// let market = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
/// let sigma = implied_volatility(100.0, 105.0, 1.0, 0.05, market, 0.3, 100).unwrap();
/// assert!((sigma - 0.2).abs() < 1e-10);
/// ```
pub fn implied_volatility(
    s0: f64,
    k: f64,
    t: f64,
    r: f64,
    market_price: f64,
    initial_guess: f64,
    iterations: usize,
) -> Result<f64, PricingError> {
    ImpliedVolSolver::new(initial_guess, iterations)
        .solve(&OptionContract::new(s0, k, t, r), market_price)
        .map(|report| report.sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::european::price;
    use approx::assert_relative_eq;

    fn reference_contract() -> OptionContract {
        OptionContract::new(100.0, 105.0, 1.0, 0.05)
    }

    #[test]
    fn implied_vol_recovers_true_sigma() {
        let market = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
        let iv = implied_volatility(100.0, 105.0, 1.0, 0.05, market, 0.3, 100).unwrap();
        assert_relative_eq!(iv, 0.2, epsilon = 1e-10);
    }

    #[test]
    fn fixed_policy_reports_residual_and_convergence() {
        let market = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
        let report = ImpliedVolSolver::new(0.5, 100)
            .solve(&reference_contract(), market)
            .unwrap();
        assert!(report.converged);
        assert!(report.residual.abs() < 1e-12);
        assert!(report.iterations <= 100);
    }

    #[test]
    fn zero_iterations_return_initial_guess_unconverged() {
        let market = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
        let report = ImpliedVolSolver::new(0.3, 0)
            .solve(&reference_contract(), market)
            .unwrap();
        assert_eq!(report.sigma, 0.3);
        assert_eq!(report.iterations, 0);
        assert!(!report.converged);
        assert!(report.residual > 3.0);
    }

    #[test]
    fn tolerance_exits_early() {
        let market = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
        let report = ImpliedVolSolver::new(0.3, 100)
            .with_tolerance(1e-10)
            .solve(&reference_contract(), market)
            .unwrap();
        assert!(report.iterations < 10);
        assert!(report.residual.abs() <= 1e-10);
        assert_relative_eq!(report.sigma, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn tolerance_budget_exhaustion_is_no_convergence() {
        let market = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
        let err = ImpliedVolSolver::new(0.3, 1)
            .with_tolerance(1e-12)
            .solve(&reference_contract(), market)
            .unwrap_err();
        assert!(matches!(err, PricingError::NoConvergence { iterations: 1, .. }));
    }

    #[test]
    fn non_positive_initial_guess_fails_immediately() {
        for guess in [0.0, -0.2, f64::NAN] {
            let err = implied_volatility(100.0, 105.0, 1.0, 0.05, 8.0, guess, 100).unwrap_err();
            assert!(matches!(err, PricingError::Domain(_)), "guess={guess}");
        }
    }

    #[test]
    fn unattainable_market_price_is_domain_error() {
        // Below the σ → 0 limit.
        let lower = reference_contract().call_lower_bound();
        assert!(matches!(
            implied_volatility(100.0, 95.0, 1.0, 0.05, 1.0, 0.2, 100),
            Err(PricingError::Domain(_))
        ));
        assert!(matches!(
            implied_volatility(100.0, 105.0, 1.0, 0.05, lower, 0.2, 100),
            Err(PricingError::Domain(_))
        ));
        // At or above spot.
        assert!(matches!(
            implied_volatility(100.0, 105.0, 1.0, 0.05, 100.0, 0.2, 100),
            Err(PricingError::Domain(_))
        ));
        assert!(matches!(
            implied_volatility(100.0, 105.0, 1.0, 0.05, f64::NAN, 0.2, 100),
            Err(PricingError::Domain(_))
        ));
    }

    #[test]
    fn overshooting_start_in_concave_region_still_converges() {
        // From 1.5x the root the raw Newton step lands below zero on the first
        // iteration; the halved step keeps σ positive.
        for (k, sigma_true) in [(100.0, 2.0), (110.0, 2.0), (90.0, 1.5)] {
            let contract = OptionContract::new(100.0, k, 5.0, 0.05);
            let market = price(100.0, k, 5.0, 0.05, sigma_true).unwrap();
            let report = ImpliedVolSolver::new(1.5 * sigma_true, 100)
                .solve(&contract, market)
                .unwrap();
            assert!(report.converged, "k={k} report={report:?}");
            assert_relative_eq!(report.sigma, sigma_true, epsilon = 1e-6);
        }
    }

    #[test]
    fn price_rounded_onto_lower_bound_is_not_identifiable() {
        // Deep in the money a few days out, the BSM price equals S0 - K e^{-rT} in f64.
        let contract = OptionContract::new(100.0, 90.0, 0.01, 0.05);
        let market = price(100.0, 90.0, 0.01, 0.05, 0.05).unwrap();
        assert_eq!(market, contract.call_lower_bound());

        match ImpliedVolSolver::new(0.075, 100).solve(&contract, market) {
            Err(PricingError::Domain(msg)) => {
                assert!(msg.contains("no-arbitrage bound"), "{msg}")
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn short_dated_far_otm_quote_reaches_vega_floor() {
        let market = price(100.0, 110.0, 0.01, 0.05, 0.1).unwrap();
        assert!(market > 0.0 && market < 1e-20);
        let err = implied_volatility(100.0, 110.0, 0.01, 0.05, market, 0.15, 100).unwrap_err();
        assert!(matches!(err, PricingError::NumericalInstability(_)), "{err:?}");
    }

    #[test]
    fn vega_underflow_is_numerical_instability() {
        let market = price(100.0, 200.0, 0.1, 0.05, 0.5).unwrap();
        assert!(market > 0.0);
        let err = implied_volatility(100.0, 200.0, 0.1, 0.05, market, 0.01, 100).unwrap_err();
        assert!(matches!(err, PricingError::NumericalInstability(_)));
    }

    #[test]
    fn solver_settings_deserialize_with_defaults() {
        let solver: ImpliedVolSolver =
            serde_json::from_str(r#"{"initial_guess": 2.0}"#).unwrap();
        assert_eq!(solver.initial_guess, 2.0);
        assert_eq!(solver.max_iter, 100);
        assert_eq!(solver.tolerance, None);
    }
}
