//! Shared numeric helpers: standard normal density/CDF and a Newton-Raphson driver.

use statrs::function::erf::erfc;
use std::f64::consts::FRAC_1_SQRT_2;
use thiserror::Error;
use tracing::trace;

/// Failures of the generic root finder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// Residual still above tolerance once the iteration budget is spent.
    #[error("no convergence after {iterations} iterations (residual {residual:e})")]
    NonConvergence { iterations: usize, residual: f64 },
    /// Derivative too small to take a Newton step.
    #[error("derivative {derivative:e} below floor at x={x}")]
    ZeroDerivative { x: f64, derivative: f64 },
    /// Newton step produced a non-finite iterate.
    #[error("non-finite iterate from x={x}")]
    NonFinite { x: f64 },
    /// Malformed solver settings.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

/// Standard normal density.
#[inline]
pub fn normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF, `0.5 * erfc(-x / sqrt(2))`.
///
/// Keeps relative precision in the lower tail.
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Stopping policy and safeguards for [`newton_raphson`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig {
    /// Iteration budget.
    pub max_iter: usize,
    /// `None` runs exactly `max_iter` steps; `Some(tol)` stops once `|f(x)| <= tol`
    /// and fails if the budget runs out first.
    pub tolerance: Option<f64>,
    /// Smallest `|f'(x)|` accepted for a step.
    pub derivative_floor: f64,
    /// Exclusive lower edge of the domain. A step landing on or below it is replaced
    /// by the midpoint between the current iterate and the edge.
    pub lower_bound: Option<f64>,
}

impl NewtonConfig {
    /// Fixed-iteration policy with the given budget.
    pub fn fixed(max_iter: usize) -> Self {
        Self {
            max_iter,
            tolerance: None,
            derivative_floor: 1e-14,
            lower_bound: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn with_derivative_floor(mut self, floor: f64) -> Self {
        self.derivative_floor = floor;
        self
    }

    pub fn with_lower_bound(mut self, lower_bound: f64) -> Self {
        self.lower_bound = Some(lower_bound);
        self
    }
}

/// Root and diagnostics returned by [`newton_raphson`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOutcome {
    pub root: f64,
    /// Newton steps actually taken.
    pub iterations: usize,
    /// `f(root)`.
    pub residual: f64,
}

/// Newton-Raphson iteration `x_{n+1} = x_n - f(x_n) / f'(x_n)`.
///
/// `f` returns `(f(x), f'(x))` in one call and may itself fail, which lets callers
/// reject iterates outside their domain; its error type only needs to absorb
/// [`MathError`]. The residual at the returned root is always re-evaluated, so a
/// final out-of-domain iterate surfaces as the caller's error.
///
/// A zero residual ends the iteration early under either policy. With a
/// [`NewtonConfig::lower_bound`] every iterate stays strictly above it.
///
/// # Examples
/// ```
/// use bsmvol::math::{MathError, NewtonConfig, newton_raphson};
///
/// let out = newton_raphson(
///     |x: f64| Ok::<_, MathError>((x * x - 2.0, 2.0 * x)),
///     1.0,
///     &NewtonConfig::fixed(50).with_tolerance(1e-12),
/// )
/// .unwrap();
/// assert!((out.root - 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn newton_raphson<F, E>(mut f: F, x0: f64, config: &NewtonConfig) -> Result<NewtonOutcome, E>
where
    F: FnMut(f64) -> Result<(f64, f64), E>,
    E: From<MathError>,
{
    if let Some(tol) = config.tolerance
        && (tol.is_nan() || tol <= 0.0)
    {
        return Err(MathError::InvalidInput("tolerance must be positive").into());
    }
    if !x0.is_finite() {
        return Err(MathError::NonFinite { x: x0 }.into());
    }

    let mut x = x0;
    let mut iterations = 0;
    while iterations < config.max_iter {
        let (fx, dfx) = f(x)?;
        trace!(iteration = iterations, x, fx, dfx, "newton step");

        if fx == 0.0 {
            break;
        }
        if let Some(tol) = config.tolerance
            && fx.abs() <= tol
        {
            return Ok(NewtonOutcome {
                root: x,
                iterations,
                residual: fx,
            });
        }
        if !dfx.is_finite() || dfx.abs() < config.derivative_floor {
            return Err(MathError::ZeroDerivative { x, derivative: dfx }.into());
        }

        let mut next = x - fx / dfx;
        if !next.is_finite() {
            return Err(MathError::NonFinite { x }.into());
        }
        if let Some(lo) = config.lower_bound
            && next <= lo
        {
            trace!(iteration = iterations, x, rejected = next, "newton step clamped to domain");
            next = 0.5 * (x + lo);
        }
        x = next;
        iterations += 1;
    }

    let (residual, _) = f(x)?;
    if let Some(tol) = config.tolerance
        && residual.abs() > tol
    {
        return Err(MathError::NonConvergence {
            iterations,
            residual,
        }
        .into());
    }

    Ok(NewtonOutcome {
        root: x,
        iterations,
        residual,
    })
}
