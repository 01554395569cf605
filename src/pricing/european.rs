//! Module `pricing::european`.
//!
//! Closed-form Black-Scholes-Merton prices and Vega for European options with zero
//! dividend yield: `price`, `put_price`, `vega`, `price_with_vega`, `d1_d2`.
//!
//! References: Hull (11th ed.) Ch. 15 for the BSM formula and Ch. 19 for Vega.
//!
//! Numerical considerations: every entry point rejects σ <= 0 and T <= 0 instead of
//! substituting intrinsic value, so callers (in particular the implied-vol solver)
//! see a typed error where the formula is undefined. Tiny positive σ is accepted and
//! converges to the discounted-intrinsic limit.
use crate::core::types::validate_sigma;
use crate::core::{OptionContract, OptionType, PricingError, PricingResult};
use crate::math::{normal_cdf, normal_pdf};

/// BSM `(d1, d2)` for an already validated contract.
#[inline]
fn d1_d2_unchecked(contract: &OptionContract, sigma: f64) -> (f64, f64) {
    let sig_sqrt_t = sigma * contract.maturity.sqrt();
    let d1 = ((contract.spot / contract.strike).ln()
        + (contract.rate + 0.5 * sigma * sigma) * contract.maturity)
        / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

#[inline]
fn check(contract: &OptionContract, sigma: f64) -> Result<(), PricingError> {
    contract.validate()?;
    validate_sigma(sigma)
}

#[inline]
fn value_unchecked(option_type: OptionType, contract: &OptionContract, sigma: f64) -> f64 {
    let (d1, d2) = d1_d2_unchecked(contract, sigma);
    let df = contract.discount_factor();
    let value = match option_type {
        OptionType::Call => contract.spot * normal_cdf(d1) - contract.strike * df * normal_cdf(d2),
        OptionType::Put => contract.strike * df * normal_cdf(-d2) - contract.spot * normal_cdf(-d1),
    };
    // Cancellation can leave a tiny negative value for σ → 0⁺.
    value.max(0.0)
}

#[inline]
fn vega_unchecked(contract: &OptionContract, sigma: f64) -> f64 {
    let (d1, _) = d1_d2_unchecked(contract, sigma);
    contract.spot * normal_pdf(d1) * contract.maturity.sqrt()
}

/// `(d1, d2)` for the given contract and volatility.
///
/// `d1 = [ln(S0/K) + (r + σ²/2)T] / (σ√T)`, `d2 = d1 - σ√T`.
pub fn d1_d2(contract: &OptionContract, sigma: f64) -> Result<(f64, f64), PricingError> {
    check(contract, sigma)?;
    Ok(d1_d2_unchecked(contract, sigma))
}

/// BSM price of a European call or put on `contract`.
pub fn bsm_price(
    option_type: OptionType,
    contract: &OptionContract,
    sigma: f64,
) -> Result<f64, PricingError> {
    check(contract, sigma)?;
    Ok(value_unchecked(option_type, contract, sigma))
}

/// Vega `∂C/∂σ = S0 φ(d1) √T` (identical for calls and puts).
pub fn bsm_vega(contract: &OptionContract, sigma: f64) -> Result<f64, PricingError> {
    check(contract, sigma)?;
    Ok(vega_unchecked(contract, sigma))
}

/// Call value and Vega from a single domain check.
///
/// This is the evaluation the implied-vol solver performs on every iteration.
pub fn price_with_vega(contract: &OptionContract, sigma: f64) -> Result<PricingResult, PricingError> {
    let (value, vega) = call_value_and_vega(contract, sigma)?;
    Ok(PricingResult {
        value,
        vega: Some(vega),
    })
}

/// Call value and Vega as a plain pair.
pub(crate) fn call_value_and_vega(
    contract: &OptionContract,
    sigma: f64,
) -> Result<(f64, f64), PricingError> {
    check(contract, sigma)?;
    Ok((
        value_unchecked(OptionType::Call, contract, sigma),
        vega_unchecked(contract, sigma),
    ))
}

/// Black-Scholes-Merton European call price.
///
/// Parameters:
/// - `s0`: current spot level.
/// - `k`: strike.
/// - `t`: time to maturity in years.
/// - `r`: continuously compounded risk-free rate.
/// - `sigma`: annualized volatility.
///
/// # Errors
/// [`PricingError::Domain`] when `sigma <= 0`, `t <= 0`, `s0 <= 0`, `k <= 0`, or any
/// input is non-finite.
///
/// # Examples
/// ```rust
/// use bsmvol::pricing::european::price;
///
/// let call = price(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
/// assert!((call - 8.021).abs() < 1e-3);
/// assert!(price(100.0, 105.0, 1.0, 0.05, 0.0).is_err());
/// ```
pub fn price(s0: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<f64, PricingError> {
    bsm_price(OptionType::Call, &OptionContract::new(s0, k, t, r), sigma)
}

/// Black-Scholes-Merton European put price.
///
/// Same parameters and domain as [`price`].
pub fn put_price(s0: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<f64, PricingError> {
    bsm_price(OptionType::Put, &OptionContract::new(s0, k, t, r), sigma)
}

/// Vega of a European option, `S0 φ(d1) √T`.
///
/// # Examples
/// ```rust
/// use bsmvol::pricing::european::vega;
///
/// let v = vega(100.0, 105.0, 1.0, 0.05, 0.2).unwrap();
/// assert!(v > 39.0 && v < 40.0);
/// ```
pub fn vega(s0: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<f64, PricingError> {
    bsm_vega(&OptionContract::new(s0, k, t, r), sigma)
}
