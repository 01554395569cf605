use serde::{Deserialize, Serialize};

use super::PricingError;

/// Plain-vanilla option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    /// Call option payoff profile.
    Call,
    /// Put option payoff profile.
    Put,
}

impl OptionType {
    /// Returns +1.0 for calls and -1.0 for puts.
    pub fn sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }

    /// Payoff at expiry for a terminal spot level.
    #[inline]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        (self.sign() * (spot - strike)).max(0.0)
    }
}

/// European option terms under a constant short rate.
///
/// Immutable value tuple `(S0, K, T, r)`; volatility is supplied per call so the
/// same contract can be priced, inverted, and simulated without copies.
///
/// # Examples
/// ```
/// use bsmvol::core::OptionContract;
///
/// let contract = OptionContract::new(100.0, 105.0, 1.0, 0.05);
/// assert!(contract.validate().is_ok());
/// assert!(OptionContract::new(100.0, 105.0, 0.0, 0.05).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Spot level of the underlying.
    pub spot: f64,
    /// Strike level.
    pub strike: f64,
    /// Time to maturity in years.
    pub maturity: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
}

impl OptionContract {
    /// Builds a contract from `(S0, K, T, r)`.
    pub fn new(spot: f64, strike: f64, maturity: f64, rate: f64) -> Self {
        Self {
            spot,
            strike,
            maturity,
            rate,
        }
    }

    /// Checks `S0 > 0`, `K > 0`, `T > 0` and finiteness of every field.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.spot.is_finite()
            || !self.strike.is_finite()
            || !self.maturity.is_finite()
            || !self.rate.is_finite()
        {
            return Err(PricingError::Domain(format!(
                "contract fields must be finite: spot={}, strike={}, maturity={}, rate={}",
                self.spot, self.strike, self.maturity, self.rate
            )));
        }
        if self.spot <= 0.0 {
            return Err(PricingError::Domain(format!(
                "spot must be > 0, got {}",
                self.spot
            )));
        }
        if self.strike <= 0.0 {
            return Err(PricingError::Domain(format!(
                "strike must be > 0, got {}",
                self.strike
            )));
        }
        if self.maturity <= 0.0 {
            return Err(PricingError::Domain(format!(
                "maturity must be > 0, got {}",
                self.maturity
            )));
        }
        Ok(())
    }

    /// Discount factor `exp(-rT)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    /// Lower no-arbitrage bound of a call, `max(S0 - K exp(-rT), 0)`.
    ///
    /// This is also the σ → 0⁺ limit of the BSM call price.
    pub fn call_lower_bound(&self) -> f64 {
        (self.spot - self.strike * self.discount_factor()).max(0.0)
    }

    /// Spot-over-strike moneyness.
    pub fn moneyness(&self) -> f64 {
        self.spot / self.strike
    }
}

/// Checks that a volatility is finite and strictly positive.
pub(crate) fn validate_sigma(sigma: f64) -> Result<(), PricingError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PricingError::Domain(format!(
            "volatility must be finite and > 0, got {sigma}"
        )));
    }
    Ok(())
}
