//! Moving-average trend signal and its daily-return backtest.
//!
//! `trend_t = SMA_short(t) - SMA_long(t)`. The regime is long when the trend exceeds
//! `threshold`, short below `-threshold`, neutral otherwise, and undefined until the
//! long average has a full window. Strategy log returns are the previous day's
//! position times the market's log return, so a signal never trades on the close
//! that produced it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::PricingError;

/// Market stance implied by the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Long,
    Neutral,
    Short,
}

impl Regime {
    /// +1, 0, or -1 units of the index.
    pub fn position(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Neutral => 0.0,
            Self::Short => -1.0,
        }
    }
}

/// Simple moving average aligned with its input.
///
/// Entry `i` averages `series[i + 1 - window..=i]`; the first `window - 1` entries
/// are `None`.
///
/// # Examples
/// ```
/// use bsmvol::signal::simple_moving_average;
///
/// let sma = simple_moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
/// assert_eq!(sma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
/// ```
pub fn simple_moving_average(series: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    if window == 0 || window > series.len() {
        return out;
    }
    for (i, w) in series.windows(window).enumerate() {
        out[i + window - 1] = Some(w.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Daily log returns `ln(P_t / P_{t-1})`.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Two-average trend rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSignal {
    pub short_window: usize,
    pub long_window: usize,
    /// Minimum trend magnitude, in price points, before taking a position.
    pub threshold: f64,
}

impl Default for TrendSignal {
    fn default() -> Self {
        Self {
            short_window: 42,
            long_window: 252,
            threshold: 50.0,
        }
    }
}

/// Backtest totals and the per-day series behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Regime per close, `None` before the long average exists.
    pub regimes: Vec<Option<Regime>>,
    /// `ln(P_t / P_{t-1})` for `t = 1..n`.
    pub market_log_returns: Vec<f64>,
    /// Previous-day position times the market log return.
    pub strategy_log_returns: Vec<f64>,
    /// Buy-and-hold gross return, `exp(Σ market)`.
    pub market_gross: f64,
    /// Strategy gross return, `exp(Σ strategy)`.
    pub strategy_gross: f64,
    /// Number of regime changes once the signal is defined.
    pub switches: usize,
}

impl TrendSignal {
    pub fn new(short_window: usize, long_window: usize, threshold: f64) -> Self {
        Self {
            short_window,
            long_window,
            threshold,
        }
    }

    fn validate(&self, closes: &[f64]) -> Result<(), PricingError> {
        if self.short_window == 0 || self.short_window >= self.long_window {
            return Err(PricingError::InvalidInput(format!(
                "windows must satisfy 0 < short < long, got short={} long={}",
                self.short_window, self.long_window
            )));
        }
        if self.long_window > closes.len() {
            return Err(PricingError::InvalidInput(format!(
                "long window {} exceeds series length {}",
                self.long_window,
                closes.len()
            )));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "threshold must be finite and >= 0, got {}",
                self.threshold
            )));
        }
        if let Some(bad) = closes.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "prices must be finite and > 0, found {bad}"
            )));
        }
        Ok(())
    }

    /// Regime per close.
    pub fn regimes(&self, closes: &[f64]) -> Result<Vec<Option<Regime>>, PricingError> {
        self.validate(closes)?;
        let short = simple_moving_average(closes, self.short_window);
        let long = simple_moving_average(closes, self.long_window);

        Ok(short
            .iter()
            .zip(long.iter())
            .map(|(s, l)| match (s, l) {
                (Some(s), Some(l)) => {
                    let trend = s - l;
                    Some(if trend > self.threshold {
                        Regime::Long
                    } else if trend < -self.threshold {
                        Regime::Short
                    } else {
                        Regime::Neutral
                    })
                }
                _ => None,
            })
            .collect())
    }

    /// Runs the rule over `closes` and compares it with buy-and-hold.
    ///
    /// # Errors
    /// [`PricingError::InvalidInput`] for inconsistent windows, a negative threshold,
    /// a series shorter than the long window, or non-positive prices.
    pub fn backtest(&self, closes: &[f64]) -> Result<BacktestSummary, PricingError> {
        let regimes = self.regimes(closes)?;
        let market_log_returns = log_returns(closes);

        let strategy_log_returns: Vec<f64> = market_log_returns
            .iter()
            .zip(regimes.iter())
            .map(|(r, prev)| prev.map_or(0.0, Regime::position) * r)
            .collect();

        let switches = regimes
            .iter()
            .flatten()
            .collect::<Vec<_>>()
            .windows(2)
            .filter(|w| w[0] != w[1])
            .count();

        let market_gross = market_log_returns.iter().sum::<f64>().exp();
        let strategy_gross = strategy_log_returns.iter().sum::<f64>().exp();
        debug!(market_gross, strategy_gross, switches, "trend backtest");

        Ok(BacktestSummary {
            regimes,
            market_log_returns,
            strategy_log_returns,
            market_gross,
            strategy_gross,
            switches,
        })
    }
}
