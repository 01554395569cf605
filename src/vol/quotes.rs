//! Implied volatilities for a table of call quotes.
//!
//! Each quote is inverted independently; a failing row records its error and the
//! batch carries on, so one stale or arbitrageable quote never hides the rest of
//! the smile.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{OptionContract, PricingError};
use crate::vol::implied::ImpliedVolSolver;

/// Observed European call premium with its contract terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Underlying level when the quote was observed.
    pub spot: f64,
    /// Strike level.
    pub strike: f64,
    /// Year fraction to expiry.
    pub maturity: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Call premium.
    pub price: f64,
}

impl OptionQuote {
    pub fn contract(&self) -> OptionContract {
        OptionContract::new(self.spot, self.strike, self.maturity, self.rate)
    }
}

/// One solved row of a quote table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolRow {
    pub quote: OptionQuote,
    /// Solved volatility, absent when the solver failed.
    pub implied_vol: Option<f64>,
    /// Solver error message for failed rows.
    pub error: Option<String>,
}

impl ImpliedVolRow {
    fn from_result(quote: OptionQuote, result: Result<f64, PricingError>) -> Self {
        match result {
            Ok(sigma) => Self {
                quote,
                implied_vol: Some(sigma),
                error: None,
            },
            Err(e) => Self {
                quote,
                implied_vol: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Keeps quotes whose strike lies strictly inside `((1 - band) S0, (1 + band) S0)`.
///
/// # Examples
/// ```
/// use bsmvol::vol::quotes::{OptionQuote, filter_by_moneyness};
///
/// let q = |strike| OptionQuote { spot: 100.0, strike, maturity: 0.5, rate: 0.01, price: 1.0 };
/// let kept = filter_by_moneyness(&[q(40.0), q(90.0), q(160.0)], 0.5);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].strike, 90.0);
/// ```
pub fn filter_by_moneyness(quotes: &[OptionQuote], band: f64) -> Vec<OptionQuote> {
    quotes
        .iter()
        .filter(|q| q.strike > (1.0 - band) * q.spot && q.strike < (1.0 + band) * q.spot)
        .copied()
        .collect()
}

/// Solves every quote with `solver`, preserving input order.
///
/// In fixed-iteration mode a row that ends with a large residual still reports its
/// final σ; enable a tolerance on the solver to turn such rows into errors.
pub fn implied_vols(quotes: &[OptionQuote], solver: &ImpliedVolSolver) -> Vec<ImpliedVolRow> {
    let rows: Vec<ImpliedVolRow> = quotes
        .iter()
        .map(|quote| {
            let result = solver
                .solve(&quote.contract(), quote.price)
                .map(|report| report.sigma);
            if let Err(e) = &result {
                warn!(
                    strike = quote.strike,
                    maturity = quote.maturity,
                    price = quote.price,
                    error = %e,
                    "implied vol failed for quote"
                );
            }
            ImpliedVolRow::from_result(*quote, result)
        })
        .collect();

    let solved = rows.iter().filter(|r| r.implied_vol.is_some()).count();
    info!(quotes = rows.len(), solved, "implied vol table computed");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::european::price;
    use approx::assert_relative_eq;

    fn quote(strike: f64, maturity: f64, sigma: f64) -> OptionQuote {
        OptionQuote {
            spot: 100.0,
            strike,
            maturity,
            rate: 0.01,
            price: price(100.0, strike, maturity, 0.01, sigma).unwrap(),
        }
    }

    #[test]
    fn smile_is_recovered_in_order() {
        let smile = [(90.0, 0.28), (100.0, 0.22), (110.0, 0.25)];
        let quotes: Vec<OptionQuote> = smile.iter().map(|&(k, s)| quote(k, 0.5, s)).collect();

        let rows = implied_vols(&quotes, &ImpliedVolSolver::new(0.5, 100));

        assert_eq!(rows.len(), 3);
        for (row, &(k, s)) in rows.iter().zip(smile.iter()) {
            assert_eq!(row.quote.strike, k);
            assert!(row.error.is_none());
            assert_relative_eq!(row.implied_vol.unwrap(), s, epsilon = 1e-8);
        }
    }

    #[test]
    fn failing_rows_do_not_abort_the_batch() {
        let mut bad = quote(100.0, 0.5, 0.2);
        bad.price = 150.0;
        let quotes = [quote(95.0, 0.5, 0.2), bad, quote(105.0, 0.5, 0.2)];

        let rows = implied_vols(&quotes, &ImpliedVolSolver::new(0.5, 100));

        assert!(rows[0].implied_vol.is_some());
        assert!(rows[1].implied_vol.is_none());
        assert!(rows[1].error.as_deref().unwrap().contains("domain error"));
        assert!(rows[2].implied_vol.is_some());
    }

    #[test]
    fn moneyness_band_is_exclusive() {
        let quotes = [quote(50.0, 1.0, 0.2), quote(51.0, 1.0, 0.2), quote(150.0, 1.0, 0.2)];
        let kept = filter_by_moneyness(&quotes, 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].strike, 51.0);
    }

    #[test]
    fn quotes_deserialize_from_json() {
        let payload = r#"[{"spot": 17.6639, "strike": 16.0, "maturity": 0.046, "rate": 0.01, "price": 1.9}]"#;
        let quotes: Vec<OptionQuote> = crate::core::from_json(payload).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].strike, 16.0);
    }
}
