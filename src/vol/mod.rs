//! Implied-volatility inversion: single-contract Newton solver and quote tables.

pub mod implied;
pub mod quotes;

pub use implied::{ImpliedVolReport, ImpliedVolSolver, implied_volatility};
pub use quotes::{ImpliedVolRow, OptionQuote, filter_by_moneyness, implied_vols};
