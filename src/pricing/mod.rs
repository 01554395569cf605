//! Closed-form pricing.

pub mod european;

pub use crate::core::types::OptionType;
pub use european::{bsm_price, bsm_vega, d1_d2, price, price_with_vega, put_price, vega};
