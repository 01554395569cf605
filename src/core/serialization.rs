//! JSON helpers for contracts, quotes, and configuration payloads.
//!
//! # Examples
//! ```rust
//! use bsmvol::core::{from_json, to_json_pretty, OptionContract};
//!
//! let contract = OptionContract::new(100.0, 105.0, 1.0, 0.05);
//! let json = to_json_pretty(&contract).expect("json serialization");
//! let decoded: OptionContract = from_json(&json).expect("json deserialization");
//! assert_eq!(decoded, contract);
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;

use super::PricingError;

/// Serialize a value to pretty JSON.
pub fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, PricingError> {
    serde_json::to_string_pretty(value).map_err(|e| PricingError::Config(e.to_string()))
}

/// Deserialize a value from JSON.
pub fn from_json<T: DeserializeOwned>(payload: &str) -> Result<T, PricingError> {
    serde_json::from_str(payload).map_err(|e| PricingError::Config(e.to_string()))
}

/// Read and deserialize a JSON file.
pub fn from_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, PricingError> {
    let path = path.as_ref();
    let payload = std::fs::read_to_string(path)
        .map_err(|e| PricingError::Config(format!("{}: {e}", path.display())))?;
    from_json(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OptionContract, OptionType};

    #[test]
    fn malformed_payload_is_config_error() {
        let err = from_json::<OptionContract>("{\"spot\": 100.0").unwrap_err();
        assert!(matches!(err, PricingError::Config(_)));
    }

    #[test]
    fn option_type_uses_variant_names() {
        let json = to_json_pretty(&OptionType::Put).unwrap();
        assert_eq!(json, "\"Put\"");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = from_json_file::<OptionContract>("/nonexistent/contract.json").unwrap_err();
        assert!(matches!(err, PricingError::Config(msg) if msg.contains("contract.json")));
    }
}
