//! Input checks shared by the core stores.
//!
//! These mirror the payload rules the API layer applies, so a store never persists a
//! negative price or an empty name even when called directly.

use crate::errors::{Error, Result};
use serde::{Deserialize, Deserializer};

/// Trims `value` and requires at least `min` characters, returning the trimmed string.
///
/// # Errors
/// Returns [`Error::Validation`] with `message` when the trimmed value is too short.
pub fn min_chars(value: &str, min: usize, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < min {
        return Err(Error::validation(message));
    }
    Ok(trimmed.to_string())
}

/// Requires a finite, non-negative price.
///
/// # Errors
/// Returns [`Error::Validation`] with `message` for negative, NaN or infinite values.
pub fn price(value: f64, message: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(message));
    }
    Ok(value)
}

/// Profit stored next to the two prices.
#[must_use]
pub fn profit(cost_price: f64, selling_price: f64) -> f64 {
    selling_price - cost_price
}

/// Lets a patch tell "field absent" (`None`) from "field explicitly null" (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_min_chars_trims() {
        assert_eq!(min_chars("  Dota 2  ", 2, "too short").unwrap(), "Dota 2");
    }

    #[test]
    fn test_min_chars_rejects_whitespace() {
        let err = min_chars("    ", 1, "Game name is required").unwrap_err();
        assert!(matches!(err, Error::Validation { message } if message == "Game name is required"));
    }

    #[test]
    fn test_min_chars_counts_characters_not_bytes() {
        // Three characters, six bytes
        assert!(min_chars("ゲーム", 3, "too short").is_ok());
        assert!(min_chars("ゲ", 2, "too short").is_err());
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(price(0.0, "bad").unwrap(), 0.0);
        assert_eq!(price(12.5, "bad").unwrap(), 12.5);
        assert!(price(-0.01, "bad").is_err());
        assert!(price(f64::NAN, "bad").is_err());
        assert!(price(f64::INFINITY, "bad").is_err());
    }

    #[test]
    fn test_profit() {
        assert_eq!(profit(10.0, 15.0), 5.0);
        assert_eq!(profit(20.0, 15.0), -5.0);
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        evidence: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_missing_and_present() {
        let missing: Patch = toml::from_str("").unwrap();
        assert_eq!(missing.evidence, None);

        let set: Patch = toml::from_str(r#"evidence = "receipt.png""#).unwrap();
        assert_eq!(set.evidence, Some(Some("receipt.png".to_string())));
    }

    #[test]
    fn test_double_option_explicit_null() {
        use serde::de::IntoDeserializer;
        use serde::de::value::{Error as ValueError, UnitDeserializer};

        let unit: UnitDeserializer<ValueError> = ().into_deserializer();
        let null = double_option::<String, _>(unit).unwrap();
        assert_eq!(null, Some(None));
    }
}
