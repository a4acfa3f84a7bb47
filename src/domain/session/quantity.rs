//! GoodQuantity value object - the produced count reported on finish.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Quantity of good parts produced during a session.
///
/// # Invariants
///
/// - finite
/// - never negative (`-0` is normalized to `0`)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "f64")]
pub struct GoodQuantity(f64);

impl GoodQuantity {
    /// Creates a quantity from a number.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::invalid_format(
                "good_quantity",
                "must be a finite number",
            ));
        }
        if value < 0.0 {
            return Err(ValidationError::out_of_range("good_quantity", 0.0, value));
        }
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// Parses operator input.
    ///
    /// The longest numeric prefix is used, so `"12 pcs"` reads as 12.
    /// Input with no numeric prefix is rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("good_quantity"));
        }

        let value = trimmed
            .char_indices()
            .map(|(idx, ch)| idx + ch.len_utf8())
            .rev()
            .filter_map(|end| trimmed[..end].parse::<f64>().ok())
            .next()
            .ok_or_else(|| ValidationError::invalid_format("good_quantity", "not a number"))?;

        Self::new(value)
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns true when the quantity has no fractional part.
    pub fn is_whole(&self) -> bool {
        self.0.fract() == 0.0 && self.0 <= i64::MAX as f64
    }
}

impl TryFrom<f64> for GoodQuantity {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for GoodQuantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl fmt::Display for GoodQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_and_positive() {
        assert_eq!(GoodQuantity::new(0.0).unwrap().value(), 0.0);
        assert_eq!(GoodQuantity::new(15.0).unwrap().value(), 15.0);
    }

    #[test]
    fn rejects_negative() {
        assert!(matches!(
            GoodQuantity::new(-1.0),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(GoodQuantity::new(f64::NAN).is_err());
        assert!(GoodQuantity::new(f64::INFINITY).is_err());
    }

    #[test]
    fn negative_zero_is_normalized() {
        let q = GoodQuantity::new(-0.0).unwrap();
        assert!(q.value().is_sign_positive());
    }

    #[test]
    fn parse_reads_plain_numbers() {
        assert_eq!(GoodQuantity::parse(" 15 ").unwrap().value(), 15.0);
        assert_eq!(GoodQuantity::parse("2.5").unwrap().value(), 2.5);
    }

    #[test]
    fn parse_uses_numeric_prefix() {
        assert_eq!(GoodQuantity::parse("12 pcs").unwrap().value(), 12.0);
    }

    #[test]
    fn parse_rejects_text_and_blank() {
        assert!(GoodQuantity::parse("abc").is_err());
        assert!(GoodQuantity::parse("   ").is_err());
        assert!(GoodQuantity::parse("-4").is_err());
        assert!(GoodQuantity::parse("inf").is_err());
    }

    #[test]
    fn whole_quantities_serialize_as_integers() {
        let q = GoodQuantity::new(15.0).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "15");
        let frac = GoodQuantity::new(1.5).unwrap();
        assert_eq!(serde_json::to_string(&frac).unwrap(), "1.5");
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<GoodQuantity>("-2").is_err());
        let q: GoodQuantity = serde_json::from_str("7").unwrap();
        assert_eq!(q.to_string(), "7");
    }
}
