//! A single ordinate that remembers how it was written.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use crate::error::InexactCoordinate;

/// A JSON number held as both its source text and its exact decimal value.
///
/// Comparison, equality and hashing use the value, so `35.60` equals `35.6`.
/// Serialization writes the source text back unchanged, as a JSON number.
/// Parsing fails when the text has more precision than `Decimal` can hold
/// rather than rounding it.
#[derive(Debug, Clone)]
pub struct Coordinate {
    value: Decimal,
    text: String,
}

impl Coordinate {
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn parse_exact(text: &str) -> Result<Decimal, rust_decimal::Error> {
    match text.split_once(['e', 'E']) {
        Some((base, _)) => {
            // from_scientific rounds an over-long mantissa, so check it first.
            Decimal::from_str_exact(base)?;
            Decimal::from_scientific(text)
        }
        None => Decimal::from_str_exact(text),
    }
}

impl FromStr for Coordinate {
    type Err = InexactCoordinate;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value = parse_exact(text).map_err(|e| InexactCoordinate {
            text: text.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            value,
            text: text.to_string(),
        })
    }
}

impl From<Decimal> for Coordinate {
    fn from(value: Decimal) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Coordinate {}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Number::from_str(&self.text)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = Number::deserialize(deserializer)?;
        number.as_str().parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_keeps_source_text() {
        let coordinate: Coordinate = serde_json::from_str("139.770392000000001").unwrap();
        assert_eq!(coordinate.value(), dec!(139.770392000000001));
        assert_eq!(
            serde_json::to_string(&coordinate).unwrap(),
            "139.770392000000001"
        );
    }

    #[test]
    fn test_writes_a_json_number() {
        let coordinate = Coordinate::from(dec!(35.60));
        assert_eq!(serde_json::to_string(&coordinate).unwrap(), "35.60");
        assert_eq!(
            serde_json::to_string(&[coordinate]).unwrap(),
            "[35.60]"
        );
    }

    #[test]
    fn test_equality_ignores_scale() {
        let a: Coordinate = "35.60".parse().unwrap();
        let b: Coordinate = "35.6".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_exponent_text_round_trips() {
        let coordinate: Coordinate = serde_json::from_str("1.395e2").unwrap();
        assert_eq!(coordinate.value(), dec!(139.5));
        assert_eq!(serde_json::to_string(&coordinate).unwrap(), "1.395e2");
    }

    #[test]
    fn test_over_long_fraction_is_rejected() {
        let result: Result<Coordinate, _> =
            serde_json::from_str("139.77039200000000000000000000001");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("139.77039200000000000000000000001"));
    }

    #[test]
    fn test_over_long_mantissa_with_exponent_is_rejected() {
        assert!("1.39770392000000000000000000000001e2"
            .parse::<Coordinate>()
            .is_err());
    }

    #[test]
    fn test_ordering_follows_value() {
        let small: Coordinate = "-180".parse().unwrap();
        let large: Coordinate = "1.8e2".parse().unwrap();
        assert!(small < large);
        assert_eq!(small.clone().min(large.clone()), small);
    }
}
