//! Numeric coercion of raw text tokens.
//!
//! Every parser in this crate pushes its fields through [`NumericValue::coerce`],
//! which never fails: a token is an integer, a float, or it stays text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumericValue {
    /// Integer first, then float, then the original text.
    ///
    /// Digit strings too large for `i64` come back as `Float`. Float parsing
    /// requires at least one digit, so `inf` and `nan` stay `Text`.
    pub fn coerce(token: &str) -> Self {
        if let Ok(i) = token.parse::<i64>() {
            return NumericValue::Integer(i);
        }
        if token.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = token.parse::<f64>() {
                return NumericValue::Float(f);
            }
        }
        NumericValue::Text(token.to_string())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NumericValue::Text(_))
    }
}

impl Default for NumericValue {
    fn default() -> Self {
        NumericValue::Integer(0)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Integer(i) => write!(f, "{}", i),
            NumericValue::Float(v) => write!(f, "{}", v),
            NumericValue::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integer() {
        assert_eq!(NumericValue::coerce("42"), NumericValue::Integer(42));
        assert_eq!(NumericValue::coerce("-7"), NumericValue::Integer(-7));
        assert_eq!(NumericValue::coerce("0"), NumericValue::Integer(0));
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(NumericValue::coerce("0.52"), NumericValue::Float(0.52));
        assert_eq!(NumericValue::coerce("-1.5"), NumericValue::Float(-1.5));
        assert_eq!(NumericValue::coerce("1e3"), NumericValue::Float(1000.0));
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(
            NumericValue::coerce("eth0"),
            NumericValue::Text("eth0".to_string())
        );
        assert_eq!(NumericValue::coerce(""), NumericValue::Text(String::new()));
        assert_eq!(
            NumericValue::coerce("1.2.3"),
            NumericValue::Text("1.2.3".to_string())
        );
        // No digits: not a float even though f64 would accept it
        assert!(NumericValue::coerce("inf").is_text());
        assert!(NumericValue::coerce("NaN").is_text());
    }

    #[test]
    fn test_coerce_integer_overflow_becomes_float() {
        let value = NumericValue::coerce("18446744073709551615");
        assert!(matches!(value, NumericValue::Float(_)));
    }

    #[test]
    fn test_display_round_trips_integers() {
        for token in ["8", "0", "123456789", "-3"] {
            assert_eq!(NumericValue::coerce(token).to_string(), token);
        }
    }

    #[test]
    fn test_serialize_untagged() {
        let values = vec![
            NumericValue::Integer(1),
            NumericValue::Float(2.5),
            NumericValue::Text("x".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[1,2.5,"x"]"#);
    }
}
