use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::type_tag::TypeTag;

/// Untyped payload carried by attribute leaves and schema options.
///
/// DATE and TIME values are stored as `Integer` epoch milliseconds (UTC).
/// With the `serde` feature, `Binary` is written as `{"$binary": "<hex>"}` so
/// it reads back as bytes rather than as an array of numbers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    #[cfg_attr(feature = "serde", serde(with = "binary"))]
    Binary(Vec<u8>),
}

#[cfg(feature = "serde")]
mod binary {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Encoded {
        #[serde(rename = "$binary")]
        hex: String,
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        Encoded {
            hex: hex::encode(bytes),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Encoded::deserialize(deserializer)?;
        hex::decode(&encoded.hex).map_err(serde::de::Error::custom)
    }
}

impl Value {
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret a numeric value as epoch milliseconds, truncating fractions.
    pub fn as_epoch_millis(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            _ => None,
        }
    }

    /// Same as [`Value::as_epoch_millis`] but reports a non-numeric payload
    /// as an illegal value for `type_tag`.
    pub(crate) fn epoch_millis_for(&self, type_tag: TypeTag) -> Result<i64> {
        self.as_epoch_millis().ok_or_else(|| Error::IllegalValue {
            value: self.to_string(),
            type_tag,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Binary(bytes) => f.write_str(&hex::encode(bytes)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Binary(bytes)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_millis_truncates_floats() {
        assert_eq!(Value::Float(1500.9).as_epoch_millis(), Some(1500));
        assert_eq!(Value::Integer(-3).as_epoch_millis(), Some(-3));
        assert_eq!(Value::from("12").as_epoch_millis(), None);
        assert_eq!(Value::Float(f64::NAN).as_epoch_millis(), None);
    }

    #[test]
    fn display_renders_binary_as_hex() {
        assert_eq!(Value::Binary(vec![0x0a, 0xff]).to_string(), "0aff");
        assert_eq!(
            Value::Array(vec![1.into(), "x".into()]).to_string(),
            "[1, x]"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn binary_survives_serde_round_trip() {
        let binary = Value::Binary(vec![1, 2, 0xff]);
        let text = serde_json::to_string(&binary).unwrap();
        assert_eq!(text, r#"{"$binary":"0102ff"}"#);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), binary);

        let numbers: Value = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(numbers, Value::Array(vec![Value::Integer(1), Value::Integer(2)]));
    }
}
