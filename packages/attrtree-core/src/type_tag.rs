use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cardinality::Cardinality;
use crate::error::{Error, Result};
use crate::value::Value;

/// The closed set of value types an attribute leaf can carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TypeTag {
    Object,
    String,
    Date,
    Time,
    Binary,
    Number,
    Boolean,
    Null,
}

impl TypeTag {
    pub const ALL: [TypeTag; 8] = [
        TypeTag::Object,
        TypeTag::String,
        TypeTag::Date,
        TypeTag::Time,
        TypeTag::Binary,
        TypeTag::Number,
        TypeTag::Boolean,
        TypeTag::Null,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            TypeTag::Object => "object",
            TypeTag::String => "string",
            TypeTag::Date => "date",
            TypeTag::Time => "time",
            TypeTag::Binary => "binary",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Null => "null",
        }
    }

    /// Case-insensitive lookup by keyword.
    pub fn from_keyword(keyword: &str) -> Option<TypeTag> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.keyword().eq_ignore_ascii_case(keyword))
    }

    /// Targets a value of this type may be converted to, besides itself.
    pub fn coercible_to(self) -> &'static [TypeTag] {
        match self {
            TypeTag::String => &[TypeTag::Binary],
            TypeTag::Number => &[TypeTag::Date, TypeTag::Time],
            TypeTag::Object
            | TypeTag::Date
            | TypeTag::Time
            | TypeTag::Binary
            | TypeTag::Boolean
            | TypeTag::Null => &[],
        }
    }

    /// NULL coerces to anything and every type coerces to itself.
    pub fn is_coercible_from(self, source: TypeTag) -> bool {
        source == TypeTag::Null || source == self || source.coercible_to().contains(&self)
    }

    pub fn check_coercible_from(self, source: TypeTag) -> Result<()> {
        if self.is_coercible_from(source) {
            Ok(())
        } else {
            Err(Error::IncompatibleTypes {
                from: source,
                to: self,
            })
        }
    }

    /// Type-specific validity check for a single (non-array) leaf value.
    ///
    /// Only DATE imposes a rule: the epoch-millisecond value must be exact
    /// midnight in UTC.
    pub fn validate(self, value: &Value) -> Result<()> {
        match self {
            TypeTag::Date => {
                let millis = value.epoch_millis_for(self)?;
                let midnight = DateTime::<Utc>::from_timestamp_millis(millis)
                    .map(|instant| instant.time() == NaiveTime::MIN)
                    .unwrap_or(false);
                if midnight {
                    Ok(())
                } else {
                    Err(Error::IllegalValue {
                        value: value.to_string(),
                        type_tag: self,
                    })
                }
            }
            TypeTag::Object
            | TypeTag::String
            | TypeTag::Time
            | TypeTag::Binary
            | TypeTag::Number
            | TypeTag::Boolean
            | TypeTag::Null => Ok(()),
        }
    }

    /// Infer a tag from the shape of an untyped scalar.
    pub fn guess(value: &Value) -> Option<TypeTag> {
        match value {
            Value::Boolean(_) => Some(TypeTag::Boolean),
            Value::Integer(_) | Value::Float(_) => Some(TypeTag::Number),
            Value::String(_) => Some(TypeTag::String),
            Value::Null | Value::Binary(_) | Value::Array(_) => None,
        }
    }

    /// `"<TYPE> <CARDINALITY>"`, as cited in type mismatch errors.
    pub fn describe(self, cardinality: Cardinality) -> String {
        format!(
            "{} {}",
            self.keyword().to_ascii_uppercase(),
            cardinality.keyword().to_ascii_uppercase()
        )
    }

    /// Empty container with room for `len` elements of this type.
    ///
    /// DATE and TIME elements are stored as numbers. OBJECT and NULL have no
    /// element representation.
    pub fn new_array(self, len: usize) -> Result<Vec<Value>> {
        match self {
            TypeTag::Binary
            | TypeTag::Number
            | TypeTag::Boolean
            | TypeTag::String
            | TypeTag::Date
            | TypeTag::Time => Ok(Vec::with_capacity(len)),
            TypeTag::Object | TypeTag::Null => Err(Error::InvalidOperation(format!(
                "type `{self}` has no array representation"
            ))),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_keyword(s).ok_or_else(|| Error::InvalidOperation(format!("unknown type `{s}`")))
    }
}
