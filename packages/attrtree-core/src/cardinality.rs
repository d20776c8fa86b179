use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// How many values a leaf holds and whether duplicates survive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Cardinality {
    #[default]
    Single,
    Set,
    Multiset,
}

impl Cardinality {
    pub fn keyword(self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Set => "set",
            Cardinality::Multiset => "multiset",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Cardinality> {
        [Cardinality::Single, Cardinality::Set, Cardinality::Multiset]
            .into_iter()
            .find(|c| c.keyword().eq_ignore_ascii_case(keyword))
    }

    pub fn is_multiple(self) -> bool {
        !matches!(self, Cardinality::Single)
    }

    /// SET drops repeated values, keeping the first occurrence of each.
    pub fn apply_restrictions(self, values: Vec<Value>) -> Vec<Value> {
        match self {
            Cardinality::Set => {
                let mut distinct: Vec<Value> = Vec::with_capacity(values.len());
                for value in values {
                    if !distinct.contains(&value) {
                        distinct.push(value);
                    }
                }
                distinct
            }
            Cardinality::Single | Cardinality::Multiset => values,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Cardinality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_keyword(s)
            .ok_or_else(|| Error::InvalidOperation(format!("unknown cardinality `{s}`")))
    }
}
