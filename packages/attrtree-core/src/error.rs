use std::fmt;

use thiserror::Error;

use crate::path::Path;
use crate::type_tag::TypeTag;

pub type Result<T> = std::result::Result<T, Error>;

/// Stable identifiers for every error the engine reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    NoOptions,
    UnknownOption,
    IllegalOption,
    IllegalValue,
    IncompatibleTypes,
    WrongTypes,
    InvalidOperation,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoOptions => "NO_OPTIONS",
            ErrorCode::UnknownOption => "UNKNOWN_OPTION",
            ErrorCode::IllegalOption => "ILLEGAL_OPTION",
            ErrorCode::IllegalValue => "ILLEGAL_VALUE",
            ErrorCode::IncompatibleTypes => "INCOMPATIBLE_TYPES",
            ErrorCode::WrongTypes => "WRONG_TYPES",
            ErrorCode::InvalidOperation => "INVALID_OPERATION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating schemas or coercing attribute trees.
///
/// Every variant except `InvalidOperation` is a data or schema error that
/// callers are expected to present to users; `InvalidOperation` signals
/// misuse of the API (for example a schema leaf that never had its type set).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("type `{0}` may not have options")]
    NoOptions(TypeTag),
    #[error("type `{type_tag}` may not have options other than `{allowed}`")]
    UnknownOption { type_tag: TypeTag, allowed: String },
    #[error("illegal value `{value}` for option `{option}`")]
    IllegalOption { value: String, option: String },
    #[error("illegal value `{value}` for type `{type_tag}`")]
    IllegalValue { value: String, type_tag: TypeTag },
    #[error("cannot coerce from `{from}` to `{to}`")]
    IncompatibleTypes { from: TypeTag, to: TypeTag },
    #[error("incompatible types for path `{path}`: found `{found}` and `{expected}`")]
    WrongTypes {
        path: Path,
        found: String,
        expected: String,
    },
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NoOptions(_) => ErrorCode::NoOptions,
            Error::UnknownOption { .. } => ErrorCode::UnknownOption,
            Error::IllegalOption { .. } => ErrorCode::IllegalOption,
            Error::IllegalValue { .. } => ErrorCode::IllegalValue,
            Error::IncompatibleTypes { .. } => ErrorCode::IncompatibleTypes,
            Error::WrongTypes { .. } => ErrorCode::WrongTypes,
            Error::InvalidOperation(_) => ErrorCode::InvalidOperation,
        }
    }

    /// Positional arguments in the order the message template consumes them.
    pub fn args(&self) -> Vec<String> {
        match self {
            Error::NoOptions(type_tag) => vec![type_tag.to_string()],
            Error::UnknownOption { type_tag, allowed } => {
                vec![type_tag.to_string(), allowed.clone()]
            }
            Error::IllegalOption { value, option } => vec![value.clone(), option.clone()],
            Error::IllegalValue { value, type_tag } => vec![value.clone(), type_tag.to_string()],
            Error::IncompatibleTypes { from, to } => vec![from.to_string(), to.to_string()],
            Error::WrongTypes {
                path,
                found,
                expected,
            } => vec![path.to_string(), found.clone(), expected.clone()],
            Error::InvalidOperation(message) => vec![message.clone()],
        }
    }
}
