//! Value conversion between type tags.
//!
//! Only the numeric-to-temporal conversions transform anything; every other
//! legal coercion keeps the value as is. Legality is checked by the caller via
//! [`TypeTag::check_coercible_from`].

use tracing::trace;

use crate::error::Result;
use crate::schema::SchemaEntry;
use crate::timezone::Timezone;
use crate::type_tag::TypeTag;
use crate::value::Value;

/// Convert one scalar from `source` to `target`.
///
/// NUMBER to TIME shifts the instant by the offset of the schema leaf's
/// `timezone` option, or of `default_timezone` when the leaf has none.
pub fn coerce(
    source: TypeTag,
    target: TypeTag,
    value: &Value,
    schema: &SchemaEntry,
    default_timezone: &Timezone,
) -> Result<Value> {
    match (source, target) {
        (TypeTag::Number, TypeTag::Date) => Ok(Value::Integer(value.epoch_millis_for(target)?)),
        (TypeTag::Number, TypeTag::Time) => {
            let millis = value.epoch_millis_for(target)?;
            let timezone = schema.timezone()?;
            let timezone = timezone.as_ref().unwrap_or(default_timezone);
            let offset = timezone.offset_millis_at(millis);
            trace!(timezone = %timezone, offset, "shifting time value");
            Ok(Value::Integer(millis - offset))
        }
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TIMEZONE_OPTION;

    const HOUR: i64 = 3_600_000;

    fn time_leaf() -> SchemaEntry {
        SchemaEntry::typed(TypeTag::Time)
    }

    #[test]
    fn number_to_date_keeps_the_instant() {
        let out = coerce(
            TypeTag::Number,
            TypeTag::Date,
            &Value::Integer(86_400_000),
            &SchemaEntry::typed(TypeTag::Date),
            &Timezone::utc(),
        )
        .unwrap();
        assert_eq!(out, Value::Integer(86_400_000));
    }

    #[test]
    fn number_to_time_subtracts_schema_offset() {
        let leaf = time_leaf().with_option(TIMEZONE_OPTION, "GMT+02:00");
        let out = coerce(
            TypeTag::Number,
            TypeTag::Time,
            &Value::Integer(0),
            &leaf,
            &Timezone::utc(),
        )
        .unwrap();
        assert_eq!(out, Value::Integer(-2 * HOUR));
    }

    #[test]
    fn number_to_time_falls_back_to_default_zone() {
        let default = Timezone::resolve("GMT-05:00").unwrap();
        let out = coerce(
            TypeTag::Number,
            TypeTag::Time,
            &Value::Integer(0),
            &time_leaf(),
            &default,
        )
        .unwrap();
        assert_eq!(out, Value::Integer(5 * HOUR));
    }

    #[test]
    fn other_pairs_are_identity() {
        let value = Value::from("hello");
        let out = coerce(
            TypeTag::String,
            TypeTag::Binary,
            &value,
            &SchemaEntry::typed(TypeTag::Binary),
            &Timezone::utc(),
        )
        .unwrap();
        assert_eq!(out, value);
    }

    #[test]
    fn non_numeric_time_is_illegal() {
        let err = coerce(
            TypeTag::Number,
            TypeTag::Time,
            &Value::from("noon"),
            &time_leaf(),
            &Timezone::utc(),
        )
        .unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::IllegalValue);
    }
}
