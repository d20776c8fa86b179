//! Timezone identifiers accepted by TIME schema leaves and coercion config.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

const GMT: &str = "GMT";

/// A resolved timezone: either an IANA zone or a fixed `GMT±hh:mm` offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Timezone {
    Named(Tz),
    Fixed { id: String, offset: FixedOffset },
}

impl Timezone {
    pub fn utc() -> Self {
        Timezone::Named(Tz::UTC)
    }

    /// Resolve an identifier. IANA names win; otherwise any string mentioning
    /// `GMT` is read as a fixed offset, falling back to GMT itself when the
    /// offset part cannot be parsed.
    pub fn resolve(id: &str) -> Option<Self> {
        if let Ok(tz) = Tz::from_str(id) {
            return Some(Timezone::Named(tz));
        }
        if !id.contains(GMT) {
            return None;
        }
        let offset = parse_gmt_offset(id).unwrap_or_else(|| Utc.fix());
        Some(Timezone::Fixed {
            id: id.to_string(),
            offset,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Timezone::Named(tz) => tz.name(),
            Timezone::Fixed { id, .. } => id,
        }
    }

    /// Offset from UTC in milliseconds in effect at the given UTC instant.
    pub fn offset_millis_at(&self, epoch_millis: i64) -> i64 {
        let Some(instant) = DateTime::<Utc>::from_timestamp_millis(epoch_millis) else {
            return 0;
        };
        let seconds = match self {
            Timezone::Named(tz) => tz
                .offset_from_utc_datetime(&instant.naive_utc())
                .fix()
                .local_minus_utc(),
            Timezone::Fixed { offset, .. } => offset.local_minus_utc(),
        };
        i64::from(seconds) * 1000
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Timezone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s).ok_or_else(|| Error::IllegalOption {
            value: s.to_string(),
            option: crate::schema::TIMEZONE_OPTION.to_string(),
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Timezone {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Timezone {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let id = <String as serde::Deserialize>::deserialize(deserializer)?;
        Timezone::resolve(&id)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown timezone `{id}`")))
    }
}

/// `GMT`, `GMT+2`, `GMT-05:30`, `GMT+0530`.
fn parse_gmt_offset(id: &str) -> Option<FixedOffset> {
    let (_, rest) = id.split_once(GMT)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(Utc.fix());
    }
    if !rest.is_ascii() {
        return None;
    }
    let (sign, digits) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
