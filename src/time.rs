//! Timestamp codec for the textual formats GitHub emits.
//!
//! Every date the client writes goes through [`print_date`]; every date it
//! reads goes through [`parse_date`], which accepts the handful of formats
//! seen across REST payloads and legacy endpoints.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Unable to parse the timestamp: {0}")]
    Unrecognized(String),
}

type Parser = fn(&str) -> Option<DateTime<Utc>>;

// Order matters: earlier entries win when a string matches more than one.
const PARSERS: &[Parser] = &[
    parse_canonical,
    parse_slash_with_offset,
    parse_iso_instant,
    parse_iso_with_fraction,
];

/// Render an instant in the canonical wire format (`2024-01-31T12:00:00Z`).
/// Sub-second detail is truncated.
pub fn print_date(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse any recognized timestamp format into a UTC instant.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, TimestampError> {
    PARSERS
        .iter()
        .find_map(|parse| parse(text))
        .ok_or_else(|| TimestampError::Unrecognized(text.to_string()))
}

/// Interpret an `x-ratelimit-reset` style epoch value.
pub fn parse_epoch_seconds(epoch: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(epoch, 0).single()
}

fn parse_canonical(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%SZ")
        .ok()
        .map(|naive| naive.and_utc())
}

// e.g. `2011/04/12 18:54:11 +0000`, used by some older endpoints.
fn parse_slash_with_offset(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, "%Y/%m/%d %H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// RFC 3339 without a fraction, any offset. Fractions are only accepted with a
// literal `Z` (see `parse_iso_with_fraction`), so `...05.5+02:00` is rejected.
fn parse_iso_instant(text: &str) -> Option<DateTime<Utc>> {
    if text.contains('.') {
        return None;
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_iso_with_fraction(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.fZ")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serde adapter writing dates with [`print_date`] and reading them with
/// [`parse_date`]. Use as `#[serde(with = "crate::time::serde_date")]`.
pub mod serde_date {
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::print_date(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse_date(&text).map_err(D::Error::custom)
    }
}

/// Optional variant of [`serde_date`]; `null` maps to `None`.
pub mod serde_date_opt {
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&super::print_date(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|text| super::parse_date(&text).map_err(D::Error::custom))
            .transpose()
    }
}
