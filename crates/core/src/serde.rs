//! Serde helper functions for the backend's time-of-day format.
//!
//! The events backend exchanges times as `HH:MM` strings, which is not the
//! format chrono's default `NaiveTime` implementation produces.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const TIME_FORMAT: &str = "%H:%M";

/// Parse a time string. Accepts formats: HH:MM or HH:MM:SS
pub fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT).or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
}

/// Serialize a NaiveTime as HH:MM.
pub fn serialize_time<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

/// Deserialize a NaiveTime from HH:MM or HH:MM:SS.
pub fn deserialize_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_time(&s).map_err(serde::de::Error::custom)
}

/// Serialize an optional NaiveTime as HH:MM.
///
/// Pair with `skip_serializing_if = "Option::is_none"`; `None` is written as null.
pub fn serialize_optional_time<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match time {
        Some(time) => serialize_time(time, serializer),
        None => serializer.serialize_none(),
    }
}

/// Deserialize an optional NaiveTime, treating empty strings as None.
pub fn deserialize_optional_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => parse_time(&s).map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
