//! Canonical `yyyy-MM-dd HH:mm:ss` timestamp text used on every boundary.
//!
//! Window markers are compared as raw strings elsewhere; this module only
//! converts between the text form and `NaiveDateTime` for range filtering.

use chrono::{Local, NaiveDateTime, NaiveTime};

use crate::error::AresError;

/// chrono pattern for the canonical text form.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ISO-like variants accepted when reading previously stored records.
const LENIENT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Parse canonical text. Surrounding whitespace is ignored.
pub fn parse(text: &str) -> Result<NaiveDateTime, AresError> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| AresError::InvalidTimestamp(text.to_string()))
}

/// Parse canonical text, falling back to the ISO forms older writers produced.
pub fn parse_lenient(text: &str) -> Result<NaiveDateTime, AresError> {
    if let Ok(dt) = parse(text) {
        return Ok(dt);
    }
    LENIENT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
        .ok_or_else(|| AresError::InvalidTimestamp(text.to_string()))
}

pub fn format(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Today at local midnight, in canonical text.
pub fn today_midnight() -> String {
    format(&Local::now().date_naive().and_time(NaiveTime::MIN))
}

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Serde adapter for `Option<NaiveDateTime>` stored as canonical text.
pub mod option_text {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&super::format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_lenient(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
