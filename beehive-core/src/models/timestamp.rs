//! Timestamp parsing for backend payloads.
//!
//! The backend mixes formats: chat and notification documents carry naive ISO-8601
//! strings, upload records go through the JSON encoder as RFC 2822 dates, and account
//! records use a day-first layout. Naive values are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

pub mod flexible {
    use super::*;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{}'", raw)))
    }
}

/// Optional timestamps degrade to `None` instead of failing the whole payload.
pub mod flexible_option {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_naive_iso() {
        let parsed = parse_timestamp("2024-02-01T12:30:00.123456").unwrap();
        assert_eq!(parsed.timestamp(), 1706790600);
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_timestamp("2024-02-01T12:30:00+01:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 2, 1, 11, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc2822() {
        let parsed = parse_timestamp("Thu, 01 Feb 2024 12:30:00 GMT").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_day_first() {
        let parsed = parse_timestamp("01-02-2024 12:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
