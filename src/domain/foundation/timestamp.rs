//! Timestamp value object for immutable points in time.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 timestamp string, normalizing to UTC.
    pub fn parse_rfc3339(raw: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(
            DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc),
        ))
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Renders as RFC 3339 with millisecond precision.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_rfc3339_with_utc_designator() {
        let ts = Timestamp::parse_rfc3339("2000-09-11T19:41:17.780Z").unwrap();
        assert_eq!(ts.as_datetime().year(), 2000);
        assert_eq!(ts.to_rfc3339(), "2000-09-11T19:41:17.780Z");
    }

    #[test]
    fn parses_rfc3339_with_offset_and_normalizes_to_utc() {
        let ts = Timestamp::parse_rfc3339("2000-09-11T19:41:17-05:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2000-09-12T00:41:17.000Z");
    }

    #[test]
    fn rejects_non_date_strings() {
        assert!(Timestamp::parse_rfc3339("hello").is_err());
        assert!(Timestamp::parse_rfc3339("2000-13-40T00:00:00Z").is_err());
    }

    #[test]
    fn ordering_works() {
        let earlier = Timestamp::parse_rfc3339("2000-01-01T00:00:00Z").unwrap();
        let later = Timestamp::parse_rfc3339("2001-01-01T00:00:00Z").unwrap();

        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(earlier < later);
    }

    #[test]
    fn serializes_to_json_string() {
        let ts = Timestamp::parse_rfc3339("2024-01-15T10:30:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));
    }

    #[test]
    fn deserializes_from_json_string() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        assert_eq!(ts.as_datetime().year(), 2024);
    }
}
