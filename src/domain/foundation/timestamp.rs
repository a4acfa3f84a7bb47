//! Timestamp value object for server-reported points in time.
//!
//! The backend renders dates in plant-local time as `DD/MM/YYYY HH:MM:SS`
//! with no offset. The raw text is kept for display; the parsed value is
//! only used to anchor the elapsed-time counter.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Format used by the backend for session start/end stamps.
pub const FLOOR_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Plant-local timestamp as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorTimestamp {
    raw: String,
    parsed: Option<NaiveDateTime>,
}

impl FloorTimestamp {
    /// Wraps a server string, parsing it when it matches the floor format.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = NaiveDateTime::parse_from_str(raw.trim(), FLOOR_TIME_FORMAT).ok();
        Self { raw, parsed }
    }

    /// Creates a timestamp from a local date-time.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self {
            raw: dt.format(FLOOR_TIME_FORMAT).to_string(),
            parsed: Some(dt),
        }
    }

    /// Current plant-local time.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    /// Returns the text exactly as the server sent it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed date-time, if the text was in the floor format.
    pub fn as_naive(&self) -> Option<&NaiveDateTime> {
        self.parsed.as_ref()
    }

    /// Whole seconds between this timestamp and `now`.
    ///
    /// Returns `None` when the text could not be parsed or lies after `now`.
    pub fn seconds_until(&self, now: &NaiveDateTime) -> Option<u64> {
        let start = self.parsed?;
        let secs = now.signed_duration_since(start).num_seconds();
        u64::try_from(secs).ok()
    }
}

impl fmt::Display for FloorTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for FloorTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for FloorTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(raw))
    }
}
