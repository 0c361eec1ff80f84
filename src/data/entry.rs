//! Glucose entry data model.
//!
//! Represents a single sensor glucose value (SGV) record as served by the
//! Nightscout `api/v1/entries/sgv.json` endpoint. Histories arrive ordered
//! newest-first; index 0 is always the latest reading.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Readings older than this are unusable for display.
const STALE_AFTER_SECS: i64 = 600;

/// Rate-of-change code reported alongside each reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Trend {
    DoubleUp,
    SingleUp,
    FortyFiveUp,
    Flat,
    FortyFiveDown,
    SingleDown,
    DoubleDown,
    Unknown,
}

impl Default for Trend {
    fn default() -> Self {
        Trend::Unknown
    }
}

impl Trend {
    /// Wire code as Nightscout reports it.
    pub fn code(self) -> &'static str {
        match self {
            Trend::DoubleUp => "DoubleUp",
            Trend::SingleUp => "SingleUp",
            Trend::FortyFiveUp => "FortyFiveUp",
            Trend::Flat => "Flat",
            Trend::FortyFiveDown => "FortyFiveDown",
            Trend::SingleDown => "SingleDown",
            Trend::DoubleDown => "DoubleDown",
            Trend::Unknown => "NONE",
        }
    }

    /// Arrow glyph for display. Unrecognized trends render as `"?"`.
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::DoubleUp => "↑↑",
            Trend::SingleUp => "↑",
            Trend::FortyFiveUp => "↗",
            Trend::Flat => "→",
            Trend::FortyFiveDown => "↘",
            Trend::SingleDown => "↓",
            Trend::DoubleDown => "↓↓",
            Trend::Unknown => "?",
        }
    }
}

impl From<String> for Trend {
    fn from(code: String) -> Self {
        match code.as_str() {
            "DoubleUp" => Trend::DoubleUp,
            "SingleUp" => Trend::SingleUp,
            "FortyFiveUp" => Trend::FortyFiveUp,
            "Flat" => Trend::Flat,
            "FortyFiveDown" => Trend::FortyFiveDown,
            "SingleDown" => Trend::SingleDown,
            "DoubleDown" => Trend::DoubleDown,
            _ => Trend::Unknown,
        }
    }
}

impl From<Trend> for String {
    fn from(trend: Trend) -> Self {
        trend.code().to_string()
    }
}

/// One timestamped glucose observation.
///
/// Unknown wire fields are ignored; `sgv` is always mg/dL regardless of
/// what unit system the uploader claims in `units`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlucoseEntry {
    /// Sensor glucose value in mg/dL.
    pub sgv: i32,
    /// Instant the reading was taken, supplied by the source (not receipt time).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Trend code; absent or unrecognized codes become [`Trend::Unknown`].
    #[serde(default)]
    pub direction: Trend,
    /// Reporting device, when the source includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Unit system claimed by the uploader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl GlucoseEntry {
    /// Whole seconds elapsed between this reading and `now`.
    ///
    /// Negative when the source clock runs ahead of ours; the raw value is
    /// passed through and display formatters clamp at zero.
    pub fn seconds_since(&self, now: DateTime<Utc>) -> i64 {
        (now - self.date).num_seconds()
    }

    /// A reading strictly older than ten minutes is stale and must not be
    /// rendered as a live value.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        (now - self.date) > Duration::seconds(STALE_AFTER_SECS)
    }
}
