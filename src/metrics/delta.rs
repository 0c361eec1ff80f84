use chrono::{DateTime, Duration, Utc};

use crate::data::GlucoseEntry;
use crate::metrics::units::{Unit, MGDL_PER_MMOL};

/// Lookback window for glucose change calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaWindow {
    FiveMin,
    FifteenMin,
}

impl DeltaWindow {
    pub fn minutes(&self) -> i64 {
        match self {
            DeltaWindow::FiveMin => 5,
            DeltaWindow::FifteenMin => 15,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeltaWindow::FiveMin => "5m",
            DeltaWindow::FifteenMin => "15m",
        }
    }
}

/// Change in glucose over the given window, in mg/dL.
///
/// `history` must be ordered newest first. The anchor is the most recent
/// entry at least `window` old; None when history is too short or no entry
/// reaches back that far.
pub fn delta_mgdl(
    history: &[GlucoseEntry],
    window: DeltaWindow,
    now: DateTime<Utc>,
) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }
    let latest = history.first()?;
    let target = now - window.duration();
    let anchor = history.iter().find(|entry| entry.date <= target)?;
    Some(f64::from(latest.sgv - anchor.sgv))
}

/// Change in glucose over the given window, expressed in `unit`.
///
/// The mmol/L variant divides the raw mg/dL difference without rounding;
/// callers format to one decimal at the display boundary.
pub fn delta(
    history: &[GlucoseEntry],
    window: DeltaWindow,
    unit: Unit,
    now: DateTime<Utc>,
) -> Option<f64> {
    let mgdl = delta_mgdl(history, window, now)?;
    Some(match unit {
        Unit::MgDl => mgdl,
        Unit::MmolL => mgdl / MGDL_PER_MMOL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Trend;

    fn entry(sgv: i32, offset_secs: i64, now: DateTime<Utc>) -> GlucoseEntry {
        GlucoseEntry {
            sgv,
            date: now - Duration::seconds(offset_secs),
            direction: Trend::Flat,
            device: None,
            units: None,
        }
    }

    #[test]
    fn deltas_pick_the_right_anchor() {
        let now = Utc::now();
        // 150 now, 140 five minutes ago, 120 fifteen minutes ago.
        let history = vec![entry(150, 0, now), entry(140, 300, now), entry(120, 900, now)];

        assert_eq!(delta_mgdl(&history, DeltaWindow::FiveMin, now), Some(10.0));
        assert_eq!(delta_mgdl(&history, DeltaWindow::FifteenMin, now), Some(30.0));
    }

    #[test]
    fn short_history_yields_none() {
        let now = Utc::now();
        assert_eq!(delta_mgdl(&[], DeltaWindow::FiveMin, now), None);
        let single = vec![entry(150, 0, now)];
        assert_eq!(delta_mgdl(&single, DeltaWindow::FiveMin, now), None);
    }

    #[test]
    fn none_when_no_entry_is_old_enough() {
        let now = Utc::now();
        let history = vec![entry(150, 0, now), entry(145, 120, now)];
        assert_eq!(delta_mgdl(&history, DeltaWindow::FiveMin, now), None);
    }

    #[test]
    fn anchor_boundary_is_inclusive() {
        let now = Utc::now();
        let history = vec![entry(150, 0, now), entry(130, 300, now)];
        // Exactly five minutes old qualifies as the anchor.
        assert_eq!(delta_mgdl(&history, DeltaWindow::FiveMin, now), Some(20.0));
    }

    #[test]
    fn anchor_is_newest_entry_past_the_window() {
        let now = Utc::now();
        let history = vec![
            entry(150, 0, now),
            entry(148, 60, now),
            entry(140, 360, now),
            entry(100, 1800, now),
        ];
        // 140 at six minutes is the first entry past the 5m window; the
        // half-hour-old 100 must not win.
        assert_eq!(delta_mgdl(&history, DeltaWindow::FiveMin, now), Some(10.0));
    }

    #[test]
    fn negative_delta_passes_through() {
        let now = Utc::now();
        let history = vec![entry(110, 0, now), entry(140, 300, now)];
        assert_eq!(delta_mgdl(&history, DeltaWindow::FiveMin, now), Some(-30.0));
    }

    #[test]
    fn mmol_delta_is_unrounded() {
        let now = Utc::now();
        let history = vec![entry(150, 0, now), entry(140, 300, now)];
        let got = delta(&history, DeltaWindow::FiveMin, Unit::MmolL, now).unwrap();
        assert!((got - 10.0 / MGDL_PER_MMOL).abs() < 1e-9);
    }

    #[test]
    fn window_metadata() {
        assert_eq!(DeltaWindow::FiveMin.minutes(), 5);
        assert_eq!(DeltaWindow::FifteenMin.minutes(), 15);
        assert_eq!(DeltaWindow::FiveMin.label(), "5m");
        assert_eq!(DeltaWindow::FifteenMin.label(), "15m");
    }
}
