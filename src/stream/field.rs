//! The field catalog.
//!
//! Every exposed metric is one `Field` value: a parameterized evaluator
//! over unit, lookback window and combo layout. Hosts pick fields out of
//! `Field::catalog()` by their stable id and run one stream per field.

use chrono::{DateTime, Utc};

use crate::data::GlucoseEntry;
use crate::metrics::{
    delta,
    format::{force_one_decimal, format_delta, format_elapsed, pack_elapsed},
    DeltaWindow, Unit,
};
use crate::stream::state::{FieldSample, StreamState};

/// Result of evaluating one field against a reading history.
///
/// Absence is typed here; placeholder values (`0.0`, `"--"`) belong to the
/// output adapters, not the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Value(FieldSample),
    /// History too thin or no entry old enough for the window.
    NoData,
    /// Latest reading is older than the staleness threshold.
    Stale,
    /// No readings at all.
    Empty,
}

/// Caption layouts for the combined fields.
///
/// The caption pairs an elapsed-time style with a delta window; the
/// numeric stream of a combo always carries the glucose value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboLayout {
    SecondsDelta15m,
    SecondsDelta5m,
    ClockDelta15m,
    ClockDelta5m,
}

impl ComboLayout {
    pub const ALL: [ComboLayout; 4] = [
        ComboLayout::SecondsDelta15m,
        ComboLayout::SecondsDelta5m,
        ComboLayout::ClockDelta15m,
        ComboLayout::ClockDelta5m,
    ];

    fn number(&self) -> u8 {
        match self {
            ComboLayout::SecondsDelta15m => 1,
            ComboLayout::SecondsDelta5m => 2,
            ComboLayout::ClockDelta15m => 3,
            ComboLayout::ClockDelta5m => 4,
        }
    }

    fn window(&self) -> DeltaWindow {
        match self {
            ComboLayout::SecondsDelta15m | ComboLayout::ClockDelta15m => DeltaWindow::FifteenMin,
            ComboLayout::SecondsDelta5m | ComboLayout::ClockDelta5m => DeltaWindow::FiveMin,
        }
    }

    fn uses_clock(&self) -> bool {
        matches!(self, ComboLayout::ClockDelta15m | ComboLayout::ClockDelta5m)
    }
}

/// One exposed metric with fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Glucose { unit: Unit },
    Delta { window: DeltaWindow, unit: Unit },
    /// Elapsed seconds since the latest reading, raw.
    TimeSinceSeconds,
    /// Elapsed time packed into one number for numeric-only displays.
    TimeSincePacked,
    TrendArrow,
    Combo { layout: ComboLayout, unit: Unit },
}

impl Field {
    /// All seventeen fields a host can register.
    pub fn catalog() -> Vec<Field> {
        let mut fields = vec![
            Field::Glucose { unit: Unit::MgDl },
            Field::Glucose { unit: Unit::MmolL },
            Field::TimeSinceSeconds,
            Field::TimeSincePacked,
            Field::TrendArrow,
        ];
        for window in [DeltaWindow::FiveMin, DeltaWindow::FifteenMin] {
            for unit in [Unit::MgDl, Unit::MmolL] {
                fields.push(Field::Delta { window, unit });
            }
        }
        for layout in ComboLayout::ALL {
            for unit in [Unit::MgDl, Unit::MmolL] {
                fields.push(Field::Combo { layout, unit });
            }
        }
        fields
    }

    /// Stable identifier a host registers the field under.
    pub fn id(&self) -> String {
        match self {
            Field::Glucose { unit } => format!("glucose_{}", unit.suffix()),
            Field::Delta { window, unit } => {
                format!("delta_{}_{}", window.label(), unit.suffix())
            }
            Field::TimeSinceSeconds => "time_since".to_string(),
            Field::TimeSincePacked => "time_since_formatted".to_string(),
            Field::TrendArrow => "direction_arrow".to_string(),
            Field::Combo { layout, unit } => {
                format!("combo_{}_{}", layout.number(), unit.suffix())
            }
        }
    }

    /// Evaluate against a history ordered newest first.
    pub fn evaluate(&self, history: &[GlucoseEntry], now: DateTime<Utc>) -> MetricOutcome {
        let Some(latest) = history.first() else {
            return MetricOutcome::Empty;
        };
        if latest.is_stale(now) {
            return MetricOutcome::Stale;
        }
        match self {
            Field::Glucose { unit } | Field::Combo { unit, .. } => {
                MetricOutcome::Value(FieldSample::Number(unit.convert(f64::from(latest.sgv))))
            }
            Field::TimeSinceSeconds => {
                MetricOutcome::Value(FieldSample::Number(latest.seconds_since(now) as f64))
            }
            Field::TimeSincePacked => {
                MetricOutcome::Value(FieldSample::Number(pack_elapsed(latest.seconds_since(now))))
            }
            Field::TrendArrow => {
                MetricOutcome::Value(FieldSample::Text(latest.direction.arrow().to_string()))
            }
            Field::Delta { window, unit } => match delta(history, *window, *unit, now) {
                Some(value) => {
                    let value = match unit {
                        Unit::MmolL => force_one_decimal(value),
                        Unit::MgDl => value,
                    };
                    MetricOutcome::Value(FieldSample::Number(value))
                }
                None => MetricOutcome::NoData,
            },
        }
    }

    /// Map an outcome onto the host-facing stream state.
    pub fn render_state(&self, outcome: MetricOutcome) -> StreamState {
        match outcome {
            MetricOutcome::Value(sample) => StreamState::Streaming(sample),
            MetricOutcome::NoData => {
                // Deltas degrade to zero rather than dropping the stream,
                // shaped like any other sample of their unit.
                let placeholder = match self {
                    Field::Delta {
                        unit: Unit::MmolL, ..
                    } => force_one_decimal(0.0),
                    _ => 0.0,
                };
                StreamState::Streaming(FieldSample::Number(placeholder))
            }
            MetricOutcome::Stale | MetricOutcome::Empty => StreamState::NotAvailable,
        }
    }

    /// Text for caption-capable hosts. `None` for numeric-only fields.
    pub fn caption(&self, history: &[GlucoseEntry], now: DateTime<Utc>) -> Option<String> {
        match self {
            Field::TrendArrow => Some(match history.first() {
                Some(latest) if !latest.is_stale(now) => latest.direction.arrow().to_string(),
                _ => "--".to_string(),
            }),
            Field::Combo { layout, unit } => Some(combo_caption(*layout, *unit, history, now)),
            _ => None,
        }
    }
}

fn combo_caption(
    layout: ComboLayout,
    unit: Unit,
    history: &[GlucoseEntry],
    now: DateTime<Utc>,
) -> String {
    let Some(latest) = history.first() else {
        return "--".to_string();
    };
    if latest.is_stale(now) {
        return "--".to_string();
    }
    let elapsed = if layout.uses_clock() {
        format_elapsed(latest.seconds_since(now))
    } else {
        format!("{}s", latest.seconds_since(now).max(0))
    };
    let raw = delta(history, layout.window(), unit, now).unwrap_or(0.0);
    let shown = match unit {
        Unit::MmolL => force_one_decimal(raw),
        Unit::MgDl => raw,
    };
    format!(
        "{} | {} {}",
        elapsed,
        format_delta(shown, unit),
        latest.direction.arrow()
    )
}
