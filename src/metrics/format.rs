use crate::metrics::units::Unit;

/// Render an elapsed duration as a compact clock string.
///
/// Under a minute: `45s`. Under an hour: `2:05`. Otherwise `1:02:05`.
/// Negative inputs clamp to zero.
pub fn format_elapsed(seconds: i64) -> String {
    let total = seconds.max(0);
    if total < 60 {
        return format!("{total}s");
    }
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours == 0 {
        format!("{minutes}:{secs:02}")
    } else {
        format!("{hours}:{minutes:02}:{secs:02}")
    }
}

/// Pack an elapsed duration into a single number for numeric-only displays.
///
/// Under a minute the value is the seconds themselves. Under an hour it is
/// `minutes.seconds` (125s -> 2.05). Beyond that `hours.minutes seconds`
/// packs into successive decimal pairs (3725s -> 1.0205). Negative inputs
/// clamp to zero.
pub fn pack_elapsed(seconds: i64) -> f64 {
    let total = seconds.max(0);
    if total < 60 {
        return total as f64;
    }
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours == 0 {
        (minutes * 100 + secs) as f64 / 100.0
    } else {
        (hours * 10_000 + minutes * 100 + secs) as f64 / 10_000.0
    }
}

/// Render a glucose delta with an explicit sign, one decimal for mmol/L.
pub fn format_delta(delta: f64, unit: Unit) -> String {
    match unit {
        Unit::MgDl => format!("{:+}", delta as i64),
        Unit::MmolL => format!("{delta:+.1}"),
    }
}

/// Nudge whole values off the integer grid so renderers keep showing a
/// decimal place. Only zero hits this in practice.
pub fn force_one_decimal(value: f64) -> f64 {
    if value.fract() == 0.0 {
        value + 0.001
    } else {
        value
    }
}
