use serde::{Deserialize, Serialize};

/// Conversion factor between mg/dL and mmol/L for glucose.
pub const MGDL_PER_MMOL: f64 = 18.0182;

/// Convert a glucose value in mg/dL to mmol/L, rounded to one decimal place.
pub fn mgdl_to_mmol(mgdl: f64) -> f64 {
    (mgdl / MGDL_PER_MMOL * 10.0).round() / 10.0
}

/// Display unit for glucose values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    MgDl,
    MmolL,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::MgDl => "mg/dL",
            Unit::MmolL => "mmol/L",
        }
    }

    /// Short suffix used in field identifiers.
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::MgDl => "mg",
            Unit::MmolL => "mmol",
        }
    }

    /// Convert a raw mg/dL value into this unit.
    pub fn convert(&self, mgdl: f64) -> f64 {
        match self {
            Unit::MgDl => mgdl,
            Unit::MmolL => mgdl_to_mmol(mgdl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_values() {
        assert_eq!(mgdl_to_mmol(180.0), 10.0);
        assert_eq!(mgdl_to_mmol(100.0), 5.5);
        assert_eq!(mgdl_to_mmol(40.0), 2.2);
    }

    #[test]
    fn rounds_to_one_decimal() {
        // 72 / 18.0182 = 3.9959..., rounds up to 4.0
        assert_eq!(mgdl_to_mmol(72.0), 4.0);
        // 126 / 18.0182 = 6.9929..., rounds up to 7.0
        assert_eq!(mgdl_to_mmol(126.0), 7.0);
    }

    #[test]
    fn zero_stays_zero() {
        assert_eq!(mgdl_to_mmol(0.0), 0.0);
    }

    #[test]
    fn unit_convert_matches_helpers() {
        assert_eq!(Unit::MgDl.convert(154.0), 154.0);
        assert_eq!(Unit::MmolL.convert(154.0), mgdl_to_mmol(154.0));
    }

    #[test]
    fn unit_labels() {
        assert_eq!(Unit::MgDl.label(), "mg/dL");
        assert_eq!(Unit::MmolL.label(), "mmol/L");
        assert_eq!(Unit::MgDl.suffix(), "mg");
        assert_eq!(Unit::MmolL.suffix(), "mmol");
    }
}
