pub mod delta;
pub mod format;
pub mod units;

pub use delta::{delta, delta_mgdl, DeltaWindow};
pub use units::{mgdl_to_mmol, Unit, MGDL_PER_MMOL};
