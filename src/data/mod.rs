pub mod entry;

pub use entry::{GlucoseEntry, Trend};
