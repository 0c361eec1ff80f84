//! Glucose field engine for bike-computer extension hosts.
//!
//! Polls a Nightscout-compatible endpoint, derives presentation-ready
//! metrics (unit conversion, trend deltas, staleness, elapsed time) and
//! exposes them as independently startable field streams. A host registers
//! the fields from [`Field::catalog`], starts them through a
//! [`StreamController`] and renders whatever [`StreamState`] each stream
//! last published. See `src/main.rs` for a console host doing exactly that.

pub mod data;
pub mod metrics;
pub mod settings;
pub mod store;
pub mod stream;
mod utils;

pub use data::{GlucoseEntry, Trend};
pub use settings::{NightscoutSettings, SettingsStore, DEFAULT_NIGHTSCOUT_URL};
pub use store::{FetchError, GlucoseStore};
pub use stream::{Field, FieldSample, StreamController, StreamState};
