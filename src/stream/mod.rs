mod controller;
mod field;
mod state;
mod worker;

pub use controller::StreamController;
pub use field::{ComboLayout, Field, MetricOutcome};
pub use state::{FieldSample, StreamState};
