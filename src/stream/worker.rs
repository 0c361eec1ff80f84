use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::log_info;
use crate::store::GlucoseStore;
use crate::stream::field::Field;
use crate::stream::state::StreamState;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

const RENDER_INTERVAL_SECS: u64 = 1;

/// Per-field polling loop.
///
/// Once per render tick the field is evaluated against the shared store
/// and the result published. The store's own refresh gate decides when a
/// tick actually reaches the network, so many field loops share one
/// upstream request. Runs until the token is cancelled.
pub async fn field_loop(
    field: Field,
    store: GlucoseStore,
    states: watch::Sender<StreamState>,
    cancel_token: CancellationToken,
) {
    let tick = Duration::from_secs(RENDER_INTERVAL_SECS);
    // First evaluation one tick after start; the initial Searching state
    // holds until then.
    let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!("Field stream {} started", field.id());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();
                let state = match store.fetch_history(now).await {
                    Ok(history) => field.render_state(field.evaluate(&history, now)),
                    // The store already logged the cause.
                    Err(_) => StreamState::NotAvailable,
                };
                states.send_replace(state);
            }
            _ = cancel_token.cancelled() => {
                log_info!("Field stream {} shutting down", field.id());
                break;
            }
        }
    }
}
