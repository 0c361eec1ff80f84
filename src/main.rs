//! Console host: starts every catalog field and renders the streams to
//! stdout once per second, the way a head unit would poll them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::{Duration, MissedTickBehavior};

use glucofield::{log_error, log_info, Field, GlucoseStore, SettingsStore, StreamController};

const ENABLE_LOGS: bool = true;

const SETTINGS_ENV_VAR: &str = "GLUCOFIELD_SETTINGS";
const RENDER_INTERVAL_SECS: u64 = 1;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let settings_path = std::env::var(SETTINGS_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("glucofield.json"));
    let settings = SettingsStore::new(settings_path)?.nightscout();
    log_info!(
        "Settings loaded: {} (token {})",
        settings.url,
        if settings.api_token.is_empty() {
            "none"
        } else {
            "set"
        }
    );

    let store = GlucoseStore::new();
    store
        .configure(&settings.url, &settings.api_token)
        .await
        .context("Failed to configure glucose store")?;

    let fields = Field::catalog();
    let mut controller = StreamController::new(store.clone());
    for field in &fields {
        controller.start(*field)?;
    }
    log_info!("Started {} field streams", fields.len());

    let mut ticker = tokio::time::interval(Duration::from_secs(RENDER_INTERVAL_SECS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                render(&controller, &fields).await;
            }
            _ = &mut shutdown => {
                log_info!("Ctrl-C received, stopping field streams");
                break;
            }
        }
    }

    if let Err(err) = controller.stop_all().await {
        log_error!("Field streams did not stop cleanly: {err:?}");
    }
    Ok(())
}

/// Print one line per field: the stream state plus, for caption-capable
/// fields, the text a graphical host would draw.
async fn render(controller: &StreamController, fields: &[Field]) {
    let now = Utc::now();
    // Shares the store's refresh gate with the workers; between refreshes
    // this is a cache read.
    let history = controller
        .store()
        .fetch_history(now)
        .await
        .unwrap_or_default();

    for field in fields {
        let id = field.id();
        let Some(state) = controller.state(&id) else {
            continue;
        };
        match field.caption(&history, now) {
            Some(caption) => println!("{id:<22} {:<10} \"{caption}\"", state.to_string()),
            None => println!("{id:<22} {state}"),
        }
    }
    println!();
}
