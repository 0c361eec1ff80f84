//! Cached access to a Nightscout entries endpoint.
//!
//! A `GlucoseStore` owns the HTTP binding and the most recent batch of
//! entries. Fetches are gated so that many concurrent field streams share
//! one upstream request per refresh interval.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Url;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::data::GlucoseEntry;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Path of the entries endpoint, relative to the server origin.
const ENTRIES_PATH: &str = "api/v1/entries/sgv.json";

/// Minimum seconds between upstream fetch attempts.
pub const REFRESH_INTERVAL_SECS: i64 = 15;

const FETCH_TIMEOUT_SECS: u64 = 10;

/// Why a fetch produced no reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("nightscout source not configured")]
    NotConfigured,
    #[error("nightscout returned no entries")]
    EmptyResult,
    #[error("nightscout request failed: {0}")]
    SourceUnavailable(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::SourceUnavailable(err.to_string())
    }
}

#[derive(Clone)]
struct Binding {
    origin: String,
    token: String,
    client: reqwest::Client,
}

struct StoreState {
    binding: Option<Binding>,
    /// Cached entries, newest first.
    history: Vec<GlucoseEntry>,
    fetched_at: Option<DateTime<Utc>>,
    last_attempt_at: Option<DateTime<Utc>>,
    last_error: Option<FetchError>,
}

impl StoreState {
    fn refresh_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_attempt_at {
            Some(at) => now - at >= chrono::Duration::seconds(REFRESH_INTERVAL_SECS),
            None => true,
        }
    }
}

pub struct GlucoseStore {
    inner: Arc<Mutex<StoreState>>,
}

impl GlucoseStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreState {
                binding: None,
                history: Vec::new(),
                fetched_at: None,
                last_attempt_at: None,
                last_error: None,
            })),
        }
    }

    /// Bind the store to a Nightscout server.
    ///
    /// Any URL into the server works; only its origin is kept. Rebinding to
    /// the same origin just swaps the token and keeps the cache, a new
    /// origin drops cached entries from the old source.
    pub async fn configure(&self, url: &str, token: &str) -> Result<()> {
        let origin = derive_origin(url)?;
        let mut state = self.inner.lock().await;
        match state.binding.as_mut() {
            Some(binding) if binding.origin == origin => {
                binding.token = token.to_string();
                log_info!("Glucose store token refreshed for {}", origin);
            }
            _ => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                    .build()
                    .context("Failed to build HTTP client")?;
                log_info!("Glucose store bound to {}", origin);
                state.binding = Some(Binding {
                    origin,
                    token: token.to_string(),
                    client,
                });
                state.history.clear();
                state.fetched_at = None;
                state.last_attempt_at = None;
                state.last_error = None;
            }
        }
        Ok(())
    }

    pub async fn is_configured(&self) -> bool {
        self.inner.lock().await.binding.is_some()
    }

    /// Latest reading, refreshing from the server when the gate allows.
    pub async fn fetch_latest(&self, now: DateTime<Utc>) -> Result<GlucoseEntry, FetchError> {
        self.refresh_if_due(now).await?;
        let state = self.inner.lock().await;
        state.history.first().cloned().ok_or(FetchError::EmptyResult)
    }

    /// Recent readings newest first, refreshing when the gate allows.
    pub async fn fetch_history(&self, now: DateTime<Utc>) -> Result<Vec<GlucoseEntry>, FetchError> {
        self.refresh_if_due(now).await?;
        let state = self.inner.lock().await;
        if state.history.is_empty() {
            return Err(FetchError::EmptyResult);
        }
        Ok(state.history.clone())
    }

    pub async fn cached(&self) -> Option<GlucoseEntry> {
        self.inner.lock().await.history.first().cloned()
    }

    pub async fn cached_history(&self) -> Vec<GlucoseEntry> {
        self.inner.lock().await.history.clone()
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.fetched_at
    }

    /// Whether the next fetch call would go upstream.
    pub async fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        self.inner.lock().await.refresh_due(now)
    }

    async fn refresh_if_due(&self, now: DateTime<Utc>) -> Result<(), FetchError> {
        let mut state = self.inner.lock().await;
        let binding = match state.binding.as_ref() {
            Some(binding) => binding.clone(),
            None => return Err(FetchError::NotConfigured),
        };
        if !state.refresh_due(now) {
            // Between refreshes a failed source stays failed; a healthy one
            // serves the cache.
            return match state.last_error.clone() {
                Some(err) => Err(err),
                None => Ok(()),
            };
        }
        state.last_attempt_at = Some(now);
        drop(state);

        let result = pull(&binding).await;

        let mut state = self.inner.lock().await;
        match result {
            Ok(entries) => {
                log_info!(
                    "Fetched {} entries from {} (latest sgv {})",
                    entries.len(),
                    binding.origin,
                    entries[0].sgv
                );
                state.history = entries;
                state.fetched_at = Some(now);
                state.last_error = None;
                Ok(())
            }
            Err(err) => {
                log_warn!("Fetch from {} failed: {}", binding.origin, err);
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, history: Vec<GlucoseEntry>, fetched_at: DateTime<Utc>) {
        let mut state = self.inner.lock().await;
        if state.binding.is_none() {
            state.binding = Some(Binding {
                origin: "http://127.0.0.1:1".to_string(),
                token: String::new(),
                client: reqwest::Client::new(),
            });
        }
        state.history = history;
        state.fetched_at = Some(fetched_at);
        state.last_attempt_at = Some(fetched_at);
        state.last_error = None;
    }

    #[cfg(test)]
    pub(crate) async fn binding_info(&self) -> Option<(String, String)> {
        let state = self.inner.lock().await;
        state
            .binding
            .as_ref()
            .map(|binding| (binding.origin.clone(), binding.token.clone()))
    }
}

impl Default for GlucoseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for GlucoseStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

async fn pull(binding: &Binding) -> Result<Vec<GlucoseEntry>, FetchError> {
    let url = format!("{}/{}", binding.origin, ENTRIES_PATH);
    let mut request = binding.client.get(&url);
    if !binding.token.is_empty() {
        request = request
            .header("api-secret", &binding.token)
            .header("Authorization", format!("Bearer {}", binding.token));
    }
    let response = request.send().await?.error_for_status()?;
    let mut entries: Vec<GlucoseEntry> = response.json().await?;
    if entries.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    // Keep newest first regardless of server order.
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}

/// Reduce a URL to its `scheme://host[:port]` origin.
pub(crate) fn derive_origin(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid Nightscout URL: {url}"))?;
    let host = parsed
        .host_str()
        .with_context(|| format!("Nightscout URL has no host: {url}"))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Trend;

    fn entry(sgv: i32, offset_secs: i64, now: DateTime<Utc>) -> GlucoseEntry {
        GlucoseEntry {
            sgv,
            date: now - chrono::Duration::seconds(offset_secs),
            direction: Trend::Flat,
            device: None,
            units: None,
        }
    }

    #[test]
    fn origin_keeps_explicit_port() {
        assert_eq!(
            derive_origin("http://127.0.0.1:17580/sgv.json").unwrap(),
            "http://127.0.0.1:17580"
        );
    }

    #[test]
    fn origin_drops_path_and_default_port() {
        assert_eq!(
            derive_origin("https://cgm.example.com/api/v1/entries/sgv.json").unwrap(),
            "https://cgm.example.com"
        );
        // The scheme default port normalizes away.
        assert_eq!(
            derive_origin("https://cgm.example.com:443/sgv.json").unwrap(),
            "https://cgm.example.com"
        );
    }

    #[test]
    fn origin_rejects_garbage() {
        assert!(derive_origin("127.0.0.1:17580/sgv.json").is_err());
        assert!(derive_origin("data:text/plain,hello").is_err());
        assert!(derive_origin("").is_err());
    }

    #[tokio::test]
    async fn unconfigured_store_reports_it() {
        let store = GlucoseStore::new();
        let now = Utc::now();
        assert_eq!(
            store.fetch_latest(now).await.unwrap_err(),
            FetchError::NotConfigured
        );
        assert_eq!(
            store.fetch_history(now).await.unwrap_err(),
            FetchError::NotConfigured
        );
        assert!(!store.is_configured().await);
    }

    #[tokio::test]
    async fn refresh_gate_opens_after_interval() {
        let store = GlucoseStore::new();
        let now = Utc::now();
        assert!(store.should_refresh(now).await);

        store.seed(vec![entry(120, 0, now)], now).await;
        assert!(!store.should_refresh(now).await);
        assert!(
            !store
                .should_refresh(now + chrono::Duration::seconds(14))
                .await
        );
        assert!(
            store
                .should_refresh(now + chrono::Duration::seconds(15))
                .await
        );
    }

    #[tokio::test]
    async fn cache_serves_between_refreshes() {
        let store = GlucoseStore::new();
        let now = Utc::now();
        store
            .seed(vec![entry(142, 0, now), entry(138, 300, now)], now)
            .await;

        let latest = store
            .fetch_latest(now + chrono::Duration::seconds(5))
            .await
            .unwrap();
        assert_eq!(latest.sgv, 142);

        let history = store
            .fetch_history(now + chrono::Duration::seconds(5))
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sgv, 142);
        assert_eq!(store.fetched_at().await, Some(now));
    }

    #[tokio::test]
    async fn reconfigure_same_origin_keeps_cache_and_swaps_token() {
        let store = GlucoseStore::new();
        let now = Utc::now();
        store
            .configure("http://127.0.0.1:17580/sgv.json", "first")
            .await
            .unwrap();
        store.seed(vec![entry(100, 0, now)], now).await;

        store
            .configure("http://127.0.0.1:17580/other.json", "second")
            .await
            .unwrap();
        let (origin, token) = store.binding_info().await.unwrap();
        assert_eq!(origin, "http://127.0.0.1:17580");
        assert_eq!(token, "second");
        assert_eq!(store.cached().await.unwrap().sgv, 100);
    }

    #[tokio::test]
    async fn reconfigure_new_origin_drops_cache() {
        let store = GlucoseStore::new();
        let now = Utc::now();
        store
            .configure("http://127.0.0.1:17580/sgv.json", "tok")
            .await
            .unwrap();
        store.seed(vec![entry(100, 0, now)], now).await;

        store
            .configure("https://cgm.example.com", "tok")
            .await
            .unwrap();
        assert!(store.cached().await.is_none());
        assert!(store.should_refresh(now).await);
    }

    #[tokio::test]
    async fn configure_rejects_bad_url() {
        let store = GlucoseStore::new();
        assert!(store.configure("not a url", "").await.is_err());
        assert!(!store.is_configured().await);
    }
}
