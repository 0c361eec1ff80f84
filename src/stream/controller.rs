use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::store::GlucoseStore;
use crate::stream::field::Field;
use crate::stream::state::StreamState;
use crate::stream::worker::field_loop;

struct FieldHandle {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
    states: watch::Receiver<StreamState>,
}

/// Starts and stops field streams against one shared store.
pub struct StreamController {
    store: GlucoseStore,
    active: HashMap<String, FieldHandle>,
}

impl StreamController {
    pub fn new(store: GlucoseStore) -> Self {
        Self {
            store,
            active: HashMap::new(),
        }
    }

    pub fn store(&self) -> &GlucoseStore {
        &self.store
    }

    /// Spawn a stream for `field`. The receiver always holds the last
    /// published state, `Searching` until the first evaluation.
    pub fn start(&mut self, field: Field) -> Result<watch::Receiver<StreamState>> {
        let id = field.id();
        if self.active.contains_key(&id) {
            bail!("field stream {id} already active");
        }

        let cancel_token = CancellationToken::new();
        let (states_tx, states_rx) = watch::channel(StreamState::Searching);
        let handle = tokio::spawn(field_loop(
            field,
            self.store.clone(),
            states_tx,
            cancel_token.clone(),
        ));

        self.active.insert(
            id,
            FieldHandle {
                handle,
                cancel_token,
                states: states_rx.clone(),
            },
        );
        Ok(states_rx)
    }

    /// Last published state of a running stream.
    pub fn state(&self, id: &str) -> Option<StreamState> {
        self.active.get(id).map(|field| field.states.borrow().clone())
    }

    /// Ids of running streams, sorted for stable display.
    pub fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Cancel a stream and wait for its loop to exit. Stopping a stream
    /// that is not running is a no-op.
    pub async fn stop(&mut self, id: &str) -> Result<()> {
        let Some(field) = self.active.remove(id) else {
            return Ok(());
        };
        field.cancel_token.cancel();
        field
            .handle
            .await
            .with_context(|| format!("field stream {id} failed to join"))
    }

    pub async fn stop_all(&mut self) -> Result<()> {
        for id in self.active_ids() {
            self.stop(&id).await?;
        }
        Ok(())
    }
}
