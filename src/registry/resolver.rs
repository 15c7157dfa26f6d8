//! Asset id → adapter lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::transport::{CoinClient, NodeError, NodeResult};

/// Shared adapter handle.
pub type SharedClient = Arc<dyn CoinClient>;

/// Concurrency-safe mapping from lowercase asset id to a live adapter.
#[derive(Default)]
pub struct CoinRegistry {
    clients: Mutex<HashMap<String, SharedClient>>,
}

impl CoinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` under `asset_id`, replacing any previous adapter.
    ///
    /// Returns the registry so registrations can be chained.
    pub fn register(&self, asset_id: &str, client: SharedClient) -> &Self {
        let key = asset_id.to_lowercase();
        let replaced = self.lock().insert(key, client).is_some();
        if replaced {
            tracing::debug!(asset_id = %asset_id, "Replaced registered client");
        } else {
            tracing::debug!(asset_id = %asset_id, "Registered client");
        }
        self
    }

    /// Look up the adapter for `asset_id`, ignoring case.
    pub fn get(&self, asset_id: &str) -> NodeResult<SharedClient> {
        self.lock()
            .get(&asset_id.to_lowercase())
            .cloned()
            .ok_or_else(|| NodeError::not_found(asset_id))
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Point-in-time copy of every (lowercase id, adapter) pair, sorted by id.
    ///
    /// The lock is released before this returns, so callers may perform
    /// network calls on the snapshot freely.
    pub fn entries(&self) -> Vec<(String, SharedClient)> {
        let mut entries: Vec<_> = self
            .lock()
            .iter()
            .map(|(id, client)| (id.clone(), Arc::clone(client)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedClient>> {
        // The map is never left half-written, so a poisoned lock is still usable.
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CoinRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.entries().into_iter().map(|(id, _)| id).collect();
        f.debug_struct("CoinRegistry").field("clients", &ids).finish()
    }
}
