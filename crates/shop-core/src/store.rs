//! In-memory token store.
//!
//! Holds every issued grant keyed by token string. Lookups never check
//! expiry; that is the gate's job. Expired grants stay in the map until
//! [`TokenStore::purge_expired`] removes them.

use crate::grant::Grant;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared token → grant mapping.
///
/// Cloning is cheap and every clone sees the same map.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<HashMap<String, Grant>>>,
}

impl TokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a grant. Last write wins on a duplicate token.
    pub fn put(&self, token: impl Into<String>, grant: Grant) {
        self.inner.write().insert(token.into(), grant);
    }

    /// Look up a grant, expired or not
    pub fn get(&self, token: &str) -> Option<Grant> {
        self.inner.read().get(token).cloned()
    }

    /// Number of grants held, including expired ones
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drop every grant that is no longer valid at `now`.
    ///
    /// Returns the number of grants removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut map = self.inner.write();
        let before = map.len();
        map.retain(|_, grant| grant.is_valid_at(now));
        before - map.len()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print tokens.
        f.debug_struct("TokenStore").field("len", &self.len()).finish()
    }
}
