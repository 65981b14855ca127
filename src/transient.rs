//! Transient references: short-lived local URLs for in-memory content.
//!
//! An [`ObjectUrlStore`] plays the part of the browser's blob URL table. Each
//! [`ObjectUrlStore::create`] call registers content under a fresh
//! `blob:mediaconv/<n>` URL and returns a [`TransientUrl`] guard. The guard
//! is the only owner of the entry: dropping it revokes the URL, so release
//! happens on every exit path (replaced selection, cleared selection,
//! finished download, early return or panic).
//!
//! Stores are cheap handles; clones share one table.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const URL_PREFIX: &str = "blob:mediaconv/";

/// Content registered under a transient URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub media_type: String,
    pub content: Bytes,
}

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    objects: Mutex<HashMap<String, StoredObject>>,
}

/// Shared table of live transient URLs.
#[derive(Clone, Default)]
pub struct ObjectUrlStore {
    inner: Arc<Inner>,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `content` and return the guard that owns its URL.
    pub fn create(&self, content: Bytes, media_type: impl Into<String>) -> TransientUrl {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("{URL_PREFIX}{id}");
        self.objects().insert(
            url.clone(),
            StoredObject {
                media_type: media_type.into(),
                content,
            },
        );
        debug!("Created transient URL {}", url);
        TransientUrl {
            url,
            store: self.clone(),
        }
    }

    /// Look up the content behind a live URL.
    pub fn resolve(&self, url: &str) -> Option<StoredObject> {
        self.objects().get(url).cloned()
    }

    /// Number of URLs that have been created and not yet revoked.
    pub fn active_count(&self) -> usize {
        self.objects().len()
    }

    fn revoke(&self, url: &str) {
        if self.objects().remove(url).is_some() {
            debug!("Revoked transient URL {}", url);
        }
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        // The map stays consistent even if a holder panicked mid-insert.
        self.inner
            .objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for ObjectUrlStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlStore")
            .field("active", &self.active_count())
            .finish()
    }
}

/// Owning guard for one transient URL. Revokes the URL on drop.
pub struct TransientUrl {
    url: String,
    store: ObjectUrlStore,
}

impl TransientUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Release the URL now. Same as dropping the guard.
    pub fn revoke(self) {
        drop(self);
    }
}

impl Drop for TransientUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}

impl fmt::Debug for TransientUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransientUrl").field(&self.url).finish()
    }
}

impl fmt::Display for TransientUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
