//! Revocable playable resources
//!
//! A [`ResourceRegistry`] is a process-local table of playable resources
//! keyed by an opaque URL (`blob:encore/<uuid>`). Registering a resource
//! returns a [`ResourceHandle`]; releasing the handle revokes the URL.
//! Handles are not cloneable and are never released implicitly.

use encore_core::ByteSource;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const URL_SCHEME: &str = "blob:encore/";

/// Something a playback sink can play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableResource {
    /// Track name
    pub name: String,

    /// Content type
    pub mime_type: String,

    /// Where the bytes live
    pub source: ByteSource,
}

/// Process-local table of live resources
///
/// Cloning shares the same table.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: Arc<Mutex<HashMap<String, Arc<PlayableResource>>>>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and issue a handle for it
    pub fn register(&self, resource: PlayableResource) -> ResourceHandle {
        let url = format!("{URL_SCHEME}{}", Uuid::new_v4());
        tracing::debug!("Registered {} for {}", url, resource.name);
        self.lock().insert(url.clone(), Arc::new(resource));

        ResourceHandle {
            url,
            registry: self.clone(),
        }
    }

    /// Look up a live resource by URL
    pub fn resolve(&self, url: &str) -> Option<Arc<PlayableResource>> {
        self.lock().get(url).cloned()
    }

    /// Number of resources not yet released
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    // A panic while holding the lock cannot leave the map half-updated
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<PlayableResource>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive, revocable reference to a registered resource
#[derive(Debug)]
pub struct ResourceHandle {
    url: String,
    registry: ResourceRegistry,
}

impl ResourceHandle {
    /// URL that resolves to the resource while the handle is live
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the URL still resolves
    pub fn is_live(&self) -> bool {
        self.registry.resolve(&self.url).is_some()
    }

    /// Revoke the URL
    pub fn release(self) {
        if self.registry.revoke(&self.url) {
            tracing::debug!("Released {}", self.url);
        }
    }
}
