//! Persisted sphere snapshot
//!
//! Two independent keys share an application prefix:
//! - `<prefix>_image`: the last capture as a data URL
//! - `<prefix>_state`: `{"rotation": {"x", "y", "z"}}`
//!
//! Writes never fail the caller: errors are logged and the in-memory scene
//! keeps its state. Corrupt entries are deleted on load.

pub mod file_store;
pub mod store;

use std::path::Path;

use bevy::log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::capture::EncodedImage;
use crate::error::StoreError;
use crate::rotation::RotationState;

pub use file_store::FileStore;
pub use store::{KeyValueStore, MemoryStore};

/// Open the on-disk store at `dir`.
///
/// Falls back to a session-only [`MemoryStore`] when the directory cannot be
/// read, so the scene still runs without persistence.
pub fn open_store(dir: &Path, quota: usize) -> Box<dyn KeyValueStore> {
    match FileStore::open(dir, quota) {
        Ok(store) => Box::new(store),
        Err(e) => {
            error!(
                "[Store] Cannot open {}: {}; changes will not persist",
                dir.display(),
                e
            );
            Box::new(MemoryStore::with_quota(quota))
        }
    }
}

/// Document stored under the state key
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationState>,
}

/// What a startup load found
#[derive(Debug, Default, PartialEq)]
pub struct RestoredSnapshot {
    pub rotation: Option<RotationState>,
    /// Still encoded; decoding happens off the render thread.
    pub image: Option<EncodedImage>,
}

/// Snapshot reads and writes against a [`KeyValueStore`]
pub struct SpherePersistence {
    store: Box<dyn KeyValueStore>,
    image_key: String,
    state_key: String,
}

impl SpherePersistence {
    pub fn new(store: impl KeyValueStore + 'static, prefix: &str) -> Self {
        Self {
            store: Box::new(store),
            image_key: format!("{prefix}_image"),
            state_key: format!("{prefix}_state"),
        }
    }

    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    /// Write the current rotation. The image key is left alone.
    pub fn persist_rotation(&mut self, rotation: &RotationState) {
        let state = PersistedState {
            rotation: Some(*rotation),
        };
        let result = serde_json::to_string(&state)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(&self.state_key, &json));
        if let Err(e) = result {
            warn!("[Store] Failed to save rotation: {}", e);
        }
    }

    /// Write a new capture, replacing the previous one. The state key is
    /// left alone.
    pub fn persist_capture(&mut self, image: &EncodedImage) {
        if let Err(e) = self.store.set(&self.image_key, image.as_str()) {
            warn!("[Store] Failed to save captured image: {}", e);
        }
    }

    /// Read both keys once.
    ///
    /// A state document that fails to parse, or a store that fails to read,
    /// clears both keys and restores nothing.
    pub fn load(&mut self) -> RestoredSnapshot {
        match self.read_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("[Store] Discarding persisted snapshot: {}", e);
                remove_quietly(self.store.as_mut(), &self.image_key);
                remove_quietly(self.store.as_mut(), &self.state_key);
                RestoredSnapshot::default()
            }
        }
    }

    /// Delete the stored image after it failed to decode.
    pub fn discard_image(&mut self) {
        remove_quietly(self.store.as_mut(), &self.image_key);
    }

    fn read_snapshot(&self) -> Result<RestoredSnapshot, StoreError> {
        let image = self
            .store
            .get(&self.image_key)?
            .filter(|value| !value.is_empty())
            .map(EncodedImage::from_data_url);

        let rotation = match self.store.get(&self.state_key)? {
            Some(json) => serde_json::from_str::<PersistedState>(&json)?.rotation,
            None => None,
        };

        debug!(
            "[Store] Loaded snapshot (image: {}, rotation: {:?})",
            image.is_some(),
            rotation
        );
        Ok(RestoredSnapshot { rotation, image })
    }
}

fn remove_quietly(store: &mut dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!("[Store] Failed to remove {}: {}", key, e);
    }
}
