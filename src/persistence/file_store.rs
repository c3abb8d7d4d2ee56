//! Directory-backed key-value store
//!
//! Every key lives in its own file under the store directory. A write goes
//! through a hidden sibling temporary file and a rename, so a crash never
//! leaves a half-written value, and writing one key never rewrites another.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use bevy::log::{info, warn};

use super::store::{check_quota, KeyValueStore};
use crate::error::StoreError;

/// Key-value store persisted as one file per key
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    entries: BTreeMap<String, String>,
    quota: usize,
}

impl FileStore {
    /// Open (or lazily create) the store rooted at `dir`.
    ///
    /// Entries that are not valid UTF-8 are logged and skipped; they are
    /// replaced on the next write of that key.
    pub fn open(dir: impl Into<PathBuf>, quota: usize) -> Result<Self, StoreError> {
        let dir = dir.into();
        let mut entries = BTreeMap::new();

        let listing = match fs::read_dir(&dir) {
            Ok(listing) => Some(listing),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        for entry in listing.into_iter().flatten() {
            let entry = entry?;
            let Some(key) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            // Leftover temporaries from an interrupted write
            if key.starts_with('.') || !entry.file_type()?.is_file() {
                continue;
            }
            match fs::read_to_string(entry.path()) {
                Ok(value) => {
                    entries.insert(key, value);
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!("[Store] Ignoring corrupt entry {}: {}", key, e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("[Store] Opened {} ({} keys)", dir.display(), entries.len());
        Ok(Self {
            dir,
            entries,
            quota,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`
    pub fn entry_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\'])
            && !key.contains('\0');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        check_quota(&self.entries, key, value, self.quota)?;

        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.entries.remove(key);
        Ok(())
    }
}
