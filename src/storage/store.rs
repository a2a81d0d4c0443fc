//! Durable persistence of the catalog as a single JSON document.
//!
//! The file is the only long-lived owner of track data; callers reload it
//! before every operation and overwrite it in full after every mutation.
//! Two concurrent writers outside one process still race last-writer-wins
//! on the whole document.

use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

use crate::config::CatalogConfig;
use crate::domain::track::Track;
use crate::storage::error::StorageError;
use crate::storage::seed::seed_catalog;

pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            path: config.path.clone(),
        }
    }

    /// Ensures the storage location exists, writing the seed catalog if no
    /// document is present yet. Safe to call on every start.
    pub fn initialize(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StorageError::Write)?;
            }
        }
        if !self.path.exists() {
            info!("no catalog at {}, writing seed catalog", self.path.display());
            self.save(&seed_catalog())?;
        }
        Ok(())
    }

    /// Reads the current collection. A missing or corrupt document falls
    /// back to the seed catalog rather than failing the operation.
    pub fn load(&self) -> Vec<Track> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    debug!("catalog {} missing, serving seed", self.path.display());
                } else {
                    warn!("cannot read catalog {}: {e}, serving seed", self.path.display());
                }
                return seed_catalog();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("catalog {} is corrupt: {e}, serving seed", self.path.display());
                seed_catalog()
            }
        }
    }

    /// Serializes and overwrites the document in full. Write failures
    /// propagate to the caller as operation failures.
    pub fn save(&self, tracks: &[Track]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(tracks)?;
        fs::write(&self.path, json).map_err(StorageError::Write)
    }
}
