//! Dismiss flag persisted as a single JSON file.

use crate::alert::ports::{DismissFlagError, DismissFlagResult, DismissFlagStore, DismissRecord};
use crate::config::DismissConfig;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;

/// Dismiss flag stored in one file, surviving process restarts.
///
/// All access goes through a capability handle on the storage directory,
/// so the store can only touch its own file.
#[derive(Debug)]
pub struct FileDismissFlagStore {
    dir: Dir,
    file_name: String,
}

impl FileDismissFlagStore {
    /// Opens (creating if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`DismissFlagError::Storage`] when the directory cannot be
    /// created or opened.
    pub fn open(storage_dir: &Utf8Path, file_name: impl Into<String>) -> DismissFlagResult<Self> {
        Dir::create_ambient_dir_all(storage_dir, ambient_authority())
            .map_err(DismissFlagError::storage)?;
        let dir = Dir::open_ambient_dir(storage_dir, ambient_authority())
            .map_err(DismissFlagError::storage)?;
        Ok(Self {
            dir,
            file_name: file_name.into(),
        })
    }

    /// Opens the store described by the dismiss configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::open`].
    pub fn from_config(config: &DismissConfig) -> DismissFlagResult<Self> {
        Self::open(&config.storage_dir, config.file_name.clone())
    }
}

impl DismissFlagStore for FileDismissFlagStore {
    fn load(&self) -> DismissFlagResult<Option<DismissRecord>> {
        let contents = match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(DismissFlagError::storage(err)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| DismissFlagError::Corrupt(err.to_string()))
    }

    fn save(&self, record: DismissRecord) -> DismissFlagResult<()> {
        let contents = serde_json::to_string(&record)
            .map_err(|err| DismissFlagError::Corrupt(err.to_string()))?;
        self.dir
            .write(&self.file_name, contents)
            .map_err(DismissFlagError::storage)
    }

    fn clear(&self) -> DismissFlagResult<()> {
        match self.dir.remove_file(&self.file_name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(DismissFlagError::storage(err)),
        }
    }
}
