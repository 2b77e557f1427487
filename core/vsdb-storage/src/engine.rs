// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Storage engine for vsdb — the mutex-guarded lifecycle and operation
// layer above an `OrderedMapBackend`: open/close/sync/get/set/glob, with
// a single `std::sync::Mutex` serializing every operation against the
// backend.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, instrument};

use crate::backend::{Entry, OrderedMapBackend};
use crate::error::StorageError;
#[cfg(feature = "redb-backend")]
use crate::redb_backend::RedbBackend;

/// An open store handle.
///
/// Owns the backend and a mutex serializing every operation against it.
/// Not `Clone` — callers share a single handle across threads and rely on
/// the internal lock.
pub struct StorageEngine {
    backend: Mutex<Box<dyn OrderedMapBackend>>,
    path: PathBuf,
}

impl StorageEngine {
    /// Open (or create) a persistent store at `path` using the redb
    /// backend.
    ///
    /// An empty path is an invalid argument.
    #[cfg(feature = "redb-backend")]
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StorageError::InvalidArgument("empty path".into()));
        }
        let backend = RedbBackend::open(path)?;
        debug!("storage engine opened");
        Ok(Self {
            backend: Mutex::new(Box::new(backend)),
            path: path.to_path_buf(),
        })
    }

    /// Wrap an already-constructed backend (e.g. [`crate::memory::MemoryBackend`]
    /// for tests) in a storage engine, under a synthetic path label.
    pub fn with_backend(path: impl Into<PathBuf>, backend: Box<dyn OrderedMapBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
            path: path.into(),
        }
    }

    /// The filesystem path (or synthetic label) this engine was opened
    /// with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the engine. Dropping a `StorageEngine` has the same effect;
    /// this method exists to make intent visible at call sites.
    pub fn close(self) {
        debug!(path = %self.path.display(), "storage engine closed");
    }

    /// Force durability of all buffered writes.
    pub fn sync(&self) -> Result<(), StorageError> {
        self.backend.lock().unwrap().sync()
    }

    /// Retrieve the payload stored under `key`.
    ///
    /// Empty keys are an invalid argument. A missing key is
    /// [`StorageError::NotFound`], not a silent empty result — callers
    /// that want "absent or empty" collapsed together should match on
    /// that variant explicitly.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidArgument("empty key".into()));
        }
        let guard = self.backend.lock().unwrap();
        match guard.get(key)? {
            Some(value) => Ok(value),
            None => Err(StorageError::NotFound(String::from_utf8_lossy(key).into_owned())),
        }
    }

    /// Insert, overwrite, or delete the entry for `key`.
    ///
    /// `value = None` deletes; deleting an absent key still returns
    /// `Ok(())` (the write intent of "absent" is already satisfied).
    /// Empty keys are an invalid argument.
    pub fn set(&self, key: &[u8], value: Option<&[u8]>) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidArgument("empty key".into()));
        }
        let guard = self.backend.lock().unwrap();
        match value {
            Some(value) => guard.put(key, value),
            None => guard.delete(key).map(|_| ()),
        }
    }

    /// Enumerate entries matching `pattern`.
    ///
    /// `pattern` must be exactly `"*"` (full enumeration) or a non-empty
    /// byte string ending in `*` (prefix enumeration); anything else is
    /// an invalid argument. The lock is held for the entire cursor walk,
    /// so the result is a consistent snapshot with respect to concurrent
    /// writers on the same handle.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn glob(&self, pattern: &[u8]) -> Result<Vec<Entry>, StorageError> {
        if pattern.is_empty() {
            return Err(StorageError::InvalidArgument("empty glob pattern".into()));
        }

        let guard = self.backend.lock().unwrap();

        if pattern == b"*" {
            let cursor = guard.range_from(None)?;
            let mut out = Vec::with_capacity(16);
            for item in cursor {
                out.push(item.map_err(|e| StorageError::PartialEnumeration(e.to_string()))?);
            }
            return Ok(out);
        }

        if pattern.last() == Some(&b'*') {
            let prefix = &pattern[..pattern.len() - 1];
            let cursor = guard.range_from(Some(prefix))?;
            let mut out = Vec::with_capacity(16);
            for item in cursor {
                let entry = item.map_err(|e| StorageError::PartialEnumeration(e.to_string()))?;
                if !entry.0.starts_with(prefix) {
                    break;
                }
                out.push(entry);
            }
            return Ok(out);
        }

        Err(StorageError::InvalidArgument(format!(
            "malformed glob pattern: {}",
            String::from_utf8_lossy(pattern)
        )))
    }
}
