// SPDX-License-Identifier: PMPL-1.0-or-later
//
// In-memory ordered map backend for vsdb.
//
// Uses a `BTreeMap` guarded by a `std::sync::Mutex` for thread-safe,
// ordered key-value storage. The BTreeMap ordering enables efficient
// prefix scanning without touching disk. Intended for tests and ephemeral
// stores; `vsdb-storage`'s `StorageEngine` layers its own mutex on top
// regardless of backend, so this backend's lock only ever sees one
// contending thread in practice.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::backend::{Entry, OrderedMapBackend};
use crate::error::StorageError;

/// An in-memory ordered map backend, backed by a sorted `BTreeMap`.
///
/// All data lives in process memory and is lost when the backend is
/// dropped.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    /// Return true if the store contains no keys.
    pub fn is_empty(&self) -> bool {
        self.data.lock().unwrap().is_empty()
    }
}

impl OrderedMapBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.data.lock().unwrap().remove(key).is_some())
    }

    fn range_from<'a>(
        &'a self,
        start: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = Result<Entry, StorageError>> + 'a>, StorageError> {
        let map = self.data.lock().unwrap();
        let snapshot: Vec<Entry> = match start {
            None => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(start) => map
                .range(start.to_vec()..)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }

    fn sync(&self) -> Result<(), StorageError> {
        // No-op: all writes are immediately visible in memory.
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_crud() {
        let backend = MemoryBackend::new();

        assert!(backend.is_empty());
        assert_eq!(backend.get(b"key1").unwrap(), None);

        backend.put(b"key1", b"value1").unwrap();
        assert_eq!(backend.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(backend.len(), 1);

        backend.put(b"key1", b"updated").unwrap();
        assert_eq!(backend.get(b"key1").unwrap(), Some(b"updated".to_vec()));

        assert!(backend.delete(b"key1").unwrap());
        assert_eq!(backend.get(b"key1").unwrap(), None);
        assert!(backend.is_empty());

        assert!(!backend.delete(b"nonexistent").unwrap());
    }

    #[test]
    fn range_from_full_scan_is_ascending() {
        let backend = MemoryBackend::new();
        backend.put(b"c", b"3").unwrap();
        backend.put(b"a", b"1").unwrap();
        backend.put(b"b", b"2").unwrap();

        let entries: Vec<Entry> = backend
            .range_from(None)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            entries,
            vec![
                (b"a".to_vec(), b"1".to_vec()),
                (b"b".to_vec(), b"2".to_vec()),
                (b"c".to_vec(), b"3".to_vec()),
            ]
        );
    }

    #[test]
    fn range_from_prefix_seek() {
        let backend = MemoryBackend::new();
        backend.put(b"user:1:age", b"30").unwrap();
        backend.put(b"user:1:name", b"Alice").unwrap();
        backend.put(b"user:2:name", b"Bob").unwrap();
        backend.put(b"post:1:title", b"Hello").unwrap();

        let entries: Vec<Entry> = backend
            .range_from(Some(b"user:1:"))
            .unwrap()
            .take_while(|r| r.as_ref().unwrap().0.starts_with(b"user:1:"))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            entries,
            vec![
                (b"user:1:age".to_vec(), b"30".to_vec()),
                (b"user:1:name".to_vec(), b"Alice".to_vec()),
            ]
        );
    }

    #[test]
    fn sync_is_noop() {
        let backend = MemoryBackend::new();
        backend.put(b"k", b"v").unwrap();
        backend.sync().unwrap();
        assert_eq!(backend.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn name_is_memory() {
        assert_eq!(MemoryBackend::new().name(), "memory");
    }
}
