// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Ordered map backend trait for vsdb.
//
// Defines the `OrderedMapBackend` trait that every storage implementation
// must satisfy: a thread-safe, key-sorted byte map with point lookup,
// insert, delete, and an ascending-order cursor. Seeking to the start of
// the map, seeking to the first key at or after a prefix, and stepping
// forward are all expressed as one Rust `Iterator`: `range_from(None)`
// starts at the first key, `range_from(Some(prefix))` starts at the first
// key `>= prefix`, and advancing the returned iterator steps forward.
// Higher-level typed access is provided by [`crate::facade`].

use crate::error::StorageError;

/// An ascending-order entry produced while walking the backend.
pub type Entry = (Vec<u8>, Vec<u8>);

/// A pluggable, ordered, byte-keyed storage backend.
///
/// All keys and values are opaque byte slices, held in key-sorted order.
/// Implementations must be safe to share across threads; the storage
/// engine above this trait serializes all access with a single mutex per
/// handle, so implementations need not be internally lock-free, only
/// internally consistent under that external serialization.
pub trait OrderedMapBackend: Send + Sync {
    /// Retrieve the value associated with `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist, rather than an error.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any previous value for `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Delete the value associated with `key`.
    ///
    /// Returns `Ok(true)` if the key existed and was removed, `Ok(false)`
    /// if the key was not present. Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<bool, StorageError>;

    /// Open an ascending-order cursor over the backend.
    ///
    /// With `start = None`, the cursor begins at the first key in the map.
    /// With `start = Some(p)`, it begins at the first key `>= p`.
    /// Advancing the returned iterator walks forward in key order; the
    /// iterator yields `Err` and stops if the underlying backend
    /// encounters an error mid-walk.
    fn range_from<'a>(
        &'a self,
        start: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = Result<Entry, StorageError>> + 'a>, StorageError>;

    /// Force durability of all buffered writes.
    fn sync(&self) -> Result<(), StorageError>;

    /// A human-readable name for this backend, used in logging.
    fn name(&self) -> &str;
}
