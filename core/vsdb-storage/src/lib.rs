// SPDX-License-Identifier: PMPL-1.0-or-later
//
// vsdb-storage — embedded, single-process, typed key-value store.
//
// Keys are byte strings (conventionally UTF-8); values are structured,
// dynamically-typed trees built from a fixed set of primitive and
// container variants. The store persists to a single on-disk file
// organised as an ordered (B-tree-like) map so that prefix enumeration is
// efficient.
//
// # Layers
//
// - [`backend`] -- the `OrderedMapBackend` trait every storage
//   implementation satisfies.
// - [`memory`] -- an in-memory `BTreeMap`-based backend for tests and
//   ephemeral stores.
// - [`redb_backend`] -- the persistent, redb-backed backend (feature
//   `redb-backend`, on by default).
// - [`metrics`] -- a transparent wrapper that collects operation
//   statistics.
// - [`engine`] -- the mutex-guarded `StorageEngine`: `open`/`close`/
//   `sync`/`get`/`set`/`glob`.
// - [`codec`] -- the recursive [`codec::Value`] tree and its binary
//   encode/decode.
// - [`facade`] -- `copy_value`/`set_value`, the typed facade that routes
//   a structured key to a decoded value tree (or, for a wildcard key, an
//   aggregated dictionary of decoded entries).
//
// # Example
//
// ```rust
// use vsdb_storage::engine::StorageEngine;
// use vsdb_storage::memory::MemoryBackend;
// use vsdb_storage::facade::{copy_value, set_value};
// use vsdb_storage::codec::Value;
//
// let engine = StorageEngine::with_backend("demo", Box::new(MemoryBackend::new()));
//
// set_value(&engine, "user/1/name", Some(&Value::String("Alice".into()))).unwrap();
// let name = copy_value(&engine, "user/1/name").unwrap();
// assert_eq!(name, Some(Value::String("Alice".into())));
// ```

pub mod backend;
pub mod codec;
pub mod engine;
pub mod error;
pub mod facade;
pub mod memory;
pub mod metrics;

#[cfg(feature = "redb-backend")]
pub mod redb_backend;

pub use backend::OrderedMapBackend;
pub use codec::Value;
pub use engine::StorageEngine;
pub use error::StorageError;
pub use memory::MemoryBackend;
pub use metrics::{BackendStats, MetricsBackend};

#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;
