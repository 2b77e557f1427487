// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Typed facade for vsdb — routes a structured (string) key to a decoded
// value tree, aggregating wildcard keys into a dictionary of results.

use std::collections::HashMap;

use crate::codec::{self, Value};
use crate::engine::StorageEngine;
use crate::error::StorageError;

/// Read the value(s) addressed by `key`.
///
/// If `key` contains `*`, this is a glob read: `key` is passed to
/// [`StorageEngine::glob`] and the decoded results are aggregated into a
/// [`Value::Dictionary`] keyed by each entry's decoded key string. A
/// backend failure during the glob walk is reported as `Ok(None)` rather
/// than propagated as an error, since this facade's job is to hide
/// storage-engine failure detail from callers that only want a value
/// tree or nothing.
///
/// Otherwise this is a single read: `key` is UTF-8 encoded, looked up,
/// and decoded. A missing key returns `Ok(None)`.
pub fn copy_value(engine: &StorageEngine, key: &str) -> Result<Option<Value>, StorageError> {
    if key.contains('*') {
        return Ok(copy_glob_value(engine, key));
    }

    match engine.get(key.as_bytes()) {
        Ok(bytes) => Ok(Some(Value::decode(&bytes))),
        Err(_) => Ok(None),
    }
}

fn copy_glob_value(engine: &StorageEngine, pattern: &str) -> Option<Value> {
    let entries = engine.glob(pattern.as_bytes()).ok()?;

    let mut map = HashMap::with_capacity(entries.len());
    for (key, payload) in entries {
        let key_string = String::from_utf8_lossy(&key).into_owned();
        map.insert(key_string, Value::decode(&payload));
    }

    Some(codec::dictionary_from_map(map))
}

/// Write (or delete) the value addressed by `key`.
///
/// `value = None` deletes the key. Otherwise the value tree is encoded
/// and stored. `key` is UTF-8 encoded before being passed to the storage
/// engine.
pub fn set_value(
    engine: &StorageEngine,
    key: &str,
    value: Option<&Value>,
) -> Result<(), StorageError> {
    match value {
        Some(value) => {
            let bytes = value.encode();
            engine.set(key.as_bytes(), Some(&bytes))
        }
        None => engine.set(key.as_bytes(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    fn test_engine() -> StorageEngine {
        StorageEngine::with_backend("test", Box::new(MemoryBackend::new()))
    }

    #[test]
    fn single_value_round_trip() {
        let engine = test_engine();
        set_value(&engine, "name", Some(&Value::String("Alice".into()))).unwrap();
        let got = copy_value(&engine, "name").unwrap();
        assert_eq!(got, Some(Value::String("Alice".into())));
    }

    #[test]
    fn dictionary_round_trip() {
        let engine = test_engine();
        let dict = Value::Dictionary(vec![
            ("n".into(), Value::String("A".into())),
            ("age".into(), Value::Integer(30)),
        ]);
        set_value(&engine, "u/1", Some(&dict)).unwrap();
        let got = copy_value(&engine, "u/1").unwrap();
        assert_eq!(got, Some(dict));
    }

    #[test]
    fn prefix_glob_aggregates_matching_keys_only() {
        let engine = test_engine();
        set_value(&engine, "u/1", Some(&Value::Integer(1))).unwrap();
        set_value(&engine, "u/2", Some(&Value::Integer(2))).unwrap();
        set_value(&engine, "v/1", Some(&Value::Integer(3))).unwrap();

        let got = copy_value(&engine, "u/*").unwrap().unwrap();
        match got {
            Value::Dictionary(entries) => {
                let keys: std::collections::HashSet<_> =
                    entries.iter().map(|(k, _)| k.clone()).collect();
                assert_eq!(
                    keys,
                    ["u/1".to_string(), "u/2".to_string()].into_iter().collect()
                );
            }
            other => panic!("expected Dictionary, got {other:?}"),
        }
    }

    #[test]
    fn delete_then_copy_is_absent() {
        let engine = test_engine();
        set_value(&engine, "k", Some(&Value::String("x".into()))).unwrap();
        set_value(&engine, "k", None).unwrap();
        assert_eq!(copy_value(&engine, "k").unwrap(), None);
    }

    #[test]
    fn missing_key_is_absent_not_error() {
        let engine = test_engine();
        assert_eq!(copy_value(&engine, "nope").unwrap(), None);
    }

    #[test]
    fn empty_glob_over_fresh_store_is_empty_dictionary() {
        let engine = test_engine();
        let got = copy_value(&engine, "*").unwrap().unwrap();
        assert_eq!(got, Value::Dictionary(Vec::new()));
    }
}
