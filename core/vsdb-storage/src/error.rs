// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Error types for the vsdb storage engine.
//
// The taxonomy is intentionally coarse, mirroring the failure classes an
// embedded store distinguishes in practice: a caller mistake, an absent
// key, an underlying backend failure, and a cursor walk that died partway
// through an enumeration.

use thiserror::Error;

/// Errors returned by the ordered map backend, the storage engine, and the
/// typed facade.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A caller-supplied argument was invalid: a null/empty key, an empty
    /// path, or a glob pattern that is neither `"*"` nor `P*`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested key was not present.
    #[error("key not found: {0}")]
    NotFound(String),

    /// The underlying backend failed (I/O, corruption, or an internal
    /// transaction error). Sub-causes are not distinguished to callers;
    /// the message is for diagnostics only.
    #[error("backend error: {0}")]
    Backend(String),

    /// A `glob` cursor walk failed partway through; all buffered results
    /// for that call were discarded.
    #[error("enumeration failed: {0}")]
    PartialEnumeration(String),

    /// An I/O error surfaced while opening or syncing the backend file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display() {
        let err = StorageError::InvalidArgument("empty key".into());
        assert_eq!(err.to_string(), "invalid argument: empty key");
    }

    #[test]
    fn not_found_display() {
        let err = StorageError::NotFound("user/1".into());
        assert_eq!(err.to_string(), "key not found: user/1");
    }

    #[test]
    fn backend_display() {
        let err = StorageError::Backend("txn commit failed".into());
        assert!(err.to_string().contains("backend error"));
    }

    #[test]
    fn io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
