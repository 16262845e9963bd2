//! Key providers
//!
//! Turn a configured key reference into raw key bytes. Where the bytes come
//! from is the provider's business; the resolver only sees the result.

use crate::error::{JwtError, JwtResult};
use std::collections::HashMap;
use zeroize::Zeroizing;

/// Loads raw key bytes for a key reference
pub trait KeyProvider: Send + Sync {
    /// Load the key named by `reference`.
    ///
    /// # Errors
    /// Returns `JwtError::KeyMaterial` when the key cannot be read.
    fn load(&self, reference: &str) -> JwtResult<Zeroizing<Vec<u8>>>;
}

/// Reads keys from the filesystem
///
/// References are paths, optionally prefixed with `file://`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileKeyProvider;

impl KeyProvider for FileKeyProvider {
    fn load(&self, reference: &str) -> JwtResult<Zeroizing<Vec<u8>>> {
        let path = reference.strip_prefix("file://").unwrap_or(reference);
        std::fs::read(path)
            .map(Zeroizing::new)
            .map_err(|e| JwtError::KeyMaterial(format!("cannot read key {path:?}: {e}")))
    }
}

/// Serves keys registered in memory under a reference name
#[derive(Clone, Default)]
pub struct StaticKeyProvider {
    keys: HashMap<String, Zeroizing<Vec<u8>>>,
}

impl StaticKeyProvider {
    /// Empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under `reference`
    #[must_use]
    pub fn with_key(mut self, reference: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        self.keys.insert(reference.into(), Zeroizing::new(key.into()));
        self
    }
}

impl std::fmt::Debug for StaticKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeyProvider")
            .field("references", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl KeyProvider for StaticKeyProvider {
    fn load(&self, reference: &str) -> JwtResult<Zeroizing<Vec<u8>>> {
        self.keys
            .get(reference)
            .cloned()
            .ok_or_else(|| JwtError::KeyMaterial(format!("no key registered for {reference:?}")))
    }
}
