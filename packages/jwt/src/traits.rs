//! Core signing and time-source traits.

use crate::api::algorithms::Algorithm;
use crate::error::JwtResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Signing algorithm interface.
///
/// One capability shared by every algorithm family: sign a message with a key,
/// verify a signature with the matching key. Implementations must be
/// thread-safe (Send + Sync).
pub trait Signer: Send + Sync {
    /// Algorithm this signer implements.
    fn algorithm(&self) -> Algorithm;

    /// Sign `message` with `key`.
    ///
    /// # Errors
    /// Returns `JwtError::KeyMaterial` when `key` is not usable for this algorithm.
    fn sign(&self, message: &[u8], key: &[u8]) -> JwtResult<Vec<u8>>;

    /// Verify `signature` over `message` with `key`.
    ///
    /// A well-formed key with a non-matching signature yields `Ok(false)`.
    ///
    /// # Errors
    /// Returns `JwtError::KeyMaterial` when `key` is not usable for this algorithm.
    fn verify(&self, message: &[u8], signature: &[u8], key: &[u8]) -> JwtResult<bool>;
}

/// Current-time provider.
///
/// Injected so issuance and expiry checks can be driven deterministically.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Implementation of Clock for Arc<T> to allow a test to keep a handle on a shared clock.
impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
