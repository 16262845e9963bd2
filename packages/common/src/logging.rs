//! Structured logging infrastructure
//!
//! Provides env_logger-based logging with secure handling of sensitive data
//! and proper integration with the standard log crate. Crates that emit
//! `tracing` events reach the same backend through tracing's `log` feature.

use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging entry points and secure formatting helpers
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging system (should be called once at application startup)
    ///
    /// Configure logging levels via `RUST_LOG`:
    /// - `RUST_LOG=info` - engine construction and rejected tokens
    /// - `RUST_LOG=debug` - every issued, parsed and validated token
    /// - `RUST_LOG=tokenward_jwt=debug` - module-specific levels
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            let installed = env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .try_init()
                .is_ok();

            if installed {
                info!("Structured logging initialized");
            }
        });
    }

    /// Initialize logging for test environments
    ///
    /// Safe to call from every test; only the first call installs a logger.
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Short, stable identifier for key material
    ///
    /// SHA-256 of the key, first 8 bytes hex-encoded. Never log the key itself.
    #[must_use]
    pub fn fingerprint(key: &[u8]) -> String {
        let digest = Sha256::digest(key);
        hex::encode(&digest[..8])
    }

    /// Log a token lifecycle event
    ///
    /// Subject identifiers are hashed for privacy while maintaining traceability.
    pub fn log_token_event(event: &str, subject: Option<&str>, success: bool) {
        let subject_hash = subject.map_or_else(
            || "anonymous".to_string(),
            |s| format!("#{}", Self::fingerprint(s.as_bytes())),
        );
        if success {
            debug!("Token {event} succeeded (subject_hash: {subject_hash})");
        } else {
            warn!("Token {event} rejected (subject_hash: {subject_hash})");
        }
    }

    /// Secure logging of cryptographic errors
    ///
    /// Logs the operation and error type without the error's payload.
    pub fn log_crypto_error<E: std::error::Error + ?Sized>(operation: &str, _error: &E) {
        error!(
            "Cryptographic operation failed: {} (error_type: {})",
            operation,
            std::any::type_name::<E>()
        );
    }
}
