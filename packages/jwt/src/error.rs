//! Error types for token issuance, parsing and validation

use thiserror::Error;

/// JWT operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// JWT error types
///
/// Configuration-time errors (`UnsupportedAlgorithm`, `KeyMaterial`,
/// `InvalidTtl`, `Configuration`) abort engine construction. Everything else
/// is scoped to a single issuance or validation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Algorithm name is empty or not a supported identifier
    #[error("Unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(String),
    /// Key could not be read or decoded, or does not fit the algorithm
    #[error("Key material error: {0}")]
    KeyMaterial(String),
    /// A custom claim uses a registered claim name
    #[error("Claim {0:?} is reserved and cannot be set as a custom claim")]
    ReservedClaimConflict(String),
    /// Expiry precedes the issue time
    #[error("Token expiry must not precede its issue time")]
    InvalidExpiry,
    /// Structural parse failure
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    /// Signature does not verify, or the token's algorithm differs from the context's
    #[error("Token signature is invalid")]
    SignatureInvalid,
    /// Issuer claim differs from the expected issuer
    #[error("Issuer mismatch: expected {expected:?}, found {found:?}")]
    IssuerMismatch {
        /// Issuer the validator was configured with
        expected: String,
        /// Issuer carried by the token, if any
        found: Option<String>,
    },
    /// A required claim is missing or holds a different value
    #[error("Claim {0:?} does not hold the expected value")]
    ClaimMismatch(String),
    /// Token expiry is at or before the current time
    #[error("Token has expired")]
    Expired,
    /// TTL expression could not be resolved
    #[error("Invalid TTL expression: {0:?}")]
    InvalidTtl(String),
    /// Configuration document is invalid
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// Header or claims could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Cryptographic signing failed
    #[error("Signing error: {0}")]
    Signing(String),
}

impl JwtError {
    /// Create a key material error
    #[inline]
    #[must_use]
    pub fn key_material(msg: &str) -> Self {
        JwtError::KeyMaterial(msg.to_string())
    }

    /// Create a malformed token error
    #[inline]
    #[must_use]
    pub fn malformed(msg: &str) -> Self {
        JwtError::MalformedToken(msg.to_string())
    }

    /// Create an unsupported algorithm error
    #[inline]
    #[must_use]
    pub fn unsupported_algorithm(alg: &str) -> Self {
        JwtError::UnsupportedAlgorithm(alg.to_string())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: &str) -> Self {
        JwtError::Serialization(msg.to_string())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(msg: &str) -> Self {
        JwtError::Signing(msg.to_string())
    }

    /// Whether this error can only arise while building a signing context
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            JwtError::UnsupportedAlgorithm(_)
                | JwtError::KeyMaterial(_)
                | JwtError::InvalidTtl(_)
                | JwtError::Configuration(_)
        )
    }
}
