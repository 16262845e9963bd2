//! JWT Algorithms Module
//!
//! The closed set of supported JWS algorithms and the registry that maps
//! configured names onto them. Each family lives in its own module; the
//! [`Algorithm`] enum dispatches to them through the [`Signer`] trait.

mod ecdsa;
mod hmac;
mod rsa;
pub(crate) mod utils;

use crate::error::{JwtError, JwtResult};
use crate::traits::Signer;
use std::fmt;
use std::str::FromStr;

/// Algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// HMAC-SHA2, one shared secret
    Hmac,
    /// RSASSA-PKCS1-v1_5, RSA key pair
    Rsa,
    /// ECDSA over a NIST curve, EC key pair
    Ecdsa,
}

/// Supported signing algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
    /// ECDSA using P-521 and SHA-512
    ES512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
}

impl Algorithm {
    /// Every supported algorithm
    pub const ALL: [Algorithm; 9] = [
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
    ];

    /// Header `alg` value
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::ES512 => "ES512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
        }
    }

    /// Family this algorithm belongs to
    #[must_use]
    pub fn family(self) -> AlgorithmFamily {
        match self {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => AlgorithmFamily::Hmac,
            Algorithm::ES256 | Algorithm::ES384 | Algorithm::ES512 => AlgorithmFamily::Ecdsa,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => AlgorithmFamily::Rsa,
        }
    }

    /// Whether signing and verification share one key
    #[must_use]
    pub fn is_symmetric(self) -> bool {
        self.family() == AlgorithmFamily::Hmac
    }

    /// Minimum HMAC secret length in bytes (the hash output size)
    #[must_use]
    pub fn min_secret_len(self) -> Option<usize> {
        match self {
            Algorithm::HS256 => Some(32),
            Algorithm::HS384 => Some(48),
            Algorithm::HS512 => Some(64),
            _ => None,
        }
    }

    /// Exact, case-sensitive match against a header `alg` value
    #[must_use]
    pub fn from_header_name(alg: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.name() == alg)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmRegistry::resolve(s)
    }
}

impl Signer for Algorithm {
    fn algorithm(&self) -> Algorithm {
        *self
    }

    fn sign(&self, message: &[u8], key: &[u8]) -> JwtResult<Vec<u8>> {
        match self {
            Algorithm::HS256 => hmac::sign_hs256(message, key),
            Algorithm::HS384 => hmac::sign_hs384(message, key),
            Algorithm::HS512 => hmac::sign_hs512(message, key),
            Algorithm::ES256 => ecdsa::sign_es256(message, key),
            Algorithm::ES384 => ecdsa::sign_es384(message, key),
            Algorithm::ES512 => ecdsa::sign_es512(message, key),
            Algorithm::RS256 => rsa::sign_rs256(message, key),
            Algorithm::RS384 => rsa::sign_rs384(message, key),
            Algorithm::RS512 => rsa::sign_rs512(message, key),
        }
    }

    fn verify(&self, message: &[u8], signature: &[u8], key: &[u8]) -> JwtResult<bool> {
        match self {
            Algorithm::HS256 => hmac::verify_hs256(message, signature, key),
            Algorithm::HS384 => hmac::verify_hs384(message, signature, key),
            Algorithm::HS512 => hmac::verify_hs512(message, signature, key),
            Algorithm::ES256 => ecdsa::verify_es256(message, signature, key),
            Algorithm::ES384 => ecdsa::verify_es384(message, signature, key),
            Algorithm::ES512 => ecdsa::verify_es512(message, signature, key),
            Algorithm::RS256 => rsa::verify_rs256(message, signature, key),
            Algorithm::RS384 => rsa::verify_rs384(message, signature, key),
            Algorithm::RS512 => rsa::verify_rs512(message, signature, key),
        }
    }
}

/// Maps configured algorithm names onto [`Algorithm`]
pub struct AlgorithmRegistry;

impl AlgorithmRegistry {
    /// Resolve a configured algorithm name.
    ///
    /// Comparison is case-insensitive: the name is upper-cased before lookup.
    ///
    /// # Errors
    /// Returns `JwtError::UnsupportedAlgorithm` when `name` is empty or not one
    /// of the nine supported identifiers.
    pub fn resolve(name: &str) -> JwtResult<Algorithm> {
        if name.is_empty() {
            return Err(JwtError::unsupported_algorithm(name));
        }
        let normalized = name.to_ascii_uppercase();
        Algorithm::from_header_name(&normalized).ok_or_else(|| JwtError::unsupported_algorithm(name))
    }

    /// Every algorithm the registry resolves to
    #[must_use]
    pub fn supported() -> &'static [Algorithm] {
        &Algorithm::ALL
    }

    /// Whether `name` resolves
    #[must_use]
    pub fn is_supported(name: &str) -> bool {
        Self::resolve(name).is_ok()
    }
}
