//! Key material resolution
//!
//! Produces the [`SigningContext`] every issuance and validation call runs
//! against. With both key references configured the keys are loaded and
//! checked against the selected algorithm; with either reference missing a
//! fresh random HS256 secret is generated instead.
//!
//! The ephemeral branch always binds HMAC-SHA256. An RSA name next to a raw
//! random secret cannot sign anything, so the configured algorithm only
//! applies once real keys are supplied.

mod normalize;
mod provider;

pub use normalize::MIN_RSA_BITS;
pub use provider::{FileKeyProvider, KeyProvider, StaticKeyProvider};

use crate::api::algorithms::{Algorithm, AlgorithmFamily, AlgorithmRegistry};
use crate::error::{JwtError, JwtResult};
use crate::traits::Signer;
use rand::Rng;
use tokenward_common::LoggingTransformer;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Size of the random secret generated when no keys are configured
pub const EPHEMERAL_SECRET_LEN: usize = 32;

/// Algorithm bound to the random fallback secret
pub const EPHEMERAL_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithm plus the keys needed to both produce and verify tokens
///
/// Immutable after construction and safe to share between threads.
#[derive(Clone)]
pub struct SigningContext {
    algorithm: Algorithm,
    signing_key: Zeroizing<Vec<u8>>,
    verification_key: Zeroizing<Vec<u8>>,
    ephemeral: bool,
    fingerprint: String,
}

impl SigningContext {
    /// Context for an HMAC algorithm; `secret` signs and verifies
    ///
    /// # Errors
    /// Returns `JwtError::KeyMaterial` when `algorithm` is not HMAC or the
    /// secret is shorter than the hash output.
    pub fn symmetric(algorithm: Algorithm, secret: &[u8]) -> JwtResult<Self> {
        normalize::check_hmac_secret(algorithm, secret)?;
        Ok(Self::assemble(
            algorithm,
            Zeroizing::new(secret.to_vec()),
            Zeroizing::new(secret.to_vec()),
            false,
        ))
    }

    /// Context for an RSA or ECDSA algorithm
    ///
    /// Keys may be PEM or DER. They are normalised to PKCS#8 / SPKI DER.
    ///
    /// # Errors
    /// Returns `JwtError::KeyMaterial` when a key cannot be decoded, is for a
    /// different algorithm family or curve, is too weak, or when the two keys
    /// do not form a pair.
    pub fn asymmetric(algorithm: Algorithm, private_key: &[u8], public_key: &[u8]) -> JwtResult<Self> {
        let (signing_key, verification_key) =
            normalize::normalize_pair(algorithm, private_key, public_key)?;
        Ok(Self::assemble(
            algorithm,
            signing_key,
            Zeroizing::new(verification_key),
            false,
        ))
    }

    /// Context with a fresh random HS256 secret
    ///
    /// Tokens it issues can only be verified by this context (or its clones).
    ///
    /// # Errors
    /// Infallible in practice; the signature matches the other constructors.
    pub fn ephemeral() -> JwtResult<Self> {
        let mut secret = Zeroizing::new(vec![0u8; EPHEMERAL_SECRET_LEN]);
        rand::rng().fill(secret.as_mut_slice());
        normalize::check_hmac_secret(EPHEMERAL_ALGORITHM, &secret)?;
        Ok(Self::assemble(
            EPHEMERAL_ALGORITHM,
            secret.clone(),
            secret,
            true,
        ))
    }

    fn assemble(
        algorithm: Algorithm,
        signing_key: Zeroizing<Vec<u8>>,
        verification_key: Zeroizing<Vec<u8>>,
        ephemeral: bool,
    ) -> Self {
        let fingerprint = LoggingTransformer::fingerprint(&verification_key);
        Self {
            algorithm,
            signing_key,
            verification_key,
            ephemeral,
            fingerprint,
        }
    }

    /// Algorithm tokens are signed and verified with
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Header `alg` value of [`Self::algorithm`]
    #[must_use]
    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Signing capability
    #[must_use]
    pub fn signer(&self) -> &dyn Signer {
        &self.algorithm
    }

    /// Signing key bytes (HMAC secret or PKCS#8 DER)
    #[must_use]
    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    /// Verification key bytes (HMAC secret or SPKI DER)
    #[must_use]
    pub fn verification_key(&self) -> &[u8] {
        &self.verification_key
    }

    /// Whether the keys were generated at random rather than configured
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Loggable identifier of the verification key
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Sign `message` with the signing key
    ///
    /// # Errors
    /// Returns `JwtError::KeyMaterial` if the signing key is unusable.
    pub fn sign(&self, message: &[u8]) -> JwtResult<Vec<u8>> {
        self.signer().sign(message, &self.signing_key)
    }

    /// Verify `signature` over `message` with the verification key
    ///
    /// # Errors
    /// Returns `JwtError::KeyMaterial` if the verification key is unusable.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> JwtResult<bool> {
        self.signer()
            .verify(message, signature, &self.verification_key)
    }
}

impl std::fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningContext")
            .field("algorithm", &self.algorithm)
            .field("ephemeral", &self.ephemeral)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Builds a [`SigningContext`] from configured key references
pub struct KeyMaterialResolver<'a> {
    provider: &'a dyn KeyProvider,
}

impl<'a> KeyMaterialResolver<'a> {
    /// Resolver reading keys through `provider`
    #[must_use]
    pub fn new(provider: &'a dyn KeyProvider) -> Self {
        Self { provider }
    }

    /// Resolve algorithm and keys into a signing context.
    ///
    /// The algorithm name is checked before the keys are looked at, so an
    /// unknown name fails even when no keys are configured instead of
    /// silently falling back. If either reference is absent or empty an
    /// ephemeral HS256 context is returned. For HMAC algorithms both
    /// references must hold the same secret.
    ///
    /// # Errors
    /// Returns `JwtError::UnsupportedAlgorithm` for an unknown algorithm name
    /// and `JwtError::KeyMaterial` when a key cannot be read or decoded.
    pub fn resolve(
        &self,
        algorithm: &str,
        private_key: Option<&str>,
        public_key: Option<&str>,
    ) -> JwtResult<SigningContext> {
        let algorithm = AlgorithmRegistry::resolve(algorithm)?;

        fn non_empty(reference: Option<&str>) -> Option<&str> {
            reference.filter(|r| !r.trim().is_empty())
        }

        let (Some(private_ref), Some(public_ref)) = (non_empty(private_key), non_empty(public_key))
        else {
            if algorithm != EPHEMERAL_ALGORITHM {
                warn!(
                    configured = %algorithm,
                    using = %EPHEMERAL_ALGORITHM,
                    "no key pair configured, signing with an ephemeral secret"
                );
            }
            return SigningContext::ephemeral();
        };

        let private = self.provider.load(private_ref)?;
        let public = self.provider.load(public_ref)?;

        let context = match algorithm.family() {
            AlgorithmFamily::Hmac => {
                if private.as_slice() != public.as_slice() {
                    return Err(JwtError::key_material(
                        "HMAC signing and verification keys must be identical",
                    ));
                }
                SigningContext::symmetric(algorithm, &private)?
            }
            AlgorithmFamily::Rsa | AlgorithmFamily::Ecdsa => {
                SigningContext::asymmetric(algorithm, &private, &public)?
            }
        };

        debug!(
            algorithm = %context.algorithm(),
            fingerprint = context.fingerprint(),
            "key material resolved"
        );
        Ok(context)
    }
}
