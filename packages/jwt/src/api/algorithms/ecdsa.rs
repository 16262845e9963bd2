//! ECDSA-based JWT Algorithm Implementations
//!
//! ES256 (P-256), ES384 (P-384) and ES512 (P-521). Signatures use the
//! fixed-width `r || s` encoding JWS requires, not DER. A signature of the
//! wrong length simply fails verification.

use crate::error::{JwtError, JwtResult};

/// Sign with ECDSA P-256 (ES256)
#[inline]
pub(crate) fn sign_es256(message: &[u8], private_key_der: &[u8]) -> JwtResult<Vec<u8>> {
    use p256::ecdsa::{Signature, SigningKey, signature::Signer};
    use p256::pkcs8::DecodePrivateKey;

    let signing_key = SigningKey::from_pkcs8_der(private_key_der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-256 private key: {e}")))?;
    let signature: Signature = signing_key.sign(message);
    Ok(signature.to_bytes().to_vec())
}

/// Verify ECDSA P-256 (ES256) signature
#[inline]
pub(crate) fn verify_es256(message: &[u8], signature: &[u8], public_key_der: &[u8]) -> JwtResult<bool> {
    use p256::ecdsa::{Signature, VerifyingKey, signature::Verifier};
    use p256::pkcs8::DecodePublicKey;

    let verifying_key = VerifyingKey::from_public_key_der(public_key_der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-256 public key: {e}")))?;
    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Sign with ECDSA P-384 (ES384)
#[inline]
pub(crate) fn sign_es384(message: &[u8], private_key_der: &[u8]) -> JwtResult<Vec<u8>> {
    use p384::ecdsa::{Signature, SigningKey, signature::Signer};
    use p384::pkcs8::DecodePrivateKey;

    let signing_key = SigningKey::from_pkcs8_der(private_key_der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-384 private key: {e}")))?;
    let signature: Signature = signing_key.sign(message);
    Ok(signature.to_bytes().to_vec())
}

/// Verify ECDSA P-384 (ES384) signature
#[inline]
pub(crate) fn verify_es384(message: &[u8], signature: &[u8], public_key_der: &[u8]) -> JwtResult<bool> {
    use p384::ecdsa::{Signature, VerifyingKey, signature::Verifier};
    use p384::pkcs8::DecodePublicKey;

    let verifying_key = VerifyingKey::from_public_key_der(public_key_der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-384 public key: {e}")))?;
    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Sign with ECDSA P-521 (ES512)
///
/// p521 exposes its ECDSA keys as newtypes without PKCS#8 decoding, so the
/// key goes through `SecretKey` first.
#[inline]
pub(crate) fn sign_es512(message: &[u8], private_key_der: &[u8]) -> JwtResult<Vec<u8>> {
    use p521::ecdsa::{Signature, SigningKey, signature::Signer};
    use p521::pkcs8::DecodePrivateKey;

    let secret = p521::SecretKey::from_pkcs8_der(private_key_der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-521 private key: {e}")))?;
    let signing_key = SigningKey::from_bytes(&secret.to_bytes())
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-521 private key: {e}")))?;
    let signature: Signature = signing_key.sign(message);
    Ok(signature.to_bytes().to_vec())
}

/// Verify ECDSA P-521 (ES512) signature
#[inline]
pub(crate) fn verify_es512(message: &[u8], signature: &[u8], public_key_der: &[u8]) -> JwtResult<bool> {
    use p521::ecdsa::{Signature, VerifyingKey, signature::Verifier};
    use p521::pkcs8::DecodePublicKey;

    let public = p521::PublicKey::from_public_key_der(public_key_der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-521 public key: {e}")))?;
    let verifying_key = VerifyingKey::from_sec1_bytes(&public.to_sec1_bytes())
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid P-521 public key: {e}")))?;
    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(verifying_key.verify(message, &signature).is_ok())
}
