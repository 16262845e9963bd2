//! RSA-based JWT Algorithm Implementations
//!
//! RSASSA-PKCS1-v1_5 with SHA-2 (RS256, RS384, RS512). Keys arrive as
//! PKCS#8 DER (private) and SPKI DER (public), the form a signing context
//! normalises them to.

use crate::error::{JwtError, JwtResult};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};

fn private_key(der: &[u8]) -> JwtResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid RSA private key: {e}")))
}

fn public_key(der: &[u8]) -> JwtResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der)
        .map_err(|e| JwtError::KeyMaterial(format!("Invalid RSA public key: {e}")))
}

/// Sign with RSA-SHA256 (RS256)
#[inline]
pub(crate) fn sign_rs256(message: &[u8], private_key_der: &[u8]) -> JwtResult<Vec<u8>> {
    let signing_key = SigningKey::<Sha256>::new(private_key(private_key_der)?);
    Ok(signing_key.sign(message).to_vec())
}

/// Verify RSA-SHA256 (RS256) signature
#[inline]
pub(crate) fn verify_rs256(message: &[u8], signature: &[u8], public_key_der: &[u8]) -> JwtResult<bool> {
    let verifying_key = VerifyingKey::<Sha256>::new(public_key(public_key_der)?);
    let Ok(signature) = Signature::try_from(signature) else {
        return Ok(false);
    };
    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Sign with RSA-SHA384 (RS384)
#[inline]
pub(crate) fn sign_rs384(message: &[u8], private_key_der: &[u8]) -> JwtResult<Vec<u8>> {
    let signing_key = SigningKey::<Sha384>::new(private_key(private_key_der)?);
    Ok(signing_key.sign(message).to_vec())
}

/// Verify RSA-SHA384 (RS384) signature
#[inline]
pub(crate) fn verify_rs384(message: &[u8], signature: &[u8], public_key_der: &[u8]) -> JwtResult<bool> {
    let verifying_key = VerifyingKey::<Sha384>::new(public_key(public_key_der)?);
    let Ok(signature) = Signature::try_from(signature) else {
        return Ok(false);
    };
    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Sign with RSA-SHA512 (RS512)
#[inline]
pub(crate) fn sign_rs512(message: &[u8], private_key_der: &[u8]) -> JwtResult<Vec<u8>> {
    let signing_key = SigningKey::<Sha512>::new(private_key(private_key_der)?);
    Ok(signing_key.sign(message).to_vec())
}

/// Verify RSA-SHA512 (RS512) signature
#[inline]
pub(crate) fn verify_rs512(message: &[u8], signature: &[u8], public_key_der: &[u8]) -> JwtResult<bool> {
    let verifying_key = VerifyingKey::<Sha512>::new(public_key(public_key_der)?);
    let Ok(signature) = Signature::try_from(signature) else {
        return Ok(false);
    };
    Ok(verifying_key.verify(message, &signature).is_ok())
}
