//! HMAC-based JWT Algorithm Implementations
//!
//! HMAC-SHA algorithms (HS256, HS384, HS512). Verification goes through
//! `Mac::verify_slice`, which compares in constant time.

use crate::error::{JwtError, JwtResult};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

fn keyed<M: Mac + KeyInit>(message: &[u8], secret: &[u8]) -> JwtResult<M> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|_| JwtError::key_material("Invalid HMAC key"))?;
    mac.update(message);
    Ok(mac)
}

fn sign_with<M: Mac + KeyInit>(message: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
    Ok(keyed::<M>(message, secret)?.finalize().into_bytes().to_vec())
}

fn verify_with<M: Mac + KeyInit>(message: &[u8], signature: &[u8], secret: &[u8]) -> JwtResult<bool> {
    Ok(keyed::<M>(message, secret)?.verify_slice(signature).is_ok())
}

/// Sign with HMAC-SHA256 (HS256)
#[inline]
pub(crate) fn sign_hs256(message: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
    sign_with::<HmacSha256>(message, secret)
}

/// Verify HMAC-SHA256 (HS256) signature
#[inline]
pub(crate) fn verify_hs256(message: &[u8], signature: &[u8], secret: &[u8]) -> JwtResult<bool> {
    verify_with::<HmacSha256>(message, signature, secret)
}

/// Sign with HMAC-SHA384 (HS384)
#[inline]
pub(crate) fn sign_hs384(message: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
    sign_with::<HmacSha384>(message, secret)
}

/// Verify HMAC-SHA384 (HS384) signature
#[inline]
pub(crate) fn verify_hs384(message: &[u8], signature: &[u8], secret: &[u8]) -> JwtResult<bool> {
    verify_with::<HmacSha384>(message, signature, secret)
}

/// Sign with HMAC-SHA512 (HS512)
#[inline]
pub(crate) fn sign_hs512(message: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
    sign_with::<HmacSha512>(message, secret)
}

/// Verify HMAC-SHA512 (HS512) signature
#[inline]
pub(crate) fn verify_hs512(message: &[u8], signature: &[u8], secret: &[u8]) -> JwtResult<bool> {
    verify_with::<HmacSha512>(message, signature, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_lengths_match_hash_output() {
        let secret = [7u8; 64];
        assert_eq!(sign_hs256(b"msg", &secret).unwrap().len(), 32);
        assert_eq!(sign_hs384(b"msg", &secret).unwrap().len(), 48);
        assert_eq!(sign_hs512(b"msg", &secret).unwrap().len(), 64);
    }

    #[test]
    fn verify_rejects_other_message_and_truncated_signature() {
        let secret = [1u8; 32];
        let signature = sign_hs256(b"header.payload", &secret).unwrap();

        assert!(verify_hs256(b"header.payload", &signature, &secret).unwrap());
        assert!(!verify_hs256(b"header.payloae", &signature, &secret).unwrap());
        assert!(!verify_hs256(b"header.payload", &signature[..31], &secret).unwrap());
        assert!(!verify_hs256(b"header.payload", &signature, &[2u8; 32]).unwrap());
    }
}
