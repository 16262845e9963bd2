//! Key decoding and normalisation
//!
//! Accepts PEM or DER input and re-encodes to PKCS#8 DER (private) and SPKI
//! DER (public), checking that both halves belong together and fit the
//! algorithm.

use crate::api::algorithms::Algorithm;
use crate::error::{JwtError, JwtResult};
use zeroize::Zeroizing;

/// RSA moduli shorter than this are refused
pub const MIN_RSA_BITS: usize = 2048;

/// Normalised asymmetric key pair: (PKCS#8 DER private, SPKI DER public)
pub(crate) type NormalizedPair = (Zeroizing<Vec<u8>>, Vec<u8>);

/// PEM text if `bytes` looks like a PEM document, `None` for DER
fn pem_text(bytes: &[u8]) -> JwtResult<Option<&str>> {
    if !bytes.trim_ascii_start().starts_with(b"-----BEGIN") {
        return Ok(None);
    }
    std::str::from_utf8(bytes)
        .map(|text| Some(text.trim()))
        .map_err(|_| JwtError::key_material("PEM key is not valid UTF-8"))
}

/// Check an HMAC secret is long enough for the algorithm
pub(crate) fn check_hmac_secret(algorithm: Algorithm, secret: &[u8]) -> JwtResult<()> {
    let Some(min_length) = algorithm.min_secret_len() else {
        return Err(JwtError::KeyMaterial(format!(
            "{algorithm} does not use a shared secret"
        )));
    };
    if secret.len() < min_length {
        return Err(JwtError::KeyMaterial(format!(
            "HMAC key for {algorithm} must be at least {min_length} bytes, got {}",
            secret.len()
        )));
    }
    Ok(())
}

/// Same steps for every NIST curve crate; only the crate path differs.
macro_rules! normalize_ec {
    ($curve:ident, $private:expr, $public:expr) => {{
        use $curve::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};

        let curve = stringify!($curve);
        let secret = match pem_text($private)? {
            Some(pem) => $curve::SecretKey::from_pkcs8_pem(pem)
                .ok()
                .or_else(|| $curve::SecretKey::from_sec1_pem(pem).ok()),
            None => $curve::SecretKey::from_pkcs8_der($private)
                .ok()
                .or_else(|| $curve::SecretKey::from_sec1_der($private).ok()),
        }
        .ok_or_else(|| JwtError::KeyMaterial(format!("private key is not a {curve} EC key")))?;

        let public = match pem_text($public)? {
            Some(pem) => $curve::PublicKey::from_public_key_pem(pem),
            None => $curve::PublicKey::from_public_key_der($public),
        }
        .map_err(|e| JwtError::KeyMaterial(format!("public key is not a {curve} EC key: {e}")))?;

        if secret.public_key() != public {
            return Err(JwtError::key_material("public key does not match private key"));
        }

        let private_der = secret
            .to_pkcs8_der()
            .map_err(|e| JwtError::KeyMaterial(format!("cannot encode {curve} private key: {e}")))?;
        let public_der = public
            .to_public_key_der()
            .map_err(|e| JwtError::KeyMaterial(format!("cannot encode {curve} public key: {e}")))?;

        Ok((
            Zeroizing::new(private_der.as_bytes().to_vec()),
            public_der.as_bytes().to_vec(),
        ))
    }};
}

/// Decode, check and re-encode an asymmetric key pair
pub(crate) fn normalize_pair(
    algorithm: Algorithm,
    private_key: &[u8],
    public_key: &[u8],
) -> JwtResult<NormalizedPair> {
    match algorithm {
        Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => normalize_rsa(private_key, public_key),
        Algorithm::ES256 => normalize_ec!(p256, private_key, public_key),
        Algorithm::ES384 => normalize_ec!(p384, private_key, public_key),
        Algorithm::ES512 => normalize_ec!(p521, private_key, public_key),
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Err(JwtError::KeyMaterial(
            format!("{algorithm} uses a shared secret, not a key pair"),
        )),
    }
}

fn normalize_rsa(private_key: &[u8], public_key: &[u8]) -> JwtResult<NormalizedPair> {
    use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
    use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
    use rsa::traits::PublicKeyParts;
    use rsa::{RsaPrivateKey, RsaPublicKey};

    let private = match pem_text(private_key)? {
        Some(pem) => RsaPrivateKey::from_pkcs8_pem(pem)
            .ok()
            .or_else(|| RsaPrivateKey::from_pkcs1_pem(pem).ok()),
        None => RsaPrivateKey::from_pkcs8_der(private_key)
            .ok()
            .or_else(|| RsaPrivateKey::from_pkcs1_der(private_key).ok()),
    }
    .ok_or_else(|| JwtError::key_material("private key is neither a PKCS#8 nor a PKCS#1 RSA key"))?;

    let public = match pem_text(public_key)? {
        Some(pem) => RsaPublicKey::from_public_key_pem(pem)
            .ok()
            .or_else(|| RsaPublicKey::from_pkcs1_pem(pem).ok()),
        None => RsaPublicKey::from_public_key_der(public_key)
            .ok()
            .or_else(|| RsaPublicKey::from_pkcs1_der(public_key).ok()),
    }
    .ok_or_else(|| JwtError::key_material("public key is neither an SPKI nor a PKCS#1 RSA key"))?;

    let bits = public.size() * 8;
    if bits < MIN_RSA_BITS {
        return Err(JwtError::KeyMaterial(format!(
            "RSA key must be at least {MIN_RSA_BITS} bits, got {bits}"
        )));
    }
    if RsaPublicKey::from(&private) != public {
        return Err(JwtError::key_material("public key does not match private key"));
    }

    let private_der = private
        .to_pkcs8_der()
        .map_err(|e| JwtError::KeyMaterial(format!("cannot encode RSA private key: {e}")))?;
    let public_der = public
        .to_public_key_der()
        .map_err(|e| JwtError::KeyMaterial(format!("cannot encode RSA public key: {e}")))?;

    Ok((
        Zeroizing::new(private_der.as_bytes().to_vec()),
        public_der.as_bytes().to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_detection_tolerates_leading_whitespace() {
        let pem = b"\n  -----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n";
        assert!(pem_text(pem).unwrap().is_some());
        assert!(pem_text(&[0x30, 0x82, 0x01]).unwrap().is_none());
    }

    #[test]
    fn hmac_secret_length_follows_hash_size() {
        assert!(check_hmac_secret(Algorithm::HS256, &[0u8; 32]).is_ok());
        assert!(check_hmac_secret(Algorithm::HS384, &[0u8; 47]).is_err());
        assert!(check_hmac_secret(Algorithm::HS512, &[0u8; 64]).is_ok());
        assert!(check_hmac_secret(Algorithm::RS256, &[0u8; 64]).is_err());
    }

    #[test]
    fn garbage_is_rejected_for_every_asymmetric_algorithm() {
        for algorithm in [Algorithm::RS256, Algorithm::ES256, Algorithm::ES384, Algorithm::ES512] {
            let err = normalize_pair(algorithm, b"not a key", b"not a key").unwrap_err();
            assert!(matches!(err, JwtError::KeyMaterial(_)), "{algorithm}: {err:?}");
        }
    }
}
