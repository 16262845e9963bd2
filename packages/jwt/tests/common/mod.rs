//! Shared key fixtures, generated once per test binary

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tokenward_jwt::{Algorithm, AlgorithmFamily, SigningContext};

/// PEM encoded key pair
pub struct PemPair {
    pub private: String,
    pub public: String,
}

fn rsa_pair(bits: usize) -> (RsaPrivateKey, PemPair) {
    let private = RsaPrivateKey::new(&mut OsRng, bits).unwrap();
    let public = RsaPublicKey::from(&private);
    let pem = PemPair {
        private: private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
        public: public.to_public_key_pem(LineEnding::LF).unwrap(),
    };
    (private, pem)
}

macro_rules! ec_pair {
    ($curve:ident) => {{
        let secret = $curve::SecretKey::random(&mut OsRng);
        PemPair {
            private: secret.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            public: secret.public_key().to_public_key_pem(LineEnding::LF).unwrap(),
        }
    }};
}

static RSA_KEY: Lazy<(RsaPrivateKey, PemPair)> = Lazy::new(|| rsa_pair(2048));

pub static RSA_2048: Lazy<&'static PemPair> = Lazy::new(|| &RSA_KEY.1);
pub static RSA_OTHER: Lazy<PemPair> = Lazy::new(|| rsa_pair(2048).1);
pub static RSA_1024: Lazy<PemPair> = Lazy::new(|| rsa_pair(1024).1);
pub static EC_P256: Lazy<PemPair> = Lazy::new(|| ec_pair!(p256));
pub static EC_P384: Lazy<PemPair> = Lazy::new(|| ec_pair!(p384));
pub static EC_P521: Lazy<PemPair> = Lazy::new(|| ec_pair!(p521));

/// The 2048-bit RSA private key in PKCS#1 PEM
pub fn rsa_pkcs1_private() -> String {
    RSA_KEY.0.to_pkcs1_pem(LineEnding::LF).unwrap().to_string()
}

/// The 2048-bit RSA key pair in DER
pub fn rsa_der() -> (Vec<u8>, Vec<u8>) {
    let private = RSA_KEY.0.to_pkcs8_der().unwrap().as_bytes().to_vec();
    let public = RsaPublicKey::from(&RSA_KEY.0)
        .to_public_key_der()
        .unwrap()
        .as_bytes()
        .to_vec();
    (private, public)
}

/// Key pair fixture for an asymmetric algorithm
pub fn pair_for(algorithm: Algorithm) -> &'static PemPair {
    match algorithm {
        Algorithm::ES256 => &EC_P256,
        Algorithm::ES384 => &EC_P384,
        Algorithm::ES512 => &EC_P521,
        _ => *RSA_2048,
    }
}

/// HMAC secret of exactly the minimum length
pub fn secret_for(algorithm: Algorithm) -> Vec<u8> {
    vec![0x5a; algorithm.min_secret_len().unwrap_or(32)]
}

/// Signing context for any supported algorithm
pub fn context_for(algorithm: Algorithm) -> SigningContext {
    match algorithm.family() {
        AlgorithmFamily::Hmac => SigningContext::symmetric(algorithm, &secret_for(algorithm)).unwrap(),
        AlgorithmFamily::Rsa | AlgorithmFamily::Ecdsa => {
            let pair = pair_for(algorithm);
            SigningContext::asymmetric(algorithm, pair.private.as_bytes(), pair.public.as_bytes())
                .unwrap()
        }
    }
}

/// Reference instant used across the suite
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

/// Compact token with one bit of the decoded signature flipped
pub fn flip_signature_bit(compact: &str, bit: usize) -> String {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    let (signing_input, signature) = compact.rsplit_once('.').unwrap();
    let mut signature = URL_SAFE_NO_PAD.decode(signature).unwrap();
    let index = (bit / 8) % signature.len();
    signature[index] ^= 1 << (bit % 8);
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
}
