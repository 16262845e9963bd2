//! Key material resolution: providers, formats, checks and the ephemeral fallback

mod common;

use std::io::Write;
use tempfile::NamedTempFile;
use tokenward_jwt::{
    Algorithm, FileKeyProvider, JwtError, KeyMaterialResolver, SigningContext, StaticKeyProvider,
};

fn pem_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn static_pair(private: impl Into<Vec<u8>>, public: impl Into<Vec<u8>>) -> StaticKeyProvider {
    StaticKeyProvider::new()
        .with_key("private", private)
        .with_key("public", public)
}

fn resolve(provider: &StaticKeyProvider, algorithm: &str) -> Result<SigningContext, JwtError> {
    KeyMaterialResolver::new(provider).resolve(algorithm, Some("private"), Some("public"))
}

#[test]
fn test_rsa_pair_from_files() {
    let private = pem_file(&common::RSA_2048.private);
    let public = pem_file(&common::RSA_2048.public);
    let public_ref = format!("file://{}", public.path().display());
    let provider = FileKeyProvider;

    let context = KeyMaterialResolver::new(&provider)
        .resolve("rs256", private.path().to_str(), Some(public_ref.as_str()))
        .unwrap();

    assert_eq!(context.algorithm(), Algorithm::RS256);
    assert!(!context.is_ephemeral());
    assert_ne!(context.signing_key(), context.verification_key());
}

#[test]
fn test_missing_key_file_is_key_material_error() {
    let provider = FileKeyProvider;
    let err = KeyMaterialResolver::new(&provider)
        .resolve("RS256", Some("/nonexistent/private.pem"), Some("/nonexistent/public.pem"))
        .unwrap_err();
    assert!(matches!(err, JwtError::KeyMaterial(_)));
}

#[test]
fn test_every_asymmetric_algorithm_resolves_from_pem() {
    for algorithm in [
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
    ] {
        let pair = common::pair_for(algorithm);
        let provider = static_pair(pair.private.clone(), pair.public.clone());
        let context = resolve(&provider, algorithm.name()).unwrap();
        assert_eq!(context.algorithm(), algorithm);
    }
}

#[test]
fn test_pkcs1_and_der_encodings_are_accepted() {
    let provider = static_pair(common::rsa_pkcs1_private(), common::RSA_2048.public.clone());
    let from_pkcs1 = resolve(&provider, "RS256").unwrap();

    let (private_der, public_der) = common::rsa_der();
    let provider = static_pair(private_der, public_der);
    let from_der = resolve(&provider, "RS256").unwrap();

    assert_eq!(from_pkcs1.fingerprint(), from_der.fingerprint());
    let signature = from_pkcs1.sign(b"message").unwrap();
    assert!(from_der.verify(b"message", &signature).unwrap());
}

#[test]
fn test_mismatched_rsa_pair_is_rejected() {
    let provider = static_pair(
        common::RSA_2048.private.clone(),
        common::RSA_OTHER.public.clone(),
    );
    assert!(matches!(resolve(&provider, "RS256"), Err(JwtError::KeyMaterial(_))));
}

#[test]
fn test_weak_rsa_key_is_rejected() {
    let provider = static_pair(
        common::RSA_1024.private.clone(),
        common::RSA_1024.public.clone(),
    );
    let err = resolve(&provider, "RS256").unwrap_err();
    assert!(matches!(&err, JwtError::KeyMaterial(msg) if msg.contains("2048")), "{err}");
}

#[test]
fn test_keys_must_fit_the_algorithm() {
    let p256 = static_pair(common::EC_P256.private.clone(), common::EC_P256.public.clone());
    assert!(matches!(resolve(&p256, "ES384"), Err(JwtError::KeyMaterial(_))));
    assert!(matches!(resolve(&p256, "RS256"), Err(JwtError::KeyMaterial(_))));

    let rsa = static_pair(common::RSA_2048.private.clone(), common::RSA_2048.public.clone());
    assert!(matches!(resolve(&rsa, "ES256"), Err(JwtError::KeyMaterial(_))));
}

#[test]
fn test_hmac_with_configured_secret() {
    let secret = vec![0x42u8; 48];
    let provider = static_pair(secret.clone(), secret.clone());
    let context = resolve(&provider, "HS384").unwrap();
    assert_eq!(context.algorithm(), Algorithm::HS384);
    assert_eq!(context.signing_key(), secret.as_slice());
    assert_eq!(context.signing_key(), context.verification_key());

    let provider = static_pair(vec![1u8; 32], vec![2u8; 32]);
    assert!(matches!(resolve(&provider, "HS256"), Err(JwtError::KeyMaterial(_))));

    let provider = static_pair(vec![1u8; 16], vec![1u8; 16]);
    assert!(matches!(resolve(&provider, "HS256"), Err(JwtError::KeyMaterial(_))));
}

#[test]
fn test_missing_reference_falls_back_to_ephemeral_hs256() {
    let provider = StaticKeyProvider::new();
    let resolver = KeyMaterialResolver::new(&provider);

    for (private, public) in [
        (None, None),
        (Some("private"), None),
        (None, Some("public")),
        (Some(""), Some("public")),
        (Some("private"), Some("  ")),
    ] {
        let context = resolver.resolve("RS512", private, public).unwrap();
        assert!(context.is_ephemeral());
        assert_eq!(context.algorithm(), Algorithm::HS256);
        assert_eq!(context.signing_key().len(), 32);
    }
}

#[test]
fn test_fallback_still_checks_algorithm_name() {
    let provider = StaticKeyProvider::new();
    let err = KeyMaterialResolver::new(&provider)
        .resolve("XS256", None, None)
        .unwrap_err();
    assert_eq!(err, JwtError::UnsupportedAlgorithm("XS256".to_string()));
}

#[test]
fn test_ephemeral_secrets_are_fresh() {
    let a = SigningContext::ephemeral().unwrap();
    let b = SigningContext::ephemeral().unwrap();
    assert_ne!(a.signing_key(), b.signing_key());
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_debug_output_never_shows_keys() {
    let context = common::context_for(Algorithm::HS256);
    let debug = format!("{context:?}");
    assert!(debug.contains("HS256"));
    assert!(!debug.contains("90, 90"));

    let provider = static_pair(vec![7u8; 32], vec![7u8; 32]);
    assert!(!format!("{provider:?}").contains("7, 7"));
}
