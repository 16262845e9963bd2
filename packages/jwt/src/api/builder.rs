//! Token construction and signing
//!
//! [`TokenBuilder`] collects the registered claims and any custom claims,
//! then signs `header.payload` with a [`SigningContext`].

use crate::api::algorithms::utils::base64_url_encode;
use crate::api::keys::SigningContext;
use crate::claims::{ClaimSet, Claims, RegisteredClaims, is_registered_claim};
use crate::error::{JwtError, JwtResult};
use crate::types::{JwtHeader, SignedToken, Token};
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use tracing::debug;

/// Builder for a single signed token
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    issuer: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    subject: Option<String>,
    audience: Vec<String>,
    not_before: Option<DateTime<Utc>>,
    jwt_id: Option<String>,
    key_id: Option<String>,
    claims: ClaimSet,
}

impl TokenBuilder {
    /// Start a token issued by `issuer` at `now`, expiring at `expires_at`.
    ///
    /// Both instants are truncated to whole seconds.
    #[must_use]
    pub fn new(issuer: impl Into<String>, now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            issuer: issuer.into(),
            issued_at: now.trunc_subsecs(0),
            expires_at: expires_at.trunc_subsecs(0),
            subject: None,
            audience: Vec::new(),
            not_before: None,
            jwt_id: None,
            key_id: None,
            claims: ClaimSet::new(),
        }
    }

    /// Add every entry of `claims` as a custom claim
    #[must_use]
    pub fn claims(mut self, claims: &ClaimSet) -> Self {
        for (name, value) in claims {
            self.claims.insert(name.clone(), value.clone());
        }
        self
    }

    /// Add one custom claim
    #[must_use]
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name, value);
        self
    }

    /// `sub`
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Add an audience; repeat for several
    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience.push(audience.into());
        self
    }

    /// `nbf`, truncated to whole seconds
    #[must_use]
    pub fn not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before.trunc_subsecs(0));
        self
    }

    /// `jti`
    #[must_use]
    pub fn jwt_id(mut self, jwt_id: impl Into<String>) -> Self {
        self.jwt_id = Some(jwt_id.into());
        self
    }

    /// Header `kid`
    #[must_use]
    pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Claims the token will carry, before signing
    ///
    /// # Errors
    /// Returns `JwtError::ReservedClaimConflict` for a custom claim with a
    /// registered name, and `JwtError::InvalidExpiry` when the expiry precedes
    /// the issue time.
    pub fn build_claims(&self) -> JwtResult<Claims> {
        if let Some((name, _)) = self.claims.iter().find(|(name, _)| is_registered_claim(name)) {
            return Err(JwtError::ReservedClaimConflict(name.clone()));
        }
        if self.expires_at < self.issued_at {
            return Err(JwtError::InvalidExpiry);
        }

        Ok(Claims::new(
            RegisteredClaims {
                issuer: Some(self.issuer.clone()),
                subject: self.subject.clone(),
                audience: self.audience.clone(),
                issued_at: Some(self.issued_at),
                not_before: self.not_before,
                expires_at: Some(self.expires_at),
                jwt_id: self.jwt_id.clone(),
            },
            self.claims.clone(),
        ))
    }

    /// Sign with `context`
    ///
    /// # Errors
    /// Fails as [`Self::build_claims`] does, with `JwtError::Serialization`
    /// if the header or payload cannot be encoded, and with
    /// `JwtError::KeyMaterial` / `JwtError::Signing` if signing fails.
    pub fn sign(self, context: &SigningContext) -> JwtResult<SignedToken> {
        let claims = self.build_claims()?;

        let mut header = JwtHeader::new(context.algorithm());
        if let Some(kid) = self.key_id {
            header = header.with_key_id(kid);
        }

        let header_json = serde_json::to_vec(&header)
            .map_err(|e| JwtError::Serialization(format!("header: {e}")))?;
        let payload_json = serde_json::to_vec(claims.payload())
            .map_err(|e| JwtError::Serialization(format!("payload: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            base64_url_encode(&header_json),
            base64_url_encode(&payload_json)
        );
        let signature = context.sign(signing_input.as_bytes())?;

        debug!(
            algorithm = %context.algorithm(),
            expires_at = %self.expires_at,
            custom_claims = claims.custom().len(),
            "token signed"
        );

        Ok(SignedToken::new(Token {
            header,
            algorithm: context.algorithm(),
            claims,
            signing_input,
            signature,
        }))
    }
}

/// Issue a token carrying `claims` as custom claims
///
/// # Errors
/// See [`TokenBuilder::sign`].
pub fn issue(
    context: &SigningContext,
    claims: &ClaimSet,
    issuer: &str,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> JwtResult<SignedToken> {
    TokenBuilder::new(issuer, now, expires_at)
        .claims(claims)
        .sign(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn context() -> SigningContext {
        SigningContext::symmetric(crate::Algorithm::HS256, &[7u8; 32]).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn every_registered_name_conflicts() {
        for name in crate::claims::REGISTERED_CLAIMS {
            let err = TokenBuilder::new("iss", now(), now() + Duration::hours(1))
                .claim(name, "x")
                .sign(&context())
                .unwrap_err();
            assert_eq!(err, JwtError::ReservedClaimConflict(name.to_string()));
        }
    }

    #[test]
    fn expiry_before_issue_is_refused() {
        let err = TokenBuilder::new("iss", now(), now() - Duration::seconds(1))
            .sign(&context())
            .unwrap_err();
        assert_eq!(err, JwtError::InvalidExpiry);
    }

    #[test]
    fn timestamps_are_truncated_to_seconds() {
        let now = now() + Duration::milliseconds(750);
        let claims = TokenBuilder::new("iss", now, now + Duration::seconds(10))
            .build_claims()
            .unwrap();
        assert_eq!(claims.issued_at().unwrap().timestamp_subsec_nanos(), 0);
        assert_eq!(claims.get("iat"), Some(&serde_json::json!(now.timestamp())));
    }

    #[test]
    fn header_carries_kid_when_set() {
        let signed = TokenBuilder::new("iss", now(), now() + Duration::hours(1))
            .key_id("k1")
            .sign(&context())
            .unwrap();
        let header = signed.token().header();
        assert_eq!(header.kid.as_deref(), Some("k1"));
        assert_eq!(header.typ.as_deref(), Some("JWT"));
        assert_eq!(header.alg, "HS256");
    }
}
