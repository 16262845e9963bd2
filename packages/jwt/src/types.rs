//! Token type definitions

use crate::api::algorithms::Algorithm;
use crate::api::algorithms::utils::base64_url_encode;
use crate::claims::Claims;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JOSE header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Media type, `"JWT"` on issued tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Signing algorithm name
    pub alg: String,
    /// Key identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwtHeader {
    /// Header for `algorithm`, typed `"JWT"`, without `kid`
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            typ: Some("JWT".to_string()),
            alg: algorithm.name().to_string(),
            kid: None,
        }
    }

    /// Set `kid`
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }
}

/// Compact serialization `header.payload.signature`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JwtToken(String);

impl JwtToken {
    /// Wrap a compact string without inspecting it
    #[must_use]
    pub fn new(compact: impl Into<String>) -> Self {
        Self(compact.into())
    }

    /// Compact text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compact text, owned
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for JwtToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JwtToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<JwtToken> for String {
    fn from(token: JwtToken) -> Self {
        token.0
    }
}

/// Decoded token
///
/// Produced by the parser or by signing; immutable. `signing_input` is the
/// exact `header.payload` text the signature covers, kept verbatim so that
/// verification never depends on re-serialising the claims.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub(crate) header: JwtHeader,
    pub(crate) algorithm: Algorithm,
    pub(crate) claims: Claims,
    pub(crate) signing_input: String,
    pub(crate) signature: Vec<u8>,
}

impl Token {
    /// Decoded JOSE header
    #[must_use]
    pub fn header(&self) -> &JwtHeader {
        &self.header
    }

    /// Algorithm named by the header
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Decoded claims
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// `header.payload` as it appeared on the wire
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// Raw signature bytes
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Whether `exp` is present and `now` has reached it
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.claims.expires_at().is_some_and(|exp| now >= exp)
    }

    /// Re-assemble the compact serialization
    #[must_use]
    pub fn to_compact(&self) -> JwtToken {
        JwtToken(format!(
            "{}.{}",
            self.signing_input,
            base64_url_encode(&self.signature)
        ))
    }
}

/// Result of signing: the compact string and the token it decodes to
#[derive(Debug, Clone, PartialEq)]
pub struct SignedToken {
    compact: JwtToken,
    token: Token,
}

impl SignedToken {
    pub(crate) fn new(token: Token) -> Self {
        Self {
            compact: token.to_compact(),
            token,
        }
    }

    /// Compact serialization
    #[must_use]
    pub fn compact(&self) -> &JwtToken {
        &self.compact
    }

    /// Token the compact form decodes to
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Split into the compact form and the token
    #[must_use]
    pub fn into_parts(self) -> (JwtToken, Token) {
        (self.compact, self.token)
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.compact.fmt(f)
    }
}
