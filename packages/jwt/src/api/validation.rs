//! Token validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! expiry (when requested), signature, issuer, required claims.
//! Expiry is checked before the signature so that expired tokens never cost
//! a verification.

use crate::api::keys::SigningContext;
use crate::claims::ClaimSet;
use crate::error::{JwtError, JwtResult};
use crate::types::Token;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// What to check beyond signature and issuer, and what to return
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    check_expiry: bool,
    required_claims: ClaimSet,
    requested_claim: Option<String>,
}

impl Default for ValidationRequest {
    fn default() -> Self {
        Self {
            check_expiry: true,
            required_claims: ClaimSet::new(),
            requested_claim: None,
        }
    }
}

impl ValidationRequest {
    /// Expiry checked, no required claims, nothing requested
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the expiry check on or off
    #[must_use]
    pub fn check_expiry(mut self, check_expiry: bool) -> Self {
        self.check_expiry = check_expiry;
        self
    }

    /// Require `name` to hold exactly `value`
    #[must_use]
    pub fn require(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.required_claims.insert(name, value);
        self
    }

    /// Replace the required claims
    #[must_use]
    pub fn required_claims(mut self, claims: ClaimSet) -> Self {
        self.required_claims = claims;
        self
    }

    /// Return the value of `name` on success
    #[must_use]
    pub fn requested_claim(mut self, name: impl Into<String>) -> Self {
        self.requested_claim = Some(name.into());
        self
    }

    /// Whether expiry is checked
    #[must_use]
    pub fn expiry_checked(&self) -> bool {
        self.check_expiry
    }

    /// Claims that must match exactly
    #[must_use]
    pub fn required(&self) -> &ClaimSet {
        &self.required_claims
    }

    /// Claim returned on success
    #[must_use]
    pub fn requested(&self) -> Option<&str> {
        self.requested_claim.as_deref()
    }
}

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// `exp` is at or before now
    Expired,
    /// Bad signature, or header algorithm differs from the context's
    SignatureInvalid,
    /// `iss` differs from the expected issuer
    IssuerMismatch {
        /// Expected issuer
        expected: String,
        /// Issuer in the token
        found: Option<String>,
    },
    /// Named required claim missing or different
    ClaimMismatch(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        JwtError::from(self.clone()).fmt(f)
    }
}

impl From<Rejection> for JwtError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Expired => JwtError::Expired,
            Rejection::SignatureInvalid => JwtError::SignatureInvalid,
            Rejection::IssuerMismatch { expected, found } => {
                JwtError::IssuerMismatch { expected, found }
            }
            Rejection::ClaimMismatch(name) => JwtError::ClaimMismatch(name),
        }
    }
}

/// Payload of an accepted outcome
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptedValue {
    /// No claim was requested
    Valid,
    /// Value of the requested claim, `None` if the token does not carry it
    Claim(Option<Value>),
}

/// Terminal state of a validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Every check passed
    Accepted(AcceptedValue),
    /// First failing check
    Rejected(Rejection),
}

impl ValidationOutcome {
    /// Whether every check passed
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }

    /// Requested claim value of an accepted outcome
    #[must_use]
    pub fn claim(&self) -> Option<&Value> {
        match self {
            ValidationOutcome::Accepted(AcceptedValue::Claim(value)) => value.as_ref(),
            _ => None,
        }
    }

    /// Failing check of a rejected outcome
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ValidationOutcome::Rejected(rejection) => Some(rejection),
            ValidationOutcome::Accepted(_) => None,
        }
    }

    /// Accepted value, or the rejection as an error
    ///
    /// # Errors
    /// Returns the `JwtError` matching the rejection.
    pub fn into_result(self) -> JwtResult<AcceptedValue> {
        match self {
            ValidationOutcome::Accepted(value) => Ok(value),
            ValidationOutcome::Rejected(rejection) => Err(rejection.into()),
        }
    }
}

/// Validates parsed tokens against a signing context
#[derive(Debug, Clone, Copy)]
pub struct TokenValidator<'a> {
    context: &'a SigningContext,
}

impl<'a> TokenValidator<'a> {
    /// Validator for tokens signed under `context`
    #[must_use]
    pub fn new(context: &'a SigningContext) -> Self {
        Self { context }
    }

    /// Run every check against `token` at instant `now`
    #[must_use]
    pub fn validate(
        &self,
        token: &Token,
        issuer: &str,
        request: &ValidationRequest,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        match self.check(token, issuer, request, now) {
            Ok(value) => {
                debug!(algorithm = %token.algorithm(), "token accepted");
                ValidationOutcome::Accepted(value)
            }
            Err(rejection) => {
                warn!(reason = %rejection, "token rejected");
                ValidationOutcome::Rejected(rejection)
            }
        }
    }

    fn check(
        &self,
        token: &Token,
        issuer: &str,
        request: &ValidationRequest,
        now: DateTime<Utc>,
    ) -> Result<AcceptedValue, Rejection> {
        if request.check_expiry && token.is_expired(now) {
            return Err(Rejection::Expired);
        }

        if !self.signature_valid(token) {
            return Err(Rejection::SignatureInvalid);
        }

        let claims = token.claims();
        if claims.issuer() != Some(issuer) {
            return Err(Rejection::IssuerMismatch {
                expected: issuer.to_string(),
                found: claims.issuer().map(str::to_string),
            });
        }

        for (name, expected) in &request.required_claims {
            if claims.get(name) != Some(expected) {
                return Err(Rejection::ClaimMismatch(name.clone()));
            }
        }

        Ok(match &request.requested_claim {
            Some(name) => AcceptedValue::Claim(claims.get(name).cloned()),
            None => AcceptedValue::Valid,
        })
    }

    /// The header algorithm must equal the context's; the context's
    /// algorithm and key then decide.
    fn signature_valid(&self, token: &Token) -> bool {
        if token.algorithm() != self.context.algorithm() {
            debug!(
                header = %token.algorithm(),
                expected = %self.context.algorithm(),
                "header algorithm does not match signing context"
            );
            return false;
        }
        self.context
            .verify(token.signing_input().as_bytes(), token.signature())
            .unwrap_or(false)
    }
}
