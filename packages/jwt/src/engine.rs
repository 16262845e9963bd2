//! Token engine
//!
//! Binds a configuration, an issuer identity, a clock and a resolved
//! [`SigningContext`] into one immutable value. Build it once at startup and
//! share it; every method takes `&self`.

use crate::api::builder::TokenBuilder;
use crate::api::keys::{FileKeyProvider, KeyMaterialResolver, KeyProvider, SigningContext};
use crate::api::parser::TokenParser;
use crate::api::validation::{TokenValidator, ValidationOutcome, ValidationRequest};
use crate::claims::ClaimSet;
use crate::clock::SystemClock;
use crate::config::JwtConfig;
use crate::error::{JwtError, JwtResult};
use crate::traits::Clock;
use crate::types::{SignedToken, Token};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokenward_common::LoggingTransformer;
use tracing::{debug, info};

/// Issues, parses and validates tokens for one issuer
#[derive(Clone)]
pub struct JwtEngine {
    config: JwtConfig,
    issuer: String,
    context: SigningContext,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEngine")
            .field("issuer", &self.issuer)
            .field("context", &self.context)
            .field("expire_time", &self.config.expire_time)
            .finish_non_exhaustive()
    }
}

impl JwtEngine {
    /// Start building an engine from `config`
    #[must_use]
    pub fn builder(config: JwtConfig) -> JwtEngineBuilder {
        JwtEngineBuilder {
            config,
            issuer: None,
            clock: None,
            key_provider: None,
        }
    }

    /// Issue a token carrying `claims`, expiring after the configured TTL
    ///
    /// # Errors
    /// Returns `JwtError::ReservedClaimConflict` when a claim uses a
    /// registered name, `JwtError::InvalidTtl` when the expiry is out of
    /// range, and signing errors from the context.
    pub fn issue(&self, claims: &ClaimSet) -> JwtResult<SignedToken> {
        let now = self.clock.now();
        let expires_at = self.config.expire_time.resolve(now)?;
        self.sign(TokenBuilder::new(&self.issuer, now, expires_at).claims(claims))
    }

    /// Issue a token carrying `claims` that expires at `expires_at`
    ///
    /// # Errors
    /// As [`Self::issue`], plus `JwtError::InvalidExpiry` when `expires_at`
    /// is before the current time.
    pub fn issue_until(&self, claims: &ClaimSet, expires_at: DateTime<Utc>) -> JwtResult<SignedToken> {
        let now = self.clock.now();
        self.sign(TokenBuilder::new(&self.issuer, now, expires_at).claims(claims))
    }

    /// Builder preset with this engine's issuer, current time and TTL
    ///
    /// Finish it with [`TokenBuilder::sign`] and [`Self::context`].
    ///
    /// # Errors
    /// Returns `JwtError::InvalidTtl` when the expiry is out of range.
    pub fn token_builder(&self) -> JwtResult<TokenBuilder> {
        let now = self.clock.now();
        let expires_at = self.config.expire_time.resolve(now)?;
        Ok(TokenBuilder::new(&self.issuer, now, expires_at))
    }

    fn sign(&self, builder: TokenBuilder) -> JwtResult<SignedToken> {
        match builder.sign(&self.context) {
            Ok(signed) => {
                LoggingTransformer::log_token_event(
                    "issue",
                    signed.token().claims().subject(),
                    true,
                );
                Ok(signed)
            }
            Err(error) => {
                if matches!(error, JwtError::KeyMaterial(_) | JwtError::Signing(_)) {
                    LoggingTransformer::log_crypto_error("sign", &error);
                }
                Err(error)
            }
        }
    }

    /// Decode a compact token without checking its signature
    ///
    /// # Errors
    /// Returns `JwtError::MalformedToken` for structurally invalid input.
    pub fn parse(&self, compact: &str) -> JwtResult<Token> {
        TokenParser::parse(compact)
    }

    /// Validate a parsed token against this engine's issuer and keys
    #[must_use]
    pub fn validate(&self, token: &Token, request: &ValidationRequest) -> ValidationOutcome {
        let outcome =
            TokenValidator::new(&self.context).validate(token, &self.issuer, request, self.clock.now());
        LoggingTransformer::log_token_event(
            "validation",
            token.claims().subject(),
            outcome.is_accepted(),
        );
        outcome
    }

    /// Parse then validate
    ///
    /// # Errors
    /// Returns `JwtError::MalformedToken` when `compact` cannot be parsed;
    /// every validation failure is reported in the outcome instead.
    pub fn validate_compact(&self, compact: &str, request: &ValidationRequest) -> JwtResult<ValidationOutcome> {
        let token = self.parse(compact)?;
        Ok(self.validate(&token, request))
    }

    /// Whether `token` has expired by this engine's clock
    #[must_use]
    pub fn is_expired(&self, token: &Token) -> bool {
        token.is_expired(self.clock.now())
    }

    /// Resolved signing context
    #[must_use]
    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    /// Issuer written into and expected from every token
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Configuration the engine was built from
    #[must_use]
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

/// Builder for [`JwtEngine`]
pub struct JwtEngineBuilder {
    config: JwtConfig,
    issuer: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    key_provider: Option<Arc<dyn KeyProvider>>,
}

impl JwtEngineBuilder {
    /// Issuer identity; required
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Time source, [`SystemClock`] by default
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Key source, [`FileKeyProvider`] by default
    #[must_use]
    pub fn key_provider(mut self, provider: Arc<dyn KeyProvider>) -> Self {
        self.key_provider = Some(provider);
        self
    }

    /// Resolve keys and build the engine
    ///
    /// # Errors
    /// Returns `JwtError::Configuration` without an issuer,
    /// `JwtError::UnsupportedAlgorithm` for an unknown algorithm name and
    /// `JwtError::KeyMaterial` when configured keys cannot be used.
    pub fn build(self) -> JwtResult<JwtEngine> {
        let issuer = self
            .issuer
            .filter(|issuer| !issuer.is_empty())
            .ok_or_else(|| JwtError::Configuration("issuer must not be empty".to_string()))?;
        let provider = self
            .key_provider
            .unwrap_or_else(|| Arc::new(FileKeyProvider));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let context = KeyMaterialResolver::new(provider.as_ref())
            .resolve(
                &self.config.algorithm,
                self.config.private_key.as_deref(),
                self.config.public_key.as_deref(),
            )
            .inspect_err(|error| debug!(%error, "signing context rejected"))?;

        info!(
            issuer = %issuer,
            algorithm = %context.algorithm(),
            ephemeral = context.is_ephemeral(),
            fingerprint = context.fingerprint(),
            expire_time = %self.config.expire_time,
            "token engine ready"
        );

        Ok(JwtEngine {
            config: self.config,
            issuer,
            context,
            clock,
        })
    }
}
