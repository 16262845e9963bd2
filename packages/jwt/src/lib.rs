//! Signed JSON Web Tokens: issue, parse, validate
//!
//! - HS256/384/512, RS256/384/512 and ES256/384/512
//! - Keys from files or memory, PEM or DER, checked once at startup
//! - Validation in a fixed order with an explicit [`ValidationOutcome`]
//! - Injected clock and issuer identity
//!
//! ```no_run
//! use tokenward_jwt::{ClaimSet, JwtConfig, JwtEngine, ValidationRequest};
//!
//! # fn main() -> tokenward_jwt::JwtResult<()> {
//! let config = JwtConfig::default().with_keys("keys/private.pem", "keys/public.pem");
//! let engine = JwtEngine::builder(config).issuer("https://a.example/").build()?;
//!
//! let signed = engine.issue(&ClaimSet::new().with("uid", "abc123"))?;
//! let outcome = engine.validate_compact(
//!     signed.compact().as_str(),
//!     &ValidationRequest::new().requested_claim("uid"),
//! )?;
//! assert_eq!(outcome.claim().and_then(|v| v.as_str()), Some("abc123"));
//! # Ok(())
//! # }
//! ```
//!
//! When no key pair is configured the engine signs with a random HS256
//! secret generated at startup, whatever `algorithm` says. Tokens from such
//! an engine only validate against that same engine instance.

pub mod api;
pub mod claims;
pub mod clock;
pub mod config;
pub mod engine;
mod error;
pub mod traits;
mod types;

pub use api::{
    AcceptedValue, Algorithm, AlgorithmFamily, AlgorithmRegistry, FileKeyProvider,
    KeyMaterialResolver, KeyProvider, Rejection, SigningContext, StaticKeyProvider, TokenBuilder,
    TokenParser, TokenValidator, ValidationOutcome, ValidationRequest,
};
pub use claims::{ClaimSet, Claims, RegisteredClaims};
pub use clock::{FixedClock, SystemClock};
pub use config::{JwtConfig, Ttl};
pub use engine::{JwtEngine, JwtEngineBuilder};
pub use error::*;
pub use traits::{Clock, Signer};
pub use types::*;
