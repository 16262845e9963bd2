//! Common infrastructure shared by the tokenward crates
//!
//! Currently this is the logging layer: `env_logger` initialisation and helpers
//! that log security events without leaking key material or identities.

pub mod logging;

pub use logging::LoggingTransformer;
