//! Token lifecycle API
//!
//! Leaf-first: algorithms and keys produce a [`SigningContext`], the builder
//! signs tokens with it, the parser decodes compact tokens and the validator
//! checks them against the same context.

pub mod algorithms;
pub mod builder;
pub mod keys;
pub mod parser;
pub mod validation;

pub use algorithms::{Algorithm, AlgorithmFamily, AlgorithmRegistry};
pub use builder::{TokenBuilder, issue};
pub use keys::{
    FileKeyProvider, KeyMaterialResolver, KeyProvider, SigningContext, StaticKeyProvider,
};
pub use parser::TokenParser;
pub use validation::{
    AcceptedValue, Rejection, TokenValidator, ValidationOutcome, ValidationRequest,
};
