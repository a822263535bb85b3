//! # Sphinx Common
//!
//! Shared types, errors, and constants used across Sphinx components.
//!
//! ## Modules
//! - `types` - Core identifiers (ClientId, TokenId, Stage)
//! - `error` - Common error types
//! - `constants` - Shared defaults, paths, and header names

pub mod constants;
pub mod error;
pub mod types;

pub use error::SphinxError;
pub use types::*;
