//! Shared utilities, configuration, and error handling for AreaPod
//!
//! This crate provides common functionality used across the AreaPod tools:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Case-insensitive identifier sets for account logins

pub mod config;
pub mod error;
pub mod identifier;

pub use config::Config;
pub use error::{Error, Result};
pub use identifier::{normalize_identifier, IdentifierSet};
