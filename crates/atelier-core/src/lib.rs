//! Atelier Core - Foundational types for the Atelier pipeline
//!
//! This crate provides the error type and Result alias that all other
//! Atelier crates depend on.

mod error;

pub use error::{AtelierError, Result};

/// Default user identifier assigned when the caller supplies none.
pub const DEFAULT_USER_ID: &str = "super-user";
