//! Invoker registry
//!
//! Maps invoker names to concrete implementations.

pub mod http;
pub mod mock;

use crate::config::AtelierConfig;
use crate::invoker::CapabilityInvoker;
use atelier_core::{AtelierError, Result};

/// Create an invoker by name with configuration
pub fn create_invoker(name: &str, config: &AtelierConfig) -> Result<Box<dyn CapabilityInvoker>> {
    match name {
        "mock" => Ok(Box::new(mock::MockInvoker::new())),
        "http" => Ok(Box::new(http::HttpInvoker::from_config(config)?)),
        _ => Err(AtelierError::Config(format!(
            "Unknown invoker '{}'. Available: http, mock",
            name
        ))),
    }
}

/// List all available invoker names
pub fn available_invokers() -> Vec<&'static str> {
    vec!["http", "mock"]
}
