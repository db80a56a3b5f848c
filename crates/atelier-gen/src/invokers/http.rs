//! HTTP capability invoker
//!
//! Calls remote generation services over JSON HTTP. Each capability id maps
//! to a configured base URL: requests POST to `{base}/execution`, schema
//! descriptors GET from `{base}/schema?type=input|output`. The caller
//! identity is forwarded as a header.

use crate::config::AtelierConfig;
use crate::invoker::{CapabilityInvoker, SchemaDirection, CAP_IMAGE_TO_3D, CAP_TEXT_TO_IMAGE};
use atelier_core::{AtelierError, Result};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 300;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

const CALLER_HEADER: &str = "X-Caller-Id";

/// Invoker that reaches capabilities over HTTP
pub struct HttpInvoker {
    endpoints: HashMap<String, String>,
}

impl HttpInvoker {
    /// Create an HttpInvoker from config; every known capability needs a URL
    pub fn from_config(config: &AtelierConfig) -> Result<Self> {
        let mut endpoints = HashMap::new();
        for capability in [CAP_TEXT_TO_IMAGE, CAP_IMAGE_TO_3D] {
            let url = config.capability_url(capability).ok_or_else(|| {
                AtelierError::Config(format!(
                    "No URL configured for capability '{}'. Add it to .atelier/config.toml",
                    capability
                ))
            })?;
            endpoints.insert(capability.to_string(), url.trim_end_matches('/').to_string());
        }
        Ok(Self { endpoints })
    }

    fn endpoint(&self, capability: &str) -> Result<&str> {
        self.endpoints
            .get(capability)
            .map(|s| s.as_str())
            .ok_or_else(|| AtelierError::UnknownCapability(capability.to_string()))
    }

    fn post_json_with_retry(
        &self,
        url: &str,
        payload: &serde_json::Value,
        caller_id: &str,
    ) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .post(url)
                .header("Content-Type", "application/json")
                .header(CALLER_HEADER, caller_id)
                .send_json(payload);

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        AtelierError::RemoteService(format!(
                            "Failed to parse capability response: {}",
                            e
                        ))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(AtelierError::RemoteService(format!(
                        "Capability request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(AtelierError::RemoteService(
            "Capability request failed after retries".to_string(),
        ))
    }

    fn get_json_with_retry(&self, url: &str) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent.get(url).call();

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        AtelierError::RemoteService(format!(
                            "Failed to parse schema response: {}",
                            e
                        ))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(AtelierError::RemoteService(format!(
                        "Schema request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(AtelierError::RemoteService(
            "Schema request failed after retries".to_string(),
        ))
    }
}

impl CapabilityInvoker for HttpInvoker {
    fn name(&self) -> &str {
        "http"
    }

    fn schema(&self, capability: &str, direction: SchemaDirection) -> Result<serde_json::Value> {
        let base = self.endpoint(capability)?;
        let url = format!("{}/schema?type={}", base, direction.as_str());
        debug!(capability, direction = direction.as_str(), "fetching schema");
        self.get_json_with_retry(&url)
    }

    fn call(
        &self,
        capability: &str,
        request: &serde_json::Value,
        caller_id: &str,
    ) -> Result<serde_json::Value> {
        let base = self.endpoint(capability)?;
        let url = format!("{}/execution", base);
        debug!(capability, caller_id, "invoking capability");

        let response = self.post_json_with_retry(&url, request, caller_id)?;

        if response.is_null() || response.as_object().is_some_and(|o| o.is_empty()) {
            return Err(AtelierError::RemoteService(format!(
                "Empty response from capability '{}'",
                capability
            )));
        }

        Ok(response)
    }
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}
