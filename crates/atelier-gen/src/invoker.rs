//! Capability invoker trait and wire helpers
//!
//! A capability is a remote generation service identified by an opaque id,
//! invoked with a structured request and returning a structured response.
//! Invokers report failures as `RemoteService` errors and apply no fallback
//! logic of their own; routing around failures is the pipeline's job.

use atelier_core::{AtelierError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Capability id for text-to-image generation
pub const CAP_TEXT_TO_IMAGE: &str = "text_to_image";
/// Capability id for image-to-3D generation
pub const CAP_IMAGE_TO_3D: &str = "image_to_3d";

/// Which side of a capability's schema to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDirection {
    Input,
    Output,
}

impl SchemaDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaDirection::Input => "input",
            SchemaDirection::Output => "output",
        }
    }
}

/// Trait implemented by each capability invoker (http, mock)
pub trait CapabilityInvoker: Send {
    /// Invoker name (e.g. "http", "mock")
    fn name(&self) -> &str;

    /// Fetch the request or response schema descriptor for a capability
    fn schema(&self, capability: &str, direction: SchemaDirection) -> Result<serde_json::Value>;

    /// Call a capability with a structured request on behalf of a caller
    fn call(
        &self,
        capability: &str,
        request: &serde_json::Value,
        caller_id: &str,
    ) -> Result<serde_json::Value>;
}

/// Base64-encode binary data for embedding in a JSON request
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Extract a required binary field from a response mapping.
///
/// Binary payloads travel base64-encoded inside the JSON body. A missing,
/// null, empty or undecodable field is a remote-service failure.
pub fn binary_field(response: &serde_json::Value, field: &str) -> Result<Vec<u8>> {
    let encoded = response
        .get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AtelierError::RemoteService(format!("No '{}' data in response", field))
        })?;

    STANDARD.decode(encoded).map_err(|e| {
        AtelierError::RemoteService(format!("Field '{}' is not valid base64: {}", field, e))
    })
}

/// Extract an optional binary field: absent, null or empty means "not produced"
pub fn optional_binary_field(
    response: &serde_json::Value,
    field: &str,
) -> Result<Option<Vec<u8>>> {
    match response.get(field).and_then(|v| v.as_str()) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(encoded) => STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|e| {
                AtelierError::RemoteService(format!("Field '{}' is not valid base64: {}", field, e))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_field_roundtrip() {
        let response = serde_json::json!({"result": encode_bytes(b"image bytes")});
        let bytes = binary_field(&response, "result").unwrap();
        assert_eq!(bytes, b"image bytes");
    }

    #[test]
    fn test_binary_field_missing() {
        let response = serde_json::json!({});
        let err = binary_field(&response, "result").unwrap_err();
        assert!(err.is_remote());
    }

    #[test]
    fn test_binary_field_empty() {
        let response = serde_json::json!({"result": ""});
        assert!(binary_field(&response, "result").is_err());
    }

    #[test]
    fn test_binary_field_invalid_base64() {
        let response = serde_json::json!({"result": "!!not-base64!!"});
        assert!(binary_field(&response, "result").is_err());
    }

    #[test]
    fn test_optional_binary_field_absent_and_empty() {
        let absent = serde_json::json!({"generated_object": "eHl6"});
        assert!(optional_binary_field(&absent, "video_object").unwrap().is_none());

        let empty = serde_json::json!({"video_object": ""});
        assert!(optional_binary_field(&empty, "video_object").unwrap().is_none());
    }

    #[test]
    fn test_optional_binary_field_present() {
        let response = serde_json::json!({"video_object": encode_bytes(b"mp4 bytes")});
        let bytes = optional_binary_field(&response, "video_object").unwrap();
        assert_eq!(bytes.unwrap(), b"mp4 bytes");
    }
}
