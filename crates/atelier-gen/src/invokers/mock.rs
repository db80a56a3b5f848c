//! Mock invoker for testing and offline use
//!
//! Serves scripted responses per capability without any network calls.
//! When a capability's script queue is empty, a placeholder success
//! response is synthesized so the pipeline can run end-to-end offline.

use crate::invoker::{
    encode_bytes, CapabilityInvoker, SchemaDirection, CAP_IMAGE_TO_3D, CAP_TEXT_TO_IMAGE,
};
use atelier_core::{AtelierError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Scripted = std::result::Result<serde_json::Value, String>;

#[derive(Default)]
struct Inner {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

/// An invoker that serves scripted or placeholder responses locally.
///
/// Clones share state, so a test can keep a handle for scripting and
/// inspection after handing a clone to the pipeline.
#[derive(Clone, Default)]
pub struct MockInvoker {
    inner: Arc<Inner>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call to `capability`
    pub fn enqueue_response(&self, capability: &str, response: serde_json::Value) {
        self.inner
            .scripts
            .lock()
            .unwrap()
            .entry(capability.to_string())
            .or_default()
            .push_back(Ok(response));
    }

    /// Queue a failure for the next call to `capability`
    pub fn enqueue_failure(&self, capability: &str, message: &str) {
        self.inner
            .scripts
            .lock()
            .unwrap()
            .entry(capability.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Capability ids of every call made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// The request payload of the nth call
    pub fn request_at(&self, index: usize) -> Option<serde_json::Value> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .get(index)
            .map(|(_, r)| r.clone())
    }

    fn placeholder_response(capability: &str) -> Result<serde_json::Value> {
        match capability {
            CAP_TEXT_TO_IMAGE => Ok(serde_json::json!({
                "result": encode_bytes(b"placeholder png bytes"),
            })),
            CAP_IMAGE_TO_3D => Ok(serde_json::json!({
                "generated_object": encode_bytes(b"placeholder glb bytes"),
                "video_object": "",
            })),
            _ => Err(AtelierError::UnknownCapability(capability.to_string())),
        }
    }
}

impl CapabilityInvoker for MockInvoker {
    fn name(&self) -> &str {
        "mock"
    }

    fn schema(&self, capability: &str, direction: SchemaDirection) -> Result<serde_json::Value> {
        let fields = match (capability, direction) {
            (CAP_TEXT_TO_IMAGE, SchemaDirection::Input) => vec![
                "prompt",
                "negative_prompt",
                "width",
                "height",
                "guidance_scale",
                "num_inference_steps",
            ],
            (CAP_TEXT_TO_IMAGE, SchemaDirection::Output) => vec!["result"],
            (CAP_IMAGE_TO_3D, SchemaDirection::Input) => vec!["input_image"],
            (CAP_IMAGE_TO_3D, SchemaDirection::Output) => {
                vec!["generated_object", "video_object"]
            }
            _ => return Err(AtelierError::UnknownCapability(capability.to_string())),
        };
        Ok(serde_json::json!({"type": "object", "fields": fields}))
    }

    fn call(
        &self,
        capability: &str,
        request: &serde_json::Value,
        _caller_id: &str,
    ) -> Result<serde_json::Value> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push((capability.to_string(), request.clone()));

        let scripted = self
            .inner
            .scripts
            .lock()
            .unwrap()
            .get_mut(capability)
            .and_then(|q| q.pop_front());

        match scripted {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(AtelierError::RemoteService(message)),
            None => Self::placeholder_response(capability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::binary_field;

    #[test]
    fn test_placeholder_responses() {
        let mock = MockInvoker::new();
        let request = serde_json::json!({"prompt": "a chair"});

        let response = mock.call(CAP_TEXT_TO_IMAGE, &request, "super-user").unwrap();
        let bytes = binary_field(&response, "result").unwrap();
        assert_eq!(bytes, b"placeholder png bytes");
    }

    #[test]
    fn test_scripted_responses_served_in_order() {
        let mock = MockInvoker::new();
        mock.enqueue_failure(CAP_IMAGE_TO_3D, "timeout");
        mock.enqueue_response(
            CAP_IMAGE_TO_3D,
            serde_json::json!({"generated_object": encode_bytes(b"glb")}),
        );

        let request = serde_json::json!({"input_image": "aGk="});
        let first = mock.call(CAP_IMAGE_TO_3D, &request, "super-user");
        assert!(first.is_err());

        let second = mock.call(CAP_IMAGE_TO_3D, &request, "super-user").unwrap();
        assert_eq!(binary_field(&second, "generated_object").unwrap(), b"glb");
    }

    #[test]
    fn test_call_log_shared_across_clones() {
        let mock = MockInvoker::new();
        let clone = mock.clone();

        let request = serde_json::json!({"prompt": "a chair"});
        clone.call(CAP_TEXT_TO_IMAGE, &request, "super-user").unwrap();

        assert_eq!(mock.calls(), vec![CAP_TEXT_TO_IMAGE.to_string()]);
        assert_eq!(mock.request_at(0).unwrap()["prompt"], "a chair");
    }

    #[test]
    fn test_unknown_capability_rejected() {
        let mock = MockInvoker::new();
        let err = mock
            .call("text_to_sound", &serde_json::json!({}), "super-user")
            .unwrap_err();
        assert!(matches!(err, AtelierError::UnknownCapability(_)));
    }

    #[test]
    fn test_schema_descriptors() {
        let mock = MockInvoker::new();
        let schema = mock.schema(CAP_IMAGE_TO_3D, SchemaDirection::Input).unwrap();
        assert_eq!(schema["fields"][0], "input_image");
    }
}
