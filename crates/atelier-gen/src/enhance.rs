//! Prompt enhancement via the text-generation backend
//!
//! Sends the raw user idea to the configured text-generation endpoint and
//! returns an enriched description. Never fails past its own boundary: any
//! transport error, non-200 response or malformed body falls back to a
//! locally assembled enhancement, so the caller always receives text.

use crate::config::AtelierConfig;
use atelier_core::{AtelierError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT_SECS: u64 = 60;

const ART_STYLES: [&str; 4] = ["cinematic", "fantasy art", "photorealistic", "digital painting"];
const LIGHTING: [&str; 4] = [
    "dramatic lighting",
    "golden hour sunlight",
    "soft ambient light",
    "moody shadows",
];
const DETAILS: [&str; 4] = [
    "intricate details",
    "high resolution",
    "textured surfaces",
    "vibrant colors",
];

/// Client for the prompt-enhancement backend
pub struct PromptEnhancer {
    endpoint: String,
    model: String,
    rng: StdRng,
}

impl PromptEnhancer {
    /// Create an enhancer with OS-seeded fallback randomness
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an enhancer with a fixed fallback seed (for deterministic tests)
    pub fn with_seed(endpoint: impl Into<String>, model: impl Into<String>, seed: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create an enhancer from resolved configuration
    pub fn from_config(config: &AtelierConfig) -> Self {
        Self::new(&config.enhancer_endpoint, &config.enhancer_model)
    }

    /// Enhance a user prompt.
    ///
    /// Always returns non-empty text: remote failures are absorbed into the
    /// local fallback.
    pub fn enhance(&mut self, user_prompt: &str) -> String {
        match self.request_enhancement(user_prompt) {
            Ok(text) => {
                info!("prompt enhanced by backend");
                text
            }
            Err(e) => {
                warn!("enhancement backend failed ({}), using local fallback", e);
                self.fallback_enhance(user_prompt)
            }
        }
    }

    fn request_enhancement(&self, user_prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "prompt": build_instruction(user_prompt),
            "stream": false,
        });

        debug!(endpoint = %self.endpoint, "requesting prompt enhancement");
        let agent = build_agent();
        let mut response = agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send_json(&payload)
            .map_err(|e| AtelierError::RemoteService(format!("Enhancement request failed: {}", e)))?;

        let body: serde_json::Value = response.body_mut().read_json().map_err(|e| {
            AtelierError::RemoteService(format!("Failed to parse enhancement response: {}", e))
        })?;

        extract_response_text(&body)
    }

    /// Assemble an enhanced prompt locally from fixed descriptor sets
    fn fallback_enhance(&mut self, user_prompt: &str) -> String {
        let style = ART_STYLES.choose(&mut self.rng).unwrap_or(&ART_STYLES[0]);
        let light = LIGHTING.choose(&mut self.rng).unwrap_or(&LIGHTING[0]);
        let detail = DETAILS.choose(&mut self.rng).unwrap_or(&DETAILS[0]);

        let enhanced = format!(
            "{}, {}, {}, {}, masterfully crafted, 8k resolution",
            user_prompt, style, light, detail
        );
        info!("using fallback enhancement: {}", enhanced);
        enhanced
    }
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

/// The fixed instruction template sent to the backend. Embeds the user
/// prompt verbatim; mandates a rich visual description, core idea intact,
/// at most 200 words, no meta-commentary.
fn build_instruction(user_prompt: &str) -> String {
    format!(
        "You are an artistic prompt enhancer. Your job is to take simple user requests \
         and transform them into detailed, vivid descriptions for image and 3D generation. \
         Include artistic style, lighting, mood, colors, perspective, and detailed elements. \
         Make it specific and visual but keep the core idea intact. Format your response as \
         a rich text description without any explanations or additional content in maximum \
         200 words.\n\nTransform this prompt for image generation:\nUser Request: {}\n\n\
         Include every detail of user request in the response.",
        user_prompt
    )
}

/// Pull the generated text out of a backend response body
pub fn extract_response_text(body: &serde_json::Value) -> Result<String> {
    body.get("response")
        .and_then(|r| r.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            AtelierError::RemoteService("No response text in enhancement body".to_string())
        })
}
