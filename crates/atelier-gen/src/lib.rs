//! Atelier Gen - multi-stage creative generation pipeline
//!
//! Turns a short natural-language idea into a persisted set of generated
//! artifacts (enhanced prompt, image, 3D model/video) by chaining calls to
//! external generation capabilities, with partial-failure recovery and a
//! degraded fallback for 3D generation.

pub mod artifacts;
pub mod config;
pub mod enhance;
pub mod environment;
pub mod invoker;
pub mod invokers;
pub mod pipeline;
pub mod tags;

pub use artifacts::ArtifactStore;
pub use config::AtelierConfig;
pub use enhance::PromptEnhancer;
pub use environment::Environment;
pub use invoker::{CapabilityInvoker, SchemaDirection, CAP_IMAGE_TO_3D, CAP_TEXT_TO_IMAGE};
pub use pipeline::{CreativePipeline, PipelineResult, PipelineSuccess};
pub use tags::extract_tags;
