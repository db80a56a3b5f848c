//! Creative pipeline orchestration
//!
//! Composes prompt enhancement, image generation, 3D model generation (with
//! a degraded fallback), tag extraction and memory writes into one ordered,
//! partial-failure-tolerant sequence. Remote failures in the generation
//! stages are recovered into the run's error list so downstream persistence
//! still happens; only unexpected faults (artifact writes, ledger inserts)
//! abort the run.

use crate::artifacts::ArtifactStore;
use crate::config::AtelierConfig;
use crate::enhance::PromptEnhancer;
use crate::invoker::{
    binary_field, encode_bytes, optional_binary_field, CapabilityInvoker, SchemaDirection,
    CAP_IMAGE_TO_3D, CAP_TEXT_TO_IMAGE,
};
use crate::invokers;
use crate::tags::extract_tags;
use atelier_core::Result;
use atelier_memory::{
    CreationLedger, NewCreation, SessionStore, KEY_LAST_ENHANCED_PROMPT, KEY_LAST_IMAGE_PATH,
    KEY_LAST_MODEL_PATH, KEY_LAST_PROMPT,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

const STAGE_IMAGE: &str = "image_generation";
const STAGE_MODEL: &str = "model_generation";
/// Stage label reported when the whole run aborts on an unexpected fault
const STAGE_PIPELINE: &str = "pipeline_process";

const NEGATIVE_PROMPT: &str = "blurry, distorted, low quality, draft";
const IMAGE_WIDTH: u32 = 1024;
const IMAGE_HEIGHT: u32 = 1024;
const GUIDANCE_SCALE: f64 = 7.5;
const INFERENCE_STEPS: u32 = 50;

/// Result of one pipeline run
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PipelineResult {
    Success(PipelineSuccess),
    Failure {
        error: String,
        stage: String,
        original_prompt: String,
    },
}

/// The success shape: what was generated and how far each stage got
#[derive(Debug, Serialize)]
pub struct PipelineSuccess {
    pub creation_id: i64,
    pub original_prompt: String,
    pub enhanced_prompt: String,
    pub image_path: Option<String>,
    pub model_path: Option<String>,
    pub video_path: Option<String>,
    pub tags: Vec<String>,
    pub stages_completed: Vec<String>,
    pub errors: Vec<String>,
}

/// Per-stage outcome, used to build the run's completed/error lists
#[derive(Debug)]
enum StageOutcome {
    Succeeded,
    FallbackSucceeded,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Default)]
struct StageLog {
    stages_completed: Vec<String>,
    errors: Vec<String>,
}

impl StageLog {
    fn record(&mut self, stage: &str, outcome: StageOutcome) {
        match outcome {
            StageOutcome::Succeeded => self.stages_completed.push(stage.to_string()),
            StageOutcome::FallbackSucceeded => {
                self.stages_completed.push(format!("{}_fallback", stage))
            }
            StageOutcome::Failed(reason) => self.errors.push(reason),
            StageOutcome::Skipped(cause) => self.errors.push(cause),
        }
    }
}

/// End-to-end pipeline: prompt in, persisted creation out.
///
/// An explicit context object constructed once per process (or per request);
/// there is no global pipeline state.
pub struct CreativePipeline {
    invoker: Box<dyn CapabilityInvoker>,
    enhancer: PromptEnhancer,
    ledger: CreationLedger,
    sessions: SessionStore,
    artifacts: ArtifactStore,
}

impl CreativePipeline {
    /// Assemble a pipeline from its parts and prepare the output directories
    pub fn new(
        invoker: Box<dyn CapabilityInvoker>,
        enhancer: PromptEnhancer,
        ledger: CreationLedger,
        artifacts: ArtifactStore,
    ) -> Result<Self> {
        artifacts.ensure_layout()?;
        Ok(Self {
            invoker,
            enhancer,
            ledger,
            sessions: SessionStore::new(),
            artifacts,
        })
    }

    /// Build a pipeline from resolved configuration
    pub fn from_config(config: &AtelierConfig) -> Result<Self> {
        let invoker = invokers::create_invoker(&config.pipeline.invoker, config)?;
        let enhancer = PromptEnhancer::from_config(config);
        let ledger = CreationLedger::open(&config.pipeline.db_path)?;
        let artifacts = ArtifactStore::new(&config.pipeline.output_dir);
        Self::new(invoker, enhancer, ledger, artifacts)
    }

    /// Durable creation history
    pub fn ledger(&self) -> &CreationLedger {
        &self.ledger
    }

    /// Session-scoped last-result cache (read side)
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run the full pipeline for one prompt.
    ///
    /// The caller always receives a result value, never a raw transport
    /// error: generation failures are folded into the success shape's error
    /// list, and only unexpected faults produce the failure shape.
    pub fn process(&mut self, user_prompt: &str, user_id: &str) -> PipelineResult {
        match self.run(user_prompt, user_id) {
            Ok(success) => {
                info!(creation_id = success.creation_id, "pipeline completed");
                PipelineResult::Success(success)
            }
            Err(e) => {
                error!("pipeline error: {}", e);
                PipelineResult::Failure {
                    error: e.to_string(),
                    stage: STAGE_PIPELINE.to_string(),
                    original_prompt: user_prompt.to_string(),
                }
            }
        }
    }

    fn run(&mut self, user_prompt: &str, user_id: &str) -> Result<PipelineSuccess> {
        let mut log = StageLog::default();

        info!("stage 1: enhancing prompt");
        let enhanced_prompt = self.enhancer.enhance(user_prompt);

        info!("stage 2: generating image");
        let mut image: Option<(Vec<u8>, PathBuf)> = None;
        match self.generate_image(&enhanced_prompt, user_id) {
            Ok(generated) => {
                log.record(STAGE_IMAGE, StageOutcome::Succeeded);
                image = Some(generated);
            }
            Err(e) if e.is_remote() => {
                warn!("image generation failed: {}", e);
                log.record(STAGE_IMAGE, StageOutcome::Failed(format!(
                    "Image generation failed: {}",
                    e
                )));
            }
            Err(e) => return Err(e),
        }

        // 3D generation is never attempted without a source image
        let mut model_path: Option<PathBuf> = None;
        let mut video_path: Option<PathBuf> = None;
        if let Some((image_bytes, _)) = &image {
            info!("stage 3: converting image to 3d model");
            match self.generate_model(image_bytes, user_id) {
                Ok((model, video)) => {
                    log.record(STAGE_MODEL, StageOutcome::Succeeded);
                    model_path = Some(model);
                    video_path = video;
                }
                Err(e) if e.is_remote() => {
                    warn!("3d model generation failed: {}", e);
                    log.record(STAGE_MODEL, StageOutcome::Failed(format!(
                        "3D model generation failed: {}",
                        e
                    )));

                    // Degraded fallback: one more attempt with only the image
                    if let Some(model_bytes) = self.generate_model_fallback(image_bytes, user_id) {
                        let path = self.artifacts.store_model(&model_bytes)?;
                        log.record(STAGE_MODEL, StageOutcome::FallbackSucceeded);
                        model_path = Some(path);
                    }
                }
                Err(e) => return Err(e),
            }
        } else {
            log.record(
                STAGE_MODEL,
                StageOutcome::Skipped(
                    "Skipped 3D model generation due to missing image".to_string(),
                ),
            );
        }

        info!("stage 4: extracting tags");
        let tags = extract_tags(&enhanced_prompt);

        let image_path = image.map(|(_, p)| p.to_string_lossy().to_string());
        let model_path = model_path.map(|p| p.to_string_lossy().to_string());
        let video_path = video_path.map(|p| p.to_string_lossy().to_string());

        info!("stage 5: saving creation");
        let creation_id = self.ledger.save_creation(NewCreation {
            prompt: user_prompt,
            enhanced_prompt: &enhanced_prompt,
            image_path: image_path.as_deref(),
            model_path: model_path.as_deref(),
            video_path: video_path.as_deref(),
            tags: &tags,
            user_id,
        })?;

        info!("stage 6: updating session memory");
        self.sessions
            .set(user_id, KEY_LAST_PROMPT, Some(user_prompt.to_string()));
        self.sessions
            .set(user_id, KEY_LAST_ENHANCED_PROMPT, Some(enhanced_prompt.clone()));
        self.sessions
            .set(user_id, KEY_LAST_IMAGE_PATH, image_path.clone());
        self.sessions
            .set(user_id, KEY_LAST_MODEL_PATH, model_path.clone());

        Ok(PipelineSuccess {
            creation_id,
            original_prompt: user_prompt.to_string(),
            enhanced_prompt,
            image_path,
            model_path,
            video_path,
            tags,
            stages_completed: log.stages_completed,
            errors: log.errors,
        })
    }

    /// Generate an image from the enhanced prompt and persist it
    fn generate_image(&self, enhanced_prompt: &str, user_id: &str) -> Result<(Vec<u8>, PathBuf)> {
        let schema = self.invoker.schema(CAP_TEXT_TO_IMAGE, SchemaDirection::Input)?;
        debug!(%schema, "text-to-image input schema");

        let request = serde_json::json!({
            "prompt": enhanced_prompt,
            "negative_prompt": NEGATIVE_PROMPT,
            "width": IMAGE_WIDTH,
            "height": IMAGE_HEIGHT,
            "guidance_scale": GUIDANCE_SCALE,
            "num_inference_steps": INFERENCE_STEPS,
        });

        let response = self.invoker.call(CAP_TEXT_TO_IMAGE, &request, user_id)?;
        let image_bytes = binary_field(&response, "result")?;

        let path = self.artifacts.store_image(&image_bytes)?;
        info!(path = %path.display(), "image generated");
        Ok((image_bytes, path))
    }

    /// Convert the generated image into a 3D model (and possibly a preview
    /// video) and persist the results
    fn generate_model(
        &self,
        image_bytes: &[u8],
        user_id: &str,
    ) -> Result<(PathBuf, Option<PathBuf>)> {
        let request = serde_json::json!({ "input_image": encode_bytes(image_bytes) });
        let response = self.invoker.call(CAP_IMAGE_TO_3D, &request, user_id)?;

        let model_bytes = binary_field(&response, "generated_object")?;
        let video_bytes = optional_binary_field(&response, "video_object")?;

        let model_path = self.artifacts.store_model(&model_bytes)?;
        info!(path = %model_path.display(), "3d model generated");

        let video_path = match video_bytes {
            Some(bytes) => {
                let path = self.artifacts.store_video(&bytes)?;
                info!(path = %path.display(), "preview video generated");
                Some(path)
            }
            None => None,
        };

        Ok((model_path, video_path))
    }

    /// Second, simplified 3D attempt. Absorbs its own failures: the run
    /// proceeds to persistence either way.
    fn generate_model_fallback(&self, image_bytes: &[u8], user_id: &str) -> Option<Vec<u8>> {
        info!("attempting fallback 3d model generation");
        let request = serde_json::json!({ "input_image": encode_bytes(image_bytes) });

        match self.invoker.call(CAP_IMAGE_TO_3D, &request, user_id) {
            Ok(response) => match binary_field(&response, "generated_object") {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("fallback returned no model data: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("fallback 3d model generation failed: {}", e);
                None
            }
        }
    }
}
