//! `atelier create` - run the pipeline for one prompt

use anyhow::Result;
use atelier_gen::{AtelierConfig, CreativePipeline, PipelineResult};

pub fn run(prompt: &str, user: &str, invoker_override: Option<&str>, json: bool) -> Result<()> {
    let mut config = AtelierConfig::load()?;
    if let Some(name) = invoker_override {
        config.pipeline.invoker = name.to_string();
    }

    let mut pipeline = CreativePipeline::from_config(&config)?;
    let result = pipeline.process(prompt, user);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result {
        PipelineResult::Success(s) => {
            println!("Creation #{}", s.creation_id);
            println!("  prompt:   {}", s.original_prompt);
            println!("  enhanced: {}", s.enhanced_prompt);
            if let Some(path) = &s.image_path {
                println!("  image:    {}", path);
            }
            if let Some(path) = &s.model_path {
                println!("  model:    {}", path);
            }
            if let Some(path) = &s.video_path {
                println!("  video:    {}", path);
            }
            if !s.tags.is_empty() {
                println!("  tags:     {}", s.tags.join(", "));
            }
            if !s.errors.is_empty() {
                println!("  completed with {} issue(s):", s.errors.len());
                for e in &s.errors {
                    println!("    - {}", e);
                }
            }
        }
        PipelineResult::Failure { error, stage, .. } => {
            println!("Pipeline failed at {}: {}", stage, error);
        }
    }

    Ok(())
}
