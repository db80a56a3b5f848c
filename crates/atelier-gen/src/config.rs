//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `ATELIER_*`
//! 2. Project-local: `.atelier/config.toml`
//! 3. Global: `~/.atelier/config.toml`
//!
//! The enhancer endpoint default depends on the execution environment and is
//! resolved exactly once, when the config is loaded.

use crate::environment::Environment;
use crate::invoker::{CAP_IMAGE_TO_3D, CAP_TEXT_TO_IMAGE};
use atelier_core::{AtelierError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Per-capability configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// Enhancer section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancerConfig {
    /// Text-generation endpoint; defaults by environment when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_enhancer_model")]
    pub model: String,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: default_enhancer_model(),
        }
    }
}

fn default_enhancer_model() -> String {
    "llama2".to_string()
}

/// Pipeline section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_invoker")]
    pub invoker: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            db_path: default_db_path(),
            invoker: default_invoker(),
        }
    }
}

fn default_output_dir() -> String {
    "outputs".to_string()
}
fn default_db_path() -> String {
    "memory.db".to_string()
}
fn default_invoker() -> String {
    "http".to_string()
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtelierConfigFile {
    #[serde(default)]
    pub enhancer: EnhancerConfig,
    #[serde(default)]
    pub capabilities: HashMap<String, CapabilityConfig>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Resolved configuration with environment variable overrides applied and
/// the enhancer endpoint pinned down
#[derive(Debug, Clone)]
pub struct AtelierConfig {
    pub enhancer_endpoint: String,
    pub enhancer_model: String,
    pub capabilities: HashMap<String, CapabilityConfig>,
    pub pipeline: PipelineConfig,
}

impl AtelierConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = AtelierConfigFile::default();

        // Layer 1: Global config (~/.atelier/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        // Layer 2: Project-local config (.atelier/config.toml)
        let local_path = PathBuf::from(".atelier/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        // Layer 3: Environment variable overrides
        Self::apply_env_overrides(&mut config);

        Ok(Self::resolve(config))
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(Self::resolve(config))
    }

    fn resolve(file: AtelierConfigFile) -> Self {
        let enhancer_endpoint = file.enhancer.endpoint.unwrap_or_else(|| {
            Environment::detect().default_enhancer_endpoint().to_string()
        });

        AtelierConfig {
            enhancer_endpoint,
            enhancer_model: file.enhancer.model,
            capabilities: file.capabilities,
            pipeline: file.pipeline,
        }
    }

    /// Get the configured URL for a capability
    pub fn capability_url(&self, capability: &str) -> Option<&str> {
        self.capabilities
            .get(capability)
            .and_then(|c| c.url.as_deref())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".atelier").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<AtelierConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let config: AtelierConfigFile = toml::from_str(&content).map_err(|e| {
            AtelierError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    fn merge_into(base: &mut AtelierConfigFile, overlay: AtelierConfigFile) {
        if overlay.enhancer.endpoint.is_some() {
            base.enhancer.endpoint = overlay.enhancer.endpoint;
        }
        if overlay.enhancer.model != default_enhancer_model() {
            base.enhancer.model = overlay.enhancer.model;
        }

        for (name, capability) in overlay.capabilities {
            let entry = base.capabilities.entry(name).or_default();
            if capability.url.is_some() {
                entry.url = capability.url;
            }
        }

        if overlay.pipeline.output_dir != default_output_dir() {
            base.pipeline.output_dir = overlay.pipeline.output_dir;
        }
        if overlay.pipeline.db_path != default_db_path() {
            base.pipeline.db_path = overlay.pipeline.db_path;
        }
        if overlay.pipeline.invoker != default_invoker() {
            base.pipeline.invoker = overlay.pipeline.invoker;
        }
    }

    fn apply_env_overrides(config: &mut AtelierConfigFile) {
        if let Ok(endpoint) = std::env::var("ATELIER_ENHANCER_ENDPOINT") {
            config.enhancer.endpoint = Some(endpoint);
        }
        if let Ok(model) = std::env::var("ATELIER_ENHANCER_MODEL") {
            config.enhancer.model = model;
        }

        let capability_vars = [
            (CAP_TEXT_TO_IMAGE, "ATELIER_TEXT_TO_IMAGE_URL"),
            (CAP_IMAGE_TO_3D, "ATELIER_IMAGE_TO_3D_URL"),
        ];
        for (capability, var) in &capability_vars {
            if let Ok(url) = std::env::var(var) {
                let entry = config.capabilities.entry(capability.to_string()).or_default();
                entry.url = Some(url);
            }
        }

        if let Ok(dir) = std::env::var("ATELIER_OUTPUT_DIR") {
            config.pipeline.output_dir = dir;
        }
        if let Ok(path) = std::env::var("ATELIER_DB_PATH") {
            config.pipeline.db_path = path;
        }
        if let Ok(invoker) = std::env::var("ATELIER_INVOKER") {
            config.pipeline.invoker = invoker;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atelier_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_config_from_file() {
        std::env::remove_var("ATELIER_ENHANCER_ENDPOINT");
        std::env::remove_var("ATELIER_TEXT_TO_IMAGE_URL");

        let config_str = r#"
[enhancer]
endpoint = "http://localhost:11434/api/generate"
model = "llama2"

[capabilities.text_to_image]
url = "https://api.example.com/text-to-image"

[capabilities.image_to_3d]
url = "https://api.example.com/image-to-3d"

[pipeline]
output_dir = "workspace/outputs"
db_path = "workspace/memory.db"
"#;
        let path = temp_config(config_str);
        let config = AtelierConfig::load_from_file(&path).unwrap();

        assert_eq!(config.enhancer_endpoint, "http://localhost:11434/api/generate");
        assert_eq!(config.enhancer_model, "llama2");
        assert_eq!(
            config.capability_url(CAP_TEXT_TO_IMAGE),
            Some("https://api.example.com/text-to-image")
        );
        assert_eq!(config.pipeline.output_dir, "workspace/outputs");
        assert_eq!(config.pipeline.db_path, "workspace/memory.db");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_env_var_override() {
        let config_str = r#"
[capabilities.image_to_3d]
url = "https://file.example.com/image-to-3d"
"#;
        let path = temp_config(config_str);

        std::env::set_var("ATELIER_IMAGE_TO_3D_URL", "https://env.example.com/image-to-3d");

        let config = AtelierConfig::load_from_file(&path).unwrap();
        assert_eq!(
            config.capability_url(CAP_IMAGE_TO_3D),
            Some("https://env.example.com/image-to-3d")
        );

        std::env::remove_var("ATELIER_IMAGE_TO_3D_URL");
        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_endpoint_defaults_by_environment_when_unset() {
        std::env::remove_var("ATELIER_ENHANCER_ENDPOINT");

        let path = temp_config("");
        let config = AtelierConfig::load_from_file(&path).unwrap();

        // Whichever environment the test runs in, a concrete endpoint is pinned
        assert!(config.enhancer_endpoint.contains("11434/api/generate"));

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_missing_capability_returns_none() {
        let path = temp_config("");
        let config = AtelierConfig::load_from_file(&path).unwrap();
        assert_eq!(config.capability_url("nonexistent"), None);
        assert_eq!(config.pipeline.invoker, "http");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }
}
