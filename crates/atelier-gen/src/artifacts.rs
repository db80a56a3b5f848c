//! Artifact storage
//!
//! Writes generated binaries under `<output_dir>/{images,models,videos}/`
//! with random unique filenames. Collision-resistant names are enough at
//! this scale; there is no retry logic.

use atelier_core::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

const IMAGES_DIR: &str = "images";
const MODELS_DIR: &str = "models";
const VIDEOS_DIR: &str = "videos";

/// File store for generated artifacts
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create an artifact store rooted at the given output directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the output directory tree
    pub fn ensure_layout(&self) -> Result<()> {
        for subdir in [IMAGES_DIR, MODELS_DIR, VIDEOS_DIR] {
            std::fs::create_dir_all(self.root.join(subdir))?;
        }
        Ok(())
    }

    /// Persist image bytes as `images/<uuid>.png`
    pub fn store_image(&self, bytes: &[u8]) -> Result<PathBuf> {
        self.write_unique(IMAGES_DIR, "png", bytes)
    }

    /// Persist model bytes as `models/<uuid>.glb`
    pub fn store_model(&self, bytes: &[u8]) -> Result<PathBuf> {
        self.write_unique(MODELS_DIR, "glb", bytes)
    }

    /// Persist video bytes as `videos/<uuid>.mp4`
    pub fn store_video(&self, bytes: &[u8]) -> Result<PathBuf> {
        self.write_unique(VIDEOS_DIR, "mp4", bytes)
    }

    fn write_unique(&self, subdir: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
        let filename = format!("{}.{}", uuid::Uuid::new_v4().simple(), ext);
        let path = self.root.join(subdir).join(filename);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), size = bytes.len(), "artifact written");
        Ok(path)
    }
}
