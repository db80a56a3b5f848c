//! `atelier init` - write a starter project config

use anyhow::{bail, Result};
use std::path::Path;

const STARTER_CONFIG: &str = r#"# Atelier project configuration
#
# Values here override ~/.atelier/config.toml; ATELIER_* environment
# variables override both.

[enhancer]
# endpoint defaults to the local (or in-container) Ollama address
# endpoint = "http://localhost:11434/api/generate"
model = "llama2"

[capabilities.text_to_image]
url = "https://example.com/apps/text-to-image"

[capabilities.image_to_3d]
url = "https://example.com/apps/image-to-3d"

[pipeline]
output_dir = "outputs"
db_path = "memory.db"
# invoker = "mock" runs fully offline with placeholder artifacts
invoker = "http"
"#;

pub fn run() -> Result<()> {
    let path = Path::new(".atelier/config.toml");
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    std::fs::create_dir_all(".atelier")?;
    std::fs::write(path, STARTER_CONFIG)?;
    println!("Wrote {}", path.display());
    println!("Fill in the capability URLs, then run: atelier create \"a glowing forest\"");
    Ok(())
}
