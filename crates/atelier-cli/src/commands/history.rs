//! `atelier recent` / `atelier search` - browse the creation ledger

use anyhow::Result;
use atelier_gen::AtelierConfig;
use atelier_memory::{CreationLedger, CreationRecord};

pub fn recent(limit: u32, user: Option<&str>) -> Result<()> {
    let config = AtelierConfig::load()?;
    let ledger = CreationLedger::open(&config.pipeline.db_path)?;
    print_records(&ledger.recent(limit, user)?);
    Ok(())
}

pub fn search(term: &str, user: Option<&str>) -> Result<()> {
    let config = AtelierConfig::load()?;
    let ledger = CreationLedger::open(&config.pipeline.db_path)?;
    print_records(&ledger.search(term, user)?);
    Ok(())
}

fn print_records(records: &[CreationRecord]) {
    if records.is_empty() {
        println!("No creations found");
        return;
    }

    for record in records {
        println!("#{} [{}] {}", record.id, record.created_at, record.prompt);
        if let Some(path) = &record.image_path {
            println!("    image: {}", path);
        }
        if let Some(path) = &record.model_path {
            println!("    model: {}", path);
        }
        if let Some(path) = &record.video_path {
            println!("    video: {}", path);
        }
        if !record.tags.is_empty() {
            println!("    tags:  {}", record.tags);
        }
    }
}
