//! Durable creation ledger backed by SQLite
//!
//! One row per pipeline run that reached persistence. Rows are append-only:
//! this crate never updates or deletes them.

use atelier_core::{AtelierError, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::{debug, info};

/// A persisted creation row.
///
/// Artifact paths are independently nullable; a row with a null model path
/// but a non-null image path records a partially-successful run.
#[derive(Debug, Clone, Serialize)]
pub struct CreationRecord {
    pub id: i64,
    /// ISO-8601 timestamp assigned at persist time
    pub created_at: String,
    pub prompt: String,
    pub enhanced_prompt: String,
    pub image_path: Option<String>,
    pub model_path: Option<String>,
    pub video_path: Option<String>,
    /// Comma-delimited tag string as stored
    pub tags: String,
    pub user_id: String,
}

impl CreationRecord {
    /// Split the stored tag string back into individual tags
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags.split(',').filter(|t| !t.is_empty()).collect()
    }
}

/// Insert shape for [`CreationLedger::save_creation`].
///
/// A single stable signature: the video path is an explicit optional field
/// rather than a separate call shape.
#[derive(Debug)]
pub struct NewCreation<'a> {
    pub prompt: &'a str,
    pub enhanced_prompt: &'a str,
    pub image_path: Option<&'a str>,
    pub model_path: Option<&'a str>,
    pub video_path: Option<&'a str>,
    pub tags: &'a [String],
    pub user_id: &'a str,
}

/// Append-only store of creation rows
pub struct CreationLedger {
    conn: Connection,
}

impl CreationLedger {
    /// Open (or create) the ledger database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| AtelierError::Persistence(format!("Failed to open {}: {}", path, e)))?;
        let ledger = Self { conn };
        ledger.bootstrap()?;
        info!(path, "creation ledger opened");
        Ok(ledger)
    }

    /// Open an in-memory ledger (for tests)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AtelierError::Persistence(e.to_string()))?;
        let ledger = Self { conn };
        ledger.bootstrap()?;
        Ok(ledger)
    }

    fn bootstrap(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS creations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    created_at TEXT NOT NULL,
                    prompt TEXT NOT NULL,
                    enhanced_prompt TEXT NOT NULL,
                    image_path TEXT,
                    model_path TEXT,
                    video_path TEXT,
                    tags TEXT NOT NULL,
                    user_id TEXT NOT NULL
                )",
                [],
            )
            .map_err(|e| AtelierError::Persistence(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    /// Persist one creation and return its assigned id
    pub fn save_creation(&self, new: NewCreation<'_>) -> Result<i64> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let tags = new.tags.join(",");

        self.conn
            .execute(
                "INSERT INTO creations
                 (created_at, prompt, enhanced_prompt, image_path, model_path, video_path, tags, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    created_at,
                    new.prompt,
                    new.enhanced_prompt,
                    new.image_path,
                    new.model_path,
                    new.video_path,
                    tags,
                    new.user_id,
                ],
            )
            .map_err(|e| AtelierError::Persistence(format!("Failed to insert creation: {}", e)))?;

        let id = self.conn.last_insert_rowid();
        info!(creation_id = id, user_id = new.user_id, "creation saved");
        Ok(id)
    }

    /// Case-insensitive substring search across prompt, enhanced prompt and
    /// tags, optionally filtered by user
    pub fn search(&self, term: &str, user_id: Option<&str>) -> Result<Vec<CreationRecord>> {
        let pattern = format!("%{}%", term);
        debug!(term, "searching creations");

        match user_id {
            Some(user) => self.query_records(
                "SELECT id, created_at, prompt, enhanced_prompt, image_path, model_path,
                        video_path, tags, user_id
                 FROM creations
                 WHERE (prompt LIKE ?1 OR enhanced_prompt LIKE ?1 OR tags LIKE ?1)
                   AND user_id = ?2
                 ORDER BY created_at DESC",
                params![pattern, user],
            ),
            None => self.query_records(
                "SELECT id, created_at, prompt, enhanced_prompt, image_path, model_path,
                        video_path, tags, user_id
                 FROM creations
                 WHERE (prompt LIKE ?1 OR enhanced_prompt LIKE ?1 OR tags LIKE ?1)
                 ORDER BY created_at DESC",
                params![pattern],
            ),
        }
    }

    /// Most recent creations, newest first, up to `limit` rows
    pub fn recent(&self, limit: u32, user_id: Option<&str>) -> Result<Vec<CreationRecord>> {
        let limit = limit as i64;

        match user_id {
            Some(user) => self.query_records(
                "SELECT id, created_at, prompt, enhanced_prompt, image_path, model_path,
                        video_path, tags, user_id
                 FROM creations
                 WHERE user_id = ?1
                 ORDER BY created_at DESC LIMIT ?2",
                params![user, limit],
            ),
            None => self.query_records(
                "SELECT id, created_at, prompt, enhanced_prompt, image_path, model_path,
                        video_path, tags, user_id
                 FROM creations
                 ORDER BY created_at DESC LIMIT ?1",
                params![limit],
            ),
        }
    }

    fn query_records(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<CreationRecord>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| AtelierError::Persistence(e.to_string()))?;

        let rows = stmt
            .query_map(params, |row| {
                Ok(CreationRecord {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                    prompt: row.get(2)?,
                    enhanced_prompt: row.get(3)?,
                    image_path: row.get(4)?,
                    model_path: row.get(5)?,
                    video_path: row.get(6)?,
                    tags: row.get(7)?,
                    user_id: row.get(8)?,
                })
            })
            .map_err(|e| AtelierError::Persistence(e.to_string()))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AtelierError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(tags: &'a [String]) -> NewCreation<'a> {
        NewCreation {
            prompt: "a dragon",
            enhanced_prompt: "a majestic dragon, cinematic",
            image_path: Some("outputs/images/abc.png"),
            model_path: Some("outputs/models/abc.glb"),
            video_path: None,
            tags,
            user_id: "super-user",
        }
    }

    #[test]
    fn test_save_assigns_increasing_ids() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags = vec!["dragon".to_string()];

        let first = ledger.save_creation(sample(&tags)).unwrap();
        let second = ledger.save_creation(sample(&tags)).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_save_with_null_paths() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags: Vec<String> = vec![];

        let id = ledger
            .save_creation(NewCreation {
                prompt: "a chair",
                enhanced_prompt: "a chair, photorealistic",
                image_path: None,
                model_path: None,
                video_path: None,
                tags: &tags,
                user_id: "super-user",
            })
            .unwrap();

        let records = ledger.recent(10, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert!(records[0].image_path.is_none());
        assert!(records[0].model_path.is_none());
        assert!(records[0].video_path.is_none());
    }

    #[test]
    fn test_search_matches_tags_only() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags = vec!["obsidian".to_string(), "tower".to_string()];

        ledger
            .save_creation(NewCreation {
                prompt: "a castle",
                enhanced_prompt: "a fortress on a hill",
                image_path: None,
                model_path: None,
                video_path: None,
                tags: &tags,
                user_id: "super-user",
            })
            .unwrap();

        // Term absent from both prompt fields, present in tags
        let hits = ledger.search("obsidian", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prompt, "a castle");

        let misses = ledger.search("granite", None).unwrap();
        assert!(misses.is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags = vec!["dragon".to_string()];
        ledger.save_creation(sample(&tags)).unwrap();

        let hits = ledger.search("DRAGON", None).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_user_filter() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags = vec!["dragon".to_string()];

        ledger.save_creation(sample(&tags)).unwrap();
        ledger
            .save_creation(NewCreation {
                user_id: "other-user",
                ..sample(&tags)
            })
            .unwrap();

        let all = ledger.search("dragon", None).unwrap();
        assert_eq!(all.len(), 2);

        let filtered = ledger.search("dragon", Some("other-user")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].user_id, "other-user");
    }

    #[test]
    fn test_recent_limit_and_order() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags: Vec<String> = vec![];

        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(ledger.save_creation(sample(&tags)).unwrap());
        }

        let records = ledger.recent(3, None).unwrap();
        assert_eq!(records.len(), 3);
        // Same-timestamp inserts are still limited; every returned id is one we wrote
        for r in &records {
            assert!(ids.contains(&r.id));
        }
    }

    #[test]
    fn test_tag_list_roundtrip() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags = vec!["golden".to_string(), "hour".to_string()];
        ledger.save_creation(sample(&tags)).unwrap();

        let records = ledger.recent(1, None).unwrap();
        assert_eq!(records[0].tag_list(), vec!["golden", "hour"]);
    }

    #[test]
    fn test_empty_tags_stored_as_empty_string() {
        let ledger = CreationLedger::in_memory().unwrap();
        let tags: Vec<String> = vec![];
        ledger.save_creation(sample(&tags)).unwrap();

        let records = ledger.recent(1, None).unwrap();
        assert_eq!(records[0].tags, "");
        assert!(records[0].tag_list().is_empty());
    }
}
