//! Ephemeral session memory
//!
//! Holds the most recent pipeline result per user for the lifetime of the
//! process. The pipeline writes these keys on every successful run; the
//! presentation layer only reads them. Nothing here survives a restart.

use std::collections::HashMap;
use tracing::debug;

pub const KEY_LAST_PROMPT: &str = "last_prompt";
pub const KEY_LAST_ENHANCED_PROMPT: &str = "last_enhanced_prompt";
pub const KEY_LAST_IMAGE_PATH: &str = "last_image_path";
pub const KEY_LAST_MODEL_PATH: &str = "last_model_path";

/// Per-user key/value cache of last-run fields.
///
/// Sessions are keyed by user id so concurrent users never observe each
/// other's values. A key set to `None` records "this run produced no value"
/// and still overwrites whatever the previous run stored.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, HashMap<String, Option<String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a key in the user's session
    pub fn set(&mut self, user_id: &str, key: &str, value: Option<String>) {
        debug!(user_id, key, "session key updated");
        self.sessions
            .entry(user_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Read a key from the user's session; `None` when the key was never
    /// written or the last run stored a null value
    pub fn get(&self, user_id: &str, key: &str) -> Option<&str> {
        self.sessions
            .get(user_id)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_deref())
    }

    /// Whether the user has any session state at all
    pub fn has_session(&self, user_id: &str) -> bool {
        self.sessions.contains_key(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut store = SessionStore::new();
        store.set("alice", KEY_LAST_PROMPT, Some("a dragon".to_string()));
        assert_eq!(store.get("alice", KEY_LAST_PROMPT), Some("a dragon"));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let mut store = SessionStore::new();
        store.set("alice", KEY_LAST_PROMPT, Some("first".to_string()));
        store.set("alice", KEY_LAST_PROMPT, Some("second".to_string()));
        assert_eq!(store.get("alice", KEY_LAST_PROMPT), Some("second"));
    }

    #[test]
    fn test_null_value_overwrites() {
        let mut store = SessionStore::new();
        store.set("alice", KEY_LAST_IMAGE_PATH, Some("a.png".to_string()));
        store.set("alice", KEY_LAST_IMAGE_PATH, None);
        assert_eq!(store.get("alice", KEY_LAST_IMAGE_PATH), None);
        assert!(store.has_session("alice"));
    }

    #[test]
    fn test_sessions_are_isolated_per_user() {
        let mut store = SessionStore::new();
        store.set("alice", KEY_LAST_PROMPT, Some("a dragon".to_string()));
        store.set("bob", KEY_LAST_PROMPT, Some("a teapot".to_string()));

        assert_eq!(store.get("alice", KEY_LAST_PROMPT), Some("a dragon"));
        assert_eq!(store.get("bob", KEY_LAST_PROMPT), Some("a teapot"));
        assert_eq!(store.get("carol", KEY_LAST_PROMPT), None);
    }
}
