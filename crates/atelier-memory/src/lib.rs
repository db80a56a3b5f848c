//! Atelier Memory - durable and session-scoped memory
//!
//! Two tiers: `CreationLedger` persists one row per completed pipeline run
//! to SQLite, while `SessionStore` holds an ephemeral per-user snapshot of
//! the most recent run that is lost on process restart.

mod ledger;
mod session;

pub use ledger::{CreationLedger, CreationRecord, NewCreation};
pub use session::{
    SessionStore, KEY_LAST_ENHANCED_PROMPT, KEY_LAST_IMAGE_PATH, KEY_LAST_MODEL_PATH,
    KEY_LAST_PROMPT,
};
