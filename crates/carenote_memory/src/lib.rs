//! Note persistence and the intake flow that feeds it.

mod coordinator;
mod sqlite;

pub use coordinator::{should_auto_log, JournalCoordinator, CHAT_INSIGHT, DAILY_CHECK_IN};
pub use sqlite::SqliteNoteStore;
