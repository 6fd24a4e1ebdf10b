pub mod config;
pub mod ner;
pub mod note;
pub mod sentiment;

pub use config::CarenoteConfig;
pub use ner::{EntityRecognizer, GazetteerRecognizer, LazyRecognizer, NoRecognizer, RecognizedEntity};
pub use note::{
    ChatMessage, ChatRole, ChatSession, ClinicalNote, DiaryResult, MedicalEntities, Note,
    NoteError, NoteMode,
};
pub use sentiment::{LexiconPolarity, NeutralPolarity, PolarityScorer};

use async_trait::async_trait;
use uuid::Uuid;

/// Per-user, append-only note storage.
///
/// Notes must be redacted before they reach `append_note`. The only
/// in-place mutation is tag augmentation; deletion is a whole-user wipe.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes of a user in insertion order.
    async fn load_notes(&self, user: &str) -> anyhow::Result<Vec<Note>>;

    /// Append a note. Malformed notes are rejected with a `NoteError`.
    async fn append_note(&self, user: &str, note: &Note) -> anyhow::Result<()>;

    /// Insert or replace a note by id, keeping its original position.
    /// Used for chat-session snapshots that grow during a conversation.
    /// Only a stored chat session can be replaced; any other id is an error.
    async fn upsert_note(&self, user: &str, note: &Note) -> anyhow::Result<()>;

    /// Add a tag to a stored diary note. Returns `false` if the note is
    /// missing, not a diary note, or already carries the tag.
    async fn add_tag(&self, user: &str, id: Uuid, tag: &str) -> anyhow::Result<bool>;

    /// Remove every note of a user. Returns the number of notes removed.
    async fn wipe(&self, user: &str) -> anyhow::Result<u64>;
}
