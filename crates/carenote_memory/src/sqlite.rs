use anyhow::{Context, Result};
use async_trait::async_trait;
use carenote_core::{Note, NoteStore};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use uuid::Uuid;

/// Per-user note store backed by SQLite.
///
/// Each note is kept as a JSON document; `seq` preserves insertion order,
/// which the trend window depends on.
#[derive(Clone)]
pub struct SqliteNoteStore {
    pool: Pool<Sqlite>,
}

impl SqliteNoteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database. One connection, kept alive for the
    /// lifetime of the pool, since every new connection would see an empty DB.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                id TEXT NOT NULL,
                mode TEXT NOT NULL,
                date TEXT NOT NULL,
                body TEXT NOT NULL,
                UNIQUE(user, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create notes table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_user_seq ON notes(user, seq)")
            .execute(&self.pool)
            .await
            .context("Failed to create notes index")?;

        Ok(())
    }

    /// Number of notes stored for a user.
    pub async fn count(&self, user: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes WHERE user = ?")
            .bind(user)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count notes")?;
        Ok(count)
    }
}

fn encode(note: &Note) -> Result<String> {
    note.validate()?;
    serde_json::to_string(note).context("Failed to serialize note")
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn load_notes(&self, user: &str) -> Result<Vec<Note>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT seq, body FROM notes WHERE user = ? ORDER BY seq")
                .bind(user)
                .fetch_all(&self.pool)
                .await
                .context("Failed to load notes")?;

        rows.into_iter()
            .map(|(seq, body)| {
                serde_json::from_str::<Note>(&body)
                    .with_context(|| format!("Malformed note at row {}", seq))
            })
            .collect()
    }

    async fn append_note(&self, user: &str, note: &Note) -> Result<()> {
        let body = encode(note)?;
        sqlx::query("INSERT INTO notes (user, id, mode, date, body) VALUES (?, ?, ?, ?, ?)")
            .bind(user)
            .bind(note.id.to_string())
            .bind(note.mode.as_str())
            .bind(&note.date)
            .bind(body)
            .execute(&self.pool)
            .await
            .context("Failed to insert note")?;

        tracing::debug!("Appended {} note {}", note.mode, note.id);
        Ok(())
    }

    async fn upsert_note(&self, user: &str, note: &Note) -> Result<()> {
        let body = encode(note)?;
        let result = sqlx::query(
            r#"
            INSERT INTO notes (user, id, mode, date, body) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user, id) DO UPDATE SET
                mode = excluded.mode,
                date = excluded.date,
                body = excluded.body
            WHERE notes.mode = 'chat_session'
            "#,
        )
        .bind(user)
        .bind(note.id.to_string())
        .bind(note.mode.as_str())
        .bind(&note.date)
        .bind(body)
        .execute(&self.pool)
        .await
        .context("Failed to upsert note")?;

        // Only chat-session rows are replaceable; any other row under this id is kept.
        if result.rows_affected() == 0 {
            anyhow::bail!("Note {} already exists and is not a chat session", note.id);
        }
        Ok(())
    }

    async fn add_tag(&self, user: &str, id: Uuid, tag: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> = sqlx::query_as("SELECT body FROM notes WHERE user = ? AND id = ?")
            .bind(user)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to look up note")?;

        let Some((body,)) = row else {
            return Ok(false);
        };
        let mut note: Note = serde_json::from_str(&body)
            .with_context(|| format!("Malformed note {}", id))?;
        if !note.add_tag(tag) {
            return Ok(false);
        }

        sqlx::query("UPDATE notes SET body = ? WHERE user = ? AND id = ?")
            .bind(encode(&note)?)
            .bind(user)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to update note tags")?;
        tx.commit().await?;

        Ok(true)
    }

    async fn wipe(&self, user: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notes WHERE user = ?")
            .bind(user)
            .execute(&self.pool)
            .await
            .context("Failed to wipe notes")?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carenote_core::{
        ChatMessage, ChatRole, ChatSession, DiaryResult, MedicalEntities, NoteError, NoteMode,
    };
    use chrono::Utc;

    fn diary(text: &str, sentiment: f64) -> Note {
        let result = DiaryResult {
            sentiment,
            tags: Default::default(),
            suggestions: vec![],
            summary: String::new(),
        };
        Note::diary(text, MedicalEntities::default(), result, Utc::now())
    }

    #[tokio::test]
    async fn test_append_and_load_in_order() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        for i in 0..3 {
            store.append_note("ana", &diary(&format!("day {i}"), 0.1)).await.unwrap();
        }
        store.append_note("ben", &diary("other user", 0.0)).await.unwrap();

        let notes = store.load_notes("ana").await.unwrap();
        let texts: Vec<_> = notes.iter().map(|n| n.raw_text_redacted.as_str()).collect();
        assert_eq!(texts, vec!["day 0", "day 1", "day 2"]);
        assert_eq!(store.count("ben").await.unwrap(), 1);
        assert!(store.load_notes("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_note_rejected() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        let mut bad = diary("x", 0.0);
        bad.diary = None;
        let err = store.append_note("ana", &bad).await.unwrap_err();
        assert_eq!(err.downcast_ref::<NoteError>(), Some(&NoteError::MissingDiary(bad.id)));
        assert_eq!(store.count("ana").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_append_fails() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        let note = diary("once", 0.0);
        store.append_note("ana", &note).await.unwrap();
        assert!(store.append_note("ana", &note).await.is_err());
    }

    #[tokio::test]
    async fn test_upsert_keeps_position() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let session = |n: usize| ChatSession {
            title: "chat".into(),
            messages: vec![ChatMessage::new(ChatRole::User, "hi"); n],
        };

        store.upsert_note("ana", &Note::chat_session(id, session(1), Utc::now())).await.unwrap();
        store.append_note("ana", &diary("after", 0.0)).await.unwrap();
        store.upsert_note("ana", &Note::chat_session(id, session(3), Utc::now())).await.unwrap();

        let notes = store.load_notes("ana").await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].mode, NoteMode::ChatSession);
        assert_eq!(notes[0].chat.as_ref().unwrap().messages.len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_never_replaces_diary_note() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        let note = diary("keep me", 0.4);
        store.append_note("ana", &note).await.unwrap();

        let session = ChatSession {
            title: "chat".into(),
            messages: vec![ChatMessage::new(ChatRole::User, "hi")],
        };
        let err = store
            .upsert_note("ana", &Note::chat_session(note.id, session, Utc::now()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a chat session"));

        let notes = store.load_notes("ana").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].mode, NoteMode::Diary);
        assert_eq!(notes[0].raw_text_redacted, "keep me");
    }

    #[tokio::test]
    async fn test_add_tag() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        let note = diary("tired", -0.3);
        let doc = Note::document("lab", MedicalEntities::default(), Utc::now());
        store.append_note("ana", &note).await.unwrap();
        store.append_note("ana", &doc).await.unwrap();

        assert!(store.add_tag("ana", note.id, "chat-derived").await.unwrap());
        assert!(!store.add_tag("ana", note.id, "chat-derived").await.unwrap());
        assert!(!store.add_tag("ana", doc.id, "chat-derived").await.unwrap());
        assert!(!store.add_tag("ana", Uuid::new_v4(), "x").await.unwrap());
        assert!(!store.add_tag("ben", note.id, "x").await.unwrap());

        let notes = store.load_notes("ana").await.unwrap();
        assert!(notes[0].diary.as_ref().unwrap().tags.contains("chat-derived"));
    }

    #[tokio::test]
    async fn test_wipe_is_per_user() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        store.append_note("ana", &diary("a", 0.0)).await.unwrap();
        store.append_note("ana", &diary("b", 0.0)).await.unwrap();
        store.append_note("ben", &diary("c", 0.0)).await.unwrap();

        assert_eq!(store.wipe("ana").await.unwrap(), 2);
        assert!(store.load_notes("ana").await.unwrap().is_empty());
        assert_eq!(store.count("ben").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_fails_on_malformed_row() {
        let store = SqliteNoteStore::in_memory().await.unwrap();
        sqlx::query("INSERT INTO notes (user, id, mode, date, body) VALUES ('ana', 'x', 'diary', 'd', '{\"mode\":\"diary\"}')")
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(store.load_notes("ana").await.is_err());
    }
}
