//! Integration tests for JournalCoordinator
//!
//! Uses tempfile::TempDir for isolated SQLite databases.

use std::sync::Arc;

use carenote_analytics::Pipeline;
use carenote_core::config::PrivacyConfig;
use carenote_core::{ChatMessage, ChatRole, NoteMode, NoteStore};
use carenote_memory::{JournalCoordinator, SqliteNoteStore, CHAT_INSIGHT, DAILY_CHECK_IN};
use carenote_voice::{AudioFormat, Utf8Transcript};
use chrono::Local;
use uuid::Uuid;

async fn setup(dir: &tempfile::TempDir) -> (JournalCoordinator, Arc<SqliteNoteStore>) {
    let db_path = dir.path().join("notes.db");
    let store = Arc::new(SqliteNoteStore::new(&db_path).await.unwrap());
    let coord = JournalCoordinator::new(store.clone(), Pipeline::default());
    (coord, store)
}

/// Test 1: Diary intake redacts before persisting and analyses the redacted text
#[tokio::test]
async fn test_diary_intake_redacts_once() {
    let dir = tempfile::TempDir::new().unwrap();
    let (coord, store) = setup(&dir).await;

    let note = coord
        .log_diary(
            "ana",
            "Email me at ana@example.com. Bad headache and fever, feeling sad.",
            Some(DAILY_CHECK_IN),
        )
        .await
        .unwrap();

    assert!(note.raw_text_redacted.contains("[REDACTED_EMAIL]"));
    assert!(!note.raw_text_redacted.contains("ana@example.com"));
    assert_eq!(note.medical_entities.symptoms, vec!["fever", "headache"]);
    let diary = note.diary.as_ref().unwrap();
    assert!(diary.tags.contains(DAILY_CHECK_IN));
    assert!(diary.tags.contains("symptoms"));
    assert!(diary.sentiment < 0.0);

    let stored = store.load_notes("ana").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, note.id);
    assert_eq!(stored[0].raw_text_redacted, note.raw_text_redacted);
    assert_eq!(stored[0].medical_entities, note.medical_entities);
}

/// Test 2: Trends and alerts reflect the persisted history across restarts
#[tokio::test]
async fn test_alerts_survive_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let (coord, _) = setup(&dir).await;
        for _ in 0..3 {
            coord.log_diary("ana", "persistent cough again", None).await.unwrap();
        }
    }

    let (coord, _) = setup(&dir).await;
    let trend = coord.trends("ana").await.unwrap();
    assert_eq!(trend.note_count, 3);
    assert_eq!(trend.top_symptoms[0], ("cough".to_string(), 3));

    let alerts = coord.alerts("ana").await.unwrap();
    assert!(alerts.iter().any(|a| a.contains("'cough' 3 times")));
    assert!(alerts.last().unwrap().starts_with("Smart Escalation"));
}

/// Test 3: Clinical notes feed the context digest but not the trend window
#[tokio::test]
async fn test_clinical_note_context() {
    let dir = tempfile::TempDir::new().unwrap();
    let (coord, _) = setup(&dir).await;

    coord
        .log_clinical("ana", "Patient Name: Ana Lopez. BP 130/85, cough", Some("Subjective: cough"))
        .await
        .unwrap();

    let ctx = coord.context("ana", true, true).await.unwrap();
    assert!(ctx.starts_with("Last Clinical Note"));
    assert!(ctx.contains("[REDACTED_NAME]"));
    assert!(!ctx.contains("Lopez"));
    assert!(coord.trends("ana").await.unwrap().is_empty());
}

/// Test 4: Dictation goes through the speech backend
#[tokio::test]
async fn test_dictation() {
    let dir = tempfile::TempDir::new().unwrap();
    let (coord, _) = setup(&dir).await;

    let err = coord
        .dictate("ana", b"RIFF....", AudioFormat::Wav, NoteMode::Diary)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unavailable"));

    let coord = coord.with_stt(Arc::new(Utf8Transcript));
    let note = coord
        .dictate("ana", b"temp 101.2 and chills", AudioFormat::Wav, NoteMode::Clinical)
        .await
        .unwrap();
    assert_eq!(note.mode, NoteMode::Clinical);
    assert!(note.medical_entities.vitals.contains(&"Temp: 101.2".to_string()));

    assert!(coord
        .dictate("ana", b"hello", AudioFormat::Wav, NoteMode::Document)
        .await
        .is_err());
}

/// Test 5: Chat messages are logged only when substantive and allowed
#[tokio::test]
async fn test_chat_auto_logging() {
    let dir = tempfile::TempDir::new().unwrap();
    let (coord, store) = setup(&dir).await;

    assert!(coord.log_chat_message("ana", "what time is it").await.unwrap().is_none());
    let logged = coord
        .log_chat_message("ana", "my headache is back")
        .await
        .unwrap()
        .unwrap();
    assert!(logged.diary.as_ref().unwrap().tags.contains(CHAT_INSIGHT));

    let private = coord.with_privacy(PrivacyConfig { auto_log_chat: false });
    assert!(private.log_chat_message("ana", "my headache is back").await.unwrap().is_none());
    assert_eq!(store.count("ana").await.unwrap(), 1);
}

/// Test 6: Chat sessions are snapshotted in place and redacted
#[tokio::test]
async fn test_chat_session_snapshots() {
    let dir = tempfile::TempDir::new().unwrap();
    let (coord, store) = setup(&dir).await;
    let session_id = Uuid::new_v4();

    let mut messages = vec![ChatMessage::new(
        ChatRole::User,
        "Call me on 555-123-4567 about my sleep please",
    )];
    coord.save_chat_session("ana", session_id, &messages).await.unwrap();
    messages.push(ChatMessage::new(ChatRole::Assistant, "Sure."));
    let note = coord
        .save_chat_session("ana", session_id, &messages)
        .await
        .unwrap()
        .unwrap();

    let chat = note.chat.as_ref().unwrap();
    assert_eq!(chat.title, "Call me on [REDACTED_PHONE] ab...");
    assert_eq!(chat.messages.len(), 2);

    let stored = store.load_notes("ana").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, session_id);

    assert!(coord.save_chat_session("ana", Uuid::new_v4(), &[]).await.unwrap().is_none());
}

/// Test 7: Tagging, streak and wipe
#[tokio::test]
async fn test_tag_streak_and_wipe() {
    let dir = tempfile::TempDir::new().unwrap();
    let (coord, _) = setup(&dir).await;

    let note = coord.log_diary("ana", "ok day", None).await.unwrap();
    assert!(coord.tag_note("ana", note.id, "chat-derived").await.unwrap());

    let today = Local::now().date_naive();
    let streak = coord.streak("ana", today).await.unwrap();
    assert_eq!(streak.days, 1);
    assert_eq!(streak.next_unlock, 4);

    assert_eq!(coord.wipe("ana").await.unwrap(), 1);
    assert!(coord.notes("ana").await.unwrap().is_empty());
}

/// Test 8: Related diary entries for a clinical note
#[tokio::test]
async fn test_related_entries() {
    let dir = tempfile::TempDir::new().unwrap();
    let (coord, _) = setup(&dir).await;

    coord.log_diary("ana", "nausea after dinner", None).await.unwrap();
    coord.log_diary("ana", "great run", None).await.unwrap();
    let clinical = coord.log_clinical("ana", "nausea for two days", None).await.unwrap();

    let today = Local::now().date_naive();
    let related = coord.related("ana", clinical.id, today).await.unwrap();
    assert_eq!(related.len(), 1);
    assert!(related[0].raw_text_redacted.starts_with("nausea"));

    assert!(coord.related("ana", Uuid::new_v4(), today).await.is_err());
}
