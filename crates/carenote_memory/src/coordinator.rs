//! Journal Coordinator - the intake flow and per-user analytics entry points.
//!
//! Intake always runs redact → extract → score on the redacted text, then
//! persists. The unredacted input never leaves this module.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use carenote_analytics::text::preview;
use carenote_analytics::{Pipeline, Streak, TrendSummary};
use carenote_core::config::PrivacyConfig;
use carenote_core::{
    ChatMessage, ChatRole, ChatSession, DiaryResult, MedicalEntities, Note, NoteMode, NoteStore,
};
use carenote_voice::{AudioFormat, SpeechToText, UnavailableStt};

/// Provenance tag for diary notes logged through the check-in flow.
pub const DAILY_CHECK_IN: &str = "Daily Check-in";
/// Provenance tag for diary notes derived from chat messages.
pub const CHAT_INSIGHT: &str = "Chat Insight";

const SESSION_TITLE_CHARS: usize = 30;
const UNTITLED_SESSION: &str = "New Conversation";

/// Minimum absolute sentiment for a chat message to count as substantive.
const CHAT_SENTIMENT_FLOOR: f64 = 0.1;

/// A chat message is worth logging if it carries medical signal or a
/// noticeable mood.
pub fn should_auto_log(entities: &MedicalEntities, diary: &DiaryResult) -> bool {
    !entities.is_empty() || diary.sentiment.abs() > CHAT_SENTIMENT_FLOOR
}

pub struct JournalCoordinator {
    store: Arc<dyn NoteStore>,
    pipeline: Pipeline,
    stt: Arc<dyn SpeechToText>,
    privacy: PrivacyConfig,
}

impl JournalCoordinator {
    pub fn new(store: Arc<dyn NoteStore>, pipeline: Pipeline) -> Self {
        Self {
            store,
            pipeline,
            stt: Arc::new(UnavailableStt),
            privacy: PrivacyConfig::default(),
        }
    }

    pub fn with_stt(mut self, stt: Arc<dyn SpeechToText>) -> Self {
        self.stt = stt;
        self
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    // ========================================================================
    // Intake
    // ========================================================================

    /// Log a diary entry. `provenance` is added as a tag when given.
    pub async fn log_diary(&self, user: &str, text: &str, provenance: Option<&str>) -> Result<Note> {
        let redacted = self.pipeline.redact(text);
        let entities = self.pipeline.extract(&redacted);
        let diary = self.pipeline.score(&redacted);

        let mut note = Note::diary(redacted, entities, diary, Utc::now());
        if let Some(tag) = provenance {
            note.add_tag(tag);
        }
        self.store.append_note(user, &note).await?;

        tracing::info!("Logged diary note {} ({} chars)", note.id, text.chars().count());
        Ok(note)
    }

    /// Log a clinical note. The optional SOAP rendering is redacted as well.
    pub async fn log_clinical(
        &self,
        user: &str,
        text: &str,
        soap_text: Option<&str>,
    ) -> Result<Note> {
        let redacted = self.pipeline.redact(text);
        let entities = self.pipeline.extract(&redacted);
        let soap = soap_text.map(|s| self.pipeline.redact(s));

        let note = Note::clinical(redacted, entities, soap, Utc::now());
        self.store.append_note(user, &note).await?;

        tracing::info!("Logged clinical note {}", note.id);
        Ok(note)
    }

    /// Transcribe a dictation and run it through the diary or clinical intake.
    pub async fn dictate(
        &self,
        user: &str,
        audio: &[u8],
        format: AudioFormat,
        mode: NoteMode,
    ) -> Result<Note> {
        let transcript = self
            .stt
            .transcribe(audio, format)
            .await
            .with_context(|| format!("Transcription via {} failed", self.stt.provider_name()))?;

        match mode {
            NoteMode::Diary => self.log_diary(user, &transcript, Some(DAILY_CHECK_IN)).await,
            NoteMode::Clinical => self.log_clinical(user, &transcript, None).await,
            other => anyhow::bail!("Dictation cannot produce {} notes", other),
        }
    }

    /// Log a chat message as a diary note when it is substantive and chat
    /// logging is enabled. Returns the logged note, if any.
    pub async fn log_chat_message(&self, user: &str, text: &str) -> Result<Option<Note>> {
        if !self.privacy.auto_log_chat {
            return Ok(None);
        }

        let redacted = self.pipeline.redact(text);
        let entities = self.pipeline.extract(&redacted);
        let diary = self.pipeline.score(&redacted);
        if !should_auto_log(&entities, &diary) {
            tracing::debug!("Chat message not substantive, not logged");
            return Ok(None);
        }

        let mut note = Note::diary(redacted, entities, diary, Utc::now());
        note.add_tag(CHAT_INSIGHT);
        self.store.append_note(user, &note).await?;
        tracing::info!("Logged chat insight {}", note.id);
        Ok(Some(note))
    }

    /// Snapshot a chat session, replacing any earlier snapshot with the same id.
    pub async fn save_chat_session(
        &self,
        user: &str,
        session_id: Uuid,
        messages: &[ChatMessage],
    ) -> Result<Option<Note>> {
        if messages.is_empty() {
            return Ok(None);
        }

        let messages: Vec<ChatMessage> = messages
            .iter()
            .map(|m| ChatMessage::new(m.role, self.pipeline.redact(&m.content)))
            .collect();
        let session = ChatSession {
            title: session_title(&messages),
            messages,
        };

        let note = Note::chat_session(session_id, session, Utc::now());
        self.store.upsert_note(user, &note).await?;
        Ok(Some(note))
    }

    /// Add a tag to a stored diary note.
    pub async fn tag_note(&self, user: &str, id: Uuid, tag: &str) -> Result<bool> {
        self.store.add_tag(user, id, tag).await
    }

    /// Delete every note of a user.
    pub async fn wipe(&self, user: &str) -> Result<u64> {
        let removed = self.store.wipe(user).await?;
        tracing::info!("Wiped {} notes", removed);
        Ok(removed)
    }

    // ========================================================================
    // Analytics over the stored history
    // ========================================================================

    pub async fn notes(&self, user: &str) -> Result<Vec<Note>> {
        self.store.load_notes(user).await
    }

    pub async fn trends(&self, user: &str) -> Result<TrendSummary> {
        Ok(self.pipeline.analyze(&self.notes(user).await?)?)
    }

    pub async fn alerts(&self, user: &str) -> Result<Vec<String>> {
        Ok(self.pipeline.alerts(&self.notes(user).await?)?)
    }

    pub async fn context(&self, user: &str, include_clinical: bool, include_diary: bool) -> Result<String> {
        let notes = self.notes(user).await?;
        Ok(self.pipeline.build_context(&notes, include_clinical, include_diary)?)
    }

    pub async fn streak(&self, user: &str, today: NaiveDate) -> Result<Streak> {
        Ok(carenote_analytics::streak(&self.notes(user).await?, today))
    }

    pub async fn report(&self, user: &str, today: NaiveDate) -> Result<String> {
        Ok(self.pipeline.report(user, &self.notes(user).await?, today)?)
    }

    /// Diary notes related to a stored clinical note.
    pub async fn related(&self, user: &str, clinical_id: Uuid, today: NaiveDate) -> Result<Vec<Note>> {
        let notes = self.notes(user).await?;
        let Some(clinical) = notes.iter().find(|n| n.id == clinical_id) else {
            anyhow::bail!("No note {} for this user", clinical_id);
        };
        Ok(self
            .pipeline
            .related(&clinical.medical_entities, &notes, today)?
            .into_iter()
            .cloned()
            .collect())
    }
}

fn session_title(messages: &[ChatMessage]) -> String {
    match messages.iter().find(|m| m.role == ChatRole::User) {
        Some(first) if first.content.chars().count() > SESSION_TITLE_CHARS => {
            preview(&first.content, SESSION_TITLE_CHARS)
        }
        Some(first) => first.content.clone(),
        None => UNTITLED_SESSION.to_string(),
    }
}
