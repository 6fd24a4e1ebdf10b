//! The note model: the atomic unit of logged health information.
//!
//! Notes are created once by the intake flow and are immutable afterwards,
//! except for tag augmentation on diary notes. Shape errors (a diary note
//! without its diary payload, a chat session without messages) are rejected
//! at every construction boundary, including deserialization.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Calendar-day format used by `Note::date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Errors
// ============================================================================

/// A note whose shape does not match its mode.
///
/// These are programming errors, distinct from the graceful degradation
/// used for missing optional backends, and must never be swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("diary note {0} has no diary payload")]
    MissingDiary(Uuid),
    #[error("chat session note {0} has no chat payload")]
    MissingChatSession(Uuid),
    #[error("unknown note mode '{0}'")]
    UnknownMode(String),
}

// ============================================================================
// Mode
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteMode {
    Diary,
    /// Structured SOAP-style note. Older stores wrote this mode as `soap`.
    #[serde(alias = "soap")]
    Clinical,
    ChatSession,
    Document,
}

impl NoteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diary => "diary",
            Self::Clinical => "clinical",
            Self::ChatSession => "chat_session",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for NoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteMode {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diary" => Ok(Self::Diary),
            "clinical" | "soap" => Ok(Self::Clinical),
            "chat_session" | "chat" => Ok(Self::ChatSession),
            "document" => Ok(Self::Document),
            other => Err(NoteError::UnknownMode(other.to_string())),
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Extracted medical signal, one sorted list of distinct strings per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalEntities {
    pub symptoms: Vec<String>,
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
    pub vitals: Vec<String>,
    pub procedures: Vec<String>,
}

impl MedicalEntities {
    /// True when no category holds any entity.
    pub fn is_empty(&self) -> bool {
        self.categories().iter().all(|(_, items)| items.is_empty())
    }

    /// Categories in display order, paired with their names.
    pub fn categories(&self) -> [(&'static str, &[String]); 5] {
        [
            ("symptoms", &self.symptoms),
            ("conditions", &self.conditions),
            ("medications", &self.medications),
            ("vitals", &self.vitals),
            ("procedures", &self.procedures),
        ]
    }
}

/// Sentiment and keyword analysis attached to diary notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryResult {
    /// Compound mood score in `[-1.0, 1.0]`.
    pub sentiment: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// UI preview only, never analysed.
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalNote {
    /// SOAP-formatted rendering of the redacted dictation.
    #[serde(alias = "text")]
    pub soap_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub title: String,
    pub messages: Vec<ChatMessage>,
}

// ============================================================================
// Note
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NoteRecord")]
pub struct Note {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Calendar day (`YYYY-MM-DD`), used for streak and grouping logic.
    /// Usually derived from `timestamp` but may be supplied explicitly, so
    /// readers must tolerate values that do not parse.
    pub date: String,
    pub mode: NoteMode,
    /// PHI-redacted text. The unredacted input is never stored.
    #[serde(default)]
    pub raw_text_redacted: String,
    #[serde(default)]
    pub medical_entities: MedicalEntities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diary: Option<DiaryResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical: Option<ClinicalNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatSession>,
}

/// Unvalidated wire shape of a note.
#[derive(Deserialize)]
struct NoteRecord {
    id: Uuid,
    timestamp: DateTime<Utc>,
    date: String,
    mode: NoteMode,
    #[serde(default)]
    raw_text_redacted: String,
    #[serde(default)]
    medical_entities: MedicalEntities,
    #[serde(default, alias = "soap")]
    clinical: Option<ClinicalNote>,
    #[serde(default)]
    diary: Option<DiaryResult>,
    #[serde(default)]
    chat: Option<ChatSession>,
}

impl TryFrom<NoteRecord> for Note {
    type Error = NoteError;

    fn try_from(r: NoteRecord) -> Result<Self, Self::Error> {
        let note = Note {
            id: r.id,
            timestamp: r.timestamp,
            date: r.date,
            mode: r.mode,
            raw_text_redacted: r.raw_text_redacted,
            medical_entities: r.medical_entities,
            diary: r.diary,
            clinical: r.clinical,
            chat: r.chat,
        };
        note.validate()?;
        Ok(note)
    }
}

impl Note {
    fn base(mode: NoteMode, text: String, entities: MedicalEntities, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: at,
            date: day_of(at),
            mode,
            raw_text_redacted: text,
            medical_entities: entities,
            diary: None,
            clinical: None,
            chat: None,
        }
    }

    /// A diary note. `redacted_text` must already have passed through redaction.
    pub fn diary(
        redacted_text: impl Into<String>,
        entities: MedicalEntities,
        diary: DiaryResult,
        at: DateTime<Utc>,
    ) -> Self {
        let mut note = Self::base(NoteMode::Diary, redacted_text.into(), entities, at);
        note.diary = Some(diary);
        note
    }

    pub fn clinical(
        redacted_text: impl Into<String>,
        entities: MedicalEntities,
        soap_text: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        let mut note = Self::base(NoteMode::Clinical, redacted_text.into(), entities, at);
        note.clinical = soap_text.map(|soap_text| ClinicalNote { soap_text });
        note
    }

    pub fn document(
        redacted_text: impl Into<String>,
        entities: MedicalEntities,
        at: DateTime<Utc>,
    ) -> Self {
        Self::base(NoteMode::Document, redacted_text.into(), entities, at)
    }

    /// A chat transcript snapshot, keyed by the session id so later saves replace it.
    pub fn chat_session(id: Uuid, session: ChatSession, at: DateTime<Utc>) -> Self {
        let mut note = Self::base(NoteMode::ChatSession, String::new(), MedicalEntities::default(), at);
        note.id = id;
        note.chat = Some(session);
        note
    }

    /// Override the derived calendar day.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Check that the payloads match the mode.
    pub fn validate(&self) -> Result<(), NoteError> {
        match self.mode {
            NoteMode::Diary if self.diary.is_none() => Err(NoteError::MissingDiary(self.id)),
            NoteMode::ChatSession if self.chat.is_none() => {
                Err(NoteError::MissingChatSession(self.id))
            }
            _ => Ok(()),
        }
    }

    pub fn is_diary(&self) -> bool {
        self.mode == NoteMode::Diary
    }

    pub fn is_clinical(&self) -> bool {
        self.mode == NoteMode::Clinical
    }

    /// Sentiment of a diary note.
    pub fn sentiment(&self) -> Option<f64> {
        self.diary.as_ref().map(|d| d.sentiment)
    }

    /// The calendar day, or `None` when `date` is malformed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }

    /// Add a provenance tag to a diary note. Returns `false` for other modes
    /// or when the tag was already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        match self.diary.as_mut() {
            Some(diary) => diary.tags.insert(tag.to_string()),
            None => false,
        }
    }
}

/// Local calendar day of an instant.
pub fn day_of(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DATE_FORMAT).to_string()
}
