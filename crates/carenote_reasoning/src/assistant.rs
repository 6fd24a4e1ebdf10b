//! Care Assistant - grounded chat replies and summaries over a user's notes.
//!
//! Free text from the user is redacted before it is sent to a provider, and
//! red-flag messages never reach the model at all.

use anyhow::Result;
use std::sync::Arc;

use carenote_analytics::text::truncate_chars;
use carenote_analytics::{detect_red_flags, redact, ContextBuilder, SAFETY_MESSAGE};
use carenote_core::config::LlmConfig;
use carenote_core::{ChatMessage, ChatRole, Note};
use carenote_voice::TextToSpeech;

use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{self, ReportKind};

/// Characters of context quoted by the offline reply.
const FALLBACK_CONTEXT_CHARS: usize = 150;
const MAX_MICRO_HABITS: usize = 2;

pub struct CareAssistant {
    llm: Arc<dyn LlmClient>,
    context: ContextBuilder,
    tts: Option<Arc<dyn TextToSpeech>>,
    params: CompletionParams,
    chat_temperature: f32,
}

impl CareAssistant {
    pub fn new(llm: Arc<dyn LlmClient>, context: ContextBuilder, config: &LlmConfig) -> Self {
        Self {
            llm,
            context,
            tts: None,
            params: CompletionParams {
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
            chat_temperature: config.chat_temperature,
        }
    }

    pub fn with_tts(mut self, tts: Arc<dyn TextToSpeech>) -> Self {
        self.tts = Some(tts);
        self
    }

    async fn ask(&self, messages: Vec<ChatMessage>, temperature: f32, task: &str) -> Option<String> {
        match self
            .llm
            .complete(&messages, self.params.with_temperature(temperature))
            .await
        {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("{} via {} failed: {:#}", task, self.llm.provider_name(), e);
                None
            }
        }
    }

    // ========================================================================
    // Chat
    // ========================================================================

    /// Reply to a chat message, grounded in `context` (a digest from the
    /// context builder) and the conversation so far.
    pub async fn chat_reply(&self, message: &str, context: &str, history: &[ChatMessage]) -> String {
        if detect_red_flags(message) {
            tracing::info!("Red flag detected, returning safety message");
            return SAFETY_MESSAGE.to_string();
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(ChatRole::System, prompts::chat_system(context)));
        messages.extend(
            history
                .iter()
                .filter(|m| m.role != ChatRole::System)
                .map(|m| ChatMessage::new(m.role, redact(&m.content))),
        );
        messages.push(ChatMessage::new(ChatRole::User, redact(message)));

        match self.ask(messages, self.chat_temperature, "Chat reply").await {
            Some(reply) => reply,
            None => fallback_reply(context),
        }
    }

    // ========================================================================
    // Single-text tasks
    // ========================================================================

    /// Render a dictation as a SOAP note. `None` when no provider answered.
    pub async fn format_soap(&self, text: &str) -> Option<String> {
        let messages = vec![
            ChatMessage::new(ChatRole::System, prompts::SOAP_SYSTEM),
            ChatMessage::new(ChatRole::User, redact(text)),
        ];
        self.ask(messages, self.params.temperature, "SOAP formatting").await
    }

    /// One short encouraging line about a diary entry.
    pub async fn insight(&self, entry: &str) -> Option<String> {
        let messages = vec![
            ChatMessage::new(ChatRole::System, prompts::INSIGHT_SYSTEM),
            ChatMessage::new(ChatRole::User, redact(entry)),
        ];
        self.ask(messages, prompts::INSIGHT_TEMPERATURE, "Insight").await
    }

    /// Structured notes and follow-up questions from a consultation transcript.
    pub async fn copilot_notes(&self, transcript: &str) -> Option<String> {
        let system = prompts::copilot_system(&redact(transcript));
        self.ask(vec![ChatMessage::new(ChatRole::System, system)], self.params.temperature, "Copilot")
            .await
    }

    // ========================================================================
    // History summaries
    // ========================================================================

    /// `Ok(None)` when no provider answered. A malformed note in `notes` is
    /// an error, never an empty summary.
    pub async fn report(&self, kind: ReportKind, notes: &[Note]) -> Result<Option<String>> {
        let context = self.context.build(notes, kind.includes_clinical(), true)?;
        let system = kind.system_prompt(&context);
        Ok(self
            .ask(
                vec![ChatMessage::new(ChatRole::System, system)],
                kind.temperature(),
                "Report",
            )
            .await)
    }

    pub async fn weekly_summary(&self, notes: &[Note]) -> Result<Option<String>> {
        self.report(ReportKind::Weekly, notes).await
    }

    pub async fn health_twin(&self, notes: &[Note]) -> Result<Option<String>> {
        self.report(ReportKind::HealthTwin, notes).await
    }

    /// At most two short habits; empty when the provider is unavailable.
    pub async fn micro_habits(&self, notes: &[Note]) -> Result<Vec<String>> {
        Ok(self
            .report(ReportKind::MicroHabits, notes)
            .await?
            .map(|text| parse_micro_habits(&text))
            .unwrap_or_default())
    }

    pub async fn question_prep(&self, notes: &[Note]) -> Result<Option<String>> {
        self.report(ReportKind::QuestionPrep, notes).await
    }

    pub async fn care_circle_report(&self, notes: &[Note]) -> Result<Option<String>> {
        self.report(ReportKind::CareCircle, notes).await
    }

    pub async fn monthly_summary(&self, notes: &[Note]) -> Result<Option<String>> {
        self.report(ReportKind::Monthly, notes).await
    }

    pub async fn doctor_prep(&self, notes: &[Note]) -> Result<Option<String>> {
        self.report(ReportKind::DoctorPrep, notes).await
    }

    // ========================================================================
    // Voice
    // ========================================================================

    /// Synthesize a reply. `None` without a TTS backend or on failure.
    pub async fn speak(&self, text: &str) -> Option<Vec<u8>> {
        let tts = self.tts.as_ref()?;
        match tts.synthesize(text).await {
            Ok(audio) => {
                tracing::debug!(
                    "Synthesized {} bytes of {:?} audio with voice {}",
                    audio.len(),
                    tts.output_format(),
                    tts.voice_id()
                );
                Some(audio)
            }
            Err(e) => {
                tracing::warn!("TTS via {} failed: {:#}", tts.provider_name(), e);
                None
            }
        }
    }
}

/// Rule-based reply used when no provider answers.
fn fallback_reply(context: &str) -> String {
    let mut reply = String::from("I hear what you're saying. ");
    if !context.is_empty() {
        reply.push_str("Based on your recent logs, I noticed some context. ");
        reply.push_str(truncate_chars(context, FALLBACK_CONTEXT_CHARS));
        reply.push_str("... ");
    }
    reply.push_str(
        "Have these symptoms or feelings changed recently? Consider resting and staying hydrated. If symptoms persist, please consider speaking with a clinician.",
    );
    reply
}

/// Pull habit lines out of a model reply: bullets and numbering stripped,
/// trivial lines dropped, at most two kept.
pub fn parse_micro_habits(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.trim().chars().count() > 5)
        .map(strip_list_marker)
        .filter(|habit| !habit.is_empty())
        .take(MAX_MICRO_HABITS)
        .map(str::to_string)
        .collect()
}

/// Strip leading bullets (`-`, `*`, `•`) and numbering (`1.`, `2)`).
fn strip_list_marker(line: &str) -> &str {
    let mut rest = line.trim();
    loop {
        let before = rest;
        rest = rest.trim_start_matches(['-', '*', '•']).trim_start();
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 {
            if let Some(stripped) = rest[digits..].strip_prefix(['.', ')']) {
                rest = stripped.trim_start();
            }
        }
        if rest == before {
            return rest;
        }
    }
}
