//! Bounded context digest used to ground assistant replies.

use crate::text::preview;
use crate::trend::{diary_notes, TrendAnalyzer};
use carenote_core::config::{AnalysisConfig, ContextConfig};
use carenote_core::{Note, NoteError};
use std::fmt::Write;

#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    /// Per-note character budget for the clinical note.
    pub clinical_chars: usize,
    /// Per-note character budget for each diary line.
    pub diary_chars: usize,
    pub diary_notes: usize,
    pub trend: TrendAnalyzer,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default(), &AnalysisConfig::default())
    }
}

impl ContextBuilder {
    pub fn from_config(context: &ContextConfig, analysis: &AnalysisConfig) -> Self {
        Self {
            clinical_chars: context.clinical_chars,
            diary_chars: context.diary_chars,
            diary_notes: context.diary_notes,
            trend: TrendAnalyzer::from_config(analysis),
        }
    }

    /// Render the digest. Empty categories are omitted and an empty result
    /// is an empty string; callers supply their own "no data" text.
    pub fn build(
        &self,
        notes: &[Note],
        include_clinical: bool,
        include_diary: bool,
    ) -> Result<String, NoteError> {
        let mut out = String::new();

        if include_clinical {
            if let Some(last) = notes.iter().rev().find(|n| n.is_clinical()) {
                let _ = writeln!(
                    out,
                    "Last Clinical Note ({}): {}",
                    last.date,
                    preview(&last.raw_text_redacted, self.clinical_chars)
                );
            }
        }

        if include_diary {
            let diary = diary_notes(notes)?;
            let recent = &diary[diary.len().saturating_sub(self.diary_notes)..];
            if !recent.is_empty() {
                let _ = writeln!(out, "Last {} Diary Entries:", recent.len());
                for note in recent {
                    let _ = writeln!(
                        out,
                        "- {}: {}",
                        note.date,
                        preview(&note.raw_text_redacted, self.diary_chars)
                    );
                }
            }

            if !diary.is_empty() {
                let trend = self.trend.analyze(notes)?;
                let symptoms: Vec<&str> = trend.symptom_names().collect();
                let _ = writeln!(out, "\nRecent Mood Avg: {:.2}", trend.sentiment_avg);
                let _ = writeln!(out, "Recent Top Symptoms: {}", symptoms.join(", "));
            }
        }

        Ok(out.trim().to_string())
    }
}

/// Digest with the default budgets.
pub fn build_context(
    notes: &[Note],
    include_clinical: bool,
    include_diary: bool,
) -> Result<String, NoteError> {
    ContextBuilder::default().build(notes, include_clinical, include_diary)
}
