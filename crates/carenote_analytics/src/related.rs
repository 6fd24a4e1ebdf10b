//! Diary entries that mention what a clinical note is about.

use carenote_core::config::AnalysisConfig;
use crate::trend::diary_notes;
use carenote_core::{MedicalEntities, Note, NoteError};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct RelatedFinder {
    pub window_days: i64,
    pub limit: usize,
}

impl Default for RelatedFinder {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl RelatedFinder {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            window_days: config.related_window_days,
            limit: config.related_limit,
        }
    }

    /// Recent diary notes, newest first, whose tags or words match the
    /// symptoms or conditions in `entities`.
    pub fn find<'a>(
        &self,
        entities: &MedicalEntities,
        notes: &'a [Note],
        today: NaiveDate,
    ) -> Result<Vec<&'a Note>, NoteError> {
        let terms: HashSet<String> = entities
            .symptoms
            .iter()
            .chain(&entities.conditions)
            .map(|t| t.to_lowercase())
            .collect();
        let diary = diary_notes(notes)?;
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut related = Vec::new();
        for note in diary.into_iter().rev() {
            let Some(date) = note.parsed_date() else {
                debug!(id = %note.id, "skipping note with unparsable date");
                continue;
            };
            if (today - date).num_days() > self.window_days {
                continue;
            }
            if matches_terms(note, &terms) {
                related.push(note);
                if related.len() >= self.limit {
                    break;
                }
            }
        }
        Ok(related)
    }
}

fn matches_terms(note: &Note, terms: &HashSet<String>) -> bool {
    let tag_hit = note
        .diary
        .iter()
        .flat_map(|d| d.tags.iter())
        .any(|t| terms.contains(&t.to_lowercase()));
    tag_hit
        || note
            .raw_text_redacted
            .to_lowercase()
            .split_whitespace()
            .any(|w| terms.contains(w))
}

pub fn related_diary_entries<'a>(
    entities: &MedicalEntities,
    notes: &'a [Note],
    today: NaiveDate,
) -> Result<Vec<&'a Note>, NoteError> {
    RelatedFinder::default().find(entities, notes, today)
}
