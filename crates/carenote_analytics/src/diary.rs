//! Diary scoring: polarity, keyword tags, self-care suggestion and preview.

use crate::text::preview;
use carenote_core::{DiaryResult, NeutralPolarity, PolarityScorer};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub const SUMMARY_CHARS: usize = 50;

pub const SELF_CARE_SUGGESTION: &str =
    "Consider rest, hydration, talking to someone you trust, or a clinician if concerned.";

const TAG_RULES: &[(&str, &[&str])] = &[
    ("symptoms", &["pain", "headache", "fever", "cough"]),
    ("food", &["ate", "food", "lunch", "dinner"]),
    ("mood", &["happy", "sad", "stressed", "anxious"]),
];

/// Scores diary text with a pluggable polarity backend.
#[derive(Clone)]
pub struct SentimentScorer {
    polarity: Arc<dyn PolarityScorer>,
    negative_threshold: f64,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(Arc::new(NeutralPolarity), -0.2)
    }
}

impl SentimentScorer {
    pub fn new(polarity: Arc<dyn PolarityScorer>, negative_threshold: f64) -> Self {
        Self {
            polarity,
            negative_threshold,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.polarity.name()
    }

    pub fn score(&self, text: &str) -> DiaryResult {
        let sentiment = self.polarity.polarity(text);
        let suggestions = if sentiment < self.negative_threshold {
            vec![SELF_CARE_SUGGESTION.to_string()]
        } else {
            Vec::new()
        };

        DiaryResult {
            sentiment,
            tags: keyword_tags(text),
            suggestions,
            summary: preview(text, SUMMARY_CHARS),
        }
    }
}

/// Score with the neutral backend.
pub fn score(text: &str) -> DiaryResult {
    SentimentScorer::default().score(text)
}

/// Presence-based tags; a note may get none, one or several.
pub fn keyword_tags(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    TAG_RULES
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(tag, _)| (*tag).to_string())
        .collect()
}

// ============================================================================
// Mood label
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoodLabel {
    VeryLow,
    Low,
    Neutral,
    Good,
    VeryGood,
}

impl MoodLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Neutral => "Neutral",
            Self::Good => "Good",
            Self::VeryGood => "Very Good",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a sentiment score onto a five-step mood scale.
pub fn mood_label(score: f64) -> MoodLabel {
    if score <= -0.6 {
        MoodLabel::VeryLow
    } else if score <= -0.2 {
        MoodLabel::Low
    } else if score < 0.2 {
        MoodLabel::Neutral
    } else if score < 0.6 {
        MoodLabel::Good
    } else {
        MoodLabel::VeryGood
    }
}
