//! Rolling-window trend analysis over diary notes.

use carenote_core::config::AnalysisConfig;
use carenote_core::{Note, NoteError};
use serde::Serialize;
use std::collections::HashMap;

/// Direction and recurring symptoms of the recent diary window.
///
/// Derived on demand, never persisted. An empty summary means
/// "insufficient data", not failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSummary {
    pub sentiment_slope: f64,
    pub sentiment_avg: f64,
    /// `(symptom, count)`, descending by count, ties in first-seen order.
    pub top_symptoms: Vec<(String, usize)>,
    /// Diary notes that made it into the window.
    pub note_count: usize,
}

impl TrendSummary {
    pub fn is_empty(&self) -> bool {
        self.note_count == 0
    }

    pub fn symptom_names(&self) -> impl Iterator<Item = &str> {
        self.top_symptoms.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrendAnalyzer {
    pub window: usize,
    pub top_n: usize,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl TrendAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            window: config.trend_window,
            top_n: config.top_symptoms,
        }
    }

    /// Fails on a diary note without its diary payload instead of leaving
    /// it out of the statistics.
    pub fn analyze(&self, notes: &[Note]) -> Result<TrendSummary, NoteError> {
        let diary = diary_notes(notes)?;
        let window = &diary[diary.len().saturating_sub(self.window)..];
        let sentiments: Vec<f64> = window.iter().filter_map(|n| n.sentiment()).collect();

        Ok(TrendSummary {
            sentiment_slope: ols_slope(&sentiments),
            sentiment_avg: mean(&sentiments),
            top_symptoms: top_symptoms(window, self.top_n),
            note_count: window.len(),
        })
    }
}

/// Analyze with the default 14-note window and top-5 symptoms.
pub fn analyze(notes: &[Note]) -> Result<TrendSummary, NoteError> {
    TrendAnalyzer::default().analyze(notes)
}

/// The diary notes of `notes` in order, each checked against its mode.
pub(crate) fn diary_notes(notes: &[Note]) -> Result<Vec<&Note>, NoteError> {
    notes
        .iter()
        .filter(|n| n.is_diary())
        .map(|n| n.validate().map(|()| n))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Least-squares slope of `values` against their index.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let (mut num, mut den) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn top_symptoms(window: &[&Note], top_n: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for note in window {
        for symptom in &note.medical_entities.symptoms {
            let count = counts.entry(symptom.as_str()).or_insert(0);
            if *count == 0 {
                order.push(symptom.clone());
            }
            *count += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|s| {
            let count = counts[s.as_str()];
            (s, count)
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(top_n);
    ranked
}
