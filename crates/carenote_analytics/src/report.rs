//! Plain-text health report for sharing with a caregiver or clinician.

use crate::diary::mood_label;
use crate::text::preview;
use crate::trend::TrendAnalyzer;
use carenote_core::{Note, NoteError};
use chrono::NaiveDate;
use std::fmt::Write;

pub const REPORT_TITLE: &str = "Monthly Health Report";
pub const TIMELINE_NOTES: usize = 10;
pub const TIMELINE_CHARS: usize = 80;

pub const DISCLAIMER: &str = "DISCLAIMER: This report is generated for informational purposes only and does not constitute medical advice, diagnosis, or treatment. Always seek the advice of your physician or other qualified health provider with any questions you may have regarding a medical condition.";

/// Render the report. The mood summary appears only when diary notes exist.
pub fn health_report(
    user: &str,
    notes: &[Note],
    today: NaiveDate,
    analyzer: &TrendAnalyzer,
) -> Result<String, NoteError> {
    let mut out = String::new();
    let _ = writeln!(out, "{REPORT_TITLE}");
    let _ = writeln!(out, "Patient: {user}");
    let _ = writeln!(out, "Report Date: {}", today.format("%Y-%m-%d"));

    let _ = writeln!(out, "\nSummary Over Time");
    let trend = analyzer.analyze(notes)?;
    if !trend.is_empty() {
        let avg = trend.sentiment_avg;
        let _ = writeln!(out, "Mood Trend: {} (Avg Score: {:.2})", mood_label(avg), avg);
        let symptoms: Vec<String> = trend
            .top_symptoms
            .iter()
            .map(|(s, c)| format!("{s} ({c})"))
            .collect();
        let symptoms = if symptoms.is_empty() {
            "None reported".to_string()
        } else {
            symptoms.join(", ")
        };
        let _ = writeln!(out, "Frequent Symptoms: {symptoms}");
    }

    let _ = writeln!(out, "\nRecent Timeline Highlights");
    for note in &notes[notes.len().saturating_sub(TIMELINE_NOTES)..] {
        let _ = writeln!(
            out,
            "[{}] {}",
            note.date,
            preview(&note.raw_text_redacted, TIMELINE_CHARS)
        );
    }

    let _ = write!(out, "\n{DISCLAIMER}");
    Ok(out)
}
