//! Completeness scoring for clinical (SOAP) notes.

use serde::Serialize;

const SOAP_HEADERS: &[&str] = &["subjective:", "objective:", "assessment:", "plan:"];
const VITALS_HINTS: &[&str] = &["bp", "blood pressure", "temp", "pulse", "hr", "/"];
const DURATION_HINTS: &[&str] = &["days", "weeks", "months", "hours", "since"];
const FOLLOW_UP_HINTS: &[&str] = &["follow-up", "follow up", "return"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityCheck {
    pub label: &'static str,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    /// 0..=100.
    pub score: u32,
    pub checks: Vec<QualityCheck>,
    /// Short names of missing elements: `vitals`, `duration`, `follow-up`.
    pub missing: Vec<&'static str>,
}

/// Score a clinical note from its raw dictation and SOAP rendering.
///
/// Both texts are expected post-redaction; the checks are plain substring
/// tests and rely on vitals and durations surviving redaction.
pub fn quality_score(raw_text: &str, soap_text: &str) -> QualityReport {
    let raw = raw_text.to_lowercase();
    let soap = soap_text.to_lowercase();
    let mut score: i32 = 100;
    let mut checks = Vec::with_capacity(4);
    let mut missing = Vec::new();

    let any_in = |haystack: &str, hints: &[&str]| hints.iter().any(|h| haystack.contains(h));

    if SOAP_HEADERS.iter().all(|h| soap.contains(h)) {
        checks.push(QualityCheck { label: "Formatting S/O/A/P present", passed: true });
    } else {
        checks.push(QualityCheck { label: "Missing standard S/O/A/P headers", passed: false });
        score -= 20;
    }

    let rules: [(&str, &[&str], &str, &str, &'static str); 3] = [
        (raw.as_str(), VITALS_HINTS, "Vitals mentioned", "Missing vitals", "vitals"),
        (raw.as_str(), DURATION_HINTS, "Symptom duration noted", "Missing symptom duration", "duration"),
        (soap.as_str(), FOLLOW_UP_HINTS, "Follow-up plan established", "No clear follow-up stated", "follow-up"),
    ];
    for (haystack, hints, ok, not_ok, name) in rules {
        if any_in(haystack, hints) {
            checks.push(QualityCheck { label: ok, passed: true });
        } else {
            checks.push(QualityCheck { label: not_ok, passed: false });
            score -= 10;
            missing.push(name);
        }
    }

    QualityReport {
        score: score.max(0) as u32,
        checks,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_note() {
        let soap = "Subjective: cough\nObjective: T 99\nAssessment: URI\nPlan: rest, follow up in 1 week";
        let r = quality_score("cough for 3 days, temp 99", soap);
        assert_eq!(r.score, 100);
        assert!(r.missing.is_empty());
        assert!(r.checks.iter().all(|c| c.passed));
    }

    #[test]
    fn test_everything_missing() {
        let r = quality_score("feel off", "feel off");
        assert_eq!(r.score, 50);
        assert_eq!(r.missing, vec!["vitals", "duration", "follow-up"]);
        assert_eq!(r.checks.len(), 4);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let soap = "SUBJECTIVE: a OBJECTIVE: b ASSESSMENT: c PLAN: return if worse";
        let r = quality_score("bp 120/80 since monday", soap);
        assert_eq!(r.score, 100);
    }
}
