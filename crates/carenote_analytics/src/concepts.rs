//! Medical concept extraction.
//!
//! Deterministic rules synthesize vitals and match a fixed symptom list. An
//! optional entity recognizer adds spans bucketed by substring heuristics;
//! its presence never changes what the rules produce.

use carenote_core::{EntityRecognizer, MedicalEntities, NoRecognizer};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

static RE_BP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2,3}/\d{2,3}\b").unwrap());
static RE_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(temp(erature)?|t)\s*[:=]?\s*(\d{2,3}(\.\d)?)\b").unwrap()
});
static RE_HR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(hr|pulse|heart rate)\s*[:=]?\s*(\d{2,3})\b").unwrap());

pub const FALLBACK_SYMPTOMS: &[&str] = &[
    "headache",
    "fever",
    "chills",
    "nausea",
    "vomiting",
    "dizziness",
    "shortness of breath",
    "fatigue",
    "pain",
];

const SYMPTOM_HINTS: &[&str] = &["pain", "ache", "fever", "cough", "nausea", "fatigue", "tired"];
const MEDICATION_HINTS: &[&str] = &["mg", "ml", "tablet", "aspirin", "ibuprofen", "tylenol", "dose"];
const PROCEDURE_HINTS: &[&str] = &["surgery", "x-ray", "mri", "scan", "test", "biopsy"];

#[derive(Default)]
struct Buckets {
    symptoms: BTreeSet<String>,
    conditions: BTreeSet<String>,
    medications: BTreeSet<String>,
    vitals: BTreeSet<String>,
    procedures: BTreeSet<String>,
}

impl Buckets {
    fn into_entities(self) -> MedicalEntities {
        MedicalEntities {
            symptoms: self.symptoms.into_iter().collect(),
            conditions: self.conditions.into_iter().collect(),
            medications: self.medications.into_iter().collect(),
            vitals: self.vitals.into_iter().collect(),
            procedures: self.procedures.into_iter().collect(),
        }
    }
}

/// Extracts medical entities, optionally enriched by a recognizer.
#[derive(Clone)]
pub struct ConceptExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl Default for ConceptExtractor {
    fn default() -> Self {
        Self::rules_only()
    }
}

impl ConceptExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Keyword and vitals rules only.
    pub fn rules_only() -> Self {
        Self::new(Arc::new(NoRecognizer))
    }

    pub fn extract(&self, text: &str) -> MedicalEntities {
        let mut buckets = Buckets::default();
        let lower = text.to_lowercase();

        extract_vitals(text, &lower, &mut buckets.vitals);

        for entity in self.recognizer.find_entities(text) {
            let bucket = match classify_span(&entity.text) {
                SpanKind::Symptom => &mut buckets.symptoms,
                SpanKind::Medication => &mut buckets.medications,
                SpanKind::Procedure => &mut buckets.procedures,
                SpanKind::Condition => &mut buckets.conditions,
            };
            bucket.insert(entity.text);
        }

        for symptom in FALLBACK_SYMPTOMS {
            if lower.contains(symptom) {
                buckets.symptoms.insert((*symptom).to_string());
            }
        }

        buckets.into_entities()
    }
}

/// Rules-only extraction.
pub fn extract(text: &str) -> MedicalEntities {
    ConceptExtractor::rules_only().extract(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Symptom,
    Medication,
    Procedure,
    Condition,
}

fn classify_span(span: &str) -> SpanKind {
    let lower = span.to_lowercase();
    let has = |hints: &[&str]| hints.iter().any(|h| lower.contains(h));
    if has(SYMPTOM_HINTS) {
        SpanKind::Symptom
    } else if has(MEDICATION_HINTS) {
        SpanKind::Medication
    } else if has(PROCEDURE_HINTS) {
        SpanKind::Procedure
    } else {
        SpanKind::Condition
    }
}

fn extract_vitals(text: &str, lower: &str, vitals: &mut BTreeSet<String>) {
    for m in RE_BP.find_iter(text) {
        vitals.insert(format!("BP: {}", m.as_str()));
    }
    for caps in RE_TEMP.captures_iter(lower) {
        if let Some(value) = caps.get(3) {
            vitals.insert(format!("Temp: {}", value.as_str()));
        }
    }
    for caps in RE_HR.captures_iter(lower) {
        if let Some(value) = caps.get(2) {
            vitals.insert(format!("HR: {}", value.as_str()));
        }
    }
}
