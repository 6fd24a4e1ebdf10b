//! Named-entity recognition capability.
//!
//! Recognition is optional enrichment. `NoRecognizer` is the deterministic
//! fallback, `GazetteerRecognizer` matches a term list, and `LazyRecognizer`
//! defers loading a backend until first use and memoizes the outcome,
//! degrading to no entities when the load fails.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// An entity span as found in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// Text exactly as it appears in the input (original casing).
    pub text: String,
    pub label: String,
}

pub trait EntityRecognizer: Send + Sync {
    fn find_entities(&self, text: &str) -> Vec<RecognizedEntity>;

    fn name(&self) -> &'static str;
}

/// Fallback: recognizes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecognizer;

impl EntityRecognizer for NoRecognizer {
    fn find_entities(&self, _text: &str) -> Vec<RecognizedEntity> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

// ============================================================================
// Gazetteer
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct GazetteerFile {
    terms: Vec<GazetteerTerm>,
}

#[derive(Debug, Clone, Deserialize)]
struct GazetteerTerm {
    text: String,
    label: String,
}

/// Case-insensitive whole-word matcher over a fixed list of ASCII terms.
#[derive(Debug, Clone)]
pub struct GazetteerRecognizer {
    terms: Vec<(String, String)>,
}

impl GazetteerRecognizer {
    /// Non-ASCII terms are dropped so that matched spans always fall on
    /// character boundaries.
    pub fn new<I, S, L>(terms: I) -> Self
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let terms = terms
            .into_iter()
            .map(|(t, l)| (t.into().to_ascii_lowercase(), l.into()))
            .filter(|(t, _)| !t.is_empty() && t.is_ascii())
            .collect();
        Self { terms }
    }

    /// Built-in clinical vocabulary.
    pub fn clinical() -> Self {
        Self::new([
            ("migraine", "DISEASE"),
            ("asthma", "DISEASE"),
            ("diabetes", "DISEASE"),
            ("hypertension", "DISEASE"),
            ("insomnia", "DISEASE"),
            ("anemia", "DISEASE"),
            ("influenza", "DISEASE"),
            ("flu", "DISEASE"),
            ("sore throat", "SYMPTOM"),
            ("back pain", "SYMPTOM"),
            ("chest pain", "SYMPTOM"),
            ("stomach ache", "SYMPTOM"),
            ("cough", "SYMPTOM"),
            ("fatigue", "SYMPTOM"),
            ("nausea", "SYMPTOM"),
            ("ibuprofen", "CHEMICAL"),
            ("aspirin", "CHEMICAL"),
            ("tylenol", "CHEMICAL"),
            ("metformin", "CHEMICAL"),
            ("insulin", "CHEMICAL"),
            ("amoxicillin", "CHEMICAL"),
            ("mri", "PROCEDURE"),
            ("x-ray", "PROCEDURE"),
            ("ct scan", "PROCEDURE"),
            ("blood test", "PROCEDURE"),
            ("biopsy", "PROCEDURE"),
            ("surgery", "PROCEDURE"),
        ])
    }

    /// Load a term list from a JSON file: `{"terms": [{"text": .., "label": ..}]}`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read gazetteer file: {}", path.as_ref().display())
        })?;
        let file: GazetteerFile =
            serde_json::from_str(&raw).context("Failed to parse gazetteer JSON")?;
        if file.terms.is_empty() {
            anyhow::bail!("Gazetteer {} contains no terms", path.as_ref().display());
        }
        Ok(Self::new(file.terms.into_iter().map(|t| (t.text, t.label))))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn find_entities(&self, text: &str) -> Vec<RecognizedEntity> {
        let bytes = text.as_bytes();
        let mut hits: Vec<(usize, RecognizedEntity)> = Vec::new();

        for (term, label) in &self.terms {
            let needle = term.as_bytes();
            if needle.len() > bytes.len() {
                continue;
            }
            for start in 0..=bytes.len() - needle.len() {
                let end = start + needle.len();
                if !bytes[start..end].eq_ignore_ascii_case(needle) {
                    continue;
                }
                let left_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
                let right_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
                if left_ok && right_ok {
                    hits.push((
                        start,
                        RecognizedEntity {
                            text: text[start..end].to_string(),
                            label: label.clone(),
                        },
                    ));
                }
            }
        }

        hits.sort_by_key(|(start, _)| *start);
        hits.into_iter().map(|(_, e)| e).collect()
    }

    fn name(&self) -> &'static str {
        "gazetteer"
    }
}

// ============================================================================
// Lazy loading
// ============================================================================

type Loader = Box<dyn Fn() -> Result<Box<dyn EntityRecognizer>> + Send + Sync>;

/// Loads its backend on first use, once per instance.
///
/// A failed load is remembered as "no recognizer" and never retried.
pub struct LazyRecognizer {
    loader: Loader,
    cell: OnceLock<Option<Box<dyn EntityRecognizer>>>,
}

impl LazyRecognizer {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn EntityRecognizer>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            cell: OnceLock::new(),
        }
    }

    /// Lazily load a gazetteer file.
    pub fn gazetteer_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(move || {
            let g = GazetteerRecognizer::load(&path)?;
            Ok(Box::new(g) as Box<dyn EntityRecognizer>)
        })
    }

    /// The loaded backend, if loading succeeded.
    pub fn get(&self) -> Option<&dyn EntityRecognizer> {
        self.cell
            .get_or_init(|| match (self.loader)() {
                Ok(backend) => {
                    tracing::debug!("Entity recognizer '{}' loaded", backend.name());
                    Some(backend)
                }
                Err(e) => {
                    tracing::debug!("Entity recognizer unavailable, keyword rules only: {:#}", e);
                    None
                }
            })
            .as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.get().is_some()
    }
}

impl EntityRecognizer for LazyRecognizer {
    fn find_entities(&self, text: &str) -> Vec<RecognizedEntity> {
        self.get()
            .map(|backend| backend.find_entities(text))
            .unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        self.get().map(|b| b.name()).unwrap_or("none")
    }
}
