//! # Carenote analytics
//!
//! The note pipeline: redaction, concept extraction, sentiment scoring,
//! trend analysis, risk alerts and context digests. Every function here is
//! pure over its inputs; note history is always passed in explicitly.
//!
//! Data flow:
//!
//! ```text
//! raw text -> redact -> extract + score -> Note (persisted by the caller)
//! note history -> analyze -> alerts
//! note history -> build_context -> assistant prompt
//! ```

pub mod alerts;
pub mod concepts;
pub mod context;
pub mod diary;
pub mod quality;
pub mod red_flags;
pub mod redact;
pub mod related;
pub mod report;
pub mod streak;
pub mod text;
pub mod trend;

pub use alerts::{alerts, AlertPolicy};
pub use concepts::{extract, ConceptExtractor};
pub use context::{build_context, ContextBuilder};
pub use diary::{mood_label, score, MoodLabel, SentimentScorer};
pub use quality::{quality_score, QualityCheck, QualityReport};
pub use red_flags::{detect_red_flags, SAFETY_MESSAGE};
pub use redact::redact;
pub use related::{related_diary_entries, RelatedFinder};
pub use report::health_report;
pub use streak::{streak, Streak};
pub use trend::{analyze, TrendAnalyzer, TrendSummary};

use carenote_core::config::NlpConfig;
use carenote_core::{
    CarenoteConfig, DiaryResult, EntityRecognizer, GazetteerRecognizer, LazyRecognizer,
    LexiconPolarity, MedicalEntities, NeutralPolarity, NoRecognizer, Note, NoteError,
    PolarityScorer,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// The configured pipeline, with backends chosen once at composition time.
#[derive(Clone)]
pub struct Pipeline {
    pub extractor: ConceptExtractor,
    pub scorer: SentimentScorer,
    pub trend: TrendAnalyzer,
    pub policy: AlertPolicy,
    pub context: ContextBuilder,
    pub related: RelatedFinder,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&CarenoteConfig::default())
    }
}

impl Pipeline {
    pub fn from_config(config: &CarenoteConfig) -> Self {
        let analysis = &config.analysis;
        Self {
            extractor: ConceptExtractor::new(recognizer_for(&config.nlp)),
            scorer: SentimentScorer::new(polarity_for(&config.nlp), analysis.negative_sentiment),
            trend: TrendAnalyzer::from_config(analysis),
            policy: AlertPolicy::from_config(analysis),
            context: ContextBuilder::from_config(&config.context, analysis),
            related: RelatedFinder::from_config(analysis),
        }
    }

    pub fn redact(&self, text: &str) -> String {
        redact::redact(text)
    }

    pub fn extract(&self, text: &str) -> MedicalEntities {
        self.extractor.extract(text)
    }

    pub fn score(&self, text: &str) -> DiaryResult {
        self.scorer.score(text)
    }

    pub fn analyze(&self, notes: &[Note]) -> Result<TrendSummary, NoteError> {
        self.trend.analyze(notes)
    }

    /// Trend analysis followed by threshold advisories.
    pub fn alerts(&self, notes: &[Note]) -> Result<Vec<String>, NoteError> {
        Ok(self.policy.alerts(&self.trend.analyze(notes)?))
    }

    pub fn build_context(
        &self,
        notes: &[Note],
        include_clinical: bool,
        include_diary: bool,
    ) -> Result<String, NoteError> {
        self.context.build(notes, include_clinical, include_diary)
    }

    pub fn related<'a>(
        &self,
        entities: &MedicalEntities,
        notes: &'a [Note],
        today: NaiveDate,
    ) -> Result<Vec<&'a Note>, NoteError> {
        self.related.find(entities, notes, today)
    }

    pub fn report(&self, user: &str, notes: &[Note], today: NaiveDate) -> Result<String, NoteError> {
        health_report(user, notes, today, &self.trend)
    }
}

fn recognizer_for(nlp: &NlpConfig) -> Arc<dyn EntityRecognizer> {
    if nlp.disable_recognizer {
        debug!("entity recognizer disabled");
        return Arc::new(NoRecognizer);
    }
    match &nlp.gazetteer_path {
        Some(path) => Arc::new(LazyRecognizer::gazetteer_file(path)),
        None => Arc::new(LazyRecognizer::new(|| {
            Ok(Box::new(GazetteerRecognizer::clinical()) as Box<dyn EntityRecognizer>)
        })),
    }
}

fn polarity_for(nlp: &NlpConfig) -> Arc<dyn PolarityScorer> {
    if nlp.disable_sentiment {
        Arc::new(NeutralPolarity)
    } else {
        Arc::new(LexiconPolarity::new())
    }
}
