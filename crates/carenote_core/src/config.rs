use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CarenoteConfig {
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
    pub context: ContextConfig,
    pub storage: StorageConfig,
    pub privacy: PrivacyConfig,
    pub nlp: NlpConfig,
}

impl CarenoteConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: CarenoteConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("CARENOTE_DB") {
            self.storage.db_path = v;
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `openai`, `azure` or `mock`.
    pub provider: String,
    /// Model name, or the deployment name for Azure.
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    /// Temperature for structured tasks (SOAP formatting, reports).
    pub temperature: f32,
    /// Temperature for conversational replies.
    pub chat_temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            max_tokens: 512,
            temperature: 0.2,
            chat_temperature: 0.3,
        }
    }
}

/// Thresholds for trend analysis and risk alerts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Most recent diary notes considered by the trend analyzer.
    pub trend_window: usize,
    pub top_symptoms: usize,
    /// Slopes strictly below this raise a mood-decline advisory.
    pub mood_decline_slope: f64,
    /// Symptom counts at or above this raise a persistence advisory.
    pub persistence_count: usize,
    /// Sentiment strictly below this adds a self-care suggestion.
    pub negative_sentiment: f64,
    pub related_window_days: i64,
    pub related_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trend_window: 14,
            top_symptoms: 5,
            mood_decline_slope: -0.1,
            persistence_count: 3,
            negative_sentiment: -0.2,
            related_window_days: 14,
            related_limit: 3,
        }
    }
}

/// Per-note character budgets for the assistant context digest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub clinical_chars: usize,
    pub diary_chars: usize,
    pub diary_notes: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            clinical_chars: 100,
            diary_chars: 50,
            diary_notes: 7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "carenote.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Log substantive chat messages as diary notes.
    pub auto_log_chat: bool,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            auto_log_chat: true,
        }
    }
}

/// Optional NLP backends.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NlpConfig {
    /// JSON term list for the entity recognizer. `None` uses the built-in vocabulary.
    pub gazetteer_path: Option<PathBuf>,
    /// Disable entity recognition entirely (keyword rules only).
    pub disable_recognizer: bool,
    /// Use the neutral polarity backend instead of the lexicon scorer.
    pub disable_sentiment: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = CarenoteConfig::default();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.analysis.trend_window, 14);
        assert_eq!(cfg.analysis.top_symptoms, 5);
        assert_eq!(cfg.context.diary_notes, 7);
        assert!(cfg.privacy.auto_log_chat);
        assert!(cfg.nlp.gazetteer_path.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[llm]
provider = "azure"
model = "my-deployment"
"#;
        let cfg: CarenoteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.provider, "azure");
        assert_eq!(cfg.llm.model, "my-deployment");
        // Defaults for unspecified fields
        assert_eq!(cfg.llm.max_tokens, 512);
        assert_eq!(cfg.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[llm]
provider = "openai"
model = "gpt-4o"
base_url = "https://api.openai.com/v1"
max_tokens = 1024
temperature = 0.1
chat_temperature = 0.5

[analysis]
trend_window = 30
top_symptoms = 3
mood_decline_slope = -0.2
persistence_count = 4
negative_sentiment = -0.3
related_window_days = 7
related_limit = 5

[context]
clinical_chars = 200
diary_chars = 80
diary_notes = 10

[storage]
db_path = "data/notes.db"

[privacy]
auto_log_chat = false

[nlp]
gazetteer_path = "terms.json"
disable_sentiment = true
"#;
        let cfg: CarenoteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.max_tokens, 1024);
        assert!((cfg.llm.chat_temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(cfg.analysis.trend_window, 30);
        assert_eq!(cfg.analysis.persistence_count, 4);
        assert_eq!(cfg.context.clinical_chars, 200);
        assert_eq!(cfg.storage.db_path, "data/notes.db");
        assert!(!cfg.privacy.auto_log_chat);
        assert_eq!(cfg.nlp.gazetteer_path, Some(PathBuf::from("terms.json")));
        assert!(cfg.nlp.disable_sentiment);
        assert!(!cfg.nlp.disable_recognizer);
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        // Part 1: env overrides
        std::env::set_var("LLM_PROVIDER", "mock");
        std::env::set_var("LLM_MODEL", "test-model");

        let mut cfg = CarenoteConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.model, "test-model");

        std::env::remove_var("LLM_PROVIDER");
        std::env::remove_var("LLM_MODEL");

        // Part 2: nonexistent path returns defaults (no env interference)
        let cfg = CarenoteConfig::load_or_default("/nonexistent/carenote.toml");
        assert_eq!(cfg.llm.provider, "openai");
    }
}
