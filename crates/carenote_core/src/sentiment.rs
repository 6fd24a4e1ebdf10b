//! Polarity backends for diary sentiment.
//!
//! The scorer is a capability: `NeutralPolarity` stands in when no backend
//! is configured, `LexiconPolarity` is a small valence-lexicon scorer that
//! produces a compound score in `[-1.0, 1.0]`.

/// Produces a compound polarity score for free text.
pub trait PolarityScorer: Send + Sync {
    /// Polarity in approximately `[-1.0, 1.0]`.
    fn polarity(&self, text: &str) -> f64;

    fn name(&self) -> &'static str;
}

/// Fallback backend: every text is neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralPolarity;

impl PolarityScorer for NeutralPolarity {
    fn polarity(&self, _text: &str) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "neutral"
    }
}

const VALENCE: &[(&str, f64)] = &[
    // positive
    ("happy", 2.7),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("better", 1.9),
    ("best", 3.2),
    ("love", 3.2),
    ("loved", 2.9),
    ("calm", 1.3),
    ("relaxed", 2.2),
    ("rested", 1.6),
    ("energetic", 1.8),
    ("grateful", 2.0),
    ("thankful", 2.0),
    ("hopeful", 2.3),
    ("fine", 0.8),
    ("okay", 0.9),
    ("ok", 0.9),
    ("nice", 1.8),
    ("enjoyed", 2.3),
    ("fun", 2.3),
    ("excited", 1.4),
    ("proud", 2.1),
    ("improved", 2.0),
    ("improving", 1.8),
    ("strong", 2.3),
    ("peaceful", 2.2),
    ("wonderful", 2.7),
    ("amazing", 2.8),
    ("relief", 2.1),
    ("relieved", 1.5),
    ("recovered", 1.7),
    // negative
    ("sad", -2.1),
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("miserable", -2.2),
    ("depressed", -2.3),
    ("anxious", -1.0),
    ("worried", -1.2),
    ("stressed", -1.4),
    ("stress", -1.8),
    ("tired", -1.0),
    ("exhausted", -1.5),
    ("angry", -2.3),
    ("upset", -1.6),
    ("lonely", -1.5),
    ("scared", -1.9),
    ("afraid", -2.0),
    ("hurt", -2.4),
    ("hurts", -2.1),
    ("pain", -2.3),
    ("painful", -2.4),
    ("sick", -2.0),
    ("ill", -1.7),
    ("nausea", -1.3),
    ("dizzy", -0.9),
    ("headache", -1.4),
    ("fever", -1.2),
    ("cry", -2.1),
    ("crying", -2.1),
    ("hopeless", -2.0),
    ("frustrated", -1.5),
    ("overwhelmed", -1.6),
    ("struggling", -1.4),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "without", "dont", "don't", "isn't", "wasn't", "can't",
    "cannot", "didn't", "doesn't", "won't", "hardly",
];

const BOOSTERS: &[&str] = &[
    "very", "really", "extremely", "so", "too", "super", "incredibly", "totally", "especially",
];

const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Valence-lexicon scorer.
///
/// Each known word contributes its valence; a negator within the three
/// preceding words flips and damps it, a booster right before it pushes it
/// further from zero. The sum is squashed with `x / sqrt(x² + α)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconPolarity;

impl LexiconPolarity {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityScorer for LexiconPolarity {
    fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut sum = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(mut valence) = lookup(token) else {
                continue;
            };
            if i > 0 && BOOSTERS.contains(&tokens[i - 1]) {
                valence += BOOSTER_INCREMENT * valence.signum();
            }
            let window = &tokens[i.saturating_sub(3)..i];
            if window.iter().any(|t| NEGATORS.contains(t)) {
                valence *= NEGATION_SCALAR;
            }
            sum += valence;
        }

        normalize(sum)
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn lookup(token: &str) -> Option<f64> {
    VALENCE
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, v)| *v)
}

fn normalize(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}
