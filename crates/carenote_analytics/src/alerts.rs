//! Threshold advisories derived from a trend summary.

use crate::trend::TrendSummary;
use carenote_core::config::AnalysisConfig;

pub const MOOD_DECLINE_ADVISORY: &str =
    "Mood Alert: Your sentiment has been trending downwards recently. Consider practicing self-care or speaking with someone you trust.";

pub const ESCALATION_ADVISORY: &str =
    "Smart Escalation: Persistent symptoms detected. Please use the Care Circle feature to generate a report and consult a healthcare professional.";

#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    /// Mood advisory fires when the slope is strictly below this.
    pub mood_decline_slope: f64,
    /// Minimum count for a persistence advisory.
    pub persistence_count: usize,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl AlertPolicy {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            mood_decline_slope: config.mood_decline_slope,
            persistence_count: config.persistence_count,
        }
    }

    pub fn alerts(&self, trend: &TrendSummary) -> Vec<String> {
        let mut out = Vec::new();
        if trend.sentiment_slope < self.mood_decline_slope {
            out.push(MOOD_DECLINE_ADVISORY.to_string());
        }

        let mut persistent = false;
        for (symptom, count) in &trend.top_symptoms {
            if *count >= self.persistence_count {
                persistent = true;
                out.push(format!(
                    "Persistence Alert: You reported '{}' {} times recently. Consider consulting a clinician if it persists.",
                    symptom, count
                ));
            }
        }
        if persistent {
            out.push(ESCALATION_ADVISORY.to_string());
        }
        out
    }
}

/// Advisories under the default thresholds.
pub fn alerts(trend: &TrendSummary) -> Vec<String> {
    AlertPolicy::default().alerts(trend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(slope: f64, symptoms: &[(&str, usize)]) -> TrendSummary {
        TrendSummary {
            sentiment_slope: slope,
            sentiment_avg: 0.0,
            top_symptoms: symptoms.iter().map(|(s, c)| (s.to_string(), *c)).collect(),
            note_count: 5,
        }
    }

    #[test]
    fn test_empty_trend_has_no_alerts() {
        assert!(alerts(&TrendSummary::default()).is_empty());
    }

    #[test]
    fn test_slope_boundary_is_strict() {
        assert!(alerts(&trend(-0.1, &[])).is_empty());
        assert_eq!(alerts(&trend(-0.1000001, &[])), vec![MOOD_DECLINE_ADVISORY]);
    }

    #[test]
    fn test_persistence_and_single_escalation() {
        let out = alerts(&trend(0.0, &[("cough", 4), ("fatigue", 3), ("nausea", 2)]));
        assert_eq!(out.len(), 3);
        assert!(out[0].contains("'cough' 4 times"));
        assert!(out[1].contains("'fatigue' 3 times"));
        assert_eq!(out[2], ESCALATION_ADVISORY);
    }

    #[test]
    fn test_order_mood_first() {
        let out = alerts(&trend(-0.5, &[("pain", 3)]));
        assert_eq!(out[0], MOOD_DECLINE_ADVISORY);
        assert!(out[1].starts_with("Persistence Alert"));
        assert_eq!(out.last().map(String::as_str), Some(ESCALATION_ADVISORY));
    }

    #[test]
    fn test_custom_policy() {
        let policy = AlertPolicy {
            mood_decline_slope: -0.3,
            persistence_count: 2,
        };
        let out = policy.alerts(&trend(-0.2, &[("nausea", 2)]));
        assert_eq!(out.len(), 2);
    }
}
