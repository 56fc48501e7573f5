use crate::models::{DiagnosisResult, QualityScore, ResultsState, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image shown when the results view is opened without navigation state
pub const FALLBACK_PREVIEW: &str = "/placeholder-leaf.jpg";

pub const MODEL_NAME: &str = "CropVision v2.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_percent(confidence: u8) -> Self {
        match confidence {
            85.. => ConfidenceTier::High,
            70..=84 => ConfidenceTier::Medium,
            _ => ConfidenceTier::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentStep {
    pub step: u8,
    pub action: String,
    pub description: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    pub model: String,
    pub detection_id: String,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicImpact {
    pub loss_prevented: String,
    pub treatment_cost: String,
    pub recovery_time: String,
    pub success_rate: String,
}

/// Everything the results screen renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsView {
    pub preview: String,
    pub result: DiagnosisResult,
    pub quality_score: QualityScore,
    /// True when no navigation state was present and the literal data set was used
    pub is_fallback: bool,
    pub details: AnalysisDetails,
}

impl ResultsView {
    /// Build the view from navigation state, or from the fallback data set when the
    /// screen was reached directly.
    pub fn resolve(state: Option<ResultsState>) -> Self {
        Self::resolve_at(state, Utc::now())
    }

    pub fn resolve_at(state: Option<ResultsState>, analyzed_at: DateTime<Utc>) -> Self {
        let (state, is_fallback) = match state {
            Some(state) => (state, false),
            None => {
                tracing::debug!("No navigation state for results view, using fallback data");
                (fallback_state(), true)
            }
        };

        Self {
            preview: state.preview,
            result: state.result,
            quality_score: state.quality_score,
            is_fallback,
            details: AnalysisDetails {
                model: MODEL_NAME.to_string(),
                detection_id: detection_id(analyzed_at),
                analyzed_at,
            },
        }
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_percent(self.result.confidence_percent)
    }

    pub fn severity(&self) -> Severity {
        self.result.severity
    }

    pub fn share_text(&self) -> String {
        format!(
            "Detected {} with {}% confidence",
            self.result.disease_name, self.result.confidence_percent
        )
    }

    pub fn treatment_plan(&self) -> Vec<TreatmentStep> {
        vec![
            TreatmentStep {
                step: 1,
                action: "Immediate Treatment".to_string(),
                description:
                    "Apply copper-based fungicide (Copper oxychloride 50% WP) at 3g/liter"
                        .to_string(),
                timeframe: "Within 24 hours".to_string(),
            },
            TreatmentStep {
                step: 2,
                action: "Follow-up Application".to_string(),
                description: "Repeat treatment after 7-10 days if symptoms persist".to_string(),
                timeframe: "Week 2".to_string(),
            },
            TreatmentStep {
                step: 3,
                action: "Prevention".to_string(),
                description: "Improve field drainage and reduce plant density".to_string(),
                timeframe: "Ongoing".to_string(),
            },
        ]
    }

    pub fn economic_impact(&self) -> EconomicImpact {
        EconomicImpact {
            loss_prevented: self.result.estimated_savings.clone(),
            treatment_cost: "₹500-800".to_string(),
            recovery_time: "2-3 weeks".to_string(),
            success_rate: "85-90%".to_string(),
        }
    }
}

/// The literal data set used when the results view has no navigation state
pub fn fallback_state() -> ResultsState {
    ResultsState {
        preview: FALLBACK_PREVIEW.to_string(),
        result: DiagnosisResult {
            disease_name: "Brown Spot".to_string(),
            confidence_percent: 87,
            severity: Severity::Moderate,
            treatment: "Apply copper-based fungicide every 7-10 days".to_string(),
            estimated_savings: "₹15,000".to_string(),
        },
        quality_score: QualityScore::saturating(85),
    }
}

/// `CVD-` followed by the last six digits of the millisecond timestamp
fn detection_id(at: DateTime<Utc>) -> String {
    format!("CVD-{:06}", at.timestamp_millis().rem_euclid(1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fallback_when_state_missing() {
        let view = ResultsView::resolve(None);
        assert!(view.is_fallback);
        assert_eq!(view.preview, FALLBACK_PREVIEW);
        assert_eq!(view.result.disease_name, "Brown Spot");
        assert_eq!(
            view.result.treatment,
            "Apply copper-based fungicide every 7-10 days"
        );
        assert_eq!(view.quality_score.value(), 85);
        assert_eq!(view.confidence_tier(), ConfidenceTier::High);
    }

    #[test]
    fn test_navigation_state_is_used() {
        let state = ResultsState {
            preview: "data:image/png;base64,AA==".to_string(),
            result: DiagnosisResult {
                disease_name: "Rust".to_string(),
                confidence_percent: 72,
                severity: Severity::Severe,
                treatment: "Apply propiconazole".to_string(),
                estimated_savings: "₹22,000".to_string(),
            },
            quality_score: QualityScore::saturating(91),
        };
        let view = ResultsView::resolve(Some(state));
        assert!(!view.is_fallback);
        assert_eq!(view.severity(), Severity::Severe);
        assert_eq!(view.confidence_tier(), ConfidenceTier::Medium);
        assert_eq!(view.share_text(), "Detected Rust with 72% confidence");
        assert_eq!(view.economic_impact().loss_prevented, "₹22,000");
    }

    #[test]
    fn test_detection_id_uses_last_six_digits() {
        let at = Utc.timestamp_millis_opt(1_705_329_000_042).unwrap();
        let view = ResultsView::resolve_at(None, at);
        assert_eq!(view.details.detection_id, "CVD-000042");
        assert_eq!(view.details.model, "CropVision v2.1");
    }

    #[test]
    fn test_treatment_plan_is_ordered() {
        let plan = ResultsView::resolve(None).treatment_plan();
        let steps: Vec<u8> = plan.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![1, 2, 3]);
        assert_eq!(plan[0].timeframe, "Within 24 hours");
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::from_percent(85), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_percent(70), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_percent(69), ConfidenceTier::Low);
    }
}
