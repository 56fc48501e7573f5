use crate::config::UploadConfig;
use crate::models::{DiagnosisResult, PreviewImage, QualityScore, UploadData};
use anyhow::{Result, anyhow};
use rand::Rng;

/// Source of quality scores and diagnoses.
///
/// The state machine only talks to this trait, so a real model can replace the mock
/// without touching the upload workflow.
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Score how usable the accepted image is for analysis
    async fn assess_quality(&self, preview: &PreviewImage) -> Result<QualityScore>;

    /// Produce the finding shown on the results view
    async fn diagnose(&self, upload: &UploadData) -> Result<DiagnosisResult>;
}

/// Placeholder provider: random score in the configured range, fixed diagnosis.
///
/// Scores from this provider are not authoritative.
pub struct MockAnalysisProvider {
    min: u8,
    max: u8,
}

impl MockAnalysisProvider {
    pub fn new(min: u8, max: u8) -> Result<Self> {
        if min > max || max > QualityScore::MAX {
            return Err(anyhow!("Invalid quality range {}..={}", min, max));
        }
        Ok(Self { min, max })
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self> {
        Self::new(config.quality_min, config.quality_max)
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for MockAnalysisProvider {
    async fn assess_quality(&self, preview: &PreviewImage) -> Result<QualityScore> {
        let value = rand::thread_rng().gen_range(self.min..=self.max);
        tracing::debug!(
            "Mock quality score {} for {}x{} image",
            value,
            preview.width,
            preview.height
        );
        QualityScore::new(value).ok_or_else(|| anyhow!("Score {} out of range", value))
    }

    async fn diagnose(&self, _upload: &UploadData) -> Result<DiagnosisResult> {
        Ok(DiagnosisResult::brown_spot())
    }
}

/// Deterministic provider with a caller-chosen score and diagnosis
pub struct FixedAnalysisProvider {
    score: QualityScore,
    diagnosis: DiagnosisResult,
}

impl FixedAnalysisProvider {
    pub fn new(score: QualityScore, diagnosis: DiagnosisResult) -> Self {
        Self { score, diagnosis }
    }
}

impl Default for FixedAnalysisProvider {
    fn default() -> Self {
        Self {
            score: QualityScore::saturating(85),
            diagnosis: DiagnosisResult::brown_spot(),
        }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for FixedAnalysisProvider {
    async fn assess_quality(&self, _preview: &PreviewImage) -> Result<QualityScore> {
        Ok(self.score)
    }

    async fn diagnose(&self, _upload: &UploadData) -> Result<DiagnosisResult> {
        Ok(self.diagnosis.clone())
    }
}

/// Provider whose quality check always fails (for testing)
#[cfg(test)]
pub struct BrokenAnalysisProvider;

#[cfg(test)]
#[async_trait::async_trait]
impl AnalysisProvider for BrokenAnalysisProvider {
    async fn assess_quality(&self, _preview: &PreviewImage) -> Result<QualityScore> {
        Err(anyhow!("quality model unavailable"))
    }

    async fn diagnose(&self, _upload: &UploadData) -> Result<DiagnosisResult> {
        Err(anyhow!("diagnosis model unavailable"))
    }
}

/// Factory function to create the provider named in the config
pub fn create_provider(config: &UploadConfig) -> Result<Box<dyn AnalysisProvider>> {
    match config.analysis_provider.to_lowercase().as_str() {
        "mock" => Ok(Box::new(MockAnalysisProvider::from_config(config)?)),
        "fixed" => Ok(Box::new(FixedAnalysisProvider::default())),
        other => {
            tracing::warn!("Unknown analysis provider '{}', using mock provider", other);
            Ok(Box::new(MockAnalysisProvider::from_config(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview() -> PreviewImage {
        PreviewImage {
            data_url: "data:image/png;base64,".to_string(),
            mime: "image/png".to_string(),
            width: 4,
            height: 4,
        }
    }

    #[tokio::test]
    async fn test_mock_scores_stay_in_range() {
        let provider = MockAnalysisProvider::new(70, 100).unwrap();
        for _ in 0..500 {
            let score = provider.assess_quality(&preview()).await.unwrap().value();
            assert!((70..=100).contains(&score), "score {} out of range", score);
        }
    }

    #[tokio::test]
    async fn test_mock_single_point_range() {
        let provider = MockAnalysisProvider::new(92, 92).unwrap();
        assert_eq!(provider.assess_quality(&preview()).await.unwrap().value(), 92);
    }

    #[test]
    fn test_mock_rejects_bad_range() {
        assert!(MockAnalysisProvider::new(90, 80).is_err());
        assert!(MockAnalysisProvider::new(70, 101).is_err());
    }

    #[tokio::test]
    async fn test_broken_provider_errors() {
        assert!(BrokenAnalysisProvider.assess_quality(&preview()).await.is_err());
    }

    #[tokio::test]
    async fn test_create_provider() {
        let mut config = UploadConfig::default();
        config.analysis_provider = "fixed".to_string();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.assess_quality(&preview()).await.unwrap().value(), 85);

        config.analysis_provider = "something-else".to_string();
        assert!(create_provider(&config).is_ok());
    }
}
