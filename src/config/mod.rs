use std::env;
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Default maximum upload size: 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Configuration for the crop image upload workflow
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_quality_range"))]
pub struct UploadConfig {
    /// Maximum file size in bytes (default: 10 MiB)
    #[validate(range(min = 1, message = "Maximum file size must be positive"))]
    pub max_file_size: usize,

    /// Accepted declared media types (default: image/jpeg, image/jpg, image/png)
    #[validate(length(min = 1, message = "At least one media type must be accepted"))]
    pub accepted_mime_types: Vec<String>,

    /// Simulated upload latency in milliseconds (default: 2000)
    pub submit_delay_ms: u64,

    /// Simulated analysis time before results are published (default: 2000)
    pub processing_delay_ms: u64,

    /// Lower bound of the mocked quality score (default: 70)
    pub quality_min: u8,

    /// Upper bound of the mocked quality score (default: 100)
    #[validate(range(max = 100, message = "Quality score cannot exceed 100"))]
    pub quality_max: u8,

    /// Analysis provider: "mock" or "fixed" (default: "mock")
    pub analysis_provider: String,
}

fn validate_quality_range(config: &UploadConfig) -> Result<(), ValidationError> {
    if config.quality_min > config.quality_max {
        let mut err = ValidationError::new("quality_range");
        err.message = Some("quality_min must not exceed quality_max".into());
        return Err(err);
    }
    Ok(())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            accepted_mime_types: crate::utils::validation::ACCEPTED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            submit_delay_ms: 2000,
            processing_delay_ms: 2000,
            quality_min: 70,
            quality_max: 100,
            analysis_provider: "mock".to_string(),
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Missing or unparsable values keep
    /// their defaults, as does a media type list with no entries.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            max_file_size: parse_var(&lookup, "MAX_FILE_SIZE")
                .unwrap_or(default.max_file_size),

            accepted_mime_types: lookup("ACCEPTED_MIME_TYPES")
                .map(|v| {
                    v.split(',')
                        .map(|m| m.trim().to_lowercase())
                        .filter(|m| !m.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|list| !list.is_empty())
                .unwrap_or(default.accepted_mime_types),

            submit_delay_ms: parse_var(&lookup, "SUBMIT_DELAY_MS")
                .unwrap_or(default.submit_delay_ms),
            processing_delay_ms: parse_var(&lookup, "PROCESSING_DELAY_MS")
                .unwrap_or(default.processing_delay_ms),
            quality_min: parse_var(&lookup, "QUALITY_MIN").unwrap_or(default.quality_min),
            quality_max: parse_var(&lookup, "QUALITY_MAX").unwrap_or(default.quality_max),

            analysis_provider: lookup("ANALYSIS_PROVIDER")
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or(default.analysis_provider),
        }
    }

    /// Create config for development (no simulated latency)
    pub fn development() -> Self {
        Self {
            submit_delay_ms: 0,
            processing_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Create config for production (the product's fixed timings and limits)
    pub fn production() -> Self {
        Self::default()
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    /// Maximum size rendered the way the uploader shows it, e.g. "10.0"
    pub fn max_size_mb_label(&self) -> String {
        format!("{:.1}", self.max_file_size as f64 / 1_048_576.0)
    }
}
