use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a candidate file came from. All sources share one validation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadSource {
    FilePicker,
    Camera,
    DragDrop,
}

impl fmt::Display for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadSource::FilePicker => "file picker",
            UploadSource::Camera => "camera",
            UploadSource::DragDrop => "drag and drop",
        };
        f.write_str(name)
    }
}

/// A user-selected file awaiting validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub file_name: String,
    pub declared_mime: String,
    pub size: usize,
    pub bytes: Bytes,
}

impl UploadCandidate {
    pub fn new(
        file_name: impl Into<String>,
        declared_mime: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            file_name: file_name.into(),
            declared_mime: declared_mime.into(),
            size: bytes.len(),
            bytes,
        }
    }
}

/// Decoded, displayable form of an accepted candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewImage {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
}

/// Stand-in for a real image quality metric, always within 0..=100.
///
/// The mock provider draws it at random; it says nothing about the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct QualityScore(u8);

impl QualityScore {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// Clamps values above 100
    pub const fn saturating(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn tier(self) -> QualityTier {
        match self.0 {
            85.. => QualityTier::Excellent,
            70..=84 => QualityTier::Good,
            _ => QualityTier::Poor,
        }
    }
}

impl TryFrom<u8> for QualityScore {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("quality score {} exceeds 100", value))
    }
}

impl From<QualityScore> for u8 {
    fn from(score: QualityScore) -> Self {
        score.0
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Excellent,
    Good,
    Poor,
}

impl QualityTier {
    pub fn message(self) -> &'static str {
        match self {
            QualityTier::Excellent => "Excellent image quality",
            QualityTier::Good => "Good quality - suitable for analysis",
            QualityTier::Poor => "Consider retaking - poor lighting or focus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Case-insensitive parse of the labels shown to farmers
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "mild" => Some(Severity::Mild),
            "moderate" => Some(Severity::Moderate),
            "severe" => Some(Severity::Severe),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Disease finding shown on the results view.
///
/// Not derived from the image: every provider shipped here returns a fixed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub disease_name: String,
    pub confidence_percent: u8,
    pub severity: Severity,
    pub treatment: String,
    pub estimated_savings: String,
}

impl DiagnosisResult {
    /// The record the upload flow hands to the results view
    pub fn brown_spot() -> Self {
        Self {
            disease_name: "Brown Spot".to_string(),
            confidence_percent: 87,
            severity: Severity::Moderate,
            treatment: "Apply copper-based fungicide".to_string(),
            estimated_savings: "₹15,000".to_string(),
        }
    }
}

/// Payload handed to the result handoff after a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadData {
    pub file: UploadCandidate,
    pub preview: PreviewImage,
    pub quality_score: QualityScore,
}

/// Transient navigation state carried to the results view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsState {
    /// Data URL of the uploaded image, or a placeholder path
    pub preview: String,
    pub result: DiagnosisResult,
    pub quality_score: QualityScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// Non-blocking user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}
