use thiserror::Error;

/// Why the validator turned a candidate away
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("unsupported type: '{mime}' is not a JPG or PNG image")]
    UnsupportedType { mime: String },

    #[error("too large: {size} bytes exceeds maximum allowed {max} bytes")]
    TooLarge { size: usize, max: usize },
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::UnsupportedType { .. } => "INVALID_MIME_TYPE",
            Rejection::TooLarge { .. } => "FILE_TOO_LARGE",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::UnsupportedType { .. } => "unsupported type",
            Rejection::TooLarge { .. } => "too large",
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Analysis failed: {0}")]
    Analysis(anyhow::Error),

    #[error("Submission failed: {0}")]
    Submission(anyhow::Error),

    #[error("A submission is already in progress")]
    Busy,

    #[error("No file was provided")]
    NoCandidate,
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
