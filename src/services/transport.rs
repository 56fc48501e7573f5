use crate::config::UploadConfig;
use crate::models::UploadData;
use anyhow::{Result, anyhow};
use std::time::Duration;

/// Carries an accepted upload to wherever it is analysed.
///
/// Nothing leaves the process today; implementations only model latency and failure.
#[async_trait::async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, upload: &UploadData) -> Result<()>;
}

/// Waits a fixed delay and reports success
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.submit_delay())
    }
}

#[async_trait::async_trait]
impl UploadTransport for SimulatedTransport {
    async fn send(&self, upload: &UploadData) -> Result<()> {
        tracing::debug!(
            "Simulating upload of {} ({} bytes) over {:?}",
            upload.file.file_name,
            upload.file.size,
            self.delay
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Completes immediately
pub struct InstantTransport;

#[async_trait::async_trait]
impl UploadTransport for InstantTransport {
    async fn send(&self, _upload: &UploadData) -> Result<()> {
        Ok(())
    }
}

/// Always fails, for exercising the retry path
pub struct FailingTransport {
    reason: String,
}

impl FailingTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl UploadTransport for FailingTransport {
    async fn send(&self, _upload: &UploadData) -> Result<()> {
        Err(anyhow!("{}", self.reason))
    }
}
