use crate::models::{ResultsState, UploadData};
use crate::services::analysis::AnalysisProvider;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Receives a successfully submitted upload and moves the user on to the results view.
///
/// The workflow starts `deliver` as soon as the upload lands and keeps awaiting it after
/// the session has reset, dropping the future if the user clears or navigates away.
#[async_trait::async_trait]
pub trait ResultHandoff: Send + Sync {
    async fn deliver(&self, upload: UploadData) -> Result<()>;
}

/// Asks the analysis provider for a diagnosis and publishes it as navigation state.
///
/// The watch channel holds the latest results for the view holding the receiver.
pub struct DiagnosisHandoff {
    provider: Arc<dyn AnalysisProvider>,
    processing_delay: Duration,
    navigation: watch::Sender<Option<ResultsState>>,
}

impl DiagnosisHandoff {
    pub fn new(
        provider: Arc<dyn AnalysisProvider>,
        processing_delay: Duration,
    ) -> (Self, watch::Receiver<Option<ResultsState>>) {
        let (navigation, rx) = watch::channel(None);
        (
            Self {
                provider,
                processing_delay,
                navigation,
            },
            rx,
        )
    }
}

#[async_trait::async_trait]
impl ResultHandoff for DiagnosisHandoff {
    async fn deliver(&self, upload: UploadData) -> Result<()> {
        tokio::time::sleep(self.processing_delay).await;

        let result = self.provider.diagnose(&upload).await?;
        tracing::info!(
            "🔬 Diagnosis for {}: {} ({}% confidence, {})",
            upload.file.file_name,
            result.disease_name,
            result.confidence_percent,
            result.severity
        );

        let state = ResultsState {
            preview: upload.preview.data_url,
            result,
            quality_score: upload.quality_score,
        };
        // send_replace never fails, even with no subscribers left
        self.navigation.send_replace(Some(state));
        Ok(())
    }
}
