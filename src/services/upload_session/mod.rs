pub mod state;

pub use state::{Phase, Selection, SubmitTicket, UploadSession};

use crate::config::UploadConfig;
use crate::error::{Result, WorkflowError};
use crate::models::{PreviewImage, QualityScore, ResultsState, UploadCandidate, UploadSource};
use crate::services::analysis::{AnalysisProvider, create_provider};
use crate::services::handoff::{DiagnosisHandoff, ResultHandoff};
use crate::services::notifier::{
    Notifier, analysis_failure_notice, selection_failure_notice, upload_failure_notice,
    upload_success_notice,
};
use crate::services::preview::PreviewService;
use crate::services::transport::{SimulatedTransport, UploadTransport};
use crate::utils::validation::validate_candidate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

/// How a confirmation ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing selected, or a submission was already running
    Ignored,
    /// The upload went through and the results were published
    Delivered,
    /// Cleared while uploading or while the results were being processed
    Cancelled,
}

/// Read-only picture of the session for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub file_name: Option<String>,
    pub preview: Option<PreviewImage>,
    pub quality_score: Option<QualityScore>,
    pub quality_message: Option<&'static str>,
}

/// Drives one upload session: validate, preview, score, submit, hand off.
///
/// All methods take `&self` so a clear can interleave with a running confirmation on the
/// same task. The session lock is never held across an await.
pub struct UploadWorkflow {
    id: Uuid,
    config: UploadConfig,
    provider: Arc<dyn AnalysisProvider>,
    transport: Arc<dyn UploadTransport>,
    handoff: Arc<dyn ResultHandoff>,
    notifier: Arc<dyn Notifier>,
    session: Mutex<UploadSession>,
}

impl UploadWorkflow {
    pub fn new(
        config: UploadConfig,
        provider: Arc<dyn AnalysisProvider>,
        transport: Arc<dyn UploadTransport>,
        handoff: Arc<dyn ResultHandoff>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            provider,
            transport,
            handoff,
            notifier,
            session: Mutex::new(UploadSession::new()),
        }
    }

    /// Wire the provider named in the config, the simulated transport and the diagnosis
    /// handoff. The receiver carries the results view's navigation state.
    pub fn from_config(
        config: UploadConfig,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<(Self, watch::Receiver<Option<ResultsState>>)> {
        config.validate()?;
        let provider: Arc<dyn AnalysisProvider> = Arc::from(create_provider(&config)?);
        let transport = Arc::new(SimulatedTransport::from_config(&config));
        let (handoff, navigation) =
            DiagnosisHandoff::new(provider.clone(), config.processing_delay());
        let workflow = Self::new(config, provider, transport, Arc::new(handoff), notifier);
        Ok((workflow, navigation))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    async fn transition<T>(&self, f: impl FnOnce(UploadSession) -> (UploadSession, T)) -> T {
        let mut guard = self.session.lock().await;
        let (next, out) = f(std::mem::take(&mut *guard));
        *guard = next;
        out
    }

    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase()
    }

    pub async fn snapshot(&self) -> SessionView {
        let session = self.session.lock().await;
        let selection = session.selection();
        SessionView {
            session_id: self.id,
            phase: session.phase(),
            file_name: selection.map(|s| s.candidate.file_name.clone()),
            preview: selection.map(|s| s.preview.clone()),
            quality_score: selection.map(|s| s.quality_score),
            quality_message: selection.map(|s| s.quality_score.tier().message()),
        }
    }

    /// Handle a file arrival from the picker, the camera or a drop.
    ///
    /// Only the first file is considered. A rejected, unreadable or unscorable file
    /// raises a notification and leaves the current selection untouched.
    pub async fn offer<I>(&self, source: UploadSource, files: I) -> Result<Phase>
    where
        I: IntoIterator<Item = UploadCandidate>,
    {
        let Some(candidate) = files.into_iter().next() else {
            debug!(session = %self.id, "Empty {} arrival ignored", source);
            return Err(WorkflowError::NoCandidate);
        };

        if self.session.lock().await.is_busy() {
            warn!(
                session = %self.id,
                "Ignoring {} from {} while a submission is running",
                candidate.file_name, source
            );
            return Err(WorkflowError::Busy);
        }

        match self.prepare(&candidate).await {
            Ok((preview, quality_score)) => {
                let file_name = candidate.file_name.clone();
                let selection = Selection {
                    candidate,
                    preview,
                    quality_score,
                };
                if !self.transition(|s| s.select(selection)).await {
                    return Err(WorkflowError::Busy);
                }
                info!(
                    session = %self.id,
                    "📷 Selected {} from {} (quality {})",
                    file_name, source, quality_score
                );
                Ok(Phase::Selected)
            }
            Err(err) => {
                warn!(
                    session = %self.id,
                    "Rejected {} from {}: {}",
                    candidate.file_name, source, err
                );
                if let Some(notice) = selection_failure_notice(&err, &self.config) {
                    self.notifier.notify(notice);
                }
                Err(err)
            }
        }
    }

    /// Validation, preview and score, computed before anything touches the session
    async fn prepare(&self, candidate: &UploadCandidate) -> Result<(PreviewImage, QualityScore)> {
        validate_candidate(candidate, &self.config)?;
        let preview = PreviewService::generate(candidate).await?;
        let quality_score = self
            .provider
            .assess_quality(&preview)
            .await
            .map_err(WorkflowError::Analysis)?;
        Ok((preview, quality_score))
    }

    /// Submit the current selection.
    ///
    /// Uploading lasts only as long as the transport. Once the upload lands the result
    /// handoff is started, the session resets to Idle and the success notice goes
    /// out; the call then waits for the results while a clear can still cancel them.
    ///
    /// An upload failure reverts to the selection, notifies once and returns the error;
    /// the user retries by confirming again.
    pub async fn confirm(&self) -> Result<SubmitOutcome> {
        let Some(ticket) = self.transition(|s| s.begin_upload()).await else {
            debug!(session = %self.id, "Confirm ignored: nothing selected or already uploading");
            return Ok(SubmitOutcome::Ignored);
        };

        info!(
            session = %self.id,
            "⬆️  Submitting {} ({} bytes)",
            ticket.upload.file.file_name, ticket.upload.file.size
        );

        let sent = tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => return Ok(self.cancelled(&ticket)),
            sent = self.transport.send(&ticket.upload) => sent,
        };
        if let Err(e) = sent {
            return self.fail(&ticket, e).await;
        }

        let delivery = self.handoff.deliver(ticket.upload.clone());
        if !self.transition(|s| s.finish(&ticket)).await {
            return Ok(self.cancelled(&ticket));
        }
        self.notifier.notify(upload_success_notice());
        info!(session = %self.id, "✅ Upload of {} complete", ticket.upload.file.file_name);

        let delivered = tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => return Ok(self.cancelled(&ticket)),
            delivered = delivery => delivered,
        };
        match delivered {
            Ok(()) => {
                info!(session = %self.id, "Results for {} published", ticket.upload.file.file_name);
                Ok(SubmitOutcome::Delivered)
            }
            Err(e) => {
                error!(
                    session = %self.id,
                    "Analysis of {} failed: {:?}",
                    ticket.upload.file.file_name, e
                );
                self.notifier.notify(analysis_failure_notice());
                Err(WorkflowError::Analysis(e))
            }
        }
    }

    fn cancelled(&self, ticket: &SubmitTicket) -> SubmitOutcome {
        info!(
            session = %self.id,
            "Submission of {} cancelled",
            ticket.upload.file.file_name
        );
        SubmitOutcome::Cancelled
    }

    async fn fail(&self, ticket: &SubmitTicket, err: anyhow::Error) -> Result<SubmitOutcome> {
        if !self.transition(|s| s.revert(ticket)).await {
            debug!(session = %self.id, "Failure after cancellation dropped: {}", err);
            return Ok(self.cancelled(ticket));
        }
        error!(
            session = %self.id,
            "Submission of {} failed: {:?}",
            ticket.upload.file.file_name, err
        );
        self.notifier.notify(upload_failure_notice());
        Err(WorkflowError::Submission(err))
    }

    /// Drop the selection and cancel any running submission or results still being
    /// processed. Also used when the user navigates away. Safe to call repeatedly.
    pub async fn clear(&self) {
        let (previous, was_processing) = self
            .transition(|s| {
                let phase = s.phase();
                let processing = s.is_processing();
                (s.clear(), (phase, processing))
            })
            .await;
        if previous != Phase::Idle || was_processing {
            info!(
                session = %self.id,
                "🧹 Selection cleared (was {:?}, processing: {})",
                previous, was_processing
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::{BrokenAnalysisProvider, FixedAnalysisProvider};
    use crate::services::notifier::ChannelNotifier;
    use crate::services::transport::InstantTransport;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png() -> Vec<u8> {
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([10, 200, 10])))
            .write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[tokio::test]
    async fn test_quality_failure_keeps_idle() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let provider = Arc::new(BrokenAnalysisProvider);
        let (handoff, _nav) = DiagnosisHandoff::new(provider.clone(), std::time::Duration::ZERO);
        let workflow = UploadWorkflow::new(
            UploadConfig::development(),
            provider,
            Arc::new(InstantTransport),
            Arc::new(handoff),
            Arc::new(notifier),
        );

        let err = workflow
            .offer(
                UploadSource::FilePicker,
                [UploadCandidate::new("leaf.png", "image/png", png())],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Analysis(_)));
        assert_eq!(workflow.phase().await, Phase::Idle);
        assert_eq!(rx.try_recv().unwrap().title, "Quality check failed");
    }

    #[tokio::test]
    async fn test_snapshot_reports_selection() {
        let (notifier, _rx) = ChannelNotifier::new();
        let provider = Arc::new(FixedAnalysisProvider::default());
        let (handoff, _nav) = DiagnosisHandoff::new(provider.clone(), std::time::Duration::ZERO);
        let workflow = UploadWorkflow::new(
            UploadConfig::development(),
            provider,
            Arc::new(InstantTransport),
            Arc::new(handoff),
            Arc::new(notifier),
        );

        workflow
            .offer(
                UploadSource::Camera,
                [UploadCandidate::new("leaf.png", "image/png", png())],
            )
            .await
            .unwrap();

        let view = workflow.snapshot().await;
        assert_eq!(view.session_id, workflow.id());
        assert_eq!(view.phase, Phase::Selected);
        assert_eq!(view.file_name.as_deref(), Some("leaf.png"));
        assert_eq!(view.quality_score.map(|q| q.value()), Some(85));
        assert_eq!(view.quality_message, Some("Excellent image quality"));
    }
}
