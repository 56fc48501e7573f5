use crate::config::UploadConfig;
use crate::error::{Rejection, WorkflowError};
use crate::models::Notification;
use tokio::sync::mpsc;

/// Sink for user-visible toast messages
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log only
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        if notification.is_destructive() {
            tracing::warn!("🔔 {}: {}", notification.title, notification.description);
        } else {
            tracing::info!("🔔 {}: {}", notification.title, notification.description);
        }
    }
}

/// Forwards notifications to whoever holds the receiver (a UI loop or a test)
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped, message discarded");
        }
    }
}

pub fn rejection_notice(rejection: &Rejection, config: &UploadConfig) -> Notification {
    match rejection {
        Rejection::UnsupportedType { .. } => {
            Notification::destructive("Invalid file type", "Please select a JPG or PNG image")
        }
        Rejection::TooLarge { .. } => Notification::destructive(
            "File too large",
            format!(
                "Please select an image smaller than {}MB",
                config.max_size_mb_label()
            ),
        ),
    }
}

/// Message for anything that stops a file from becoming the selection.
///
/// Empty and busy arrivals are dropped silently and get no message.
pub fn selection_failure_notice(
    err: &WorkflowError,
    config: &UploadConfig,
) -> Option<Notification> {
    match err {
        WorkflowError::Rejected(rejection) => Some(rejection_notice(rejection, config)),
        WorkflowError::Decode(_) => Some(Notification::destructive(
            "Unreadable image",
            "The selected file could not be decoded as an image",
        )),
        WorkflowError::Analysis(_) => Some(Notification::destructive(
            "Quality check failed",
            "Please try another image",
        )),
        WorkflowError::Submission(_) => Some(upload_failure_notice()),
        WorkflowError::Busy | WorkflowError::NoCandidate => None,
    }
}

pub fn upload_success_notice() -> Notification {
    Notification::info(
        "Image uploaded successfully",
        "Analyzing your crop for disease detection...",
    )
}

pub fn upload_failure_notice() -> Notification {
    Notification::destructive("Upload failed", "Please try again")
}

/// The upload landed but no diagnosis could be produced for it
pub fn analysis_failure_notice() -> Notification {
    Notification::destructive("Analysis failed", "Please try uploading again")
}
