use crate::models::{PreviewImage, QualityScore, UploadCandidate, UploadData};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// What the user currently has selected: the file plus its preview and score,
/// always set and torn down together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: UploadCandidate,
    pub preview: PreviewImage,
    pub quality_score: QualityScore,
}

impl Selection {
    pub fn to_upload(&self) -> UploadData {
        UploadData {
            file: self.candidate.clone(),
            preview: self.preview.clone(),
            quality_score: self.quality_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Selected,
    Uploading,
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Idle,
    Selected(Selection),
    Uploading {
        selection: Selection,
        cancel: CancellationToken,
    },
}

/// Identifies one in-flight submission.
///
/// Completion and failure are only applied while the session still holds the upload
/// this ticket was issued for.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub epoch: u64,
    pub upload: UploadData,
    pub cancel: CancellationToken,
}

/// Upload session value. Every transition consumes the session and returns the next
/// one; the epoch moves on each change so stale tickets can be recognised.
///
/// After a submission finishes its token is kept as `processing` until the next
/// clear, so leaving the page still stops the results from being published.
#[derive(Debug, Default)]
pub struct UploadSession {
    state: SessionState,
    epoch: u64,
    processing: Option<CancellationToken>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::Idle => Phase::Idle,
            SessionState::Selected(_) => Phase::Selected,
            SessionState::Uploading { .. } => Phase::Uploading,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Selected(selection) => Some(selection),
            SessionState::Uploading { selection, .. } => Some(selection),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Uploading { .. })
    }

    pub fn is_current(&self, ticket: &SubmitTicket) -> bool {
        self.is_busy() && self.epoch == ticket.epoch
    }

    /// Whether a delivered submission is still producing its results
    pub fn is_processing(&self) -> bool {
        self.processing
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    fn advance(self, state: SessionState) -> Self {
        Self {
            state,
            epoch: self.epoch.wrapping_add(1),
            processing: self.processing,
        }
    }

    /// Idle or Selected -> Selected, replacing any previous selection wholesale.
    /// Refused while uploading; the flag reports whether the selection was applied.
    pub fn select(self, selection: Selection) -> (Self, bool) {
        if self.is_busy() {
            return (self, false);
        }
        (self.advance(SessionState::Selected(selection)), true)
    }

    /// Selected -> Uploading. Anything else is a no-op and yields no ticket.
    pub fn begin_upload(self) -> (Self, Option<SubmitTicket>) {
        match self.state {
            SessionState::Selected(selection) => {
                let cancel = CancellationToken::new();
                let upload = selection.to_upload();
                let next = Self {
                    state: SessionState::Uploading {
                        selection,
                        cancel: cancel.clone(),
                    },
                    epoch: self.epoch.wrapping_add(1),
                    processing: self.processing,
                };
                let ticket = SubmitTicket {
                    epoch: next.epoch,
                    upload,
                    cancel,
                };
                (next, Some(ticket))
            }
            state => (
                Self {
                    state,
                    epoch: self.epoch,
                    processing: self.processing,
                },
                None,
            ),
        }
    }

    /// Uploading -> Idle once the upload went through. `Done` is never stored.
    ///
    /// The ticket's token becomes the processing token; an older one still running
    /// is cancelled since its results are superseded.
    pub fn finish(self, ticket: &SubmitTicket) -> (Self, bool) {
        if !self.is_current(ticket) {
            return (self, false);
        }
        if let Some(previous) = &self.processing {
            previous.cancel();
        }
        let next = Self {
            state: SessionState::Idle,
            epoch: self.epoch.wrapping_add(1),
            processing: Some(ticket.cancel.clone()),
        };
        (next, true)
    }

    /// Uploading -> Selected after a failed submission, keeping the selection for retry
    pub fn revert(self, ticket: &SubmitTicket) -> (Self, bool) {
        if !self.is_current(ticket) {
            return (self, false);
        }
        let Self {
            state,
            epoch,
            processing,
        } = self;
        match state {
            SessionState::Uploading { selection, .. } => (
                Self {
                    state: SessionState::Selected(selection),
                    epoch: epoch.wrapping_add(1),
                    processing,
                },
                true,
            ),
            state => (
                Self {
                    state,
                    epoch,
                    processing,
                },
                false,
            ),
        }
    }

    /// Any state -> Idle. Cancels an in-flight submission and any results still
    /// being processed.
    pub fn clear(mut self) -> Self {
        if let SessionState::Uploading { cancel, .. } = &self.state {
            cancel.cancel();
        }
        if let Some(processing) = self.processing.take() {
            processing.cancel();
        }
        self.advance(SessionState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(name: &str) -> Selection {
        Selection {
            candidate: UploadCandidate::new(name, "image/png", vec![1u8, 2, 3]),
            preview: PreviewImage {
                data_url: "data:image/png;base64,AQID".to_string(),
                mime: "image/png".to_string(),
                width: 1,
                height: 1,
            },
            quality_score: QualityScore::saturating(80),
        }
    }

    #[test]
    fn test_select_from_idle() {
        let (session, applied) = UploadSession::new().select(selection("a.png"));
        assert!(applied);
        assert_eq!(session.phase(), Phase::Selected);
        assert_eq!(session.selection().unwrap().candidate.file_name, "a.png");
    }

    #[test]
    fn test_reselect_replaces_selection() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, applied) = session.select(selection("b.png"));
        assert!(applied);
        assert_eq!(session.selection().unwrap().candidate.file_name, "b.png");
    }

    #[test]
    fn test_begin_upload_requires_selection() {
        let (session, ticket) = UploadSession::new().begin_upload();
        assert!(ticket.is_none());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_begin_upload_is_not_reentrant() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, first) = session.begin_upload();
        assert!(first.is_some());
        let epoch = session.epoch();
        let (session, second) = session.begin_upload();
        assert!(second.is_none());
        assert_eq!(session.epoch(), epoch);
        assert!(session.is_busy());
    }

    #[test]
    fn test_select_refused_while_uploading() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, _) = session.begin_upload();
        let (session, applied) = session.select(selection("b.png"));
        assert!(!applied);
        assert_eq!(session.selection().unwrap().candidate.file_name, "a.png");
    }

    #[test]
    fn test_finish_returns_to_idle() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, ticket) = session.begin_upload();
        let ticket = ticket.unwrap();
        let (session, finished) = session.finish(&ticket);
        assert!(finished);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_revert_preserves_selection() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, ticket) = session.begin_upload();
        let (session, reverted) = session.revert(&ticket.unwrap());
        assert!(reverted);
        assert_eq!(session.phase(), Phase::Selected);
        assert_eq!(session.selection().unwrap().candidate.file_name, "a.png");
    }

    #[test]
    fn test_clear_cancels_and_stale_ticket_is_ignored() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, ticket) = session.begin_upload();
        let ticket = ticket.unwrap();

        let session = session.clear();
        assert!(ticket.cancel.is_cancelled());

        let (session, finished) = session.finish(&ticket);
        assert!(!finished);
        assert_eq!(session.phase(), Phase::Idle);

        // a fresh selection and upload must not be touched by the old ticket
        let (session, _) = session.select(selection("b.png"));
        let (session, _) = session.begin_upload();
        let (session, reverted) = session.revert(&ticket);
        assert!(!reverted);
        assert_eq!(session.phase(), Phase::Uploading);
    }

    #[test]
    fn test_finished_ticket_keeps_processing_until_clear() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, ticket) = session.begin_upload();
        let ticket = ticket.unwrap();
        let (session, finished) = session.finish(&ticket);
        assert!(finished);
        assert!(session.is_processing());
        assert!(!ticket.cancel.is_cancelled());

        // a new selection does not interrupt the results of the last upload
        let (session, _) = session.select(selection("b.png"));
        assert!(session.is_processing());

        let session = session.clear();
        assert!(ticket.cancel.is_cancelled());
        assert!(!session.is_processing());
    }

    #[test]
    fn test_second_finish_supersedes_processing() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let (session, first) = session.begin_upload();
        let first = first.unwrap();
        let (session, _) = session.finish(&first);

        let (session, _) = session.select(selection("b.png"));
        let (session, second) = session.begin_upload();
        let second = second.unwrap();
        let (session, _) = session.finish(&second);

        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert!(session.is_processing());
    }

    #[test]
    fn test_clear_twice_is_idle() {
        let (session, _) = UploadSession::new().select(selection("a.png"));
        let session = session.clear();
        assert_eq!(session.phase(), Phase::Idle);
        let session = session.clear();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.selection().is_none());
    }
}
