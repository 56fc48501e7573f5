//! Crop image upload workflow.
//!
//! A farmer picks, photographs or drops a leaf image; it is validated, previewed and
//! given a (mocked) quality score, then submitted through a simulated transport and
//! handed to the results view with a fixed diagnosis.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use config::UploadConfig;
pub use error::{Rejection, WorkflowError};
pub use services::results::ResultsView;
pub use services::upload_session::{Phase, SessionView, SubmitOutcome, UploadWorkflow};
