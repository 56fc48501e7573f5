pub mod analysis;
pub mod handoff;
pub mod notifier;
pub mod preview;
pub mod results;
pub mod transport;
pub mod upload_session;
