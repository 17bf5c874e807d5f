//! Job orchestrator: accepts conversion requests and runs them.
//!
//! Each accepted job gets its own Tokio task. The registry is the only state
//! shared between jobs and the HTTP layer; status reads never wait on a job.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::JobOrchestrator;
pub use types::{OrchestratorError, SubmitRequest};
