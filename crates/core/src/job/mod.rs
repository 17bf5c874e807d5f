//! Job records and the registry that tracks them.

mod registry;
mod types;

pub use registry::{InMemoryJobRegistry, JobError, JobRegistry};
pub use types::{CompletedJob, Job, JobId, JobState, JobStatus};
