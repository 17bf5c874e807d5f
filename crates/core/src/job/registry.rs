//! Job registry trait and in-memory implementation.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

use super::types::{Job, JobId, JobState, JobStatus};

/// Error type for registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// No job with this id.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// A job with this id already exists.
    #[error("Job already exists: {0}")]
    AlreadyExists(JobId),

    /// The job already reached a terminal state.
    #[error("Job {id} is already {status}")]
    Terminal { id: JobId, status: JobStatus },

    /// The update would lower the reported progress.
    #[error("Job {id} progress cannot go from {from} to {to}")]
    ProgressRegression { id: JobId, from: u8, to: u8 },

    /// The registry lock was poisoned by a panicking writer.
    #[error("Job registry lock poisoned")]
    Poisoned,
}

/// Storage for job records.
///
/// All operations are atomic per job: readers always observe a whole record,
/// never a partially applied update.
pub trait JobRegistry: Send + Sync {
    /// Insert a new job.
    fn create(&self, job: Job) -> Result<(), JobError>;

    /// Replace a job's state and return the updated record.
    ///
    /// Transitions out of `completed`/`error` are rejected, as is any
    /// non-error transition that would lower progress.
    fn update(&self, id: &JobId, state: JobState) -> Result<Job, JobError>;

    /// Get a copy of a job.
    fn get(&self, id: &JobId) -> Result<Job, JobError>;

    /// Number of jobs per status.
    fn count_by_status(&self) -> Result<HashMap<JobStatus, usize>, JobError>;

    /// Total number of jobs.
    fn len(&self) -> Result<usize, JobError>;

    fn is_empty(&self) -> Result<bool, JobError> {
        Ok(self.len()? == 0)
    }
}

/// Process-local registry backed by a `RwLock<HashMap>`.
///
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct InMemoryJobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobRegistry for InMemoryJobRegistry {
    fn create(&self, job: Job) -> Result<(), JobError> {
        let mut jobs = self.jobs.write().map_err(|_| JobError::Poisoned)?;
        if jobs.contains_key(&job.id) {
            return Err(JobError::AlreadyExists(job.id));
        }
        jobs.insert(job.id, job);
        Ok(())
    }

    fn update(&self, id: &JobId, state: JobState) -> Result<Job, JobError> {
        let mut jobs = self.jobs.write().map_err(|_| JobError::Poisoned)?;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if job.state.is_terminal() {
            return Err(JobError::Terminal {
                id: *id,
                status: job.status(),
            });
        }

        let from = job.progress();
        let to = state.progress();
        if !matches!(state, JobState::Error { .. }) && to < from {
            return Err(JobError::ProgressRegression { id: *id, from, to });
        }

        job.state = state;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    fn get(&self, id: &JobId) -> Result<Job, JobError> {
        let jobs = self.jobs.read().map_err(|_| JobError::Poisoned)?;
        jobs.get(id)
            .cloned()
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    fn count_by_status(&self) -> Result<HashMap<JobStatus, usize>, JobError> {
        let jobs = self.jobs.read().map_err(|_| JobError::Poisoned)?;
        let mut counts: HashMap<JobStatus, usize> =
            JobStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for job in jobs.values() {
            *counts.entry(job.status()).or_default() += 1;
        }
        Ok(counts)
    }

    fn len(&self) -> Result<usize, JobError> {
        let jobs = self.jobs.read().map_err(|_| JobError::Poisoned)?;
        Ok(jobs.len())
    }
}
