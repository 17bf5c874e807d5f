//! Job orchestrator implementation.
//!
//! `submit` validates a request, records the job as `queued`, and hands the
//! work to a background task. Each job runs in its own task:
//!
//! ```text
//! downloading/0 -> extract metadata -> converting/50 -> fetch + transcode
//!     -> resolve output -> completed/100
//! ```
//!
//! Any failure lands the job in `error` with the last checkpoint's progress.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::converter::{AudioFormat, MediaConverter, TranscodeRequest};
use crate::job::{CompletedJob, Job, JobError, JobId, JobRegistry, JobState};
use crate::metrics::{JOBS_FINISHED, JOBS_REJECTED, JOBS_SUBMITTED, JOB_DURATION};
use crate::storage::{artifact_filename, artifact_stem, download_url, ArtifactStore};

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, SubmitRequest};

/// Progress reported once metadata is known and transcoding starts.
const CONVERTING_CHECKPOINT: u8 = 50;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Accepts conversion requests and drives each job to a terminal state.
pub struct JobOrchestrator {
    config: OrchestratorConfig,
    registry: Arc<dyn JobRegistry>,
    converter: Arc<dyn MediaConverter>,
    store: Arc<ArtifactStore>,
}

impl JobOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        registry: Arc<dyn JobRegistry>,
        converter: Arc<dyn MediaConverter>,
        store: Arc<ArtifactStore>,
    ) -> Self {
        Self {
            config,
            registry,
            converter,
            store,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<dyn JobRegistry> {
        &self.registry
    }

    /// Validates `request`, records a `queued` job and starts it in the
    /// background.
    ///
    /// The job is visible in the registry before this returns. Nothing is
    /// recorded when validation fails.
    pub async fn submit(&self, request: SubmitRequest) -> Result<JobId, OrchestratorError> {
        let (url, format, quality_kbps) = self.validate(&request).inspect_err(|e| {
            JOBS_REJECTED.with_label_values(&[e.reason()]).inc();
        })?;

        let job = Job::new(JobId::new(), url, format, quality_kbps);
        let job_id = job.id;
        self.registry.create(job.clone())?;
        JOBS_SUBMITTED.inc();

        info!(
            "Job {} submitted: {} ({} @ {}kbps)",
            job_id, job.source_url, format, quality_kbps
        );

        self.spawn(job);
        Ok(job_id)
    }

    /// Current snapshot of a job.
    ///
    /// Ids are only issued in lowercase hyphenated form, so anything else
    /// (other uuid spellings included) is an unknown task.
    pub fn status(&self, id: &str) -> Result<Job, JobError> {
        let job_id = id
            .parse::<JobId>()
            .ok()
            .filter(|job_id| job_id.to_string() == id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;
        self.registry.get(&job_id)
    }

    fn validate(
        &self,
        request: &SubmitRequest,
    ) -> Result<(String, AudioFormat, u32), OrchestratorError> {
        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(OrchestratorError::MissingUrl)?;

        if !self
            .config
            .allowed_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
        {
            return Err(OrchestratorError::InvalidUrl(url.to_string()));
        }

        let format = match request.format.as_deref().map(str::trim) {
            None | Some("") => self.config.default_format,
            Some(raw) => match raw
                .parse::<AudioFormat>()
                .ok()
                .filter(|f| self.config.allowed_formats.contains(f))
            {
                Some(format) => format,
                None => {
                    warn!(
                        "Unsupported format {:?}, using {}",
                        raw, self.config.default_format
                    );
                    self.config.default_format
                }
            },
        };

        let quality_kbps = match request.quality.as_deref().map(str::trim) {
            None | Some("") => self.config.default_quality_kbps,
            Some(raw) => match parse_quality(raw) {
                Some(kbps) => kbps,
                None => {
                    warn!(
                        "Unusable quality {:?}, using {}kbps",
                        raw, self.config.default_quality_kbps
                    );
                    self.config.default_quality_kbps
                }
            },
        };

        Ok((url.to_string(), format, quality_kbps))
    }

    /// Starts the execution unit under a supervisor that records the terminal
    /// state, including when the unit panics.
    fn spawn(&self, job: Job) {
        let registry = Arc::clone(&self.registry);
        let execution = Execution {
            job_id: job.id,
            source_url: job.source_url,
            format: job.format,
            quality_kbps: job.quality_kbps,
            registry: Arc::clone(&self.registry),
            converter: Arc::clone(&self.converter),
            store: Arc::clone(&self.store),
        };
        let job_id = job.id;

        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = tokio::spawn(execution.run()).await;

            let state = match outcome {
                Ok(Ok(done)) => JobState::Completed(Box::new(done)),
                Ok(Err(failure)) => JobState::Error {
                    progress: failure.progress,
                    message: failure.message,
                },
                Err(join_error) => {
                    error!("Job {} execution aborted: {}", job_id, join_error);
                    let progress = registry.get(&job_id).map(|j| j.progress()).unwrap_or(0);
                    JobState::Error {
                        progress,
                        message: format!("Conversion failed unexpectedly: {}", join_error),
                    }
                }
            };

            let result = state.status().as_str();
            match &state {
                JobState::Completed(done) => {
                    info!("Job {} completed: {} ({} bytes)", job_id, done.filename, done.file_size)
                }
                JobState::Error { message, .. } => warn!("Job {} failed: {}", job_id, message),
                _ => {}
            }

            if let Err(e) = registry.update(&job_id, state) {
                error!("Failed to record final state for job {}: {}", job_id, e);
            }
            JOBS_FINISHED.with_label_values(&[result]).inc();
            JOB_DURATION.observe(started.elapsed().as_secs_f64());
        });
    }
}

/// Why an execution unit stopped early.
#[derive(Debug)]
struct Failure {
    progress: u8,
    message: String,
}

impl Failure {
    fn at(progress: u8, message: impl Into<String>) -> Self {
        Self {
            progress,
            message: message.into(),
        }
    }
}

/// Everything one job needs, moved into its task.
struct Execution {
    job_id: JobId,
    source_url: String,
    format: AudioFormat,
    quality_kbps: u32,
    registry: Arc<dyn JobRegistry>,
    converter: Arc<dyn MediaConverter>,
    store: Arc<ArtifactStore>,
}

impl Execution {
    async fn run(self) -> Result<CompletedJob, Failure> {
        self.transition(JobState::Downloading { progress: 0 });

        let meta = self
            .converter
            .extract_metadata(&self.source_url)
            .await
            .map_err(|e| Failure::at(0, format!("Failed to extract video info: {}", e)))?;

        let stem = artifact_stem(&meta.title, &self.job_id);
        let filename = artifact_filename(&meta.title, &self.job_id, self.format);
        let template = self.store.root().join(&stem);
        let target = self.store.root().join(&filename);

        self.transition(JobState::Converting {
            progress: CONVERTING_CHECKPOINT,
        });

        let source_url = if meta.webpage_url.is_empty() {
            self.source_url.clone()
        } else {
            meta.webpage_url.clone()
        };

        self.converter
            .fetch_and_transcode(&TranscodeRequest {
                job_id: self.job_id,
                source_url,
                output_template: template.clone(),
                format: self.format,
                quality_kbps: self.quality_kbps,
            })
            .await
            .map_err(|e| Failure::at(CONVERTING_CHECKPOINT, e.to_string()))?;

        let resolved = self
            .store
            .resolve_artifact(&template, &target, &self.job_id, self.format.extension())
            .await
            .map_err(|e| Failure::at(CONVERTING_CHECKPOINT, e.to_string()))?;

        Ok(CompletedJob {
            download_url: download_url(&filename),
            filename,
            title: meta.title,
            file_size: resolved.size,
            file_size_mb: size_in_mb(resolved.size),
            duration: meta.duration,
            thumbnail: meta.thumbnail,
            uploader: meta.uploader,
            upload_date: meta.upload_date,
            view_count: meta.view_count,
        })
    }

    fn transition(&self, state: JobState) {
        let status = state.status();
        match self.registry.update(&self.job_id, state) {
            Ok(_) => info!("Job {} is now {}", self.job_id, status),
            Err(e) => warn!("Failed to move job {} to {}: {}", self.job_id, status, e),
        }
    }
}

/// Bitrate in kbps from `"192"` or `"192k"`, if within the accepted range.
fn parse_quality(raw: &str) -> Option<u32> {
    raw.trim_end_matches(['k', 'K'])
        .parse::<u32>()
        .ok()
        .filter(|q| OrchestratorConfig::quality_in_range(*q))
}

/// Bytes to MiB, rounded to 2 decimals.
fn size_in_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}
