//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (submissions, outcomes, job duration)
//! - Converter (provider call latency)
//! - Artifact store (output resolution, retention sweep)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Jobs accepted by `submit`.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("convertino_jobs_submitted_total", "Total jobs submitted").unwrap()
});

/// Jobs rejected at submission by reason.
pub static JOBS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "convertino_jobs_rejected_total",
            "Total submissions rejected by validation",
        ),
        &["reason"], // "missing_url", "invalid_url", "registry"
    )
    .unwrap()
});

/// Jobs reaching a terminal state by result.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertino_jobs_finished_total", "Total jobs finished"),
        &["result"], // "completed", "error"
    )
    .unwrap()
});

/// Wall time from execution start to terminal state.
pub static JOB_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("convertino_job_duration_seconds", "Duration of a job")
            .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
    )
    .unwrap()
});

// =============================================================================
// Converter Metrics
// =============================================================================

/// Provider call duration by operation.
pub static PROVIDER_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "convertino_provider_call_duration_seconds",
            "Duration of yt-dlp calls",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Storage Metrics
// =============================================================================

/// Output files located, by how they were found.
pub static ARTIFACT_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "convertino_artifact_resolutions_total",
            "Converter outputs located",
        ),
        &["source"], // "template_with_extension", "template", "target", "directory_scan"
    )
    .unwrap()
});

/// Files handled by the retention sweep.
pub static SWEEP_FILES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "convertino_sweep_files_total",
            "Files processed by the retention sweep",
        ),
        &["result"], // "deleted", "failed"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_REJECTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(PROVIDER_CALL_DURATION.clone()),
        Box::new(ARTIFACT_RESOLUTIONS.clone()),
        Box::new(SWEEP_FILES.clone()),
    ]
}
