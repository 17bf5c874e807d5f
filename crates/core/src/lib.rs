pub mod auth;
pub mod config;
pub mod converter;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod storage;
pub mod testing;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, DevelopmentAuthenticator,
    Identity, RapidApiAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use converter::{AudioFormat, ConverterError, MediaConverter, MediaMetadata, YtDlpConverter};
pub use job::{CompletedJob, InMemoryJobRegistry, Job, JobError, JobId, JobRegistry, JobState, JobStatus};
pub use orchestrator::{JobOrchestrator, OrchestratorConfig, OrchestratorError, SubmitRequest};
pub use storage::{ArtifactStore, StorageError, SweepReport};
