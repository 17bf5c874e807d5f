//! Artifact store: the flat directory holding converted files.
//!
//! Responsible for naming artifacts, serving them back by file name,
//! normalizing converter output to its final name, and the retention sweep.

mod error;
mod naming;
mod resolve;
mod store;

pub use error::StorageError;
pub use naming::{artifact_filename, artifact_stem, download_url, sanitize_title};
pub use resolve::{ArtifactSource, ResolutionMethod, ResolvedArtifact};
pub use store::{ArtifactStore, SweepReport};
