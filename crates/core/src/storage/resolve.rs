//! Locating and normalizing the converter's output file.
//!
//! The converter is only told an output template; depending on version and
//! post-processing it may append an extension, keep the template verbatim,
//! or write a differently named file. Resolution tries the likely names
//! first, then falls back to a bounded directory scan for the job id.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::error::StorageError;
use super::store::ArtifactStore;
use crate::job::JobId;
use crate::metrics::ARTIFACT_RESOLUTIONS;

/// Maximum directory entries inspected by the fallback scan.
const MAX_SCAN_ENTRIES: usize = 1000;

/// Maximum file names reported when nothing matches.
const MAX_LISTING: usize = 20;

/// Where the converter's output was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource {
    /// `<template>.<ext>`
    TemplateWithExtension,
    /// `<template>` verbatim
    Template,
    /// Already at the final name.
    Target,
    /// Found by scanning the directory for the job id.
    DirectoryScan,
}

impl ArtifactSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactSource::TemplateWithExtension => "template_with_extension",
            ArtifactSource::Template => "template",
            ArtifactSource::Target => "target",
            ArtifactSource::DirectoryScan => "directory_scan",
        }
    }
}

/// How the output was brought to its final name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    /// Already in place.
    InPlace,
    /// Atomic rename.
    Renamed,
    /// Copy followed by delete of the original.
    Copied,
}

/// A located, normalized artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    pub source: ArtifactSource,
    pub method: ResolutionMethod,
}

impl ArtifactStore {
    /// Finds the file produced for `job_id` and moves it to `target`.
    pub async fn resolve_artifact(
        &self,
        template: &Path,
        target: &Path,
        job_id: &JobId,
        ext: &str,
    ) -> Result<ResolvedArtifact, StorageError> {
        let (found, source) = match self.locate(template, target, job_id, ext).await? {
            Some(hit) => hit,
            None => {
                let listing = self.listing().await;
                warn!(
                    "No output for job {} (expected {:?}); directory has {:?}",
                    job_id, target, listing
                );
                return Err(StorageError::ArtifactNotFound {
                    expected: target.to_path_buf(),
                    listing,
                });
            }
        };

        let method = if found == target {
            ResolutionMethod::InPlace
        } else {
            move_file(&found, target).await?
        };

        let size = fs::metadata(target)
            .await
            .map_err(|e| StorageError::io(target, e))?
            .len();

        ARTIFACT_RESOLUTIONS
            .with_label_values(&[source.as_str()])
            .inc();

        Ok(ResolvedArtifact {
            path: target.to_path_buf(),
            size,
            source,
            method,
        })
    }

    async fn locate(
        &self,
        template: &Path,
        target: &Path,
        job_id: &JobId,
        ext: &str,
    ) -> Result<Option<(PathBuf, ArtifactSource)>, StorageError> {
        let mut with_ext = OsString::from(template.as_os_str());
        with_ext.push(".");
        with_ext.push(ext);

        let candidates = [
            (PathBuf::from(with_ext), ArtifactSource::TemplateWithExtension),
            (template.to_path_buf(), ArtifactSource::Template),
            (target.to_path_buf(), ArtifactSource::Target),
        ];

        for (path, source) in candidates {
            if is_file(&path).await {
                debug!("Found output for job {} at {:?}", job_id, path);
                return Ok(Some((path, source)));
            }
        }

        let needle = job_id.to_string();
        let suffix = format!(".{}", ext.to_ascii_lowercase());
        let mut entries = fs::read_dir(self.root())
            .await
            .map_err(|e| StorageError::io(self.root(), e))?;

        let mut inspected = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(self.root(), e))?
        {
            inspected += 1;
            if inspected > MAX_SCAN_ENTRIES {
                warn!(
                    "Directory scan for job {} stopped after {} entries",
                    job_id, MAX_SCAN_ENTRIES
                );
                break;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if name.contains(&needle) && name.to_ascii_lowercase().ends_with(&suffix) {
                let path = entry.path();
                if is_file(&path).await {
                    info!("Found output for job {} by directory scan: {}", job_id, name);
                    return Ok(Some((path, ArtifactSource::DirectoryScan)));
                }
            }
        }

        Ok(None)
    }

    /// First few names in the storage directory, for diagnostics.
    async fn listing(&self) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(mut entries) = fs::read_dir(self.root()).await else {
            return names;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if names.len() >= MAX_LISTING {
                break;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Renames `source` to `destination`, falling back to copy-then-delete.
async fn move_file(source: &Path, destination: &Path) -> Result<ResolutionMethod, StorageError> {
    match fs::rename(source, destination).await {
        Ok(()) => {
            debug!("Renamed {:?} to {:?}", source, destination);
            return Ok(ResolutionMethod::Renamed);
        }
        Err(e) => {
            warn!(
                "Rename {:?} -> {:?} failed ({}), falling back to copy",
                source, destination, e
            );
        }
    }

    fs::copy(source, destination)
        .await
        .map_err(|error| StorageError::MoveFailed {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            error,
        })?;

    if let Err(e) = fs::remove_file(source).await {
        warn!("Copied {:?} but could not remove it: {}", source, e);
    }

    Ok(ResolutionMethod::Copied)
}
