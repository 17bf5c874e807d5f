//! Artifact directory: lookup and retention sweep.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::StorageError;
use crate::config::StorageConfig;
use crate::metrics::SWEEP_FILES;

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Regular files examined.
    pub scanned: usize,
    /// Files removed.
    pub deleted: usize,
    /// Files that were due but could not be removed.
    pub failed: usize,
}

/// Flat directory of converted artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    allowed_extensions: Vec<String>,
}

impl ArtifactStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.path.clone(),
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extensions served by [`get`](Self::get), lowercase without the dot.
    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Creates the storage directory if missing.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io(&self.root, e))
    }

    /// Whether `filename` carries an allow-listed extension (case-insensitive).
    pub fn is_allowed_extension(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|a| *a == e)
            })
            .unwrap_or(false)
    }

    /// Resolves a client-supplied file name to an existing artifact.
    ///
    /// The extension check runs before the name is ever joined to the
    /// storage path.
    pub async fn get(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if !self.is_allowed_extension(filename) {
            return Err(StorageError::DisallowedExtension {
                filename: filename.to_string(),
            });
        }

        if !is_plain_file_name(filename) {
            return Err(StorageError::InvalidFilename {
                filename: filename.to_string(),
            });
        }

        let path = self.root.join(filename);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(StorageError::NotFound {
                filename: filename.to_string(),
            }),
        }
    }

    /// Deletes regular files at least `max_age` old.
    ///
    /// Age is taken from the creation time where the platform reports one,
    /// otherwise from the modification time. Timestamps in the future count
    /// as age zero. A file that cannot be deleted is logged and skipped.
    pub async fn sweep_expired(&self, max_age: Duration) -> Result<SweepReport, StorageError> {
        let mut report = SweepReport::default();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::io(&self.root, e))?;
        let now = SystemTime::now();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.root, e))?
        {
            let path = entry.path();
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping {:?} during sweep: {}", path, e);
                    continue;
                }
            };
            report.scanned += 1;

            let stamp = match meta.created().or_else(|_| meta.modified()) {
                Ok(stamp) => stamp,
                Err(e) => {
                    warn!("No timestamp for {:?}, skipping: {}", path, e);
                    continue;
                }
            };
            let age = now.duration_since(stamp).unwrap_or(Duration::ZERO);
            if age < max_age {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => {
                    info!("Cleaned up old file: {:?}", path);
                    report.deleted += 1;
                    SWEEP_FILES.with_label_values(&["deleted"]).inc();
                }
                Err(e) => {
                    warn!("Failed to delete {:?}: {}", path, e);
                    report.failed += 1;
                    SWEEP_FILES.with_label_values(&["failed"]).inc();
                }
            }
        }

        debug!(
            "Sweep of {:?} done: scanned={}, deleted={}, failed={}",
            self.root, report.scanned, report.deleted, report.failed
        );
        Ok(report)
    }

    /// Re-runs [`sweep_expired`](Self::sweep_expired) every `every` until the
    /// returned task is aborted. The first sweep happens one period after
    /// the call.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration, retention: Duration) -> JoinHandle<()> {
        info!("Sweeping artifacts every {:?}", every);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                match self.sweep_expired(retention).await {
                    Ok(report) if report.deleted > 0 || report.failed > 0 => info!(
                        "Sweep: {} deleted, {} failed",
                        report.deleted, report.failed
                    ),
                    Ok(_) => {}
                    Err(e) => warn!("Sweep failed: {}", e),
                }
            }
        })
    }
}

/// True if `name` is exactly one normal path component.
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ArtifactStore {
        ArtifactStore::new(&StorageConfig {
            path: dir.path().to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn test_plain_file_name() {
        assert!(is_plain_file_name("Song_abc.mp3"));
        assert!(is_plain_file_name("My Song_abc.mp3"));
        assert!(!is_plain_file_name("../secret.mp3"));
        assert!(!is_plain_file_name("sub/file.mp3"));
        assert!(!is_plain_file_name("/etc/file.mp3"));
        assert!(!is_plain_file_name("..\\file.mp3"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
    }

    #[test]
    fn test_allowed_extension_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.is_allowed_extension("a.mp3"));
        assert!(store.is_allowed_extension("a.MP3"));
        assert!(!store.is_allowed_extension("a.exe"));
        assert!(!store.is_allowed_extension("mp3"));
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(&StorageConfig {
            path: dir.path().join("a/b/downloads"),
            ..Default::default()
        });
        store.ensure_dir().await.unwrap();
        assert!(store.root().is_dir());
        // Idempotent
        store.ensure_dir().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_existing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("Song_1.mp3"), b"data").unwrap();

        let path = store.get("Song_1.mp3").await.unwrap();
        assert_eq!(path, dir.path().join("Song_1.mp3"));
    }

    #[tokio::test]
    async fn test_get_rejects_extension_before_lookup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("evil.exe"), b"MZ").unwrap();

        let result = store.get("evil.exe").await;
        assert!(matches!(
            result,
            Err(StorageError::DisallowedExtension { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let result = store.get("../outside.mp3").await;
        assert!(matches!(result, Err(StorageError::InvalidFilename { .. })));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let result = store.get("missing.mp3").await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_directory_is_not_an_artifact() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir(dir.path().join("folder.mp3")).unwrap();

        let result = store.get("folder.mp3").await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_sweep_zero_window_deletes_all() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for name in ["a.mp3", "b.mp3", "leftover.webm"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let report = store.sweep_expired(Duration::ZERO).await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                scanned: 3,
                deleted: 3,
                failed: 0
            }
        );
        assert!(!dir.path().join("a.mp3").exists());
        assert!(dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_sweep_infinite_window_deletes_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();

        let report = store.sweep_expired(Duration::MAX).await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.deleted, 0);
        assert!(dir.path().join("a.mp3").exists());
    }

    #[tokio::test]
    async fn test_sweep_keeps_fresh_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("fresh.mp3"), b"x").unwrap();

        let report = store
            .sweep_expired(StorageConfig::default().retention())
            .await
            .unwrap();
        assert_eq!(report.deleted, 0);
        assert!(dir.path().join("fresh.mp3").exists());
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_files_periodically() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));
        let handle = Arc::clone(&store)
            .spawn_sweeper(Duration::from_millis(20), Duration::from_millis(30));
        let path = dir.path().join("old.mp3");
        std::fs::write(&path, b"x").unwrap();

        for _ in 0..100 {
            if !path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert!(!path.exists(), "sweeper never removed the expired file");
    }

    #[tokio::test]
    async fn test_sweeper_keeps_files_within_retention() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));
        let path = dir.path().join("live.mp3");
        std::fs::write(&path, b"x").unwrap();

        let handle = Arc::clone(&store)
            .spawn_sweeper(Duration::from_millis(10), StorageConfig::default().retention());
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_sweep_missing_dir() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(&StorageConfig {
            path: dir.path().join("nope"),
            ..Default::default()
        });
        assert!(matches!(
            store.sweep_expired(Duration::ZERO).await,
            Err(StorageError::Io { .. })
        ));
    }
}
