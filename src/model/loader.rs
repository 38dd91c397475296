use log::{info, warn};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::Classifier;
use super::error::LoadError;
use super::pipeline::{ArtifactHeader, FORMAT_VERSION, LogisticPipeline};
use crate::predict::COLUMNS;

/// Read-only model handle shared by every request.
pub type SharedClassifier = Arc<dyn Classifier>;

type Source = Box<dyn Fn(&Path) -> Result<SharedClassifier, LoadError> + Send + Sync>;

/// Loads the artifact at most once and hands out the same instance afterwards.
///
/// The first successful [`get_or_load`](Self::get_or_load) deserializes the
/// file; every later call returns a clone of the same `Arc` without touching
/// the filesystem. Concurrent first calls are serialized so only one of them
/// performs the read. A failed load leaves the cache empty.
pub struct ModelCache {
    path: PathBuf,
    source: Source,
    cell: OnceLock<SharedClassifier>,
    init: Mutex<()>,
}

impl ModelCache {
    /// Cache backed by the JSON artifact at `path`, optionally pinned to a
    /// hex SHA-256 digest.
    pub fn new(path: impl Into<PathBuf>, expected_sha256: Option<String>) -> Self {
        Self::with_source(path, move |p| {
            let pipeline = load_artifact(p, expected_sha256.as_deref())?;
            Ok(Arc::new(pipeline) as SharedClassifier)
        })
    }

    /// Cache backed by an arbitrary loader.
    pub fn with_source<F>(path: impl Into<PathBuf>, source: F) -> Self
    where
        F: Fn(&Path) -> Result<SharedClassifier, LoadError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            source: Box::new(source),
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get_or_load(&self) -> Result<SharedClassifier, LoadError> {
        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }

        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }

        let model = (self.source)(&self.path)?;
        Ok(Arc::clone(self.cell.get_or_init(|| model)))
    }
}

/// Read, verify and deserialize the artifact at `path`.
pub fn load_artifact(
    path: &Path,
    expected_sha256: Option<&str>,
) -> Result<LogisticPipeline, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let digest = format!("{:x}", Sha256::digest(&bytes));
    if let Some(expected) = expected_sha256 {
        if !expected.trim().eq_ignore_ascii_case(&digest) {
            return Err(LoadError::DigestMismatch {
                expected: expected.trim().to_string(),
                actual: digest,
            });
        }
    }

    let parse_err = |source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let header: ArtifactHeader = serde_json::from_slice(&bytes).map_err(parse_err)?;
    if header.format_version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion {
            found: header.format_version,
            supported: FORMAT_VERSION,
        });
    }

    let pipeline: LogisticPipeline = serde_json::from_slice(&bytes).map_err(parse_err)?;
    pipeline.validate(&COLUMNS)?;

    info!(
        "loaded model artifact {} (sha256 {}): {}",
        path.display(),
        digest,
        pipeline.model
    );
    Ok(pipeline)
}

static GLOBAL: OnceLock<ModelCache> = OnceLock::new();

/// Process-wide model cache.
///
/// The first call fixes the path and digest pin for the life of the process;
/// later calls return the same cache regardless of their arguments.
pub fn global(path: &Path, expected_sha256: Option<&str>) -> &'static ModelCache {
    let cache = GLOBAL.get_or_init(|| ModelCache::new(path, expected_sha256.map(str::to_owned)));
    if cache.path() != path {
        warn!(
            "model cache already initialized for {}, ignoring {}",
            cache.path().display(),
            path.display()
        );
    }
    cache
}
