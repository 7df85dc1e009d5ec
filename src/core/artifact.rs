//! Model artifact resolution.
//!
//! The prediction engine never performs network I/O itself. Trained model
//! artifacts are obtained through the [`ArtifactProvider`] trait, which maps
//! an abstract model key to a local file path. Remote backends (object
//! stores, registries) implement this trait outside the engine; caching of
//! repeated resolutions is the provider's responsibility.

use crate::core::errors::{ScanError, ScanResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Trait for resolving model artifact keys to local file paths.
pub trait ArtifactProvider: Send + Sync + std::fmt::Debug {
    /// Resolves a model key to a local file path.
    ///
    /// # Arguments
    ///
    /// * `model_key` - The abstract key identifying the artifact (e.g.
    ///   `"brain_tumor/resnet18/model.onnx"`).
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - The local path of the materialized artifact.
    /// * `Err(ScanError::ArtifactNotFound)` - If the key does not exist in
    ///   the backing store.
    fn resolve(&self, model_key: &str) -> ScanResult<PathBuf>;
}

/// Artifact provider backed by a local directory.
///
/// Supports two layouts under the root directory: the flattened cache
/// layout used by the model download cache (`/` in keys replaced by `_`)
/// and the literal relative path of the key.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    /// Creates a new store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactProvider for LocalArtifactStore {
    fn resolve(&self, model_key: &str) -> ScanResult<PathBuf> {
        let flattened = self.root.join(model_key.replace('/', "_"));
        if flattened.is_file() {
            debug!("resolved artifact '{}' to {}", model_key, flattened.display());
            return Ok(flattened);
        }

        let literal = self.root.join(model_key);
        if literal.is_file() {
            debug!("resolved artifact '{}' to {}", model_key, literal.display());
            return Ok(literal);
        }

        Err(ScanError::artifact_not_found(model_key))
    }
}

/// Identifies the artifact(s) backing a single model.
///
/// An adapter resolves the primary key first and falls back to the
/// secondary key if the primary is missing; `load` fails only when neither
/// resolves.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArtifactLocator {
    /// The primary artifact key.
    pub primary: String,
    /// An optional fallback artifact key.
    #[serde(default)]
    pub fallback: Option<String>,
}

impl ArtifactLocator {
    /// Creates a locator with a primary key only.
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: None,
        }
    }

    /// Creates a locator with a primary and a fallback key.
    pub fn with_fallback(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: Some(fallback.into()),
        }
    }

    /// Resolves this locator against a provider.
    ///
    /// Tries the primary key first, then the fallback. Returns
    /// `ArtifactNotFound` for the primary key when neither resolves.
    pub fn resolve(&self, provider: &dyn ArtifactProvider) -> ScanResult<PathBuf> {
        match provider.resolve(&self.primary) {
            Ok(path) => Ok(path),
            Err(ScanError::ArtifactNotFound { .. }) => {
                if let Some(fallback) = &self.fallback {
                    debug!(
                        "primary artifact '{}' missing, trying fallback '{}'",
                        self.primary, fallback
                    );
                    provider
                        .resolve(fallback)
                        .map_err(|_| ScanError::artifact_not_found(&self.primary))
                } else {
                    Err(ScanError::artifact_not_found(&self.primary))
                }
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for ArtifactLocator {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_local_store_resolves_flattened_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain_tumor_model.onnx");
        fs::write(&path, b"onnx").unwrap();

        let store = LocalArtifactStore::new(dir.path());
        let resolved = store.resolve("brain_tumor/model.onnx").unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn test_local_store_resolves_literal_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("brain_tumor")).unwrap();
        let path = dir.path().join("brain_tumor/model.onnx");
        fs::write(&path, b"onnx").unwrap();

        let store = LocalArtifactStore::new(dir.path());
        let resolved = store.resolve("brain_tumor/model.onnx").unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn test_local_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());

        let err = store.resolve("missing/model.onnx").unwrap_err();
        assert!(matches!(err, ScanError::ArtifactNotFound { key } if key == "missing/model.onnx"));
    }

    #[test]
    fn test_locator_falls_back_to_secondary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.onnx");
        fs::write(&path, b"onnx").unwrap();

        let store = LocalArtifactStore::new(dir.path());
        let locator = ArtifactLocator::with_fallback("primary.onnx", "backup.onnx");
        assert_eq!(locator.resolve(&store).unwrap(), path);
    }

    #[test]
    fn test_locator_reports_primary_key_when_both_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());

        let locator = ArtifactLocator::with_fallback("primary.onnx", "backup.onnx");
        let err = locator.resolve(&store).unwrap_err();
        assert!(matches!(err, ScanError::ArtifactNotFound { key } if key == "primary.onnx"));
    }
}
