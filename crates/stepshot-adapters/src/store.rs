//! Filesystem artifact store -- capture images and run records on disk.
//!
//! All paths are resolved relative to a root directory using `tokio::fs`,
//! and rejected if they would escape it (e.g. `../../etc/passwd`).

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AdapterError, Result};
use crate::traits::ArtifactStore;

/// [`ArtifactStore`] backed by the local filesystem.
pub struct FsArtifactStore {
    /// Root directory for all writes.
    root_dir: PathBuf,
}

impl FsArtifactStore {
    /// Create a store rooted at `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Resolve `raw_path` against the root and verify it stays inside it.
    fn safe_resolve(&self, raw_path: &Path, operation: &str) -> Result<PathBuf> {
        let canon_root = self
            .root_dir
            .canonicalize()
            .unwrap_or_else(|_| self.root_dir.clone());

        let candidate = if raw_path.is_absolute() {
            raw_path.to_path_buf()
        } else {
            canon_root.join(raw_path)
        };

        // The target may not exist yet: normalize lexically, then resolve
        // symlinks in whatever part of it already exists, the same way the
        // root was resolved.
        let normalized = canonicalize_existing_prefix(&normalize_path(&candidate));

        if !normalized.starts_with(&canon_root) {
            return Err(AdapterError::InvalidParams {
                operation: operation.to_string(),
                reason: format!(
                    "path `{}` resolves to `{}` which is outside the root directory `{}`",
                    raw_path.display(),
                    normalized.display(),
                    canon_root.display(),
                ),
            });
        }

        Ok(normalized)
    }
}

/// Normalize a path by resolving `.` and `..` components lexically.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            Component::CurDir => {}
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

/// Canonicalize the longest existing ancestor of `path` and re-append the
/// components below it.
fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn ensure_directory(&self, path: &Path) -> Result<()> {
        let full_path = self.safe_resolve(path, "ensure_directory")?;
        tokio::fs::create_dir_all(&full_path).await?;
        debug!(path = %full_path.display(), "directory ready");
        Ok(())
    }

    async fn write_image(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let full_path = self.safe_resolve(path, "write_image")?;
        tokio::fs::write(&full_path, bytes).await?;
        debug!(path = %full_path.display(), bytes = bytes.len(), "image written");
        Ok(())
    }

    async fn write_record(&self, path: &Path, record: &serde_json::Value) -> Result<()> {
        let full_path = self.safe_resolve(path, "write_record")?;
        let mut content = serde_json::to_vec_pretty(record)?;
        content.push(b'\n');
        tokio::fs::write(&full_path, content).await?;
        debug!(path = %full_path.display(), "record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_resolves_parent_components() {
        let p = Path::new("/tmp/screenshots/sub/../other");
        assert_eq!(normalize_path(p), PathBuf::from("/tmp/screenshots/other"));
    }

    #[test]
    fn normalize_path_skips_current_dir() {
        let p = Path::new("/tmp/./screenshots/./step-1-initial.png");
        assert_eq!(
            normalize_path(p),
            PathBuf::from("/tmp/screenshots/step-1-initial.png")
        );
    }

    #[test]
    fn safe_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let err = store
            .safe_resolve(Path::new("../../etc/passwd"), "write_image")
            .unwrap_err();
        match err {
            AdapterError::InvalidParams { operation, reason } => {
                assert_eq!(operation, "write_image");
                assert!(reason.contains("outside the root directory"));
            }
            other => panic!("expected InvalidParams, got: {other:?}"),
        }
    }

    #[test]
    fn safe_resolve_joins_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let store = FsArtifactStore::new(&root);
        let resolved = store
            .safe_resolve(Path::new("screenshots/notion-create-page"), "ensure_directory")
            .unwrap();
        assert_eq!(resolved, root.join("screenshots/notion-create-page"));
    }

    #[test]
    fn existing_prefix_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let resolved =
            canonicalize_existing_prefix(&dir.path().join("screenshots/step-1-initial.png"));
        assert_eq!(resolved, root.join("screenshots/step-1-initial.png"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_root_accepts_absolute_paths_under_it() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let store = FsArtifactStore::new(&link);
        let run_dir = link.join("notion-create-page");
        store.ensure_directory(&run_dir).await.unwrap();
        store
            .write_image(&run_dir.join("step-1-initial.png"), b"png")
            .await
            .unwrap();

        let written = real.join("notion-create-page/step-1-initial.png");
        assert_eq!(std::fs::read(written).unwrap(), b"png");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_the_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        let outside = dir.path().join("outside");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("escape")).unwrap();

        let store = FsArtifactStore::new(&root);
        let result = store.safe_resolve(Path::new("escape/step-1-initial.png"), "write_image");
        assert!(matches!(result, Err(AdapterError::InvalidParams { .. })));
    }
}
