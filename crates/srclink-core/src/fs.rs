//! Filesystem capability used by the resolver and the scanner.
//!
//! Everything in this crate that touches the disk goes through [`SourceFs`],
//! so hosts (a dev server, tests) can supply their own view of the workspace.

use std::future::Future;
use std::io;
use std::path::Path;

/// Existence, classification and read access to a workspace.
pub trait SourceFs: Send + Sync {
    /// True iff a filesystem entry exists at `path`.
    fn exists(&self, path: &Path) -> impl Future<Output = io::Result<bool>> + Send;

    /// True iff `path` is currently a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the entries directly inside `path`.
    ///
    /// Implementations should return a stable order; [`TokioFs`] sorts by name.
    fn read_dir(&self, path: &Path) -> impl Future<Output = io::Result<Vec<String>>> + Send;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;
}

/// [`SourceFs`] backed by the real filesystem through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl SourceFs for TokioFs {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_exists_and_is_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("index.ts");
        fs::write(&file, "export {}").unwrap();

        let tfs = TokioFs;
        assert!(tfs.exists(&file).await.unwrap());
        assert!(tfs.exists(dir.path()).await.unwrap());
        assert!(!tfs.exists(&dir.path().join("missing.ts")).await.unwrap());
        assert!(tfs.is_dir(dir.path()));
        assert!(!tfs.is_dir(&file));
    }

    #[tokio::test]
    async fn test_read_dir_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let names = TokioFs.read_dir(dir.path()).await.unwrap();
        assert_eq!(names, vec!["a.txt", "b.txt", "c"]);
    }

    #[tokio::test]
    async fn test_read_dir_missing_is_error() {
        let dir = tempdir().unwrap();
        let err = TokioFs.read_dir(&dir.path().join("nope")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read_to_string() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("package.json");
        fs::write(&file, r#"{"name": "x"}"#).unwrap();

        assert_eq!(
            TokioFs.read_to_string(&file).await.unwrap(),
            r#"{"name": "x"}"#
        );
    }
}
