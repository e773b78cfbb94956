//! File system abstraction for testability.

use async_trait::async_trait;
use std::path::Path;

/// Abstraction over the file system operations the download executor
/// performs, so it can run against a mock in tests.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Creates all directories in the given path.
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Creates (truncating) a file at the given path for writing.
    async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File>;
}

/// Default file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem` instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File> {
        tokio::fs::File::create(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn tokio_fs_create_dir_all() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");

        let fs = TokioFileSystem::new();
        fs.create_dir_all(&nested).await.unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn tokio_fs_create_file_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");

        let fs = TokioFileSystem::new();
        let mut file = fs.create_file(&path).await.unwrap();
        file.write_all(b"hello").await.unwrap();
        file.flush().await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn tokio_fs_create_file_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, b"previous contents").unwrap();

        let fs = TokioFileSystem::new();
        let _file = fs.create_file(&path).await.unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }
}
