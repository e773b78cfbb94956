//! Download execution: URL dispatch, local path layout, and streaming.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::api::{FileRecord, ShareClient};
use crate::config::DownloadConfig;
use crate::error::Result;
use crate::fs::{FileSystem, TokioFileSystem};

/// Image extensions served through the viewer page.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg", "bmp", "gif"];
/// Video extensions served through the viewer page.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "flv", "rmvb", "wmv"];

/// Returns `true` for files that must go through the raw URL resolver.
///
/// Dispatch is by the extension after the final `.` of the file name,
/// compared case-insensitively. Names without a `.` have no extension and
/// take the direct download route.
#[must_use]
pub fn is_media_path(file_path: &str) -> bool {
    let name = file_path.rsplit('/').next().unwrap_or(file_path);
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
}

/// Maps a remote file path onto the local save directory, preserving the
/// remote hierarchy. The leading `/` is stripped so the path stays inside
/// `save_dir`.
#[must_use]
pub fn local_path(save_dir: &Path, file_path: &str) -> PathBuf {
    save_dir.join(file_path.trim_start_matches('/'))
}

/// A file paired with its resolved download URL and local destination.
/// Built per file just before the transfer and discarded after.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    /// The remote file being downloaded.
    pub record: FileRecord,
    /// Fully resolved URL the bytes come from.
    pub url: String,
    /// Local path the bytes go to.
    pub dest: PathBuf,
}

/// Trait for receiving download progress updates.
///
/// All methods have default no-op implementations.
pub trait DownloadProgress: Send + Sync {
    /// Called when a file transfer starts. `total` is the declared content
    /// length, 0 when the server did not send one.
    fn on_file_start(&self, _path: &str, _total: u64) {}

    /// Called per received chunk with the chunk's size in bytes.
    fn on_chunk(&self, _bytes: u64) {}

    /// Called when a file finishes successfully.
    fn on_file_complete(&self, _path: &str) {}

    /// Called when a file fails; the batch continues afterwards.
    fn on_error(&self, _path: &str, _error: &str) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {}

/// Outcome of a whole download batch.
#[derive(Debug, Default)]
pub struct DownloadOutcome {
    /// Number of files written successfully.
    pub downloaded: usize,
    /// Remote path and error message for every file that failed.
    pub failed: Vec<(String, String)>,
}

/// Sequential download executor for one share session.
pub struct Downloader<F: FileSystem = TokioFileSystem> {
    client: ShareClient,
    config: DownloadConfig,
    fs: F,
}

impl Downloader<TokioFileSystem> {
    /// Creates a downloader with the default file system.
    #[must_use]
    pub const fn new(client: ShareClient, config: DownloadConfig) -> Self {
        Self {
            client,
            config,
            fs: TokioFileSystem,
        }
    }
}

impl<F: FileSystem> Downloader<F> {
    /// Creates a downloader with a custom file system implementation.
    #[must_use]
    pub const fn with_fs(client: ShareClient, config: DownloadConfig, fs: F) -> Self {
        Self { client, config, fs }
    }

    /// Returns the session this downloader runs on.
    #[must_use]
    pub const fn client(&self) -> &ShareClient {
        &self.client
    }

    /// Resolves the download URL and local destination for one file.
    ///
    /// Media files go through the viewer page to recover their raw asset
    /// URL; everything else gets the direct `dl=1` link.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RawUrlNotFound`] when a viewer page is
    /// missing its marker, or [`crate::Error::Http`] on transport failures.
    pub async fn resolve_target(&self, record: &FileRecord) -> Result<DownloadTarget> {
        let url = if is_media_path(&record.file_path) {
            self.client.resolve_raw_url(&record.file_path).await?
        } else {
            self.client.direct_download_url(&record.file_path)?
        };
        Ok(DownloadTarget {
            record: record.clone(),
            url,
            dest: local_path(&self.config.save_dir, &record.file_path),
        })
    }

    async fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Streams one resolved target to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body stream breaks, or
    /// the destination cannot be written.
    pub async fn download_file(
        &self,
        target: &DownloadTarget,
        progress: &dyn DownloadProgress,
    ) -> Result<()> {
        self.ensure_parent_dir(&target.dest).await?;

        let response = self.client.fetch(&target.url).await?;
        progress.on_file_start(
            &target.record.file_path,
            response.content_length().unwrap_or(0),
        );

        let mut file = self.fs.create_file(&target.dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            progress.on_chunk(chunk.len() as u64);
        }
        file.flush().await?;

        progress.on_file_complete(&target.record.file_path);
        Ok(())
    }

    /// Downloads every record in order, isolating per-file failures.
    ///
    /// A file that fails to resolve or transfer is reported through the
    /// progress sink and the error log, and the batch moves on; one bad
    /// file never aborts the run.
    pub async fn download_all(
        &self,
        records: &[FileRecord],
        progress: &dyn DownloadProgress,
    ) -> DownloadOutcome {
        let mut outcome = DownloadOutcome::default();

        for record in records {
            let result = match self.resolve_target(record).await {
                Ok(target) => self.download_file(&target, progress).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => outcome.downloaded += 1,
                Err(e) => {
                    log::error!("failed to download {}: {e}", record.file_path);
                    progress.on_error(&record.file_path, &e.to_string());
                    outcome.failed.push((record.file_path.clone(), e.to_string()));
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- is_media_path ---

    #[test]
    fn image_and_video_extensions_are_media() {
        assert!(is_media_path("/img/b.jpg"));
        assert!(is_media_path("/clips/a.mp4"));
        assert!(is_media_path("/deep/dir/c.rmvb"));
    }

    #[test]
    fn media_dispatch_is_case_insensitive() {
        assert!(is_media_path("/img/B.JPG"));
        assert!(is_media_path("/clips/A.Mp4"));
    }

    #[test]
    fn documents_are_not_media() {
        assert!(!is_media_path("/a.txt"));
        assert!(!is_media_path("/report.pdf"));
        assert!(!is_media_path("/archive.tar.gz"));
    }

    #[test]
    fn extensionless_files_are_not_media() {
        assert!(!is_media_path("/Makefile"));
        assert!(!is_media_path("/bin/tool"));
    }

    #[test]
    fn dots_in_directories_do_not_confuse_dispatch() {
        assert!(!is_media_path("/v1.2.jpg-exports/readme"));
        assert!(is_media_path("/v1.2-exports/photo.png"));
    }

    // --- local_path ---

    #[test]
    fn local_path_strips_leading_separator() {
        assert_eq!(
            local_path(Path::new("/tmp/save"), "/img/b.jpg"),
            PathBuf::from("/tmp/save/img/b.jpg")
        );
    }

    #[test]
    fn local_path_preserves_hierarchy() {
        assert_eq!(
            local_path(Path::new("out"), "/a/b/c/d.txt"),
            PathBuf::from("out/a/b/c/d.txt")
        );
    }

    #[test]
    fn local_path_relative_save_dir() {
        assert_eq!(local_path(Path::new("."), "/a.txt"), PathBuf::from("./a.txt"));
    }

    // --- progress plumbing ---

    #[test]
    fn no_progress_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoProgress>();
    }

    #[test]
    fn outcome_starts_empty() {
        let outcome = DownloadOutcome::default();
        assert_eq!(outcome.downloaded, 0);
        assert!(outcome.failed.is_empty());
    }
}
