//! thu-cloud-dl - a downloader for Tsinghua Cloud share links.
//!
//! The library authenticates against a share link, walks the remote
//! directory tree through the share listing API, and streams the files to
//! a local directory that mirrors the remote layout. Execution is strictly
//! sequential; the only shared state is the cookie jar inside
//! [`ShareClient`].
//!
//! # Example
//!
//! ```no_run
//! use thu_cloud_dl::{DownloadConfig, Downloader, NoProgress, ShareClient, walk};
//!
//! # async fn example() -> thu_cloud_dl::Result<()> {
//! let key = thu_cloud_dl::derive_share_key("https://cloud.tsinghua.edu.cn/d/abc123")?;
//! let config = DownloadConfig::new().with_save_dir("downloads");
//! let client = ShareClient::new(key, &config)?;
//! client.authenticate("").await?;
//!
//! let files = walk(&client, None).await?;
//! let downloader = Downloader::new(client, config);
//! let outcome = downloader.download_all(&files, &NoProgress).await;
//! println!("downloaded {} file(s)", outcome.downloaded);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod link;
pub mod scrape;
pub mod walk;

// Re-export main types for convenience
pub use api::{Dirent, FileRecord, ShareClient};
pub use config::DownloadConfig;
pub use download::{
    DownloadOutcome, DownloadProgress, DownloadTarget, Downloader, NoProgress, is_media_path,
    local_path,
};
pub use error::{Error, Result};
pub use fs::{FileSystem, TokioFileSystem};
pub use link::{SHARE_LINK_PREFIX, derive_share_key, pattern_to_regex};
pub use walk::walk;
