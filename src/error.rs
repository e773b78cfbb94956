//! Error types for the thu-cloud-dl library.

use thiserror::Error;

/// Errors that can occur while scanning or downloading a share.
#[derive(Error, Debug)]
pub enum Error {
    /// The share link does not look like a Tsinghua Cloud share URL.
    #[error("invalid share link: {link} (expected a link starting with {prefix})")]
    InvalidLink {
        /// The link as supplied by the user.
        link: String,
        /// The required share-link prefix.
        prefix: &'static str,
    },

    /// The supplied share password was rejected.
    #[error("wrong password for this share link")]
    WrongPassword,

    /// The share requires a password but none was supplied.
    #[error("this share link requires a password (use --password)")]
    PasswordRequired,

    /// The listing endpoint returned something we could not use.
    #[error("listing failed for {path}: {reason}")]
    Listing {
        /// Remote directory path that was being listed.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// A media viewer page did not contain the expected raw-path marker.
    #[error("no raw download path found in viewer page for {path}")]
    RawUrlNotFound {
        /// Remote file path the viewer page belongs to.
        path: String,
    },

    /// Invalid glob pattern supplied with `--file`.
    #[error("invalid file pattern: {0}")]
    Pattern(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for errors that abort the whole run.
    ///
    /// Wrong credentials or a broken listing mean no useful work can
    /// proceed; everything else is recoverable per file.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidLink { .. }
                | Self::WrongPassword
                | Self::PasswordRequired
                | Self::Listing { .. }
        )
    }
}

/// A specialized `Result` type for thu-cloud-dl operations.
pub type Result<T> = std::result::Result<T, Error>;
