//! The authenticated share session and the HTTP endpoints it talks to.

use serde::Deserialize;

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::scrape;

/// Origin all share endpoints live under.
pub const DEFAULT_BASE_URL: &str = "https://cloud.tsinghua.edu.cn";

/// Body sentinel for a rejected password.
const WRONG_PASSWORD_SENTINEL: &str = "Please enter a correct password";
/// Body sentinel for a password-gated share answered without a password.
const PASSWORD_REQUIRED_SENTINEL: &str = "Please enter the password";

/// One entry returned by the listing endpoint, either a file or a
/// subdirectory.
#[derive(Debug, Clone, Deserialize)]
pub struct Dirent {
    /// Whether this entry is a directory.
    #[serde(default)]
    pub is_dir: bool,
    /// Remote path of the directory (directories only).
    #[serde(default)]
    pub folder_path: String,
    /// Absolute remote path of the file (files only).
    #[serde(default)]
    pub file_path: String,
    /// Bare file name, used for pattern matching.
    #[serde(default)]
    pub file_name: String,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last-modified timestamp as reported by the server.
    #[serde(default)]
    pub last_modified: String,
}

#[derive(Debug, Deserialize)]
struct DirentListResponse {
    dirent_list: Vec<Dirent>,
}

/// A remote file discovered by the tree walk. Directories never appear
/// here; the walker recurses into them instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute remote path, unique within one walk.
    pub file_path: String,
    /// Bare file name.
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last-modified timestamp string.
    pub last_modified: String,
}

impl From<Dirent> for FileRecord {
    fn from(entry: Dirent) -> Self {
        Self {
            file_path: entry.file_path,
            file_name: entry.file_name,
            size: entry.size,
            last_modified: entry.last_modified,
        }
    }
}

/// The single authenticated session against one share link.
///
/// Holds the share key and a cookie-carrying HTTP client. Constructed once
/// at startup; [`authenticate`](Self::authenticate) mutates only the cookie
/// jar, after which every request rides the same session.
#[derive(Debug, Clone)]
pub struct ShareClient {
    http: reqwest::Client,
    base_url: String,
    share_key: String,
}

impl ShareClient {
    /// Creates a session for the given share key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(share_key: String, config: &DownloadConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            share_key,
        })
    }

    /// Points the session at a different origin. Used by tests to target a
    /// local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the share key this session is scoped to.
    #[must_use]
    pub fn share_key(&self) -> &str {
        &self.share_key
    }

    fn landing_url(&self) -> String {
        format!("{}/d/{}/", self.base_url, self.share_key)
    }

    fn files_url(&self) -> String {
        format!("{}/d/{}/files/", self.base_url, self.share_key)
    }

    fn dirents_url(&self) -> String {
        format!(
            "{}/api/v2.1/share-links/{}/dirents/",
            self.base_url, self.share_key
        )
    }

    /// Builds the direct download URL (`dl=1`) for a remote file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be serialized into a query
    /// string (does not happen for valid UTF-8 paths).
    pub fn direct_download_url(&self, file_path: &str) -> Result<String> {
        let request = self
            .http
            .get(self.files_url())
            .query(&[("p", file_path), ("dl", "1")])
            .build()?;
        Ok(request.url().to_string())
    }

    /// Builds the media viewer page URL (no `dl` flag) for a remote file.
    ///
    /// # Errors
    ///
    /// Same conditions as [`direct_download_url`](Self::direct_download_url).
    pub fn viewer_page_url(&self, file_path: &str) -> Result<String> {
        let request = self
            .http
            .get(self.files_url())
            .query(&[("p", file_path)])
            .build()?;
        Ok(request.url().to_string())
    }

    /// Performs the password handshake for this share.
    ///
    /// Fetches the landing page and scrapes the hidden CSRF token. A page
    /// without a token has no password gate and the call is a no-op.
    /// Otherwise the token, share key and password are posted back with the
    /// landing page as referer, and the response body is checked for the
    /// rejection sentinels. On success the session cookies authenticate all
    /// later requests.
    ///
    /// # Errors
    ///
    /// [`Error::WrongPassword`] if the password was rejected,
    /// [`Error::PasswordRequired`] if the share wants a password and none
    /// was given, or [`Error::Http`] on transport failures.
    pub async fn authenticate(&self, password: &str) -> Result<()> {
        let landing = self.landing_url();
        let body = self.http.get(&landing).send().await?.text().await?;

        let Some(token) = scrape::extract_csrf_token(&body) else {
            log::debug!("no csrf token on landing page, share is not password-gated");
            return Ok(());
        };

        log::debug!("submitting password for share {}", self.share_key);
        let form = [
            ("csrfmiddlewaretoken", token),
            ("token", self.share_key.as_str()),
            ("password", password),
        ];
        let body = self
            .http
            .post(&landing)
            .header(reqwest::header::REFERER, &landing)
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        if body.contains(WRONG_PASSWORD_SENTINEL) {
            return Err(Error::WrongPassword);
        }
        if body.contains(PASSWORD_REQUIRED_SENTINEL) {
            return Err(Error::PasswordRequired);
        }
        Ok(())
    }

    /// Lists one remote directory of the share.
    ///
    /// # Errors
    ///
    /// [`Error::Listing`] when the endpoint answers with an error status or
    /// a body that is not the expected `dirent_list` JSON; [`Error::Http`]
    /// on transport failures.
    pub async fn list_directory(&self, path: &str) -> Result<Vec<Dirent>> {
        let listing_error = |reason: String| Error::Listing {
            path: path.to_string(),
            reason,
        };

        let response = self
            .http
            .get(self.dirents_url())
            .query(&[("path", path)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(listing_error(format!("server answered {status}")));
        }

        let body = response.text().await?;
        let parsed: DirentListResponse =
            serde_json::from_str(&body).map_err(|e| listing_error(e.to_string()))?;
        Ok(parsed.dirent_list)
    }

    /// Resolves the raw asset URL for a media file.
    ///
    /// Image and video files are served through a viewer page instead of a
    /// direct download link; the actual storage location is embedded in the
    /// page markup. The extracted value is unescaped and, when it is a bare
    /// `/`-rooted path, joined onto this session's origin.
    ///
    /// # Errors
    ///
    /// [`Error::RawUrlNotFound`] when the marker is missing from the page,
    /// or [`Error::Http`] on transport failures.
    pub async fn resolve_raw_url(&self, file_path: &str) -> Result<String> {
        let page_url = self.viewer_page_url(file_path)?;
        let body = self.http.get(&page_url).send().await?.text().await?;

        let raw = scrape::extract_raw_path(&body).ok_or_else(|| Error::RawUrlNotFound {
            path: file_path.to_string(),
        })?;
        let decoded = scrape::unescape_raw_path(raw);
        if decoded.starts_with('/') {
            Ok(format!("{}{}", self.base_url, decoded))
        } else {
            Ok(decoded)
        }
    }

    /// Fetches an already-resolved URL on this session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failures or error statuses.
    pub async fn fetch(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response)
    }
}
