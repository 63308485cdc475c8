//! HTTP access to the Deno release API and its assets.
//!
//! Provides a trait-based abstraction over the network so the resolver and
//! builder can be exercised without touching GitHub.

use super::resolver::ReleaseSelector;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// The GitHub repository owner/name whose releases are repackaged.
const UPSTREAM_REPO: &str = "denoland/deno";

/// Base URL of the GitHub REST API.
const API_BASE: &str = "https://api.github.com";

/// Network timeout for metadata and asset downloads.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// GitHub rejects API requests without a user agent.
const USER_AGENT: &str = concat!("bin-release/", env!("CARGO_PKG_VERSION"));

/// Trait for fetching release metadata and assets.
///
/// # Examples
///
/// ```
/// use bin_release::release::download::HttpReleaseClient;
///
/// let client = HttpReleaseClient;
/// // Use client.fetch_release_json(&ReleaseSelector::Latest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseFetcher {
    /// Fetch the raw JSON describing the selected release.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the release does not exist.
    fn fetch_release_json(&self, selector: &ReleaseSelector) -> Result<String, DownloadError>;

    /// Download the asset at `url` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or file write fails.
    fn download_asset(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from release downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested release or asset was not found (HTTP 404).
    #[error("release not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based release client using `ureq`.
pub struct HttpReleaseClient;

impl HttpReleaseClient {
    /// Construct the API URL describing the selected release.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_release::release::ReleaseSelector;
    /// use bin_release::release::download::HttpReleaseClient;
    ///
    /// let url = HttpReleaseClient::release_url(&ReleaseSelector::Latest);
    /// assert!(url.ends_with("denoland/deno/releases/latest"));
    /// ```
    #[must_use]
    pub fn release_url(selector: &ReleaseSelector) -> String {
        format!(
            "{API_BASE}/repos/{UPSTREAM_REPO}/releases/{}",
            selector.api_path()
        )
    }

    /// Construct the public download URL of a release asset.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_release::release::download::HttpReleaseClient;
    ///
    /// let url = HttpReleaseClient::asset_url("1.30.0", "deno-x86_64-apple-darwin.zip");
    /// assert_eq!(
    ///     url,
    ///     "https://github.com/denoland/deno/releases/download/v1.30.0/deno-x86_64-apple-darwin.zip"
    /// );
    /// ```
    #[must_use]
    pub fn asset_url(version: &str, filename: &str) -> String {
        format!("https://github.com/{UPSTREAM_REPO}/releases/download/v{version}/{filename}")
    }
}

impl ReleaseFetcher for HttpReleaseClient {
    fn fetch_release_json(&self, selector: &ReleaseSelector) -> Result<String, DownloadError> {
        let url = Self::release_url(selector);
        log::debug!("fetching release metadata from {url}");
        download_text(&url)
    }

    fn download_asset(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        log::debug!("downloading {url} to {}", dest.display());
        download_to_file(url, dest)
    }
}

/// Download a URL and return the body as a string.
fn download_text(url: &str) -> Result<String, DownloadError> {
    let response = http_agent()
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    response
        .into_body()
        .read_to_string()
        .map_err(|e| DownloadError::HttpError {
            url: url.to_owned(),
            reason: e.to_string(),
        })
}

/// Download a URL and write the body to a file.
fn download_to_file(url: &str, dest: &Path) -> Result<(), DownloadError> {
    let response = http_agent()
        .get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    let mut file = std::fs::File::create(dest)?;
    std::io::copy(&mut response.into_body().as_reader(), &mut file).map_err(DownloadError::Io)?;
    Ok(())
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_url_for_tag_uses_tags_endpoint() {
        let selector = ReleaseSelector::Tag("v1.30.0".to_owned());
        let url = HttpReleaseClient::release_url(&selector);
        assert_eq!(
            url,
            "https://api.github.com/repos/denoland/deno/releases/tags/v1.30.0"
        );
    }

    #[test]
    fn release_url_for_latest() {
        let url = HttpReleaseClient::release_url(&ReleaseSelector::Latest);
        assert!(url.contains(UPSTREAM_REPO));
        assert!(url.ends_with("/releases/latest"));
    }

    #[test]
    fn asset_url_prefixes_version_with_v() {
        let url = HttpReleaseClient::asset_url("1.0.0", "deno-x86_64-pc-windows-msvc.zip");
        assert!(url.contains("/download/v1.0.0/"));
        assert!(url.ends_with("deno-x86_64-pc-windows-msvc.zip"));
    }

    #[test]
    fn user_agent_names_the_tool() {
        assert!(USER_AGENT.starts_with("bin-release/"));
    }

    #[test]
    fn map_ureq_error_maps_404_to_not_found() {
        let err = ureq::Error::StatusCode(404);
        let mapped = map_ureq_error("https://example.test/release", &err);
        assert!(matches!(mapped, DownloadError::NotFound { .. }));
    }

    #[test]
    fn map_ureq_error_maps_other_status_to_http_error() {
        let err = ureq::Error::StatusCode(500);
        let mapped = map_ureq_error("https://example.test/release", &err);
        assert!(matches!(mapped, DownloadError::HttpError { .. }));
    }
}
