//! Release selection and parsing of GitHub release metadata.
//!
//! A [`Release`] pairs a normalized version with the zip assets attached to
//! it, keyed by target name. It comes either from the GitHub API
//! ([`resolve_release`]) or from a configured version and target list
//! ([`static_release`]).

use super::download::{DownloadError, HttpReleaseClient, ReleaseFetcher};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Content type GitHub reports for the platform archives.
const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Which release to ask the API for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSelector {
    /// The most recent published release.
    Latest,
    /// A release identified by its tag, always carrying a leading `v`.
    Tag(String),
}

impl ReleaseSelector {
    /// Interpret `latest` (any case) or a tag; bare versions gain a `v`
    /// prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_release::release::ReleaseSelector;
    ///
    /// assert_eq!(ReleaseSelector::new("Latest"), ReleaseSelector::Latest);
    /// assert_eq!(
    ///     ReleaseSelector::new("1.30.0"),
    ///     ReleaseSelector::Tag("v1.30.0".to_owned())
    /// );
    /// ```
    #[must_use]
    pub fn new(selector: &str) -> Self {
        let trimmed = selector.trim();
        if trimmed.eq_ignore_ascii_case("latest") {
            return Self::Latest;
        }
        if trimmed.starts_with('v') {
            Self::Tag(trimmed.to_owned())
        } else {
            Self::Tag(format!("v{trimmed}"))
        }
    }

    /// Path segment under `/releases/` addressing this release.
    #[must_use]
    pub fn api_path(&self) -> String {
        match self {
            Self::Latest => "latest".to_owned(),
            Self::Tag(tag) => format!("tags/{tag}"),
        }
    }
}

impl FromStr for ReleaseSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for ReleaseSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// A release version and its downloadable platform archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Version without the tag's `v` prefix, e.g. `1.30.0`.
    pub version: String,
    /// Target name (asset name without `.zip`) to download URL.
    pub assets: BTreeMap<String, String>,
}

impl Release {
    /// Target names in the release, sorted.
    #[must_use]
    pub fn target_names(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }
}

/// Errors arising from interpreting release metadata.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseParseError {
    /// The body was not the JSON shape the release API documents.
    #[error("malformed release metadata: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ApiRelease {
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<ApiAsset>,
}

#[derive(Debug, Deserialize)]
struct ApiAsset {
    content_type: String,
    name: String,
    browser_download_url: String,
}

/// Parse release metadata JSON.
///
/// Returns `Ok(None)` when the body has no `tag_name`, which the API does for
/// error payloads such as rate limiting.
///
/// # Errors
///
/// Returns [`ReleaseParseError::Json`] if the body is not valid release JSON.
///
/// # Examples
///
/// ```
/// use bin_release::release::resolver::parse_release;
///
/// let json = r#"{
///     "tag_name": "v1.30.0",
///     "assets": [{
///         "content_type": "application/zip",
///         "name": "deno-x86_64-unknown-linux-gnu.zip",
///         "browser_download_url": "https://example.test/deno-x86_64-unknown-linux-gnu.zip"
///     }]
/// }"#;
/// let release = parse_release(json)?.expect("tagged release");
/// assert_eq!(release.version, "1.30.0");
/// assert!(release.assets.contains_key("deno-x86_64-unknown-linux-gnu"));
/// # Ok::<(), bin_release::release::resolver::ReleaseParseError>(())
/// ```
pub fn parse_release(json: &str) -> std::result::Result<Option<Release>, ReleaseParseError> {
    let api: ApiRelease = serde_json::from_str(json)?;
    let Some(tag_name) = api.tag_name else {
        return Ok(None);
    };

    let version = tag_name
        .strip_prefix('v')
        .unwrap_or(&tag_name)
        .to_owned();
    let assets = api
        .assets
        .into_iter()
        .filter(|asset| asset.content_type == ZIP_CONTENT_TYPE)
        .map(|asset| {
            let name = asset
                .name
                .strip_suffix(".zip")
                .unwrap_or(&asset.name)
                .to_owned();
            (name, asset.browser_download_url)
        })
        .collect();

    Ok(Some(Release { version, assets }))
}

/// Fetch and parse the selected release.
///
/// # Errors
///
/// Returns an error when the request fails or the body is malformed. A
/// response without a tag, or a 404 for a specific tag, is not an error; it
/// yields `Ok(None)`.
pub fn resolve_release(
    fetcher: &dyn ReleaseFetcher,
    selector: &ReleaseSelector,
) -> Result<Option<Release>> {
    let json = match fetcher.fetch_release_json(selector) {
        Ok(json) => json,
        Err(DownloadError::NotFound { url }) if matches!(selector, ReleaseSelector::Tag(_)) => {
            log::warn!("no release tagged {selector} ({url})");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let release = parse_release(&json)?;
    match &release {
        Some(found) => log::info!(
            "resolved {selector} to version {} with {} zip asset(s)",
            found.version,
            found.assets.len()
        ),
        None => log::warn!("release metadata for {selector} carries no tag"),
    }
    Ok(release)
}

/// Build a release from a known version and target names without the
/// network, pointing each asset at its conventional download URL.
///
/// # Examples
///
/// ```
/// use bin_release::release::static_release;
///
/// let release = static_release("1.0.0", &["deno-x86_64-pc-windows-msvc".to_owned()]);
/// assert_eq!(
///     release.assets["deno-x86_64-pc-windows-msvc"],
///     "https://github.com/denoland/deno/releases/download/v1.0.0/deno-x86_64-pc-windows-msvc.zip"
/// );
/// ```
#[must_use]
pub fn static_release(version: &str, targets: &[String]) -> Release {
    let assets = targets
        .iter()
        .map(|name| {
            let url = HttpReleaseClient::asset_url(version, &format!("{name}.zip"));
            (name.clone(), url)
        })
        .collect();
    Release {
        version: version.to_owned(),
        assets,
    }
}
