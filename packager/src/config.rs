//! Run configuration for the packager.
//!
//! [`PackagerConfig`] is the single value threaded through the pipeline. It
//! is assembled once from command-line flags, an optional `bin-release.toml`
//! file, and `NODE_ENV`; nothing downstream reads the environment itself.

use crate::cli::RunArgs;
use crate::error::{PackagerError, Result};
use crate::release::ReleaseSelector;
use crate::target::{DEFAULT_TARGET, PlatformTarget};
use camino::{Utf8Path, Utf8PathBuf};
use clap::ValueEnum;
use serde::Deserialize;

/// Release version packaged when none is configured.
pub const DEFAULT_VERSION: &str = "1.30.0";

/// Configuration file looked up in the work directory.
pub const CONFIG_FILE_NAME: &str = "bin-release.toml";

/// Directory holding the wrapper package, relative to the work directory.
pub const WRAPPER_DIR: &str = "deno";

/// Directory holding the throwaway consumer project.
pub const CONSUMER_DIR: &str = "test";

/// Environment variable selecting the manifest shape.
const NODE_ENV: &str = "NODE_ENV";

/// Whether manifests reference the registry or local tarballs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Optional dependencies point at registry versions.
    Production,
    /// Optional dependencies point at packed `.tgz` files next to the wrapper.
    #[default]
    Development,
}

impl BuildMode {
    /// Interpret a `NODE_ENV` value: anything starting with `prod` selects
    /// production.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_release::config::BuildMode;
    ///
    /// assert_eq!(BuildMode::from_node_env(Some("production")), BuildMode::Production);
    /// assert_eq!(BuildMode::from_node_env(Some("prod")), BuildMode::Production);
    /// assert_eq!(BuildMode::from_node_env(Some("development")), BuildMode::Development);
    /// assert_eq!(BuildMode::from_node_env(None), BuildMode::Development);
    /// ```
    #[must_use]
    pub fn from_node_env(value: Option<&str>) -> Self {
        if value.is_some_and(|v| v.starts_with("prod")) {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Read `NODE_ENV` from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let value = std::env::var(NODE_ENV).ok();
        Self::from_node_env(value.as_deref())
    }

    /// Whether this is [`BuildMode::Production`].
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Package manager used to install the consumer project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// Pack only; skip installation and the version check.
    None,
    /// `npm install` followed by `npx deno --version`.
    #[default]
    Npm,
    /// `pnpm install` followed by `pnpm exec deno --version`.
    Pnpm,
}

/// Author and license stamped into every generated manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageMetadata {
    /// Value of the `author` field.
    pub author: String,
    /// Value of the `license` field.
    pub license: String,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self {
            author: "Gitai<i@gitai.me>".to_owned(),
            license: "MIT".to_owned(),
        }
    }
}

/// Settings accepted from `bin-release.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Release version to package.
    pub version: Option<String>,
    /// Target names to package when not resolving remotely.
    pub targets: Option<Vec<String>>,
    /// Release selector (`latest` or a tag) to resolve remotely.
    pub resolve: Option<String>,
    /// Package manager for the installation test.
    pub package_manager: Option<PackageManager>,
    /// Whether to download and unpack the platform binaries.
    pub fetch_binaries: Option<bool>,
    /// Manifest author and license.
    pub metadata: Option<PackageMetadata>,
}

impl FileConfig {
    /// Parse TOML configuration text.
    ///
    /// # Errors
    ///
    /// Returns the `toml` parse error, including unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_release::config::{FileConfig, PackageManager};
    ///
    /// let config = FileConfig::parse("version = \"1.29.0\"\npackage_manager = \"pnpm\"\n")?;
    /// assert_eq!(config.version.as_deref(), Some("1.29.0"));
    /// assert_eq!(config.package_manager, Some(PackageManager::Pnpm));
    /// # Ok::<(), toml::de::Error>(())
    /// ```
    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidConfig`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| PackagerError::InvalidConfig {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        Self::parse(&contents).map_err(|e| PackagerError::InvalidConfig {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }
}

/// Fully resolved configuration for one packager run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerConfig {
    /// Directory under which every package directory is created.
    pub work_dir: Utf8PathBuf,
    /// Release version to package when not resolving remotely.
    pub version: String,
    /// Target names to package when not resolving remotely.
    pub targets: Vec<String>,
    /// Remote release to resolve instead of the static version and targets.
    pub resolve: Option<ReleaseSelector>,
    /// Manifest shape.
    pub mode: BuildMode,
    /// Package manager for the installation test.
    pub package_manager: PackageManager,
    /// Whether to download and unpack platform binaries during the build.
    pub fetch_binaries: bool,
    /// Manifest author and license.
    pub metadata: PackageMetadata,
    /// Suppress progress output.
    pub quiet: bool,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            work_dir: Utf8PathBuf::from("."),
            version: DEFAULT_VERSION.to_owned(),
            targets: vec![DEFAULT_TARGET.to_owned()],
            resolve: None,
            mode: BuildMode::default(),
            package_manager: PackageManager::default(),
            fetch_binaries: false,
            metadata: PackageMetadata::default(),
            quiet: false,
        }
    }
}

impl PackagerConfig {
    /// Assemble the configuration from CLI flags, the optional config file,
    /// and the `NODE_ENV`-derived default mode.
    ///
    /// Flags override file values. An explicit `--config` must exist; the
    /// implicit `bin-release.toml` in the work directory is optional.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidConfig`] for unreadable or malformed
    /// files and [`PackagerError::UnknownTarget`] for unknown static targets.
    pub fn from_args(args: &RunArgs, env_mode: BuildMode) -> Result<Self> {
        let work_dir = args
            .work_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        let file = load_file_config(args.config.as_deref(), &work_dir)?;
        let defaults = Self::default();

        let targets = if args.targets.is_empty() {
            file.targets.unwrap_or(defaults.targets)
        } else {
            args.targets.clone()
        };
        let resolve = args
            .resolve
            .as_deref()
            .or(file.resolve.as_deref())
            .map(ReleaseSelector::new);

        let config = Self {
            work_dir,
            version: args
                .release_version
                .clone()
                .or(file.version)
                .unwrap_or(defaults.version),
            targets,
            resolve,
            mode: args.mode.unwrap_or(env_mode),
            package_manager: args
                .package_manager
                .or(file.package_manager)
                .unwrap_or(defaults.package_manager),
            fetch_binaries: args.fetch_binaries || file.fetch_binaries.unwrap_or(false),
            metadata: file.metadata.unwrap_or(defaults.metadata),
            quiet: args.quiet,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that statically configured targets are in the platform table.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::UnknownTarget`] for the first unknown name.
    pub fn validate(&self) -> Result<()> {
        if self.resolve.is_none() {
            for name in &self.targets {
                PlatformTarget::require(name)?;
            }
        }
        Ok(())
    }

    /// Directory of the wrapper package.
    #[must_use]
    pub fn wrapper_dir(&self) -> Utf8PathBuf {
        self.work_dir.join(WRAPPER_DIR)
    }

    /// Directory of the asset package for `name`.
    #[must_use]
    pub fn asset_dir(&self, name: &str) -> Utf8PathBuf {
        self.work_dir.join(name)
    }

    /// Directory of the throwaway consumer project.
    #[must_use]
    pub fn consumer_dir(&self) -> Utf8PathBuf {
        self.work_dir.join(CONSUMER_DIR)
    }

    /// Target whose binary the installation test runs.
    #[must_use]
    pub fn test_target(&self) -> &str {
        self.targets.first().map_or(DEFAULT_TARGET, String::as_str)
    }
}

/// Read the explicit config file, or the implicit one when present.
fn load_file_config(explicit: Option<&Utf8Path>, work_dir: &Utf8Path) -> Result<FileConfig> {
    if let Some(path) = explicit {
        log::debug!("loading config from {path}");
        return FileConfig::load(path);
    }
    let implicit = work_dir.join(CONFIG_FILE_NAME);
    if implicit.is_file() {
        log::debug!("loading config from {implicit}");
        FileConfig::load(&implicit)
    } else {
        Ok(FileConfig::default())
    }
}
