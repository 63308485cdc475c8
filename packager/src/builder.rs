//! Package Builder: lays out the wrapper and platform packages on disk.
//!
//! For a [`Release`] the builder writes `<work>/deno/package.json` declaring
//! every asset as an optional dependency, then one `<work>/<name>/` package
//! per asset. With binary fetching enabled each asset's zip is downloaded
//! and unpacked into `<work>/<name>/bin`.

use crate::config::{BuildMode, PackageMetadata, PackagerConfig, WRAPPER_DIR};
use crate::error::Result;
use crate::extraction::BinaryExtractor;
use crate::manifest::{asset_manifest, wrapper_manifest, write_manifest};
use crate::output::write_stderr_line;
use crate::release::Release;
use crate::release::download::ReleaseFetcher;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Settings the builder needs from the run configuration.
#[derive(Debug, Clone, Copy)]
pub struct BuildConfig<'a> {
    /// Directory under which packages are created.
    pub work_dir: &'a Utf8Path,
    /// Manifest shape.
    pub mode: BuildMode,
    /// Author and license for every manifest.
    pub metadata: &'a PackageMetadata,
    /// Download and unpack the platform binaries.
    pub fetch_binaries: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

impl<'a> From<&'a PackagerConfig> for BuildConfig<'a> {
    fn from(config: &'a PackagerConfig) -> Self {
        Self {
            work_dir: &config.work_dir,
            mode: config.mode,
            metadata: &config.metadata,
            fetch_binaries: config.fetch_binaries,
            quiet: config.quiet,
        }
    }
}

/// Sources of platform binaries used when fetching is enabled.
pub struct BinarySources<'a> {
    /// Downloads the release archives.
    pub fetcher: &'a dyn ReleaseFetcher,
    /// Unpacks the downloaded archives.
    pub extractor: &'a dyn BinaryExtractor,
}

/// Directories written by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// The wrapper package directory.
    pub wrapper_dir: Utf8PathBuf,
    /// One directory per asset package, in asset-name order.
    pub asset_dirs: Vec<Utf8PathBuf>,
}

/// Write the wrapper package and one package per release asset.
///
/// Directories are created if missing and never removed; manifests are
/// overwritten.
///
/// # Errors
///
/// Returns an error if a directory or manifest cannot be written, or, with
/// binary fetching enabled, if a download or extraction fails.
pub fn build_packages(
    config: &BuildConfig<'_>,
    release: &Release,
    sources: &BinarySources<'_>,
    stderr: &mut dyn Write,
) -> Result<BuildOutput> {
    let names = release.target_names();
    let wrapper_dir = config.work_dir.join(WRAPPER_DIR);
    std::fs::create_dir_all(wrapper_dir.join("bin"))?;
    let manifest = wrapper_manifest(&release.version, &names, config.mode, config.metadata);
    write_manifest(wrapper_dir.as_std_path(), &manifest)?;
    log::info!(
        "wrote wrapper manifest for {} with {} optional dependencies",
        release.version,
        manifest.optional_dependencies.len()
    );

    let mut asset_dirs = Vec::with_capacity(names.len());
    for (name, url) in &release.assets {
        let asset_dir = config.work_dir.join(name);
        std::fs::create_dir_all(&asset_dir)?;
        write_manifest(
            asset_dir.as_std_path(),
            &asset_manifest(&release.version, name, config.metadata),
        )?;

        if config.fetch_binaries {
            if !config.quiet {
                write_stderr_line(stderr, format!("Downloading {name}..."));
            }
            fetch_binary(&asset_dir, name, url, sources)?;
        }
        asset_dirs.push(asset_dir);
    }

    Ok(BuildOutput {
        wrapper_dir,
        asset_dirs,
    })
}

/// Download `<name>.zip` into the asset directory, unpack it into `bin`, and
/// delete the archive.
fn fetch_binary(
    asset_dir: &Utf8Path,
    name: &str,
    url: &str,
    sources: &BinarySources<'_>,
) -> Result<()> {
    let archive = asset_dir.join(format!("{name}.zip"));
    sources.fetcher.download_asset(url, archive.as_std_path())?;

    let bin_dir = asset_dir.join("bin");
    std::fs::create_dir_all(&bin_dir)?;
    let files = sources
        .extractor
        .extract(archive.as_std_path(), bin_dir.as_std_path())?;
    log::debug!("unpacked {} into {bin_dir}", files.join(", "));

    std::fs::remove_file(&archive)?;
    Ok(())
}
