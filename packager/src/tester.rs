//! Installation Tester: packs the built packages, installs them into a
//! throwaway consumer project, and checks the installed binary's version.

use crate::config::{BuildMode, CONSUMER_DIR, PackageManager, PackagerConfig, WRAPPER_DIR};
use crate::error::{PackagerError, Result};
use crate::layout::{DependencyLayout, RELOCATION_ORDER, detect_layout};
use crate::manifest::{WRAPPER_PACKAGE, consumer_manifest, write_manifest};
use crate::output::write_stderr_line;
use crate::process::{CommandExecutor, run_checked};
use crate::target::target_triple;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Settings for one installation test.
#[derive(Debug, Clone, Copy)]
pub struct TestConfig<'a> {
    /// Directory holding the built packages.
    pub work_dir: &'a Utf8Path,
    /// Version the installed binary must report.
    pub version: &'a str,
    /// Target whose asset package is packed and whose triple is expected.
    pub target: &'a str,
    /// Manifest shape the packages were built with.
    pub mode: BuildMode,
    /// Package manager used for installation.
    pub package_manager: PackageManager,
    /// Suppress progress output.
    pub quiet: bool,
}

impl<'a> TestConfig<'a> {
    /// Test settings for `version` taken from the run configuration.
    #[must_use]
    pub fn new(config: &'a PackagerConfig, version: &'a str) -> Self {
        Self {
            work_dir: &config.work_dir,
            version,
            target: config.test_target(),
            mode: config.mode,
            package_manager: config.package_manager,
            quiet: config.quiet,
        }
    }

    fn consumer_dir(&self) -> Utf8PathBuf {
        self.work_dir.join(CONSUMER_DIR)
    }
}

/// Result of a successful installation test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// First line printed by the installed binary; `None` when installation
    /// was skipped.
    pub version_line: Option<String>,
    /// Where the package manager placed the asset package, when found.
    pub layout: Option<DependencyLayout>,
}

/// Line `deno --version` prints first for `version` on `target`.
///
/// # Examples
///
/// ```
/// use bin_release::tester::expected_version_line;
///
/// assert_eq!(
///     expected_version_line("1.30.0", "deno-x86_64-pc-windows-msvc"),
///     "deno 1.30.0 (release, x86_64-pc-windows-msvc)"
/// );
/// ```
#[must_use]
pub fn expected_version_line(version: &str, target: &str) -> String {
    format!("deno {version} (release, {})", target_triple(target))
}

/// Pack, install, and verify the built packages.
///
/// # Errors
///
/// Returns [`PackagerError::CommandFailed`] when a package-manager command
/// fails, [`PackagerError::VersionMismatch`] when the installed binary
/// reports an unexpected version, or an I/O error from preparing the
/// consumer directory.
pub fn run_installation_test(
    config: &TestConfig<'_>,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<TestOutcome> {
    let consumer_dir = config.consumer_dir();
    std::fs::create_dir_all(&consumer_dir)?;

    pack_packages(config, executor, &consumer_dir, stderr)?;
    prepare_consumer(config.version, &consumer_dir)?;

    let Some(version_line) = install_and_query(config, executor, &consumer_dir, stderr)? else {
        log::info!("package manager disabled; skipping installation");
        return Ok(TestOutcome {
            version_line: None,
            layout: None,
        });
    };

    let expected = expected_version_line(config.version, config.target);
    if version_line != expected {
        return Err(PackagerError::VersionMismatch {
            expected,
            actual: version_line,
        });
    }

    let installed_wrapper = consumer_dir.join("node_modules").join(WRAPPER_PACKAGE);
    let layout = detect_layout(installed_wrapper.as_std_path(), &RELOCATION_ORDER);
    match layout {
        Some(found) => log::info!("asset package installed with the {found} layout"),
        None => log::warn!("asset package not found under {installed_wrapper}"),
    }

    Ok(TestOutcome {
        version_line: Some(version_line),
        layout,
    })
}

/// Pack the asset into the wrapper directory and the wrapper into the
/// consumer directory.
fn pack_packages(
    config: &TestConfig<'_>,
    executor: &dyn CommandExecutor,
    consumer_dir: &Utf8Path,
    stderr: &mut dyn Write,
) -> Result<()> {
    let wrapper_dir = config.work_dir.join(WRAPPER_DIR);
    let asset_dir = config.work_dir.join(config.target);
    let to_wrapper = format!("../{WRAPPER_DIR}");
    let to_consumer = format!("../{CONSUMER_DIR}");

    if !config.quiet {
        write_stderr_line(stderr, format!("Packing {}...", config.target));
    }
    run_checked(
        executor,
        asset_dir.as_std_path(),
        "npm",
        &["pack", "--pack-destination", &to_wrapper],
    )?;

    if !config.quiet {
        write_stderr_line(stderr, format!("Packing {WRAPPER_PACKAGE}..."));
    }
    run_checked(
        executor,
        wrapper_dir.as_std_path(),
        "npm",
        &["pack", "--pack-destination", &to_consumer],
    )?;

    if !config.mode.is_production() {
        copy_tarballs(&wrapper_dir, consumer_dir)?;
    }
    Ok(())
}

/// Copy every `*.tgz` in `from` into `to`.
fn copy_tarballs(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    for entry in std::fs::read_dir(from)? {
        let path = entry?.path();
        let is_tarball = path.extension().is_some_and(|ext| ext == "tgz");
        if !is_tarball || !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name() {
            let dest = to.as_std_path().join(name);
            std::fs::copy(&path, &dest)?;
            log::debug!("copied {} to {}", path.display(), dest.display());
        }
    }
    Ok(())
}

/// Write the consumer manifest and clear previous install state.
fn prepare_consumer(version: &str, consumer_dir: &Utf8Path) -> Result<()> {
    write_manifest(consumer_dir.as_std_path(), &consumer_manifest(version))?;

    for entry in std::fs::read_dir(consumer_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name != "node_modules" && !name.contains("lock") {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
        log::debug!("removed {}", path.display());
    }
    Ok(())
}

/// Install the consumer project and return the first line the installed
/// binary prints for `--version`, or `None` when no package manager is
/// configured.
fn install_and_query(
    config: &TestConfig<'_>,
    executor: &dyn CommandExecutor,
    consumer_dir: &Utf8Path,
    stderr: &mut dyn Write,
) -> Result<Option<String>> {
    let cwd = consumer_dir.as_std_path();
    let output = match config.package_manager {
        PackageManager::None => return Ok(None),
        PackageManager::Npm => {
            if !config.quiet {
                write_stderr_line(stderr, "Installing with npm...");
            }
            run_checked(executor, cwd, "npm", &["cache", "clean", "--force"])?;
            run_checked(executor, cwd, "npm", &["install"])?;
            run_checked(executor, cwd, "npx", &["deno", "--version"])?
        }
        PackageManager::Pnpm => {
            if !config.quiet {
                write_stderr_line(stderr, "Installing with pnpm...");
            }
            run_checked(executor, cwd, "pnpm", &["install"])?;
            run_checked(executor, cwd, "pnpm", &["exec", "deno", "--version"])?
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().unwrap_or_default().to_owned();
    log::debug!("installed binary reports `{first_line}`");
    Ok(Some(first_line))
}

#[cfg(test)]
#[path = "tester_tests.rs"]
mod tests;
