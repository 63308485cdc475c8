//! Resolve, build, and test orchestration.
//!
//! Each stage is available on its own for the `resolve`, `build`, and `test`
//! subcommands; [`run_pipeline`] runs them in order and tags any failure with
//! the [`Stage`] that produced it.

use crate::builder::{BinarySources, BuildConfig, BuildOutput, build_packages};
use crate::config::PackagerConfig;
use crate::error::{PackagerError, Result};
use crate::extraction::BinaryExtractor;
use crate::output::{build_message, release_message, test_message, write_stderr_line};
use crate::process::CommandExecutor;
use crate::release::download::ReleaseFetcher;
use crate::release::{Release, resolve_release, static_release};
use crate::tester::{TestConfig, TestOutcome, run_installation_test};
use std::fmt;
use std::io::Write;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Determine the release and its assets.
    Resolve,
    /// Write the wrapper and platform packages.
    Build,
    /// Pack, install, and check the version.
    Test,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => f.write_str("resolve"),
            Self::Build => f.write_str("build"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// A stage failure.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    /// The stage that failed.
    pub stage: Stage,
    /// The underlying error.
    #[source]
    pub source: PackagerError,
}

/// External collaborators of the pipeline.
pub struct PipelineDeps<'a> {
    /// Release metadata and asset downloads.
    pub fetcher: &'a dyn ReleaseFetcher,
    /// Archive extraction.
    pub extractor: &'a dyn BinaryExtractor,
    /// Package-manager subprocesses.
    pub executor: &'a dyn CommandExecutor,
}

/// What a complete run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// The packaged release.
    pub release: Release,
    /// Directories written by the build.
    pub build: BuildOutput,
    /// Result of the installation test.
    pub test: TestOutcome,
}

/// Determine the release to package: resolved remotely when a selector is
/// configured, otherwise assembled from the configured version and targets.
///
/// # Errors
///
/// Returns an error if remote resolution fails.
pub fn resolve_stage(
    config: &PackagerConfig,
    fetcher: &dyn ReleaseFetcher,
) -> Result<Option<Release>> {
    match &config.resolve {
        Some(selector) => resolve_release(fetcher, selector),
        None => Ok(Some(static_release(&config.version, &config.targets))),
    }
}

/// Build packages for `release`.
///
/// # Errors
///
/// Returns any builder error.
pub fn build_stage(
    config: &PackagerConfig,
    release: &Release,
    deps: &PipelineDeps<'_>,
    stderr: &mut dyn Write,
) -> Result<BuildOutput> {
    let sources = BinarySources {
        fetcher: deps.fetcher,
        extractor: deps.extractor,
    };
    let output = build_packages(&BuildConfig::from(config), release, &sources, stderr)?;
    if !config.quiet {
        write_stderr_line(stderr, build_message(&output));
    }
    Ok(output)
}

/// Run the installation test for `version`.
///
/// # Errors
///
/// Returns any tester error.
pub fn test_stage(
    config: &PackagerConfig,
    version: &str,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<TestOutcome> {
    let outcome = run_installation_test(&TestConfig::new(config, version), executor, stderr)?;
    if !config.quiet {
        write_stderr_line(stderr, test_message(&outcome));
    }
    Ok(outcome)
}

/// Run Resolve, Build, and Test in order.
///
/// Returns `Ok(None)` when resolution finds no release; nothing is built in
/// that case.
///
/// # Errors
///
/// Returns a [`PipelineError`] naming the first stage that failed.
pub fn run_pipeline(
    config: &PackagerConfig,
    deps: &PipelineDeps<'_>,
    stderr: &mut dyn Write,
) -> std::result::Result<Option<PipelineSummary>, PipelineError> {
    log::info!("starting {} stage", Stage::Resolve);
    let Some(release) = resolve_stage(config, deps.fetcher).map_err(at(Stage::Resolve))? else {
        log::warn!("no release to package; nothing to do");
        return Ok(None);
    };
    if !config.quiet {
        write_stderr_line(stderr, release_message(&release));
    }

    log::info!("starting {} stage", Stage::Build);
    let build = build_stage(config, &release, deps, stderr).map_err(at(Stage::Build))?;

    log::info!("starting {} stage", Stage::Test);
    require_built(config, &release).map_err(at(Stage::Test))?;
    let test = test_stage(config, &release.version, deps.executor, stderr)
        .map_err(at(Stage::Test))?;

    log::info!("pipeline finished for {}", release.version);
    Ok(Some(PipelineSummary {
        release,
        build,
        test,
    }))
}

/// The installation test needs the asset package for its target on disk.
fn require_built(config: &PackagerConfig, release: &Release) -> Result<()> {
    let name = config.test_target();
    if release.assets.contains_key(name) {
        Ok(())
    } else {
        Err(PackagerError::TargetNotBuilt {
            name: name.to_owned(),
        })
    }
}

fn at(stage: Stage) -> impl FnOnce(PackagerError) -> PipelineError {
    move |source| PipelineError { stage, source }
}
