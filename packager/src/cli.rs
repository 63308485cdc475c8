//! CLI argument definitions for the bin-release packager.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::{BuildMode, PackageManager};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Repackage Deno release binaries as npm packages.
#[derive(Parser, Debug)]
#[command(name = "bin-release")]
#[command(version, about)]
#[command(long_about = concat!(
    "Repackage Deno release binaries as npm packages.\n\n",
    "Without a subcommand the full pipeline runs: resolve the release, write ",
    "the wrapper package and one package per platform, then pack and install ",
    "them into a throwaway project and check the installed binary's version.\n\n",
    "NODE_ENV selects the manifest shape when --mode is not given: values ",
    "starting with `prod` produce registry dependencies, anything else local ",
    "tarball dependencies.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build and test the default Windows package for 1.30.0:\n",
    "    $ bin-release\n\n",
    "  Package the latest release for every platform it ships:\n",
    "    $ bin-release --resolve latest --fetch-binaries\n\n",
    "  Show what the API reports for a tag:\n",
    "    $ bin-release resolve v1.30.0\n\n",
    "  Write manifests only:\n",
    "    $ bin-release build --target deno-x86_64-unknown-linux-gnu",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Pipeline arguments (used when no subcommand is given).
    #[command(flatten)]
    pub run: RunArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the release the API reports as JSON.
    Resolve(ResolveArgs),

    /// Write the wrapper and platform packages only.
    Build(RunArgs),

    /// Pack and install previously built packages.
    Test(RunArgs),
}

/// Arguments shared by the pipeline, `build`, and `test`.
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Configuration file [default: <work-dir>/bin-release.toml when present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory packages are written to [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,

    /// Release version to package without querying the API [default: 1.30.0].
    #[arg(short, long = "release", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Resolve the release from the API (`latest` or a tag).
    #[arg(long, value_name = "SELECTOR")]
    pub resolve: Option<String>,

    /// Platform target to package (can be repeated).
    #[arg(short, long = "target", value_name = "NAME")]
    pub targets: Vec<String>,

    /// Manifest shape [default: from NODE_ENV].
    #[arg(short, long, value_enum)]
    pub mode: Option<BuildMode>,

    /// Package manager for the installation test [default: npm].
    #[arg(short, long, value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Download and unpack the platform binaries into each package.
    #[arg(long)]
    pub fetch_binaries: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Arguments for the resolve command.
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    /// `latest` or a release tag such as `v1.30.0`.
    #[arg(value_name = "SELECTOR", default_value = "latest")]
    pub selector: String,
}

impl Default for ResolveArgs {
    fn default() -> Self {
        Self {
            selector: "latest".to_owned(),
        }
    }
}

impl Cli {
    /// Returns the effective run arguments.
    ///
    /// `build` and `test` carry their own arguments; otherwise the flattened
    /// top-level arguments apply.
    #[must_use]
    pub fn run_args(&self) -> &RunArgs {
        match &self.command {
            Some(Command::Build(args) | Command::Test(args)) => args,
            Some(Command::Resolve(_)) | None => &self.run,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
