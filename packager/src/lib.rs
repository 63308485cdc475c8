//! bin-release library.
//!
//! This crate repackages Deno release binaries as npm packages: a wrapper
//! package that relocates the right platform binary at install time, plus one
//! package per platform. It is used by the `bin-release` CLI binary and can
//! be driven programmatically with test doubles for the network and the
//! package managers.
//!
//! # Modules
//!
//! - [`builder`] - Wrapper and platform package layout on disk
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Run configuration from flags, `bin-release.toml`, and `NODE_ENV`
//! - [`error`] - Semantic error types
//! - [`extraction`] - Zip extraction with path traversal protection
//! - [`layout`] - Where package managers place optional dependencies
//! - [`manifest`] - npm `package.json` documents
//! - [`output`] - Progress messages for the CLI
//! - [`pipeline`] - Resolve, build, and test orchestration
//! - [`process`] - Package-manager subprocess execution
//! - [`release`] - Release resolution against the GitHub API
//! - [`target`] - Static platform target table
//! - [`tester`] - Installation test in a throwaway consumer project

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod release;
pub mod target;
pub mod tester;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
