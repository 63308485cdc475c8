//! Release metadata resolution and asset retrieval.
//!
//! # Sub-modules
//!
//! - [`download`] - Transport trait and the `ureq`-backed GitHub client.
//! - [`resolver`] - Release selection, JSON parsing, and static releases.

pub mod download;
pub mod resolver;

pub use resolver::{Release, ReleaseSelector, resolve_release, static_release};
