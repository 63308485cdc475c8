//! Static table of the platform targets Deno publishes binaries for.
//!
//! Each entry maps a release asset name (the zip filename without its
//! extension) to the npm `files`, `os`, and `cpu` fields of the asset package
//! that carries its binary.

use crate::error::{PackagerError, Result};
use std::fmt;

/// Prefix shared by every Deno release asset name.
const ASSET_PREFIX: &str = "deno-";

/// The target exercised when nothing else is requested.
pub const DEFAULT_TARGET: &str = "deno-x86_64-pc-windows-msvc";

/// A supported OS/CPU combination and the files its asset package ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    /// Canonical asset name, e.g. `deno-x86_64-unknown-linux-gnu`.
    pub name: &'static str,
    /// Paths of the binaries inside the asset package.
    pub files: &'static [&'static str],
    /// Node `process.platform` values the package installs on.
    pub os: &'static [&'static str],
    /// Node `process.arch` values the package installs on.
    pub cpu: &'static [&'static str],
}

/// Every target with a prebuilt binary.
pub const PLATFORM_TARGETS: &[PlatformTarget] = &[
    PlatformTarget {
        name: "deno-aarch64-apple-darwin",
        files: &["bin/deno"],
        os: &["darwin"],
        cpu: &["arm64"],
    },
    PlatformTarget {
        name: "deno-x86_64-apple-darwin",
        files: &["bin/deno"],
        os: &["darwin"],
        cpu: &["x64"],
    },
    PlatformTarget {
        name: "deno-x86_64-pc-windows-msvc",
        files: &["bin/deno.exe"],
        os: &["win32"],
        cpu: &["x64"],
    },
    PlatformTarget {
        name: "deno-x86_64-unknown-linux-gnu",
        files: &["bin/deno"],
        os: &["linux"],
        cpu: &["x64"],
    },
];

impl PlatformTarget {
    /// Look up a target by its asset name.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_release::target::PlatformTarget;
    ///
    /// let target = PlatformTarget::lookup("deno-x86_64-pc-windows-msvc").expect("known target");
    /// assert_eq!(target.os, &["win32"]);
    /// assert!(PlatformTarget::lookup("deno-riscv64-unknown-linux-gnu").is_none());
    /// ```
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static Self> {
        PLATFORM_TARGETS.iter().find(|target| target.name == name)
    }

    /// Look up a target, failing with the list of known names.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::UnknownTarget`] when `name` is not in
    /// [`PLATFORM_TARGETS`].
    pub fn require(name: &str) -> Result<&'static Self> {
        Self::lookup(name).ok_or_else(|| PackagerError::UnknownTarget {
            name: name.to_owned(),
            expected: known_names().join(", "),
        })
    }

    /// The Rust target triple embedded in the name.
    #[must_use]
    pub fn triple(&self) -> &'static str {
        target_triple(self.name)
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Names of every supported target, in table order.
#[must_use]
pub fn known_names() -> Vec<&'static str> {
    PLATFORM_TARGETS.iter().map(|target| target.name).collect()
}

/// Strip the `deno-` prefix from an asset name to recover its triple.
///
/// Names without the prefix are returned unchanged.
///
/// # Examples
///
/// ```
/// use bin_release::target::target_triple;
///
/// assert_eq!(target_triple("deno-x86_64-apple-darwin"), "x86_64-apple-darwin");
/// assert_eq!(target_triple("x86_64-apple-darwin"), "x86_64-apple-darwin");
/// ```
#[must_use]
pub fn target_triple(name: &str) -> &str {
    name.strip_prefix(ASSET_PREFIX).unwrap_or(name)
}
