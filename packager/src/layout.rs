//! Where package managers place the platform asset package.
//!
//! npm nests an optional dependency under the package that declared it or
//! hoists it next to that package, depending on version and flags. Instead of
//! guessing, the wrapper's preinstall step tries an explicit, ordered list of
//! [`DependencyLayout`]s, and [`detect_layout`] inspects an installed tree
//! with the same list.

use crate::manifest::{PACKAGE_SCOPE, WRAPPER_BINARY};
use std::fmt;
use std::path::Path;

/// Order in which layouts are tried, both by the preinstall step and by
/// [`detect_layout`].
pub const RELOCATION_ORDER: [DependencyLayout; 2] =
    [DependencyLayout::Nested, DependencyLayout::Sibling];

/// Location of an asset package relative to the installed wrapper package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyLayout {
    /// `node_modules/@bin-release/deno-*` inside the wrapper package.
    Nested,
    /// `../deno-*` beside the wrapper package, as produced by hoisting.
    Sibling,
}

impl DependencyLayout {
    /// Glob matching the asset package directory, relative to the wrapper.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_release::layout::DependencyLayout;
    ///
    /// assert_eq!(DependencyLayout::Sibling.package_glob(), "../deno-*");
    /// ```
    #[must_use]
    pub fn package_glob(self) -> String {
        match self {
            Self::Nested => format!("node_modules/{PACKAGE_SCOPE}/deno-*"),
            Self::Sibling => "../deno-*".to_owned(),
        }
    }

    /// Glob matching the binary inside the asset package.
    ///
    /// `deno*` covers both `deno` and `deno.exe`.
    #[must_use]
    pub fn binary_glob(self) -> String {
        format!("{}/bin/deno*", self.package_glob())
    }
}

impl fmt::Display for DependencyLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nested => f.write_str("nested"),
            Self::Sibling => f.write_str("sibling"),
        }
    }
}

/// Build the wrapper's preinstall command: one `mv` per layout, joined with
/// `||` so that a failed attempt falls through to the next.
///
/// # Examples
///
/// ```
/// use bin_release::layout::{RELOCATION_ORDER, preinstall_script};
///
/// assert_eq!(
///     preinstall_script(&RELOCATION_ORDER),
///     "mv node_modules/@bin-release/deno-*/bin/deno* ./bin/deno.exe || mv ../deno-*/bin/deno* ./bin/deno.exe"
/// );
/// ```
#[must_use]
pub fn preinstall_script(order: &[DependencyLayout]) -> String {
    order
        .iter()
        .map(|layout| format!("mv {} ./{WRAPPER_BINARY}", layout.binary_glob()))
        .collect::<Vec<_>>()
        .join(" || ")
}

/// Find the first layout in `order` whose asset package exists relative to
/// `wrapper_dir`, the installed wrapper package directory.
///
/// Returns `None` when no layout matches or the directory is not valid UTF-8.
#[must_use]
pub fn detect_layout(wrapper_dir: &Path, order: &[DependencyLayout]) -> Option<DependencyLayout> {
    let base = wrapper_dir.to_str()?;
    let escaped = glob::Pattern::escape(base);
    order.iter().copied().find(|layout| {
        let pattern = format!("{escaped}/{}", layout.package_glob());
        has_directory_match(&pattern)
    })
}

/// Whether `pattern` matches at least one directory.
fn has_directory_match(pattern: &str) -> bool {
    match glob::glob(pattern) {
        Ok(paths) => paths.flatten().any(|path| path.is_dir()),
        Err(e) => {
            log::debug!("invalid layout pattern {pattern}: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn nested_is_tried_before_sibling() {
        let script = preinstall_script(&RELOCATION_ORDER);
        let nested = script.find("node_modules/").expect("nested attempt");
        let sibling = script.find("../deno-*").expect("sibling attempt");
        assert!(nested < sibling);
        assert_eq!(script.matches(" || ").count(), 1);
    }

    #[test]
    fn single_layout_has_no_fallback() {
        let script = preinstall_script(&[DependencyLayout::Sibling]);
        assert_eq!(script, "mv ../deno-*/bin/deno* ./bin/deno.exe");
    }

    #[test]
    fn detects_nested_layout() {
        let temp = tempfile::tempdir().expect("temp dir");
        let wrapper = temp.path().join("node_modules/@bin-release/deno");
        fs::create_dir_all(wrapper.join("node_modules/@bin-release/deno-x86_64-pc-windows-msvc"))
            .expect("create nested");

        assert_eq!(
            detect_layout(&wrapper, &RELOCATION_ORDER),
            Some(DependencyLayout::Nested)
        );
    }

    #[test]
    fn detects_sibling_layout() {
        let temp = tempfile::tempdir().expect("temp dir");
        let scope = temp.path().join("node_modules/@bin-release");
        let wrapper = scope.join("deno");
        fs::create_dir_all(&wrapper).expect("create wrapper");
        fs::create_dir_all(scope.join("deno-x86_64-unknown-linux-gnu")).expect("create sibling");

        assert_eq!(
            detect_layout(&wrapper, &RELOCATION_ORDER),
            Some(DependencyLayout::Sibling)
        );
    }

    #[test]
    fn nested_wins_when_both_exist() {
        let temp = tempfile::tempdir().expect("temp dir");
        let scope = temp.path().join("node_modules/@bin-release");
        let wrapper = scope.join("deno");
        fs::create_dir_all(wrapper.join("node_modules/@bin-release/deno-x86_64-apple-darwin"))
            .expect("create nested");
        fs::create_dir_all(scope.join("deno-x86_64-apple-darwin")).expect("create sibling");

        assert_eq!(
            detect_layout(&wrapper, &RELOCATION_ORDER),
            Some(DependencyLayout::Nested)
        );
    }

    #[test]
    fn no_layout_when_asset_missing() {
        let temp = tempfile::tempdir().expect("temp dir");
        let wrapper = temp.path().join("node_modules/@bin-release/deno");
        fs::create_dir_all(&wrapper).expect("create wrapper");

        assert_eq!(detect_layout(&wrapper, &RELOCATION_ORDER), None);
    }

    #[test]
    fn files_do_not_count_as_packages() {
        let temp = tempfile::tempdir().expect("temp dir");
        let scope = temp.path().join("node_modules/@bin-release");
        let wrapper = scope.join("deno");
        fs::create_dir_all(&wrapper).expect("create wrapper");
        fs::write(scope.join("deno-notes.txt"), b"not a package").expect("write file");

        assert_eq!(detect_layout(&wrapper, &RELOCATION_ORDER), None);
    }
}
