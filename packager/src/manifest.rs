//! npm `package.json` documents for the wrapper, asset, and consumer
//! packages.
//!
//! Manifests are plain `serde` structs; field order follows npm convention so
//! the generated files read naturally. Maps are `BTreeMap`s, keeping output
//! stable between runs.

use crate::config::{BuildMode, PackageMetadata};
use crate::error::Result;
use crate::layout::{RELOCATION_ORDER, preinstall_script};
use crate::target::PlatformTarget;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// npm scope every generated package lives under.
pub const PACKAGE_SCOPE: &str = "@bin-release";

/// Name of the wrapper package.
pub const WRAPPER_PACKAGE: &str = "@bin-release/deno";

/// Where the wrapper exposes the relocated binary.
pub const WRAPPER_BINARY: &str = "bin/deno.exe";

/// Manifest filename inside every package directory.
pub const MANIFEST_FILE: &str = "package.json";

const WRAPPER_DESCRIPTION: &str =
    "CLI wrapper for Deno, a secure runtime for JavaScript and TypeScript";

/// Manifest of the wrapper package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapperManifest {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// Registry keywords.
    pub keywords: Vec<String>,
    /// Executables linked into `node_modules/.bin`.
    pub bin: BTreeMap<String, String>,
    /// Files included when packing.
    pub files: Vec<String>,
    /// Lifecycle scripts.
    pub scripts: BTreeMap<String, String>,
    /// Package author.
    pub author: String,
    /// SPDX license identifier.
    pub license: String,
    /// Required dependencies (always empty).
    pub dependencies: BTreeMap<String, String>,
    /// One entry per platform asset package.
    pub optional_dependencies: BTreeMap<String, String>,
}

/// Manifest of one platform asset package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetManifest {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Package author.
    pub author: String,
    /// SPDX license identifier.
    pub license: String,
    /// Binaries shipped by the package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Operating systems the package installs on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Vec<String>>,
    /// CPU architectures the package installs on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Vec<String>>,
}

/// Manifest of the throwaway project used to test installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerManifest {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// Package author.
    pub author: String,
    /// SPDX license identifier.
    pub license: String,
    /// The packed wrapper, referenced by file path.
    pub dependencies: BTreeMap<String, String>,
}

/// Scoped package name of an asset package.
///
/// # Examples
///
/// ```
/// use bin_release::manifest::asset_package_name;
///
/// assert_eq!(
///     asset_package_name("deno-x86_64-apple-darwin"),
///     "@bin-release/deno-x86_64-apple-darwin"
/// );
/// ```
#[must_use]
pub fn asset_package_name(target: &str) -> String {
    format!("{PACKAGE_SCOPE}/{target}")
}

/// Filename `npm pack` gives a scoped package: the `@` is dropped and the
/// `/` becomes `-`.
///
/// # Examples
///
/// ```
/// use bin_release::manifest::packed_archive_name;
///
/// assert_eq!(
///     packed_archive_name("@bin-release/deno", "1.30.0"),
///     "bin-release-deno-1.30.0.tgz"
/// );
/// ```
#[must_use]
pub fn packed_archive_name(package: &str, version: &str) -> String {
    let flat = package.trim_start_matches('@').replace('/', "-");
    format!("{flat}-{version}.tgz")
}

/// Build the wrapper manifest declaring every asset package in `names` as an
/// optional dependency.
///
/// In development mode each dependency points at its packed tarball and the
/// tarballs ship inside the wrapper; in production mode dependencies are
/// plain registry versions.
#[must_use]
pub fn wrapper_manifest(
    version: &str,
    names: &[String],
    mode: BuildMode,
    metadata: &PackageMetadata,
) -> WrapperManifest {
    let optional_dependencies = names
        .iter()
        .map(|name| {
            let package = asset_package_name(name);
            let spec = if mode.is_production() {
                version.to_owned()
            } else {
                format!("file:{}", packed_archive_name(&package, version))
            };
            (package, spec)
        })
        .collect();

    let mut files = vec![WRAPPER_BINARY.to_owned()];
    if !mode.is_production() {
        files.push("*.tgz".to_owned());
    }

    WrapperManifest {
        name: WRAPPER_PACKAGE.to_owned(),
        version: version.to_owned(),
        description: WRAPPER_DESCRIPTION.to_owned(),
        keywords: vec!["deno".to_owned()],
        bin: BTreeMap::from([("deno".to_owned(), WRAPPER_BINARY.to_owned())]),
        files,
        scripts: BTreeMap::from([(
            "preinstall".to_owned(),
            preinstall_script(&RELOCATION_ORDER),
        )]),
        author: metadata.author.clone(),
        license: metadata.license.clone(),
        dependencies: BTreeMap::new(),
        optional_dependencies,
    }
}

/// Build the manifest of the asset package for `name`.
///
/// Known targets carry their static `files`, `os`, and `cpu`; unknown names
/// produce a manifest without platform fields.
#[must_use]
pub fn asset_manifest(version: &str, name: &str, metadata: &PackageMetadata) -> AssetManifest {
    let platform = PlatformTarget::lookup(name);
    if platform.is_none() {
        log::warn!("no platform entry for {name}; its manifest has no files/os/cpu");
    }
    let owned = |values: &[&str]| values.iter().map(|&v| v.to_owned()).collect::<Vec<_>>();

    AssetManifest {
        name: asset_package_name(name),
        version: version.to_owned(),
        author: metadata.author.clone(),
        license: metadata.license.clone(),
        files: platform.map(|p| owned(p.files)),
        os: platform.map(|p| owned(p.os)),
        cpu: platform.map(|p| owned(p.cpu)),
    }
}

/// Build the consumer manifest depending on the packed wrapper of `version`.
#[must_use]
pub fn consumer_manifest(version: &str) -> ConsumerManifest {
    let wrapper_archive = packed_archive_name(WRAPPER_PACKAGE, version);
    ConsumerManifest {
        name: "test".to_owned(),
        version: "1.0.0".to_owned(),
        description: String::new(),
        author: String::new(),
        license: "MIT".to_owned(),
        dependencies: BTreeMap::from([(
            WRAPPER_PACKAGE.to_owned(),
            format!("file:{wrapper_archive}"),
        )]),
    }
}

/// Write `manifest` to `dir/package.json` as two-space indented JSON with a
/// trailing newline, replacing any existing file.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_manifest<T: Serialize>(dir: &Path, manifest: &T) -> Result<PathBuf> {
    let path = dir.join(MANIFEST_FILE);
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    std::fs::write(&path, json)?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::DEFAULT_TARGET;
    use rstest::rstest;
    use serde_json::Value;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|&v| v.to_owned()).collect()
    }

    fn all_targets() -> Vec<String> {
        crate::target::known_names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn optional_dependency_keys_match_asset_names() {
        let targets = all_targets();
        let manifest = wrapper_manifest(
            "1.30.0",
            &targets,
            BuildMode::Development,
            &PackageMetadata::default(),
        );
        let keys: Vec<_> = manifest.optional_dependencies.keys().cloned().collect();
        let mut expected: Vec<_> = targets.iter().map(|t| asset_package_name(t)).collect();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[rstest]
    #[case::development(
        BuildMode::Development,
        "file:bin-release-deno-x86_64-pc-windows-msvc-1.0.0.tgz"
    )]
    #[case::production(BuildMode::Production, "1.0.0")]
    fn optional_dependency_value_depends_on_mode(#[case] mode: BuildMode, #[case] value: &str) {
        let manifest = wrapper_manifest(
            "1.0.0",
            &names(&[DEFAULT_TARGET]),
            mode,
            &PackageMetadata::default(),
        );
        assert_eq!(
            manifest.optional_dependencies["@bin-release/deno-x86_64-pc-windows-msvc"],
            value
        );
    }

    #[rstest]
    #[case::development(BuildMode::Development, &["bin/deno.exe", "*.tgz"])]
    #[case::production(BuildMode::Production, &["bin/deno.exe"])]
    fn wrapper_files_depend_on_mode(#[case] mode: BuildMode, #[case] files: &[&str]) {
        let manifest = wrapper_manifest("1.0.0", &[], mode, &PackageMetadata::default());
        assert_eq!(manifest.files, names(files));
    }

    #[test]
    fn wrapper_with_no_assets_has_no_optional_dependencies() {
        let manifest = wrapper_manifest(
            "1.0.0",
            &[],
            BuildMode::Development,
            &PackageMetadata::default(),
        );
        assert!(manifest.optional_dependencies.is_empty());
        assert_eq!(manifest.name, WRAPPER_PACKAGE);
    }

    #[test]
    fn wrapper_serializes_npm_field_names() {
        let manifest = wrapper_manifest(
            "1.30.0",
            &names(&[DEFAULT_TARGET]),
            BuildMode::Development,
            &PackageMetadata::default(),
        );
        let value = serde_json::to_value(&manifest).expect("serialize");
        assert!(value.get("optionalDependencies").is_some());
        assert_eq!(value["bin"]["deno"], "bin/deno.exe");
        assert_eq!(value["keywords"], serde_json::json!(["deno"]));
        let preinstall = value["scripts"]["preinstall"].as_str().expect("script");
        assert!(preinstall.contains(" || "));
        assert_eq!(value["dependencies"], serde_json::json!({}));
    }

    #[rstest]
    #[case::windows("deno-x86_64-pc-windows-msvc", "bin/deno.exe", "win32", "x64")]
    #[case::linux("deno-x86_64-unknown-linux-gnu", "bin/deno", "linux", "x64")]
    #[case::macos_arm("deno-aarch64-apple-darwin", "bin/deno", "darwin", "arm64")]
    fn asset_manifest_copies_platform_fields(
        #[case] name: &str,
        #[case] file: &str,
        #[case] os: &str,
        #[case] cpu: &str,
    ) {
        let manifest = asset_manifest("1.30.0", name, &PackageMetadata::default());
        assert_eq!(manifest.name, format!("@bin-release/{name}"));
        assert_eq!(manifest.files, Some(names(&[file])));
        assert_eq!(manifest.os, Some(names(&[os])));
        assert_eq!(manifest.cpu, Some(names(&[cpu])));
    }

    #[test]
    fn unknown_asset_omits_platform_fields() {
        let manifest = asset_manifest("1.30.0", "deno-riscv64", &PackageMetadata::default());
        let value = serde_json::to_value(&manifest).expect("serialize");
        assert!(value.get("os").is_none());
        assert!(value.get("cpu").is_none());
        assert!(value.get("files").is_none());
        assert_eq!(value["license"], "MIT");
    }

    #[test]
    fn consumer_depends_on_packed_wrapper() {
        let manifest = consumer_manifest("1.30.0");
        assert_eq!(
            manifest.dependencies[WRAPPER_PACKAGE],
            "file:bin-release-deno-1.30.0.tgz"
        );
        assert_eq!(manifest.name, "test");
        assert_eq!(manifest.version, "1.0.0");
    }

    #[test]
    fn write_manifest_overwrites_with_pretty_json() {
        let temp = tempfile::tempdir().expect("temp dir");
        std::fs::write(temp.path().join(MANIFEST_FILE), "stale").expect("seed");

        let path = write_manifest(temp.path(), &consumer_manifest("1.0.0")).expect("write");
        let contents = std::fs::read_to_string(path).expect("read back");
        assert!(contents.starts_with("{\n  \"name\": \"test\""));
        assert!(contents.ends_with("}\n"));
        let value: Value = serde_json::from_str(&contents).expect("valid JSON");
        assert_eq!(value["license"], "MIT");
    }
}
