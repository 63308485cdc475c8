//! User-facing progress lines for the packager CLI.

use crate::builder::BuildOutput;
use crate::release::Release;
use crate::tester::TestOutcome;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output; ignore write failures.
    }
}

/// Describe the release about to be packaged.
///
/// # Example
///
/// ```
/// use bin_release::output::release_message;
/// use bin_release::release::static_release;
///
/// let release = static_release("1.30.0", &["deno-x86_64-pc-windows-msvc".to_owned()]);
/// assert_eq!(release_message(&release), "Packaging Deno 1.30.0 for 1 target");
/// ```
#[must_use]
pub fn release_message(release: &Release) -> String {
    let count = release.assets.len();
    let plural = if count == 1 { "target" } else { "targets" };
    format!("Packaging Deno {} for {count} {plural}", release.version)
}

/// Summarize the directories a build wrote.
#[must_use]
pub fn build_message(output: &BuildOutput) -> String {
    let count = output.asset_dirs.len();
    let plural = if count == 1 { "package" } else { "packages" };
    format!(
        "Wrote wrapper package to {} and {count} platform {plural}",
        output.wrapper_dir
    )
}

/// Summarize the installation test.
#[must_use]
pub fn test_message(outcome: &TestOutcome) -> String {
    match (&outcome.version_line, outcome.layout) {
        (Some(line), Some(layout)) => {
            format!("Installed binary reports `{line}` ({layout} dependency layout)")
        }
        (Some(line), None) => format!("Installed binary reports `{line}`"),
        (None, _) => "Packed archives; installation skipped".to_owned(),
    }
}
