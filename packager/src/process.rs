//! Subprocess execution for the package-manager steps.
//!
//! All `npm`, `npx`, and `pnpm` invocations go through [`CommandExecutor`],
//! so the tester can be driven by a scripted stub in tests.

use crate::error::{PackagerError, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Programs that are installed as `.cmd` shims on Windows.
const CMD_SHIMS: [&str; 3] = ["npm", "npx", "pnpm"];

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs `program` with `args` in `cwd` and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bin_release::process::{CommandExecutor, SystemCommandExecutor};
    /// use std::path::Path;
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run(Path::new("."), "npm", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), bin_release::error::PackagerError>(())
    /// ```
    fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> Result<Output> {
        let resolved = host_program(program, cfg!(windows));
        log::debug!("running `{}` in {}", command_line(program, args), cwd.display());
        Command::new(resolved)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(PackagerError::from)
    }
}

/// Name to spawn for `program`; package managers resolve to their `.cmd`
/// shim on Windows.
///
/// # Examples
///
/// ```
/// use bin_release::process::host_program;
///
/// assert_eq!(host_program("npm", true), "npm.cmd");
/// assert_eq!(host_program("npm", false), "npm");
/// assert_eq!(host_program("git", true), "git");
/// ```
#[must_use]
pub fn host_program(program: &str, windows: bool) -> String {
    if windows && CMD_SHIMS.contains(&program) {
        format!("{program}.cmd")
    } else {
        program.to_owned()
    }
}

/// Run a command and fail unless it exits successfully.
///
/// # Errors
///
/// Returns [`PackagerError::CommandFailed`] with the trimmed stderr when the
/// command exits non-zero, or the executor's error if it cannot be spawned.
pub fn run_checked(
    executor: &dyn CommandExecutor,
    cwd: &Path,
    program: &str,
    args: &[&str],
) -> Result<Output> {
    let output = executor.run(cwd, program, args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PackagerError::CommandFailed {
            command: command_line(program, args),
            status: output.status,
            stderr: stderr.trim().to_owned(),
        });
    }
    Ok(output)
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
