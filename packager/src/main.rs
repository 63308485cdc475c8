//! bin-release CLI entrypoint.
//!
//! This binary resolves a Deno release, writes the npm wrapper and platform
//! packages, and verifies that the packed result installs and reports the
//! expected version.

use bin_release::cli::{Cli, Command, RunArgs};
use bin_release::config::{BuildMode, PackagerConfig};
use bin_release::extraction::ZipExtractor;
use bin_release::output::write_stderr_line;
use bin_release::pipeline::{PipelineDeps, build_stage, resolve_stage, run_pipeline, test_stage};
use bin_release::process::SystemCommandExecutor;
use bin_release::release::download::HttpReleaseClient;
use bin_release::release::{ReleaseSelector, resolve_release};
use clap::Parser;
use log::LevelFilter;
use std::error::Error;
use std::io::Write;

type RunResult = Result<(), Box<dyn Error>>;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.run_args());
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Install `env_logger`; `RUST_LOG` takes precedence over the flag-derived
/// level.
fn init_logging(args: &RunArgs) {
    env_logger::Builder::new()
        .filter_level(level_for(args))
        .parse_default_env()
        .init();
}

fn level_for(args: &RunArgs) -> LevelFilter {
    if args.quiet {
        return LevelFilter::Error;
    }
    match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> RunResult {
    if let Some(Command::Resolve(args)) = &cli.command {
        return print_release(&ReleaseSelector::new(&args.selector), stdout);
    }

    let config = PackagerConfig::from_args(cli.run_args(), BuildMode::from_env())?;
    let deps = PipelineDeps {
        fetcher: &HttpReleaseClient,
        extractor: &ZipExtractor,
        executor: &SystemCommandExecutor,
    };

    match &cli.command {
        Some(Command::Build(_)) => {
            if let Some(release) = resolve_stage(&config, deps.fetcher)? {
                build_stage(&config, &release, &deps, stderr)?;
            }
        }
        Some(Command::Test(_)) => {
            test_stage(&config, &config.version, deps.executor, stderr)?;
        }
        Some(Command::Resolve(_)) | None => {
            run_pipeline(&config, &deps, stderr)?;
        }
    }
    Ok(())
}

/// Write the resolved release as pretty JSON to `stdout`.
fn print_release(selector: &ReleaseSelector, stdout: &mut dyn Write) -> RunResult {
    if let Some(release) = resolve_release(&HttpReleaseClient, selector)? {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&release)?)?;
    }
    Ok(())
}

fn exit_code_for_run_result(result: RunResult, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
