//! Tests for CLI parsing and default behaviours.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["bin-release"]);
    assert!(cli.command.is_none());
    assert!(cli.run.config.is_none());
    assert!(cli.run.work_dir.is_none());
    assert!(cli.run.release_version.is_none());
    assert!(cli.run.resolve.is_none());
    assert!(cli.run.targets.is_empty());
    assert!(cli.run.mode.is_none());
    assert!(cli.run.package_manager.is_none());
    assert!(!cli.run.fetch_binaries);
    assert_eq!(cli.run.verbosity, 0);
    assert!(!cli.run.quiet);
}

#[test]
fn cli_parses_repeated_targets() {
    let cli = Cli::parse_from([
        "bin-release",
        "--target",
        "deno-x86_64-apple-darwin",
        "-t",
        "deno-aarch64-apple-darwin",
    ]);
    assert_eq!(
        cli.run.targets,
        vec![
            "deno-x86_64-apple-darwin".to_owned(),
            "deno-aarch64-apple-darwin".to_owned()
        ]
    );
}

#[rstest]
#[case::production("production", BuildMode::Production)]
#[case::development("development", BuildMode::Development)]
fn cli_parses_mode(#[case] value: &str, #[case] expected: BuildMode) {
    let cli = Cli::parse_from(["bin-release", "--mode", value]);
    assert_eq!(cli.run.mode, Some(expected));
}

#[rstest]
#[case::none("none", PackageManager::None)]
#[case::npm("npm", PackageManager::Npm)]
#[case::pnpm("pnpm", PackageManager::Pnpm)]
fn cli_parses_package_manager(#[case] value: &str, #[case] expected: PackageManager) {
    let cli = Cli::parse_from(["bin-release", "--package-manager", value]);
    assert_eq!(cli.run.package_manager, Some(expected));
}

#[test]
fn cli_rejects_yarn() {
    let result = Cli::try_parse_from(["bin-release", "--package-manager", "yarn"]);
    assert!(result.is_err());
}

#[test]
fn cli_parses_release_and_resolve() {
    let cli = Cli::parse_from(["bin-release", "--release", "1.0.0", "--resolve", "latest"]);
    assert_eq!(cli.run.release_version.as_deref(), Some("1.0.0"));
    assert_eq!(cli.run.resolve.as_deref(), Some("latest"));
}

#[test]
fn cli_counts_verbosity() {
    let cli = Cli::parse_from(["bin-release", "-vv"]);
    assert_eq!(cli.run.verbosity, 2);
}

#[test]
fn cli_rejects_quiet_with_verbose() {
    let result = Cli::try_parse_from(["bin-release", "-q", "-v"]);
    assert!(result.is_err());
}

#[test]
fn resolve_defaults_to_latest() {
    let cli = Cli::parse_from(["bin-release", "resolve"]);
    match cli.command {
        Some(Command::Resolve(args)) => assert_eq!(args.selector, "latest"),
        other => panic!("expected resolve, got {other:?}"),
    }
}

#[test]
fn resolve_accepts_a_tag() {
    let cli = Cli::parse_from(["bin-release", "resolve", "v1.30.0"]);
    match cli.command {
        Some(Command::Resolve(args)) => assert_eq!(args.selector, "v1.30.0"),
        other => panic!("expected resolve, got {other:?}"),
    }
}

#[test]
fn run_args_prefers_subcommand_arguments() {
    let cli = Cli::parse_from(["bin-release", "build", "--fetch-binaries", "-w", "/tmp/out"]);
    let args = cli.run_args();
    assert!(args.fetch_binaries);
    assert_eq!(args.work_dir, Some(Utf8PathBuf::from("/tmp/out")));
    assert!(!cli.run.fetch_binaries);
}

#[test]
fn run_args_falls_back_to_top_level() {
    let cli = Cli::parse_from(["bin-release", "-q"]);
    assert!(cli.run_args().quiet);
}

#[test]
fn resolve_args_default_matches_parser() {
    assert_eq!(ResolveArgs::default().selector, "latest");
}
