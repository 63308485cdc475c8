//! BDD tests for the installation test against scripted package managers.

use bin_release::config::{BuildMode, PackageManager};
use bin_release::error::PackagerError;
use bin_release::target::DEFAULT_TARGET;
use bin_release::tester::{TestConfig, TestOutcome, run_installation_test};
use bin_release::test_utils::{ExpectedCall, StubExecutor, output_with_stdout, success_output};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct TesterWorld {
    _temp_dir: tempfile::TempDir,
    work_dir: Utf8PathBuf,
    version: String,
    printed: String,
    result: Option<Result<TestOutcome, PackagerError>>,
}

impl TesterWorld {
    fn run(&mut self, package_manager: PackageManager, calls: Vec<ExpectedCall>) {
        let executor = StubExecutor::new(calls);
        let config = TestConfig {
            work_dir: &self.work_dir,
            version: &self.version,
            target: DEFAULT_TARGET,
            mode: BuildMode::Development,
            package_manager,
            quiet: true,
        };
        let result = run_installation_test(&config, &executor, &mut Vec::new());
        if result.is_ok() {
            executor.assert_finished();
        }
        self.result = Some(result);
    }

    fn outcome(&self) -> &TestOutcome {
        match self.result.as_ref().expect("test ran") {
            Ok(outcome) => outcome,
            Err(err) => panic!("installation test failed: {err}"),
        }
    }
}

#[fixture]
fn world() -> TesterWorld {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let work_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 path");
    TesterWorld {
        _temp_dir: temp_dir,
        work_dir,
        version: String::new(),
        printed: String::new(),
        result: None,
    }
}

fn pack_calls() -> Vec<ExpectedCall> {
    vec![
        ExpectedCall {
            cmd: "npm",
            args: vec!["pack", "--pack-destination", "../deno"],
            result: Ok(success_output()),
        },
        ExpectedCall {
            cmd: "npm",
            args: vec!["pack", "--pack-destination", "../test"],
            result: Ok(success_output()),
        },
    ]
}

#[given("built packages for version \"{version}\"")]
fn given_built_packages(world: &mut TesterWorld, version: String) {
    std::fs::create_dir_all(world.work_dir.join("deno")).expect("wrapper dir");
    std::fs::create_dir_all(world.work_dir.join(DEFAULT_TARGET)).expect("asset dir");
    world.version = version;
}

#[given("the installed binary prints \"{line}\"")]
fn given_binary_prints(world: &mut TesterWorld, line: String) {
    world.printed = format!("{line}\nv8 10.9.194.5\ntypescript 4.9.4\n");
}

#[when("the installation test runs with npm")]
fn when_runs_with_npm(world: &mut TesterWorld) {
    let mut calls = pack_calls();
    calls.extend([
        ExpectedCall {
            cmd: "npm",
            args: vec!["cache", "clean", "--force"],
            result: Ok(success_output()),
        },
        ExpectedCall {
            cmd: "npm",
            args: vec!["install"],
            result: Ok(success_output()),
        },
        ExpectedCall {
            cmd: "npx",
            args: vec!["deno", "--version"],
            result: Ok(output_with_stdout(&world.printed)),
        },
    ]);
    world.run(PackageManager::Npm, calls);
}

#[when("the installation test runs without a package manager")]
fn when_runs_without_package_manager(world: &mut TesterWorld) {
    world.run(PackageManager::None, pack_calls());
}

#[then("the installation test passes")]
fn then_passes(world: &mut TesterWorld) {
    let outcome = world.outcome();
    let expected = format!("deno {} (release, x86_64-pc-windows-msvc)", world.version);
    assert_eq!(outcome.version_line.as_deref(), Some(expected.as_str()));
}

#[then("the installation test passes without a version line")]
fn then_passes_without_version(world: &mut TesterWorld) {
    assert_eq!(world.outcome().version_line, None);
}

#[then("the installation test fails with a version mismatch")]
fn then_fails_with_mismatch(world: &mut TesterWorld) {
    let result = world.result.as_ref().expect("test ran");
    assert!(
        matches!(result, Err(PackagerError::VersionMismatch { .. })),
        "expected a version mismatch, got {result:?}"
    );
}

#[then("the consumer manifest depends on \"{spec}\"")]
fn then_consumer_depends_on(world: &mut TesterWorld, spec: String) {
    let text = std::fs::read_to_string(world.work_dir.join("test/package.json"))
        .expect("consumer manifest");
    let manifest: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    let actual = manifest
        .get("dependencies")
        .and_then(|deps| deps.get("@bin-release/deno"))
        .and_then(serde_json::Value::as_str);
    assert_eq!(actual, Some(spec.as_str()));
}

#[scenario(
    path = "tests/features/installation_test.feature",
    name = "Matching version passes"
)]
fn scenario_matching_version(world: TesterWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/installation_test.feature",
    name = "Mismatched version fails"
)]
fn scenario_mismatched_version(world: TesterWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/installation_test.feature",
    name = "Pack-only run skips installation"
)]
fn scenario_pack_only(world: TesterWorld) {
    let _ = world;
}
