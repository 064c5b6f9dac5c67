use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn unittrack(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("unittrack").expect("binary");
    cmd.current_dir(dir)
        .env_remove("UNITTRACK_DIR")
        .env_remove("UNITTRACK_TOLERANCE")
        .env_remove("UNITTRACK_VERBOSE")
        .env_remove("UNITTRACK_PROFILE");
    cmd
}

#[test]
fn test_self_tests_end_with_one_expected_error() {
    let dir = tempdir().expect("tempdir");
    unittrack(dir.path())
        .assert()
        .success()
        .stdout(contains("Executing all tests."))
        .stdout(contains("test0 - Test verbose output."))
        .stderr(contains("While running test case \"test4\""))
        .stderr(contains("1 ERROR(S) encountered!."));

    let results = fs::read_to_string(dir.path().join("results.txt")).expect("results");
    assert!(results.contains("1 test4\n"));
    assert!(results.contains("0 test11\n"));
    let profile = fs::read_to_string(dir.path().join("profile.txt")).expect("profile");
    assert!(profile.starts_with("test0\n  t.is_verbose()\ntest1\n"));
    let timings = fs::read_to_string(dir.path().join("timings.txt")).expect("timings");
    assert!(timings.contains(" test0\n"));
    assert!(!timings.contains(" test9\n"));
}

#[test]
fn test_strict_mode_fails_on_expected_error() {
    let dir = tempdir().expect("tempdir");
    unittrack(dir.path())
        .args(["--quiet", "--strict"])
        .assert()
        .code(1);
}

#[test]
fn test_value_override_changes_outcome() {
    let dir = tempdir().expect("tempdir");
    unittrack(dir.path())
        .args(["--quiet", "--timings-off", "9"])
        .assert()
        .code(1)
        .stderr(contains("While running test case \"test9\""))
        .stderr(contains("2 ERROR(S) encountered!."));
}

#[test]
fn test_second_run_reports_better_cases() {
    let dir = tempdir().expect("tempdir");
    unittrack(dir.path())
        .args(["--quiet", "--timings-off", "9", "8"])
        .assert()
        .code(1);
    unittrack(dir.path())
        .args(["--quiet", "--timings-off"])
        .assert()
        .success()
        .stdout(contains("better than in the previous test run:\n  test9\n  test10\n"));
}

#[test]
fn test_store_dir_flag_redirects_files() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("runs");
    fs::create_dir(&out).expect("mkdir");
    unittrack(dir.path())
        .args(["--quiet", "--dir"])
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("results.txt").exists());
    assert!(!dir.path().join("results.txt").exists());
}

#[test]
fn test_unknown_flag_exits_with_usage_error() {
    let dir = tempdir().expect("tempdir");
    unittrack(dir.path())
        .arg("--bogus")
        .assert()
        .code(2)
        .stderr(contains("unknown flag --bogus"));
}
