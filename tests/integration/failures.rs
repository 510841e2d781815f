//! Failing runs: every failure leaves the template untouched, removes the
//! workspace, and reports a single diagnostic line.

use crate::common::{TEMPLATE, TestProject};
use predicates::prelude::*;
use serial_test::serial;

fn error_lines(stderr: &[u8]) -> usize {
    String::from_utf8_lossy(stderr).lines().filter(|l| l.starts_with("error:")).count()
}

#[test]
#[serial]
fn test_missing_environment_variables() {
    for variable in ["PROJECT_NAME", "WORK_DIR", "HELPER"] {
        let project = TestProject::ready();

        let output = project
            .command()
            .env_remove(variable)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains(variable))
            .get_output()
            .clone();

        assert_eq!(error_lines(&output.stderr), 1);
        assert!(!project.marker("pm-called").exists(), "{variable}: package manager must not run");
        assert!(!project.marker("helper-called").exists());
        assert_eq!(project.template(), TEMPLATE);
        assert_eq!(project.tmp_entries(), 0);
    }
}

#[test]
#[serial]
fn test_empty_environment_variable() {
    let project = TestProject::ready();

    project
        .command()
        .env("HELPER", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("HELPER"));

    assert!(!project.marker("pm-called").exists());
}

#[test]
#[serial]
fn test_missing_package_manager() {
    let project = TestProject::ready();
    let empty_bin = project.path().join("empty-bin");
    std::fs::create_dir_all(&empty_bin).unwrap();

    project
        .command()
        .env("PATH", &empty_bin)
        .assert()
        .failure()
        .code(127)
        .stderr(predicate::str::contains("poetry"));

    assert_eq!(project.template(), TEMPLATE);
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_missing_helper_program() {
    let project = TestProject::ready();
    std::fs::remove_file(project.helper_dir().join("poet-resources")).unwrap();

    project
        .command()
        .assert()
        .failure()
        .code(127)
        .stderr(predicate::str::contains("poet-resources"));

    assert!(!project.marker("pm-called").exists());
}

#[test]
#[serial]
fn test_package_manager_failure_skips_helper() {
    let project = TestProject::ready();
    project.stub_package_manager("echo 'Poetry could not find a pyproject.toml file' >&2\nexit 3\n");

    let output = project
        .command()
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("extract dependency list"))
        .stderr(predicate::str::contains("pyproject.toml"))
        .get_output()
        .clone();

    assert_eq!(error_lines(&output.stderr), 1);
    assert!(!project.marker("helper-called").exists(), "helper must not run");
    assert_eq!(project.template(), TEMPLATE);
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_helper_failure_leaves_template() {
    let project = TestProject::ready();
    project.stub_helper("echo 'partial output'\necho 'PyPI unreachable' >&2\nexit 2\n");

    project
        .command()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("resolve resource includes"));

    assert_eq!(project.template(), TEMPLATE);
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_missing_markers_leave_template() {
    for template in [
        "class Demo < Formula\nend\n",
        "class Demo < Formula\n#---START-RESOURCES---\nend\n",
        "class Demo < Formula\n#---END-RESOURCES---\nend\n",
    ] {
        let project = TestProject::ready();
        project.write_template(template);

        project
            .command()
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("RESOURCES---"));

        assert_eq!(project.template(), template);
        assert_eq!(project.tmp_entries(), 0);
    }
}

#[test]
#[serial]
fn test_missing_template_file() {
    let project = TestProject::ready();
    std::fs::remove_file(project.template_path()).unwrap();

    project.command().assert().failure().code(1).stderr(predicate::str::contains("demo.tmpl"));

    assert!(!project.template_path().exists());
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_timeout_kills_slow_command() {
    let project = TestProject::ready();
    project.stub_package_manager("sleep 10\n");

    project
        .command()
        .args(["--timeout", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("timed out"));

    assert_eq!(project.template(), TEMPLATE);
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_verbose_adds_suggestion() {
    let project = TestProject::ready();
    project.write_template("no markers here\n");

    project
        .command()
        .arg("--verbose")
        .assert()
        .failure()
        .stderr(predicate::str::contains("suggestion:"));
}

#[test]
#[serial]
fn test_missing_work_dir() {
    let project = TestProject::ready();

    let output = project
        .command()
        .env("WORK_DIR", project.path().join("nope"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("WORK_DIR"))
        .stderr(predicate::str::contains("not found").not())
        .get_output()
        .clone();

    assert_eq!(error_lines(&output.stderr), 1);
    assert!(!project.marker("pm-called").exists());
    assert_eq!(project.template(), TEMPLATE);
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_relative_helper_missing_fails_before_any_command() {
    let project = TestProject::ready();

    project
        .command()
        .current_dir(project.path())
        .env("HELPER", "no-such-helpers")
        .arg("--template")
        .arg(project.template_path())
        .assert()
        .failure()
        .code(127);

    assert!(!project.marker("pm-called").exists());
    assert_eq!(project.template(), TEMPLATE);
}
