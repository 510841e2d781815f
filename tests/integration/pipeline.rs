//! Successful runs: splice, idempotence, dry run, overrides.

use crate::common::{HELPER_SCRIPT, TEMPLATE, TestProject};
use predicates::prelude::*;
use serial_test::serial;
use std::fs;

const EXPECTED: &str = "class Demo < Formula
#---START-RESOURCES---
  resource \"requests\"
  resource \"rich\"
#---END-RESOURCES---
end
";

#[test]
#[serial]
fn test_updates_resource_region() {
    let project = TestProject::ready();

    project
        .command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"))
        .stdout(predicate::str::contains("demo.tmpl"));

    assert_eq!(project.template(), EXPECTED);
    assert_eq!(project.tmp_entries(), 0, "workspace should be removed");
}

#[test]
#[serial]
fn test_commands_receive_expected_arguments() {
    let project = TestProject::ready();

    project.command().assert().success();

    let pm_args = fs::read_to_string(project.marker("pm-called")).unwrap();
    assert_eq!(pm_args.trim(), "show --only main");

    // The helper gets the dependency list path, inside the (now removed) workspace
    let helper_arg = fs::read_to_string(project.marker("helper-called")).unwrap();
    let helper_arg = helper_arg.trim();
    assert!(helper_arg.ends_with("dependencies.txt"), "unexpected helper argument: {helper_arg}");
    assert!(helper_arg.starts_with(&project.path().join("tmp").display().to_string()));
    assert!(!std::path::Path::new(helper_arg).exists());
}

#[test]
#[serial]
fn test_second_run_is_idempotent() {
    let project = TestProject::ready();

    project.command().assert().success();
    let first = project.template();

    project.command().assert().success().stdout(predicate::str::contains("Up to date"));
    let second = project.template();

    assert_eq!(first, second);
    assert_eq!(second, EXPECTED);
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_dry_run_prints_without_writing() {
    let project = TestProject::ready();

    project.command().arg("--dry-run").assert().success().stdout(EXPECTED);

    assert_eq!(project.template(), TEMPLATE);
    assert_eq!(project.tmp_entries(), 0);
}

#[test]
#[serial]
fn test_quiet_suppresses_success_line() {
    let project = TestProject::ready();

    project.command().arg("--quiet").assert().success().stdout(predicate::str::is_empty());

    assert_eq!(project.template(), EXPECTED);
}

#[test]
#[serial]
fn test_flags_override_environment() {
    let project = TestProject::ready();
    let other = project.work_dir().join("Formula");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("custom.tmpl"), TEMPLATE).unwrap();
    fs::write(
        project.helper_dir().join("fetch"),
        format!("#!/bin/sh\n{HELPER_SCRIPT}"),
    )
    .unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(project.helper_dir().join("fetch"), fs::Permissions::from_mode(0o755))
            .unwrap();
    }

    project
        .command()
        .args(["--template", "Formula/custom.tmpl", "--helper-program", "fetch"])
        .args(["--list-args", "export --only main"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(other.join("custom.tmpl")).unwrap(), EXPECTED);
    assert_eq!(project.template(), TEMPLATE, "default template must not be touched");
    let pm_args = fs::read_to_string(project.marker("pm-called")).unwrap();
    assert_eq!(pm_args.trim(), "export --only main");
}

#[test]
#[serial]
fn test_package_manager_runs_in_work_dir() {
    let project = TestProject::ready();
    project.stub_package_manager("pwd > \"$MARKERS/pm-cwd\"\necho requests\n");

    // Invoked from elsewhere; the template path is given explicitly
    project
        .command()
        .current_dir(project.path())
        .arg("--template")
        .arg(project.template_path())
        .assert()
        .success();

    let cwd = fs::read_to_string(project.marker("pm-cwd")).unwrap();
    assert_eq!(
        fs::canonicalize(cwd.trim()).unwrap(),
        fs::canonicalize(project.work_dir()).unwrap()
    );
}

#[test]
#[serial]
fn test_empty_dependency_list_clears_region() {
    let project = TestProject::ready();
    project.stub_package_manager("exit 0\n");

    project.command().assert().success();

    assert_eq!(
        project.template(),
        "class Demo < Formula\n#---START-RESOURCES---\n#---END-RESOURCES---\nend\n"
    );
}

#[test]
#[serial]
fn test_relative_helper_resolves_from_invocation_dir() {
    let project = TestProject::ready();

    // Invoked from the temp root while the commands run inside work/
    project
        .command()
        .current_dir(project.path())
        .env("HELPER", "helpers")
        .arg("--template")
        .arg(project.template_path())
        .assert()
        .success();

    assert_eq!(project.template(), EXPECTED);
    assert!(project.marker("helper-called").exists());
}
