//! Shared fixtures for the integration suite.
//!
//! A [`TestProject`] owns a temp tree with a project directory, a stub `bin`
//! directory placed first on `PATH`, a helper directory, and a private
//! `TMPDIR` so leftover workspaces can be detected.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEMPLATE: &str = "class Demo < Formula
#---START-RESOURCES---
  resource \"stale\" do
  end
#---END-RESOURCES---
end
";

/// Helper that prints one resource line per dependency name.
pub const HELPER_SCRIPT: &str = r#"echo "$1" > "$MARKERS/helper-called"
while read -r name rest; do
  if [ -n "$name" ]; then echo "  resource \"$name\""; fi
done < "$1"
"#;

pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        for dir in ["work", "bin", "helpers", "tmp", "markers"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        Self {
            temp,
        }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    pub fn helper_dir(&self) -> PathBuf {
        self.temp.path().join("helpers")
    }

    pub fn template_path(&self) -> PathBuf {
        self.work_dir().join("demo.tmpl")
    }

    pub fn marker(&self, name: &str) -> PathBuf {
        self.temp.path().join("markers").join(name)
    }

    pub fn write_template(&self, content: &str) {
        fs::write(self.template_path(), content).unwrap();
    }

    pub fn template(&self) -> String {
        fs::read_to_string(self.template_path()).unwrap()
    }

    /// Installs `bin/poetry` running `body`.
    pub fn stub_package_manager(&self, body: &str) {
        write_script(&self.temp.path().join("bin").join("poetry"), body);
    }

    /// Installs `helpers/poet-resources` running `body`.
    pub fn stub_helper(&self, body: &str) {
        write_script(&self.helper_dir().join("poet-resources"), body);
    }

    /// A project with a template, a package manager listing two
    /// dependencies, and the default helper.
    pub fn ready() -> Self {
        let project = Self::new();
        project.write_template(TEMPLATE);
        project.stub_package_manager(
            "echo \"$@\" > \"$MARKERS/pm-called\"\nprintf 'requests 2.31.0 HTTP\\nrich 13.7.0 Text\\n'\n",
        );
        project.stub_helper(HELPER_SCRIPT);
        project
    }

    /// Entries left in the private `TMPDIR` (leftover workspaces).
    pub fn tmp_entries(&self) -> usize {
        fs::read_dir(self.temp.path().join("tmp")).unwrap().count()
    }

    /// The binary with a fully configured environment.
    pub fn command(&self) -> Command {
        let path = format!(
            "{}:{}",
            self.temp.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );

        let mut cmd = Command::cargo_bin("tmpl-resources").unwrap();
        cmd.current_dir(self.work_dir())
            .env_clear()
            .env("PATH", path)
            .env("NO_COLOR", "1")
            .env("TMPDIR", self.temp.path().join("tmp"))
            .env("MARKERS", self.temp.path().join("markers"))
            .env("PROJECT_NAME", "demo")
            .env("WORK_DIR", self.work_dir())
            .env("HELPER", self.helper_dir());
        cmd
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
