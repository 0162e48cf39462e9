//! Integration tests for CLI behavior
//!
//! These tests verify the external behavior of the CLI tool: argument
//! handling, exit codes, and the lint command end to end against a
//! stand-in `scss-lint` executable.

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to create a command for the scsslint-bridge CLI
fn bridge_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_scsslint-bridge"))
}

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        bridge_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"));
    }

    #[test]
    fn shows_version_with_flag() {
        bridge_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}

mod lint_command {
    use super::*;

    #[test]
    fn missing_file_exits_with_two() {
        bridge_cmd()
            .arg("lint")
            .arg("no_such_file.scss")
            .assert()
            .code(2);
    }

    /// Runs the lint command against a fake `scss-lint` placed first on
    /// PATH, so the full pipeline is exercised without the Ruby gem.
    #[cfg(unix)]
    #[test]
    fn reports_diagnostics_from_linter_output() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("bin");
        std::fs::create_dir(&bin_dir).unwrap();

        let stylesheet = dir.path().join("style.scss");
        std::fs::write(&stylesheet, "p {\n  color: red;\n}\n").unwrap();

        let fake_linter = bin_dir.join("scss-lint");
        let script = format!(
            "#!/bin/sh\nprintf '%s:2:3 [W] Indentation: wrong indent\\n' \"{}\"\nexit 1\n",
            stylesheet.display()
        );
        std::fs::write(&fake_linter, script).unwrap();
        let mut perms = std::fs::metadata(&fake_linter).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&fake_linter, perms).unwrap();

        let path = format!(
            "{}:{}",
            bin_dir.display(),
            std::env::var("PATH").unwrap_or_default()
        );

        bridge_cmd()
            .arg("lint")
            .arg(&stylesheet)
            .env("PATH", path)
            .assert()
            .success()
            .stdout(predicate::str::contains("warning: Indentation: wrong indent"))
            .stdout(predicate::str::contains("0 errors, 1 warnings"));
    }

    /// Without a `scss-lint` on PATH the run degrades to a fault and a
    /// nonzero exit.
    #[cfg(unix)]
    #[test]
    fn missing_linter_reports_fault() {
        let dir = tempfile::tempdir().unwrap();
        let stylesheet = dir.path().join("style.scss");
        std::fs::write(&stylesheet, "p { color: red; }\n").unwrap();

        bridge_cmd()
            .arg("lint")
            .arg(&stylesheet)
            .env("PATH", "/nonexistent")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Error running linter: "));
    }
}
