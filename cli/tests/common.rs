//! # DevStudio CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and drives the compiled `devstudio` binary through
//! `assert_cmd`.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns an `assert_cmd::Command` for the compiled `devstudio` binary.
///
/// ## Panics
/// Panics if the `devstudio` binary cannot be found via `Command::cargo_bin`.
pub fn devstudio_cmd() -> Command {
    Command::cargo_bin("devstudio").expect("Failed to find devstudio binary for testing")
}

/// Path of the compiled `devstudio` binary, for tests that need a live child.
pub fn devstudio_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("devstudio")
}

/// Writes an executable `name` into `bin_dir` that prints its own command line.
///
/// Used to stand in for `firebase` and `git`, so presets can be checked end
/// to end without either being installed.
#[cfg(unix)]
pub fn fake_tool(bin_dir: &Path, name: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    fs::create_dir_all(bin_dir).expect("Failed to create fake bin dir");
    let path = bin_dir.join(name);
    fs::write(&path, format!("#!/bin/sh\necho \"{} $*\"\n", name))
        .expect("Failed to write fake tool");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake tool executable");
    path
}

/// Writes a fake `git` into `bin_dir` that answers the two queries DevStudio
/// makes itself and echoes every other command line.
///
/// `git branch --show-current` prints `branch`. `git config --get
/// remote.origin.url` prints `origin`, or fails when it is `None`.
#[cfg(unix)]
pub fn fake_git(bin_dir: &Path, branch: &str, origin: Option<&str>) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    fs::create_dir_all(bin_dir).expect("Failed to create fake bin dir");
    let origin = match origin {
        Some(url) => format!("echo \"{}\"; exit 0", url),
        None => "exit 1".to_string(),
    };
    let script = format!(
        "#!/bin/sh\n\
         case \"$*\" in\n\
         \"branch --show-current\") echo \"{}\"; exit 0 ;;\n\
         \"config --get remote.origin.url\") {} ;;\n\
         esac\n\
         echo \"git $*\"\n",
        branch, origin
    );
    let path = bin_dir.join("git");
    fs::write(&path, script).expect("Failed to write fake git");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake git executable");
    path
}

/// `PATH` with `bin_dir` in front of the current one.
pub fn path_with(bin_dir: &Path) -> String {
    let current = std::env::var("PATH").unwrap_or_default();
    format!("{}:{}", bin_dir.display(), current)
}
