//! # DevStudio CLI Preset Integration Tests
//!
//! File: cli/tests/presets.rs
//!
//! ## Overview
//!
//! Runs the `emulators`, `deploy`, `git`, `health` and `info` commands end to
//! end against fake `firebase` and `git` executables that echo their
//! arguments, so the exact command lines reaching the shell can be checked.
//!
#![cfg(unix)]

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_emulators_only_list_in_canonical_order() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_tool(&bin, "firebase");

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["emulators", "--only", "auth,hosting"])
        .assert()
        .success()
        .stdout("firebase emulators:start --only hosting,auth\n");
}

#[test]
fn test_emulators_saved_selection_is_reused() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_tool(&bin, "firebase");

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["emulators", "--only", "firestore", "--save"])
        .assert()
        .success();

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .arg("emulators")
        .assert()
        .success()
        .stdout("firebase emulators:start --only firestore\n");
}

#[test]
fn test_emulators_unknown_name_is_rejected() {
    devstudio_cmd()
        .args(["emulators", "--only", "storage"])
        .assert()
        .failure();
}

#[test]
fn test_deploy_requires_firebase_json() {
    let dir = tempdir().unwrap();
    devstudio_cmd()
        .current_dir(dir.path())
        .arg("deploy")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("firebase.json not found"));
}

#[test]
fn test_deploy_with_alias() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_tool(&bin, "firebase");
    fs::write(dir.path().join("firebase.json"), "{}").unwrap();
    fs::write(
        dir.path().join(".firebaserc"),
        r#"{"projects": {"default": "app", "staging": "app-staging"}}"#,
    )
    .unwrap();

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["deploy", "--target", "hosting", "--alias", "staging"])
        .assert()
        .success()
        .stdout("firebase deploy --only hosting --project staging\n");

    // The alias is remembered.
    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["deploy", "--target", "functions"])
        .assert()
        .success()
        .stdout("firebase deploy --only functions --project staging\n");
}

#[test]
fn test_deploy_ignores_remembered_alias_missing_from_firebaserc() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_tool(&bin, "firebase");
    fs::write(dir.path().join("firebase.json"), "{}").unwrap();

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["deploy", "--target", "hosting", "--alias", "staging"])
        .assert()
        .success()
        .stdout("firebase deploy --only hosting --project staging\n");

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["deploy", "--target", "hosting"])
        .assert()
        .success()
        .stdout("firebase deploy --only hosting\n")
        .stderr(predicate::str::contains("not in .firebaserc"));
}

#[test]
fn test_git_status_and_trigger_ci() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_git(&bin, "main", None);

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["git", "status"])
        .assert()
        .success()
        .stdout("git status\n");

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["git", "trigger-ci", "--branch", "dev"])
        .assert()
        .success()
        .stdout("git commit --allow-empty -m chore: ci trigger\ngit push -u origin dev\n");
}

#[test]
fn test_git_push_quotes_message() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_git(&bin, "main", None);

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["git", "push", "-m", "it's $HOME", "--force"])
        .assert()
        .success()
        .stdout("git add -A\ngit commit -m it's $HOME\ngit push -u origin main --force\n");
}

#[test]
fn test_git_push_defaults_to_checked_out_branch() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_git(&bin, "feature/login", None);

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["git", "trigger-ci"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("git push -u origin feature/login\n"));
}

#[test]
fn test_project_config_supplies_defaults() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_git(&bin, "feature/login", None);
    fs::write(
        dir.path().join(".devstudio.toml"),
        "[git]\nbranch = \"release\"\nremote = \"upstream\"\n",
    )
    .unwrap();

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .args(["git", "trigger-ci"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("git push -u upstream release\n"));
}

#[test]
fn test_invalid_project_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".devstudio.toml"), "[runner]\ntick_interval_ms = 0\n").unwrap();

    devstudio_cmd()
        .current_dir(dir.path())
        .args(["run", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration validation failed"));
}

#[test]
fn test_health_runs_project_scripts() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    for (name, text) in [("check-system.sh", "all good"), ("setup-secrets.sh", "secrets set")] {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\necho {}\n", text)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    devstudio_cmd()
        .current_dir(dir.path())
        .arg("health")
        .assert()
        .success()
        .stdout("all good\n")
        .stderr(predicate::str::contains("$ ./check-system.sh"));

    devstudio_cmd()
        .current_dir(dir.path())
        .args(["health", "secrets"])
        .assert()
        .success()
        .stdout("secrets set\n");
}

#[test]
fn test_health_without_script_fails() {
    let dir = tempdir().unwrap();
    devstudio_cmd()
        .current_dir(dir.path())
        .arg("health")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("check-system.sh"));
}

#[test]
fn test_info_reports_detected_project() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_git(&bin, "develop", Some("git@github.com:acme/site.git"));
    fs::write(
        dir.path().join("firebase.json"),
        r#"{"hosting": {"public": "public"}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(".firebaserc"),
        r#"{"projects": {"default": "app", "staging": "app-staging"}}"#,
    )
    .unwrap();

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .arg("info")
        .assert()
        .success()
        .stdout(
            "Public Dir: public\n\
             Git Repo: https://github.com/acme/site\n\
             GitHub Actions: https://github.com/acme/site/actions\n\
             Current Branch: develop\n\
             Firebase Aliases: default, staging\n",
        );
}

#[test]
fn test_info_without_project_files() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    fake_git(&bin, "", None);

    devstudio_cmd()
        .current_dir(dir.path())
        .env("PATH", path_with(&bin))
        .arg("info")
        .assert()
        .success()
        .stdout(
            "Public Dir: ?\n\
             Git Repo: Not detected\n\
             Current Branch: main\n\
             Firebase Aliases: None\n",
        );
}
