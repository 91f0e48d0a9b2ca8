//! # DevStudio Deploy Command
//!
//! File: cli/src/commands/deploy.rs
//!
//! ## Overview
//!
//! Implements `devstudio deploy`, a supervised `firebase deploy` for the
//! hosting client, the Cloud Functions, or both.
//!
//! ## Workflow
//!
//! 1. Resolve the target (`--target`, then `[deploy] target`) and the project
//!    alias (`--alias`, then the remembered alias if `.firebaserc` still lists
//!    it, then `[deploy] alias`).
//! 2. Refuse to run without a `firebase.json` in the working directory.
//! 3. Warn, but carry on, when functions are deployed and `functions/index.js`
//!    is missing.
//! 4. Run `firebase deploy --only <target> [--project <alias>]`.
//!
//! An alias given with `--alias` is remembered for the next deploy.
//!
//! ## Usage
//!
//! ```bash
//! devstudio deploy
//! devstudio deploy --target hosting --alias staging
//! ```
//!
use crate::commands::session::{RunOptions, Session};
use crate::common::process::spawn::shell_word;
use crate::core::config::DeployTarget;
use crate::core::error::{Result, StudioError};
use crate::core::project;
use anyhow::anyhow;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};

/// Arguments for `devstudio deploy`.
#[derive(Parser, Debug)]
#[command(about = "Deploy to Firebase (hosting, functions or both)")]
pub struct DeployArgs {
    /// What to deploy. Defaults to `[deploy] target` (both).
    #[arg(long, value_enum)]
    target: Option<DeployTarget>,

    /// Firebase project alias, passed as `--project`.
    #[arg(long)]
    alias: Option<String>,

    #[command(flatten)]
    options: RunOptions,
}

/// The `--only` value for `target`.
fn only_value(target: DeployTarget) -> &'static str {
    match target {
        DeployTarget::Hosting => "hosting",
        DeployTarget::Functions => "functions",
        DeployTarget::Both => "hosting,functions",
    }
}

/// Builds the deploy command line.
pub fn deploy_command(target: DeployTarget, alias: Option<&str>) -> String {
    let mut command = format!("firebase deploy --only {}", only_value(target));
    if let Some(alias) = alias.map(str::trim).filter(|a| !a.is_empty()) {
        command.push_str(" --project ");
        command.push_str(&shell_word(alias));
    }
    command
}

/// Checks the project files a deploy of `target` relies on.
fn check_project(dir: &Path, target: DeployTarget) -> Result<()> {
    if !dir.join("firebase.json").is_file() {
        return Err(anyhow!(StudioError::ProjectFile(format!(
            "firebase.json not found in {}; initialize Firebase first",
            dir.display()
        ))));
    }
    if target != DeployTarget::Hosting && !dir.join("functions").join("index.js").is_file() {
        warn!("functions/index.js not found; the functions deploy may fail");
    }
    Ok(())
}

/// The remembered alias, if `.firebaserc` in `dir` still declares it.
fn remembered_alias(dir: &Path, remembered: Option<&str>) -> Option<String> {
    let remembered = remembered?;
    if project::aliases(dir).iter().any(|alias| alias == remembered) {
        Some(remembered.to_string())
    } else {
        warn!(
            "Remembered alias '{}' is not in .firebaserc, ignoring it",
            remembered
        );
        None
    }
}

/// Handler for `devstudio deploy`.
pub async fn handle_deploy(args: DeployArgs) -> Result<()> {
    let mut session = Session::open(&args.options)?;
    let target = args.target.unwrap_or(session.config.deploy.target);
    let alias = args
        .alias
        .clone()
        .or_else(|| remembered_alias(&session.working_dir, session.prefs.default_alias.as_deref()))
        .or_else(|| session.config.deploy.alias.clone());

    check_project(&session.working_dir, target)?;

    if args.alias.is_some() {
        session.prefs.default_alias = alias.clone();
    }
    let command = deploy_command(target, alias.as_deref());
    info!("Deploying {:?} (alias {:?})", target, alias);
    session.execute(&command).await
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_deploy_command_per_target() {
        assert_eq!(
            deploy_command(DeployTarget::Hosting, None),
            "firebase deploy --only hosting"
        );
        assert_eq!(
            deploy_command(DeployTarget::Functions, None),
            "firebase deploy --only functions"
        );
        assert_eq!(
            deploy_command(DeployTarget::Both, None),
            "firebase deploy --only hosting,functions"
        );
    }

    #[test]
    fn test_deploy_command_with_alias() {
        assert_eq!(
            deploy_command(DeployTarget::Hosting, Some("staging")),
            "firebase deploy --only hosting --project staging"
        );
        assert_eq!(
            deploy_command(DeployTarget::Both, Some("  ")),
            "firebase deploy --only hosting,functions"
        );
    }

    #[test]
    fn test_check_project_requires_firebase_json() {
        let dir = tempdir().unwrap();
        let err = check_project(dir.path(), DeployTarget::Hosting).unwrap_err();
        assert!(err.to_string().contains("firebase.json not found"));

        fs::write(dir.path().join("firebase.json"), "{}").unwrap();
        assert!(check_project(dir.path(), DeployTarget::Hosting).is_ok());
        // Missing functions/index.js only warns.
        assert!(check_project(dir.path(), DeployTarget::Both).is_ok());
    }

    #[test]
    fn test_remembered_alias_must_be_declared() {
        let dir = tempdir().unwrap();
        assert_eq!(remembered_alias(dir.path(), None), None);
        assert_eq!(remembered_alias(dir.path(), Some("staging")), None);

        fs::write(
            dir.path().join(".firebaserc"),
            r#"{"projects": {"default": "app", "staging": "app-staging"}}"#,
        )
        .unwrap();
        assert_eq!(
            remembered_alias(dir.path(), Some("staging")).as_deref(),
            Some("staging")
        );
        assert_eq!(remembered_alias(dir.path(), Some("prod")), None);
    }

    #[test]
    fn test_deploy_args_parsing() {
        let args =
            DeployArgs::try_parse_from(["deploy", "--target", "functions", "--alias", "prod"])
                .unwrap();
        assert_eq!(args.target, Some(DeployTarget::Functions));
        assert_eq!(args.alias.as_deref(), Some("prod"));

        assert!(DeployArgs::try_parse_from(["deploy", "--target", "storage"]).is_err());
    }
}
