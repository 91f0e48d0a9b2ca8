//! # DevStudio Git Command Group
//!
//! File: cli/src/commands/git.rs
//!
//! ## Overview
//!
//! Implements `devstudio git`, a handful of supervised git shortcuts:
//!
//! - `status`: `git status`
//! - `pull`: `git pull --rebase`
//! - `push`: stage everything, commit (unless there is nothing to commit) and
//!   push to the chosen branch, optionally with `--force`
//! - `trigger-ci`: push an empty commit so CI runs again
//!
//! The branch for `push` and `trigger-ci` comes from `--branch`, then the last
//! branch pushed to from this directory, then `[git] branch`, then the branch
//! checked out (`git branch --show-current`), then `main`. The remote is
//! `[git] remote` (`origin` by default).
//!
//! ## Usage
//!
//! ```bash
//! devstudio git status
//! devstudio git push -m "fix: login redirect" --branch feature/login
//! devstudio git push --force
//! devstudio git trigger-ci
//! ```
//!
use crate::commands::session::{RunOptions, Session};
use crate::common::process::spawn::{shell_quote, shell_word};
use crate::core::error::Result;
use crate::core::project::{self, FALLBACK_BRANCH};
use clap::{Args, Parser, Subcommand};
use tracing::info;

const DEFAULT_MESSAGE: &str = "update";

/// Top-level arguments for the 'git' command group.
#[derive(Parser, Debug)]
#[command(about = "Git shortcuts: status, pull, push, trigger-ci")]
pub struct GitArgs {
    #[command(subcommand)]
    command: GitCommand,

    #[command(flatten)]
    options: RunOptions,
}

/// Enum defining all subcommands under 'devstudio git'.
#[derive(Subcommand, Debug)]
enum GitCommand {
    /// Show the working tree status
    Status,
    /// Pull with rebase
    Pull,
    /// Add everything, commit and push
    Push(PushArgs),
    /// Push an empty commit to re-run CI
    #[command(name = "trigger-ci")]
    TriggerCi(BranchArg),
}

#[derive(Args, Debug, Default)]
struct BranchArg {
    /// Branch to push to.
    #[arg(long, short)]
    branch: Option<String>,
}

#[derive(Args, Debug)]
struct PushArgs {
    #[command(flatten)]
    branch: BranchArg,

    /// Commit message.
    #[arg(long, short, default_value = DEFAULT_MESSAGE)]
    message: String,

    /// Force-push.
    #[arg(long)]
    force: bool,
}

/// `git add -A && git commit -m <msg> || echo 'nothing to commit' && git push -u <remote> <branch>[ --force]`
pub fn push_command(remote: &str, branch: &str, message: &str, force: bool) -> String {
    let message = match message.trim() {
        "" => DEFAULT_MESSAGE,
        trimmed => trimmed,
    };
    format!(
        "git add -A && git commit -m {} || echo 'nothing to commit' && git push -u {} {}{}",
        shell_quote(message),
        shell_word(remote),
        shell_word(branch),
        if force { " --force" } else { "" }
    )
}

/// `git commit --allow-empty -m 'chore: ci trigger' && git push -u <remote> <branch>`
pub fn trigger_ci_command(remote: &str, branch: &str) -> String {
    format!(
        "git commit --allow-empty -m 'chore: ci trigger' && git push -u {} {}",
        shell_word(remote),
        shell_word(branch)
    )
}

/// Picks the branch to push to and remembers an explicitly given one.
///
/// `detected` is the checked-out branch, used only when nothing else names one.
fn resolve_branch(session: &mut Session, given: Option<String>, detected: Option<String>) -> String {
    let given = given.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
    if let Some(branch) = &given {
        session.prefs.last_branch = Some(branch.clone());
    }
    given
        .or_else(|| session.prefs.last_branch.clone())
        .or_else(|| session.config.git.branch.clone())
        .or(detected)
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
}

/// `resolve_branch`, asking git for the current branch only when it is needed.
async fn branch_for(session: &mut Session, given: Option<String>) -> String {
    let named = given.as_deref().is_some_and(|b| !b.trim().is_empty())
        || session.prefs.last_branch.is_some()
        || session.config.git.branch.is_some();
    let detected = if named {
        None
    } else {
        project::current_branch(&session.working_dir).await
    };
    resolve_branch(session, given, detected)
}

/// Main handler function for the 'git' command group.
pub async fn handle_git(args: GitArgs) -> Result<()> {
    let mut session = Session::open(&args.options)?;
    let remote = session.config.git.remote.clone();

    let command = match args.command {
        GitCommand::Status => "git status".to_string(),
        GitCommand::Pull => "git pull --rebase".to_string(),
        GitCommand::Push(push) => {
            let branch = branch_for(&mut session, push.branch.branch).await;
            push_command(&remote, &branch, &push.message, push.force)
        }
        GitCommand::TriggerCi(arg) => {
            let branch = branch_for(&mut session, arg.branch).await;
            trigger_ci_command(&remote, &branch)
        }
    };
    info!("Handling git command: {}", command);
    session.execute(&command).await
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, GitConfig};
    use tempfile::tempdir;

    fn session_in(dir: &std::path::Path, config: Config) -> Session {
        let options = RunOptions {
            cwd: Some(dir.to_path_buf()),
            ..Default::default()
        };
        Session::with_config(config, &options).unwrap()
    }

    #[test]
    fn test_push_command() {
        assert_eq!(
            push_command("origin", "main", "update", false),
            "git add -A && git commit -m 'update' || echo 'nothing to commit' && git push -u origin main"
        );
        assert_eq!(
            push_command("origin", "feature/x", "it's fixed", true),
            r"git add -A && git commit -m 'it'\''s fixed' || echo 'nothing to commit' && git push -u origin feature/x --force"
        );
    }

    #[test]
    fn test_push_command_blank_message_falls_back() {
        assert!(push_command("origin", "main", "   ", false).contains("-m 'update'"));
    }

    #[test]
    fn test_trigger_ci_command() {
        assert_eq!(
            trigger_ci_command("upstream", "develop"),
            "git commit --allow-empty -m 'chore: ci trigger' && git push -u upstream develop"
        );
    }

    #[test]
    fn test_resolve_branch_order() {
        let dir = tempdir().unwrap();
        let config = Config {
            git: GitConfig {
                branch: Some("develop".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut session = session_in(dir.path(), Config::default());
        assert_eq!(resolve_branch(&mut session, None, None), "main");
        assert_eq!(
            resolve_branch(&mut session, None, Some("topic".into())),
            "topic"
        );

        let mut session = session_in(dir.path(), config);
        assert_eq!(
            resolve_branch(&mut session, None, Some("topic".into())),
            "develop"
        );
        assert_eq!(
            resolve_branch(&mut session, Some("feature/a".into()), None),
            "feature/a"
        );
        // Remembered for the next push, ahead of the checked-out branch.
        assert_eq!(
            resolve_branch(&mut session, None, Some("topic".into())),
            "feature/a"
        );
    }

    #[tokio::test]
    async fn test_branch_for_skips_detection_when_a_branch_is_named() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path(), Config::default());
        // Not a checkout, so detection falls through to `main`.
        assert_eq!(branch_for(&mut session, None).await, "main");
        assert_eq!(branch_for(&mut session, Some("  ".into())).await, "main");
        assert_eq!(branch_for(&mut session, Some("hotfix".into())).await, "hotfix");
        assert_eq!(branch_for(&mut session, None).await, "hotfix");
    }

    #[test]
    fn test_git_args_parsing() {
        let args = GitArgs::try_parse_from([
            "git", "push", "-m", "wip", "--branch", "dev", "--force",
        ])
        .unwrap();
        match args.command {
            GitCommand::Push(push) => {
                assert_eq!(push.message, "wip");
                assert_eq!(push.branch.branch.as_deref(), Some("dev"));
                assert!(push.force);
            }
            other => panic!("unexpected subcommand {:?}", other),
        }

        let args = GitArgs::try_parse_from(["git", "--timeout", "30", "trigger-ci"]).unwrap();
        assert_eq!(args.options.timeout, Some(30));
        assert!(matches!(args.command, GitCommand::TriggerCi(_)));

        assert!(GitArgs::try_parse_from(["git"]).is_err());
    }
}
