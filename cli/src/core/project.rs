//! # DevStudio Project Detection (`core::project`)
//!
//! File: cli/src/core/project.rs
//!
//! ## Overview
//!
//! Reads what the working directory says about itself: the hosting public
//! directory from `firebase.json`, the project aliases from `.firebaserc`, and
//! the current branch and GitHub web URL from git.
//!
//! Detection never fails. A missing or unreadable file, or a directory that is
//! not a git checkout, just yields the fallback value.
//!
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Shown when `firebase.json` is missing or cannot be parsed.
pub const UNKNOWN_PUBLIC_DIR: &str = "?";
/// Branch assumed when git cannot tell.
pub const FALLBACK_BRANCH: &str = "main";

/// The hosting public directory configured in `dir/firebase.json`.
///
/// `hosting.public`, or `.` when hosting does not name one. For a multi-site
/// `hosting` array the first site counts. `?` when the file is unreadable.
pub fn public_dir(dir: &Path) -> String {
    let path = dir.join("firebase.json");
    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
    let firebase = match parsed {
        Ok(value) => value,
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            return UNKNOWN_PUBLIC_DIR.to_string();
        }
    };

    let hosting = match firebase.get("hosting") {
        Some(Value::Array(sites)) => sites.first(),
        other => other,
    };
    hosting
        .and_then(|h| h.get("public"))
        .and_then(Value::as_str)
        .filter(|public| !public.is_empty())
        .unwrap_or(".")
        .to_string()
}

#[derive(Deserialize)]
struct FirebaseRc {
    #[serde(default)]
    projects: serde_json::Map<String, Value>,
}

/// Project aliases declared under `projects` in `dir/.firebaserc`, in file order.
pub fn aliases(dir: &Path) -> Vec<String> {
    let path = dir.join(".firebaserc");
    let Ok(text) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    match serde_json::from_str::<FirebaseRc>(&text) {
        Ok(rc) => rc.projects.keys().cloned().collect(),
        Err(e) => {
            debug!("Ignoring malformed {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// `https://github.com/<owner>/<repo>` for a GitHub remote, HTTPS or SSH.
pub fn repo_web_url(remote: &str) -> Option<String> {
    let remote = remote.trim();
    let start = remote.find("github.com")? + "github.com".len();
    let repo = remote[start..].strip_prefix([':', '/'])?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }
    Some(format!("https://github.com/{}", repo))
}

/// Trimmed stdout of `git <args>` in `dir`, when git succeeds and prints something.
async fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .kill_on_drop(true)
        .output()
        .await;
    let output = match output {
        Ok(output) => output,
        Err(e) => {
            debug!("git {:?} could not run: {}", args, e);
            return None;
        }
    };
    debug!("git {:?}: status={}", args, output.status);
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// The branch checked out in `dir`, as `git branch --show-current` reports it.
pub async fn current_branch(dir: &Path) -> Option<String> {
    git_output(dir, &["branch", "--show-current"]).await
}

/// GitHub web URL of the `origin` remote of `dir`.
pub async fn repo_web(dir: &Path) -> Option<String> {
    let remote = git_output(dir, &["config", "--get", "remote.origin.url"]).await?;
    repo_web_url(&remote)
}

/// Everything `devstudio info` shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub public_dir: String,
    pub repo_web: Option<String>,
    pub branch: String,
    pub aliases: Vec<String>,
}

impl ProjectInfo {
    pub async fn detect(dir: &Path) -> Self {
        Self {
            public_dir: public_dir(dir),
            repo_web: repo_web(dir).await,
            branch: current_branch(dir)
                .await
                .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
            aliases: aliases(dir),
        }
    }
}

impl fmt::Display for ProjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Public Dir: {}", self.public_dir)?;
        match &self.repo_web {
            Some(url) => {
                writeln!(f, "Git Repo: {}", url)?;
                writeln!(f, "GitHub Actions: {}/actions", url)?;
            }
            None => writeln!(f, "Git Repo: Not detected")?,
        }
        writeln!(f, "Current Branch: {}", self.branch)?;
        if self.aliases.is_empty() {
            write!(f, "Firebase Aliases: None")
        } else {
            write!(f, "Firebase Aliases: {}", self.aliases.join(", "))
        }
    }
}
