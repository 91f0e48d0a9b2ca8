//! # DevStudio Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for DevStudio, handling loading,
//! merging, validation, and access to configuration data. It supports a multi-level
//! configuration approach that combines defaults, user settings, and project-specific
//! overrides.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.devstudio.toml` in current directory or ancestors
//! 2. User-specific `config.toml` in the platform config directory
//!    (e.g. `~/.config/devstudio/config.toml`)
//! 3. Default values defined in the code
//!
//! Command-line flags (`--cwd`, `--timeout`, `--kill-after`) are applied on top
//! by the command handlers.
//!
//! ## Examples
//!
//! ```toml
//! [runner]
//! tick_interval_ms = 50
//! timeout_secs = 600      # omit for unbounded runs (dev servers)
//! kill_after_secs = 5     # SIGKILL if SIGTERM is ignored this long
//! working_dir = "~/code/site"
//!
//! [emulators]
//! hosting = true
//! functions = true
//! firestore = false
//! auth = false
//!
//! [deploy]
//! alias = "staging"
//! target = "hosting"
//!
//! [git]
//! branch = "main"
//! remote = "origin"
//! ```
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let tick = cfg.runner.tick_interval();
//! ```
//!
use crate::common::ui::DEFAULT_TICK_INTERVAL;
use crate::core::error::{Result, StudioError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub emulators: EmulatorConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub git: GitConfig,
}

/// Settings for the process runner and its control loop.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// How often the control loop drains the runner, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Stop a run after this many seconds. Unset means runs are unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Force-kill a stopped run that is still alive after this many seconds.
    #[serde(default)]
    pub kill_after_secs: Option<u64>,
    /// Default working directory for runs (can use ~). Will be expanded.
    #[serde(default)]
    pub working_dir: Option<String>,
}

/// Which Firebase emulators `devstudio emulators` starts by default.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EmulatorConfig {
    #[serde(default = "default_true")]
    pub hosting: bool,
    #[serde(default = "default_true")]
    pub functions: bool,
    #[serde(default)]
    pub firestore: bool,
    #[serde(default)]
    pub auth: bool,
}

/// Defaults for `devstudio deploy`.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Firebase project alias passed as `--project`.
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub target: DeployTarget,
}

/// What a deploy pushes.
#[derive(
    Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DeployTarget {
    /// Client only (Firebase Hosting).
    Hosting,
    /// Server only (Cloud Functions).
    Functions,
    /// Hosting and functions together.
    #[default]
    Both,
}

/// Defaults for `devstudio git`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    /// Branch to push to when none is given on the command line or remembered.
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default = "default_remote")]
    pub remote: String,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}
fn default_true() -> bool {
    true
}
fn default_remote() -> String {
    "origin".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            timeout_secs: None,
            kill_after_secs: None,
            working_dir: None,
        }
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            hosting: true,
            functions: true,
            firestore: false,
            auth: false,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            branch: None,
            remote: default_remote(),
        }
    }
}

impl RunnerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn kill_after(&self) -> Option<Duration> {
        self.kill_after_secs.map(Duration::from_secs)
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".devstudio.toml";
const MAX_TICK_INTERVAL_MS: u64 = 1000;

/// Loads the merged configuration for the current directory.
pub fn load_config() -> Result<Config> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    load_config_from(&current_dir)
}

/// Loads the merged configuration, searching for a project file from `start_dir` upwards.
pub fn load_config_from(start_dir: &Path) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config(start_dir)?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "DevStudio", "devstudio") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(start_dir: &Path) -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path(start_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.devstudio.toml) found in directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start_dir: &Path) -> Option<PathBuf> {
    let mut path: &Path = start_dir;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();

    merged.runner.tick_interval_ms =
        if project_cfg.runner.tick_interval_ms != default_tick_interval_ms() {
            project_cfg.runner.tick_interval_ms
        } else {
            user.runner.tick_interval_ms
        };
    merged.runner.timeout_secs = project_cfg.runner.timeout_secs.or(user.runner.timeout_secs);
    merged.runner.kill_after_secs = project_cfg
        .runner
        .kill_after_secs
        .or(user.runner.kill_after_secs);
    merged.runner.working_dir = project_cfg.runner.working_dir.or(user.runner.working_dir);

    // The emulator selection is one unit: a project that mentions it wins outright.
    merged.emulators = if project_cfg.emulators != EmulatorConfig::default() {
        project_cfg.emulators
    } else {
        user.emulators
    };

    merged.deploy.alias = project_cfg.deploy.alias.or(user.deploy.alias);
    merged.deploy.target = if project_cfg.deploy.target != DeployTarget::default() {
        project_cfg.deploy.target
    } else {
        user.deploy.target
    };

    merged.git.branch = project_cfg.git.branch.or(user.git.branch);
    merged.git.remote = if project_cfg.git.remote != default_remote() {
        project_cfg.git.remote
    } else {
        user.git.remote
    };
    merged
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(dir) = config.runner.working_dir.as_mut() {
        *dir = shellexpand::tilde(dir).into_owned();
        debug!("Expanded runner working directory: {}", dir);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    let runner = &config.runner;
    if runner.tick_interval_ms == 0 || runner.tick_interval_ms > MAX_TICK_INTERVAL_MS {
        return Err(anyhow!(StudioError::Config(format!(
            "runner.tick_interval_ms must be between 1 and {}, got {}.",
            MAX_TICK_INTERVAL_MS, runner.tick_interval_ms
        ))));
    }
    if runner.timeout_secs == Some(0) {
        return Err(anyhow!(StudioError::Config(
            "runner.timeout_secs must be positive; omit it for unbounded runs.".to_string()
        )));
    }
    if runner.kill_after_secs == Some(0) {
        return Err(anyhow!(StudioError::Config(
            "runner.kill_after_secs must be positive; omit it to disable escalation.".to_string()
        )));
    }
    if let Some(dir) = &runner.working_dir {
        let path = PathBuf::from(dir);
        if !path.exists() {
            warn!("Configured working directory '{}' does not exist.", path.display());
        } else if !path.is_dir() {
            return Err(anyhow!(StudioError::Config(format!(
                "Configured working directory '{}' exists but is not a directory.",
                path.display()
            ))));
        }
    }
    if config.git.remote.trim().is_empty() {
        return Err(anyhow!(StudioError::Config(
            "git.remote cannot be empty.".to_string()
        )));
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_basic_toml() {
        let toml_content = r#"
            [runner]
            tick_interval_ms = 20
            timeout_secs = 600
            working_dir = "~/site"

            [emulators]
            firestore = true

            [deploy]
            alias = "staging"
            target = "hosting"

            [git]
            branch = "develop"
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.runner.tick_interval(), Duration::from_millis(20));
        assert_eq!(config.runner.timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.runner.kill_after(), None);
        assert_eq!(config.runner.working_dir.as_deref(), Some("~/site")); // Not yet expanded
        assert!(config.emulators.hosting); // Default
        assert!(config.emulators.functions); // Default
        assert!(config.emulators.firestore);
        assert!(!config.emulators.auth);
        assert_eq!(config.deploy.alias.as_deref(), Some("staging"));
        assert_eq!(config.deploy.target, DeployTarget::Hosting);
        assert_eq!(config.git.branch.as_deref(), Some("develop"));
        assert_eq!(config.git.remote, "origin"); // Default
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.runner, RunnerConfig::default());
        assert_eq!(config.runner.tick_interval_ms, 50);
        assert_eq!(config.emulators, EmulatorConfig::default());
        assert_eq!(config.deploy.target, DeployTarget::Both);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[runner]\nshell = \"zsh\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_prefers_project_values() {
        let user: Config = toml::from_str(
            r#"
            [runner]
            timeout_secs = 30
            kill_after_secs = 3
            [deploy]
            alias = "prod"
            target = "functions"
            [git]
            remote = "upstream"
            "#,
        )
        .unwrap();
        let project: Config = toml::from_str(
            r#"
            [runner]
            timeout_secs = 90
            [deploy]
            alias = "staging"
            "#,
        )
        .unwrap();

        let merged = merge_configs(user, Some(project));
        assert_eq!(merged.runner.timeout_secs, Some(90));
        assert_eq!(merged.runner.kill_after_secs, Some(3));
        assert_eq!(merged.deploy.alias.as_deref(), Some("staging"));
        assert_eq!(merged.deploy.target, DeployTarget::Functions);
        assert_eq!(merged.git.remote, "upstream");
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config {
            runner: RunnerConfig {
                working_dir: Some("~/site".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        expand_config_paths(&mut config).unwrap();

        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.runner.working_dir.as_deref(),
            Some(home_dir.join("site").to_string_lossy().as_ref())
        );
    }

    #[test]
    fn test_validate_config_rejects_bad_tick_interval() {
        for bad in [0, 5000] {
            let config = Config {
                runner: RunnerConfig {
                    tick_interval_ms: bad,
                    ..Default::default()
                },
                ..Default::default()
            };
            let result = validate_config(&config);
            assert!(result
                .unwrap_err()
                .to_string()
                .contains("tick_interval_ms"));
        }
    }

    #[test]
    fn test_validate_config_rejects_zero_timeouts() {
        let config = Config {
            runner: RunnerConfig {
                timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            runner: RunnerConfig {
                kill_after_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_working_dir_is_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, "").unwrap();

        let config = Config {
            runner: RunnerConfig {
                working_dir: Some(file_path.to_string_lossy().to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("is not a directory"));
    }

    #[test]
    fn test_find_project_config_stops_at_git_root() {
        let temp_dir = tempdir().unwrap();
        let repo = temp_dir.path().join("repo");
        let nested = repo.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir(repo.join(".git")).unwrap();

        // Above the repository root: never picked up.
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), "").unwrap();
        assert_eq!(find_project_config_path(&nested), None);

        fs::write(repo.join("a").join(PROJECT_CONFIG_FILENAME), "").unwrap();
        assert_eq!(
            find_project_config_path(&nested),
            Some(repo.join("a").join(PROJECT_CONFIG_FILENAME))
        );
    }
}
