//! # DevStudio Preferences
//!
//! File: cli/src/core/prefs.rs
//!
//! ## Overview
//!
//! Preferences are the small pieces of state DevStudio remembers between
//! invocations in a project: the last command issued (so `devstudio last` can
//! re-run it), the last branch pushed to, the deploy alias and the emulator
//! selection. They live next to the project in `.devstudio-prefs.toml`.
//!
//! Unlike configuration, preferences are written by the tool itself. A missing
//! file is the normal first-run case and a damaged one is not worth refusing to
//! work over: both yield defaults, the latter with a warning.
//!
//! ```toml
//! last_command = "firebase emulators:start --only hosting,functions"
//! last_run_at = "2026-10-18T09:12:44.120Z"
//! last_branch = "feature/login"
//! default_alias = "staging"
//!
//! [emulators]
//! hosting = true
//! functions = true
//! firestore = false
//! auth = false
//! ```
//!
use crate::core::config::EmulatorConfig;
use crate::core::error::{Result, StudioError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the preferences file inside a working directory.
pub const PREFS_FILENAME: &str = ".devstudio-prefs.toml";

/// State remembered between invocations.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulators: Option<EmulatorConfig>,
}

impl Preferences {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(PREFS_FILENAME)
    }

    /// Loads the preferences stored in `dir`, falling back to defaults.
    pub fn load(dir: &Path) -> Self {
        let path = Self::path(dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Could not read preferences {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(
                    "Ignoring malformed preferences {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Writes the preferences to `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path(dir);
        let content = toml::to_string_pretty(self)
            .map_err(|e| StudioError::Preferences(format!("cannot serialize: {}", e)))?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write preferences: {}", path.display()))?;
        debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// Remembers `command` as the last one issued, stamped with the current time.
    pub fn record_command(&mut self, command: &str) {
        self.last_command = Some(command.to_string());
        self.last_run_at = Some(Utc::now());
    }
}
