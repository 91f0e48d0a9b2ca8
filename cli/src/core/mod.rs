//! # DevStudio Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components used by the
//! command modules:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and error handling utilities
//! - `prefs`: Per-directory state remembered between invocations
//! - `project`: Firebase and git facts detected from the working directory
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{StudioError, Result}; // For error handling
//! use crate::core::prefs::Preferences; // For the last command, branch, alias
//! ```
//!
pub mod config;
pub mod error;
pub mod prefs;
pub mod project;
