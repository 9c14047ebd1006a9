// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! appfetch - AppImage installer and updater library
//!
//! Resolves the best-matching AppImage release for the host machine from
//! GitHub and GitLab release APIs, names it with a stable version-bearing
//! file name, and downloads it with resumable, length-checked transfers.
//!
//! # Core Modules
//!
//! - [`resolve`] - Forge dispatch and release resolution (GitHub, GitLab)
//! - [`transfer`] - Resumable downloads with part-file staging
//! - [`update`] - Update checking and in-place upgrades
//! - [`arch`] - Processor architecture compatibility filtering
//! - [`naming`] - Canonical version-bearing file names
//! - [`storage`] - Config file, user registry, installed-app inventory
//! - [`error`] - Error taxonomy shared across the crate

pub mod arch;
pub mod error;
pub mod naming;
pub mod resolve;
pub mod storage;
pub mod transfer;
pub mod types;
pub mod update;

// Re-export commonly used types
pub use error::FetchError;
pub use resolve::{known_app_names, resolve as resolve_app, ForgeRef, GitHubClient, GitLabClient, BUILTIN_APPS};
pub use storage::{Config, Storage};
pub use transfer::{download, download_with_progress, TransferOutcome};
pub use types::{InstalledArtifact, ResolvedRelease, TransferTarget};
pub use update::{apply_update, has_update, UpdateStatus};
