// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Update checking and in-place upgrades.
//!
//! An installed artifact is current when its file name is a substring of
//! the resolver's canonical name for the same project; the canonical name
//! always carries the version, so a version bump changes it. Upgrading
//! downloads the new artifact next to the old one and deletes the old file
//! only after the transfer fully succeeded. A failed upgrade discards the
//! fresh part file and leaves the installed artifact untouched.

use std::fs;
use std::path::Path;

use crate::error::FetchError;
use crate::resolve;
use crate::storage::Storage;
use crate::transfer;
use crate::types::{InstalledArtifact, ResolvedRelease, TransferTarget};

/// Outcome of an update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The installed artifact matches the current release.
    UpToDate,
    /// A newer release exists; carries everything needed to download it.
    Available(ResolvedRelease),
}

/// Checks whether an installed AppImage has an update.
///
/// The owning project is found by case-insensitive substring match of a
/// known app name (or its hyphen-stripped form) against the path; a path
/// matching no known app is an explicit [`FetchError::UnknownApp`].
pub fn has_update(
    installed_path: &Path,
    known: &[String],
    store: &Storage,
) -> Result<UpdateStatus, FetchError> {
    let path_str = installed_path.to_string_lossy().to_lowercase();
    let app = known
        .iter()
        .find(|app| {
            let name = app.to_lowercase();
            path_str.contains(&name) || path_str.contains(&name.replace('-', ""))
        })
        .ok_or_else(|| FetchError::UnknownApp(installed_path.display().to_string()))?;

    let release = resolve::resolve(app, store)?;
    let file_name = installed_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if is_current(&file_name, &release.canonical_name) {
        Ok(UpdateStatus::UpToDate)
    } else {
        Ok(UpdateStatus::Available(release))
    }
}

/// An installed file name that occurs inside the canonical name is the same
/// version the resolver would hand out now.
pub fn is_current(installed_file_name: &str, canonical_name: &str) -> bool {
    !installed_file_name.is_empty() && canonical_name.contains(installed_file_name)
}

/// Downloads `release` into the installed artifact's directory, then deletes
/// the old file. On failure the new part file is removed and the old file is
/// left in place, so the user always keeps at least one working version.
pub fn apply_update(
    release: &ResolvedRelease,
    installed: &InstalledArtifact,
) -> Result<(), FetchError> {
    let dest_dir = installed
        .dir()
        .ok_or_else(|| FetchError::Filesystem("installed artifact has no parent directory".to_string()))?;
    let target = TransferTarget::new(release, dest_dir);

    match transfer::download(&target) {
        Ok(_) => {
            fs::remove_file(&installed.file_path)?;
            tracing::info!(
                old = %installed.file_name,
                new = %release.canonical_name,
                "upgraded"
            );
            Ok(())
        }
        Err(err) => {
            // Discard only the fresh download; the installed file stays
            let _ = fs::remove_file(target.part_path());
            Err(err)
        }
    }
}
