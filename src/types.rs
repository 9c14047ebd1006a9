// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared types used across resolution, transfer, and update checking.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Output of a successful release resolution.
///
/// Built fresh on every resolution call; never cached. The canonical name is
/// always derived from the download URL and is guaranteed to carry a version
/// marker (see [`crate::naming::nail_version`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedRelease {
    /// Direct download URL for the chosen asset.
    pub download_url: String,
    /// Version-bearing file name used on disk and for update comparison.
    pub canonical_name: String,
}

/// Where a download goes and under which name.
#[derive(Debug, Clone)]
pub struct TransferTarget {
    /// Direct download URL for the asset.
    pub download_url: String,
    /// File name to store the asset under.
    pub canonical_name: String,
    /// Directory the final file lands in.
    pub dest_dir: PathBuf,
}

impl TransferTarget {
    /// Build a target from a resolved release and a destination directory.
    pub fn new(release: &ResolvedRelease, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_url: release.download_url.clone(),
            canonical_name: release.canonical_name.clone(),
            dest_dir: dest_dir.into(),
        }
    }

    /// Path of the completed artifact.
    pub fn final_path(&self) -> PathBuf {
        self.dest_dir.join(&self.canonical_name)
    }

    /// Path of the in-progress staging file. Always a valid byte-prefix of
    /// the final artifact.
    pub fn part_path(&self) -> PathBuf {
        self.dest_dir.join(format!("{}.part", self.canonical_name))
    }
}

/// An AppImage already present on disk, found by the installed-app scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    /// Bare file name, e.g. `tutanota-desktop-linux-3-106-5.AppImage`.
    pub file_name: String,
    /// Full path to the file.
    pub file_path: PathBuf,
}

impl InstalledArtifact {
    pub fn new(file_name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
        }
    }

    /// Directory the artifact lives in.
    pub fn dir(&self) -> Option<&Path> {
        self.file_path.parent()
    }
}
