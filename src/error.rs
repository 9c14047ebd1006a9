// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for release resolution and transfers.
//!
//! `RateLimited` and `NotFound` stop a resolution and are shown to the user
//! as-is. `NoCompatibleAsset` is terminal for that app this run. `Transport`
//! during a partial download is not retried here; re-invoking the transfer
//! resumes from the part file.

use std::fmt;

/// Errors surfaced by resolution, transfer, and update checking.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// GitHub API quota exhausted. Carries the human-readable wait time;
    /// never retried automatically.
    RateLimited(String),
    /// Owner/repo pair does not exist remotely.
    NotFound { owner: String, repo: String },
    /// Releases exist but none carry a usable AppImage for this machine.
    NoCompatibleAsset(String),
    /// Name or path could not be mapped to any known app.
    UnknownApp(String),
    /// Network or HTTP failure below the application layer.
    Transport(String),
    /// Rename/remove/write failure during a transfer.
    Filesystem(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited(wait) => write!(
                f,
                "Your hourly GitHub api rate limit (60) exceeded.\nLimit will be reset after {} minutes.",
                wait
            ),
            Self::NotFound { owner, repo } => write!(f, "Not found {}/{}", owner, repo),
            Self::NoCompatibleAsset(project) => {
                write!(f, "No release has been found for AppImage at {}.", project)
            }
            Self::UnknownApp(name) => write!(f, "Unknown app: {}", name),
            Self::Transport(msg) => write!(f, "Network error: {}", msg),
            Self::Filesystem(msg) => write!(f, "File error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Filesystem(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_owner_and_repo() {
        let err = FetchError::NotFound {
            owner: "tutao".to_string(),
            repo: "tutanota".to_string(),
        };
        assert_eq!(err.to_string(), "Not found tutao/tutanota");
    }

    #[test]
    fn test_rate_limited_carries_wait_time() {
        let err = FetchError::RateLimited("12:34".to_string());
        assert!(err.to_string().contains("12:34"));
        assert!(err.to_string().contains("rate limit"));
    }

    #[test]
    fn test_io_error_maps_to_filesystem() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = FetchError::from(io);
        assert!(matches!(err, FetchError::Filesystem(_)));
    }
}
