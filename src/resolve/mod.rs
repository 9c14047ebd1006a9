// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Release resolution: project name in, best-matching AppImage out.
//!
//! Dispatch order for a name:
//! 1. A syntactically valid GitHub project URL is resolved directly, and
//!    the result is persisted into the user registry ("add app by URL").
//! 2. The builtin catalogue ([`apps`]).
//! 3. The user registry (stored URLs, resolved as GitHub URLs).
//!
//! Every call re-queries the forge; nothing is cached across calls.

pub mod apps;
pub mod github;
pub mod gitlab;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FetchError;
use crate::storage::Storage;
use crate::types::ResolvedRelease;

pub use apps::{ForgeRef, BUILTIN_APPS};
pub use github::GitHubClient;
pub use gitlab::GitLabClient;

static GITHUB_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?github\.com/[A-Za-z0-9_.%-]+/[A-Za-z0-9_.%-]+")
        .unwrap()
});

/// Returns whether `input` looks like a GitHub project URL.
pub fn is_github_url(input: &str) -> bool {
    GITHUB_URL_RE.is_match(input)
}

impl ForgeRef {
    /// Resolves this project's current best asset on its forge.
    pub fn resolve(&self) -> Result<ResolvedRelease, FetchError> {
        match self {
            Self::GitHub { owner, repo } => GitHubClient::new()?.resolve(owner, repo),
            Self::GitLab { project_id } => GitLabClient::new()?.resolve(*project_id),
        }
    }
}

/// Resolves an app name or GitHub URL to its current release.
pub fn resolve(name: &str, store: &Storage) -> Result<ResolvedRelease, FetchError> {
    if is_github_url(name) {
        let release = GitHubClient::new()?.resolve_url(name)?;
        store.update_registry(&release)?;
        return Ok(release);
    }

    if let Some(forge) = apps::lookup(name) {
        return forge.resolve();
    }

    let registry = store.get_registry()?;
    if let Some(url) = registry.get(name) {
        return GitHubClient::new()?.resolve_url(url);
    }

    Err(FetchError::UnknownApp(name.to_string()))
}

/// Every resolvable app name: the builtin catalogue plus the user registry.
pub fn known_app_names(store: &Storage) -> Result<Vec<String>, FetchError> {
    let mut names: Vec<String> = apps::builtin_names().map(str::to_string).collect();
    names.extend(store.get_registry()?.into_keys());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_github_url() {
        assert!(is_github_url("https://github.com/tutao/tutanota"));
        assert!(is_github_url("github.com/VSCodium/vscodium"));
        assert!(is_github_url("http://www.github.com/a-b/c_d"));
        assert!(!is_github_url("https://gitlab.com/librewolf-community/browser"));
        assert!(!is_github_url("tutanota"));
        assert!(!is_github_url("github.com/only-owner"));
    }

    #[test]
    fn test_unknown_name_errors() {
        let tmp = std::env::temp_dir().join("appfetch-resolve-test-empty");
        let store = Storage::with_root(&tmp);
        let err = resolve("definitely-not-an-app", &store).unwrap_err();
        assert!(matches!(err, FetchError::UnknownApp(_)));
    }

    #[test]
    fn test_known_names_include_builtins() {
        let tmp = std::env::temp_dir().join("appfetch-resolve-test-names");
        let store = Storage::with_root(&tmp);
        let names = known_app_names(&store).unwrap();
        assert!(names.iter().any(|n| n == "tutanota"));
        assert!(names.iter().any(|n| n == "librewolf"));
    }
}
