// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Canonical, version-bearing file names.
//!
//! Update checking compares file names, so every resolved artifact must end
//! up with a numeric version marker in its name. Most forges put the version
//! in the tag path segment of the download URL rather than in the file name
//! itself; `nail_version` injects it when the name lacks one.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::arch;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// Derives the canonical file name for a download URL.
///
/// Takes the URL's last path segment as the name and collects all maximal
/// digit runs from the second-to-last segment (the release tag). If any run
/// already occurs in the name, the name carries a version and is returned
/// unchanged. Otherwise the digit runs are hyphen-joined and spliced after
/// the second-from-last word of the name (the last word being the AppImage
/// extension marker), stepping back one more word when that word is an
/// architecture marker.
///
/// A tag with no digit runs leaves the name unchanged; update checks for
/// such an artifact degrade to always reporting an update.
pub fn nail_version(download_url: &str) -> String {
    let mut segments = download_url.rsplit('/');
    let name = segments.next().unwrap_or(download_url).to_string();
    let tag = segments.next().unwrap_or("");

    let digit_runs: Vec<&str> = DIGITS_RE.find_iter(tag).map(|m| m.as_str()).collect();

    if digit_runs.iter().any(|run| name.contains(run)) {
        return name;
    }
    if digit_runs.is_empty() {
        tracing::debug!(url = download_url, "no version digits in tag segment");
        return name;
    }

    let words: Vec<&str> = WORD_RE.find_iter(&name).map(|m| m.as_str()).collect();
    if words.len() < 2 {
        return name;
    }

    let mut anchor = words[words.len() - 2];
    if arch::is_arch_token(anchor) {
        // Don't embed the version inside an arch marker
        if words.len() < 3 {
            return name;
        }
        anchor = words[words.len() - 3];
    }

    let nailed = format!("{}-{}", anchor, digit_runs.join("-"));
    name.replacen(anchor, &nailed, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injects_tag_digits_before_extension() {
        let url = "https://github.com/tutao/tutanota/releases/download/v3.106.5/tutanota-desktop-linux.AppImage";
        assert_eq!(nail_version(url), "tutanota-desktop-linux-3-106-5.AppImage");
    }

    #[test]
    fn test_name_with_version_is_unchanged() {
        let url = "https://example.com/releases/v3.106.5/tutanota-desktop-3.106.5.AppImage";
        assert_eq!(nail_version(url), "tutanota-desktop-3.106.5.AppImage");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let first = nail_version(
            "https://github.com/tutao/tutanota/releases/download/v3.106.5/tutanota-desktop-linux.AppImage",
        );
        let synthetic = format!("https://example.com/v3.106.5/{}", first);
        assert_eq!(nail_version(&synthetic), first);
    }

    #[test]
    fn test_steps_back_over_arch_marker() {
        let url = "https://example.com/releases/v1.2/app-x86_64.AppImage";
        assert_eq!(nail_version(url), "app-1-2-x86_64.AppImage");
    }

    #[test]
    fn test_no_digits_in_tag_leaves_name_alone() {
        let url = "https://example.com/releases/latest/app.AppImage";
        assert_eq!(nail_version(url), "app.AppImage");
    }

    #[test]
    fn test_short_name_does_not_panic() {
        assert_eq!(nail_version("https://example.com/v1.0/App"), "App");
    }
}
