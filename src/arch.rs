// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Processor architecture compatibility filtering.
//!
//! Release assets are free-form file names; the only architecture signal is
//! whatever token the packager embedded in the name. A file is considered
//! compatible unless it carries a token from a *foreign* architecture group.
//! Files with no architecture marker at all are assumed portable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Mutually exclusive architecture token groups. Exactly one group matches
/// the host machine at resolution time.
pub const ARCH_GROUPS: [&[&str]; 4] = [
    &["aarch64", "arm64"],
    &["armv7hl", "armhf", "arm32"],
    &["x86_64", "x64", "amd64", "64bit"],
    &["i386", "ia32", "i486", "i686", "x86"],
];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

static HOST_ARCH: Lazy<String> = Lazy::new(|| {
    uname_machine().unwrap_or_else(|| std::env::consts::ARCH.to_string())
});

/// The host machine's architecture, detected once per process.
///
/// Asks the OS via `uname -m`; falls back to the compiled-in target
/// architecture when that fails.
pub fn host_arch() -> &'static str {
    &HOST_ARCH
}

fn uname_machine() -> Option<String> {
    let out = std::process::Command::new("uname").arg("-m").output().ok()?;
    let machine = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if machine.is_empty() {
        None
    } else {
        Some(machine)
    }
}

/// Returns whether any token in `token_list` occurs in `word`.
fn word_has_token(word: &str, token_list: &[&str]) -> bool {
    token_list.iter().any(|token| {
        if *token == "x86" {
            // x86_64 contains "x86"; don't reject a 64-bit asset for it
            word.contains("x86") && !word.contains("x86_64")
        } else {
            word.contains(token)
        }
    })
}

/// Decides whether `file_name` is usable on a machine of `host_arch`.
///
/// Builds the union of tokens from every group `host_arch` does NOT belong
/// to, then tokenizes the file name into word runs. Any word carrying a
/// foreign token rejects the file; everything else (including names with no
/// architecture marker) passes.
pub fn is_compatible(file_name: &str, host_arch: &str) -> bool {
    let host = host_arch.to_lowercase();
    let mut foreign: Vec<&str> = Vec::new();
    for group in ARCH_GROUPS {
        if !group.contains(&host.as_str()) {
            foreign.extend_from_slice(group);
        }
    }

    let lowered = file_name.to_lowercase();
    !WORD_RE
        .find_iter(&lowered)
        .any(|word| word_has_token(word.as_str(), &foreign))
}

/// Returns whether `word` itself is an architecture marker of any group.
pub fn is_arch_token(word: &str) -> bool {
    let lowered = word.to_lowercase();
    ARCH_GROUPS
        .iter()
        .any(|group| group.iter().any(|token| lowered.contains(token)))
}
