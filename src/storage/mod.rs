// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! On-disk state: config file, user registry, and the installed-app scan.
//!
//! Two small JSON files live under the config directory: `config.json`
//! holding the main install folder, and `repos.json` mapping user-added
//! project names to their GitHub URLs. Registry writers read-modify-write
//! the whole file; this tool is single-user, so no locking is done.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::types::{InstalledArtifact, ResolvedRelease};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static ALPHA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").unwrap());

/// Tool configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory all installed AppImages live under, one subfolder per app.
    pub main_folder: PathBuf,
}

impl Config {
    fn default_config() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            main_folder: home.join("Applications"),
        }
    }
}

/// Handle on the config directory and the files inside it.
#[derive(Debug, Clone)]
pub struct Storage {
    config_path: PathBuf,
    registry_path: PathBuf,
}

impl Storage {
    /// Storage rooted at the platform config directory.
    pub fn new() -> Result<Self, FetchError> {
        let root = dirs::config_dir()
            .ok_or_else(|| FetchError::Filesystem("could not determine config directory".to_string()))?
            .join("appfetch");
        Ok(Self::with_root(root))
    }

    /// Storage rooted at an explicit directory. Used by tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_path: root.join("config.json"),
            registry_path: root.join("repos.json"),
        }
    }

    /// Reads the config, creating a default one on first run. A corrupted
    /// file is replaced with a fresh default rather than failing forever.
    pub fn config(&self) -> Result<Config, FetchError> {
        if !self.config_path.exists() {
            let config = Config::default_config();
            self.write_config(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.config_path)?;
        match serde_json::from_str(&raw) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    %err,
                    "config file corrupted, recreating"
                );
                fs::remove_file(&self.config_path)?;
                let config = Config::default_config();
                self.write_config(&config)?;
                Ok(config)
            }
        }
    }

    fn write_config(&self, config: &Config) -> Result<(), FetchError> {
        write_json(&self.config_path, config)?;
        fs::create_dir_all(&config.main_folder)?;
        Ok(())
    }

    /// The directory installed apps live under.
    pub fn main_folder(&self) -> Result<PathBuf, FetchError> {
        Ok(self.config()?.main_folder)
    }

    /// Reads the user registry: project display name -> GitHub URL.
    pub fn get_registry(&self) -> Result<BTreeMap<String, String>, FetchError> {
        if !self.registry_path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.registry_path)?;
        serde_json::from_str(&raw)
            .map_err(|err| FetchError::Filesystem(format!("registry file corrupted: {}", err)))
    }

    /// Adds a resolved release to the user registry and returns the display
    /// name it was stored under. Whole-file read-modify-write.
    pub fn update_registry(&self, release: &ResolvedRelease) -> Result<String, FetchError> {
        let name = display_name(&release.download_url, &release.canonical_name);
        let mut registry = self.get_registry()?;
        registry.insert(name.clone(), release.download_url.clone());
        write_json(&self.registry_path, &registry)?;
        tracing::info!(app = %name, "registered app");
        Ok(name)
    }

    /// Scans the main folder for installed AppImages and maps them back to
    /// known app names. One artifact per app subfolder; files that match no
    /// known name are ignored.
    pub fn installed_apps(
        &self,
        known: &[String],
    ) -> Result<BTreeMap<String, InstalledArtifact>, FetchError> {
        let mut installed = BTreeMap::new();
        let apps_dir = self.main_folder()?;
        if !apps_dir.exists() {
            return Ok(installed);
        }

        for entry in fs::read_dir(&apps_dir)? {
            let dir = entry?.path();
            if !dir.is_dir() {
                continue;
            }
            for file in fs::read_dir(&dir)? {
                let file = file?;
                let file_name = file.file_name().to_string_lossy().into_owned();
                if !file_name.to_lowercase().ends_with(".appimage") {
                    continue;
                }
                if let Some(app) = match_app_name(&file_name, known) {
                    installed.insert(
                        app,
                        InstalledArtifact::new(file_name, file.path()),
                    );
                }
                break;
            }
        }
        Ok(installed)
    }

    /// Directory a fresh install of `canonical_name` goes into.
    pub fn app_dir(&self, canonical_name: &str) -> Result<PathBuf, FetchError> {
        Ok(self.main_folder()?.join(app_folder_name(canonical_name)))
    }

    /// Removes an installed artifact. Deletes the whole app subfolder when
    /// the artifact lives under the main folder, otherwise just the file.
    pub fn remove_app(&self, artifact: &InstalledArtifact) -> Result<(), FetchError> {
        let main = self.main_folder()?;
        let dir = artifact
            .dir()
            .ok_or_else(|| FetchError::Filesystem("artifact has no parent directory".to_string()))?;
        if dir.starts_with(&main) && dir != main.as_path() {
            fs::remove_dir_all(dir)?;
        } else {
            fs::remove_file(&artifact.file_path)?;
        }
        Ok(())
    }
}

/// Maps an AppImage file name to a known app name by case-insensitive
/// substring match, also trying the hyphen-stripped form of each name.
pub fn match_app_name(file_name: &str, known: &[String]) -> Option<String> {
    let lowered = file_name.to_lowercase();
    known.iter().find_map(|app| {
        let name = app.to_lowercase();
        if lowered.contains(&name) || lowered.contains(&name.replace('-', "")) {
            Some(app.clone())
        } else {
            None
        }
    })
}

/// Subfolder name for an artifact: the first two word runs of its canonical
/// name, concatenated. "tutanota-desktop-linux-3-106-5.AppImage" installs
/// under "tutanotadesktop".
pub fn app_folder_name(canonical_name: &str) -> String {
    WORD_RE
        .find_iter(canonical_name)
        .take(2)
        .map(|m| m.as_str())
        .collect()
}

/// Derives the registry display name for a project URL.
///
/// Title-cases the repo path segment ("brave-browser" -> "BraveBrowser");
/// when that string does not occur in the canonical file name, falls back
/// to the name's prefix through its second alphabetic word
/// ("brave-stable.AppImage" -> "brave-stable").
pub fn display_name(url: &str, canonical_name: &str) -> String {
    let tail = url.split_once(".com/").map(|(_, t)| t).unwrap_or(url);
    let repo = tail.split('/').nth(1).unwrap_or(tail);
    let title: String = WORD_RE
        .find_iter(repo)
        .map(|m| capitalize(m.as_str()))
        .collect();

    if canonical_name.to_lowercase().contains(&title.to_lowercase()) {
        return title;
    }

    let alpha: Vec<&str> = ALPHA_RE
        .find_iter(canonical_name)
        .map(|m| m.as_str())
        .collect();
    if alpha.len() >= 2 {
        if let Some(pos) = canonical_name.find(alpha[1]) {
            return canonical_name[..pos + alpha[1].len()].to_string();
        }
    }
    title
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(value)
        .map_err(|err| FetchError::Filesystem(err.to_string()))?;
    fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_folder_name_takes_two_words() {
        assert_eq!(
            app_folder_name("tutanota-desktop-linux-3-106-5.AppImage"),
            "tutanotadesktop"
        );
        assert_eq!(app_folder_name("app.AppImage"), "appAppImage");
    }

    #[test]
    fn test_display_name_from_repo_segment() {
        assert_eq!(
            display_name(
                "https://github.com/tutao/tutanota/releases/download/v3.106.5/tutanota-desktop-linux-3-106-5.AppImage",
                "tutanota-desktop-linux-3-106-5.AppImage",
            ),
            "Tutanota"
        );
    }

    #[test]
    fn test_display_name_falls_back_to_file_prefix() {
        // "BraveBrowser" is nowhere in "brave-stable.AppImage"
        assert_eq!(
            display_name(
                "https://github.com/brave/brave-browser/releases/download/v1.0/brave-stable.AppImage",
                "brave-stable.AppImage",
            ),
            "brave-stable"
        );
    }

    #[test]
    fn test_match_app_name_hyphen_stripped() {
        let known = vec!["youtube-music".to_string(), "tutanota".to_string()];
        assert_eq!(
            match_app_name("YoutubeMusic-3.3.5.AppImage", &known),
            Some("youtube-music".to_string())
        );
        assert_eq!(
            match_app_name("tutanota-desktop-linux-3-106-5.AppImage", &known),
            Some("tutanota".to_string())
        );
        assert_eq!(match_app_name("unrelated.AppImage", &known), None);
    }
}
