// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Builtin catalogue of known AppImage projects.
//!
//! Each entry binds a display name to the forge coordinates its releases
//! live under. User-added projects live in the registry file instead (see
//! [`crate::storage`]).

/// Forge coordinates for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeRef {
    /// GitHub releases API, addressed by owner and repository name.
    GitHub {
        owner: &'static str,
        repo: &'static str,
    },
    /// GitLab releases API, addressed by numeric project id.
    GitLab { project_id: u64 },
}

/// Known projects, name first.
pub const BUILTIN_APPS: &[(&str, ForgeRef)] = &[
    ("tutanota", ForgeRef::GitHub { owner: "tutao", repo: "tutanota" }),
    ("vscodium", ForgeRef::GitHub { owner: "VSCodium", repo: "vscodium" }),
    ("bitwarden", ForgeRef::GitHub { owner: "bitwarden", repo: "bitwarden" }),
    ("insomnia", ForgeRef::GitHub { owner: "Kong", repo: "insomnia" }),
    ("keepassxc", ForgeRef::GitHub { owner: "keepassxreboot", repo: "keepassxc" }),
    ("session", ForgeRef::GitHub { owner: "oxen-io", repo: "session-desktop" }),
    ("shotcut", ForgeRef::GitHub { owner: "mltframework", repo: "shotcut" }),
    ("audacity", ForgeRef::GitHub { owner: "audacity", repo: "audacity" }),
    ("freecad", ForgeRef::GitHub { owner: "FreeCAD", repo: "FreeCAD" }),
    ("subsurface", ForgeRef::GitHub { owner: "subsurface", repo: "subsurface" }),
    ("etcher", ForgeRef::GitHub { owner: "balena-io", repo: "etcher" }),
    ("exifcleaner", ForgeRef::GitHub { owner: "szTheory", repo: "exifcleaner" }),
    ("hyper", ForgeRef::GitHub { owner: "vercel", repo: "hyper" }),
    ("electronmail", ForgeRef::GitHub { owner: "vladimiry", repo: "ElectronMail" }),
    ("musescore", ForgeRef::GitHub { owner: "musescore", repo: "MuseScore" }),
    ("picocrypt", ForgeRef::GitHub { owner: "HACKERALERT", repo: "Picocrypt" }),
    ("cryptomator", ForgeRef::GitHub { owner: "cryptomator", repo: "cryptomator" }),
    ("openvideodownloader", ForgeRef::GitHub { owner: "jely2002", repo: "youtube-dl-gui" }),
    ("cliniface", ForgeRef::GitHub { owner: "frontiersi", repo: "Cliniface" }),
    ("appimagelauncher", ForgeRef::GitHub { owner: "TheAssassin", repo: "AppImageLauncher" }),
    ("appimageupdate", ForgeRef::GitHub { owner: "AppImageCommunity", repo: "AppImageUpdate" }),
    ("youtube-music", ForgeRef::GitHub { owner: "th-ch", repo: "youtube-music" }),
    ("appimagepool", ForgeRef::GitHub { owner: "prateekmedia", repo: "appimagepool" }),
    ("alduin", ForgeRef::GitHub { owner: "AlduinApp", repo: "alduin" }),
    ("anotherredisdesktopmanager", ForgeRef::GitHub { owner: "qishibo", repo: "AnotherRedisDesktopManager" }),
    ("arcade-manager", ForgeRef::GitHub { owner: "cosmo0", repo: "arcade-manager" }),
    ("arduino-ide", ForgeRef::GitHub { owner: "arduino", repo: "arduino-ide" }),
    ("artisan", ForgeRef::GitHub { owner: "artisan-roaster-scope", repo: "artisan" }),
    ("librewolf", ForgeRef::GitLab { project_id: 24386000 }),
    ("gameimage", ForgeRef::GitLab { project_id: 39866323 }),
];

/// Looks up a builtin project by name (case-insensitive).
pub fn lookup(name: &str) -> Option<ForgeRef> {
    let lowered = name.to_lowercase();
    BUILTIN_APPS
        .iter()
        .find(|(app, _)| *app == lowered)
        .map(|(_, forge)| *forge)
}

/// Names of all builtin projects, in catalogue order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_APPS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(
            lookup("Tutanota"),
            Some(ForgeRef::GitHub { owner: "tutao", repo: "tutanota" })
        );
    }

    #[test]
    fn test_gitlab_entries_resolve_by_id() {
        assert_eq!(lookup("librewolf"), Some(ForgeRef::GitLab { project_id: 24386000 }));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(lookup("definitely-not-an-app"), None);
    }
}
