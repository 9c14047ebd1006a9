// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! GitLab releases strategy.
//!
//! Much simpler than the GitHub side: one listing request, asset links
//! scanned in declaration order, transport failures propagated as-is.
//! GitLab's API is picky about default client user agents, so a fixed
//! browser UA is sent instead.

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;

use crate::arch;
use crate::error::FetchError;
use crate::naming;
use crate::types::ResolvedRelease;

const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; rv:102.0)";
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
pub(crate) struct Release {
    pub assets: Assets,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Assets {
    #[serde(default)]
    pub links: Vec<AssetLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReleasePayload {
    Many(Vec<Release>),
    One(Release),
}

impl ReleasePayload {
    pub(crate) fn into_vec(self) -> Vec<Release> {
        match self {
            Self::Many(releases) => releases,
            Self::One(release) => vec![release],
        }
    }
}

/// Client for the GitLab releases API.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    api_url: String,
    client: Client,
}

impl GitLabClient {
    /// Client against the public gitlab.com API.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_api_url(DEFAULT_API_URL)
    }

    /// Client against a custom API root. Used by tests.
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(FetchError::from)?;
        Ok(Self {
            api_url: api_url.into(),
            client,
        })
    }

    /// Resolves the best AppImage asset link for a GitLab project id.
    pub fn resolve(&self, project_id: u64) -> Result<ResolvedRelease, FetchError> {
        let url = format!("{}/projects/{}/releases/", self.api_url, project_id);
        let payload: ReleasePayload = self
            .client
            .get(&url)
            .header(USER_AGENT, BROWSER_UA)
            .send()?
            .error_for_status()?
            .json()?;

        let releases = payload.into_vec();
        let link = select_link(&releases, arch::host_arch())
            .ok_or_else(|| FetchError::NoCompatibleAsset(project_id.to_string()))?;

        Ok(ResolvedRelease {
            canonical_name: naming::nail_version(&link.url),
            download_url: link.url.clone(),
        })
    }
}

/// Picks the first asset link with the AppImage suffix that passes the
/// architecture filter. No prerelease filtering on this forge.
pub(crate) fn select_link<'a>(releases: &'a [Release], host_arch: &str) -> Option<&'a AssetLink> {
    releases
        .iter()
        .flat_map(|release| release.assets.links.iter())
        .find(|link| link.name.ends_with(".AppImage") && arch::is_compatible(&link.name, host_arch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn releases(value: serde_json::Value) -> Vec<Release> {
        serde_json::from_value::<ReleasePayload>(value)
            .expect("fixture payload")
            .into_vec()
    }

    #[test]
    fn test_links_scanned_in_order() {
        let rels = releases(json!([{
            "assets": {"links": [
                {"name": "notes.txt", "url": "https://x/v1/notes.txt"},
                {"name": "app.AppImage", "url": "https://x/v1/app.AppImage"},
                {"name": "other.AppImage", "url": "https://x/v1/other.AppImage"}
            ]}
        }]));
        let link = select_link(&rels, "x86_64").expect("link");
        assert_eq!(link.name, "app.AppImage");
    }

    #[test]
    fn test_object_payload_normalizes() {
        let rels = releases(json!({
            "assets": {"links": [
                {"name": "app.AppImage", "url": "https://x/v2/app.AppImage"}
            ]}
        }));
        assert_eq!(rels.len(), 1);
        assert!(select_link(&rels, "x86_64").is_some());
    }

    #[test]
    fn test_no_links_yields_none() {
        let rels = releases(json!([{"assets": {"links": []}}]));
        assert!(select_link(&rels, "x86_64").is_none());
    }
}
