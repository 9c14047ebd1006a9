// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! GitHub releases strategy.
//!
//! Tries the `releases/latest` endpoint first. Plenty of repos never mark a
//! release as "latest" (or only tag prereleases there), so an empty answer
//! falls back to one large page of the full releases listing before giving
//! up. Rate-limit exhaustion is reported with the wait until the quota
//! resets and is never retried automatically.

use chrono::Utc;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::arch;
use crate::error::FetchError;
use crate::naming;
use crate::types::ResolvedRelease;

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const CLIENT_UA: &str = concat!("appfetch/", env!("CARGO_PKG_VERSION"));

/// Timeout for API requests (whole request, the payloads are small).
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Page size for the fallback listing request.
const FALLBACK_PER_PAGE: u32 = 50;

/// One release in the GitHub payload.
#[derive(Debug, Deserialize)]
pub(crate) struct Release {
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One downloadable asset of a release.
#[derive(Debug, Deserialize)]
pub(crate) struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

/// The latest-release endpoint answers a bare object, the listing endpoint
/// an array. Normalize both to a list.
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

/// Client for the GitHub releases API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api_url: String,
    client: Client,
}

impl GitHubClient {
    /// Client against the public GitHub API.
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

    /// Resolves the best AppImage asset for `owner`/`repo`.
    pub fn resolve(&self, owner: &str, repo: &str) -> Result<ResolvedRelease, FetchError> {
        let base = format!("{}/repos/{}/{}/releases", self.api_url, owner, repo);
        let host = arch::host_arch();

        let latest = self.fetch_releases(&format!("{}/latest", base), owner, repo)?;
        if let Some(asset) = select_asset(&latest, host) {
            return Ok(resolved(asset));
        }

        tracing::debug!(owner, repo, "latest release had no usable asset, scanning full listing");
        let listing = self.fetch_releases(
            &format!("{}?per_page={}&page=1", base, FALLBACK_PER_PAGE),
            owner,
            repo,
        )?;
        if let Some(asset) = select_asset(&listing, host) {
            return Ok(resolved(asset));
        }

        Err(FetchError::NoCompatibleAsset(repo.to_string()))
    }

    /// Resolves a project URL by parsing owner and repo out of its path.
    pub fn resolve_url(&self, url: &str) -> Result<ResolvedRelease, FetchError> {
        let (owner, repo) = parse_owner_repo(url)?;
        self.resolve(&owner, &repo)
    }

    fn fetch_releases(&self, url: &str, owner: &str, repo: &str) -> Result<Vec<Release>, FetchError> {
        let res = self
            .client
            .get(url)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_UA)
            .send()?;

        if res.status() == StatusCode::FORBIDDEN
            && header_str(&res, "x-ratelimit-remaining") == Some("0")
        {
            let reset: i64 = header_str(&res, "x-ratelimit-reset")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let wait = format_reset(reset - Utc::now().timestamp());
            return Err(FetchError::RateLimited(wait));
        }
        if res.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
            });
        }

        let payload: ReleasePayload = res.error_for_status()?.json()?;
        Ok(payload.into_vec())
    }
}

/// Extracts the owner and repo path segments from a GitHub project URL,
/// percent-decoded.
pub fn parse_owner_repo(url: &str) -> Result<(String, String), FetchError> {
    let tail = url
        .split_once("github.com/")
        .map(|(_, tail)| tail)
        .ok_or_else(|| FetchError::UnknownApp(url.to_string()))?;

    let mut segments = tail.split(['/', '?', '#']);
    let owner = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FetchError::UnknownApp(url.to_string()))?;
    let repo = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FetchError::UnknownApp(url.to_string()))?;

    Ok((percent_decode(owner), percent_decode(repo)))
}

/// Picks the first asset of the first non-prerelease release whose name has
/// the AppImage suffix and passes the architecture filter. Releases and
/// assets are scanned in payload order.
pub(crate) fn select_asset<'a>(releases: &'a [Release], host_arch: &str) -> Option<&'a Asset> {
    releases
        .iter()
        .filter(|release| !release.prerelease)
        .flat_map(|release| release.assets.iter())
        .find(|asset| asset.name.ends_with(".AppImage") && arch::is_compatible(&asset.name, host_arch))
}

fn resolved(asset: &Asset) -> ResolvedRelease {
    ResolvedRelease {
        canonical_name: naming::nail_version(&asset.browser_download_url),
        download_url: asset.browser_download_url.clone(),
    }
}

fn header_str<'a>(res: &'a Response, name: &str) -> Option<&'a str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Formats a wait in seconds as MM:SS. Negative waits clamp to zero.
fn format_reset(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&segment[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
