// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Resumable, integrity-checked downloads.
//!
//! A transfer streams into `<final>.part` and renames to the final path only
//! when the part's size equals the remote content length. The part file is
//! append-only and flushed per chunk, so it is always a valid byte-prefix of
//! the artifact; an interrupted run leaves it behind and the next invocation
//! resumes with a byte-range request. Transport errors never delete the part
//! file.
//!
//! State machine over (final exists?, part exists?):
//!
//! | final | part | action |
//! |---|---|---|
//! | right size | - | no-op |
//! | wrong size | - | rename final -> part, treat as partial |
//! | no | complete | rename part -> final |
//! | no | empty | request from byte 0 (a range header would be rejected) |
//! | no | partial | request with `Range: bytes=<size>-` |
//! | no | no | fresh request from byte 0 |

use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::header::RANGE;

use crate::error::FetchError;
use crate::types::TransferTarget;

/// Chunk size for the append-and-flush loop.
const CHUNK_SIZE: usize = 8192;

/// Connect timeout. No overall request timeout: body streaming of a large
/// artifact takes as long as it takes.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// How a transfer finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The final file was already present with the right size.
    AlreadyComplete,
    /// The artifact was downloaded (fresh or resumed) and renamed into place.
    Completed,
}

/// Downloads a target with a progress bar on the terminal.
pub fn download(target: &TransferTarget) -> Result<TransferOutcome, FetchError> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    bar.set_message(target.canonical_name.clone());

    let result = download_with_progress(target, |done, total| {
        if bar.length() != Some(total) {
            bar.set_length(total);
        }
        bar.set_position(done);
    });

    match &result {
        Ok(_) => bar.finish_and_clear(),
        Err(_) => bar.abandon(),
    }
    result
}

/// Downloads a target, reporting `(bytes_on_disk, total_bytes)` after every
/// chunk written.
pub fn download_with_progress<F>(
    target: &TransferTarget,
    mut on_chunk: F,
) -> Result<TransferOutcome, FetchError>
where
    F: FnMut(u64, u64),
{
    let final_path = target.final_path();
    let part_path = target.part_path();
    fs::create_dir_all(&target.dest_dir)?;

    let client = Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .map_err(FetchError::from)?;

    // Initial request establishes the remote content length; its body is
    // only consumed when downloading from byte 0.
    let mut res = client
        .get(&target.download_url)
        .send()?
        .error_for_status()?;
    let remote_len = res.content_length().ok_or_else(|| {
        FetchError::Transport("response did not carry a Content-Length header".to_string())
    })?;

    if final_path.exists() {
        let size = fs::metadata(&final_path)?.len();
        if size == remote_len {
            tracing::debug!(name = %target.canonical_name, "already downloaded");
            return Ok(TransferOutcome::AlreadyComplete);
        }
        // Wrong length: demote to a part file and resume it below
        fs::rename(&final_path, &part_path)?;
    }

    let mut have: u64 = 0;
    if part_path.exists() {
        have = fs::metadata(&part_path)?.len();
        if have == remote_len {
            fs::rename(&part_path, &final_path)?;
            tracing::debug!(name = %target.canonical_name, "part file was already complete");
            return Ok(TransferOutcome::Completed);
        }
        if have > remote_len {
            // Leftover from a different artifact; it can never complete
            tracing::warn!(part = %part_path.display(), "part file larger than remote, restarting");
            fs::remove_file(&part_path)?;
            have = 0;
        } else if have > 0 {
            // A range of bytes=0- would be rejected, so only send the header
            // when some bytes are actually present
            tracing::info!(name = %target.canonical_name, resumed_at = have, "resuming download");
            res = client
                .get(&target.download_url)
                .header(RANGE, format!("bytes={}-", have))
                .send()?
                .error_for_status()?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&part_path)?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = res
            .read(&mut buf)
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        file.flush()?;
        have += n as u64;
        on_chunk(have, remote_len);
    }
    drop(file);

    let part_size = fs::metadata(&part_path)?.len();
    if part_size == remote_len {
        fs::rename(&part_path, &final_path)?;
        tracing::info!(name = %target.canonical_name, bytes = part_size, "download complete");
        return Ok(TransferOutcome::Completed);
    }

    // Stream ended short without a transport error; the part file stays for
    // the next invocation to resume
    Err(FetchError::Transport(format!(
        "download ended after {} of {} bytes; rerun to resume",
        part_size, remote_len
    )))
}
