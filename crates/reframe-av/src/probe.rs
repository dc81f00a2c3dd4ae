//! Frame counting via ffprobe.
//!
//! Each input is probed with packet counting on its first video stream. The
//! resulting count sizes the job's progress reporting. A probe failure
//! (non-zero exit, missing stream, non-numeric output) excludes the input
//! from conversion; it never silently becomes a zero-frame job.

use crate::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Count the video packets of `input`'s first video stream.
///
/// Runs `ffprobe -count_packets` and parses its single-integer output.
/// Packet counting decodes nothing, so this is cheap even for large files.
pub async fn frame_count(ffprobe: &Path, input: &Path) -> Result<u64> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=nb_read_packets",
            "-of",
            "csv=p=0",
        ])
        .arg(input)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::spawn("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.trim().to_string()));
    }

    parse_frame_count(&String::from_utf8_lossy(&output.stdout))
}

/// Parse ffprobe's packet count output: a single unsigned integer,
/// surrounded by arbitrary whitespace.
fn parse_frame_count(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    trimmed.parse::<u64>().map_err(|_| {
        Error::parse_error("ffprobe", format!("expected a packet count, got {trimmed:?}"))
    })
}
