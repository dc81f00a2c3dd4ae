//! ffmpeg encode command assembly.

use crate::Job;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Encoding settings shared by every job in a run.
///
/// The per-codec argument table is explicit configuration rather than a
/// process-wide table, so callers can extend or replace it.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    /// Video codec passed as `-c:v`, or `None` to let ffmpeg pick from the
    /// output extension.
    pub codec: Option<String>,
    /// Extra quality/compatibility arguments appended after `-c:v <codec>`.
    pub codec_args: HashMap<String, Vec<String>>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            codec: None,
            codec_args: default_codec_args(),
        }
    }
}

/// Built-in per-codec argument table.
pub fn default_codec_args() -> HashMap<String, Vec<String>> {
    let mut args = HashMap::new();
    args.insert(
        "libx265".to_string(),
        vec![
            // Support h.265 thumbnail previews on Apple devices.
            "-tag:v".to_string(),
            "hvc1".to_string(),
            // The default of 28 has clearly worse quality; 24 looks good
            // with a significant size improvement.
            "-crf".to_string(),
            "24".to_string(),
        ],
    );
    args.insert(
        "hevc_videotoolbox".to_string(),
        vec![
            "-tag:v".to_string(),
            "hvc1".to_string(),
            // 65 is the quality/size sweet spot; higher explodes the size,
            // lower looks noticeably worse.
            "-q:v".to_string(),
            "65".to_string(),
        ],
    );
    args
}

impl EncodeSettings {
    /// Settings for a run, defaulting the codec from the output type when
    /// none was requested (`mp4` defaults to `libx265`).
    pub fn for_output_type(codec: Option<String>, output_type: &str) -> Self {
        let codec = codec.or_else(|| match output_type {
            "mp4" => Some("libx265".to_string()),
            _ => None,
        });
        Self {
            codec,
            ..Self::default()
        }
    }

    /// Assemble the full ffmpeg argument list for one job.
    ///
    /// `progress_url` is the job's progress destination and is passed first
    /// so the status stream starts before any heavy lifting.
    pub fn args(&self, job: &Job, progress_url: &str) -> Vec<String> {
        let mut args = vec![
            // Emit `key=value` progress lines to the job's socket.
            "-progress".to_string(),
            progress_url.to_string(),
            // Overwrite the output file.
            "-y".to_string(),
            "-i".to_string(),
            job.input_path.to_string_lossy().to_string(),
        ];

        if let Some(codec) = &self.codec {
            args.push("-c:v".to_string());
            args.push(codec.clone());
            if let Some(extra) = self.codec_args.get(codec) {
                args.extend(extra.iter().cloned());
            }
        }

        args.extend([
            // Allows h.264 and h.265 to start streaming earlier.
            "-movflags".to_string(),
            "faststart".to_string(),
            // Ensure that `.gif` colors are correctly converted.
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            // Ensure that the dimensions are divisible by 2.
            "-vf".to_string(),
            "crop=trunc(iw/2)*2:trunc(ih/2)*2".to_string(),
        ]);

        args.push(job.output_path.to_string_lossy().to_string());
        args
    }

    /// Build the ffmpeg command for one job, ready to spawn.
    ///
    /// stderr is piped so a failing conversion can carry ffmpeg's own
    /// diagnostics in its terminal result.
    pub fn command(&self, ffmpeg: &Path, job: &Job, progress_url: &str) -> Command {
        let mut command = Command::new(ffmpeg);
        command
            .args(self.args(job, progress_url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}
