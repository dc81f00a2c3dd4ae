//! Conversion job data model.

use std::path::PathBuf;

/// One input-to-output file conversion task.
///
/// Created by path derivation; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Absolute path of the source file.
    pub input_path: PathBuf,
    /// Path the converted file will be written to.
    pub output_path: PathBuf,
}

impl Job {
    /// Create a new job from an input/output path pair.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

/// A [`Job`] whose total unit of work is known.
///
/// Produced by probing; `frame_count` is the video packet count of the
/// input's first video stream and sizes the job's progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedJob {
    /// The underlying conversion job.
    pub job: Job,
    /// Total frames the conversion will process.
    pub frame_count: u64,
}
