//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolved paths to the external tools reframe drives.
///
/// Paths are resolved once up front and injected everywhere a subprocess is
/// spawned, so callers (and tests) can substitute their own executables.
#[derive(Debug, Clone)]
pub struct Tools {
    /// Path to the ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// Path to the ffprobe executable.
    pub ffprobe: PathBuf,
}

impl Tools {
    /// Locate ffmpeg and ffprobe on PATH.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if either tool is missing.
    pub fn locate() -> Result<Self> {
        Ok(Self {
            ffmpeg: require_tool("ffmpeg")?,
            ffprobe: require_tool("ffprobe")?,
        })
    }

    /// Build a `Tools` from explicit executable paths.
    pub fn from_paths(ffmpeg: impl AsRef<Path>, ffprobe: impl AsRef<Path>) -> Self {
        Self {
            ffmpeg: ffmpeg.as_ref().to_path_buf(),
            ffprobe: ffprobe.as_ref().to_path_buf(),
        }
    }
}

/// Require that a tool is available on PATH, returning its resolved path.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}
