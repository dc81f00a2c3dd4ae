//! # reframe-av
//!
//! ffmpeg/ffprobe plumbing for batch video conversion.
//!
//! This crate provides the pieces one conversion job is built from:
//! - Tool detection ([`Tools`]) for ffmpeg/ffprobe
//! - Frame counting via ffprobe packet counting ([`frame_count`])
//! - Encode command assembly with an explicit per-codec argument table
//!   ([`EncodeSettings`])
//! - A job-scoped unix-socket progress channel that turns ffmpeg's
//!   `-progress` stream into typed events ([`ProgressChannel`])
//!
//! ## Example
//!
//! ```no_run
//! use reframe_av::{frame_count, Tools};
//!
//! # async fn example() -> reframe_av::Result<()> {
//! let tools = Tools::locate()?;
//! let frames = frame_count(&tools.ffprobe, "/media/clip.avi".as_ref()).await?;
//! println!("{frames} frames to convert");
//! # Ok(())
//! # }
//! ```

mod encode;
mod error;
mod job;
mod probe;
mod progress;
mod tools;

pub use encode::{default_codec_args, EncodeSettings};
pub use error::{Error, Result};
pub use job::{Job, SizedJob};
pub use probe::frame_count;
pub use progress::{FrameProgress, ProgressChannel};
pub use tools::{require_tool, Tools};
