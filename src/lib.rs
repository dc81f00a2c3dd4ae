//! reframe: batch video conversion with parallel ffmpeg workers.
//!
//! The library side of the CLI: input/output path derivation, the probe and
//! conversion pools, and progress/outcome reporting. The ffmpeg plumbing
//! itself lives in the `reframe-av` crate.

pub mod paths;
pub mod pool;
pub mod report;
