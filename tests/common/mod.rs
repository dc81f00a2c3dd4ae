//! Stub ffmpeg/ffprobe executables for integration tests.
//!
//! Real conversions need real media and a real ffmpeg; the pool and CLI
//! contracts do not. These helpers drop small shell scripts into a temp
//! directory so the executable paths (or PATH itself) can point at them.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// An ffprobe stand-in that reports `frames` for every input.
pub fn stub_ffprobe(dir: &Path, frames: u64) -> PathBuf {
    write_stub(dir, "ffprobe", &format!("echo {frames}"))
}

/// An ffmpeg stand-in that succeeds without doing anything.
pub fn stub_ffmpeg_ok(dir: &Path) -> PathBuf {
    write_stub(dir, "ffmpeg", "exit 0")
}

/// An ffmpeg stand-in that fails for any invocation whose arguments mention
/// `marker`, and succeeds otherwise.
pub fn stub_ffmpeg_failing_on(dir: &Path, marker: &str) -> PathBuf {
    write_stub(
        dir,
        "ffmpeg",
        &format!(
            r#"for arg in "$@"; do
  case "$arg" in
    *{marker}*) echo "simulated encode failure" >&2; exit 3 ;;
  esac
done
exit 0"#
        ),
    )
}
