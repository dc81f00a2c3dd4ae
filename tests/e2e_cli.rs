//! CLI end-to-end tests.
//!
//! The binary is run against stub ffmpeg/ffprobe executables injected via
//! PATH, so no real media or encoder is needed.

mod common;

use assert_cmd::prelude::*;
use common::{stub_ffmpeg_ok, stub_ffprobe, write_stub};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn reframe_cmd() -> Command {
    Command::cargo_bin("reframe").unwrap()
}

/// A command whose PATH is replaced with the stub tool directory.
fn reframe_with_path(bin: &Path) -> Command {
    let mut cmd = reframe_cmd();
    cmd.env("PATH", bin);
    cmd
}

#[test]
fn test_cli_no_args_shows_usage() {
    reframe_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    reframe_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch video conversion"))
        .stdout(predicate::str::contains("--output-type"));
}

#[test]
fn test_cli_version_flag() {
    reframe_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reframe"));
}

#[test]
fn test_cli_requires_output_type() {
    let work = tempdir().unwrap();
    let input = work.path().join("a.avi");
    fs::write(&input, b"not really video").unwrap();

    reframe_cmd()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output-type"));
}

#[test]
fn test_cli_reports_missing_tools() {
    let empty = tempdir().unwrap();
    let work = tempdir().unwrap();
    let input = work.path().join("a.avi");
    fs::write(&input, b"x").unwrap();

    reframe_with_path(empty.path())
        .args([input.to_str().unwrap(), "-t", "mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tool not found"));
}

#[test]
fn test_cli_converts_files_with_stub_tools() {
    let bin = tempdir().unwrap();
    stub_ffprobe(bin.path(), 30);
    stub_ffmpeg_ok(bin.path());

    let work = tempdir().unwrap();
    let input = work.path().join("a.avi");
    fs::write(&input, b"x").unwrap();
    let out = work.path().join("out");

    reframe_with_path(bin.path())
        .args([
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-t",
            "mp4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("transcoding 1 file(s)"))
        .stdout(predicate::str::contains("converted 1 file(s) (0 failed, 0 skipped)"));

    // The output directory is created even though the stub writes nothing.
    assert!(out.is_dir());
}

#[test]
fn test_cli_expands_single_directory_input() {
    let bin = tempdir().unwrap();
    stub_ffprobe(bin.path(), 10);
    stub_ffmpeg_ok(bin.path());

    let work = tempdir().unwrap();
    let media = work.path().join("media");
    fs::create_dir(&media).unwrap();
    fs::write(media.join("a.avi"), b"x").unwrap();
    fs::write(media.join("b.mov"), b"x").unwrap();

    reframe_with_path(bin.path())
        .args([
            media.to_str().unwrap(),
            "-o",
            work.path().join("out").to_str().unwrap(),
            "-t",
            "mkv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("transcoding 2 file(s)"));
}

#[test]
fn test_cli_removes_socket_files_after_run() {
    let bin = tempdir().unwrap();
    stub_ffprobe(bin.path(), 10);
    stub_ffmpeg_ok(bin.path());

    let work = tempdir().unwrap();
    let media = work.path().join("media");
    fs::create_dir(&media).unwrap();
    for name in ["a.avi", "b.avi", "c.avi", "d.avi", "e.avi"] {
        fs::write(media.join(name), b"x").unwrap();
    }
    // A private scratch dir for the progress sockets, so the check cannot
    // race other tests sharing the system temp dir.
    let scratch = tempdir().unwrap();

    reframe_with_path(bin.path())
        .env("TMPDIR", scratch.path())
        .args([
            media.to_str().unwrap(),
            "-o",
            work.path().join("out").to_str().unwrap(),
            "-t",
            "mp4",
            "-l",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("converted 5 file(s)"));

    // Every job's progress socket is gone once its channel is released.
    let leftovers: Vec<_> = fs::read_dir(scratch.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".sock"))
        .collect();
    assert!(leftovers.is_empty(), "leftover sockets: {leftovers:?}");
}

#[test]
fn test_cli_counts_probe_failures_as_skipped() {
    let bin = tempdir().unwrap();
    write_stub(bin.path(), "ffprobe", "echo unparsable; exit 1");
    stub_ffmpeg_ok(bin.path());

    let work = tempdir().unwrap();
    let input = work.path().join("a.avi");
    fs::write(&input, b"x").unwrap();

    reframe_with_path(bin.path())
        .args([
            input.to_str().unwrap(),
            "-o",
            work.path().join("out").to_str().unwrap(),
            "-t",
            "mp4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("transcoding 0 file(s)"))
        .stdout(predicate::str::contains("(0 failed, 1 skipped)"));
}

#[test]
fn test_cli_exits_nonzero_when_a_conversion_fails() {
    let bin = tempdir().unwrap();
    stub_ffprobe(bin.path(), 10);
    write_stub(bin.path(), "ffmpeg", "echo encode blew up >&2; exit 1");

    let work = tempdir().unwrap();
    let input = work.path().join("a.avi");
    fs::write(&input, b"x").unwrap();

    reframe_with_path(bin.path())
        .args([
            input.to_str().unwrap(),
            "-o",
            work.path().join("out").to_str().unwrap(),
            "-t",
            "mp4",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("(1 failed, 0 skipped)"));
}

#[test]
fn test_cli_nonexistent_input_rejected() {
    let bin = tempdir().unwrap();
    stub_ffprobe(bin.path(), 10);
    stub_ffmpeg_ok(bin.path());

    reframe_with_path(bin.path())
        .args(["/no/such/file.avi", "-t", "mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
