//! Input discovery and output path derivation.

use anyhow::{bail, Context, Result};
use reframe_av::Job;
use std::path::{Path, PathBuf};

/// Resolve the CLI's input arguments into a flat list of files.
///
/// A single argument naming a directory expands to the files directly inside
/// it (no recursion). With multiple arguments, directories are rejected.
pub fn collect_input_paths(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if let [only] = args {
        if only.is_dir() {
            return files_in_dir(only);
        }
    }

    let mut inputs = Vec::with_capacity(args.len());
    for arg in args {
        if arg.is_dir() {
            bail!(
                "'{}' is a directory; use a single directory or a list of files as input",
                arg.display()
            );
        }
        if !arg.is_file() {
            bail!("input file not found: '{}'", arg.display());
        }
        inputs.push(absolute(arg)?);
    }
    Ok(inputs)
}

/// Pair every input with its output path: the output directory joined with
/// the input's file name, extension rewritten to `output_type`.
///
/// Duplicate inputs stay independent jobs.
pub fn derive_jobs(output_dir: &Path, inputs: &[PathBuf], output_type: &str) -> Vec<Job> {
    inputs
        .iter()
        .map(|input| {
            let file_name = input.file_name().unwrap_or(input.as_os_str());
            let output = output_dir.join(file_name).with_extension(output_type);
            Job::new(input.clone(), output)
        })
        .collect()
}

fn files_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("could not read input directory '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            continue;
        }
        files.push(absolute(&path)?);
    }
    // Directory iteration order is unspecified; sort for stable job order.
    files.sort();
    Ok(files)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("could not resolve path '{}'", path.display()))
}
