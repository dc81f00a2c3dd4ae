use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reframe")]
#[command(author, version, about = "Batch video conversion with parallel ffmpeg workers")]
pub struct Cli {
    /// Files to convert, or a single directory of files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the converted files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File extension of the converted files
    #[arg(short = 't', long)]
    pub output_type: String,

    /// ffmpeg video codec (defaults to libx265 for mp4 output)
    #[arg(short, long)]
    pub codec: Option<String>,

    /// Number of concurrent ffmpeg processes
    #[arg(short, long, default_value_t = 4)]
    pub limit: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
