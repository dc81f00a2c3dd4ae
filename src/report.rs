//! Terminal rendering and outcome aggregation.
//!
//! One progress bar per sized job, driven by the pool's event stream. The
//! reporter also tallies the final counts; it is the only consumer of
//! [`PoolEvent`]s.

use crate::pool::PoolEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use reframe_av::SizedJob;
use tokio::sync::mpsc;
use tracing::warn;

/// Final counts for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Jobs that converted successfully.
    pub converted: usize,
    /// Jobs whose conversion failed.
    pub failed: usize,
    /// Jobs dropped at probe time.
    pub skipped: usize,
}

/// Renders per-job progress bars and accumulates the run summary.
pub struct Reporter {
    bars: Vec<ProgressBar>,
    // Keeps the bar group alive for the reporter's lifetime.
    _multi: MultiProgress,
}

impl Reporter {
    /// Create one bar per sized job, labeled with the output file name.
    pub fn new(jobs: &[SizedJob]) -> Self {
        let multi = MultiProgress::new();
        let bars = jobs
            .iter()
            .map(|sized| {
                let name = sized
                    .job
                    .output_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| sized.job.output_path.display().to_string());
                multi.add(
                    ProgressBar::new(sized.frame_count)
                        .with_style(bar_style())
                        .with_message(name),
                )
            })
            .collect();
        Self {
            bars,
            _multi: multi,
        }
    }

    /// Consume pool events until the pool closes the channel, then return
    /// the summary. `skipped` is the probe-time drop count.
    pub async fn drive(self, mut events: mpsc::Receiver<PoolEvent>, skipped: usize) -> Summary {
        let mut converted = 0;
        let mut failed = 0;

        while let Some(event) = events.recv().await {
            match event {
                PoolEvent::Progress { job, frames, .. } => {
                    self.bars[job].set_position(frames);
                }
                PoolEvent::Done { job, result } => match result {
                    Ok(()) => {
                        converted += 1;
                        self.bars[job].finish();
                    }
                    Err(e) => {
                        failed += 1;
                        warn!("conversion failed: {e}");
                        self.bars[job].abandon_with_message("failed");
                    }
                },
            }
        }

        Summary {
            converted,
            failed,
            skipped,
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{msg:.cyan} {percent:>3}% {bar:40.green/cyan} {pos}/{len} ({eta} left)",
    )
    .unwrap()
}
