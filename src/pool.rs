//! Probe and conversion worker pools.
//!
//! Both pools follow the same shape: a fixed number of tokio tasks drain a
//! shared queue, and each job produces exactly one terminal outcome. Probe
//! workers size jobs with ffprobe; conversion workers drive one ffmpeg
//! process each, bridged to the caller through [`PoolEvent`]s.
//!
//! Failures are isolated per job: a job that cannot be probed is skipped, a
//! conversion that fails carries its error in its terminal event, and
//! neither aborts sibling jobs. There is no timeout or cancellation; a
//! stalled ffmpeg blocks its worker until the process goes away.

use anyhow::{bail, Result};
use reframe_av::{
    frame_count, EncodeSettings, Error, FrameProgress, Job, ProgressChannel, SizedJob, Tools,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::ChildStderr;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

/// Dense index of a job within one run, used to correlate events.
pub type JobId = usize;

/// An observation surfaced by the conversion pool.
#[derive(Debug)]
pub enum PoolEvent {
    /// A job reported a new position.
    Progress { job: JobId, frames: u64, total: u64 },
    /// A job finished; exactly one per job, always after its last
    /// `Progress` event.
    Done {
        job: JobId,
        result: reframe_av::Result<()>,
    },
}

/// What the probe pool made of the raw job list.
#[derive(Debug)]
pub struct ProbeOutcome {
    /// Jobs whose probe succeeded, ready for conversion.
    pub sized: Vec<SizedJob>,
    /// Jobs excluded from the run, with the probe error.
    pub skipped: Vec<(Job, Error)>,
}

type ProbeResult = std::result::Result<SizedJob, (Job, Error)>;

/// Probe every job's frame count with up to `workers` concurrent ffprobe
/// invocations.
///
/// Every input job ends up in exactly one of the two outcome lists; a
/// failed probe never leaks a zero-frame job into the sized list. Result
/// order is completion order, not input order.
pub async fn probe_jobs(tools: &Tools, jobs: Vec<Job>, workers: usize) -> ProbeOutcome {
    let mut outcome = ProbeOutcome {
        sized: Vec::with_capacity(jobs.len()),
        skipped: Vec::new(),
    };
    if jobs.is_empty() {
        return outcome;
    }

    let workers = workers.clamp(1, jobs.len());
    let (results_tx, mut results_rx) = mpsc::channel(jobs.len());
    let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            tokio::spawn(probe_worker(
                Arc::clone(&queue),
                tools.ffprobe.clone(),
                results_tx.clone(),
            ))
        })
        .collect();
    drop(results_tx);

    while let Some(result) = results_rx.recv().await {
        match result {
            Ok(sized) => outcome.sized.push(sized),
            Err(skipped) => outcome.skipped.push(skipped),
        }
    }
    for handle in handles {
        let _ = handle.await;
    }

    outcome
}

async fn probe_worker(
    queue: Arc<Mutex<VecDeque<Job>>>,
    ffprobe: PathBuf,
    results: mpsc::Sender<ProbeResult>,
) {
    loop {
        let next = queue.lock().await.pop_front();
        let Some(job) = next else { return };

        // Exactly one outcome per job, success or failure.
        let result = match frame_count(&ffprobe, &job.input_path).await {
            Ok(frames) => Ok(SizedJob {
                job,
                frame_count: frames,
            }),
            Err(e) => Err((job, e)),
        };
        if results.send(result).await.is_err() {
            return;
        }
    }
}

/// Convert every sized job with up to `workers` concurrent ffmpeg
/// processes, surfacing progress and terminal results through `events`.
///
/// Returns once every job has emitted its terminal [`PoolEvent::Done`] and
/// all workers have stopped. An empty job list returns immediately for any
/// worker count; a zero worker count with pending jobs is rejected.
pub async fn run_jobs(
    tools: Tools,
    settings: EncodeSettings,
    jobs: Vec<SizedJob>,
    workers: usize,
    events: mpsc::Sender<PoolEvent>,
) -> Result<()> {
    if jobs.is_empty() {
        return Ok(());
    }
    if workers == 0 {
        bail!("worker count must be at least 1");
    }

    let workers = workers.min(jobs.len());
    let queue = Arc::new(Mutex::new(
        jobs.into_iter().enumerate().collect::<VecDeque<_>>(),
    ));
    let settings = Arc::new(settings);

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            tokio::spawn(convert_worker(
                Arc::clone(&queue),
                tools.ffmpeg.clone(),
                Arc::clone(&settings),
                events.clone(),
            ))
        })
        .collect();
    drop(events);

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

async fn convert_worker(
    queue: Arc<Mutex<VecDeque<(JobId, SizedJob)>>>,
    ffmpeg: PathBuf,
    settings: Arc<EncodeSettings>,
    events: mpsc::Sender<PoolEvent>,
) {
    loop {
        let next = queue.lock().await.pop_front();
        let Some((id, sized)) = next else { return };

        debug!(input = %sized.job.input_path.display(), "starting conversion");
        let result = convert_one(&ffmpeg, &settings, id, &sized, &events).await;
        if events.send(PoolEvent::Done { job: id, result }).await.is_err() {
            // Nobody is listening anymore; stop taking work.
            return;
        }
    }
}

/// Run one job to completion: open its progress channel, spawn ffmpeg with
/// the channel's socket address, forward progress events while awaiting
/// exit, and release the endpoint before reporting the outcome.
async fn convert_one(
    ffmpeg: &Path,
    settings: &EncodeSettings,
    id: JobId,
    sized: &SizedJob,
    events: &mpsc::Sender<PoolEvent>,
) -> reframe_av::Result<()> {
    let (channel, mut progress) = ProgressChannel::open(sized.frame_count)?;

    let mut child = match settings.command(ffmpeg, &sized.job, &channel.url()).spawn() {
        Ok(child) => child,
        Err(e) => {
            channel.close().await;
            return Err(Error::spawn("ffmpeg", e));
        }
    };
    let stderr_task = tokio::spawn(read_stderr(child.stderr.take()));

    let status = loop {
        tokio::select! {
            event = progress.recv() => match event {
                Some(FrameProgress { frames, total }) => {
                    let _ = events
                        .send(PoolEvent::Progress { job: id, frames, total })
                        .await;
                }
                // Progress stream closed first; just wait for the exit code.
                None => break child.wait().await,
            },
            exited = child.wait() => break exited,
        }
    };

    // Release the endpoint while flushing progress that raced the exit
    // (the completion event in particular). The reader can still be
    // blocked sending into a full event channel, so the drain runs
    // concurrently with the close; both finish before the terminal
    // result is emitted.
    let drain = async {
        while let Some(FrameProgress { frames, total }) = progress.recv().await {
            let _ = events
                .send(PoolEvent::Progress { job: id, frames, total })
                .await;
        }
    };
    tokio::join!(channel.close(), drain);

    let stderr = stderr_task.await.unwrap_or_default();
    let status = status?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::ProcessFailed {
            status,
            stderr: stderr.trim().to_string(),
        })
    }
}

async fn read_stderr(stderr: Option<ChildStderr>) -> String {
    let Some(mut stderr) = stderr else {
        return String::new();
    };
    let mut output = String::new();
    let _ = stderr.read_to_string(&mut output).await;
    output
}
