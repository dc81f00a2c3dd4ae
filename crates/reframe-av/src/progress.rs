//! Per-job progress channels.
//!
//! ffmpeg's `-progress` output is an append-only stream of `key=value`
//! lines. For each job we bind a uniquely named unix socket, hand its
//! address to ffmpeg, and parse the stream on a dedicated task into typed
//! [`FrameProgress`] events. The transport delivers arbitrary chunks, not
//! whole lines, so the accumulated buffer is re-scanned on every read and
//! the most recent `frame=` match wins. The literal `progress=end` sentinel
//! produces one final event clamped to the job's total, after which the
//! channel closes and the socket is removed.
//!
//! Stream errors only degrade progress visibility; the process exit code
//! remains the authoritative outcome, so the reader logs at debug level and
//! closes without a completion event.

use crate::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::io::AsyncReadExt;
use tokio::net::UnixListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Bound on buffered, not-yet-rendered progress events per job.
const EVENT_CAPACITY: usize = 64;

/// Literal marker ffmpeg appends when it has finished reporting.
const END_SENTINEL: &str = "progress=end";

/// One progress observation for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameProgress {
    /// Frames processed so far; non-decreasing within a channel.
    pub frames: u64,
    /// Total frames for the job.
    pub total: u64,
}

/// A job-scoped progress endpoint.
///
/// Created with [`open`](Self::open), which also returns the event stream.
/// The caller passes [`url`](Self::url) to ffmpeg as its `-progress`
/// destination, then calls [`close`](Self::close) once the process has
/// exited. Close unblocks a reader still waiting for a connection (the
/// process may die before connecting) and joins the reader task, which
/// guarantees the socket file is gone before the job's terminal result.
pub struct ProgressChannel {
    socket_path: PathBuf,
    stop: Option<oneshot::Sender<()>>,
    reader: JoinHandle<()>,
}

impl ProgressChannel {
    /// Bind a fresh socket and spawn the reader task for a job of
    /// `total_frames` frames. Must be called from within a tokio runtime.
    pub fn open(total_frames: u64) -> Result<(Self, mpsc::Receiver<FrameProgress>)> {
        let socket_path = std::env::temp_dir().join(format!("reframe-{}.sock", Uuid::new_v4()));
        let listener = UnixListener::bind(&socket_path)?;
        let guard = SocketGuard(socket_path.clone());

        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        let (stop_tx, stop_rx) = oneshot::channel();
        let reader = tokio::spawn(pump_events(listener, guard, total_frames, events_tx, stop_rx));

        Ok((
            Self {
                socket_path,
                stop: Some(stop_tx),
                reader,
            },
            events_rx,
        ))
    }

    /// The socket address in the form ffmpeg's `-progress` flag expects.
    pub fn url(&self) -> String {
        format!("unix://{}", self.socket_path.display())
    }

    /// Filesystem path of the socket.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Release the endpoint.
    ///
    /// Signals a reader still in accept to give up, then waits for the
    /// reader to finish. A connected reader is left to drain to EOF, which
    /// is guaranteed once the writing process has exited. The reader can
    /// be blocked sending into a full event channel, so callers must keep
    /// consuming the event receiver concurrently while awaiting close.
    pub async fn close(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = self.reader.await;
    }
}

/// Removes the socket file when the reader task ends, on every exit path.
struct SocketGuard(PathBuf);

impl Drop for SocketGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn frame_regex() -> &'static Regex {
    static FRAME_RE: OnceLock<Regex> = OnceLock::new();
    FRAME_RE.get_or_init(|| Regex::new(r"frame=\s*(\d+)").expect("frame pattern is valid"))
}

/// Most recent `frame=` value in the accumulated buffer, if any.
fn last_frame(data: &str) -> Option<u64> {
    frame_regex()
        .captures_iter(data)
        .last()
        .and_then(|captures| captures[1].parse().ok())
}

async fn pump_events(
    listener: UnixListener,
    _guard: SocketGuard,
    total: u64,
    events: mpsc::Sender<FrameProgress>,
    mut stop: oneshot::Receiver<()>,
) {
    // The converter connects exactly once. Accept can outlive a process
    // that dies before connecting, so it races the stop signal.
    let mut stream = tokio::select! {
        accepted = listener.accept() => match accepted {
            Ok((stream, _)) => stream,
            Err(e) => {
                debug!("progress accept failed: {e}");
                return;
            }
        },
        _ = &mut stop => return,
    };
    drop(listener);

    let mut chunk = [0u8; 4096];
    let mut data = String::new();

    loop {
        let read = match stream.read(&mut chunk).await {
            // EOF without the end sentinel: the process exit code decides.
            Ok(0) => return,
            Ok(read) => read,
            Err(e) => {
                debug!("progress read failed: {e}");
                return;
            }
        };
        data.push_str(&String::from_utf8_lossy(&chunk[..read]));

        if data.contains(END_SENTINEL) {
            let _ = events
                .send(FrameProgress {
                    frames: total,
                    total,
                })
                .await;
            return;
        }

        if let Some(frames) = last_frame(&data) {
            if events.send(FrameProgress { frames, total }).await.is_err() {
                // Receiver gone; nobody is watching this job anymore.
                return;
            }
        }
    }
}
