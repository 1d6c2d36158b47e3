//! Chunked capture: run a `SegmentSource` on a dedicated thread and emit one
//! event per chunk boundary.
//!
//! The chunk duration is a first-class parameter, not a timer side effect.
//! The capture thread owns the source for its whole life because cpal streams
//! are not `Send`; callers hand in a factory closure that builds the source
//! in-thread.

use crate::error::{CaptureError, CaptureResult};
use crate::source::{AudioSegment, SegmentSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Events emitted by the capture thread. Consumers must not assume a fixed
/// segment size; a boundary carries whatever audio arrived in its window.
#[derive(Debug)]
pub enum CaptureEvent {
    Segment(AudioSegment),
    /// Clean end of capture: the source was closed and the device released.
    Stopped,
    /// Terminal device failure mid-session. No silent retry; the caller
    /// decides whether to start again.
    Failed(CaptureError),
}

/// Fixed-duration chunked capture over any `SegmentSource`.
pub struct ChunkedCapture {
    chunk: Duration,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ChunkedCapture {
    /// `chunk` is the segment boundary interval (default deployment: 5 s).
    pub fn new(chunk: Duration) -> Self {
        Self {
            chunk,
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// Start capturing. At most one active source per instance: returns
    /// `false` without side effects when already running.
    ///
    /// `make_source` runs on the capture thread, so `!Send` sources (cpal)
    /// are fine. Segments flow out through `tx`; the loop ends with one
    /// `Stopped` or `Failed` event.
    pub fn start<S, F>(&self, make_source: F, tx: mpsc::Sender<CaptureEvent>) -> bool
    where
        S: SegmentSource + 'static,
        F: FnOnce() -> CaptureResult<S> + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.stop.store(false, Ordering::SeqCst);

        let chunk = self.chunk;
        let running = Arc::clone(&self.running);
        let stop = Arc::clone(&self.stop);

        let handle = thread::spawn(move || {
            let mut source = match make_source().and_then(|mut s| s.open().map(|_| s)) {
                Ok(s) => s,
                Err(e) => {
                    error!(target: "scrivener::capture", "Capture source failed to open: {}", e);
                    let _ = tx.blocking_send(CaptureEvent::Failed(e));
                    running.store(false, Ordering::SeqCst);
                    return;
                }
            };
            info!(target: "scrivener::capture", "Capture started ({:?} chunks)", chunk);

            loop {
                match source.next_segment(chunk) {
                    Ok(Some(segment)) => {
                        // Empty windows (muted mic) produce no event.
                        if !segment.data.is_empty()
                            && tx.blocking_send(CaptureEvent::Segment(segment)).is_err()
                        {
                            warn!(target: "scrivener::capture", "Capture consumer gone, stopping");
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!(target: "scrivener::capture", "Capture failed: {}", e);
                        source.close();
                        let _ = tx.blocking_send(CaptureEvent::Failed(e));
                        running.store(false, Ordering::SeqCst);
                        return;
                    }
                }
                if stop.load(Ordering::SeqCst) {
                    // The window in flight when stop was requested has already
                    // been drained and emitted above, so nothing is lost.
                    break;
                }
            }

            source.close();
            let _ = tx.blocking_send(CaptureEvent::Stopped);
            running.store(false, Ordering::SeqCst);
            info!(target: "scrivener::capture", "Capture stopped");
        });

        *self.handle.lock().unwrap() = Some(handle);
        true
    }

    /// Stop capturing and wait for the final flush. Idempotent: repeated
    /// calls after the first are no-ops.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ChunkedCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
