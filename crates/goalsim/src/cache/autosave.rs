//! Debounced background persistence.
//!
//! The scheduler thread sits on a channel of dirty notifications. Each
//! notification arms (or re-arms) a save deadline one interval in the
//! future, so a burst of writes collapses into a single save after the
//! cache goes quiet. Shutdown flushes a final save if anything is still
//! dirty; dropping the handle shuts down implicitly.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::store::SimulationCache;

#[derive(Debug)]
enum SaveRequest {
    Dirty,
    Shutdown,
}

/// Handle to the background save scheduler
pub struct AutosaveHandle {
    request_tx: Sender<SaveRequest>,
    thread: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Spawn the scheduler for `cache`, saving to `path` after `interval`
    /// of quiet following a dirty notification
    pub fn start<V>(cache: Arc<SimulationCache<V>>, path: PathBuf, interval: Duration) -> Self
    where
        V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let (request_tx, request_rx) = channel();
        let thread = thread::spawn(move || {
            run_scheduler(&cache, &path, interval, &request_rx);
        });
        Self {
            request_tx,
            thread: Some(thread),
        }
    }

    /// Notify the scheduler that the cache became dirty; resets any
    /// pending save deadline
    pub fn mark_dirty(&self) {
        let _ = self.request_tx.send(SaveRequest::Dirty);
    }

    /// Stop the scheduler, flushing a final save if the cache is dirty
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.request_tx.send(SaveRequest::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

fn save_if_dirty<V>(cache: &SimulationCache<V>, path: &std::path::Path)
where
    V: Clone + Serialize + DeserializeOwned,
{
    if !cache.is_dirty() {
        return;
    }
    match cache.save(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "cache snapshot saved"),
        // Non-fatal: the cache stays dirty and a later deadline retries
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "cache save failed"),
    }
}

fn run_scheduler<V>(
    cache: &SimulationCache<V>,
    path: &std::path::Path,
    interval: Duration,
    request_rx: &Receiver<SaveRequest>,
) where
    V: Clone + Serialize + DeserializeOwned,
{
    let mut deadline: Option<Instant> = None;

    loop {
        let request = match deadline {
            // Armed: wait until the deadline, treating a timeout as "due"
            Some(due) => {
                let timeout = due.saturating_duration_since(Instant::now());
                match request_rx.recv_timeout(timeout) {
                    Ok(request) => Some(request),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            // Idle: block until something happens
            None => match request_rx.recv() {
                Ok(request) => Some(request),
                Err(_) => break,
            },
        };

        match request {
            Some(SaveRequest::Dirty) => {
                deadline = Some(Instant::now() + interval);
            }
            Some(SaveRequest::Shutdown) => {
                save_if_dirty(cache, path);
                return;
            }
            None => {
                save_if_dirty(cache, path);
                deadline = None;
            }
        }
    }

    // Channel dropped without an explicit shutdown; still flush
    save_if_dirty(cache, path);
}
