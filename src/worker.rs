//! Off-thread exposure grids.
//!
//! A [`GridWorker`] owns one background thread fed through a job channel.
//! Every job carries a request id and every message back carries the same
//! id. Submitting again does not abort the job in flight; the caller just
//! stops listening to it, and messages for anything but the latest id are
//! dropped on receipt.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::OffloadError;
use crate::grid::exposure_grid_with_progress;
use crate::types::{ExposureGrid, GridRequest};

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerMessage {
    Progress { id: RequestId, fraction: f64 },
    Completed { id: RequestId, grid: Box<ExposureGrid> },
}

impl WorkerMessage {
    pub fn id(&self) -> RequestId {
        match self {
            WorkerMessage::Progress { id, .. } | WorkerMessage::Completed { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    Progress(f64),
    Completed(ExposureGrid),
}

struct Job {
    id: RequestId,
    request: GridRequest,
}

pub struct GridWorker {
    jobs: Option<Sender<Job>>,
    messages: Receiver<WorkerMessage>,
    handle: Option<JoinHandle<()>>,
    next_id: RequestId,
    latest: Option<RequestId>,
}

impl GridWorker {
    pub fn spawn() -> Result<Self, OffloadError> {
        let (job_tx, job_rx) = mpsc::channel();
        let (message_tx, message_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("exposure-grid".into())
            .spawn(move || run(job_rx, message_tx))?;
        info!("exposure worker started");
        Ok(Self {
            jobs: Some(job_tx),
            messages: message_rx,
            handle: Some(handle),
            next_id: 0,
            latest: None,
        })
    }

    /// Queues `request` and makes it the only one whose messages are delivered.
    pub fn submit(&mut self, request: GridRequest) -> Result<RequestId, OffloadError> {
        self.next_id += 1;
        let id = self.next_id;
        let jobs = self.jobs.as_ref().ok_or(OffloadError::Disconnected)?;
        jobs.send(Job { id, request })
            .map_err(|_| OffloadError::Disconnected)?;
        self.latest = Some(id);
        debug!(id, "exposure grid request submitted");
        Ok(id)
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest
    }

    fn accept(&self, message: WorkerMessage) -> Option<GridEvent> {
        if Some(message.id()) != self.latest {
            debug!(id = message.id(), latest = ?self.latest, "dropping stale worker message");
            return None;
        }
        Some(match message {
            WorkerMessage::Progress { fraction, .. } => GridEvent::Progress(fraction),
            WorkerMessage::Completed { grid, .. } => GridEvent::Completed(*grid),
        })
    }

    /// Blocks until the latest request reports something.
    pub fn next_event(&mut self) -> Result<GridEvent, OffloadError> {
        loop {
            let message = self
                .messages
                .recv()
                .map_err(|_| OffloadError::Disconnected)?;
            if let Some(event) = self.accept(message) {
                return Ok(event);
            }
        }
    }

    /// `Ok(None)` when nothing for the latest request is waiting yet.
    pub fn try_next_event(&mut self) -> Result<Option<GridEvent>, OffloadError> {
        loop {
            match self.messages.try_recv() {
                Ok(message) => {
                    if let Some(event) = self.accept(message) {
                        return Ok(Some(event));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(OffloadError::Disconnected),
            }
        }
    }

    pub fn wait_for_result<F>(&mut self, mut on_progress: F) -> Result<ExposureGrid, OffloadError>
    where
        F: FnMut(f64),
    {
        loop {
            match self.next_event()? {
                GridEvent::Progress(fraction) => on_progress(fraction),
                GridEvent::Completed(grid) => return Ok(grid),
            }
        }
    }

    /// Closes the job channel and joins the thread once the job in flight ends.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        drop(self.jobs.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("exposure worker panicked");
            } else {
                info!("exposure worker stopped");
            }
        }
    }
}

impl Drop for GridWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(jobs: Receiver<Job>, messages: Sender<WorkerMessage>) {
    while let Ok(mut job) = jobs.recv() {
        // Jobs queued behind a newer one would only be discarded.
        while let Ok(newer) = jobs.try_recv() {
            debug!(skipped = job.id, "superseded before start");
            job = newer;
        }

        let id = job.id;
        let grid = exposure_grid_with_progress(&job.request, |fraction| {
            let _ = messages.send(WorkerMessage::Progress { id, fraction });
        });
        if messages
            .send(WorkerMessage::Completed {
                id,
                grid: Box::new(grid),
            })
            .is_err()
        {
            break;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Synchronous,
    Offloaded,
}

/// Owned handle deciding where grids are computed. Results are the same
/// either way; only the thread differs.
pub struct ExposureEngine {
    worker: Option<GridWorker>,
}

impl ExposureEngine {
    pub fn synchronous() -> Self {
        Self { worker: None }
    }

    /// Falls back to synchronous mode when no thread can be spawned.
    pub fn offloaded() -> Self {
        match GridWorker::spawn() {
            Ok(worker) => Self {
                worker: Some(worker),
            },
            Err(err) => {
                warn!(error = %err, "exposure worker unavailable, running synchronously");
                Self::synchronous()
            }
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        if self.worker.is_some() {
            ExecutionMode::Offloaded
        } else {
            ExecutionMode::Synchronous
        }
    }

    pub fn worker_mut(&mut self) -> Option<&mut GridWorker> {
        self.worker.as_mut()
    }

    pub fn calculate<F>(&mut self, request: &GridRequest, mut on_progress: F) -> ExposureGrid
    where
        F: FnMut(f64),
    {
        // A worker lost midway restarts from zero here; keep what was
        // already reported from going backwards.
        let mut reported = 0.0_f64;
        let mut report = |fraction: f64| {
            reported = reported.max(fraction);
            on_progress(reported);
        };

        let offloaded = self
            .worker
            .as_mut()
            .map(|worker| worker.submit(request.clone()).and_then(|_| worker.wait_for_result(&mut report)));
        match offloaded {
            Some(Ok(grid)) => return grid,
            Some(Err(err)) => {
                warn!(error = %err, "exposure worker lost, running synchronously");
                self.worker = None;
            }
            None => {}
        }
        exposure_grid_with_progress(request, report)
    }

    pub fn shutdown(self) {
        if let Some(worker) = self.worker {
            worker.shutdown();
        }
    }
}
