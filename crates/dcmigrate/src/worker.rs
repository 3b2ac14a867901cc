//! Runs a migration on a background thread so a front-end can keep
//! servicing its event loop, and guarantees at most one run in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver};
use log::{debug, error, info};

use crate::config::MigrationConfig;
use crate::error::{MigrateError, WorkerError};
use crate::pipeline::{ChannelProgress, Migration, MigrationReport, ProgressEvent};
use crate::request::MigrationRequest;

pub struct MigrationWorker {
    config: Arc<MigrationConfig>,
    busy: Arc<AtomicBool>,
    event_capacity: Option<usize>,
}

impl MigrationWorker {
    pub fn new(config: Arc<MigrationConfig>) -> Self {
        Self {
            config,
            busy: Arc::new(AtomicBool::new(false)),
            event_capacity: None,
        }
    }

    /// Bounds the progress channel. With capacity 0 the run waits for the
    /// receiver on every event.
    pub fn with_event_capacity(config: Arc<MigrationConfig>, capacity: usize) -> Self {
        Self {
            event_capacity: Some(capacity),
            ..Self::new(config)
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Starts a run. Fails with [`WorkerError::Busy`] while another run
    /// submitted to this worker has not finished.
    pub fn submit(&self, request: MigrationRequest) -> Result<MigrationHandle, WorkerError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WorkerError::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (sender, events) = match self.event_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let config = Arc::clone(&self.config);

        let thread = thread::Builder::new()
            .name("dcmigrate-run".to_string())
            .spawn(move || {
                let _guard = guard;
                debug!("Migration thread started");
                let progress = ChannelProgress::new(sender);
                let mut migration = Migration::new(config, request);
                let result = migration.run(&progress);
                debug!("Migration thread finished in phase {}", migration.phase());
                result
            })
            .map_err(WorkerError::SpawnFailed)?;

        info!("Migration submitted");
        Ok(MigrationHandle { events, thread })
    }
}

/// Clears the busy flag when the run thread exits, including by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct MigrationHandle {
    events: Receiver<ProgressEvent>,
    thread: JoinHandle<Result<MigrationReport, MigrateError>>,
}

impl MigrationHandle {
    /// Progress events; the channel disconnects when the run ends.
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the run and returns its outcome. Events not yet received
    /// are dropped.
    pub fn join(self) -> Result<MigrationReport, MigrateError> {
        drop(self.events);
        match self.thread.join() {
            Ok(result) => result,
            Err(_) => {
                error!("Migration thread panicked");
                Err(WorkerError::Panicked.into())
            }
        }
    }
}
