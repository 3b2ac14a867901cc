use crossbeam_channel::Sender;
use tracing::{info, warn};

use crate::media::MediaReference;
use crate::storage::{CopiedAsset, CopyOutcome};

use super::phase::MigrationPhase;
use super::runner::MigrationReport;

/// Events emitted while a migration runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Phase {
        phase: MigrationPhase,
        message: String,
    },
    ReferenceFound {
        reference: MediaReference,
    },
    AssetCopied(CopiedAsset),
    UriRewritten {
        uri: String,
    },
    Completed(Box<MigrationReport>),
    Failed {
        phase: MigrationPhase,
        error: String,
        recoverable: bool,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Narrates the run through tracing, one line per step.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => info!(%phase, "{}", message),
            ProgressEvent::ReferenceFound { reference } => info!("Found media: {}", reference),
            ProgressEvent::AssetCopied(asset) => match asset.outcome {
                CopyOutcome::Skipped => {
                    info!("Already copied: {}", asset.destination.display())
                }
                CopyOutcome::Pyramid {
                    tile_directory,
                    tiles,
                } => info!(
                    "Copied pyramid {} ({} tiles in {})",
                    asset.destination.display(),
                    tiles,
                    tile_directory.display()
                ),
                CopyOutcome::Copied { bytes } => {
                    info!("Copied {} ({} bytes)", asset.destination.display(), bytes)
                }
            },
            ProgressEvent::UriRewritten { uri } => info!("Rewrote URI: {}", uri),
            ProgressEvent::Completed(report) => info!(
                "State migration complete: {} ({} media files)",
                report.new_state_path.display(),
                report.assets.len()
            ),
            ProgressEvent::Failed {
                phase,
                error,
                recoverable,
            } => warn!(%phase, recoverable, "Migration stopped: {}", error),
        }
    }
}

/// Forwards events over a crossbeam channel to another thread.
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressReporter for ChannelProgress {
    fn report(&self, event: ProgressEvent) {
        // A front-end that stopped listening does not stop the run.
        if self.sender.send(event).is_err() {
            log::debug!("Progress receiver dropped; event discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_channel_progress_forwards_events() {
        let (tx, rx) = unbounded();
        let progress = ChannelProgress::new(tx);

        progress.report(ProgressEvent::UriRewritten {
            uri: "/new/Content/a.png".to_string(),
        });

        match rx.try_recv().unwrap() {
            ProgressEvent::UriRewritten { uri } => assert_eq!(uri, "/new/Content/a.png"),
            other => panic!("Unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_channel_progress_ignores_dropped_receiver() {
        let (tx, rx) = unbounded();
        drop(rx);
        ChannelProgress::new(tx).report(ProgressEvent::Phase {
            phase: MigrationPhase::Parsing,
            message: "Parsing".to_string(),
        });
    }
}
