pub mod context;
pub mod phase;
pub mod progress;
pub mod runner;

pub use context::MigrationContext;
pub use phase::MigrationPhase;
pub use progress::{ChannelProgress, LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::{Migration, MigrationReport};
