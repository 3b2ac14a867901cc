pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod request;
pub mod state;
pub mod storage;
pub mod validate;
pub mod worker;

pub use config::{load_config, load_config_from_str, MigrationConfig};
pub use error::{
    ConfigError, Field, MigrateError, Result, StateError, StorageError, ValidationError,
    ValidationErrorKind, WorkerError,
};
pub use media::MediaReference;
pub use pipeline::{Migration, MigrationPhase, MigrationReport, ProgressEvent, ProgressReporter};
pub use request::{MigrationRequest, ValidatedRequest};
pub use storage::{AssetCopier, CopiedAsset, CopyOutcome};
pub use worker::{MigrationHandle, MigrationWorker};
