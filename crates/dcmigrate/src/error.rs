use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::MigrationPhase;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("State file error: {0}")]
    State(#[from] StateError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Migration run already finished ({phase})")]
    RunFinished { phase: MigrationPhase },
}

impl MigrateError {
    /// Validation failures leave nothing on disk and can be corrected and retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MigrateError::Validation(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// The input field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    OldState,
    NewStateName,
    OutputDir,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::OldState => "old state file",
            Field::NewStateName => "new state file",
            Field::OutputDir => "output directory",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    EmptyInput,
    NotFound,
    BadExtension,
    InvalidCharacters,
    NotWritable,
    SameAsSource,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: Field,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: Field, kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read state file '{path}': {source}")]
    ReadState {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed state document '{path}': {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Failed to write state file '{path}': {reason}")]
    WriteError { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Referenced media does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("Failed to copy '{path}': {source}")]
    CopyError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn copy(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::CopyError {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("A migration is already in progress")]
    Busy,

    #[error("Failed to spawn migration thread: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Migration thread panicked")]
    Panicked,
}

pub type Result<T> = std::result::Result<T, MigrateError>;
