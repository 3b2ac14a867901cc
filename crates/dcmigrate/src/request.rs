use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::MigrationConfig;
use crate::error::ValidationError;
use crate::validate;

/// The three operator inputs for one migration run, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRequest {
    pub old_state: String,
    pub new_state_name: String,
    pub output_dir: String,
}

impl MigrationRequest {
    pub fn new(
        old_state: impl Into<String>,
        new_state_name: impl Into<String>,
        output_dir: impl Into<String>,
    ) -> Self {
        Self {
            old_state: old_state.into(),
            new_state_name: new_state_name.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Request pre-filled from the config's field defaults.
    pub fn from_defaults(config: &MigrationConfig) -> Self {
        let defaults = &config.defaults;
        Self {
            old_state: defaults.old_state.clone().unwrap_or_default(),
            new_state_name: defaults.new_state_name.clone().unwrap_or_default(),
            output_dir: defaults.output_dir.clone().unwrap_or_default(),
        }
    }

    /// Runs the field checks in form order and stops at the first failure.
    pub fn validate(&self, config: &MigrationConfig) -> Result<ValidatedRequest, ValidationError> {
        validate::validate_old_state(&self.old_state, &config.state_extension)?;
        validate::validate_new_state_name(&self.new_state_name)?;
        validate::validate_output_dir(&self.output_dir)?;

        let old_state = PathBuf::from(&self.old_state);
        let new_state_path = Path::new(&self.output_dir).join(&self.new_state_name);
        validate::validate_distinct_target(&old_state, &new_state_path)?;

        Ok(ValidatedRequest {
            old_state,
            output_dir: PathBuf::from(&self.output_dir),
            new_state_path,
            content_dir: Path::new(&self.output_dir).join(&config.content_directory),
        })
    }
}

/// A request whose fields passed validation, with derived output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    old_state: PathBuf,
    output_dir: PathBuf,
    new_state_path: PathBuf,
    content_dir: PathBuf,
}

impl ValidatedRequest {
    pub fn old_state_path(&self) -> &Path {
        &self.old_state
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn new_state_path(&self) -> &Path {
        &self.new_state_path
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }
}
