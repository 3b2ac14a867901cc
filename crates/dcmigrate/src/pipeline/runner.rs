use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::config::MigrationConfig;
use crate::error::{MigrateError, StateError};
use crate::request::MigrationRequest;
use crate::state;
use crate::storage::{AssetCopier, CopiedAsset};

use super::context::MigrationContext;
use super::phase::{MigrationPhase, Step};
use super::progress::{ProgressEvent, ProgressReporter};

/// Summary of a finished migration.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub old_state: PathBuf,
    pub new_state_path: PathBuf,
    pub content_dir: PathBuf,
    pub assets: Vec<CopiedAsset>,
    pub rewritten_uris: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// One migration run, driven through its phases by [`Migration::run`].
pub struct Migration {
    config: Arc<MigrationConfig>,
    request: MigrationRequest,
    phase: MigrationPhase,
}

impl Migration {
    pub fn new(config: Arc<MigrationConfig>, request: MigrationRequest) -> Self {
        Self {
            config,
            request,
            phase: MigrationPhase::Idle,
        }
    }

    pub fn phase(&self) -> MigrationPhase {
        self.phase
    }

    pub fn request(&self) -> &MigrationRequest {
        &self.request
    }

    /// Replaces the input after a validation failure and returns to `Idle`.
    pub fn retry_with(&mut self, request: MigrationRequest) -> Result<(), MigrateError> {
        if !self.phase.can_start() {
            return Err(MigrateError::RunFinished { phase: self.phase });
        }
        self.request = request;
        self.phase = MigrationPhase::Idle;
        Ok(())
    }

    /// Validates, parses, copies and rewrites. Stops at the first failure;
    /// nothing already copied is rolled back.
    pub fn run(
        &mut self,
        progress: &dyn ProgressReporter,
    ) -> Result<MigrationReport, MigrateError> {
        if !self.phase.can_start() {
            return Err(MigrateError::RunFinished { phase: self.phase });
        }

        let started_at = Utc::now();
        let _run_span = info_span!("migration",
            old_state = %self.request.old_state,
            output_dir = %self.request.output_dir,
        )
        .entered();

        // Validating
        let mut ctx = {
            let _step = info_span!("validate").entered();
            self.enter(MigrationPhase::Validating, progress, "Validating input...");
            match self.request.validate(&self.config) {
                Ok(validated) => MigrationContext::new(validated),
                Err(e) => {
                    self.phase = MigrationPhase::Aborted;
                    progress.report(ProgressEvent::Failed {
                        phase: MigrationPhase::Validating,
                        error: e.to_string(),
                        recoverable: true,
                    });
                    return Err(e.into());
                }
            }
        };

        // Parsing
        {
            let _step = info_span!("parse_state").entered();
            self.enter(MigrationPhase::Parsing, progress, "Parsing old state file XML...");
            if let Err(e) = self.step_parse(&mut ctx, progress) {
                return Err(self.fail(Step::Parsing, e, progress));
            }
        }

        // Copying
        {
            let _step = info_span!("copy_media").entered();
            self.enter(MigrationPhase::Copying, progress, "Populating output directory...");
            if let Err(e) = self.step_copy(&mut ctx, progress) {
                return Err(self.fail(Step::Copying, e, progress));
            }
        }

        // Rewriting
        {
            let _step = info_span!("rewrite_state").entered();
            self.enter(
                MigrationPhase::Rewriting,
                progress,
                "Updating new state file with output directory media...",
            );
            if let Err(e) = self.step_rewrite(&mut ctx, progress) {
                return Err(self.fail(Step::Rewriting, e, progress));
            }
        }

        let report = MigrationReport {
            old_state: ctx.request.old_state_path().to_path_buf(),
            new_state_path: ctx.request.new_state_path().to_path_buf(),
            content_dir: ctx.request.content_dir().to_path_buf(),
            assets: ctx.assets,
            rewritten_uris: ctx.rewritten_uris,
            started_at,
            finished_at: Utc::now(),
        };

        self.phase = MigrationPhase::Done;
        progress.report(ProgressEvent::Completed(Box::new(report.clone())));
        Ok(report)
    }

    fn enter(&mut self, phase: MigrationPhase, progress: &dyn ProgressReporter, message: &str) {
        debug!("Migration phase {} -> {}", self.phase, phase);
        self.phase = phase;
        progress.report(ProgressEvent::Phase {
            phase,
            message: message.to_string(),
        });
    }

    fn fail(
        &mut self,
        step: Step,
        error: MigrateError,
        progress: &dyn ProgressReporter,
    ) -> MigrateError {
        self.phase = MigrationPhase::Failed { during: step };
        progress.report(ProgressEvent::Failed {
            phase: step.into(),
            error: error.to_string(),
            recoverable: false,
        });
        error
    }

    fn step_parse(
        &self,
        ctx: &mut MigrationContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(), MigrateError> {
        ctx.references = state::parse_media_references(ctx.request.old_state_path())?;
        for reference in &ctx.references {
            progress.report(ProgressEvent::ReferenceFound {
                reference: reference.clone(),
            });
        }
        Ok(())
    }

    fn step_copy(
        &self,
        ctx: &mut MigrationContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(), MigrateError> {
        let copier = AssetCopier::new(ctx.request.content_dir(), &self.config);
        copier.prepare()?;

        let old_state = ctx.request.old_state_path();
        let new_state = ctx.request.new_state_path();
        std::fs::copy(old_state, new_state).map_err(|e| StateError::WriteError {
            path: new_state.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("New state file copied to {}", new_state.display());

        ctx.assets = copier.copy_all(&ctx.references, |asset| {
            progress.report(ProgressEvent::AssetCopied(asset.clone()))
        })?;
        Ok(())
    }

    fn step_rewrite(
        &self,
        ctx: &mut MigrationContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(), MigrateError> {
        ctx.rewritten_uris =
            state::rewrite_state_file(ctx.request.new_state_path(), ctx.request.content_dir())?;
        for uri in &ctx.rewritten_uris {
            progress.report(ProgressEvent::UriRewritten { uri: uri.clone() });
        }
        Ok(())
    }
}
