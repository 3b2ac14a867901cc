use std::fmt;

use serde::Serialize;

/// Where a migration run currently is.
///
/// `Idle → Validating → Parsing → Copying → Rewriting → Done`. A validation
/// failure lands in `Aborted`, from which the run may be retried with new
/// input. Any later failure lands in `Failed`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MigrationPhase {
    Idle,
    Validating,
    Parsing,
    Copying,
    Rewriting,
    Done,
    Aborted,
    Failed { during: Step },
}

/// The phases that can fail fatally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Parsing,
    Copying,
    Rewriting,
}

impl MigrationPhase {
    pub fn can_start(&self) -> bool {
        matches!(self, MigrationPhase::Idle | MigrationPhase::Aborted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationPhase::Done | MigrationPhase::Failed { .. })
    }
}

impl From<Step> for MigrationPhase {
    fn from(step: Step) -> Self {
        match step {
            Step::Parsing => MigrationPhase::Parsing,
            Step::Copying => MigrationPhase::Copying,
            Step::Rewriting => MigrationPhase::Rewriting,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MigrationPhase::from(*self), f)
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationPhase::Idle => f.write_str("idle"),
            MigrationPhase::Validating => f.write_str("validating"),
            MigrationPhase::Parsing => f.write_str("parsing"),
            MigrationPhase::Copying => f.write_str("copying"),
            MigrationPhase::Rewriting => f.write_str("rewriting"),
            MigrationPhase::Done => f.write_str("done"),
            MigrationPhase::Aborted => f.write_str("aborted"),
            MigrationPhase::Failed { during } => write!(f, "failed while {}", during),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_idle_and_aborted_can_start() {
        assert!(MigrationPhase::Idle.can_start());
        assert!(MigrationPhase::Aborted.can_start());
        assert!(!MigrationPhase::Copying.can_start());
        assert!(!MigrationPhase::Done.can_start());
        assert!(!MigrationPhase::Failed {
            during: Step::Parsing
        }
        .can_start());
    }

    #[test]
    fn test_failed_display_names_step() {
        let phase = MigrationPhase::Failed {
            during: Step::Copying,
        };
        assert_eq!(phase.to_string(), "failed while copying");
        assert!(phase.is_terminal());
    }
}
