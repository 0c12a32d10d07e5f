use thiserror::Error;

use crate::recorder::RecorderError;

/// Failures surfaced by the simulation.
///
/// `InvalidConfig` is only ever produced while constructing a simulation;
/// `ResourceExhaustion` ends a run that was already in progress.
/// `Interrupted` is raised by the ensemble runner when the stop flag cut
/// any of its runs short; a single [`crate::Simulation`] reports a stop
/// through its `RunOutcome` instead.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("recorder rejected frame at epoch {epoch}: {source}")]
    ResourceExhaustion {
        epoch: u64,
        #[source]
        source: RecorderError,
    },

    #[error("interrupted: {completed} of {total} runs completed")]
    Interrupted { completed: usize, total: usize },
}

impl From<validator::ValidationErrors> for SimError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidConfig(format!("{errors}"))
    }
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
