use thiserror::Error;

/// Reasons a spawn cycle produced no agent. None of these are fatal: the
/// director logs them and tries again on its next cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("no valid spawn position found after {attempts} attempts")]
    NoValidPositionFound { attempts: u32 },
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}
