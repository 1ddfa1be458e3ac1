use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Trip not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// A batch that expected at least one success finished with none.
    #[error("{operation}: none of the {attempted} writes succeeded")]
    ZeroResult { operation: String, attempted: usize },

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, job number)
}

/// Warning raised when recurrence expansion hits its iteration cap.
///
/// Not returned as an `Err`: the expander hands back the partial sequence and
/// attaches this so callers can surface it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Recurrence expansion stopped after {limit} occurrences")]
pub struct SafetyLimitExceeded {
    pub limit: usize,
}
