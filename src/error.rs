use thiserror::Error;

/// Failures at the collaborator layer (file ingestion, export, HTTP payloads).
///
/// The allocation core itself never returns an error: irregular business data is
/// degraded and reported through [`crate::allocation::AllocationNotice`] instead.
#[derive(Debug, Error)]
pub enum SeatingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A column the sheet must provide could not be detected in the header row.
    #[error("input must contain a {0} column")]
    MissingColumn(&'static str),

    #[error("no rooms with numeric row and column counts found")]
    NoRooms,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upload {0} not found or expired")]
    UnknownUpload(String),
}

impl SeatingError {
    /// True when the caller sent something unusable, as opposed to a server-side fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SeatingError::Csv(_)
                | SeatingError::Json(_)
                | SeatingError::MissingColumn(_)
                | SeatingError::NoRooms
                | SeatingError::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SeatingError>;
