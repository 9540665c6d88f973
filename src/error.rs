use thiserror::Error;

/// Failure of the outbound reservation call.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Reservation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Reservation endpoint responded with status {status}")]
    Rejected { status: u16 },

    #[error("Failed to encode reservation: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Reservation request timed out after {after:?}")]
    TimedOut { after: std::time::Duration },

    #[error("Reservation task aborted: {message}")]
    Aborted { message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown reservation field: {0}")]
pub struct UnknownField(pub String);
