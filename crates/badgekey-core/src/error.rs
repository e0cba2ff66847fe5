use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate scan id: {0}")]
    DuplicateScanId(u64),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Scan gate errors
    #[error("Print pipeline busy with job {job}")]
    PipelineBusy { job: String },

    #[error("Unknown print job: {0}")]
    UnknownJob(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
