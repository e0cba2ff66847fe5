//! Error types for camera and printer operations.
//!
//! Covers the ways a collaborator device can fail: the device went away, no
//! printer is available, or the user cancelled the print dialog.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during camera or print-sink operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// No device is available to service the request (e.g. no printer).
    #[error("Device unavailable: {device}")]
    Unavailable { device: String },

    /// The user cancelled the operation (e.g. dismissed the print dialog).
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new unavailable error.
    pub fn unavailable(device: impl Into<String>) -> Self {
        Self::Unavailable {
            device: device.into(),
        }
    }

    /// Create a new cancelled error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
