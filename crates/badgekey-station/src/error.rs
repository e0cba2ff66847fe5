//! Error types for the print pipeline and the station loop.

use crate::messages::StatusMessages;
use badgekey_card::RenderError;
use badgekey_hardware::HardwareError;

/// Reasons a print job ended without a printed card.
///
/// Every variant is recoverable: the pipeline returns to idle and the
/// operator re-scans to retry.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The card was not mounted when layout or capture needed it.
    #[error("Card reference unavailable: {0}")]
    CardUnavailable(#[source] RenderError),

    /// The renderer did not report a stable layout in time.
    #[error("Card layout did not complete within {timeout_ms}ms")]
    LayoutTimeout { timeout_ms: u64 },

    /// Rasterizing the mounted card failed.
    #[error("Card capture failed: {0}")]
    CaptureFailed(#[source] RenderError),

    /// The print sink rejected the card.
    #[error("Print failed: {0}")]
    PrintFailed(#[source] HardwareError),

    /// The job was dismissed before it finished.
    #[error("Print job cancelled")]
    Cancelled,

    /// The pipeline was driven through an invalid status change.
    #[error(transparent)]
    Internal(#[from] badgekey_core::Error),
}

impl PipelineError {
    /// Message for the operator.
    ///
    /// # Examples
    ///
    /// ```
    /// use badgekey_station::PipelineError;
    /// use badgekey_station::messages::StatusMessages;
    ///
    /// let error = PipelineError::LayoutTimeout { timeout_ms: 2000 };
    /// assert_eq!(error.user_message(), StatusMessages::CARD_UNAVAILABLE);
    /// ```
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CardUnavailable(_) | Self::LayoutTimeout { .. } => {
                StatusMessages::CARD_UNAVAILABLE
            }
            Self::CaptureFailed(_) | Self::Internal(_) => StatusMessages::CAPTURE_FAILED,
            Self::PrintFailed(HardwareError::Cancelled { .. }) | Self::Cancelled => {
                StatusMessages::PRINT_CANCELLED
            }
            Self::PrintFailed(_) => StatusMessages::PRINT_FAILED,
        }
    }
}

/// Errors that stop the station loop.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("Camera error: {0}")]
    Camera(#[from] HardwareError),

    #[error(transparent)]
    Core(#[from] badgekey_core::Error),

    /// The station loop is no longer running.
    #[error("Station stopped")]
    Stopped,
}

pub type Result<T> = std::result::Result<T, StationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PipelineError::CardUnavailable(RenderError::NotMounted), StatusMessages::CARD_UNAVAILABLE)]
    #[case(PipelineError::LayoutTimeout { timeout_ms: 2000 }, StatusMessages::CARD_UNAVAILABLE)]
    #[case(
        PipelineError::CaptureFailed(RenderError::Capture("boom".into())),
        StatusMessages::CAPTURE_FAILED
    )]
    #[case(
        PipelineError::PrintFailed(HardwareError::unavailable("printer")),
        StatusMessages::PRINT_FAILED
    )]
    #[case(
        PipelineError::PrintFailed(HardwareError::cancelled("print dialog")),
        StatusMessages::PRINT_CANCELLED
    )]
    #[case(PipelineError::Cancelled, StatusMessages::PRINT_CANCELLED)]
    fn test_user_message(#[case] error: PipelineError, #[case] expected: &str) {
        assert_eq!(error.user_message(), expected);
    }

    #[test]
    fn test_error_display() {
        let error = PipelineError::LayoutTimeout { timeout_ms: 2000 };
        assert_eq!(
            error.to_string(),
            "Card layout did not complete within 2000ms"
        );

        let error = PipelineError::CardUnavailable(RenderError::NotMounted);
        assert_eq!(
            error.to_string(),
            "Card reference unavailable: No card is mounted"
        );
    }

    #[test]
    fn test_station_error_from_hardware() {
        let error: StationError = HardwareError::disconnected("camera").into();
        assert!(matches!(error, StationError::Camera(_)));
        assert_eq!(error.to_string(), "Camera error: Device disconnected: camera");
    }
}
