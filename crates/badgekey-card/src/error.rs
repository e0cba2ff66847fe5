//! Error types for card rendering.

use badgekey_core::PixelSize;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised while laying out or capturing a card.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Capture was attempted with no card mounted.
    #[error("No card is mounted")]
    NotMounted,

    /// The visitor id could not be encoded as a QR code.
    #[error("QR encoding failed: {0}")]
    QrEncoding(String),

    /// The rasterized card could not be encoded as PNG.
    #[error("Image encoding failed: {0}")]
    ImageEncoding(String),

    /// The requested capture size is empty or too large.
    #[error("Invalid capture size: {size}")]
    InvalidSize { size: PixelSize },

    /// The capture surface failed for another reason.
    #[error("Capture failed: {0}")]
    Capture(String),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageEncoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(RenderError::NotMounted.to_string(), "No card is mounted");
        assert_eq!(
            RenderError::InvalidSize {
                size: PixelSize::new(0, 10)
            }
            .to_string(),
            "Invalid capture size: 0x10px"
        );
    }
}
