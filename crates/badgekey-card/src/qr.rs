//! QR encoding of the visitor id.

use crate::error::{RenderError, Result};
use qrcode::{Color, EcLevel, QrCode};

/// A square matrix of QR modules, without quiet zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode `payload` at medium error correction.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::QrEncoding` if the payload does not fit in any
    /// QR version.
    ///
    /// # Examples
    ///
    /// ```
    /// use badgekey_card::QrMatrix;
    ///
    /// let matrix = QrMatrix::encode("1").unwrap();
    /// assert_eq!(matrix.width(), 21);
    /// ```
    pub fn encode(payload: &str) -> Result<Self> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(|e| RenderError::QrEncoding(e.to_string()))?;

        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        Ok(Self { width, dark })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (`x`, `y`) is dark. Out of range is light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finder_pattern_corners_are_dark() {
        let matrix = QrMatrix::encode("1").unwrap();
        let last = matrix.width() - 1;

        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(last, 0));
        assert!(matrix.is_dark(0, last));
        // Separator next to the top-left finder.
        assert!(!matrix.is_dark(7, 0));
    }

    #[test]
    fn test_longer_payload_grows_matrix() {
        let short = QrMatrix::encode("1").unwrap();
        let long = QrMatrix::encode(&"visitor-".repeat(20)).unwrap();
        assert!(long.width() > short.width());
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let result = QrMatrix::encode(&"x".repeat(5000));
        assert!(matches!(result, Err(RenderError::QrEncoding(_))));
    }

    #[test]
    fn test_out_of_range_is_light() {
        let matrix = QrMatrix::encode("1").unwrap();
        assert!(!matrix.is_dark(matrix.width(), 0));
    }
}
