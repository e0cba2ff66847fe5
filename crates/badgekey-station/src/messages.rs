//! Operator-facing messages for the scanner screen.
//!
//! The kiosk is deployed in Indonesia, so every message is in Indonesian.
//! Messages are ASCII-only and short enough for the status strip under the
//! camera preview.
//!
//! # Usage
//!
//! ```
//! use badgekey_station::PrintStatus;
//! use badgekey_station::messages::StatusMessages;
//!
//! assert_eq!(StatusMessages::UNRECOGNIZED, "QR Code tidak valid");
//! assert_eq!(StatusMessages::for_status(PrintStatus::Printing), StatusMessages::PRINTING);
//! ```

use crate::status::PrintStatus;

/// Messages shown on the scanner screen (Indonesian).
///
/// # Message Format
///
/// - At most 48 characters
/// - ASCII characters only
pub struct StatusMessages;

impl StatusMessages {
    /// Waiting for a code.
    pub const IDLE: &'static str = "Arahkan QR Code ke kamera";

    /// Card is being laid out.
    pub const PREPARING: &'static str = "Menyiapkan kartu...";

    /// Card is being rasterized.
    pub const CAPTURING: &'static str = "Mengambil gambar kartu...";

    /// Card image submitted to the printer.
    pub const PRINTING: &'static str = "Mencetak kartu...";

    /// Card printed.
    pub const DONE: &'static str = "Kartu berhasil dicetak";

    /// Decoded payload is not in the visitor table.
    pub const UNRECOGNIZED: &'static str = "QR Code tidak valid";

    /// The card never became ready for capture.
    ///
    /// Covers a missing render target and a layout that did not complete in
    /// time.
    pub const CARD_UNAVAILABLE: &'static str = "Kartu tidak tersedia, silakan scan ulang";

    /// Rasterizing the card failed.
    pub const CAPTURE_FAILED: &'static str = "Gagal mengambil gambar kartu";

    /// The print sink failed or no printer is available.
    pub const PRINT_FAILED: &'static str = "Gagal mencetak kartu";

    /// The print dialog or preview was closed before printing finished.
    pub const PRINT_CANCELLED: &'static str = "Pencetakan dibatalkan";

    /// Shown with any print failure: the scan itself is kept.
    pub const SAVED_WITHOUT_PRINT: &'static str = "Data berhasil disimpan tanpa print otomatis.";

    /// Empty scan history.
    pub const NO_SCANS: &'static str = "Belum ada scan";

    /// Text for the status strip.
    pub fn for_status(status: PrintStatus) -> &'static str {
        match status {
            PrintStatus::Idle => Self::IDLE,
            PrintStatus::Preparing => Self::PREPARING,
            PrintStatus::Capturing => Self::CAPTURING,
            PrintStatus::Printing => Self::PRINTING,
            PrintStatus::Done => Self::DONE,
        }
    }
}
