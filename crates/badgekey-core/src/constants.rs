//! Core constants for the visitor badge kiosk.
//!
//! These values were measured on the deployed kiosk and are used as defaults
//! throughout the workspace. Every timing value can be overridden through the
//! station configuration; the card and paper geometry describe the physical
//! B4 badge stock and should only change together with the printer setup.
//!
//! # Usage
//!
//! ```
//! use badgekey_core::constants::*;
//! use std::time::Duration;
//!
//! let cooldown = Duration::from_millis(DEFAULT_DECODE_COOLDOWN_MS);
//! assert_eq!(cooldown, Duration::from_secs(5));
//!
//! assert_eq!((CARD_WIDTH_PX, CARD_HEIGHT_PX), (757, 1069));
//! ```

// ============================================================================
// Scan Gate
// ============================================================================

/// Default window after an accepted decode event during which further decode
/// events are dropped, in milliseconds.
///
/// A QR code held in front of the camera produces a decode callback on every
/// frame; five seconds covers the time a visitor typically needs to pull the
/// code back out of frame.
pub const DEFAULT_DECODE_COOLDOWN_MS: u64 = 5_000;

// ============================================================================
// Print Pipeline
// ============================================================================

/// Default upper bound for the card renderer to report a stable layout, in
/// milliseconds.
///
/// Layout on the slowest supported device was observed to settle in 400ms to
/// 2000ms. The pipeline waits for the renderer's layout-complete signal and
/// gives up after this long.
pub const DEFAULT_LAYOUT_TIMEOUT_MS: u64 = 2_000;

/// Default time the `done` status stays visible before the pipeline resets to
/// idle, in milliseconds.
pub const DEFAULT_DONE_HOLD_MS: u64 = 1_500;

// ============================================================================
// Card Geometry
// ============================================================================

/// Card width in pixels (257mm at 72dpi, B4 portrait).
pub const CARD_WIDTH_PX: u32 = 757;

/// Card height in pixels (364mm at 72dpi, B4 portrait).
pub const CARD_HEIGHT_PX: u32 = 1069;

/// Physical output width in millimetres (B4 portrait).
pub const PAPER_WIDTH_MM: u32 = 257;

/// Physical output height in millimetres (B4 portrait).
pub const PAPER_HEIGHT_MM: u32 = 364;

/// Largest capture size accepted by the rasterizer along either axis.
///
/// Guards against a misconfigured capture size allocating an enormous buffer.
pub const MAX_CAPTURE_DIMENSION_PX: u32 = 8_192;

// ============================================================================
// Session
// ============================================================================

/// Number of scans shown in the "recent scans" panel of the home screen.
pub const RECENT_SCANS_SHOWN: usize = 3;

/// Timestamp format used for the human-readable scan time.
///
/// Day-first with dots between time components, following the kiosk's
/// Indonesian locale (e.g. `18/10/2026, 14.30.05`).
pub const SCAN_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H.%M.%S";
