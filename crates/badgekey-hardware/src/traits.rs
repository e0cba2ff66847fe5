//! Collaborator device trait definitions.
//!
//! The station talks to two pieces of hardware: a camera that continuously
//! decodes QR codes, and a print sink that turns a rasterized card into paper.
//! Both are traits so that mock, spool and real implementations are
//! interchangeable.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).
//! They are therefore not object-safe; use generics or the enum wrappers in
//! [`devices`](crate::devices) for dispatch.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::DeviceInfo;
use badgekey_core::{PaperSize, RasterImage, ScanId};
use chrono::{DateTime, Local};

/// One frame-level QR detection from the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeEvent {
    /// The decoded payload string.
    pub payload: String,

    /// When the frame was decoded.
    pub timestamp: DateTime<Local>,
}

impl DecodeEvent {
    /// Create a decode event stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```
    /// use badgekey_hardware::DecodeEvent;
    ///
    /// let event = DecodeEvent::new("1");
    /// assert_eq!(event.payload, "1");
    /// ```
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            timestamp: Local::now(),
        }
    }
}

/// A continuously-scanning QR camera.
///
/// The camera delivers decode events for as long as it is enabled. Disabling
/// it hard-stops delivery: frames decoded while disabled are discarded at the
/// source, never queued for later.
///
/// # Examples
///
/// ```no_run
/// use badgekey_hardware::{CameraDevice, Result};
///
/// async fn scan_once<C: CameraDevice>(camera: &mut C) -> Result<String> {
///     let event = camera.next_decode().await?;
///     camera.set_enabled(false).await?;
///     Ok(event.payload)
/// }
/// ```
pub trait CameraDevice: Send {
    /// Wait for the next decode event.
    ///
    /// Must be cancel-safe: dropping the returned future before it completes
    /// must not lose an event that was already decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera is disconnected.
    async fn next_decode(&mut self) -> Result<DecodeEvent>;

    /// Enable or disable decode delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera cannot change state.
    async fn set_enabled(&mut self, enabled: bool) -> Result<()>;

    /// Whether decode delivery is currently enabled.
    fn is_enabled(&self) -> bool;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// A rasterized card submitted for printing at a fixed physical size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRequest {
    /// Print job identifier, for logs and spool file names.
    pub job_id: String,

    /// The scan this card was printed for.
    pub scan_id: ScanId,

    /// The card image.
    pub image: RasterImage,

    /// Physical output size.
    pub paper: PaperSize,
}

impl PrintRequest {
    pub fn new(
        job_id: impl Into<String>,
        scan_id: ScanId,
        image: RasterImage,
        paper: PaperSize,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            scan_id,
            image,
            paper,
        }
    }
}

/// The platform print service.
///
/// There is no retry contract: any error is terminal for that request.
///
/// # Examples
///
/// ```no_run
/// use badgekey_hardware::{PrintRequest, PrintSink, Result};
///
/// async fn submit<P: PrintSink>(sink: &mut P, request: &PrintRequest) -> Result<()> {
///     sink.print(request).await
/// }
/// ```
pub trait PrintSink: Send {
    /// Submit an image for printing.
    ///
    /// # Errors
    ///
    /// Returns an error if no printer is available, the user cancels, or the
    /// sink fails for any other reason.
    async fn print(&mut self, request: &PrintRequest) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
