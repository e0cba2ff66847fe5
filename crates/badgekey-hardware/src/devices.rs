//! Enum wrappers for device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn PrintSink>` is
//! not an option. These enums give the station one concrete type per device
//! role while keeping every implementation behind the trait.
//!
//! # Examples
//!
//! ```
//! use badgekey_hardware::devices::{AnyCamera, AnyPrintSink};
//! use badgekey_hardware::mock::{MockCamera, MockPrinter};
//!
//! let (camera, _camera_handle) = MockCamera::new();
//! let (printer, _printer_handle) = MockPrinter::new();
//!
//! let camera = AnyCamera::Mock(camera);
//! let printer = AnyPrintSink::Mock(printer);
//! ```

use crate::mock::{MockCamera, MockPrinter};
use crate::spool::SpoolPrinter;
use crate::traits::{CameraDevice, DecodeEvent, PrintRequest, PrintSink};
use crate::{DeviceInfo, Result};

/// Enum wrapper for camera dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCamera {
    /// Mock camera for development and testing.
    Mock(MockCamera),
}

impl CameraDevice for AnyCamera {
    async fn next_decode(&mut self) -> Result<DecodeEvent> {
        match self {
            Self::Mock(device) => device.next_decode().await,
        }
    }

    async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_enabled(enabled).await,
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            Self::Mock(device) => device.is_enabled(),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for print-sink dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyPrintSink {
    /// Mock printer for development and testing.
    Mock(MockPrinter),

    /// Writes PNG files into a spool directory.
    Spool(SpoolPrinter),
}

impl PrintSink for AnyPrintSink {
    async fn print(&mut self, request: &PrintRequest) -> Result<()> {
        match self {
            Self::Mock(device) => device.print(request).await,
            Self::Spool(device) => device.print(request).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Spool(device) => device.get_info().await,
        }
    }
}

impl From<MockCamera> for AnyCamera {
    fn from(device: MockCamera) -> Self {
        Self::Mock(device)
    }
}

impl From<MockPrinter> for AnyPrintSink {
    fn from(device: MockPrinter) -> Self {
        Self::Mock(device)
    }
}

impl From<SpoolPrinter> for AnyPrintSink {
    fn from(device: SpoolPrinter) -> Self {
        Self::Spool(device)
    }
}
