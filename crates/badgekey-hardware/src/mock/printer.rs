//! Mock print sink for testing and development.
//!
//! Records every accepted job and lets tests script failures: no printer
//! available, the user cancelling the dialog, or a slow printer.

use crate::{
    HardwareError, Result,
    traits::{PrintRequest, PrintSink},
    types::DeviceInfo,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
struct PrinterState {
    printed: Vec<PrintRequest>,
    failures: VecDeque<HardwareError>,
    unavailable: bool,
    latency: Option<Duration>,
    attempts: usize,
}

fn lock(state: &Mutex<PrinterState>) -> MutexGuard<'_, PrinterState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock printer.
///
/// # Examples
///
/// ```
/// use badgekey_core::{PaperSize, PixelSize, RasterImage, ScanId};
/// use badgekey_hardware::mock::MockPrinter;
/// use badgekey_hardware::{PrintRequest, PrintSink};
///
/// #[tokio::main]
/// async fn main() -> badgekey_hardware::Result<()> {
///     let (mut printer, handle) = MockPrinter::new();
///     let image = RasterImage::new(PixelSize::card(), vec![0x89, b'P', b'N', b'G']);
///     let request = PrintRequest::new("job-1", ScanId::new(1), image, PaperSize::b4());
///
///     printer.print(&request).await?;
///     assert_eq!(handle.printed_count(), 1);
///
///     handle.set_unavailable(true);
///     assert!(printer.print(&request).await.is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPrinter {
    state: Arc<Mutex<PrinterState>>,
    name: String,
}

impl MockPrinter {
    /// Create a new mock printer with the default name.
    pub fn new() -> (Self, MockPrinterHandle) {
        Self::with_name("Mock Printer".to_string())
    }

    /// Create a new mock printer with a custom name.
    pub fn with_name(name: String) -> (Self, MockPrinterHandle) {
        let state = Arc::new(Mutex::new(PrinterState::default()));
        let printer = Self {
            state: Arc::clone(&state),
            name: name.clone(),
        };
        (printer, MockPrinterHandle { state, name })
    }
}

impl PrintSink for MockPrinter {
    async fn print(&mut self, request: &PrintRequest) -> Result<()> {
        let latency = {
            let mut state = lock(&self.state);
            state.attempts += 1;
            state.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = lock(&self.state);
        if state.unavailable {
            return Err(HardwareError::unavailable(self.name.clone()));
        }
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }

        debug!(
            job_id = %request.job_id,
            scan_id = %request.scan_id,
            paper = %request.paper,
            "Mock printer accepted job"
        );
        state.printed.push(request.clone());
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "mock-printer"))
    }
}

/// Handle for scripting and inspecting a [`MockPrinter`].
#[derive(Debug, Clone)]
pub struct MockPrinterHandle {
    state: Arc<Mutex<PrinterState>>,
    name: String,
}

impl MockPrinterHandle {
    /// Fail the next print request with `error`. Failures queue up in order.
    pub fn fail_next(&self, error: HardwareError) {
        lock(&self.state).failures.push_back(error);
    }

    /// Make every request fail as if no printer were installed.
    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    /// Delay every request by `latency` before it completes.
    pub fn set_latency(&self, latency: Duration) {
        lock(&self.state).latency = Some(latency);
    }

    /// Requests that completed successfully.
    pub fn printed(&self) -> Vec<PrintRequest> {
        lock(&self.state).printed.clone()
    }

    pub fn printed_count(&self) -> usize {
        lock(&self.state).printed.len()
    }

    /// Requests received, successful or not.
    pub fn attempts(&self) -> usize {
        lock(&self.state).attempts
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
