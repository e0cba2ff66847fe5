//! Mock QR camera for testing and development.
//!
//! A real scanner fires a decode callback on every frame while a code stays
//! in view. The handle lets tests reproduce that by presenting the same
//! payload many times in quick succession.

use crate::{
    HardwareError, Result,
    traits::{CameraDevice, DecodeEvent},
    types::DeviceInfo,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::trace;

/// State shared between the camera and its handle.
#[derive(Debug)]
struct Shared {
    enabled: AtomicBool,
    deliver_queued: AtomicBool,
    delivered: AtomicU64,
    discarded: AtomicU64,
}

impl Shared {
    fn discard(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }
}

/// Mock QR camera.
///
/// # Examples
///
/// ```
/// use badgekey_hardware::mock::MockCamera;
/// use badgekey_hardware::CameraDevice;
///
/// #[tokio::main]
/// async fn main() -> badgekey_hardware::Result<()> {
///     let (mut camera, handle) = MockCamera::new();
///
///     handle.present("1").await?;
///     let event = camera.next_decode().await?;
///     assert_eq!(event.payload, "1");
///
///     camera.set_enabled(false).await?;
///     assert!(!handle.present("1").await?);
///     assert_eq!(handle.discarded(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCamera {
    event_rx: mpsc::Receiver<DecodeEvent>,
    shared: Arc<Shared>,
    name: String,
}

impl MockCamera {
    /// Create a new, enabled mock camera with the default name.
    pub fn new() -> (Self, MockCameraHandle) {
        Self::with_name("Mock Camera".to_string())
    }

    /// Create a new, enabled mock camera with a custom name.
    pub fn with_name(name: String) -> (Self, MockCameraHandle) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let shared = Arc::new(Shared {
            enabled: AtomicBool::new(true),
            deliver_queued: AtomicBool::new(false),
            delivered: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        });

        let camera = Self {
            event_rx,
            shared: Arc::clone(&shared),
            name: name.clone(),
        };
        let handle = MockCameraHandle {
            event_tx,
            shared,
            name,
        };

        (camera, handle)
    }
}

impl CameraDevice for MockCamera {
    async fn next_decode(&mut self) -> Result<DecodeEvent> {
        loop {
            let event = self
                .event_rx
                .recv()
                .await
                .ok_or_else(|| HardwareError::disconnected("camera event channel closed"))?;

            // Frames queued before the camera was disabled are lost too,
            // unless the handle asked for in-flight frames to come through.
            if self.shared.enabled.load(Ordering::Acquire)
                || self.shared.deliver_queued.load(Ordering::Acquire)
            {
                self.shared.delivered.fetch_add(1, Ordering::Relaxed);
                return Ok(event);
            }

            trace!(payload = %event.payload, "Discarding queued frame, camera disabled");
            self.shared.discard();
        }
    }

    async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.shared.enabled.store(enabled, Ordering::Release);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "mock-qr"))
    }
}

/// Handle for feeding frames to a [`MockCamera`].
///
/// Cloned handles share the same camera.
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    event_tx: mpsc::Sender<DecodeEvent>,
    shared: Arc<Shared>,
    name: String,
}

impl MockCameraHandle {
    /// Present a decoded frame to the camera.
    ///
    /// Returns `Ok(true)` if the frame was handed to the camera, `Ok(false)`
    /// if it was discarded because the camera is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped.
    pub async fn present(&self, payload: impl Into<String>) -> Result<bool> {
        let event = DecodeEvent::new(payload);

        if !self.shared.enabled.load(Ordering::Acquire) {
            trace!(payload = %event.payload, "Discarding frame, camera disabled");
            self.shared.discard();
            return Ok(false);
        }

        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("camera event channel closed"))?;
        Ok(true)
    }

    /// Present the same payload `frames` times, as a code held in view does.
    ///
    /// Returns how many frames were handed to the camera.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped.
    pub async fn present_burst(&self, payload: &str, frames: usize) -> Result<usize> {
        let mut accepted = 0;
        for _ in 0..frames {
            if self.present(payload).await? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Keep delivering frames that were already queued when the camera was
    /// disabled, as a decoder with frames in flight does. New frames are
    /// still discarded at the source.
    pub fn set_deliver_queued(&self, deliver: bool) {
        self.shared.deliver_queued.store(deliver, Ordering::Release);
    }

    /// Whether the camera currently accepts frames.
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Frames the camera has delivered to its reader.
    pub fn delivered(&self) -> u64 {
        self.shared.delivered.load(Ordering::Relaxed)
    }

    /// Frames lost because the camera was disabled.
    pub fn discarded(&self) -> u64 {
        self.shared.discarded.load(Ordering::Relaxed)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
