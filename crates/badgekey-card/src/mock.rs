//! Scriptable card renderer for pipeline tests.
//!
//! Real renderers can be slow to lay out, lose their mount, or fail during
//! capture. The handle scripts each of those without rasterizing anything.

use crate::error::{RenderError, Result};
use crate::renderer::CardRenderer;
use badgekey_core::{PixelSize, RasterImage, ScanId, ScanRecord};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How the mock behaves once layout is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutBehavior {
    /// Layout completes immediately.
    #[default]
    Ready,
    /// Layout completes after a delay.
    Delayed(Duration),
    /// Layout never completes.
    Stalled,
}

/// How the mock behaves when a capture is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureBehavior {
    /// Capture succeeds with a placeholder image.
    #[default]
    Succeed,
    /// The render target disappears before capture.
    LoseMount,
    /// The capture surface throws.
    Fail,
}

#[derive(Debug, Default)]
struct RendererState {
    mounted: Option<ScanId>,
    layout: LayoutBehavior,
    capture: CaptureBehavior,
    capture_latency: Option<Duration>,
    mounts: Vec<ScanId>,
    captures: usize,
    unmounts: usize,
}

fn lock(state: &Mutex<RendererState>) -> MutexGuard<'_, RendererState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock card renderer.
///
/// # Examples
///
/// ```
/// use badgekey_card::mock::{CaptureBehavior, MockCardRenderer};
/// use badgekey_card::{CardRenderer, RenderError};
/// use badgekey_core::{PixelSize, ScanId, ScanRecord, VisitorRecord};
/// use chrono::Local;
///
/// #[tokio::main]
/// async fn main() {
///     let (mut renderer, handle) = MockCardRenderer::new();
///     handle.set_capture(CaptureBehavior::LoseMount);
///
///     let record = ScanRecord::new(VisitorRecord::new("1", "Dewi"), Local::now(), ScanId::new(1));
///     renderer.mount(&record).await.unwrap();
///
///     let result = renderer.capture(PixelSize::card()).await;
///     assert!(matches!(result, Err(RenderError::NotMounted)));
/// }
/// ```
#[derive(Debug)]
pub struct MockCardRenderer {
    state: Arc<Mutex<RendererState>>,
}

impl MockCardRenderer {
    pub fn new() -> (Self, MockRendererHandle) {
        let state = Arc::new(Mutex::new(RendererState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockRendererHandle { state },
        )
    }
}

impl CardRenderer for MockCardRenderer {
    async fn mount(&mut self, record: &ScanRecord) -> Result<()> {
        let mut state = lock(&self.state);
        state.mounted = Some(record.scan_id);
        state.mounts.push(record.scan_id);
        Ok(())
    }

    async fn wait_layout(&mut self) -> Result<()> {
        let behavior = {
            let state = lock(&self.state);
            if state.mounted.is_none() {
                return Err(RenderError::NotMounted);
            }
            state.layout
        };

        match behavior {
            LayoutBehavior::Ready => Ok(()),
            LayoutBehavior::Delayed(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            LayoutBehavior::Stalled => std::future::pending().await,
        }
    }

    async fn capture(&mut self, size: PixelSize) -> Result<RasterImage> {
        let latency = {
            let mut state = lock(&self.state);
            state.captures += 1;
            if state.capture == CaptureBehavior::LoseMount {
                state.mounted = None;
            }
            state.capture_latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = lock(&self.state);
        if state.mounted.is_none() {
            return Err(RenderError::NotMounted);
        }
        if state.capture == CaptureBehavior::Fail {
            return Err(RenderError::Capture("capture surface threw".to_string()));
        }

        Ok(RasterImage::new(size, b"\x89PNG mock".to_vec()))
    }

    fn unmount(&mut self) {
        let mut state = lock(&self.state);
        state.mounted = None;
        state.unmounts += 1;
    }

    fn is_mounted(&self) -> bool {
        lock(&self.state).mounted.is_some()
    }
}

/// Handle for scripting and inspecting a [`MockCardRenderer`].
#[derive(Debug, Clone)]
pub struct MockRendererHandle {
    state: Arc<Mutex<RendererState>>,
}

impl MockRendererHandle {
    pub fn set_layout(&self, behavior: LayoutBehavior) {
        lock(&self.state).layout = behavior;
    }

    pub fn set_capture(&self, behavior: CaptureBehavior) {
        lock(&self.state).capture = behavior;
    }

    /// Delay every capture by `latency`.
    pub fn set_capture_latency(&self, latency: Duration) {
        lock(&self.state).capture_latency = Some(latency);
    }

    /// Scan ids mounted so far, in order.
    pub fn mounts(&self) -> Vec<ScanId> {
        lock(&self.state).mounts.clone()
    }

    pub fn captures(&self) -> usize {
        lock(&self.state).captures
    }

    pub fn unmounts(&self) -> usize {
        lock(&self.state).unmounts
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.state).mounted.is_some()
    }
}
