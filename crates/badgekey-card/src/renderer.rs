//! Card renderer collaborator.
//!
//! The print pipeline mounts a card for a scan record off-screen, waits for
//! the renderer to report that layout is complete, then captures the card at
//! a fixed pixel size. Unmounting clears the render target.

#![allow(async_fn_in_trait)]

use crate::error::{RenderError, Result};
use crate::layout::CardLayout;
use crate::raster::rasterize;
use badgekey_core::{PixelSize, RasterImage, ScanRecord};
use tracing::debug;

/// Mounts, lays out and captures visitor cards.
///
/// Native `async fn` makes this trait non-object-safe; use generics.
///
/// # Examples
///
/// ```no_run
/// use badgekey_card::{CardRenderer, Result};
/// use badgekey_core::{PixelSize, RasterImage, ScanRecord};
///
/// async fn render<R: CardRenderer>(renderer: &mut R, record: &ScanRecord) -> Result<RasterImage> {
///     renderer.mount(record).await?;
///     renderer.wait_layout().await?;
///     let image = renderer.capture(PixelSize::card()).await;
///     renderer.unmount();
///     image
/// }
/// ```
pub trait CardRenderer: Send {
    /// Mount the card for `record`, replacing any card already mounted.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be laid out.
    async fn mount(&mut self, record: &ScanRecord) -> Result<()>;

    /// Resolve once the mounted card's layout is complete.
    ///
    /// May never resolve on a stalled renderer; callers bound it with a
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NotMounted` if nothing is mounted.
    async fn wait_layout(&mut self) -> Result<()>;

    /// Rasterize the mounted card at `size`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NotMounted` if nothing is mounted, or any
    /// rasterization error.
    async fn capture(&mut self, size: PixelSize) -> Result<RasterImage>;

    /// Drop the mounted card, if any.
    fn unmount(&mut self);

    /// Whether a card is currently mounted.
    fn is_mounted(&self) -> bool;
}

/// Renderer that lays cards out with [`CardLayout`] and rasterizes them on
/// the calling task.
///
/// Layout happens synchronously in [`mount`](CardRenderer::mount), so
/// [`wait_layout`](CardRenderer::wait_layout) resolves immediately.
#[derive(Debug, Default)]
pub struct RasterCardRenderer {
    mounted: Option<CardLayout>,
}

impl RasterCardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mounted layout, if any.
    pub fn layout(&self) -> Option<&CardLayout> {
        self.mounted.as_ref()
    }
}

impl CardRenderer for RasterCardRenderer {
    async fn mount(&mut self, record: &ScanRecord) -> Result<()> {
        let layout = CardLayout::for_record(record)?;
        debug!(scan_id = %record.scan_id, visitor = %record.visitor.id, "Card mounted");
        self.mounted = Some(layout);
        Ok(())
    }

    async fn wait_layout(&mut self) -> Result<()> {
        match self.mounted {
            Some(_) => Ok(()),
            None => Err(RenderError::NotMounted),
        }
    }

    async fn capture(&mut self, size: PixelSize) -> Result<RasterImage> {
        let layout = self.mounted.as_ref().ok_or(RenderError::NotMounted)?;
        rasterize(layout, size)
    }

    fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            debug!("Card unmounted");
        }
    }

    fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgekey_core::{ScanId, VisitorRecord};
    use chrono::Local;

    fn record() -> ScanRecord {
        ScanRecord::new(
            VisitorRecord::new("1", "Irhan Achmad J"),
            Local::now(),
            ScanId::new(1),
        )
    }

    #[tokio::test]
    async fn test_mount_wait_capture_unmount() {
        let mut renderer = RasterCardRenderer::new();

        renderer.mount(&record()).await.unwrap();
        renderer.wait_layout().await.unwrap();
        let image = renderer.capture(PixelSize::card()).await.unwrap();
        renderer.unmount();

        assert_eq!(image.size, PixelSize::card());
        assert!(!renderer.is_mounted());
        assert!(renderer.layout().is_none());
    }

    #[tokio::test]
    async fn test_capture_without_mount_fails() {
        let mut renderer = RasterCardRenderer::new();

        assert!(matches!(
            renderer.wait_layout().await,
            Err(RenderError::NotMounted)
        ));
        assert!(matches!(
            renderer.capture(PixelSize::card()).await,
            Err(RenderError::NotMounted)
        ));
    }

    #[tokio::test]
    async fn test_capture_after_unmount_fails() {
        let mut renderer = RasterCardRenderer::new();
        renderer.mount(&record()).await.unwrap();
        renderer.unmount();

        let result = renderer.capture(PixelSize::card()).await;
        assert!(matches!(result, Err(RenderError::NotMounted)));
    }

    #[tokio::test]
    async fn test_mount_replaces_previous_card() {
        let mut renderer = RasterCardRenderer::new();
        let mut second = record();
        second.visitor.name = "Second".to_string();

        renderer.mount(&record()).await.unwrap();
        renderer.mount(&second).await.unwrap();

        let layout = renderer.layout().unwrap();
        assert!(layout.texts().any(|t| t == "SECOND"));
    }
}
