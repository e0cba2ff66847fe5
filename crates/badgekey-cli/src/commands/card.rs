//! `badgekey card`: render one visitor card to a PNG file.

use crate::config::AppConfig;
use anyhow::{Context, Result, bail};
use badgekey_card::{CardRenderer, RasterCardRenderer};
use badgekey_core::{PixelSize, RasterImage, ScanIdGenerator, ScanRecord};
use badgekey_session::Resolution;
use badgekey_station::StatusMessages;
use chrono::Local;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct CardArgs {
    /// Visitor id (the QR payload)
    pub visitor: String,

    /// Output PNG path
    #[arg(short, long, default_value = "card.png")]
    pub output: PathBuf,

    /// Capture width in pixels (defaults to [pipeline] capture_width_px)
    #[arg(long)]
    pub width: Option<u32>,

    /// Capture height in pixels (defaults to [pipeline] capture_height_px)
    #[arg(long)]
    pub height: Option<u32>,
}

pub async fn run(config: &AppConfig, args: CardArgs) -> Result<()> {
    let image = render(config, &args).await?;

    std::fs::write(&args.output, &image.png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} ({}, {} bytes)",
        args.output.display(),
        image.size,
        image.png.len()
    );
    Ok(())
}

/// Render the card for `args.visitor` as if it had just been scanned.
async fn render(config: &AppConfig, args: &CardArgs) -> Result<RasterImage> {
    let visitor = match config.visitor_directory().resolve(&args.visitor) {
        Resolution::Found(visitor) => visitor,
        Resolution::NotFound => bail!("{}: '{}'", StatusMessages::UNRECOGNIZED, args.visitor),
    };

    let now = Local::now();
    let record = ScanRecord::new(visitor, now, ScanIdGenerator::default().next_at(now));
    let size = PixelSize::new(
        args.width.unwrap_or(config.pipeline.capture_width_px),
        args.height.unwrap_or(config.pipeline.capture_height_px),
    );

    let mut renderer = RasterCardRenderer::new();
    renderer.mount(&record).await.context("Failed to lay out card")?;
    renderer.wait_layout().await.context("Failed to lay out card")?;
    let image = renderer.capture(size).await;
    renderer.unmount();

    let image = image.context("Failed to capture card")?;
    info!(visitor = %record.visitor.id, size = %image.size, "Card rendered");
    Ok(image)
}
