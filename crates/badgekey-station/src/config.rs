//! Station configuration.
//!
//! Two tables, both optional:
//!
//! ```toml
//! [gate]
//! cooldown_ms = 5000
//!
//! [pipeline]
//! layout_timeout_ms = 2000
//! done_hold_ms = 1500
//! capture_width_px = 757
//! capture_height_px = 1069
//! paper_width_mm = 257
//! paper_height_mm = 364
//! ```
//!
//! Missing keys fall back to the values in [`badgekey_core::constants`].

use badgekey_core::constants::{
    CARD_HEIGHT_PX, CARD_WIDTH_PX, DEFAULT_DECODE_COOLDOWN_MS, DEFAULT_DONE_HOLD_MS,
    DEFAULT_LAYOUT_TIMEOUT_MS, MAX_CAPTURE_DIMENSION_PX, PAPER_HEIGHT_MM, PAPER_WIDTH_MM,
};
use badgekey_core::{Error, PaperSize, PixelSize, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Full station configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl StationConfig {
    /// Check every table.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.gate.validate()?;
        self.pipeline.validate()
    }
}

/// Scan gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Window after a forwarded decode during which further decodes are
    /// dropped.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl GateConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// # Errors
    ///
    /// Returns `Error::Config` if the cooldown is zero.
    pub fn validate(&self) -> Result<()> {
        if self.cooldown_ms == 0 {
            return Err(Error::Config("gate.cooldown_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Print pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Upper bound on the renderer's layout-complete signal.
    #[serde(default = "default_layout_timeout_ms")]
    pub layout_timeout_ms: u64,

    /// How long `Done` stays visible before returning to idle.
    #[serde(default = "default_done_hold_ms")]
    pub done_hold_ms: u64,

    #[serde(default = "default_capture_width_px")]
    pub capture_width_px: u32,

    #[serde(default = "default_capture_height_px")]
    pub capture_height_px: u32,

    #[serde(default = "default_paper_width_mm")]
    pub paper_width_mm: u32,

    #[serde(default = "default_paper_height_mm")]
    pub paper_height_mm: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout_timeout_ms: default_layout_timeout_ms(),
            done_hold_ms: default_done_hold_ms(),
            capture_width_px: default_capture_width_px(),
            capture_height_px: default_capture_height_px(),
            paper_width_mm: default_paper_width_mm(),
            paper_height_mm: default_paper_height_mm(),
        }
    }
}

impl PipelineConfig {
    pub fn layout_timeout(&self) -> Duration {
        Duration::from_millis(self.layout_timeout_ms)
    }

    pub fn done_hold(&self) -> Duration {
        Duration::from_millis(self.done_hold_ms)
    }

    pub fn capture_size(&self) -> PixelSize {
        PixelSize::new(self.capture_width_px, self.capture_height_px)
    }

    pub fn paper(&self) -> PaperSize {
        PaperSize::new(self.paper_width_mm, self.paper_height_mm)
    }

    /// # Errors
    ///
    /// Returns `Error::Config` if the layout timeout is zero, the capture
    /// size is empty or above the rasterizer's limit, or the paper size is
    /// empty.
    pub fn validate(&self) -> Result<()> {
        if self.layout_timeout_ms == 0 {
            return Err(Error::Config(
                "pipeline.layout_timeout_ms must be positive".to_string(),
            ));
        }

        let capture = self.capture_size();
        if capture.is_empty() {
            return Err(Error::Config(format!(
                "pipeline capture size must be non-empty, got {capture}"
            )));
        }
        if capture.width > MAX_CAPTURE_DIMENSION_PX || capture.height > MAX_CAPTURE_DIMENSION_PX {
            return Err(Error::Config(format!(
                "pipeline capture size {capture} exceeds {MAX_CAPTURE_DIMENSION_PX}px"
            )));
        }

        if self.paper_width_mm == 0 || self.paper_height_mm == 0 {
            return Err(Error::Config(format!(
                "pipeline paper size must be non-empty, got {}",
                self.paper()
            )));
        }

        Ok(())
    }
}

fn default_cooldown_ms() -> u64 {
    DEFAULT_DECODE_COOLDOWN_MS
}

fn default_layout_timeout_ms() -> u64 {
    DEFAULT_LAYOUT_TIMEOUT_MS
}

fn default_done_hold_ms() -> u64 {
    DEFAULT_DONE_HOLD_MS
}

fn default_capture_width_px() -> u32 {
    CARD_WIDTH_PX
}

fn default_capture_height_px() -> u32 {
    CARD_HEIGHT_PX
}

fn default_paper_width_mm() -> u32 {
    PAPER_WIDTH_MM
}

fn default_paper_height_mm() -> u32 {
    PAPER_HEIGHT_MM
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_match_kiosk() {
        let config = StationConfig::default();

        assert_eq!(config.gate.cooldown(), Duration::from_secs(5));
        assert_eq!(config.pipeline.layout_timeout(), Duration::from_secs(2));
        assert_eq!(config.pipeline.done_hold(), Duration::from_millis(1500));
        assert_eq!(config.pipeline.capture_size(), PixelSize::card());
        assert_eq!(config.pipeline.paper(), PaperSize::b4());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: StationConfig = toml::from_str("").unwrap();
        assert_eq!(config, StationConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config: StationConfig = toml::from_str(
            r#"
            [gate]
            cooldown_ms = 3000

            [pipeline]
            done_hold_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.gate.cooldown_ms, 3000);
        assert_eq!(config.pipeline.done_hold_ms, 1000);
        assert_eq!(config.pipeline.layout_timeout_ms, DEFAULT_LAYOUT_TIMEOUT_MS);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: std::result::Result<StationConfig, _> =
            toml::from_str("[gate]\ncooldown = 3000\n");
        assert!(result.is_err());
    }

    #[rstest]
    #[case("[gate]\ncooldown_ms = 0\n")]
    #[case("[pipeline]\nlayout_timeout_ms = 0\n")]
    #[case("[pipeline]\ncapture_width_px = 0\n")]
    #[case("[pipeline]\ncapture_height_px = 100000\n")]
    #[case("[pipeline]\npaper_height_mm = 0\n")]
    fn test_validate_rejects(#[case] content: &str) {
        let config: StationConfig = toml::from_str(content).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
