//! Spool-directory print sink.
//!
//! Writes each card as `<scan_id>-<job_id>.png` into a directory watched by
//! the platform print service (or simply kept for inspection).

use crate::{
    HardwareError, Result,
    traits::{PrintRequest, PrintSink},
    types::DeviceInfo,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Print sink that spools PNG files into a directory.
///
/// # Examples
///
/// ```no_run
/// use badgekey_hardware::SpoolPrinter;
///
/// let printer = SpoolPrinter::new("/var/spool/badgekey");
/// assert!(printer.dir().ends_with("badgekey"));
/// ```
#[derive(Debug, Clone)]
pub struct SpoolPrinter {
    dir: PathBuf,
}

impl SpoolPrinter {
    /// Create a spool printer writing into `dir`. The directory is created on
    /// first print if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the given request will be written to.
    pub fn path_for(&self, request: &PrintRequest) -> PathBuf {
        self.dir
            .join(format!("{}-{}.png", request.scan_id, request.job_id))
    }
}

impl PrintSink for SpoolPrinter {
    async fn print(&mut self, request: &PrintRequest) -> Result<()> {
        if request.image.png.is_empty() {
            return Err(HardwareError::other("refusing to spool an empty image"));
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            warn!(dir = %self.dir.display(), error = %e, "Spool directory unavailable");
            HardwareError::unavailable(format!("spool directory {}", self.dir.display()))
        })?;

        let path = self.path_for(request);
        tokio::fs::write(&path, &request.image.png).await?;

        info!(
            job_id = %request.job_id,
            path = %path.display(),
            paper = %request.paper,
            "Card spooled"
        );
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Spool Printer", "spool")
            .with_serial_number(self.dir.display().to_string()))
    }
}
