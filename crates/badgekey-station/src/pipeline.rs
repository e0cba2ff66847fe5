//! Print pipeline.
//!
//! Drives one [`PrintJob`] through the card renderer and the print sink:
//!
//! 1. `Preparing`: mount the card and wait for the renderer's layout signal,
//!    bounded by the layout timeout
//! 2. `Capturing`: rasterize the mounted card at the capture size
//! 3. `Printing`: submit the image to the print sink at the paper size
//! 4. `Done`: hold briefly, then return to `Idle`
//!
//! Any failure takes the error path straight back to `Idle`. Success,
//! failure and [`abort`](PrintPipeline::abort) all share one cleanup that
//! unmounts the card and resets the status, so no exit path can leave a card
//! mounted or the status stuck.
//!
//! At most one renderer or sink operation is outstanding at a time.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::job::PrintJob;
use crate::status::{PrintStatus, StatusMachine};
use badgekey_card::{CardRenderer, RenderError};
use badgekey_hardware::{PrintRequest, PrintSink};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The card print pipeline.
///
/// # Examples
///
/// ```
/// use badgekey_card::mock::MockCardRenderer;
/// use badgekey_core::{ScanId, ScanRecord, VisitorRecord};
/// use badgekey_hardware::mock::MockPrinter;
/// use badgekey_station::{PipelineConfig, PrintJob, PrintPipeline, PrintStatus};
/// use chrono::Local;
///
/// #[tokio::main]
/// async fn main() {
///     let (renderer, _) = MockCardRenderer::new();
///     let (printer, printed) = MockPrinter::new();
///     let config = PipelineConfig { done_hold_ms: 0, ..PipelineConfig::default() };
///     let mut pipeline = PrintPipeline::new(renderer, printer, config);
///
///     let record = ScanRecord::new(VisitorRecord::new("1", "Dewi"), Local::now(), ScanId::new(1));
///     pipeline.run(&PrintJob::new(record)).await.unwrap();
///
///     assert_eq!(printed.printed_count(), 1);
///     assert_eq!(pipeline.status(), PrintStatus::Idle);
/// }
/// ```
#[derive(Debug)]
pub struct PrintPipeline<R, P> {
    renderer: R,
    sink: P,
    config: PipelineConfig,
    status: StatusMachine,
    status_tx: watch::Sender<PrintStatus>,
}

impl<R: CardRenderer, P: PrintSink> PrintPipeline<R, P> {
    pub fn new(renderer: R, sink: P, config: PipelineConfig) -> Self {
        let (status_tx, _) = watch::channel(PrintStatus::Idle);
        Self {
            renderer,
            sink,
            config,
            status: StatusMachine::new(),
            status_tx,
        }
    }

    /// Watch the visible status.
    ///
    /// Receivers see the latest status; use
    /// [`status_machine`](Self::status_machine) for the full sequence.
    pub fn subscribe(&self) -> watch::Receiver<PrintStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> PrintStatus {
        self.status.current()
    }

    pub fn status_machine(&self) -> &StatusMachine {
        &self.status
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Run `job` to completion.
    ///
    /// Returns once the pipeline is back to `Idle`, after the done hold on
    /// success. If the returned future is dropped early, call
    /// [`abort`](Self::abort) before the next job.
    ///
    /// # Errors
    ///
    /// Returns the [`PipelineError`] of the stage that failed.
    pub async fn run(&mut self, job: &PrintJob) -> Result<()> {
        info!(
            job_id = %job.id,
            scan_id = %job.record.scan_id,
            visitor = %job.record.visitor.id,
            "Print job started"
        );

        let result = self.execute(job).await;
        self.cleanup();

        match &result {
            Ok(()) => info!(
                job_id = %job.id,
                elapsed_ms = job.elapsed().as_millis() as u64,
                "Print job completed"
            ),
            Err(e) => warn!(job_id = %job.id, error = %e, "Print job failed"),
        }

        result
    }

    /// Clean up after a job whose [`run`](Self::run) future was dropped.
    ///
    /// Same cleanup as the error path. Safe to call when idle.
    pub fn abort(&mut self, job: &PrintJob) {
        if self.status.current().is_busy() {
            warn!(job_id = %job.id, status = %self.status.current(), "Print job aborted");
        }
        self.cleanup();
    }

    async fn execute(&mut self, job: &PrintJob) -> Result<()> {
        self.advance(PrintStatus::Preparing)?;
        self.renderer
            .mount(&job.record)
            .await
            .map_err(PipelineError::CardUnavailable)?;

        match timeout(self.config.layout_timeout(), self.renderer.wait_layout()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(PipelineError::CardUnavailable(e)),
            Err(_) => {
                return Err(PipelineError::LayoutTimeout {
                    timeout_ms: self.config.layout_timeout_ms,
                });
            }
        }

        self.advance(PrintStatus::Capturing)?;
        let image = self
            .renderer
            .capture(self.config.capture_size())
            .await
            .map_err(|e| match e {
                RenderError::NotMounted => PipelineError::CardUnavailable(e),
                other => PipelineError::CaptureFailed(other),
            })?;

        self.advance(PrintStatus::Printing)?;
        let request = PrintRequest::new(
            job.id.to_string(),
            job.record.scan_id,
            image,
            self.config.paper(),
        );
        self.sink
            .print(&request)
            .await
            .map_err(PipelineError::PrintFailed)?;

        self.advance(PrintStatus::Done)?;
        sleep(self.config.done_hold()).await;
        self.advance(PrintStatus::Idle)?;

        Ok(())
    }

    fn advance(&mut self, next: PrintStatus) -> Result<()> {
        let transition = self.status.transition_to(next)?;
        debug!(from = %transition.from, to = %transition.to, "Print status changed");
        self.status_tx.send_replace(next);
        Ok(())
    }

    fn cleanup(&mut self) {
        self.renderer.unmount();
        if let Some(transition) = self.status.reset() {
            debug!(from = %transition.from, "Print status reset to Idle");
        }
        self.status_tx.send_replace(PrintStatus::Idle);
    }
}
