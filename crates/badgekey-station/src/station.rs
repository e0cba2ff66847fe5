//! The scanner station event loop.
//!
//! One cooperative loop owns the camera, the scan gate, the visitor resolver
//! and the print pipeline. Decode events, the cooldown timer and operator
//! commands are all handled on this loop, one at a time:
//!
//! ```text
//! camera ──decode──▶ gate ──forward──▶ resolver ──found──▶ session + pipeline
//!                     │                   │
//!                     └─drop              └─not found──▶ Unrecognized event
//! ```
//!
//! On a forwarded decode the camera is disabled until the gate opens again.
//! While a job runs the loop keeps listening for commands, so
//! [`StationHandle::dismiss`] cancels the job and performs the same cleanup
//! as a failure. Dismissing during the done hold only cuts the hold short;
//! the job still counts as printed.

use crate::config::GateConfig;
use crate::error::{Result, StationError};
use crate::gate::{Decision, ScanGate};
use crate::job::PrintJob;
use crate::messages::StatusMessages;
use crate::pipeline::PrintPipeline;
use crate::status::PrintStatus;
use badgekey_card::CardRenderer;
use badgekey_core::{ScanId, ScanRecord};
use badgekey_hardware::{CameraDevice, DecodeEvent, HardwareError, PrintSink};
use badgekey_session::{
    InMemoryUserDirectory, Resolution, SessionHandle, UserDirectory, VisitorDirectory,
};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// Command channel capacity.
const COMMAND_BUFFER: usize = 8;

/// Operator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StationCommand {
    /// Close the preview, cancelling any job in flight.
    Dismiss,
    /// Stop the loop.
    Shutdown,
}

/// How a print job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Printed,
    Failed {
        /// Operator-facing message.
        message: &'static str,
        /// Underlying error, for logs.
        error: String,
    },
    Cancelled,
}

impl JobOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, JobOutcome::Printed)
    }

    /// Operator-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            JobOutcome::Printed => StatusMessages::DONE,
            JobOutcome::Failed { message, .. } => message,
            JobOutcome::Cancelled => StatusMessages::PRINT_CANCELLED,
        }
    }
}

/// Notifications from the station loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationEvent {
    /// A visitor was resolved and added to the session history.
    ScanRecorded(ScanRecord),

    /// A forwarded payload is not in the visitor table.
    Unrecognized { payload: String },

    /// A print job reached idle.
    JobFinished {
        job_id: Uuid,
        scan_id: ScanId,
        outcome: JobOutcome,
    },

    /// The camera failed; no further decodes will be read.
    CameraError(String),
}

/// Why a job stopped before its pipeline run finished.
enum Interrupt {
    Dismissed,
    Shutdown,
}

/// Handle for controlling and observing a running [`Station`].
#[derive(Debug)]
pub struct StationHandle {
    commands: mpsc::Sender<StationCommand>,
    events: mpsc::UnboundedReceiver<StationEvent>,
    status: watch::Receiver<PrintStatus>,
}

impl StationHandle {
    /// Close the preview. Cancels the job in flight, if any.
    ///
    /// # Errors
    ///
    /// Returns `StationError::Stopped` if the loop has exited.
    pub async fn dismiss(&self) -> Result<()> {
        self.send(StationCommand::Dismiss).await
    }

    /// Stop the loop, cancelling the job in flight, if any.
    ///
    /// # Errors
    ///
    /// Returns `StationError::Stopped` if the loop has exited.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(StationCommand::Shutdown).await
    }

    /// Wait for the next event. `None` once the loop has exited and every
    /// event has been read.
    pub async fn next_event(&mut self) -> Option<StationEvent> {
        self.events.recv().await
    }

    /// Next event, if one is already queued.
    pub fn try_next_event(&mut self) -> Option<StationEvent> {
        self.events.try_recv().ok()
    }

    /// Current print status.
    pub fn status(&self) -> PrintStatus {
        *self.status.borrow()
    }

    /// Watch the print status.
    pub fn subscribe_status(&self) -> watch::Receiver<PrintStatus> {
        self.status.clone()
    }

    async fn send(&self, command: StationCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| StationError::Stopped)
    }
}

/// The scanner station.
pub struct Station<C, R, P, D = InMemoryUserDirectory> {
    camera: C,
    camera_live: bool,
    gate: ScanGate,
    visitors: VisitorDirectory,
    session: SessionHandle<D>,
    pipeline: PrintPipeline<R, P>,
    commands: mpsc::Receiver<StationCommand>,
    events: mpsc::UnboundedSender<StationEvent>,
    stopping: bool,
}

impl<C, R, P, D> Station<C, R, P, D>
where
    C: CameraDevice,
    R: CardRenderer,
    P: PrintSink,
    D: UserDirectory,
{
    pub fn new(
        camera: C,
        visitors: VisitorDirectory,
        session: SessionHandle<D>,
        pipeline: PrintPipeline<R, P>,
        gate: &GateConfig,
    ) -> (Self, StationHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let status = pipeline.subscribe();

        let station = Self {
            camera,
            camera_live: true,
            gate: ScanGate::new(gate.cooldown()),
            visitors,
            session,
            pipeline,
            commands: command_rx,
            events: event_tx,
            stopping: false,
        };
        let handle = StationHandle {
            commands: command_tx,
            events: event_rx,
            status,
        };

        (station, handle)
    }

    pub fn gate(&self) -> &ScanGate {
        &self.gate
    }

    pub fn pipeline(&self) -> &PrintPipeline<R, P> {
        &self.pipeline
    }

    /// Run until shutdown or until every [`StationHandle`] is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera cannot be enabled at start-up, or if
    /// the gate rejects a job, which means a job was started while another
    /// was still in flight.
    pub async fn run(mut self) -> Result<()> {
        self.camera.set_enabled(true).await?;
        info!("Station started");

        while !self.stopping {
            let reopen_at = self.gate.reopen_at();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(StationCommand::Dismiss) => debug!("Dismiss with no job in flight"),
                    Some(StationCommand::Shutdown) | None => self.stopping = true,
                },
                _ = wait_until(reopen_at) => {
                    if self.gate.tick(Instant::now()) {
                        self.set_camera(true).await;
                    }
                }
                event = self.camera.next_decode(), if self.camera_live => match event {
                    Ok(event) => self.handle_decode(event).await?,
                    Err(e) => self.camera_failed(e),
                },
            }
        }

        if self.camera_live && let Err(e) = self.camera.set_enabled(false).await {
            warn!(error = %e, "Failed to disable camera on shutdown");
        }
        info!(
            forwarded = self.gate.forwarded(),
            dropped = self.gate.dropped(),
            "Station stopped"
        );
        Ok(())
    }

    async fn handle_decode(&mut self, event: DecodeEvent) -> Result<()> {
        if let Decision::Dropped(reason) = self.gate.on_decode(Instant::now()) {
            trace!(payload = %event.payload, ?reason, "Decode dropped by gate");
            return Ok(());
        }

        self.set_camera(false).await;

        let visitor = match self.visitors.resolve(&event.payload) {
            Resolution::Found(visitor) => visitor,
            Resolution::NotFound => {
                info!(payload = %event.payload, "Unrecognized QR code");
                self.emit(StationEvent::Unrecognized {
                    payload: event.payload,
                });
                return Ok(());
            }
        };

        let record = self.session.record_scan(visitor).await;
        info!(
            scan_id = %record.scan_id,
            visitor = %record.visitor.id,
            name = %record.visitor.name,
            "Scan recorded"
        );
        self.emit(StationEvent::ScanRecorded(record.clone()));

        let job = PrintJob::new(record);
        self.gate.begin_job(job.id, Instant::now())?;
        let outcome = self.drive_job(&job).await;
        self.gate.finish_job(job.id, Instant::now())?;

        self.emit(StationEvent::JobFinished {
            job_id: job.id,
            scan_id: job.record.scan_id,
            outcome,
        });

        if !self.gate.is_locked(Instant::now()) {
            self.set_camera(true).await;
        }
        Ok(())
    }

    /// Run the pipeline for `job` while still serving commands and camera
    /// events.
    async fn drive_job(&mut self, job: &PrintJob) -> JobOutcome {
        let finished = {
            let run = self.pipeline.run(job);
            tokio::pin!(run);

            loop {
                tokio::select! {
                    result = &mut run => break Ok(result),
                    command = self.commands.recv() => match command {
                        Some(StationCommand::Dismiss) => break Err(Interrupt::Dismissed),
                        Some(StationCommand::Shutdown) | None => break Err(Interrupt::Shutdown),
                    },
                    event = self.camera.next_decode(), if self.camera_live => match event {
                        Ok(event) => {
                            let decision = self.gate.on_decode(Instant::now());
                            trace!(payload = %event.payload, ?decision, "Decode during print job");
                        }
                        Err(e) => {
                            error!(error = %e, "Camera failed");
                            self.camera_live = false;
                            let _ = self.events.send(StationEvent::CameraError(e.to_string()));
                        }
                    },
                }
            }
        };

        match finished {
            Ok(Ok(())) => JobOutcome::Printed,
            Ok(Err(e)) => JobOutcome::Failed {
                message: e.user_message(),
                error: e.to_string(),
            },
            Err(interrupt) => {
                // The card is already out once the pipeline reaches Done.
                let printed = self.pipeline.status() == PrintStatus::Done;
                self.pipeline.abort(job);
                if let Interrupt::Shutdown = interrupt {
                    self.stopping = true;
                }
                if printed {
                    info!(job_id = %job.id, "Done hold cut short");
                    JobOutcome::Printed
                } else {
                    info!(job_id = %job.id, "Print job cancelled");
                    JobOutcome::Cancelled
                }
            }
        }
    }

    async fn set_camera(&mut self, enabled: bool) {
        if !self.camera_live {
            return;
        }
        match self.camera.set_enabled(enabled).await {
            Ok(()) => debug!(enabled, "Camera toggled"),
            Err(e) => self.camera_failed(e),
        }
    }

    fn camera_failed(&mut self, e: HardwareError) {
        error!(error = %e, "Camera failed");
        self.camera_live = false;
        self.emit(StationEvent::CameraError(e.to_string()));
    }

    fn emit(&self, event: StationEvent) {
        // Nobody listening is fine; the loop keeps running until shutdown.
        let _ = self.events.send(event);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
