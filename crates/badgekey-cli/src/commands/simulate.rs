//! `badgekey simulate`: run the scanner station against scripted frames.
//!
//! Each payload is presented to a mock camera in order, `--interval-ms`
//! apart. Cards are rendered with the built-in renderer and written to the
//! spool directory. When every job has finished the session history is
//! printed as JSON.

use crate::config::AppConfig;
use anyhow::{Context, Result, bail};
use badgekey_card::RasterCardRenderer;
use badgekey_core::{ScanId, ScanRecord};
use badgekey_hardware::SpoolPrinter;
use badgekey_hardware::devices::AnyPrintSink;
use badgekey_hardware::mock::{MockCamera, MockCameraHandle, MockPrinter};
use badgekey_session::{SessionHandle, SessionStore};
use badgekey_station::{PrintPipeline, Station, StationEvent, StationHandle, StatusMessages};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Payloads to present to the camera, in order
    #[arg(required = true)]
    pub scans: Vec<String>,

    /// Delay between presented frames in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,

    /// Operator username; scanning runs as a guest without one
    #[arg(long, requires = "password")]
    pub user: Option<String>,

    /// Operator password
    #[arg(long, requires = "user")]
    pub password: Option<String>,

    /// Spool directory (overrides [printer] spool_dir)
    #[arg(long)]
    pub spool_dir: Option<PathBuf>,

    /// Print to an in-memory printer instead of the spool directory
    #[arg(long)]
    pub dry_run: bool,
}

/// Outcome of one print job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job_id: String,
    pub scan_id: ScanId,
    pub printed: bool,
    pub message: &'static str,
}

/// Everything the simulated session produced.
#[derive(Debug, Default, Serialize)]
pub struct SimulationReport {
    /// Logged-in operator, if any.
    pub operator: Option<String>,
    /// Frames handed to the camera.
    pub presented: usize,
    /// Frames lost because the camera was disabled.
    pub discarded: u64,
    pub unrecognized: Vec<String>,
    pub jobs: Vec<JobReport>,
    pub camera_errors: Vec<String>,
    /// Session history, most recent first.
    pub history: Vec<ScanRecord>,
    #[serde(skip)]
    recorded: usize,
}

impl SimulationReport {
    fn record(&mut self, event: StationEvent) {
        match event {
            StationEvent::ScanRecorded(record) => {
                self.recorded += 1;
                info!(scan_id = %record.scan_id, name = %record.visitor.name, "Scan recorded");
            }
            StationEvent::Unrecognized { payload } => {
                warn!(payload = %payload, "{}", StatusMessages::UNRECOGNIZED);
                self.unrecognized.push(payload);
            }
            StationEvent::JobFinished {
                job_id,
                scan_id,
                outcome,
            } => {
                if !outcome.is_printed() {
                    warn!(%scan_id, "{} {}", outcome.message(), StatusMessages::SAVED_WITHOUT_PRINT);
                }
                self.jobs.push(JobReport {
                    job_id: job_id.to_string(),
                    scan_id,
                    printed: outcome.is_printed(),
                    message: outcome.message(),
                });
            }
            StationEvent::CameraError(error) => self.camera_errors.push(error),
        }
    }

    fn drain(&mut self, handle: &mut StationHandle) {
        while let Some(event) = handle.try_next_event() {
            self.record(event);
        }
    }

    /// Scans recorded whose job has not finished yet.
    fn in_flight(&self) -> bool {
        self.recorded > self.jobs.len()
    }
}

pub async fn run(config: &AppConfig, args: SimulateArgs) -> Result<()> {
    let report = simulate(config, args).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Run the station until every scripted frame has been handled.
pub async fn simulate(config: &AppConfig, args: SimulateArgs) -> Result<SimulationReport> {
    let users = config.user_directory()?;
    let session = SessionHandle::new(SessionStore::new(users));

    let operator = match (&args.user, &args.password) {
        (Some(user), Some(password)) => {
            if !session.login(user, password).await {
                bail!("Login failed for user '{user}'");
            }
            session.current_user().await.map(|user| user.name)
        }
        _ => None,
    };

    let spool_dir = args
        .spool_dir
        .clone()
        .unwrap_or_else(|| config.printer.spool_dir.clone());
    let sink: AnyPrintSink = if args.dry_run {
        MockPrinter::new().0.into()
    } else {
        SpoolPrinter::new(&spool_dir).into()
    };

    let (camera, frames) = MockCamera::new();
    let pipeline = PrintPipeline::new(RasterCardRenderer::new(), sink, config.pipeline.clone());
    let (station, mut handle) = Station::new(
        camera,
        config.visitor_directory(),
        session.clone(),
        pipeline,
        &config.gate,
    );

    info!(
        frames = args.scans.len(),
        dry_run = args.dry_run,
        spool_dir = %spool_dir.display(),
        "Simulation started"
    );

    let script = present_all(&frames, &mut handle, &args);
    let (run, report) = tokio::join!(station.run(), script);
    run.context("Station failed")?;

    let mut report = report?;
    report.operator = operator;
    report.discarded = frames.discarded();
    report.history = session.history().await;
    Ok(report)
}

async fn present_all(
    frames: &MockCameraHandle,
    handle: &mut StationHandle,
    args: &SimulateArgs,
) -> Result<SimulationReport> {
    let mut report = SimulationReport::default();
    let interval = Duration::from_millis(args.interval_ms);

    for (index, payload) in args.scans.iter().enumerate() {
        if index > 0 {
            sleep(interval).await;
        }

        let accepted = frames.present(payload.as_str()).await?;
        report.presented += 1;
        info!(payload = %payload, accepted, "Frame presented");

        // Give the station the frame before moving on.
        while frames.delivered() + frames.discarded() < report.presented as u64 {
            tokio::task::yield_now().await;
        }
        report.drain(handle);
    }

    // One more interval for the last frame to reach the station.
    sleep(interval).await;
    report.drain(handle);

    while report.in_flight() {
        match handle.next_event().await {
            Some(event) => report.record(event),
            None => break,
        }
    }

    handle.shutdown().await?;
    report.drain(handle);
    Ok(report)
}
