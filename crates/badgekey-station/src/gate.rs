//! Scan gate.
//!
//! A QR code held in front of the camera produces a decode event on every
//! frame. The gate lets one event through and drops the rest until the
//! decode cooldown has passed and no print job is in flight.
//!
//! # States
//!
//! - `Open`: the next decode is forwarded
//! - `Cooldown`: a decode was forwarded recently; drop until `until`
//! - `Busy`: a print job owns the pipeline; drop until the job finishes
//!
//! `Busy` remembers when the decode cooldown would have ended. Finishing the
//! job returns to `Cooldown` if that moment is still ahead, otherwise to
//! `Open`. A job never shortens or extends the decode cooldown, and the gate
//! cannot be open while a job is in flight.
//!
//! The gate takes the current instant as an argument instead of reading a
//! clock, so the caller decides when time advances.
//!
//! # Examples
//!
//! ```
//! use badgekey_station::gate::{Decision, DropReason, ScanGate};
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use uuid::Uuid;
//!
//! let mut gate = ScanGate::new(Duration::from_secs(5));
//! let t0 = Instant::now();
//!
//! assert_eq!(gate.on_decode(t0), Decision::Forward);
//! assert_eq!(
//!     gate.on_decode(t0 + Duration::from_millis(100)),
//!     Decision::Dropped(DropReason::Cooling)
//! );
//!
//! let job = Uuid::new_v4();
//! gate.begin_job(job, t0).unwrap();
//!
//! // Cooldown is over but the job is not.
//! assert_eq!(
//!     gate.on_decode(t0 + Duration::from_secs(6)),
//!     Decision::Dropped(DropReason::Busy)
//! );
//!
//! gate.finish_job(job, t0 + Duration::from_secs(7)).unwrap();
//! assert_eq!(gate.on_decode(t0 + Duration::from_secs(7)), Decision::Forward);
//! ```

use badgekey_core::{Error, Result};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};
use uuid::Uuid;

/// Lock state of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open,
    Cooldown { until: Instant },
    Busy { job: Uuid, cooldown_until: Instant },
}

/// Why a decode event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Inside the decode cooldown.
    Cooling,
    /// A print job is in flight.
    Busy,
}

/// What the gate did with a decode event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Forward,
    Dropped(DropReason),
}

/// Gate between the camera and the resolver.
#[derive(Debug)]
pub struct ScanGate {
    state: GateState,
    cooldown: Duration,
    forwarded: u64,
    dropped: u64,
}

impl ScanGate {
    /// Create an open gate.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: GateState::Open,
            cooldown,
            forwarded: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Decide on a decode event received at `now`.
    ///
    /// Forwarding locks the gate before returning, so a second event handled
    /// right after this one is always dropped.
    pub fn on_decode(&mut self, now: Instant) -> Decision {
        self.tick(now);

        let reason = match self.state {
            GateState::Open => {
                self.state = GateState::Cooldown {
                    until: now + self.cooldown,
                };
                self.forwarded += 1;
                debug!(
                    cooldown_ms = self.cooldown.as_millis() as u64,
                    "Decode forwarded, gate locked"
                );
                return Decision::Forward;
            }
            GateState::Cooldown { .. } => DropReason::Cooling,
            GateState::Busy { .. } => DropReason::Busy,
        };

        self.dropped += 1;
        trace!(?reason, "Decode dropped");
        Decision::Dropped(reason)
    }

    /// Mark the pipeline busy with `job`.
    ///
    /// # Errors
    ///
    /// Returns `Error::PipelineBusy` if another job is already in flight.
    pub fn begin_job(&mut self, job: Uuid, now: Instant) -> Result<()> {
        let cooldown_until = match self.state {
            GateState::Busy { job: current, .. } => {
                return Err(Error::PipelineBusy {
                    job: current.to_string(),
                });
            }
            GateState::Cooldown { until } => until,
            GateState::Open => now,
        };

        self.state = GateState::Busy {
            job,
            cooldown_until,
        };
        debug!(%job, "Gate busy with print job");
        Ok(())
    }

    /// Release the pipeline-busy lock held by `job`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownJob` if `job` is not the job in flight. The
    /// gate is left unchanged.
    pub fn finish_job(&mut self, job: Uuid, now: Instant) -> Result<()> {
        match self.state {
            GateState::Busy {
                job: current,
                cooldown_until,
            } if current == job => {
                self.state = if now < cooldown_until {
                    GateState::Cooldown {
                        until: cooldown_until,
                    }
                } else {
                    GateState::Open
                };
                debug!(%job, state = ?self.state, "Print job released gate");
                Ok(())
            }
            _ => Err(Error::UnknownJob(job.to_string())),
        }
    }

    /// Expire the cooldown if it has passed. Returns `true` if the gate
    /// opened.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            GateState::Cooldown { until } if now >= until => {
                self.state = GateState::Open;
                debug!("Decode cooldown expired, gate open");
                true
            }
            _ => false,
        }
    }

    /// When a pending cooldown ends, if the gate is cooling down.
    ///
    /// `None` while open or busy: a busy gate opens when its job finishes,
    /// not at a fixed time.
    pub fn reopen_at(&self) -> Option<Instant> {
        match self.state {
            GateState::Cooldown { until } => Some(until),
            _ => None,
        }
    }

    /// Whether a decode at `now` would be dropped.
    pub fn is_locked(&self, now: Instant) -> bool {
        match self.state {
            GateState::Open => false,
            GateState::Cooldown { until } => now < until,
            GateState::Busy { .. } => true,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, GateState::Busy { .. })
    }

    /// The job holding the pipeline, if any.
    pub fn busy_job(&self) -> Option<Uuid> {
        match self.state {
            GateState::Busy { job, .. } => Some(job),
            _ => None,
        }
    }

    /// Decode events forwarded so far.
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Decode events dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
