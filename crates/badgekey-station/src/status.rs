//! Print status state machine.
//!
//! Tracks one print job's progress through the pipeline and enforces the
//! stage order.
//!
//! # States
//!
//! - `Idle`: no job in flight
//! - `Preparing`: card mounted off-screen, waiting for layout
//! - `Capturing`: rasterizing the mounted card
//! - `Printing`: image submitted to the print sink
//! - `Done`: printed, held briefly so the operator sees it
//!
//! # Valid Transitions
//!
//! - Idle → Preparing → Capturing → Printing → Done → Idle
//! - Preparing / Capturing / Printing → Idle (error path)
//!
//! # Examples
//!
//! ```
//! use badgekey_station::{PrintStatus, StatusMachine};
//!
//! let mut machine = StatusMachine::new();
//! machine.transition_to(PrintStatus::Preparing).unwrap();
//! machine.transition_to(PrintStatus::Capturing).unwrap();
//!
//! // Stages cannot be skipped.
//! assert!(machine.transition_to(PrintStatus::Done).is_err());
//! ```

use badgekey_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Maximum number of transitions kept in history.
///
/// A successful job is five transitions, so this covers the last dozen jobs.
const MAX_HISTORY_SIZE: usize = 64;

/// Visible status of the print pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrintStatus {
    /// No job in flight.
    #[default]
    Idle,

    /// Card mounted off-screen, waiting for layout to complete.
    Preparing,

    /// Rasterizing the mounted card.
    Capturing,

    /// Image submitted to the print sink.
    Printing,

    /// Printed successfully; held before returning to idle.
    Done,
}

impl fmt::Display for PrintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            PrintStatus::Idle => "Idle",
            PrintStatus::Preparing => "Preparing",
            PrintStatus::Capturing => "Capturing",
            PrintStatus::Printing => "Printing",
            PrintStatus::Done => "Done",
        };
        write!(f, "{}", status)
    }
}

impl PrintStatus {
    /// Check if transition to target status is valid from this status.
    ///
    /// # Examples
    ///
    /// ```
    /// use badgekey_station::PrintStatus;
    ///
    /// assert!(PrintStatus::Idle.can_transition_to(&PrintStatus::Preparing));
    /// assert!(PrintStatus::Capturing.can_transition_to(&PrintStatus::Idle));
    /// assert!(!PrintStatus::Idle.can_transition_to(&PrintStatus::Printing));
    /// ```
    pub fn can_transition_to(&self, target: &PrintStatus) -> bool {
        matches!(
            (self, target),
            // Forward path
            (PrintStatus::Idle, PrintStatus::Preparing)
            | (PrintStatus::Preparing, PrintStatus::Capturing)
            | (PrintStatus::Capturing, PrintStatus::Printing)
            | (PrintStatus::Printing, PrintStatus::Done)
            | (PrintStatus::Done, PrintStatus::Idle)
            // Error path
            | (
                PrintStatus::Preparing | PrintStatus::Capturing | PrintStatus::Printing,
                PrintStatus::Idle
            )
        )
    }

    /// True while a job occupies the pipeline.
    pub fn is_busy(&self) -> bool {
        !matches!(self, PrintStatus::Idle)
    }
}

/// A single status transition with timestamp.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub from: PrintStatus,
    pub to: PrintStatus,
    pub timestamp: Instant,
}

impl StatusTransition {
    pub fn new(from: PrintStatus, to: PrintStatus) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Time since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// State machine for the print pipeline's visible status.
///
/// Not thread-safe; the pipeline owns it on the event loop.
#[derive(Debug)]
pub struct StatusMachine {
    current: PrintStatus,
    entered_at: Instant,
    history: VecDeque<StatusTransition>,
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusMachine {
    /// Create a new machine in `Idle`.
    pub fn new() -> Self {
        Self {
            current: PrintStatus::Idle,
            entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current(&self) -> PrintStatus {
        self.current
    }

    /// Time spent in the current status.
    pub fn time_in_current(&self) -> Duration {
        self.entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StatusTransition> {
        &self.history
    }

    /// Get the last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StatusTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Transition to a new status, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// allowed from the current status. The machine is left unchanged.
    pub fn transition_to(&mut self, next: PrintStatus) -> Result<StatusTransition> {
        if !self.current.can_transition_to(&next) {
            return Err(Error::InvalidStateTransition {
                from: self.current.to_string(),
                to: next.to_string(),
            });
        }

        let transition = StatusTransition::new(self.current, next);
        self.apply(transition.clone());
        Ok(transition)
    }

    /// Force the machine back to `Idle` from any status.
    ///
    /// Returns `None` if it was already idle.
    pub fn reset(&mut self) -> Option<StatusTransition> {
        if self.current == PrintStatus::Idle {
            return None;
        }

        let transition = StatusTransition::new(self.current, PrintStatus::Idle);
        self.apply(transition.clone());
        Some(transition)
    }

    fn apply(&mut self, transition: StatusTransition) {
        self.current = transition.to;
        self.entered_at = transition.timestamp;

        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition);
    }
}
