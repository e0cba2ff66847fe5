//! Scanner station for the visitor badge kiosk.
//!
//! This crate wires the camera, the visitor resolver, the session and the
//! card printer into one event loop:
//!
//! - [`ScanGate`] drops the burst of duplicate decodes a held QR code causes
//!   and keeps new scans out while a job is printing
//! - [`PrintPipeline`] drives a job through preparing, capturing, printing
//!   and done, with [`StatusMachine`] enforcing the order
//! - [`Station`] runs the loop; [`StationHandle`] dismisses, shuts down and
//!   observes it

pub mod config;
pub mod error;
pub mod gate;
pub mod job;
pub mod messages;
pub mod pipeline;
pub mod station;
pub mod status;

pub use config::{GateConfig, PipelineConfig, StationConfig};
pub use error::{PipelineError, Result, StationError};
pub use gate::{Decision, DropReason, GateState, ScanGate};
pub use job::PrintJob;
pub use messages::StatusMessages;
pub use pipeline::PrintPipeline;
pub use station::{JobOutcome, Station, StationEvent, StationHandle};
pub use status::{PrintStatus, StatusMachine, StatusTransition};
