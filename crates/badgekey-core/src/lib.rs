//! Core types shared by every badgekey crate.
//!
//! Holds the visitor/scan data model, the workspace-wide constants observed on
//! the kiosk hardware, and the core error type.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
