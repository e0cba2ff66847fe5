//! Collaborator devices for the visitor badge station.
//!
//! The station depends on two pieces of hardware it does not control:
//!
//! - a [`CameraDevice`] that continuously decodes QR codes and can be
//!   disabled to hard-stop delivery
//! - a [`PrintSink`] that accepts a rasterized card at a fixed paper size
//!
//! Mock implementations with test handles live in [`mock`]; [`SpoolPrinter`]
//! writes cards to disk. The [`devices`] module provides enum wrappers for
//! concrete dispatch, since native async traits are not object-safe.
//!
//! # Examples
//!
//! ```no_run
//! use badgekey_hardware::{CameraDevice, Result};
//!
//! async fn wait_for_code<C: CameraDevice>(camera: &mut C) -> Result<String> {
//!     let event = camera.next_decode().await?;
//!     Ok(event.payload)
//! }
//! ```

pub mod devices;
pub mod error;
pub mod mock;
pub mod spool;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use spool::SpoolPrinter;
pub use traits::{CameraDevice, DecodeEvent, PrintRequest, PrintSink};
pub use types::DeviceInfo;
