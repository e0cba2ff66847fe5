//! Visitor card rendering.
//!
//! Turns a [`ScanRecord`](badgekey_core::ScanRecord) into a printable image:
//!
//! 1. [`CardLayout`] places the header wave, logo, company name, a QR code of
//!    the visitor id, the visitor information rows, the scan time and the
//!    footer on a fixed 757 × 1069 px page.
//! 2. [`rasterize`] paints the layout with the built-in [`font`] and encodes
//!    it as a grayscale PNG at the requested pixel size.
//!
//! The [`CardRenderer`] trait is the collaborator the print pipeline drives:
//! mount a card, wait for layout, capture, unmount. [`RasterCardRenderer`] is
//! the built-in implementation and [`mock::MockCardRenderer`] a scriptable
//! stand-in for tests.

pub mod error;
pub mod font;
pub mod layout;
pub mod mock;
pub mod qr;
pub mod raster;
pub mod renderer;

pub use error::{RenderError, Result};
pub use layout::{Alignment, CardLayout, Element};
pub use qr::QrMatrix;
pub use raster::{paint, rasterize};
pub use renderer::{CardRenderer, RasterCardRenderer};
