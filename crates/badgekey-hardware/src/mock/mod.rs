//! Mock device implementations for testing and development.
//!
//! Each mock comes with a handle that drives or inspects it from the test
//! side without physical hardware.

pub mod camera;
pub mod printer;

pub use camera::{MockCamera, MockCameraHandle};
pub use printer::{MockPrinter, MockPrinterHandle};
