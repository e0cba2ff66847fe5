//! Types shared across camera and print-sink implementations.

use serde::{Deserialize, Serialize};

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Mock Camera", "Spool Printer").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional device serial number.
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
        }
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("Spool Printer", "spool-v1").with_serial_number("SP-01");

        assert_eq!(info.name, "Spool Printer");
        assert_eq!(info.serial_number.as_deref(), Some("SP-01"));

        let json = serde_json::to_string(&info).unwrap();
        let back: DeviceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
