//! Kiosk configuration file.
//!
//! ```toml
//! [gate]
//! cooldown_ms = 5000
//!
//! [pipeline]
//! layout_timeout_ms = 2000
//! done_hold_ms = 1500
//!
//! [printer]
//! spool_dir = "spool"
//!
//! [[users]]
//! username = "admin"
//! password = "admin123"
//! name = "Irhan Achmad J"
//!
//! [[visitors]]
//! id = "1"
//! name = "Irhan Achmad J"
//! company = "SMK Jaya"
//! ```
//!
//! Every table is optional. Without `[[users]]` or `[[visitors]]` the kiosk
//! falls back to its built-in demo data.

use badgekey_core::VisitorRecord;
use badgekey_session::{InMemoryUserDirectory, NewUser, VisitorDirectory};
use badgekey_station::{GateConfig, PipelineConfig, StationConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Top-level kiosk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub printer: PrinterConfig,

    /// Operator accounts. Empty means the built-in administrator.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<NewUser>,

    /// Visitor table keyed by `id`. Empty means the built-in demo visitor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visitors: Vec<VisitorRecord>,
}

/// Print output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrinterConfig {
    /// Directory the spool printer writes card images to.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            spool_dir: default_spool_dir(),
        }
    }
}

fn default_spool_dir() -> PathBuf {
    PathBuf::from("spool")
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails [`validate`](Self::validate).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check timings, sizes, users and visitors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.station()
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        self.user_directory()?;

        let mut seen = HashSet::new();
        for visitor in &self.visitors {
            if visitor.id.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "visitor '{}' has an empty id",
                    visitor.name
                )));
            }
            if !seen.insert(visitor.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate visitor id '{}'",
                    visitor.id
                )));
            }
        }

        Ok(())
    }

    pub fn station(&self) -> StationConfig {
        StationConfig {
            gate: self.gate.clone(),
            pipeline: self.pipeline.clone(),
        }
    }

    /// Build the operator directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a user lacks a required field.
    pub fn user_directory(&self) -> Result<InMemoryUserDirectory, ConfigError> {
        if self.users.is_empty() {
            return Ok(InMemoryUserDirectory::seeded());
        }
        InMemoryUserDirectory::from_profiles(self.users.iter().cloned())
            .map_err(|e| ConfigError::Validation(format!("[[users]]: {e}")))
    }

    pub fn visitor_directory(&self) -> VisitorDirectory {
        if self.visitors.is_empty() {
            return VisitorDirectory::seeded();
        }
        VisitorDirectory::from_records(self.visitors.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgekey_session::{CredentialVerifier, Resolution};
    use rstest::rstest;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_demo_data() {
        let config = AppConfig::from_toml("").unwrap();

        assert_eq!(config.gate.cooldown(), Duration::from_secs(5));
        assert_eq!(config.printer.spool_dir, PathBuf::from("spool"));
        assert!(config.user_directory().unwrap().verify("admin", "admin123").is_some());
        assert!(config.visitor_directory().resolve("1").is_found());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml(
            r#"
            [gate]
            cooldown_ms = 3000

            [pipeline]
            done_hold_ms = 1000

            [printer]
            spool_dir = "/var/spool/badgekey"

            [[users]]
            username = "satpam"
            password = "jaga2026"
            name = "Budi Santoso"
            position = "Security"

            [[visitors]]
            id = "A-17"
            name = "Dewi Lestari"
            company = "PT Sinar"

            [[visitors]]
            id = "A-18"
            name = "Rudi Hartono"
            "#,
        )
        .unwrap();

        assert_eq!(config.gate.cooldown_ms, 3000);
        assert_eq!(config.pipeline.done_hold_ms, 1000);
        assert_eq!(config.printer.spool_dir, PathBuf::from("/var/spool/badgekey"));

        let users = config.user_directory().unwrap();
        assert!(users.verify("satpam", "jaga2026").is_some());
        assert!(users.verify("admin", "admin123").is_none());

        let visitors = config.visitor_directory();
        assert_eq!(visitors.len(), 2);
        assert_eq!(visitors.resolve("1"), Resolution::NotFound);
        match visitors.resolve("A-17") {
            Resolution::Found(visitor) => assert_eq!(visitor.company, "PT Sinar"),
            Resolution::NotFound => panic!("A-17 should resolve"),
        }
    }

    #[rstest]
    #[case("[gate]\ncooldown_ms = 0\n")]
    #[case("[pipeline]\ncapture_width_px = 0\n")]
    #[case("[[users]]\nusername = \"x\"\nname = \"X\"\n")]
    #[case("[[visitors]]\nid = \"\"\nname = \"Nobody\"\n")]
    #[case("[[visitors]]\nid = \"1\"\nname = \"A\"\n\n[[visitors]]\nid = \"1\"\nname = \"B\"\n")]
    fn test_invalid_config(#[case] content: &str) {
        assert!(matches!(
            AppConfig::from_toml(content),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[gate\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip_keeps_settings() {
        let mut config = AppConfig::default();
        config.gate.cooldown_ms = 4000;
        config.visitors.push(VisitorRecord::new("7", "Dewi"));

        let parsed = AppConfig::from_toml(&config.to_toml().unwrap()).unwrap();

        assert_eq!(parsed.gate, config.gate);
        assert_eq!(parsed.visitors, config.visitors);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("badgekey.toml");
        std::fs::write(&path, "[printer]\nspool_dir = \"out\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.printer.spool_dir, PathBuf::from("out"));

        let missing = AppConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
