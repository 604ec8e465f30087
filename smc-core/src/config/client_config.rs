//! Client configuration loaded once at startup
//!
//! Read-only after the client is constructed.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::Category;
use crate::error::Result;
use crate::types::ByteOrder;

/// Inclusive range of values a probed sensor may report and still count as
/// working.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibleRange {
    pub min: f64,
    pub max: f64,
    /// Unpopulated sensors commonly read exactly zero
    #[serde(default)]
    pub allow_zero: bool,
}

impl PlausibleRange {
    pub const fn new(min: f64, max: f64, allow_zero: bool) -> Self {
        Self {
            min,
            max,
            allow_zero,
        }
    }

    /// Returns `true` if `value` is finite, inside the range, and non-zero
    /// unless zero is allowed.
    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite()
            && value >= self.min
            && value <= self.max
            && (self.allow_zero || value != 0.0)
    }
}

/// Plausibility rules applied while probing each category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub temperature: PlausibleRange,
    pub voltage: PlausibleRange,
    pub current: PlausibleRange,
    pub power: PlausibleRange,
    pub fan: PlausibleRange,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            temperature: PlausibleRange::new(-40.0, 150.0, false),
            voltage: PlausibleRange::new(0.0, 40.0, false),
            current: PlausibleRange::new(-40.0, 40.0, true),
            power: PlausibleRange::new(0.0, 1000.0, true),
            fan: PlausibleRange::new(0.0, 20000.0, true),
        }
    }
}

impl ProbeConfig {
    /// Range for `category`
    pub fn range(&self, category: Category) -> &PlausibleRange {
        match category {
            Category::Temperature => &self.temperature,
            Category::Voltage => &self.voltage,
            Category::Current => &self.current,
            Category::Power => &self.power,
            Category::Fan => &self.fan,
        }
    }
}

/// Configuration for an SMC client.
///
/// Located at [`default_config_path`](crate::default_config_path) by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Byte order of `flt ` values. Apple-silicon controllers use `little`.
    pub float_byte_order: ByteOrder,

    /// Probing plausibility rules
    pub probe: ProbeConfig,
}

impl ClientConfig {
    /// Parse ClientConfig from TOML string.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize ClientConfig to TOML string.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Write to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_range() {
        let range = PlausibleRange::new(-40.0, 150.0, false);
        assert!(range.accepts(45.5));
        assert!(range.accepts(-10.0));
        assert!(!range.accepts(0.0));
        assert!(!range.accepts(151.0));
        assert!(!range.accepts(f64::NAN));
        assert!(!range.accepts(f64::INFINITY));

        let range = PlausibleRange::new(0.0, 20000.0, true);
        assert!(range.accepts(0.0));
    }

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.float_byte_order, ByteOrder::Big);
        assert!(!config.probe.range(Category::Temperature).allow_zero);
        assert!(config.probe.range(Category::Fan).allow_zero);
    }

    #[test]
    fn test_client_config_serialization() {
        let config = ClientConfig::default();
        let toml_str = config.to_toml().unwrap();

        assert!(toml_str.contains("float_byte_order = \"big\""));
        assert!(toml_str.contains("[probe.temperature]"));
        assert_eq!(ClientConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_client_config_partial_deserialization() {
        let toml_str = r#"
            float_byte_order = "little"

            [probe.fan]
            min = 0.0
            max = 8000.0
            allow_zero = false
        "#;

        let config = ClientConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.float_byte_order, ByteOrder::Little);
        assert_eq!(config.probe.fan.max, 8000.0);
        assert!(!config.probe.fan.allow_zero);
        // Untouched sections keep their defaults
        assert_eq!(config.probe.voltage, ProbeConfig::default().voltage);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.float_byte_order = ByteOrder::Little;
        config.save(&path).unwrap();

        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "float_byte_order = \"sideways\"").unwrap();

        let err = ClientConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::SmcError::Config(_)));
    }
}
