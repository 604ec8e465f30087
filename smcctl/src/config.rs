//! Settings for `smcctl`
//!
//! One TOML file holds the CLI defaults at top level and the client's
//! decoding and probing settings under `[client]`:
//!
//! ```toml
//! output_format = "json"
//! verbose = false
//! mock = false
//!
//! [client]
//! float_byte_order = "big"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smc_core::{default_config_path, Category, ClientConfig, PlausibleRange};
use std::path::{Path, PathBuf};

use crate::format::OutputFormat;

pub const ENV_FORMAT: &str = "SMCCTL_FORMAT";
pub const ENV_VERBOSE: &str = "SMCCTL_VERBOSE";
pub const ENV_MOCK: &str = "SMCCTL_MOCK";

/// Effective `smcctl` settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    pub output_format: OutputFormat,

    /// Debug logging on stderr
    pub verbose: bool,

    /// Read from the simulated controller instead of the hardware
    pub mock: bool,

    pub client: ClientConfig,
}

impl CliConfig {
    /// Read `path`; a file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Cannot parse {}", path.display()))
    }

    /// Write as TOML, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        let text = toml::to_string_pretty(self).context("Cannot encode settings as TOML")?;
        std::fs::write(path, text).with_context(|| format!("Cannot write {}", path.display()))
    }

    /// `path` if given, otherwise the per-user default location
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf).unwrap_or_else(default_config_path)
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Layers settings from each source over the defaults.
///
/// Call order is precedence order: config file, then environment, then
/// command-line flags. A later layer only replaces the fields it sets.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    output_format: Option<OutputFormat>,
    verbose: Option<bool>,
    mock: Option<bool>,
    client: Option<ClientConfig>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = Some(mock);
        self
    }

    /// Replace the client settings; every probe range must be non-empty and finite.
    pub fn with_client(mut self, client: ClientConfig) -> Result<Self> {
        check_probe_ranges(&client)?;
        self.client = Some(client);
        Ok(self)
    }

    /// Layer the config file over whatever is set so far.
    ///
    /// Skipped when `enabled` is false or the file does not exist. A file that
    /// cannot be read or parsed, or that carries an unusable probe range, is
    /// an error naming the file.
    pub fn with_config_file(mut self, path: Option<&Path>, enabled: bool) -> Result<Self> {
        if !enabled {
            return Ok(self);
        }

        let path = CliConfig::resolve_path(path);
        if !path.exists() {
            return Ok(self);
        }

        let file = CliConfig::load(&path)?;
        check_probe_ranges(&file.client).with_context(|| format!("In {}", path.display()))?;

        self.output_format = Some(file.output_format);
        self.verbose = Some(file.verbose);
        self.mock = Some(file.mock);
        self.client = Some(file.client);
        Ok(self)
    }

    /// Layer `SMCCTL_*` variables. Unparseable formats are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(format) = std::env::var(ENV_FORMAT)
            .ok()
            .and_then(|value| value.parse().ok())
        {
            self.output_format = Some(format);
        }
        if let Ok(value) = std::env::var(ENV_VERBOSE) {
            self.verbose = Some(parse_bool(&value));
        }
        if let Ok(value) = std::env::var(ENV_MOCK) {
            self.mock = Some(parse_bool(&value));
        }
        self
    }

    pub fn build(self) -> Result<CliConfig> {
        let client = self.client.unwrap_or_default();
        check_probe_ranges(&client)?;

        Ok(CliConfig {
            output_format: self.output_format.unwrap_or_default(),
            verbose: self.verbose.unwrap_or(false),
            mock: self.mock.unwrap_or(false),
            client,
        })
    }
}

fn check_probe_ranges(client: &ClientConfig) -> Result<()> {
    Category::ALL
        .into_iter()
        .try_for_each(|category| check_range(category, client.probe.range(category)))
}

fn check_range(category: Category, range: &PlausibleRange) -> Result<()> {
    if !(range.min.is_finite() && range.max.is_finite()) {
        anyhow::bail!("{} probe range needs finite bounds", category);
    }
    if range.min > range.max {
        anyhow::bail!(
            "{} probe range is empty ({} > {})",
            category,
            range.min,
            range.max
        );
    }
    Ok(())
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use smc_core::ByteOrder;

    fn clear_env() {
        for var in [ENV_FORMAT, ENV_VERBOSE, ENV_MOCK] {
            std::env::remove_var(var);
        }
    }

    fn write_file(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_defaults_print_tables_from_hardware() {
        let config = CliConfig::default();
        assert_eq!(config.output_format, OutputFormat::Table);
        assert!(!config.verbose);
        assert!(!config.mock);
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_toml_has_client_section_and_reparses() {
        let config = CliConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("output_format = \"table\""));
        assert!(text.contains("[client]"));
        assert_eq!(toml::from_str::<CliConfig>(&text).unwrap(), config);
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("smc").join("config.toml");

        let config = CliConfig {
            output_format: OutputFormat::Json,
            ..CliConfig::default()
        };
        config.save(&path).unwrap();

        assert!(path.exists());
        assert_eq!(CliConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "mock = true\n");

        let config = CliConfig::load(&path).unwrap();
        assert!(config.mock);
        assert_eq!(config.output_format, OutputFormat::Table);
        assert_eq!(config.client.float_byte_order, ByteOrder::Big);
    }

    #[test]
    fn test_unusable_probe_ranges_rejected() {
        let mut inverted = ClientConfig::default();
        inverted.probe.voltage = PlausibleRange::new(10.0, 5.0, false);
        let error = ConfigBuilder::new().with_client(inverted).unwrap_err();
        assert!(error.to_string().contains("voltage"));

        let mut unbounded = ClientConfig::default();
        unbounded.probe.fan.max = f64::INFINITY;
        assert!(ConfigBuilder::new().with_client(unbounded).is_err());
    }

    #[test]
    fn test_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "output_format = \"json\"\nmock = true\n\n[client]\nfloat_byte_order = \"little\"\n",
        );

        let config = ConfigBuilder::new()
            .with_config_file(Some(&path), true)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.mock);
        assert!(!config.verbose);
        assert_eq!(config.client.float_byte_order, ByteOrder::Little);
    }

    #[test]
    fn test_file_layer_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "mock = true\n");

        let config = ConfigBuilder::new()
            .with_config_file(Some(&path), false)
            .unwrap()
            .build()
            .unwrap();
        assert!(!config.mock);
    }

    #[test]
    fn test_unknown_format_in_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "output_format = \"yaml\"\n");

        let error = ConfigBuilder::new()
            .with_config_file(Some(&path), true)
            .unwrap_err();
        assert!(format!("{:#}", error).contains("config.toml"));
    }

    #[test]
    #[serial]
    fn test_env_layer() {
        clear_env();
        std::env::set_var(ENV_FORMAT, "JSON");
        std::env::set_var(ENV_VERBOSE, "yes");
        std::env::set_var(ENV_MOCK, "1");

        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();
        clear_env();

        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.verbose);
        assert!(config.mock);
    }

    #[test]
    #[serial]
    fn test_without_any_source_gives_defaults() {
        clear_env();
        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    #[serial]
    fn test_flags_beat_env_beat_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "output_format = \"json\"\nverbose = true\n");
        std::env::set_var(ENV_FORMAT, "table");
        std::env::set_var(ENV_MOCK, "true");

        let config = ConfigBuilder::new()
            .with_config_file(Some(&path), true)
            .unwrap()
            .with_env_overrides()
            .with_mock(false)
            .build()
            .unwrap();
        clear_env();

        assert_eq!(config.output_format, OutputFormat::Table);
        assert!(config.verbose);
        assert!(!config.mock);
    }

    #[test]
    #[serial]
    fn test_bad_env_format_is_ignored() {
        clear_env();
        std::env::set_var(ENV_FORMAT, "xml");

        let config = ConfigBuilder::new()
            .with_output_format(OutputFormat::Json)
            .with_env_overrides()
            .build()
            .unwrap();
        clear_env();

        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_bool_spellings() {
        for yes in ["1", "true", "TRUE", "yes", "on"] {
            assert!(parse_bool(yes), "{}", yes);
        }
        for no in ["0", "false", "", "maybe"] {
            assert!(!parse_bool(no), "{}", no);
        }
    }
}
