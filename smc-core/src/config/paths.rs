//! Where configuration lives on disk

use std::path::PathBuf;

const APP_DIR: &str = "smc";
const FILE_NAME: &str = "config.toml";

/// Per-user configuration directory for this client.
///
/// - Linux: `$XDG_CONFIG_HOME/smc` or `~/.config/smc`
/// - macOS: `~/Library/Application Support/smc`
/// - no home directory: `/etc/smc`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join(APP_DIR)
}

/// Default configuration file, `config.toml` inside [`config_dir`].
pub fn default_config_path() -> PathBuf {
    config_dir().join(FILE_NAME)
}
