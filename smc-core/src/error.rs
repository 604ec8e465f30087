//! Error types for the SMC client

use crate::key::Key;
use crate::types::TypeTag;
use thiserror::Error;

/// Core error type for SMC operations
#[derive(Error, Debug)]
pub enum SmcError {
    /// The controller service handle could not be acquired
    #[error("Connection error: {0}")]
    Connection(String),

    /// The key does not exist on this machine
    #[error("Key not found: {0}")]
    KeyNotFound(Key),

    /// The controller rejected a value read with a non-zero status
    #[error("Read of key {key} failed with controller status 0x{status:02X}")]
    Read { key: Key, status: u8 },

    /// Bytes could not be interpreted under the reported type tag
    #[error("Cannot decode '{tag}' value: {reason}")]
    Decode { tag: TypeTag, reason: String },

    /// Fan index beyond the reported fan count
    #[error("Fan index out of range: {index} (machine reports {count} fans)")]
    IndexOutOfRange { index: usize, count: usize },

    /// Key is catalogued but did not respond during probing
    #[error("Sensor unavailable on this machine: {0}")]
    SensorUnavailable(Key),

    /// Text that is not a four-byte key code
    #[error("Invalid key: {0:?} (expected exactly 4 ASCII characters)")]
    InvalidKey(String),

    /// Driver-level or malformed-response failures
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SMC operations
pub type Result<T> = std::result::Result<T, SmcError>;

impl SmcError {
    /// Returns `true` for failures that mean "no data from this sensor"
    /// rather than a broken connection or a caller mistake.
    pub fn is_missing_sensor(&self) -> bool {
        matches!(
            self,
            SmcError::KeyNotFound(_) | SmcError::SensorUnavailable(_)
        )
    }
}

impl From<toml::de::Error> for SmcError {
    fn from(err: toml::de::Error) -> Self {
        SmcError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SmcError {
    fn from(err: toml::ser::Error) -> Self {
        SmcError::Config(err.to_string())
    }
}
