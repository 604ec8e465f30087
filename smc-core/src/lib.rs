//! SMC Core Library
//!
//! Shared types, the static key catalog, the value codec and configuration
//! for the SMC telemetry client. Used by the hardware crate and the CLI.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod names;
pub mod types;

// Re-export commonly used types
pub use catalog::Category;
pub use codec::{decode, decode_with};
pub use config::{default_config_path, ClientConfig, PlausibleRange, ProbeConfig};
pub use error::*;
pub use key::{FanRole, Key};
pub use names::human_readable_name_for_key;
pub use types::*;
