//! Configuration types for the SMC client
//!
//! - [`ClientConfig`] - decoding and probing settings, loaded once at startup
//! - [`default_config_path`] - where the configuration file lives by default

mod client_config;
mod paths;

pub use client_config::{ClientConfig, PlausibleRange, ProbeConfig};
pub use paths::{config_dir, default_config_path};
