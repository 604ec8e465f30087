//! smcctl library
//!
//! Command-line front end for the SMC telemetry client. The binary in
//! `main.rs` parses arguments, builds a [`config::CliConfig`] and dispatches
//! to the handlers in [`cli`].
//!
//! ```no_run
//! use smc_core::{Category, ClientConfig};
//! use smc_hardware::{MockSmc, SmcClient};
//! use smcctl::cli::collect_readings;
//!
//! let client = SmcClient::with_transport(Box::new(MockSmc::macbook_pro()), ClientConfig::default());
//! for reading in collect_readings(&client, Category::Temperature) {
//!     println!("{}: {}", reading.name, reading.display_value());
//! }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

/// Serializable command results.
pub mod report;
