//! Argument parsing and command dispatch targets
//!
//! - [`commands`] - clap definitions for `smcctl` and its subcommands
//! - [`handlers`] - one function per subcommand, each printing to stdout

mod commands;
mod handlers;

pub use commands::*;
pub use handlers::*;
