//! clap definitions for `smcctl`

use clap::{Parser, Subcommand};
use smc_core::Category;
use std::path::PathBuf;

use crate::format::OutputFormat;

/// SMC sensor reader
#[derive(Parser, Debug)]
#[command(name = "smcctl")]
#[command(version, about = "Read temperatures, fans and power rails from the SMC", long_about = None)]
pub struct Cli {
    /// table or json; beats SMCCTL_FORMAT and the config file
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging (overrides config file)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use the simulated controller instead of the hardware
    #[arg(long, global = true)]
    pub mock: bool,

    /// Ignore the config file entirely
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/smc/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show controller information
    Info,

    /// List catalogued keys
    Keys {
        /// Only this category (temperature, voltage, current, power, fan)
        #[arg(short, long)]
        category: Option<Category>,

        /// Include keys that did not respond on this machine
        #[arg(short, long)]
        all: bool,
    },

    /// Read one key
    Read {
        /// Four-character key code, e.g. TC0D
        key: String,
    },

    /// Show working temperature sensors
    Temps,

    /// Show working voltage sensors
    Voltages,

    /// Show working current sensors
    Currents,

    /// Show working power sensors
    Power,

    /// Show fan speeds
    Fans,

    /// Show the CPU die temperature
    CpuTemp,

    /// Show the ambient light level
    Light,

    /// Read every key the controller exposes
    Dump,

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a completion script to stdout
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
