//! One function per subcommand; each prints its result to stdout

use anyhow::{Context, Result};
use smc_core::{Category, Key, SmcError};
use smc_hardware::SmcClient;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::CliConfig;
use crate::format::{self, format_success, OutputFormat};
use crate::report::{CategorySummary, FanReport, InfoReport, KeyDump, KeyEntry, NamedReading};

use super::commands::ConfigCommands;

/// Handle info command
pub fn handle_info(client: &SmcClient, format: OutputFormat) -> Result<()> {
    let key_count = match client.key_count() {
        Ok(count) => Some(count),
        Err(e) => {
            debug!("Key count unavailable: {}", e);
            None
        }
    };

    let categories = Category::ALL
        .iter()
        .map(|&category| CategorySummary {
            category,
            working: client.working_keys(category).len(),
            catalogued: client.all_keys(category).len(),
        })
        .collect();

    let info = InfoReport {
        transport: client.connection().description()?,
        key_count,
        fan_count: client.number_of_fans()?,
        categories,
    };

    println!("{}", format::format_info(&info, format)?);
    Ok(())
}

/// Collect catalog entries for `category` (or every category)
pub fn collect_keys(client: &SmcClient, category: Option<Category>, all: bool) -> Vec<KeyEntry> {
    let categories = match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    categories
        .into_iter()
        .flat_map(|category| {
            let working = client.working_keys(category);
            client
                .all_keys(category)
                .iter()
                .map(move |&key| KeyEntry {
                    key,
                    name: client.human_readable_name_for_key(key),
                    category,
                    working: working.contains(&key),
                })
        })
        .filter(|entry| all || entry.working)
        .collect()
}

/// Handle keys command
pub fn handle_keys(
    client: &SmcClient,
    category: Option<Category>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let keys = collect_keys(client, category, all);
    println!("{}", format::format_keys(&keys, format)?);
    Ok(())
}

/// Handle read command
pub fn handle_read(client: &SmcClient, key: &str, format: OutputFormat) -> Result<()> {
    let key: Key = key.parse()?;
    let dump = KeyDump::read(client, key);

    // Without key-info there is nothing to show
    if let (None, Some(error)) = (dump.tag, &dump.error) {
        return Err(anyhow::anyhow!("{}", error));
    }

    println!("{}", format::format_dump(std::slice::from_ref(&dump), format)?);
    Ok(())
}

/// Readings of every working key in `category`.
///
/// Keys that fail now after answering during probing are left out with a
/// warning so one flaky sensor does not hide the rest of the table.
pub fn collect_readings(client: &SmcClient, category: Category) -> Vec<NamedReading> {
    client
        .read_category(category)
        .into_iter()
        .filter_map(|(key, result)| match result {
            Ok(reading) => Some(NamedReading::new(client, reading)),
            Err(e) => {
                warn!("Skipping {}: {}", key, e);
                None
            }
        })
        .collect()
}

/// Handle temps/voltages/currents/power commands
pub fn handle_category(client: &SmcClient, category: Category, format: OutputFormat) -> Result<()> {
    let title = match category {
        Category::Temperature => "Temperatures",
        Category::Voltage => "Voltages",
        Category::Current => "Currents",
        Category::Power => "Power",
        Category::Fan => "Fan Keys",
    };

    let readings = collect_readings(client, category);
    println!("{}", format::format_readings(title, &readings, format)?);
    Ok(())
}

/// A fan speed, or `None` if this machine does not provide it
fn optional_speed(result: smc_core::Result<f64>) -> Result<Option<f64>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_missing_sensor() => Ok(None),
        Err(SmcError::Read { key, status }) => {
            debug!("{} unreadable (status 0x{:02X})", key, status);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Speeds of every fan the controller reports
pub fn collect_fans(client: &SmcClient) -> Result<Vec<FanReport>> {
    let count = client.number_of_fans()?;

    (0..count)
        .map(|index| {
            Ok(FanReport {
                index,
                name: format!("Fan {}", index),
                current: optional_speed(client.speed_of_fan(index))?,
                minimum: optional_speed(client.minimum_speed_of_fan(index))?,
                maximum: optional_speed(client.maximum_speed_of_fan(index))?,
                target: optional_speed(client.target_speed_of_fan(index))?,
            })
        })
        .collect()
}

/// Handle fans command
pub fn handle_fans(client: &SmcClient, format: OutputFormat) -> Result<()> {
    let fans = collect_fans(client)?;
    println!("{}", format::format_fans(&fans, format)?);
    Ok(())
}

/// Handle cpu-temp command
pub fn handle_cpu_temp(client: &SmcClient, format: OutputFormat) -> Result<()> {
    let celsius = client
        .cpu_temperature_in_degrees_celsius()
        .context("Cannot read CPU temperature")?;
    let reading = NamedReading::new(
        client,
        smc_core::Reading::new(smc_core::catalog::CPU_DIE_TEMPERATURE, celsius),
    );

    println!("{}", format::format_reading(&reading, format)?);
    Ok(())
}

/// Handle light command
pub fn handle_light(client: &SmcClient, format: OutputFormat) -> Result<()> {
    let lux = client
        .ambient_light_in_lux()
        .context("Cannot read ambient light")?;
    let reading = NamedReading::new(
        client,
        smc_core::Reading::new(smc_core::catalog::AMBIENT_LIGHT, f64::from(lux)),
    );

    println!("{}", format::format_reading(&reading, format)?);
    Ok(())
}

/// Handle dump command
pub fn handle_dump(client: &SmcClient, format: OutputFormat) -> Result<()> {
    let keys = client
        .controller_keys()
        .context("Cannot enumerate controller keys")?;
    let dumps: Vec<KeyDump> = keys.into_iter().map(|key| KeyDump::read(client, key)).collect();

    println!("{}", format::format_dump(&dumps, format)?);
    Ok(())
}

/// `config show|path|init`
pub fn handle_config(
    command: ConfigCommands,
    effective: &CliConfig,
    config_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", format::format_config(effective, format)?);
        }
        ConfigCommands::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            CliConfig::default().save(config_path)?;
            println!(
                "{}",
                format_success(&format!("Wrote {}", config_path.display()))
            );
        }
    }

    Ok(())
}

/// Write the completion script for `shell` to stdout
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;

    let mut command = super::Cli::command();
    let name = command.get_name().to_owned();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
}
