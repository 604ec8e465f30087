//! smcctl
//!
//! Command-line reader for SMC sensor telemetry.

use anyhow::{Context, Result};
use clap::Parser;
use smc_core::Category;
use smc_hardware::{MockSmc, SmcClient};
use smcctl::cli::{
    generate_completion, handle_category, handle_config, handle_cpu_temp, handle_dump,
    handle_fans, handle_info, handle_keys, handle_light, handle_read, Cli, Commands,
};
use smcctl::config::CliConfig;
use tracing::{debug, info};

fn main() {
    let cli = Cli::parse();
    let verbose_flag = cli.verbose;

    if let Err(error) = run(cli) {
        eprintln!("Error: {:#}", error);
        if verbose_flag {
            eprintln!("{:?}", error);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = CliConfig::resolve_path(cli.config.as_deref());

    // defaults < file < SMCCTL_* < flags
    let mut builder = CliConfig::builder()
        .with_config_file(Some(&config_path), !cli.no_config)
        .context("Configuration error")?
        .with_env_overrides();

    if let Some(format) = cli.format {
        builder = builder.with_output_format(format);
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }
    if cli.mock {
        builder = builder.with_mock(true);
    }

    let config = builder.build().context("Configuration error")?;
    let format = config.output_format;

    init_tracing(config.verbose);
    debug!("Config file: {}", config_path.display());
    debug!("Effective configuration: {:?}", config);

    // Commands that never touch the controller
    let command = match cli.command {
        Commands::Config { command } => {
            return handle_config(command, &config, &config_path, format);
        }
        Commands::Completion { shell } => {
            generate_completion(shell);
            return Ok(());
        }
        command => command,
    };

    let client = open_client(&config)?;

    let result = match command {
        Commands::Info => handle_info(&client, format),
        Commands::Keys { category, all } => handle_keys(&client, category, all, format),
        Commands::Read { key } => handle_read(&client, &key, format),
        Commands::Temps => handle_category(&client, Category::Temperature, format),
        Commands::Voltages => handle_category(&client, Category::Voltage, format),
        Commands::Currents => handle_category(&client, Category::Current, format),
        Commands::Power => handle_category(&client, Category::Power, format),
        Commands::Fans => handle_fans(&client, format),
        Commands::CpuTemp => handle_cpu_temp(&client, format),
        Commands::Light => handle_light(&client, format),
        Commands::Dump => handle_dump(&client, format),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    };

    debug!(
        "{} controller round trips",
        client.connection().round_trips()
    );
    client.close()?;
    result
}

fn open_client(config: &CliConfig) -> Result<SmcClient> {
    if config.mock {
        info!("Using simulated controller");
        return Ok(SmcClient::with_transport(
            Box::new(MockSmc::macbook_pro()),
            config.client.clone(),
        ));
    }

    SmcClient::open(config.client.clone())
        .context("Cannot open the SMC (run on macOS, or use --mock)")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
