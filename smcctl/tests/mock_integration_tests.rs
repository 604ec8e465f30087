//! Integration tests for smcctl against the simulated controller
//!
//! These drive the library side of the CLI (collection and formatting) the
//! way the binary does in `--mock` mode, without spawning a process.

use anyhow::Result;
use smc_core::{ByteOrder, Category, ClientConfig, Key, TypeTag};
use smc_hardware::{MockSmc, SmcClient};
use smcctl::cli::{collect_fans, collect_keys, collect_readings};
use smcctl::config::CliConfig;
use smcctl::format::{format_dump, format_fans, format_keys, format_readings, OutputFormat};
use smcctl::report::KeyDump;

fn mock_client() -> SmcClient {
    SmcClient::with_transport(Box::new(MockSmc::macbook_pro()), ClientConfig::default())
}

#[test]
fn test_temperatures_json_round_trip() -> Result<()> {
    let client = mock_client();
    let readings = collect_readings(&client, Category::Temperature);
    let json = format_readings("Temperatures", &readings, OutputFormat::Json)?;

    let parsed: serde_json::Value = serde_json::from_str(&json)?;
    let keys: Vec<&str> = parsed
        .as_array()
        .expect("array of readings")
        .iter()
        .filter_map(|r| r["key"].as_str())
        .collect();

    assert_eq!(keys, vec!["TC0D", "TC0P", "TG0D", "TB0T", "Th0H"]);
    assert_eq!(parsed[0]["value"], 45.25);
    Ok(())
}

#[test]
fn test_fans_table_lists_every_fan() -> Result<()> {
    let client = mock_client();
    let fans = collect_fans(&client)?;
    let table = format_fans(&fans, OutputFormat::Table)?;

    assert!(table.contains("Fan 0"));
    assert!(table.contains("Fan 1"));
    assert!(table.contains("2004"));
    Ok(())
}

#[test]
fn test_keys_listing_marks_unavailable() -> Result<()> {
    let client = mock_client();
    let keys = collect_keys(&client, Some(Category::Voltage), true);
    let json = format_keys(&keys, OutputFormat::Json)?;

    let parsed: serde_json::Value = serde_json::from_str(&json)?;
    let vg0c = parsed
        .as_array()
        .expect("array of keys")
        .iter()
        .find(|k| k["key"] == "VG0C")
        .expect("VG0C listed");
    assert_eq!(vg0c["working"], false);
    assert_eq!(vg0c["category"], "voltage");
    Ok(())
}

#[test]
fn test_dump_covers_every_controller_key() -> Result<()> {
    let client = mock_client();
    let dumps: Vec<KeyDump> = client
        .controller_keys()?
        .into_iter()
        .map(|key| KeyDump::read(&client, key))
        .collect();

    assert_eq!(dumps.len() as u32, client.key_count()?);
    let table = format_dump(&dumps, OutputFormat::Table)?;
    assert!(table.contains("RPlt"));
    assert!(table.contains("ch8*"));
    Ok(())
}

#[test]
fn test_config_file_drives_float_byte_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[client]\nfloat_byte_order = \"little\"\n")?;

    let config = CliConfig::builder()
        .with_config_file(Some(&path), true)?
        .build()?;
    assert_eq!(config.client.float_byte_order, ByteOrder::Little);

    let mock = MockSmc::new().with_key(
        Key::new(*b"PSTR"),
        TypeTag::Float32,
        &18.5f32.to_le_bytes(),
    );
    let client = SmcClient::with_transport(Box::new(mock), config.client);

    let readings = collect_readings(&client, Category::Power);
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].value, 18.5);
    Ok(())
}
