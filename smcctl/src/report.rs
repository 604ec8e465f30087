//! Serializable views of client results
//!
//! Handlers collect client output into these structs; `format` renders them
//! as tables or JSON.

use serde::Serialize;
use smc_core::{Category, Key, KeyInfo, Reading, TypeTag, Unit};
use smc_hardware::SmcClient;

/// Connection summary for `smcctl info`
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub transport: String,
    pub key_count: Option<u32>,
    pub fan_count: usize,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub working: usize,
    pub catalogued: usize,
}

/// One catalogued key
#[derive(Debug, Clone, Serialize)]
pub struct KeyEntry {
    pub key: Key,
    pub name: String,
    pub category: Category,
    pub working: bool,
}

/// A decoded reading with its display name
#[derive(Debug, Clone, Serialize)]
pub struct NamedReading {
    pub key: Key,
    pub name: String,
    pub value: f64,
    pub unit: Unit,
}

impl NamedReading {
    pub fn new(client: &SmcClient, reading: Reading) -> Self {
        Self {
            key: reading.key,
            name: client.human_readable_name_for_key(reading.key),
            value: reading.value,
            unit: reading.unit,
        }
    }

    /// Value with unit, e.g. `45.25 °C`
    pub fn display_value(&self) -> String {
        Reading {
            key: self.key,
            value: self.value,
            unit: self.unit,
        }
        .to_string()
    }
}

/// Raw and decoded contents of one key
#[derive(Debug, Clone, Serialize)]
pub struct KeyDump {
    pub key: Key,
    pub name: String,
    pub tag: Option<TypeTag>,
    pub size: Option<u32>,
    /// Value bytes as hex
    pub bytes: Option<String>,
    pub value: Option<f64>,
    pub unit: Unit,
    /// Why the key could not be read or decoded
    pub error: Option<String>,
}

impl KeyDump {
    /// Read `key` completely, capturing failures instead of returning them
    pub fn read(client: &SmcClient, key: Key) -> Self {
        let mut dump = Self {
            key,
            name: client.human_readable_name_for_key(key),
            tag: None,
            size: None,
            bytes: None,
            value: None,
            unit: Unit::for_key(key),
            error: None,
        };

        match client.read_raw(key) {
            Ok((info, bytes)) => {
                dump.fill_info(&info);
                dump.bytes = Some(hex_string(&bytes));
                match client.decode(key, &info, &bytes) {
                    Ok(value) => dump.value = Some(value),
                    Err(e) => dump.error = Some(e.to_string()),
                }
            }
            Err(e) => {
                if let Ok(info) = client.key_info(key) {
                    dump.fill_info(&info);
                }
                dump.error = Some(e.to_string());
            }
        }

        dump
    }

    fn fill_info(&mut self, info: &KeyInfo) {
        self.tag = Some(info.tag);
        self.size = Some(info.size);
    }
}

/// Speeds of one fan; `None` where the key is unavailable
#[derive(Debug, Clone, Serialize)]
pub struct FanReport {
    pub index: usize,
    pub name: String,
    pub current: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub target: Option<f64>,
}

/// Lowercase hex with a space between bytes
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
