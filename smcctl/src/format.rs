//! Rendering of reports as coloured tables or pretty JSON

use anyhow::Result;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};

use crate::config::CliConfig;
use crate::report::{FanReport, InfoReport, KeyDump, KeyEntry, NamedReading};

/// How command results are printed.
///
/// Spelled `table` or `json` on the command line, in the config file and in
/// `SMCCTL_FORMAT`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Coloured tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("unknown output format '{}' (expected table or json)", other),
        }
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn rpm(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}", v),
        None => "-".dimmed().to_string(),
    }
}

/// Format connection summary
pub fn format_info(info: &InfoReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(info),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&"SMC Information".bold().to_string());
            output.push('\n');
            output.push_str(&format!("Transport: {}", info.transport.cyan()));
            output.push('\n');
            output.push_str(&format!(
                "Controller Keys: {}",
                match info.key_count {
                    Some(count) => count.to_string().yellow(),
                    None => "unknown".red(),
                }
            ));
            output.push('\n');
            output.push_str(&format!(
                "Fans: {}",
                info.fan_count.to_string().yellow()
            ));

            #[derive(Tabled)]
            struct CategoryRow {
                #[tabled(rename = "Category")]
                category: String,
                #[tabled(rename = "Working")]
                working: String,
                #[tabled(rename = "Catalogued")]
                catalogued: usize,
            }

            let rows: Vec<CategoryRow> = info
                .categories
                .iter()
                .map(|c| CategoryRow {
                    category: c.category.to_string(),
                    working: if c.working > 0 {
                        c.working.to_string().green().to_string()
                    } else {
                        "0".red().to_string()
                    },
                    catalogued: c.catalogued,
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            output.push('\n');
            output.push_str(&table);
            Ok(output)
        }
    }
}

/// Format a key listing
pub fn format_keys(keys: &[KeyEntry], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(keys),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct KeyRow {
                #[tabled(rename = "Key")]
                key: String,
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "Category")]
                category: String,
                #[tabled(rename = "Working")]
                working: String,
            }

            let rows: Vec<KeyRow> = keys
                .iter()
                .map(|entry| KeyRow {
                    key: entry.key.to_string().cyan().to_string(),
                    name: entry.name.clone(),
                    category: entry.category.to_string(),
                    working: if entry.working {
                        "✓".green().to_string()
                    } else {
                        "✗".red().to_string()
                    },
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Keys:".bold(), table))
        }
    }
}

/// Format sensor readings under `title`
pub fn format_readings(
    title: &str,
    readings: &[NamedReading],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => json(readings),
        OutputFormat::Table => {
            if readings.is_empty() {
                return Ok(format!(
                    "{}\n{}",
                    format!("{}:", title).bold(),
                    "No working sensors".dimmed()
                ));
            }

            #[derive(Tabled)]
            struct ReadingRow {
                #[tabled(rename = "Key")]
                key: String,
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows: Vec<ReadingRow> = readings
                .iter()
                .map(|r| ReadingRow {
                    key: r.key.to_string().cyan().to_string(),
                    name: r.name.clone(),
                    value: r.display_value().green().to_string(),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", format!("{}:", title).bold(), table))
        }
    }
}

/// Format a single reading
pub fn format_reading(reading: &NamedReading, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(reading),
        OutputFormat::Table => Ok(format!(
            "{}: {}",
            reading.name,
            reading.display_value().green()
        )),
    }
}

/// Format fan speeds
pub fn format_fans(fans: &[FanReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(fans),
        OutputFormat::Table => {
            if fans.is_empty() {
                return Ok(format!("{}\n{}", "Fans:".bold(), "No fans".dimmed()));
            }

            #[derive(Tabled)]
            struct FanRow {
                #[tabled(rename = "Fan")]
                index: usize,
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "Current RPM")]
                current: String,
                #[tabled(rename = "Min")]
                minimum: String,
                #[tabled(rename = "Max")]
                maximum: String,
                #[tabled(rename = "Target")]
                target: String,
            }

            let rows: Vec<FanRow> = fans
                .iter()
                .map(|fan| FanRow {
                    index: fan.index,
                    name: fan.name.clone(),
                    current: match fan.current {
                        Some(v) if v > 0.0 => format!("{:.0}", v).green().to_string(),
                        other => rpm(other),
                    },
                    minimum: rpm(fan.minimum),
                    maximum: rpm(fan.maximum),
                    target: rpm(fan.target),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Fans:".bold(), table))
        }
    }
}

/// Format raw key contents
pub fn format_dump(dumps: &[KeyDump], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(dumps),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct DumpRow {
                #[tabled(rename = "Key")]
                key: String,
                #[tabled(rename = "Type")]
                tag: String,
                #[tabled(rename = "Size")]
                size: String,
                #[tabled(rename = "Bytes")]
                bytes: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows: Vec<DumpRow> = dumps
                .iter()
                .map(|d| DumpRow {
                    key: d.key.to_string().cyan().to_string(),
                    tag: d.tag.map(|t| t.to_string()).unwrap_or_default(),
                    size: d.size.map(|s| s.to_string()).unwrap_or_default(),
                    bytes: d.bytes.clone().unwrap_or_default(),
                    value: match (d.value, &d.error) {
                        (Some(v), _) => format!("{}", v),
                        (None, Some(e)) => e.red().to_string(),
                        (None, None) => String::new(),
                    },
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Controller Keys:".bold(), table))
        }
    }
}

/// Format effective configuration
pub fn format_config(config: &CliConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(config),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&"CLI Configuration:".bold().to_string());
            output.push('\n');
            output.push_str(&format!("{:<20} {}\n", "Output Format", config.output_format));
            output.push_str(&format!("{:<20} {}\n", "Verbose", config.verbose));
            output.push_str(&format!("{:<20} {}\n", "Mock", config.mock));
            output.push_str(&format!(
                "{:<20} {:?}\n",
                "Float Byte Order", config.client.float_byte_order
            ));

            #[derive(Tabled)]
            struct RangeRow {
                #[tabled(rename = "Category")]
                category: String,
                #[tabled(rename = "Min")]
                min: f64,
                #[tabled(rename = "Max")]
                max: f64,
                #[tabled(rename = "Zero Allowed")]
                allow_zero: bool,
            }

            let rows: Vec<RangeRow> = smc_core::Category::ALL
                .iter()
                .map(|&category| {
                    let range = config.client.probe.range(category);
                    RangeRow {
                        category: category.to_string(),
                        min: range.min,
                        max: range.max,
                        allow_zero: range.allow_zero,
                    }
                })
                .collect();

            output.push_str(&Table::new(rows).with(Style::rounded()).to_string());
            Ok(output)
        }
    }
}

/// One-line confirmation for commands that change state
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CategorySummary;
    use smc_core::{Category, Key, TypeTag, Unit};

    fn reading(code: &[u8; 4], value: f64, unit: Unit) -> NamedReading {
        NamedReading {
            key: Key::new(*code),
            name: smc_core::human_readable_name_for_key(Key::new(*code)),
            value,
            unit,
        }
    }

    #[test]
    fn test_success_line_has_check_mark() {
        let line = format_success("Wrote /tmp/smc/config.toml");
        assert!(line.contains("✓"));
        assert!(line.ends_with("/tmp/smc/config.toml"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(" Table ".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().to_string(), "table");
    }

    #[test]
    fn test_format_info_json() {
        let info = InfoReport {
            transport: "mock SMC".to_string(),
            key_count: Some(42),
            fan_count: 2,
            categories: vec![CategorySummary {
                category: Category::Fan,
                working: 8,
                catalogued: 40,
            }],
        };

        let result = format_info(&info, OutputFormat::Json).unwrap();
        assert!(result.contains("\"key_count\": 42"));
        assert!(result.contains("\"category\": \"fan\""));
    }

    #[test]
    fn test_format_info_table() {
        let info = InfoReport {
            transport: "mock SMC".to_string(),
            key_count: None,
            fan_count: 0,
            categories: Vec::new(),
        };

        let result = format_info(&info, OutputFormat::Table).unwrap();
        assert!(result.contains("mock SMC"));
        assert!(result.contains("unknown"));
    }

    #[test]
    fn test_format_readings_json() {
        let readings = vec![reading(b"TC0D", 45.25, Unit::Celsius)];
        let result = format_readings("Temperatures", &readings, OutputFormat::Json).unwrap();

        assert!(result.contains("\"key\": \"TC0D\""));
        assert!(result.contains("\"unit\": \"celsius\""));
        assert!(result.contains("45.25"));
    }

    #[test]
    fn test_format_readings_table() {
        let readings = vec![reading(b"PSTR", 27.8, Unit::Watt)];
        let result = format_readings("Power", &readings, OutputFormat::Table).unwrap();

        assert!(result.contains("PSTR"));
        assert!(result.contains("System Total Power"));
        assert!(result.contains("27.80 W"));
    }

    #[test]
    fn test_format_readings_empty() {
        let result = format_readings("Currents", &[], OutputFormat::Table).unwrap();
        assert!(result.contains("No working sensors"));
    }

    #[test]
    fn test_format_fans_table() {
        let fans = vec![FanReport {
            index: 0,
            name: "Fan 0".to_string(),
            current: Some(1800.0),
            minimum: Some(1200.0),
            maximum: None,
            target: Some(1800.0),
        }];

        let result = format_fans(&fans, OutputFormat::Table).unwrap();
        assert!(result.contains("1800"));
        assert!(result.contains("1200"));
    }

    #[test]
    fn test_format_dump_json() {
        let dumps = vec![KeyDump {
            key: Key::new(*b"TC0D"),
            name: "CPU Die".to_string(),
            tag: Some(TypeTag::SP78),
            size: Some(2),
            bytes: Some("2d 40".to_string()),
            value: Some(45.25),
            unit: Unit::Celsius,
            error: None,
        }];

        let result = format_dump(&dumps, OutputFormat::Json).unwrap();
        assert!(result.contains("\"tag\": \"sp78\""));
        assert!(result.contains("\"bytes\": \"2d 40\""));
    }

    #[test]
    fn test_format_config_table() {
        let result = format_config(&CliConfig::default(), OutputFormat::Table).unwrap();
        assert!(result.contains("Output Format"));
        assert!(result.contains("temperature"));
    }
}
