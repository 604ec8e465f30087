//! Static key catalog
//!
//! Candidate keys per sensor category, in probing order. Which of them exist
//! depends on the machine; the hardware crate probes them at runtime.

use crate::error::SmcError;
use crate::key::{FanRole, Key};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fan slots covered by the fan catalog
pub const FAN_SLOTS: usize = 10;

/// Number of fans reported by the controller
pub const FAN_COUNT: Key = Key::new(*b"FNum");

/// CPU die temperature
pub const CPU_DIE_TEMPERATURE: Key = Key::new(*b"TC0D");

/// Left ambient light sensor
pub const AMBIENT_LIGHT: Key = Key::new(*b"ALV0");

/// Total number of keys exposed by the controller
pub const KEY_COUNT: Key = Key::new(*b"#KEY");

/// Candidate temperature keys
pub static TEMPERATURE_KEYS: [Key; 40] = [
    Key::new(*b"TC0D"),
    Key::new(*b"TC0E"),
    Key::new(*b"TC0F"),
    Key::new(*b"TC0H"),
    Key::new(*b"TC0P"),
    Key::new(*b"TC1C"),
    Key::new(*b"TC2C"),
    Key::new(*b"TC3C"),
    Key::new(*b"TC4C"),
    Key::new(*b"TCGC"),
    Key::new(*b"TCSA"),
    Key::new(*b"TCXC"),
    Key::new(*b"TG0D"),
    Key::new(*b"TG0H"),
    Key::new(*b"TG0P"),
    Key::new(*b"TA0P"),
    Key::new(*b"TA1P"),
    Key::new(*b"TB0T"),
    Key::new(*b"TB1T"),
    Key::new(*b"TB2T"),
    Key::new(*b"TH0P"),
    Key::new(*b"TM0P"),
    Key::new(*b"Tm0P"),
    Key::new(*b"TN0D"),
    Key::new(*b"TN0P"),
    Key::new(*b"TP0P"),
    Key::new(*b"TPCD"),
    Key::new(*b"Th0H"),
    Key::new(*b"Ts0P"),
    Key::new(*b"Ts0S"),
    Key::new(*b"TW0P"),
    Key::new(*b"TL0P"),
    Key::new(*b"TI0P"),
    Key::new(*b"Tp01"),
    Key::new(*b"Tp05"),
    Key::new(*b"Tp09"),
    Key::new(*b"Tp0D"),
    Key::new(*b"Te05"),
    Key::new(*b"Te0L"),
    Key::new(*b"Tg05"),
];

/// Candidate voltage keys
pub static VOLTAGE_KEYS: [Key; 12] = [
    Key::new(*b"VC0C"),
    Key::new(*b"VC1C"),
    Key::new(*b"VCAC"),
    Key::new(*b"VCSC"),
    Key::new(*b"VD0R"),
    Key::new(*b"VG0C"),
    Key::new(*b"VM0R"),
    Key::new(*b"VN0C"),
    Key::new(*b"VP0R"),
    Key::new(*b"VBAT"),
    Key::new(*b"Vb0R"),
    Key::new(*b"VS0C"),
];

/// Candidate current keys
pub static CURRENT_KEYS: [Key; 12] = [
    Key::new(*b"IC0C"),
    Key::new(*b"IC0R"),
    Key::new(*b"IC1C"),
    Key::new(*b"ICAC"),
    Key::new(*b"ICSC"),
    Key::new(*b"ID0R"),
    Key::new(*b"IG0C"),
    Key::new(*b"IM0R"),
    Key::new(*b"IN0C"),
    Key::new(*b"IB0R"),
    Key::new(*b"IPBR"),
    Key::new(*b"IO0R"),
];

/// Candidate power keys
pub static POWER_KEYS: [Key; 14] = [
    Key::new(*b"PC0C"),
    Key::new(*b"PC0R"),
    Key::new(*b"PCPC"),
    Key::new(*b"PCPG"),
    Key::new(*b"PCPT"),
    Key::new(*b"PCTR"),
    Key::new(*b"PDTR"),
    Key::new(*b"PG0C"),
    Key::new(*b"PG0R"),
    Key::new(*b"PM0R"),
    Key::new(*b"PN0C"),
    Key::new(*b"PPBR"),
    Key::new(*b"PSTR"),
    Key::new(*b"PZ0E"),
];

/// Candidate fan keys: every role of every slot, slot by slot
pub static FAN_KEYS: [Key; FAN_SLOTS * 4] = fan_catalog();

const fn fan_catalog() -> [Key; FAN_SLOTS * 4] {
    let mut keys = [Key::new([0; 4]); FAN_SLOTS * 4];
    let mut slot = 0;
    while slot < FAN_SLOTS {
        let mut r = 0;
        while r < FanRole::ALL.len() {
            keys[slot * 4 + r] = match Key::fan(slot, FanRole::ALL[r]) {
                Some(key) => key,
                None => panic!("fan slot out of range"),
            };
            r += 1;
        }
        slot += 1;
    }
    keys
}

/// Sensor category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Temperature,
    Voltage,
    Current,
    Power,
    Fan,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 5] = [
        Category::Temperature,
        Category::Voltage,
        Category::Current,
        Category::Power,
        Category::Fan,
    ];

    /// Candidate keys for this category, in probing order
    pub fn all_keys(self) -> &'static [Key] {
        match self {
            Category::Temperature => &TEMPERATURE_KEYS,
            Category::Voltage => &VOLTAGE_KEYS,
            Category::Current => &CURRENT_KEYS,
            Category::Power => &POWER_KEYS,
            Category::Fan => &FAN_KEYS,
        }
    }

    /// Dense index, usable for per-category tables
    pub fn index(self) -> usize {
        match self {
            Category::Temperature => 0,
            Category::Voltage => 1,
            Category::Current => 2,
            Category::Power => 3,
            Category::Fan => 4,
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Temperature => "temperature",
            Category::Voltage => "voltage",
            Category::Current => "current",
            Category::Power => "power",
            Category::Fan => "fan",
        }
    }

    /// Category of `key`: catalog membership first, then the SMC naming
    /// convention (`T*` temperature, `V*` voltage, `I*` current, `P*` power,
    /// `F<n><role>` fan).
    pub fn of_key(key: Key) -> Option<Category> {
        if let Some(category) = Category::ALL
            .into_iter()
            .find(|c| c.all_keys().contains(&key))
        {
            return Some(category);
        }
        if FanRole::parse_fan_key(key).is_some() {
            return Some(Category::Fan);
        }
        match key.as_bytes()[0] {
            b'T' => Some(Category::Temperature),
            b'V' => Some(Category::Voltage),
            b'I' => Some(Category::Current),
            b'P' => Some(Category::Power),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "temperature" | "temp" | "temps" => Ok(Category::Temperature),
            "voltage" | "voltages" => Ok(Category::Voltage),
            "current" | "currents" => Ok(Category::Current),
            "power" => Ok(Category::Power),
            "fan" | "fans" => Ok(Category::Fan),
            _ => Err(SmcError::Config(format!(
                "Unknown category: '{}'. Valid options: temperature, voltage, current, power, fan",
                s
            ))),
        }
    }
}
