//! Human-readable key names

use crate::catalog::{AMBIENT_LIGHT, FAN_COUNT, KEY_COUNT};
use crate::key::{FanRole, Key};

static NAMES: &[(&[u8; 4], &str)] = &[
    // Temperature
    (b"TC0D", "CPU Die"),
    (b"TC0E", "CPU Die (Virtual)"),
    (b"TC0F", "CPU Die (Filtered)"),
    (b"TC0H", "CPU Heatsink"),
    (b"TC0P", "CPU Proximity"),
    (b"TC1C", "CPU Core 1"),
    (b"TC2C", "CPU Core 2"),
    (b"TC3C", "CPU Core 3"),
    (b"TC4C", "CPU Core 4"),
    (b"TCGC", "Integrated GPU"),
    (b"TCSA", "CPU System Agent"),
    (b"TCXC", "CPU PECI"),
    (b"TG0D", "GPU Die"),
    (b"TG0H", "GPU Heatsink"),
    (b"TG0P", "GPU Proximity"),
    (b"TA0P", "Ambient"),
    (b"TA1P", "Ambient 2"),
    (b"TB0T", "Battery"),
    (b"TB1T", "Battery Cell 1"),
    (b"TB2T", "Battery Cell 2"),
    (b"TH0P", "Hard Drive Bay"),
    (b"TM0P", "Memory Proximity"),
    (b"Tm0P", "Mainboard Proximity"),
    (b"TN0D", "Northbridge Die"),
    (b"TN0P", "Northbridge Proximity"),
    (b"TP0P", "Platform Controller Hub"),
    (b"TPCD", "Platform Controller Hub Die"),
    (b"Th0H", "Heatpipe"),
    (b"Ts0P", "Palm Rest"),
    (b"Ts0S", "Memory Bank Proximity"),
    (b"TW0P", "Wireless Module"),
    (b"TL0P", "Display Proximity"),
    (b"TI0P", "Thunderbolt"),
    (b"Tp01", "CPU Performance Core 1"),
    (b"Tp05", "CPU Performance Core 2"),
    (b"Tp09", "CPU Performance Core 3"),
    (b"Tp0D", "CPU Performance Core 4"),
    (b"Te05", "CPU Efficiency Core 1"),
    (b"Te0L", "CPU Efficiency Core 2"),
    (b"Tg05", "GPU Cluster"),
    // Voltage
    (b"VC0C", "CPU Core Voltage"),
    (b"VC1C", "CPU Core 2 Voltage"),
    (b"VCAC", "Integrated GPU Voltage"),
    (b"VCSC", "CPU System Agent Voltage"),
    (b"VD0R", "DC In Voltage"),
    (b"VG0C", "GPU Core Voltage"),
    (b"VM0R", "Memory Voltage"),
    (b"VN0C", "Northbridge Core Voltage"),
    (b"VP0R", "12V Rail Voltage"),
    (b"VBAT", "Battery Voltage"),
    (b"Vb0R", "CMOS Battery Voltage"),
    (b"VS0C", "SSD Voltage"),
    // Current
    (b"IC0C", "CPU Core Current"),
    (b"IC0R", "CPU Rail Current"),
    (b"IC1C", "CPU VccIO Current"),
    (b"ICAC", "Integrated GPU Current"),
    (b"ICSC", "CPU System Agent Current"),
    (b"ID0R", "DC In Current"),
    (b"IG0C", "GPU Core Current"),
    (b"IM0R", "Memory Current"),
    (b"IN0C", "Northbridge Core Current"),
    (b"IB0R", "Battery Current"),
    (b"IPBR", "Charger Current"),
    (b"IO0R", "Misc Rail Current"),
    // Power
    (b"PC0C", "CPU Core Power"),
    (b"PC0R", "CPU Rail Power"),
    (b"PCPC", "CPU Package Core Power"),
    (b"PCPG", "CPU Package GPU Power"),
    (b"PCPT", "CPU Package Total Power"),
    (b"PCTR", "CPU Total Power"),
    (b"PDTR", "DC In Power"),
    (b"PG0C", "GPU Core Power"),
    (b"PG0R", "GPU Rail Power"),
    (b"PM0R", "Memory Power"),
    (b"PN0C", "Northbridge Core Power"),
    (b"PPBR", "Battery Power"),
    (b"PSTR", "System Total Power"),
    (b"PZ0E", "Zone Power"),
];

/// Descriptive name for `key`. Fan keys are named by pattern; keys without
/// an entry are named by their own code.
pub fn human_readable_name_for_key(key: Key) -> String {
    if let Some((_, name)) = NAMES.iter().find(|(code, _)| *code == key.as_bytes()) {
        return (*name).to_string();
    }
    if let Some((index, role)) = FanRole::parse_fan_key(key) {
        return format!("Fan {} {}", index, role.label());
    }
    match key {
        FAN_COUNT => "Fan Count".to_string(),
        AMBIENT_LIGHT => "Ambient Light".to_string(),
        KEY_COUNT => "Key Count".to_string(),
        _ => key.to_string(),
    }
}
