//! Four-character SMC key codes

use crate::error::SmcError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A four-byte SMC key, e.g. `TC0D` or `F0Ac`.
///
/// On the wire a key travels as a big-endian `u32`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key([u8; 4]);

impl Key {
    /// Create a key from its four raw bytes
    pub const fn new(code: [u8; 4]) -> Self {
        Key(code)
    }

    /// Decode a key from its wire representation
    pub const fn from_u32(raw: u32) -> Self {
        Key(raw.to_be_bytes())
    }

    /// Wire representation (big-endian four-character code)
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Raw key bytes
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Compose the key for `role` of fan slot `index` (`F0Ac`, `F1Mx`, ...).
    ///
    /// Slots 0-15 map to one hex digit; `None` beyond that.
    pub const fn fan(index: usize, role: FanRole) -> Option<Key> {
        if index >= 16 {
            return None;
        }
        let digit = b"0123456789ABCDEF"[index];
        let suffix = role.suffix();
        Some(Key([b'F', digit, suffix[0], suffix[1]]))
    }

    /// `F*Ac`-style pattern naming `role` of a fan slot that has no key code
    pub const fn fan_wildcard(role: FanRole) -> Key {
        let suffix = role.suffix();
        Key([b'F', b'*', suffix[0], suffix[1]])
    }

    /// Returns `true` if all four bytes are printable ASCII (space allowed).
    pub fn is_printable(&self) -> bool {
        self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ')
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key(\"{}\")", self)
    }
}

impl FromStr for Key {
    type Err = SmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !s.is_ascii() {
            return Err(SmcError::InvalidKey(s.to_string()));
        }
        Ok(Key([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-fan attribute selected by the last two characters of a fan key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanRole {
    /// Measured speed (`Ac`)
    Current,
    /// Minimum speed (`Mn`)
    Minimum,
    /// Maximum speed (`Mx`)
    Maximum,
    /// Target speed (`Tg`)
    Target,
}

impl FanRole {
    /// All roles in catalog order
    pub const ALL: [FanRole; 4] = [
        FanRole::Current,
        FanRole::Minimum,
        FanRole::Maximum,
        FanRole::Target,
    ];

    /// Two-character key suffix
    pub const fn suffix(self) -> [u8; 2] {
        match self {
            FanRole::Current => *b"Ac",
            FanRole::Minimum => *b"Mn",
            FanRole::Maximum => *b"Mx",
            FanRole::Target => *b"Tg",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            FanRole::Current => "Current Speed",
            FanRole::Minimum => "Minimum Speed",
            FanRole::Maximum => "Maximum Speed",
            FanRole::Target => "Target Speed",
        }
    }

    /// Split a fan key into its slot index and role.
    pub fn parse_fan_key(key: Key) -> Option<(usize, FanRole)> {
        let [f, digit, a, b] = *key.as_bytes();
        if f != b'F' {
            return None;
        }
        let index = (digit as char).to_digit(16)? as usize;
        if digit.is_ascii_lowercase() {
            return None;
        }
        let role = FanRole::ALL
            .into_iter()
            .find(|role| role.suffix() == [a, b])?;
        Some((index, role))
    }
}
