//! Core types and data structures for SMC values

use crate::catalog::Category;
use crate::key::Key;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Layout of a key's value, as reported by the controller's key-info reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `ui8 `
    UInt8,
    /// `ui16`
    UInt16,
    /// `ui32`
    UInt32,
    /// `si8 `
    SInt8,
    /// `si16`
    SInt16,
    /// `si32`
    SInt32,
    /// `fpXY` (unsigned) or `spXY` (signed) 16-bit fixed point with
    /// `X` integer bits and `Y` fractional bits, both hex digits.
    Fixed {
        signed: bool,
        integer_bits: u8,
        fraction_bits: u8,
    },
    /// `flt `, IEEE-754 single precision
    Float32,
    /// `flag`
    Flag,
    /// `hex_`, raw bytes
    Hex,
    /// Anything else the controller reports
    Unsupported([u8; 4]),
}

impl TypeTag {
    /// `fp88`
    pub const FP88: TypeTag = TypeTag::Fixed {
        signed: false,
        integer_bits: 8,
        fraction_bits: 8,
    };

    /// `sp78`
    pub const SP78: TypeTag = TypeTag::Fixed {
        signed: true,
        integer_bits: 7,
        fraction_bits: 8,
    };

    /// `fpe2`
    pub const FPE2: TypeTag = TypeTag::Fixed {
        signed: false,
        integer_bits: 14,
        fraction_bits: 2,
    };

    /// Classify a raw four-character type code.
    pub fn from_code(code: [u8; 4]) -> Self {
        match &code {
            b"ui8 " => TypeTag::UInt8,
            b"ui16" => TypeTag::UInt16,
            b"ui32" => TypeTag::UInt32,
            b"si8 " => TypeTag::SInt8,
            b"si16" => TypeTag::SInt16,
            b"si32" => TypeTag::SInt32,
            b"flt " => TypeTag::Float32,
            b"flag" => TypeTag::Flag,
            b"hex_" => TypeTag::Hex,
            [prefix @ (b'f' | b's'), b'p', int, frac] => {
                let signed = *prefix == b's';
                let parsed = hex_digit(*int).zip(hex_digit(*frac));
                match parsed {
                    // Sign bit takes one of the sixteen bits for `sp` types.
                    Some((i, f)) if i + f + u8::from(signed) == 16 => TypeTag::Fixed {
                        signed,
                        integer_bits: i,
                        fraction_bits: f,
                    },
                    _ => TypeTag::Unsupported(code),
                }
            }
            _ => TypeTag::Unsupported(code),
        }
    }

    /// Decode from the wire representation (big-endian four-character code)
    pub fn from_u32(raw: u32) -> Self {
        Self::from_code(raw.to_be_bytes())
    }

    /// Four-character code of this tag
    pub fn code(&self) -> [u8; 4] {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        match *self {
            TypeTag::UInt8 => *b"ui8 ",
            TypeTag::UInt16 => *b"ui16",
            TypeTag::UInt32 => *b"ui32",
            TypeTag::SInt8 => *b"si8 ",
            TypeTag::SInt16 => *b"si16",
            TypeTag::SInt32 => *b"si32",
            TypeTag::Float32 => *b"flt ",
            TypeTag::Flag => *b"flag",
            TypeTag::Hex => *b"hex_",
            TypeTag::Fixed {
                signed,
                integer_bits,
                fraction_bits,
            } => [
                if signed { b's' } else { b'f' },
                b'p',
                HEX[integer_bits as usize & 0xF],
                HEX[fraction_bits as usize & 0xF],
            ],
            TypeTag::Unsupported(code) => code,
        }
    }

    /// Wire representation (big-endian)
    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.code())
    }

    /// Number of bytes the layout needs, `None` for variable-size layouts.
    pub fn width(&self) -> Option<usize> {
        match self {
            TypeTag::UInt8 | TypeTag::SInt8 | TypeTag::Flag => Some(1),
            TypeTag::UInt16 | TypeTag::SInt16 | TypeTag::Fixed { .. } => Some(2),
            TypeTag::UInt32 | TypeTag::SInt32 | TypeTag::Float32 => Some(4),
            TypeTag::Hex | TypeTag::Unsupported(_) => None,
        }
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Key::new(self.code()), f)
    }
}

impl Serialize for TypeTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let key = Key::deserialize(deserializer)?;
        Ok(TypeTag::from_code(*key.as_bytes()))
    }
}

/// Per-key metadata returned by the controller's key-info command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Value length in bytes
    pub size: u32,
    /// Value layout
    pub tag: TypeTag,
    /// Controller attribute bits (read/write/function flags)
    pub attributes: u8,
}

/// Byte order used for `flt ` values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// As delivered by Intel-era controllers
    #[default]
    Big,
    /// Apple-silicon controllers
    Little,
}

/// Physical unit of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Celsius,
    Volt,
    Ampere,
    Watt,
    Rpm,
    Lux,
    /// Key outside every known category
    None,
}

impl Unit {
    /// Unit implied by a sensor category
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Temperature => Unit::Celsius,
            Category::Voltage => Unit::Volt,
            Category::Current => Unit::Ampere,
            Category::Power => Unit::Watt,
            Category::Fan => Unit::Rpm,
        }
    }

    /// Unit for an arbitrary key, by catalog membership and key prefix.
    pub fn for_key(key: Key) -> Self {
        if key == crate::catalog::AMBIENT_LIGHT {
            return Unit::Lux;
        }
        Category::of_key(key)
            .map(Unit::for_category)
            .unwrap_or(Unit::None)
    }

    /// Display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Watt => "W",
            Unit::Rpm => "RPM",
            Unit::Lux => "lx",
            Unit::None => "",
        }
    }
}

/// One decoded sensor value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub key: Key,
    pub value: f64,
    pub unit: Unit,
}

impl Reading {
    /// Create a reading, deriving the unit from the key
    pub fn new(key: Key, value: f64) -> Self {
        Self {
            key,
            value,
            unit: Unit::for_key(key),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::None => write!(f, "{:.2}", self.value),
            Unit::Rpm | Unit::Lux => write!(f, "{:.0} {}", self.value, self.unit.symbol()),
            unit => write!(f, "{:.2} {}", self.value, unit.symbol()),
        }
    }
}
