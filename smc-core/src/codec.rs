//! SMC value decoding
//!
//! The controller describes each value with a [`TypeTag`]; decoding
//! dispatches on that tag only. The same key may report different tags on
//! different hardware generations.

use crate::error::{Result, SmcError};
use crate::types::{ByteOrder, TypeTag};

/// Decode `bytes` under `tag`, reading `flt ` values big-endian.
pub fn decode(bytes: &[u8], tag: TypeTag) -> Result<f64> {
    decode_with(bytes, tag, ByteOrder::Big)
}

/// Decode `bytes` under `tag` with an explicit byte order for `flt ` values.
///
/// Integer and fixed-point layouts are always big-endian.
pub fn decode_with(bytes: &[u8], tag: TypeTag, float_order: ByteOrder) -> Result<f64> {
    match tag {
        TypeTag::UInt8 => unsigned(bytes, 1, tag),
        TypeTag::UInt16 => unsigned(bytes, 2, tag),
        TypeTag::UInt32 => unsigned(bytes, 4, tag),
        TypeTag::SInt8 => {
            let raw = exact::<1>(bytes, tag)?;
            Ok(f64::from(i8::from_be_bytes(raw)))
        }
        TypeTag::SInt16 => {
            let raw = exact::<2>(bytes, tag)?;
            Ok(f64::from(i16::from_be_bytes(raw)))
        }
        TypeTag::SInt32 => {
            let raw = exact::<4>(bytes, tag)?;
            Ok(f64::from(i32::from_be_bytes(raw)))
        }
        TypeTag::Fixed {
            signed,
            fraction_bits,
            ..
        } => {
            let raw = exact::<2>(bytes, tag)?;
            let integer = if signed {
                f64::from(i16::from_be_bytes(raw))
            } else {
                f64::from(u16::from_be_bytes(raw))
            };
            Ok(integer / f64::from(1u32 << fraction_bits))
        }
        TypeTag::Float32 => {
            let raw = exact::<4>(bytes, tag)?;
            let value = match float_order {
                ByteOrder::Big => f32::from_be_bytes(raw),
                ByteOrder::Little => f32::from_le_bytes(raw),
            };
            Ok(f64::from(value))
        }
        TypeTag::Flag => {
            let [raw] = exact::<1>(bytes, tag)?;
            Ok(if raw != 0 { 1.0 } else { 0.0 })
        }
        TypeTag::Hex => {
            if bytes.is_empty() || bytes.len() > 4 {
                return Err(SmcError::Decode {
                    tag,
                    reason: format!("{} byte blob is not numeric", bytes.len()),
                });
            }
            unsigned(bytes, bytes.len(), tag)
        }
        TypeTag::Unsupported(_) => Err(SmcError::Decode {
            tag,
            reason: "unsupported type".to_string(),
        }),
    }
}

/// First `N` bytes of the buffer; shorter buffers are a protocol violation.
fn exact<const N: usize>(bytes: &[u8], tag: TypeTag) -> Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|head| head.try_into().ok())
        .ok_or_else(|| too_short(bytes, N, tag))
}

/// Big-endian unsigned integer over the first `width` bytes. A shorter,
/// non-empty buffer is zero-padded on the high side.
fn unsigned(bytes: &[u8], width: usize, tag: TypeTag) -> Result<f64> {
    if bytes.is_empty() {
        return Err(too_short(bytes, width, tag));
    }
    let head = &bytes[..bytes.len().min(width)];
    let value = head
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    Ok(f64::from(value))
}

fn too_short(bytes: &[u8], needed: usize, tag: TypeTag) -> SmcError {
    SmcError::Decode {
        tag,
        reason: format!("needs {} bytes, got {}", needed, bytes.len()),
    }
}
