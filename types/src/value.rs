//! Resolved call arguments and decoded return values.

use crate::codec::{read_len, read_string, string_encode_size, write_string};
use crate::constants::{
    MAX_ARGUMENTS, MAX_DATA_LENGTH, MAX_HEX_STRING_LENGTH, MAX_STRING_LENGTH, MAX_VALUE_DEPTH,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};

/// A value passed to or returned from a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SolidityValue {
    Bool(bool),
    Uint(#[serde(with = "crate::codec::serde_u128")] u128),
    Int(#[serde(with = "crate::codec::serde_i128")] i128),
    String(String),
    Bytes(#[serde(with = "crate::codec::serde_hex")] Vec<u8>),
    Address(String),
    Array(Vec<SolidityValue>),
}

impl SolidityValue {
    fn read_at_depth(reader: &mut impl Buf, depth: usize) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Bool(bool::read(reader)?),
            1 => Self::Uint(u128::read(reader)?),
            2 => Self::Int(i128::read(reader)?),
            3 => Self::String(read_string(reader, MAX_STRING_LENGTH)?),
            4 => Self::Bytes(Vec::<u8>::read_range(reader, 0..=MAX_DATA_LENGTH)?),
            5 => Self::Address(read_string(reader, MAX_HEX_STRING_LENGTH)?),
            6 => {
                if depth >= MAX_VALUE_DEPTH {
                    return Err(Error::Invalid("SolidityValue", "array nested too deeply"));
                }
                let len = read_len(reader, MAX_ARGUMENTS, "SolidityValue")?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(Self::read_at_depth(reader, depth + 1)?);
                }
                Self::Array(items)
            }
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(value)
    }
}

impl Write for SolidityValue {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Bool(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Self::Uint(value) => {
                1u8.write(writer);
                value.write(writer);
            }
            Self::Int(value) => {
                2u8.write(writer);
                value.write(writer);
            }
            Self::String(value) => {
                3u8.write(writer);
                write_string(value, writer);
            }
            Self::Bytes(value) => {
                4u8.write(writer);
                value.write(writer);
            }
            Self::Address(value) => {
                5u8.write(writer);
                write_string(value, writer);
            }
            Self::Array(items) => {
                6u8.write(writer);
                write_values(items, writer);
            }
        }
    }
}

impl Read for SolidityValue {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Self::read_at_depth(reader, 0)
    }
}

impl EncodeSize for SolidityValue {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Bool(_) => 1,
            Self::Uint(_) | Self::Int(_) => 16,
            Self::String(value) | Self::Address(value) => string_encode_size(value),
            Self::Bytes(value) => value.encode_size(),
            Self::Array(items) => values_encode_size(items),
        }
    }
}

/// Writes an argument list as a `u32` count followed by each value.
pub fn write_values(values: &[SolidityValue], writer: &mut impl BufMut) {
    (values.len() as u32).write(writer);
    for value in values {
        value.write(writer);
    }
}

pub fn read_values(reader: &mut impl Buf) -> Result<Vec<SolidityValue>, Error> {
    let len = read_len(reader, MAX_ARGUMENTS, "SolidityValue")?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(SolidityValue::read(reader)?);
    }
    Ok(values)
}

pub fn values_encode_size(values: &[SolidityValue]) -> usize {
    4 + values.iter().map(EncodeSize::encode_size).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::Encode;

    #[test]
    fn nested_arrays_roundtrip() {
        let value = SolidityValue::Array(vec![
            SolidityValue::Uint(7),
            SolidityValue::Array(vec![
                SolidityValue::Address("0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string()),
                SolidityValue::Bytes(vec![0xde, 0xad]),
            ]),
            SolidityValue::Int(-1),
        ]);
        let encoded = value.encode();
        assert_eq!(encoded.len(), value.encode_size());
        let decoded = SolidityValue::read(&mut &encoded[..]).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut value = SolidityValue::Bool(true);
        for _ in 0..=MAX_VALUE_DEPTH {
            value = SolidityValue::Array(vec![value]);
        }
        let encoded = value.encode();
        let err = SolidityValue::read(&mut &encoded[..]).unwrap_err();
        assert!(matches!(
            err,
            Error::Invalid("SolidityValue", "array nested too deeply")
        ));
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = SolidityValue::read(&mut &[42u8][..]).unwrap_err();
        assert!(matches!(err, Error::InvalidEnum(42)));
    }

    #[test]
    fn serializes_bytes_as_hex() {
        let json = serde_json::to_string(&SolidityValue::Bytes(vec![0xab, 0x01])).unwrap();
        assert_eq!(json, r#"{"kind":"bytes","value":"0xab01"}"#);
    }
}
