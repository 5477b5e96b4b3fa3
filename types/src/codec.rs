use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, RangeCfg, Read, ReadExt, Write};
use std::collections::{BTreeMap, BTreeSet};

/// Strings share the `Vec<u8>` layout: varint length, then UTF-8 bytes.
pub fn write_string(s: &str, writer: &mut impl BufMut) {
    s.len().write(writer);
    writer.put_slice(s.as_bytes());
}

/// Reads a string of at most `max_len` bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let len = usize::read_cfg(reader, &RangeCfg::from(..=max_len))?;
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("String", "invalid UTF-8"))
}

pub fn string_encode_size(s: &str) -> usize {
    s.len().encode_size() + s.len()
}

pub fn write_optional_string(s: Option<&str>, writer: &mut impl BufMut) {
    match s {
        Some(s) => {
            true.write(writer);
            write_string(s, writer);
        }
        None => false.write(writer),
    }
}

pub fn read_optional_string(
    reader: &mut impl Buf,
    max_len: usize,
) -> Result<Option<String>, Error> {
    if bool::read(reader)? {
        Ok(Some(read_string(reader, max_len)?))
    } else {
        Ok(None)
    }
}

pub fn optional_string_encode_size(s: Option<&str>) -> usize {
    1 + s.map(string_encode_size).unwrap_or(0)
}

/// Reads a `u32` element count and rejects it if it exceeds `max`.
pub fn read_len(reader: &mut impl Buf, max: usize, context: &'static str) -> Result<usize, Error> {
    let len = u32::read(reader)? as usize;
    if len > max {
        return Err(Error::Invalid(context, "too many elements"));
    }
    Ok(len)
}

pub fn write_string_set(set: &BTreeSet<String>, writer: &mut impl BufMut) {
    (set.len() as u32).write(writer);
    for item in set {
        write_string(item, writer);
    }
}

/// Reads a set of strings. Entries must be strictly ascending, which is how
/// [`write_string_set`] emits them, so every set has exactly one encoding.
pub fn read_string_set(
    reader: &mut impl Buf,
    max_items: usize,
    max_len: usize,
) -> Result<BTreeSet<String>, Error> {
    let len = read_len(reader, max_items, "StringSet")?;
    let mut set = BTreeSet::new();
    let mut last: Option<String> = None;
    for _ in 0..len {
        let item = read_string(reader, max_len)?;
        if let Some(prev) = &last {
            if prev >= &item {
                return Err(Error::Invalid("StringSet", "entries not sorted"));
            }
        }
        last = Some(item.clone());
        set.insert(item);
    }
    Ok(set)
}

pub fn string_set_encode_size(set: &BTreeSet<String>) -> usize {
    4 + set.iter().map(|s| string_encode_size(s)).sum::<usize>()
}

pub fn write_string_map(map: &BTreeMap<String, String>, writer: &mut impl BufMut) {
    (map.len() as u32).write(writer);
    for (key, value) in map {
        write_string(key, writer);
        write_string(value, writer);
    }
}

pub fn read_string_map(
    reader: &mut impl Buf,
    max_items: usize,
    max_len: usize,
) -> Result<BTreeMap<String, String>, Error> {
    let len = read_len(reader, max_items, "StringMap")?;
    let mut map = BTreeMap::new();
    for _ in 0..len {
        let key = read_string(reader, max_len)?;
        let value = read_string(reader, max_len)?;
        if let Some((last, _)) = map.last_key_value() {
            if last >= &key {
                return Err(Error::Invalid("StringMap", "keys not sorted"));
            }
        }
        map.insert(key, value);
    }
    Ok(map)
}

pub fn string_map_encode_size(map: &BTreeMap<String, String>) -> usize {
    4 + map
        .iter()
        .map(|(k, v)| string_encode_size(k) + string_encode_size(v))
        .sum::<usize>()
}

/// Serde helper rendering byte payloads as `0x`-prefixed hex.
pub mod serde_hex {
    use commonware_utils::{from_hex_formatted, hex};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        if value == "0x" || value.is_empty() {
            return Ok(Vec::new());
        }
        from_hex_formatted(&value).ok_or_else(|| serde::de::Error::custom("expected a hex string"))
    }
}

/// Serde helper rendering `u128` amounts as decimal strings.
///
/// Serde buffers tagged and flattened content without 128-bit integers. Plain
/// numbers up to `u64` are accepted on input.
pub mod serde_u128 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Repr::Number(number) => Ok(number.into()),
        }
    }
}

/// Signed counterpart of [`serde_u128`].
pub mod serde_i128 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(i64),
    }

    pub fn serialize<S>(value: &i128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i128, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Repr::Number(number) => Ok(number.into()),
        }
    }
}
