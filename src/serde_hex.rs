//! Serde helpers that render opaque byte ranges and CRC fields as lowercase hex.

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

fn strip_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// `Vec<u8>` as a hex string.
pub(crate) mod bytes {
    use super::*;

    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&HEXLOWER.encode(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        HEXLOWER_PERMISSIVE
            .decode(strip_prefix(&value).as_bytes())
            .map_err(D::Error::custom)
    }
}

/// `u32` as an 8-digit hex string.
pub(crate) mod u32_hex {
    use super::*;

    pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{value:08x}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        u32::from_str_radix(strip_prefix(&value), 16).map_err(D::Error::custom)
    }
}

/// `Option<u32>` as an optional 8-digit hex string.
pub(crate) mod option_u32_hex {
    use super::*;

    pub fn serialize<S>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => super::u32_hex::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|value| u32::from_str_radix(strip_prefix(&value), 16).map_err(D::Error::custom))
            .transpose()
    }
}
