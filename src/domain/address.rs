//! Participant addresses.
//!
//! [`Address`] is an opaque 20-byte account identifier. It is printed as
//! `0x` followed by 40 lowercase hex characters. Parsing accepts either hex
//! case; equality is always on the raw bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; Address::LEN]);

/// Failure to parse an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected 0x-prefixed 20-byte hex address, got {input:?}: {reason}")]
pub struct AddressParseError {
    input: String,
    reason: String,
}

impl Address {
    /// Byte length of an address.
    pub const LEN: usize = 20;

    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; Self::LEN]);

    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError {
                input: s.to_string(),
                reason: "missing 0x prefix".to_string(),
            })?;
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| AddressParseError {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const ALICE: &str = "0x00000000000000000000000000000000000000a1";

    #[test]
    fn parses_and_displays_lowercase() {
        let Ok(addr) = ALICE.parse::<Address>() else {
            panic!("valid address");
        };
        assert_eq!(addr.to_string(), ALICE);
        assert_eq!(addr.as_bytes().get(19), Some(&0xa1));
    }

    #[test]
    fn hex_case_does_not_change_identity() {
        let lower = "0x00000000000000000000000000000000000000ab".parse::<Address>();
        let upper = "0X00000000000000000000000000000000000000AB".parse::<Address>();
        assert_eq!(lower, upper);
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!("00000000000000000000000000000000000000a1".parse::<Address>().is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!("0xabcd".parse::<Address>().is_err());
        assert!(format!("{ALICE}00").parse::<Address>().is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!("0x00000000000000000000000000000000000000zz".parse::<Address>().is_err());
    }

    #[test]
    fn usable_as_json_map_key() {
        use std::collections::BTreeMap;
        let Ok(addr) = ALICE.parse::<Address>() else {
            panic!("valid address");
        };
        let mut map = BTreeMap::new();
        map.insert(addr, 5u64);
        let json = serde_json::to_string(&map).unwrap_or_default();
        assert!(json.contains(ALICE));
        let Ok(back) = serde_json::from_str::<BTreeMap<Address, u64>>(&json) else {
            panic!("map deserialization failed");
        };
        assert_eq!(back.get(&addr), Some(&5));
    }
}
