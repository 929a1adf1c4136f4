//! Fixed-point monetary amounts.
//!
//! All balances are integer micro-units with 6 decimal places, matching a
//! stablecoin-style token. Floating point never touches money.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unsigned amount in micro-units (`1 unit == 1_000_000`).
///
/// Serialized as a decimal string of micro-units to preserve `u128`
/// precision in JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// Number of decimal places.
    pub const DECIMALS: u32 = 6;

    /// Micro-units per whole unit.
    pub const ONE: u128 = 1_000_000;

    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw micro-unit value.
    #[must_use]
    pub const fn new(micro: u128) -> Self {
        Self(micro)
    }

    /// Returns the raw micro-unit value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` for the zero amount.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Saturating addition.
    #[must_use]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Checked multiplication by a count.
    #[must_use]
    pub fn checked_mul(self, count: u64) -> Option<Self> {
        self.0.checked_mul(u128::from(count)).map(Self)
    }

    /// Splits the amount into `parts` equal shares, returning
    /// `(share, remainder)`. `None` when `parts` is zero.
    #[must_use]
    pub fn split(self, parts: u64) -> Option<(Self, Self)> {
        let parts = u128::from(parts);
        let share = self.0.checked_div(parts)?;
        let remainder = self.0.checked_rem(parts)?;
        Some((Self(share), Self(remainder)))
    }

    /// Formats the amount as `"<whole>.<6 digits>"`.
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        format!("{}.{:06}", self.0 / Self::ONE, self.0 % Self::ONE)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(Self)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
