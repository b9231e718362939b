//! Key-space configuration.

use std::fmt;
use std::str::FromStr;

use crate::bits::BASE_BITS;
use crate::error::{Result, VebError};

/// The key space of a [`VebTree`](crate::VebTree): all integers in
/// `0..2^bit_width`.
///
/// Only widths that halve down to the 8-bit base node exactly are accepted,
/// which limits the choice to 8, 16, 32 and 64.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub struct Universe {
    bit_width: u32,
}

impl Universe {
    pub const U8: Universe = Universe { bit_width: 8 };
    pub const U16: Universe = Universe { bit_width: 16 };
    pub const U32: Universe = Universe { bit_width: 32 };
    pub const U64: Universe = Universe { bit_width: 64 };

    pub fn new(bit_width: u32) -> Result<Self> {
        if bit_width < BASE_BITS || bit_width > u64::BITS || !bit_width.is_power_of_two() {
            return Err(VebError::UnsupportedBitWidth(bit_width));
        }
        Ok(Self { bit_width })
    }

    #[inline]
    pub fn bit_width(self) -> u32 {
        self.bit_width
    }

    /// Number of distinct keys, `2^bit_width`.
    #[inline]
    pub fn size(self) -> u128 {
        1u128 << self.bit_width
    }

    #[inline]
    pub fn max_key(self) -> u64 {
        u64::MAX >> (u64::BITS - self.bit_width)
    }

    #[inline]
    pub fn contains_key(self, key: u64) -> bool {
        key <= self.max_key()
    }

    /// Returns `key` unchanged if it lies inside the universe.
    pub fn check(self, key: u64) -> Result<u64> {
        if self.contains_key(key) {
            Ok(key)
        } else {
            Err(VebError::KeyOutOfRange {
                key,
                bit_width: self.bit_width,
            })
        }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::U32
    }
}

impl TryFrom<u32> for Universe {
    type Error = VebError;

    fn try_from(bit_width: u32) -> Result<Self> {
        Self::new(bit_width)
    }
}

impl From<Universe> for u32 {
    fn from(universe: Universe) -> u32 {
        universe.bit_width
    }
}

impl FromStr for Universe {
    type Err = VebError;

    /// Accepts a bare width (`"32"`) or an unsigned type name (`"u32"`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s.strip_prefix('u').unwrap_or(s);
        let bit_width = digits
            .parse::<u32>()
            .map_err(|_| VebError::InvalidBitWidth(s.to_string()))?;
        Self::new(bit_width)
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bit_width)
    }
}
