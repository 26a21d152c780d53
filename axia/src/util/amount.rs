use crate::{Error, Result};
use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// An amount of the fee asset, in its smallest unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);
    /// Exactly one unit.
    pub const ONE_UNIT: Amount = Amount(1);
    /// Exactly one coin.
    pub const ONE_COIN: Amount = Amount(1_000_000_000);
    /// Decimal places of a coin.
    pub const DECIMALS: usize = 9;

    /// Convert to a float, using 1 coin = 10^9 units. Dont use this in calculations.
    pub fn as_coins(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let whole = self.0 / Amount::ONE_COIN.0;
        let frac = self.0 % Amount::ONE_COIN.0;
        let mut s = format!("{}.{:09}", whole, frac);
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.push('0');
        }
        f.write_str(&s)
    }
}

/// Parses whole-coin decimal strings such as `1.5` or `0.000000001`. Negative values, more than
/// nine decimals and values over `u64::MAX` units are rejected.
impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::BadArgument(format!("invalid amount: {:?}", s));
        let s = s.trim();
        if s.is_empty() || s.starts_with('-') || s.starts_with('+') {
            return Err(bad());
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if frac.len() > Amount::DECIMALS
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
            || (whole.is_empty() && frac.is_empty())
        {
            return Err(bad());
        }
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| bad())?
        };
        let frac: u64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<9}", frac).parse().map_err(|_| bad())?
        };
        whole
            .checked_mul(Amount::ONE_COIN.0)
            .and_then(|w| w.checked_add(frac))
            .map(Amount)
            .ok_or_else(bad)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        f64::serialize(&self.as_coins(), serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let coins = f64::deserialize(deserializer)?;
        if coins.is_nan() || coins < 0.0 {
            return Err(serde::de::Error::custom(format!("negative amount {}", coins)));
        }
        Ok(Amount((coins * 1_000_000_000.0).round() as u64))
    }
}
