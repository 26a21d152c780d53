use crate::common::cb58;
use crate::common::encoding::read_array;
use crate::common::Encodable;
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use hex::{FromHex, ToHex};
use ring::digest::{digest, SHA256};
use ripemd::digest::Update;
use ripemd::{Digest, Ripemd160};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte identifier, the RIPEMD160(SHA256) hash of a compressed public key.
///
/// Equality and ordering are byte lexicographic. The string form is cb58; the chain-prefixed
/// bech32 form used by wallets is left to callers.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortId {
    raw: [u8; Self::SIZE],
}

/// Addresses are short ids; they own outputs and select keys from a keychain.
pub type Address = ShortId;

impl ShortId {
    pub const SIZE: usize = 20;
    pub const HEX_SIZE: usize = ShortId::SIZE * 2;
    pub const ZERO: ShortId = ShortId {
        raw: [0; Self::SIZE],
    };

    pub const fn new(raw: [u8; 20]) -> ShortId {
        ShortId { raw }
    }

    /// Generate the hash from the given data.
    pub fn generate(data: &[u8]) -> ShortId {
        let sha256 = digest(&SHA256, data);
        let mut r_hasher = Ripemd160::new();
        Update::update(&mut r_hasher, sha256.as_ref());
        let mut raw = [0; Self::SIZE];
        raw.copy_from_slice(r_hasher.finalize().as_ref());
        ShortId { raw }
    }

    pub fn from_slice(slice: &[u8]) -> Result<ShortId> {
        let raw = <[u8; 20]>::try_from(slice).map_err(|_| {
            Error::BadArgument(format!("short id must be 20 bytes, got {}", slice.len()))
        })?;
        Ok(ShortId { raw })
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.raw
    }

    pub fn from_cb58(s: &str) -> Result<ShortId> {
        Ok(ShortId {
            raw: cb58::decode_array(s)?,
        })
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.raw)
    }
}

impl Encodable for ShortId {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(ShortId {
            raw: read_array(buffer)?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_slice(&self.raw);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE as u64
    }
}

impl FromHex for ShortId {
    type Error = Error;

    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self> {
        let hex = hex.as_ref();
        if hex.len() != Self::HEX_SIZE {
            return Err(Error::BadArgument(format!(
                "Length of hex encoded short id must be {}. Len is {}.",
                Self::HEX_SIZE,
                hex.len()
            )));
        }
        ShortId::from_slice(&hex::decode(hex)?)
    }
}

impl ToHex for ShortId {
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        hex::encode(self.raw).chars().collect()
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        hex::encode_upper(self.raw).chars().collect()
    }
}

impl From<[u8; 20]> for ShortId {
    fn from(raw: [u8; 20]) -> Self {
        ShortId { raw }
    }
}

impl From<ShortId> for [u8; 20] {
    fn from(value: ShortId) -> Self {
        value.raw
    }
}

impl FromStr for ShortId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ShortId::from_cb58(s)
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl fmt::Debug for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl Serialize for ShortId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cb58())
    }
}

impl<'de> Deserialize<'de> for ShortId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ShortId::from_cb58(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// The id of a validator node, displayed as `NodeID-<cb58>`.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub ShortId);

impl NodeId {
    pub const PREFIX: &'static str = "NodeID-";
}

impl Encodable for NodeId {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(NodeId(ShortId::from_binary(buffer)?))
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.0.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        ShortId::SIZE as u64
    }
}

impl From<ShortId> for NodeId {
    fn from(value: ShortId) -> Self {
        NodeId(value)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    /// Parses `NodeID-<cb58>`; the bare cb58 form is accepted too.
    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        Ok(NodeId(ShortId::from_cb58(body)?))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NodeId::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
