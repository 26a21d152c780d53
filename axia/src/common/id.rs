use crate::common::cb58;
use crate::common::encoding::read_array;
use crate::common::Encodable;
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use hex::{FromHex, ToHex};
use ring::digest::{digest, SHA256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte identifier: asset ids, blockchain ids, ally-chain ids, transaction ids, VM ids and
/// fx ids all share this type.
///
/// The string form is cb58, the wire form is the raw 32 bytes. Ordering is byte-wise from the
/// first byte, which is the order the nodes use when sorting inputs.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id {
    raw: [u8; 32],
}

impl Id {
    pub const SIZE: u64 = 32;
    pub const HEX_SIZE: usize = Id::SIZE as usize * 2;
    pub const ZERO: Id = Id { raw: [0; 32] };

    pub const fn new(raw: [u8; 32]) -> Id {
        Id { raw }
    }

    /// SHA256 hash the given data.
    pub fn sha256(data: &[u8]) -> Id {
        let mut raw = [0; 32];
        raw.copy_from_slice(digest(&SHA256, data).as_ref());
        Id { raw }
    }

    /// Double SHA256 hash the given data.
    pub fn sha256d(data: &[u8]) -> Id {
        let once = digest(&SHA256, data);
        Id::sha256(once.as_ref())
    }

    pub fn from_slice(slice: &[u8]) -> Result<Id> {
        let raw = <[u8; 32]>::try_from(slice).map_err(|_| {
            Error::BadArgument(format!("id must be 32 bytes, got {}", slice.len()))
        })?;
        Ok(Id { raw })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw == [0; 32]
    }

    /// Parse a cb58 string.
    pub fn from_cb58(s: &str) -> Result<Id> {
        Ok(Id {
            raw: cb58::decode_array(s)?,
        })
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.raw)
    }
}

impl Encodable for Id {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(Id {
            raw: read_array(buffer)?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_slice(&self.raw);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE
    }
}

impl FromHex for Id {
    type Error = Error;

    /// Converts a string of 64 hex characters into an id. The bytes are taken in wire order,
    /// not reversed.
    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self> {
        let hex = hex.as_ref();
        if hex.len() != Id::HEX_SIZE {
            return Err(Error::BadArgument(format!(
                "Length of hex encoded id must be {}. Len is {}.",
                Id::HEX_SIZE,
                hex.len()
            )));
        }
        Id::from_slice(&hex::decode(hex)?)
    }
}

impl ToHex for Id {
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        hex::encode(self.raw).chars().collect()
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        hex::encode_upper(self.raw).chars().collect()
    }
}

impl From<[u8; 32]> for Id {
    fn from(raw: [u8; 32]) -> Self {
        Id { raw }
    }
}

impl From<Id> for [u8; 32] {
    fn from(value: Id) -> Self {
        value.raw
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Id::from_cb58(s)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cb58())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Id::from_cb58(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha256_test() {
        let e = hex::encode(Id::sha256(b"").as_bytes());
        assert_eq!(
            e,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256d_test() {
        let x = hex::decode("0123456789abcdef").unwrap();
        let e = hex::encode(Id::sha256d(&x).as_bytes());
        assert_eq!(
            e,
            "137ad663f79da06e282ed0abbec4d70523ced5ff8e39d5c2e5641d978c5925aa"
        );
    }

    #[test]
    fn cb58_string_round_trip() {
        let id = Id::sha256(b"asset");
        let s = id.to_string();
        assert_eq!(Id::from_str(&s).unwrap(), id);
        // a 20-byte payload is not an id
        assert!(Id::from_str(&cb58::encode(&[7u8; 20])).is_err());
    }

    /// Ordering compares bytes from the first byte on.
    #[test]
    fn id_ordering() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        a[0] = 1;
        b[31] = 0xff;
        assert!(Id::from(b) < Id::from(a));
        assert!(Id::ZERO < Id::from(b));
    }

    #[test]
    fn hex_keeps_wire_order() {
        let raw = hex!("0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20");
        let id = Id::from(raw);
        assert_eq!(
            id.encode_hex::<String>(),
            "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20"
        );
        assert_eq!(Id::from_hex(id.encode_hex::<String>()).unwrap(), id);
        assert!(Id::from_hex("0102").is_err());
    }

    #[test]
    fn binary_read_write() {
        let raw = [0xabu8; 33];
        let (id, next) = Id::from_binary_at(&raw, 1).unwrap();
        assert_eq!(next, 33);
        assert_eq!(id.to_binary_buf().unwrap(), raw[1..].to_vec());
        assert!(Id::from_binary_buf(&raw[..31]).is_err());
    }

    #[test]
    fn json_serialize_id() {
        let id = Id::sha256(b"hello world");
        let serialized = serde_json::to_string(&id).expect("Failed to serialize");
        assert_eq!(serialized, format!("\"{}\"", id.to_cb58()));
        let deserialized: Id = serde_json::from_str(&serialized).expect("Failed to deserialize");
        assert_eq!(deserialized, id);
    }
}
