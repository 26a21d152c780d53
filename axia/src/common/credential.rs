use crate::common::encoding::{list_size, read_array, read_list, write_list};
use crate::common::Encodable;
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use hex::{FromHex, ToHex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 65-byte recoverable secp256k1 signature, `r || s || recovery_id`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; Signature::SIZE]);

impl Signature {
    pub const SIZE: usize = 65;

    pub const fn new(raw: [u8; 65]) -> Signature {
        Signature(raw)
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

impl Encodable for Signature {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(Signature(read_array(buffer)?))
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_slice(&self.0);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE as u64
    }
}

impl FromHex for Signature {
    type Error = Error;

    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self> {
        let bytes = hex::decode(hex)?;
        let raw = <[u8; 65]>::try_from(bytes.as_slice()).map_err(|_| {
            Error::BadArgument(format!("signature must be 65 bytes, got {}", bytes.len()))
        })?;
        Ok(Signature(raw))
    }
}

impl ToHex for Signature {
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        hex::encode(self.0).chars().collect()
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        hex::encode_upper(self.0).chars().collect()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Signature({})", self.encode_hex::<String>())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode_hex::<String>())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// The signatures authorizing one input, operation or ally-chain auth.
///
/// Signature `k` was made by the key of the address that the k-th signature index of the
/// authorized item points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub type_id: u32,
    pub signatures: Vec<Signature>,
}

impl Credential {
    pub fn new(type_id: u32) -> Credential {
        Credential {
            type_id,
            signatures: Vec::new(),
        }
    }

    pub fn add_signature(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }
}

impl Encodable for Credential {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let type_id = buffer.try_get_u32()?;
        let signatures = read_list(buffer)?;
        Ok(Credential {
            type_id,
            signatures,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.type_id);
        write_list(buffer, &self.signatures)
    }

    fn encoded_size(&self) -> u64 {
        4 + list_size(&self.signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_layout() {
        let mut cred = Credential::new(9);
        cred.add_signature(Signature::new([0xaa; 65]));
        cred.add_signature(Signature::new([0xbb; 65]));
        let bytes = cred.to_binary_buf().unwrap();
        assert_eq!(bytes.len() as u64, cred.encoded_size());
        assert_eq!(&bytes[..8], &[0, 0, 0, 9, 0, 0, 0, 2]);
        assert_eq!(bytes[8], 0xaa);
        assert_eq!(bytes[8 + 65], 0xbb);
        assert_eq!(Credential::from_binary_buf(&bytes).unwrap(), cred);
    }

    #[test]
    fn truncated_signature() {
        let bytes = [0u8, 0, 0, 9, 0, 0, 0, 1, 0xaa, 0xaa];
        assert!(matches!(
            Credential::from_binary_buf(&bytes),
            Err(Error::BufferSize { .. })
        ));
    }

    #[test]
    fn signature_json_is_hex() {
        let sig = Signature::new([1; 65]);
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(65)));
        assert_eq!(serde_json::from_str::<Signature>(&json).unwrap(), sig);
    }
}
