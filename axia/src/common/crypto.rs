use crate::common::{cb58, Address, Signature};
use crate::{Error, Result};
use log::trace;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A secp256k1 private key.
///
/// This is a wrapper around [secp256k1::SecretKey]. The string form is `PrivateKey-<cb58>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    /// The actual ECDSA key.
    pub inner: secp256k1::SecretKey,
}

impl PrivateKey {
    pub const PREFIX: &'static str = "PrivateKey-";

    /// Constructs a new private key using a secure random number generator.
    pub fn generate() -> PrivateKey {
        let secret_key = secp256k1::SecretKey::new(&mut rand::thread_rng());
        PrivateKey::new(secret_key)
    }

    pub fn new(key: secp256k1::SecretKey) -> PrivateKey {
        PrivateKey { inner: key }
    }

    /// Serializes the private key to bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        self.inner.secret_bytes().to_vec()
    }

    /// Deserializes a private key from a slice.
    pub fn from_slice(data: &[u8]) -> Result<PrivateKey> {
        Ok(PrivateKey::new(secp256k1::SecretKey::from_slice(data)?))
    }

    /// The `PrivateKey-<cb58>` string form.
    pub fn to_cb58_string(self) -> String {
        format!("{}{}", Self::PREFIX, cb58::encode(&self.inner.secret_bytes()))
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    /// Parses `PrivateKey-<cb58>`; the bare cb58 form is accepted too.
    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        let data = cb58::decode(body)?;
        PrivateKey::from_slice(&data)
    }
}

/// A compressed secp256k1 public key.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PublicKey {
    /// The actual ECDSA key.
    pub inner: secp256k1::PublicKey,
}

impl PublicKey {
    pub fn new(key: impl Into<secp256k1::PublicKey>) -> PublicKey {
        PublicKey { inner: key.into() }
    }

    /// The address owned by this key, RIPEMD160(SHA256) of the compressed encoding.
    pub fn address(&self) -> Address {
        Address::generate(&self.inner.serialize())
    }

    /// Serializes the public key to its 33-byte compressed form.
    pub fn to_bytes(self) -> Vec<u8> {
        self.inner.serialize().to_vec()
    }

    /// Recover the public key that produced `signature` over the 32-byte `message`.
    pub fn recover(message: &[u8; 32], signature: &Signature) -> Result<PublicKey> {
        let bytes = signature.as_bytes();
        let recovery_id = RecoveryId::try_from(i32::from(bytes[64]))?;
        let sig = RecoverableSignature::from_compact(&bytes[..64], recovery_id)?;
        let secp = Secp256k1::verification_only();
        let inner = secp.recover_ecdsa(&Message::from_digest(*message), &sig)?;
        Ok(PublicKey { inner })
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(pk: secp256k1::PublicKey) -> PublicKey {
        PublicKey::new(pk)
    }
}

impl From<&PrivateKey> for PublicKey {
    fn from(value: &PrivateKey) -> Self {
        let secp = Secp256k1::signing_only();
        PublicKey {
            inner: secp256k1::PublicKey::from_secret_key(&secp, &value.inner),
        }
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    /// Decode a public key from its hex representation.
    fn from_str(s: &str) -> Result<Self> {
        Ok(PublicKey {
            inner: secp256k1::PublicKey::from_str(s)?,
        })
    }
}

/// A private key together with its public key and address.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
    address: Address,
}

impl KeyPair {
    pub fn new(private_key: PrivateKey) -> KeyPair {
        let public_key = PublicKey::from(&private_key);
        let address = public_key.address();
        KeyPair {
            private_key,
            public_key,
            address,
        }
    }

    pub fn generate() -> KeyPair {
        KeyPair::new(PrivateKey::generate())
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte message digest, producing `r || s || recovery_id`.
    ///
    /// Signatures are deterministic (RFC 6979): the same key and message give the same bytes.
    pub fn sign(&self, message: &[u8; 32]) -> Signature {
        let secp = Secp256k1::signing_only();
        let sig = secp.sign_ecdsa_recoverable(&Message::from_digest(*message), &self.private_key.inner);
        let (recovery_id, compact) = sig.serialize_compact();
        let mut raw = [0u8; Signature::SIZE];
        raw[..64].copy_from_slice(&compact);
        raw[64] = i32::from(recovery_id) as u8;
        trace!("signed message {} with {}", hex::encode(message), self.address);
        Signature::new(raw)
    }
}

impl From<PrivateKey> for KeyPair {
    fn from(value: PrivateKey) -> Self {
        KeyPair::new(value)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
