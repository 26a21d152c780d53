use crate::common::{Address, Id};
use base58::FromBase58Error;
use bytes::TryGetError;
use hex::FromHexError;
use std::string::FromUtf8Error;

/// Standard Result used in the library
pub type Result<T> = std::result::Result<T, Error>;

/// Standard error type used in the library
#[derive(Debug)]
pub enum Error {
    /// An argument provided is invalid
    BadArgument(String),
    /// The data provided is invalid
    BadData(String),
    /// A read needed more bytes than the buffer had left.
    BufferSize { requested: usize, available: usize },
    /// The data did not match the checksum.
    ChecksumMismatch,
    /// A required chain id was never set.
    ChainId(String),
    /// The codec id is unknown, or not supported by the chain.
    CodecId(u16),
    /// The type id does not belong to any known kind in this position.
    UnknownTypeId { context: &'static str, type_id: u32 },
    /// The threshold is zero or larger than the number of addresses.
    Threshold { threshold: u32, addresses: usize },
    /// The ally-chain owner record is not a valid owner output.
    AllyChainOwner(String),
    /// A transferable output could not be built or is the wrong kind.
    TransferableOutput(String),
    /// A transferable input could not be built or is the wrong kind.
    TransferableInput(String),
    /// The keychain has no key for the address.
    KeyNotFound(Address),
    /// The UTXOs available cannot cover the amount requested.
    InsufficientFunds { asset_id: Id, required: u64, available: u64 },
    /// Hex string could not be decoded
    FromHexError(FromHexError),
    /// Base58 string could not be decoded
    FromBase58Error(FromBase58Error),
    /// secp256k1 library error
    Secp256k1Error(secp256k1::Error),
    /// String conversion error
    Utf8Error(FromUtf8Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadArgument(s) => f.write_str(&format!("Bad argument: {}", s)),
            Error::BadData(s) => f.write_str(&format!("Bad data: {}", s)),
            Error::BufferSize {
                requested,
                available,
            } => f.write_str(&format!(
                "Buffer too small: needed {} bytes, {} available",
                requested, available
            )),
            Error::ChecksumMismatch => f.write_str("Checksum mismatch"),
            Error::ChainId(s) => f.write_str(&format!("Chain id not set: {}", s)),
            Error::CodecId(c) => f.write_str(&format!("Unsupported codec id: {}", c)),
            Error::UnknownTypeId { context, type_id } => {
                f.write_str(&format!("Unknown type id {} for {}", type_id, context))
            }
            Error::Threshold {
                threshold,
                addresses,
            } => f.write_str(&format!(
                "Invalid threshold {} for {} addresses",
                threshold, addresses
            )),
            Error::AllyChainOwner(s) => f.write_str(&format!("Invalid ally-chain owner: {}", s)),
            Error::TransferableOutput(s) => {
                f.write_str(&format!("Invalid transferable output: {}", s))
            }
            Error::TransferableInput(s) => {
                f.write_str(&format!("Invalid transferable input: {}", s))
            }
            Error::KeyNotFound(a) => f.write_str(&format!("No key for address {}", a)),
            Error::InsufficientFunds {
                asset_id,
                required,
                available,
            } => f.write_str(&format!(
                "Insufficient funds for asset {}: required {}, available {}",
                asset_id, required, available
            )),
            Error::FromHexError(e) => f.write_str(&format!("Hex decoding error: {}", e)),
            Error::FromBase58Error(e) => f.write_str(&format!("Base58 decoding error: {:?}", e)),
            Error::Secp256k1Error(e) => f.write_str(&format!("secpk256k1 error: {:?}", e)),
            Error::Utf8Error(e) => f.write_str(&format!("UTF8 error: {}", e)),
        }
    }
}

impl std::error::Error for Error {}

impl From<FromHexError> for Error {
    fn from(e: FromHexError) -> Self {
        Error::FromHexError(e)
    }
}

impl From<FromBase58Error> for Error {
    fn from(e: FromBase58Error) -> Self {
        Error::FromBase58Error(e)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(e: FromUtf8Error) -> Self {
        Error::Utf8Error(e)
    }
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Secp256k1Error(e)
    }
}

impl From<TryGetError> for Error {
    fn from(e: TryGetError) -> Self {
        Error::BufferSize {
            requested: e.requested,
            available: e.available,
        }
    }
}
