//! Transaction library for the asset, platform and EVM chains.
//!
//! The library builds, serializes, signs and decodes transactions in the binary format that the
//! nodes accept. It does not talk to nodes: UTXOs come in as bytes or strings, signed transactions
//! go out as bytes or hex, and the RPC layer in between belongs to the caller.

/// Types shared by every chain: identifiers, keys, the codec, transferables and the tx envelope.
pub mod common;

/// The asset chain: asset creation, minting, transfers and atomic import/export.
pub mod avm;

/// The platform chain: validators, delegators, ally-chains and atomic import/export.
pub mod platformvm;

/// The EVM chain, limited to the atomic import/export transactions.
pub mod evm;

/// Contains useful utility functions.
pub mod util;

mod result;
pub use result::{Error, Result};

// re-export the secp256k1 crate
pub extern crate secp256k1;
