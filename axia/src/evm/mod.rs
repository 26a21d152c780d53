//! The EVM chain's atomic transactions.
//!
//! Only the import and export of funds through shared memory are here; they carry no [BaseTx]
//! prefix and credit or debit EVM accounts directly.
//!
//! [BaseTx]: crate::common::BaseTx

mod tx;
mod tx_build;

pub use self::tx::{ExportTx, ImportTx, Transaction};
pub use self::tx_build::TxBuilder;

use crate::common::{
    Address, Codec, Encodable, Id, OutputOwners, SecpTransferInput, SecpTransferOutput, SigIdx,
    ShortId, Typed, TypedInput, TypedOutput,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

pub const SECP_INPUT_ID: u32 = 5;
pub const SECP_TRANSFER_OUTPUT_ID: u32 = 7;
pub const SECP_CREDENTIAL_ID: u32 = 9;

pub const IMPORT_TX_ID: u32 = 0;
pub const EXPORT_TX_ID: u32 = 1;

/// Funds credited to an EVM account by an import.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvmOutput {
    pub address: ShortId,
    pub amount: u64,
    pub asset_id: Id,
}

impl EvmOutput {
    pub fn new(address: ShortId, amount: u64, asset_id: Id) -> EvmOutput {
        EvmOutput {
            address,
            amount,
            asset_id,
        }
    }
}

impl Encodable for EvmOutput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(EvmOutput {
            address: ShortId::from_binary(buffer)?,
            amount: buffer.try_get_u64()?,
            asset_id: Id::from_binary(buffer)?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.address.to_binary(buffer)?;
        buffer.put_u64(self.amount);
        self.asset_id.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        20 + 8 + Id::SIZE
    }
}

/// Funds debited from an EVM account by an export.
///
/// The signers are not on the wire; each names the keychain address whose key controls the
/// account.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmInput {
    pub address: ShortId,
    pub amount: u64,
    pub asset_id: Id,
    pub nonce: u64,
    pub sig_idxs: Vec<SigIdx>,
}

impl EvmInput {
    pub fn new(address: ShortId, amount: u64, asset_id: Id, nonce: u64) -> EvmInput {
        EvmInput {
            address,
            amount,
            asset_id,
            nonce,
            sig_idxs: vec![],
        }
    }

    /// Add a signer. Can be used in a chain.
    pub fn add_signature_idx(&mut self, address_index: u32, source: Address) -> &mut Self {
        self.sig_idxs.push(SigIdx::new(address_index, source));
        self
    }
}

impl Encodable for EvmInput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(EvmInput {
            address: ShortId::from_binary(buffer)?,
            amount: buffer.try_get_u64()?,
            asset_id: Id::from_binary(buffer)?,
            nonce: buffer.try_get_u64()?,
            sig_idxs: vec![],
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.address.to_binary(buffer)?;
        buffer.put_u64(self.amount);
        self.asset_id.to_binary(buffer)?;
        buffer.put_u64(self.nonce);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        20 + 8 + Id::SIZE + 8
    }
}

/// Outputs the EVM chain exports, and the atomic UTXOs it imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
}

impl Typed for Output {
    fn type_id(&self, _codec: Codec) -> u32 {
        SECP_TRANSFER_OUTPUT_ID
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        match type_id {
            SECP_TRANSFER_OUTPUT_ID => Ok((
                Output::SecpTransfer(SecpTransferOutput::from_binary(buffer)?),
                Codec::V0,
            )),
            _ => Err(Error::UnknownTypeId {
                context: "evm chain output",
                type_id,
            }),
        }
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Output::SecpTransfer(o) => o.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Output::SecpTransfer(o) => o.encoded_size(),
        }
    }
}

impl TypedOutput for Output {
    type Input = Input;

    fn owners(&self) -> &OutputOwners {
        match self {
            Output::SecpTransfer(o) => &o.owners,
        }
    }

    fn amount(&self) -> Option<u64> {
        match self {
            Output::SecpTransfer(o) => Some(o.amount),
        }
    }

    fn spend(&self, sig_idxs: Vec<SigIdx>, _as_of: u64) -> Option<Input> {
        match self {
            Output::SecpTransfer(o) => Some(Input::SecpTransfer(SecpTransferInput {
                amount: o.amount,
                sig_idxs,
            })),
        }
    }
}

impl From<SecpTransferOutput> for Output {
    fn from(value: SecpTransferOutput) -> Self {
        Output::SecpTransfer(value)
    }
}

/// Inputs spending atomic UTXOs on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
}

impl Typed for Input {
    fn type_id(&self, _codec: Codec) -> u32 {
        SECP_INPUT_ID
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        match type_id {
            SECP_INPUT_ID => Ok((
                Input::SecpTransfer(SecpTransferInput::from_binary(buffer)?),
                Codec::V0,
            )),
            _ => Err(Error::UnknownTypeId {
                context: "evm chain input",
                type_id,
            }),
        }
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Input::SecpTransfer(i) => i.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Input::SecpTransfer(i) => i.encoded_size(),
        }
    }
}

impl TypedInput for Input {
    fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Input::SecpTransfer(i) => &i.sig_idxs,
        }
    }

    fn sig_idxs_mut(&mut self) -> &mut Vec<SigIdx> {
        match self {
            Input::SecpTransfer(i) => &mut i.sig_idxs,
        }
    }

    fn amount(&self) -> u64 {
        match self {
            Input::SecpTransfer(i) => i.amount,
        }
    }
}

impl From<SecpTransferInput> for Input {
    fn from(value: SecpTransferInput) -> Self {
        Input::SecpTransfer(value)
    }
}
