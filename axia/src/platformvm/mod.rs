//! The platform chain.
//!
//! Validators and delegators are added with stake locked in outputs of the transaction; ally-chains
//! are created with an owner record whose addresses later authorize adding validators and chains
//! to them. Only codec 0 is known to the platform chain.

mod stakeable;
mod tx;
mod tx_build;

pub use self::stakeable::{StakeableLockIn, StakeableLockOut};
pub use self::tx::{
    AddAllyChainValidatorTx, AddDelegatorTx, AddValidatorTx, AllyChainAuth, BaseTx, CreateAllyChainTx,
    CreateChainTx, ExportTx, ImportTx, Transaction, Validator,
};
pub use self::tx_build::TxBuilder;

use crate::common::{
    Codec, Encodable, OutputOwners, SecpTransferInput, SecpTransferOutput, SigIdx, Typed,
    TypedInput, TypedOutput,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

pub const SECP_INPUT_ID: u32 = 5;
pub const SECP_TRANSFER_OUTPUT_ID: u32 = 7;
pub const SECP_CREDENTIAL_ID: u32 = 9;
pub const ALLYCHAIN_AUTH_ID: u32 = 10;
pub const SECP_OWNER_OUTPUT_ID: u32 = 11;
pub const STAKEABLE_LOCK_IN_ID: u32 = 21;
pub const STAKEABLE_LOCK_OUT_ID: u32 = 22;

pub const ADD_VALIDATOR_TX_ID: u32 = 12;
pub const ADD_ALLYCHAIN_VALIDATOR_TX_ID: u32 = 13;
pub const ADD_DELEGATOR_TX_ID: u32 = 14;
pub const CREATE_CHAIN_TX_ID: u32 = 15;
pub const CREATE_ALLYCHAIN_TX_ID: u32 = 16;
pub const IMPORT_TX_ID: u32 = 17;
pub const EXPORT_TX_ID: u32 = 18;

/// Outputs of the platform chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
    StakeableLock(StakeableLockOut),
}

impl Typed for Output {
    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Output::SecpTransfer(_) => SECP_TRANSFER_OUTPUT_ID,
            Output::StakeableLock(_) => STAKEABLE_LOCK_OUT_ID,
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        let output = match type_id {
            SECP_TRANSFER_OUTPUT_ID => Output::SecpTransfer(SecpTransferOutput::from_binary(buffer)?),
            STAKEABLE_LOCK_OUT_ID => Output::StakeableLock(StakeableLockOut::from_binary(buffer)?),
            _ => {
                return Err(Error::UnknownTypeId {
                    context: "platform chain output",
                    type_id,
                })
            }
        };
        Ok((output, Codec::V0))
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Output::SecpTransfer(o) => o.to_binary(buffer),
            Output::StakeableLock(o) => o.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Output::SecpTransfer(o) => o.encoded_size(),
            Output::StakeableLock(o) => o.encoded_size(),
        }
    }
}

impl TypedOutput for Output {
    type Input = Input;

    fn owners(&self) -> &OutputOwners {
        match self {
            Output::SecpTransfer(o) => &o.owners,
            Output::StakeableLock(o) => &o.output.owners,
        }
    }

    fn amount(&self) -> Option<u64> {
        match self {
            Output::SecpTransfer(o) => Some(o.amount),
            Output::StakeableLock(o) => Some(o.output.amount),
        }
    }

    fn stake_locktime(&self) -> u64 {
        match self {
            Output::SecpTransfer(_) => 0,
            Output::StakeableLock(o) => o.locktime,
        }
    }

    /// A stake locked output is spent with a lock input while the lock holds, and as a plain
    /// output once it has expired.
    fn spend(&self, sig_idxs: Vec<SigIdx>, as_of: u64) -> Option<Input> {
        let (amount, lock) = match self {
            Output::SecpTransfer(o) => (o.amount, None),
            Output::StakeableLock(o) if o.locktime > as_of => (o.output.amount, Some(o.locktime)),
            Output::StakeableLock(o) => (o.output.amount, None),
        };
        let input = SecpTransferInput { amount, sig_idxs };
        Some(match lock {
            Some(locktime) => Input::StakeableLock(StakeableLockIn { locktime, input }),
            None => Input::SecpTransfer(input),
        })
    }
}

impl From<SecpTransferOutput> for Output {
    fn from(value: SecpTransferOutput) -> Self {
        Output::SecpTransfer(value)
    }
}

/// Inputs of the platform chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
    StakeableLock(StakeableLockIn),
}

impl Typed for Input {
    fn type_id(&self, _codec: Codec) -> u32 {
        match self {
            Input::SecpTransfer(_) => SECP_INPUT_ID,
            Input::StakeableLock(_) => STAKEABLE_LOCK_IN_ID,
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        let input = match type_id {
            SECP_INPUT_ID => Input::SecpTransfer(SecpTransferInput::from_binary(buffer)?),
            STAKEABLE_LOCK_IN_ID => Input::StakeableLock(StakeableLockIn::from_binary(buffer)?),
            _ => {
                return Err(Error::UnknownTypeId {
                    context: "platform chain input",
                    type_id,
                })
            }
        };
        Ok((input, Codec::V0))
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Input::SecpTransfer(i) => i.to_binary(buffer),
            Input::StakeableLock(i) => i.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Input::SecpTransfer(i) => i.encoded_size(),
            Input::StakeableLock(i) => i.encoded_size(),
        }
    }
}

impl TypedInput for Input {
    fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Input::SecpTransfer(i) => &i.sig_idxs,
            Input::StakeableLock(i) => &i.input.sig_idxs,
        }
    }

    fn sig_idxs_mut(&mut self) -> &mut Vec<SigIdx> {
        match self {
            Input::SecpTransfer(i) => &mut i.sig_idxs,
            Input::StakeableLock(i) => &mut i.input.sig_idxs,
        }
    }

    fn amount(&self) -> u64 {
        match self {
            Input::SecpTransfer(i) => i.amount,
            Input::StakeableLock(i) => i.input.amount,
        }
    }
}

impl From<SecpTransferInput> for Input {
    fn from(value: SecpTransferInput) -> Self {
        Input::SecpTransfer(value)
    }
}
