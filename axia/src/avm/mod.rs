//! The asset chain.
//!
//! Assets are created with a [CreateAssetTx], moved with a [BaseTx], minted and traded with an
//! [OperationTx], and moved between chains with [ImportTx] and [ExportTx]. Codec 1 renumbers the
//! output, input, operation and credential type ids; the transaction type ids are the same in
//! both codecs.

mod initial_states;
mod nft;
mod ops;
mod tx;
mod tx_build;

pub use self::initial_states::InitialState;
pub use self::nft::{NftMintOutput, NftTransferOutput};
pub use self::ops::{
    NftMintOperation, NftTransferOperation, Operation, SecpMintOperation, TransferableOperation,
};
pub use self::tx::{BaseTx, CreateAssetTx, ExportTx, ImportTx, OperationTx, Transaction};
pub use self::tx_build::TxBuilder;

use crate::common::{
    Codec, Encodable, OutputOwners, SecpMintOutput, SecpTransferInput, SecpTransferOutput, SigIdx,
    Typed, TypedInput, TypedOutput,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// A type id under each codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeId {
    pub v0: u32,
    pub v1: u32,
}

impl TypeId {
    pub const fn get(&self, codec: Codec) -> u32 {
        match codec {
            Codec::V0 => self.v0,
            Codec::V1 => self.v1,
        }
    }

    /// The codec the id belongs to, if it is this kind at all.
    pub fn codec_of(&self, type_id: u32) -> Option<Codec> {
        if type_id == self.v0 {
            Some(Codec::V0)
        } else if type_id == self.v1 {
            Some(Codec::V1)
        } else {
            None
        }
    }
}

pub const SECP_INPUT_ID: TypeId = TypeId { v0: 5, v1: 65536 };
pub const SECP_MINT_OUTPUT_ID: TypeId = TypeId { v0: 6, v1: 65537 };
pub const SECP_TRANSFER_OUTPUT_ID: TypeId = TypeId { v0: 7, v1: 65538 };
pub const SECP_MINT_OPERATION_ID: TypeId = TypeId { v0: 8, v1: 65539 };
pub const SECP_CREDENTIAL_ID: TypeId = TypeId { v0: 9, v1: 65540 };
pub const NFT_MINT_OUTPUT_ID: TypeId = TypeId { v0: 10, v1: 131072 };
pub const NFT_TRANSFER_OUTPUT_ID: TypeId = TypeId { v0: 11, v1: 131073 };
pub const NFT_MINT_OPERATION_ID: TypeId = TypeId { v0: 12, v1: 131074 };
pub const NFT_TRANSFER_OPERATION_ID: TypeId = TypeId { v0: 13, v1: 131075 };
pub const NFT_CREDENTIAL_ID: TypeId = TypeId { v0: 14, v1: 131076 };

pub const BASE_TX_ID: u32 = 0;
pub const CREATE_ASSET_TX_ID: u32 = 1;
pub const OPERATION_TX_ID: u32 = 2;
pub const IMPORT_TX_ID: u32 = 3;
pub const EXPORT_TX_ID: u32 = 4;

pub const SECP_FX_ID: u32 = 0;
pub const NFT_FX_ID: u32 = 1;

/// The outputs of the asset chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
    SecpMint(SecpMintOutput),
    NftTransfer(NftTransferOutput),
    NftMint(NftMintOutput),
}

impl Output {
    /// The fx that owns the output kind.
    pub fn fx_id(&self) -> u32 {
        match self {
            Output::SecpTransfer(_) | Output::SecpMint(_) => SECP_FX_ID,
            Output::NftTransfer(_) | Output::NftMint(_) => NFT_FX_ID,
        }
    }
}

impl Typed for Output {
    fn type_id(&self, codec: Codec) -> u32 {
        match self {
            Output::SecpTransfer(_) => SECP_TRANSFER_OUTPUT_ID.get(codec),
            Output::SecpMint(_) => SECP_MINT_OUTPUT_ID.get(codec),
            Output::NftTransfer(_) => NFT_TRANSFER_OUTPUT_ID.get(codec),
            Output::NftMint(_) => NFT_MINT_OUTPUT_ID.get(codec),
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        if let Some(codec) = SECP_TRANSFER_OUTPUT_ID.codec_of(type_id) {
            Ok((Output::SecpTransfer(SecpTransferOutput::from_binary(buffer)?), codec))
        } else if let Some(codec) = SECP_MINT_OUTPUT_ID.codec_of(type_id) {
            Ok((Output::SecpMint(SecpMintOutput::from_binary(buffer)?), codec))
        } else if let Some(codec) = NFT_TRANSFER_OUTPUT_ID.codec_of(type_id) {
            Ok((Output::NftTransfer(NftTransferOutput::from_binary(buffer)?), codec))
        } else if let Some(codec) = NFT_MINT_OUTPUT_ID.codec_of(type_id) {
            Ok((Output::NftMint(NftMintOutput::from_binary(buffer)?), codec))
        } else {
            Err(Error::UnknownTypeId {
                context: "asset chain output",
                type_id,
            })
        }
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Output::SecpTransfer(o) => o.to_binary(buffer),
            Output::SecpMint(o) => o.to_binary(buffer),
            Output::NftTransfer(o) => o.to_binary(buffer),
            Output::NftMint(o) => o.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Output::SecpTransfer(o) => o.encoded_size(),
            Output::SecpMint(o) => o.encoded_size(),
            Output::NftTransfer(o) => o.encoded_size(),
            Output::NftMint(o) => o.encoded_size(),
        }
    }
}

impl TypedOutput for Output {
    type Input = Input;

    fn owners(&self) -> &OutputOwners {
        match self {
            Output::SecpTransfer(o) => &o.owners,
            Output::SecpMint(o) => &o.owners,
            Output::NftTransfer(o) => &o.owners,
            Output::NftMint(o) => &o.owners,
        }
    }

    fn amount(&self) -> Option<u64> {
        match self {
            Output::SecpTransfer(o) => Some(o.amount),
            _ => None,
        }
    }

    /// Only amount outputs are spent by inputs; the others are consumed by operations.
    fn spend(&self, sig_idxs: Vec<SigIdx>, _as_of: u64) -> Option<Input> {
        match self {
            Output::SecpTransfer(o) => Some(Input::SecpTransfer(SecpTransferInput {
                amount: o.amount,
                sig_idxs,
            })),
            _ => None,
        }
    }
}

impl From<SecpTransferOutput> for Output {
    fn from(value: SecpTransferOutput) -> Self {
        Output::SecpTransfer(value)
    }
}

/// The inputs of the asset chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
}

impl Typed for Input {
    fn type_id(&self, codec: Codec) -> u32 {
        match self {
            Input::SecpTransfer(_) => SECP_INPUT_ID.get(codec),
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        match SECP_INPUT_ID.codec_of(type_id) {
            Some(codec) => Ok((Input::SecpTransfer(SecpTransferInput::from_binary(buffer)?), codec)),
            None => Err(Error::UnknownTypeId {
                context: "asset chain input",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Address, Id, TransferableInput, TransferableOutput, UtxoId};

    fn transfer() -> Output {
        Output::SecpTransfer(
            SecpTransferOutput::to_addresses(10, vec![Address::new([1; 20])], 0, 1).unwrap(),
        )
    }

    #[test]
    fn codec_type_ids() {
        let out = TransferableOutput::new(Id::ZERO, transfer());
        assert_eq!(out.type_id(), 7);
        let out = out.with_codec(Codec::V1);
        assert_eq!(out.type_id(), 65538);
        let bytes = out.to_binary_buf().unwrap();
        assert_eq!(&bytes[32..36], &65538u32.to_be_bytes());
        let back = TransferableOutput::<Output>::from_binary_buf(&bytes).unwrap();
        assert_eq!(back.codec, Codec::V1);
        assert_eq!(back, out);
    }

    #[test]
    fn unknown_output_type() {
        let mut bytes = TransferableOutput::new(Id::ZERO, transfer())
            .to_binary_buf()
            .unwrap();
        bytes[35] = 99;
        assert!(matches!(
            TransferableOutput::<Output>::from_binary_buf(&bytes),
            Err(Error::UnknownTypeId { type_id: 99, .. })
        ));
        // an input type id where an output is expected
        bytes[35] = 5;
        assert!(TransferableOutput::<Output>::from_binary_buf(&bytes).is_err());
    }

    #[test]
    fn spend_transfer_output() {
        let sig = SigIdx::new(0, Address::new([1; 20]));
        let input = transfer().spend(vec![sig], 0).unwrap();
        assert_eq!(input.amount(), 10);
        assert_eq!(input.sig_idxs(), &[sig]);
        let mint = Output::SecpMint(SecpMintOutput::default());
        assert!(mint.spend(vec![], 0).is_none());
        assert_eq!(mint.amount(), None);
    }

    #[test]
    fn input_layout() {
        let mut secp = SecpTransferInput::new(1000);
        secp.add_signature_idx(0, Address::new([1; 20]));
        let input = TransferableInput::new(
            UtxoId::new(Id::new([2; 32]), 1),
            Id::new([3; 32]),
            Input::from(secp),
        );
        let bytes = input.to_binary_buf().unwrap();
        assert_eq!(bytes.len() as u64, input.encoded_size());
        assert_eq!(bytes.len(), 32 + 4 + 32 + 4 + 8 + 4 + 4);
        assert_eq!(&bytes[68..72], &[0, 0, 0, 5]);
        let back = TransferableInput::<Input>::from_binary_buf(&bytes).unwrap();
        assert_eq!(back, input);
    }
}
