use super::nft::check_payload;
use super::{
    NftTransferOutput, NFT_CREDENTIAL_ID, NFT_MINT_OPERATION_ID, NFT_TRANSFER_OPERATION_ID,
    SECP_CREDENTIAL_ID, SECP_MINT_OPERATION_ID,
};
use crate::common::encoding::list_size;
use crate::common::{
    read_list, read_var_bytes, write_list, write_var_bytes, Address, Codec, Encodable, Id,
    OutputOwners, SecpMintOutput, SecpTransferOutput, SigIdx, Typed, UtxoId,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

fn sig_idxs_size(sig_idxs: &[SigIdx]) -> u64 {
    4 + 4 * sig_idxs.len() as u64
}

/// Mint more of a variable-cap asset: consumes a mint output, produces a new mint output and an
/// amount output.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecpMintOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub mint_output: SecpMintOutput,
    pub transfer_output: SecpTransferOutput,
}

impl Encodable for SecpMintOperation {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let sig_idxs = read_list(buffer)?;
        let mint_output = SecpMintOutput::from_binary(buffer)?;
        let transfer_output = SecpTransferOutput::from_binary(buffer)?;
        Ok(SecpMintOperation {
            sig_idxs,
            mint_output,
            transfer_output,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        write_list(buffer, &self.sig_idxs)?;
        self.mint_output.to_binary(buffer)?;
        self.transfer_output.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        sig_idxs_size(&self.sig_idxs)
            + self.mint_output.encoded_size()
            + self.transfer_output.encoded_size()
    }
}

/// Mint NFTs of a group, one for each owner record.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMintOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub outputs: Vec<OutputOwners>,
}

impl NftMintOperation {
    pub fn new(group_id: u32, payload: Vec<u8>, outputs: Vec<OutputOwners>) -> Result<Self> {
        check_payload(&payload)?;
        Ok(NftMintOperation {
            sig_idxs: vec![],
            group_id,
            payload,
            outputs,
        })
    }
}

impl Encodable for NftMintOperation {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let sig_idxs = read_list(buffer)?;
        let group_id = buffer.try_get_u32()?;
        let payload = read_var_bytes(buffer)?;
        check_payload(&payload)?;
        let outputs = read_list(buffer)?;
        Ok(NftMintOperation {
            sig_idxs,
            group_id,
            payload,
            outputs,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        write_list(buffer, &self.sig_idxs)?;
        buffer.put_u32(self.group_id);
        write_var_bytes(buffer, &self.payload)?;
        write_list(buffer, &self.outputs)
    }

    fn encoded_size(&self) -> u64 {
        sig_idxs_size(&self.sig_idxs)
            + 4
            + 4
            + self.payload.len() as u64
            + list_size(&self.outputs)
    }
}

/// Transfer an NFT to new owners.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransferOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub output: NftTransferOutput,
}

impl Encodable for NftTransferOperation {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let sig_idxs = read_list(buffer)?;
        let output = NftTransferOutput::from_binary(buffer)?;
        Ok(NftTransferOperation { sig_idxs, output })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        write_list(buffer, &self.sig_idxs)?;
        self.output.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        sig_idxs_size(&self.sig_idxs) + self.output.encoded_size()
    }
}

/// The operations of the asset chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    SecpMint(SecpMintOperation),
    NftMint(NftMintOperation),
    NftTransfer(NftTransferOperation),
}

impl Operation {
    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Operation::SecpMint(op) => &op.sig_idxs,
            Operation::NftMint(op) => &op.sig_idxs,
            Operation::NftTransfer(op) => &op.sig_idxs,
        }
    }

    /// Add a signer. Indices are kept in the order they are added.
    pub fn add_signature_idx(&mut self, address_index: u32, address: Address) {
        let sig = SigIdx::new(address_index, address);
        match self {
            Operation::SecpMint(op) => op.sig_idxs.push(sig),
            Operation::NftMint(op) => op.sig_idxs.push(sig),
            Operation::NftTransfer(op) => op.sig_idxs.push(sig),
        }
    }

    /// The kind of credential that authorizes the operation.
    pub fn credential_type_id(&self, codec: Codec) -> u32 {
        match self {
            Operation::SecpMint(_) => SECP_CREDENTIAL_ID.get(codec),
            Operation::NftMint(_) | Operation::NftTransfer(_) => NFT_CREDENTIAL_ID.get(codec),
        }
    }
}

impl Typed for Operation {
    fn type_id(&self, codec: Codec) -> u32 {
        match self {
            Operation::SecpMint(_) => SECP_MINT_OPERATION_ID.get(codec),
            Operation::NftMint(_) => NFT_MINT_OPERATION_ID.get(codec),
            Operation::NftTransfer(_) => NFT_TRANSFER_OPERATION_ID.get(codec),
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        if let Some(codec) = SECP_MINT_OPERATION_ID.codec_of(type_id) {
            Ok((Operation::SecpMint(SecpMintOperation::from_binary(buffer)?), codec))
        } else if let Some(codec) = NFT_MINT_OPERATION_ID.codec_of(type_id) {
            Ok((Operation::NftMint(NftMintOperation::from_binary(buffer)?), codec))
        } else if let Some(codec) = NFT_TRANSFER_OPERATION_ID.codec_of(type_id) {
            Ok((Operation::NftTransfer(NftTransferOperation::from_binary(buffer)?), codec))
        } else {
            Err(Error::UnknownTypeId {
                context: "asset chain operation",
                type_id,
            })
        }
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Operation::SecpMint(op) => op.to_binary(buffer),
            Operation::NftMint(op) => op.to_binary(buffer),
            Operation::NftTransfer(op) => op.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Operation::SecpMint(op) => op.encoded_size(),
            Operation::NftMint(op) => op.encoded_size(),
            Operation::NftTransfer(op) => op.encoded_size(),
        }
    }
}

/// An operation on some UTXOs of one asset.
///
/// The wire form is `asset_id, count, utxo_id*, type_id, body`; the UTXO ids are written sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableOperation {
    pub asset_id: Id,
    pub utxo_ids: Vec<UtxoId>,
    pub operation: Operation,
    pub codec: Codec,
}

impl TransferableOperation {
    pub fn new(asset_id: Id, utxo_ids: Vec<UtxoId>, operation: Operation) -> Self {
        TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
            codec: Codec::default(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }
}

impl Encodable for TransferableOperation {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let asset_id = Id::from_binary(buffer)?;
        let utxo_ids = read_list(buffer)?;
        let (operation, codec) = Operation::read_typed(buffer)?;
        Ok(TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
            codec,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.asset_id.to_binary(buffer)?;
        let mut utxo_ids = self.utxo_ids.clone();
        utxo_ids.sort();
        write_list(buffer, &utxo_ids)?;
        self.operation.write_typed(self.codec, buffer)
    }

    fn encoded_size(&self) -> u64 {
        Id::SIZE + list_size(&self.utxo_ids) + self.operation.typed_size()
    }
}
