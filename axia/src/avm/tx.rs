use super::{
    InitialState, Input, Output, TransferableOperation, BASE_TX_ID, CREATE_ASSET_TX_ID,
    EXPORT_TX_ID, IMPORT_TX_ID, NFT_CREDENTIAL_ID, OPERATION_TX_ID, SECP_CREDENTIAL_ID,
};
use crate::common::encoding::{check_codecs, list_size};
use crate::common::tx::{sign_input_list, sign_sig_idxs};
use crate::common::{
    canonical_inputs, canonical_order, read_list, read_short_string, write_list,
    write_short_string, Codec, Credential, Encodable, Id, KeyChain, TransferableInput,
    TransferableOutput, TxBody,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use log::trace;
use serde::{Deserialize, Serialize};

/// A plain transfer on the asset chain.
pub type BaseTx = crate::common::BaseTx<Output, Input>;

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_SYMBOL_LEN: usize = 4;
pub const MAX_DENOMINATION: u8 = 32;

/// Creates a new asset with its initial outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssetTx {
    pub base: BaseTx,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: Vec<InitialState>,
}

impl CreateAssetTx {
    /// Checks the name is at most 128 bytes, the symbol at most 4 bytes and the denomination
    /// at most 32.
    pub fn new(
        base: BaseTx,
        name: &str,
        symbol: &str,
        denomination: u8,
        initial_states: Vec<InitialState>,
    ) -> Result<CreateAssetTx> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(Error::BadArgument(format!(
                "asset name must be 1 to {} bytes: {:?}",
                MAX_NAME_LEN, name
            )));
        }
        if symbol.len() > MAX_SYMBOL_LEN {
            return Err(Error::BadArgument(format!(
                "asset symbol must be at most {} bytes: {:?}",
                MAX_SYMBOL_LEN, symbol
            )));
        }
        if denomination > MAX_DENOMINATION {
            return Err(Error::BadArgument(format!(
                "denomination must be at most {}: {}",
                MAX_DENOMINATION, denomination
            )));
        }
        Ok(CreateAssetTx {
            base,
            name: name.to_string(),
            symbol: symbol.to_string(),
            denomination,
            initial_states,
        })
    }
}

impl Encodable for CreateAssetTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let name = read_short_string(buffer)?;
        let symbol = read_short_string(buffer)?;
        let denomination = buffer.try_get_u8()?;
        let initial_states = read_list(buffer)?;
        Ok(CreateAssetTx {
            base,
            name,
            symbol,
            denomination,
            initial_states,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        write_short_string(buffer, &self.name)?;
        write_short_string(buffer, &self.symbol)?;
        buffer.put_u8(self.denomination);
        let mut states: Vec<&InitialState> = self.initial_states.iter().collect();
        states.sort_by_key(|s| s.fx_id);
        write_list(buffer, states)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size()
            + 2
            + self.name.len() as u64
            + 2
            + self.symbol.len() as u64
            + 1
            + list_size(&self.initial_states)
    }
}

/// Applies operations, such as minting, to UTXOs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTx {
    pub base: BaseTx,
    pub ops: Vec<TransferableOperation>,
}

impl Encodable for OperationTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let ops = read_list(buffer)?;
        Ok(OperationTx { base, ops })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        write_list(buffer, canonical_order(&self.ops)?)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size() + list_size(&self.ops)
    }
}

/// Consumes UTXOs exported to this chain by another chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: Id,
    pub import_ins: Vec<TransferableInput<Input>>,
}

impl Encodable for ImportTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let source_chain = Id::from_binary(buffer)?;
        let import_ins = read_list(buffer)?;
        Ok(ImportTx {
            base,
            source_chain,
            import_ins,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.source_chain.to_binary(buffer)?;
        write_list(buffer, canonical_inputs(&self.import_ins))
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size() + Id::SIZE + list_size(&self.import_ins)
    }
}

/// Sends outputs to another chain's shared memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: Id,
    pub export_outs: Vec<TransferableOutput<Output>>,
}

impl Encodable for ExportTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let destination_chain = Id::from_binary(buffer)?;
        let export_outs = read_list(buffer)?;
        Ok(ExportTx {
            base,
            destination_chain,
            export_outs,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.destination_chain.to_binary(buffer)?;
        write_list(buffer, canonical_order(&self.export_outs)?)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size() + Id::SIZE + list_size(&self.export_outs)
    }
}

/// The transactions of the asset chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Base(BaseTx),
    CreateAsset(CreateAssetTx),
    Operation(OperationTx),
    Import(ImportTx),
    Export(ExportTx),
}

impl Transaction {
    pub fn base(&self) -> &BaseTx {
        match self {
            Transaction::Base(tx) => tx,
            Transaction::CreateAsset(tx) => &tx.base,
            Transaction::Operation(tx) => &tx.base,
            Transaction::Import(tx) => &tx.base,
            Transaction::Export(tx) => &tx.base,
        }
    }

    /// The credential kind for the transaction's secp inputs.
    pub fn credential_type_id(codec: Codec) -> u32 {
        SECP_CREDENTIAL_ID.get(codec)
    }
}

impl TxBody for Transaction {
    fn type_id(&self) -> u32 {
        match self {
            Transaction::Base(_) => BASE_TX_ID,
            Transaction::CreateAsset(_) => CREATE_ASSET_TX_ID,
            Transaction::Operation(_) => OPERATION_TX_ID,
            Transaction::Import(_) => IMPORT_TX_ID,
            Transaction::Export(_) => EXPORT_TX_ID,
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<Self> {
        match type_id {
            BASE_TX_ID => Ok(Transaction::Base(BaseTx::from_binary(buffer)?)),
            CREATE_ASSET_TX_ID => Ok(Transaction::CreateAsset(CreateAssetTx::from_binary(buffer)?)),
            OPERATION_TX_ID => Ok(Transaction::Operation(OperationTx::from_binary(buffer)?)),
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::from_binary(buffer)?)),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::from_binary(buffer)?)),
            _ => Err(Error::UnknownTypeId {
                context: "asset chain transaction",
                type_id,
            }),
        }
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Transaction::Base(tx) => tx.to_binary(buffer),
            Transaction::CreateAsset(tx) => tx.to_binary(buffer),
            Transaction::Operation(tx) => tx.to_binary(buffer),
            Transaction::Import(tx) => tx.to_binary(buffer),
            Transaction::Export(tx) => tx.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Transaction::Base(tx) => tx.encoded_size(),
            Transaction::CreateAsset(tx) => tx.encoded_size(),
            Transaction::Operation(tx) => tx.encoded_size(),
            Transaction::Import(tx) => tx.encoded_size(),
            Transaction::Export(tx) => tx.encoded_size(),
        }
    }

    fn supports_codec(_codec: Codec) -> bool {
        true
    }

    fn set_codec(&mut self, codec: Codec) {
        match self {
            Transaction::Base(tx) => tx.set_codec(codec),
            Transaction::CreateAsset(tx) => {
                tx.base.set_codec(codec);
                tx.initial_states.iter_mut().for_each(|s| s.codec = codec);
            }
            Transaction::Operation(tx) => {
                tx.base.set_codec(codec);
                tx.ops.iter_mut().for_each(|op| op.codec = codec);
            }
            Transaction::Import(tx) => {
                tx.base.set_codec(codec);
                tx.import_ins.iter_mut().for_each(|i| i.codec = codec);
            }
            Transaction::Export(tx) => {
                tx.base.set_codec(codec);
                tx.export_outs.iter_mut().for_each(|o| o.codec = codec);
            }
        }
    }

    /// Initial states without outputs carry no type id, so their codec is not checked.
    fn check_codec(&self, codec: Codec) -> Result<()> {
        self.base().check_codec(codec)?;
        match self {
            Transaction::Base(_) => Ok(()),
            Transaction::CreateAsset(tx) => check_codecs(
                codec,
                tx.initial_states
                    .iter()
                    .filter(|s| !s.outputs.is_empty())
                    .map(|s| s.codec),
            ),
            Transaction::Operation(tx) => check_codecs(codec, tx.ops.iter().map(|op| op.codec)),
            Transaction::Import(tx) => check_codecs(codec, tx.import_ins.iter().map(|i| i.codec)),
            Transaction::Export(tx) => check_codecs(codec, tx.export_outs.iter().map(|o| o.codec)),
        }
    }

    fn is_credential_type(type_id: u32) -> bool {
        SECP_CREDENTIAL_ID.codec_of(type_id).is_some() || NFT_CREDENTIAL_ID.codec_of(type_id).is_some()
    }

    fn sign(&self, codec: Codec, message: &[u8; 32], keychain: &dyn KeyChain) -> Result<Vec<Credential>> {
        let cred_type = Transaction::credential_type_id(codec);
        let mut creds = self.base().sign_inputs(cred_type, message, keychain)?;
        match self {
            Transaction::Operation(tx) => {
                for op in canonical_order(&tx.ops)? {
                    trace!("signing operation on asset {}", op.asset_id);
                    creds.push(sign_sig_idxs(
                        op.operation.credential_type_id(codec),
                        op.operation.sig_idxs(),
                        message,
                        keychain,
                    )?);
                }
            }
            Transaction::Import(tx) => {
                creds.extend(sign_input_list(&tx.import_ins, cred_type, message, keychain)?);
            }
            _ => {}
        }
        Ok(creds)
    }
}
