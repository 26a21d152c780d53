use super::{EvmInput, EvmOutput, Input, Output, EXPORT_TX_ID, IMPORT_TX_ID, SECP_CREDENTIAL_ID};
use crate::common::encoding::list_size;
use crate::common::tx::{sign_input_list, sign_sig_idxs};
use crate::common::{
    canonical_inputs, canonical_order, read_list, write_list, Codec, Credential, Encodable, Id,
    KeyChain, TransferableInput, TransferableOutput, TxBody,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use log::trace;
use serde::{Deserialize, Serialize};

/// EVM outputs are ordered by address, then asset.
fn sorted_outputs(outs: &[EvmOutput]) -> Vec<&EvmOutput> {
    let mut sorted: Vec<&EvmOutput> = outs.iter().collect();
    sorted.sort_by(|a, b| (a.address, a.asset_id).cmp(&(b.address, b.asset_id)));
    sorted
}

/// EVM inputs are ordered by address, then asset.
fn sorted_inputs(ins: &[EvmInput]) -> Vec<&EvmInput> {
    let mut sorted: Vec<&EvmInput> = ins.iter().collect();
    sorted.sort_by(|a, b| (a.address, a.asset_id).cmp(&(b.address, b.asset_id)));
    sorted
}

/// Credits EVM accounts with atomic UTXOs exported to the EVM chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub source_chain: Id,
    pub import_ins: Vec<TransferableInput<Input>>,
    pub outs: Vec<EvmOutput>,
}

impl Encodable for ImportTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(ImportTx {
            network_id: buffer.try_get_u32()?,
            blockchain_id: Id::from_binary(buffer)?,
            source_chain: Id::from_binary(buffer)?,
            import_ins: read_list(buffer)?,
            outs: read_list(buffer)?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.network_id);
        self.blockchain_id.to_binary(buffer)?;
        self.source_chain.to_binary(buffer)?;
        write_list(buffer, canonical_inputs(&self.import_ins))?;
        write_list(buffer, sorted_outputs(&self.outs))
    }

    fn encoded_size(&self) -> u64 {
        4 + Id::SIZE + Id::SIZE + list_size(&self.import_ins) + list_size(&self.outs)
    }
}

/// Debits EVM accounts and exports the funds to another chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub destination_chain: Id,
    pub ins: Vec<EvmInput>,
    pub export_outs: Vec<TransferableOutput<Output>>,
}

impl Encodable for ExportTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(ExportTx {
            network_id: buffer.try_get_u32()?,
            blockchain_id: Id::from_binary(buffer)?,
            destination_chain: Id::from_binary(buffer)?,
            ins: read_list(buffer)?,
            export_outs: read_list(buffer)?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.network_id);
        self.blockchain_id.to_binary(buffer)?;
        self.destination_chain.to_binary(buffer)?;
        write_list(buffer, sorted_inputs(&self.ins))?;
        write_list(buffer, canonical_order(&self.export_outs)?)
    }

    fn encoded_size(&self) -> u64 {
        4 + Id::SIZE + Id::SIZE + list_size(&self.ins) + list_size(&self.export_outs)
    }
}

/// The atomic transactions of the EVM chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Import(ImportTx),
    Export(ExportTx),
}

impl TxBody for Transaction {
    fn type_id(&self) -> u32 {
        match self {
            Transaction::Import(_) => IMPORT_TX_ID,
            Transaction::Export(_) => EXPORT_TX_ID,
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<Self> {
        match type_id {
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::from_binary(buffer)?)),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::from_binary(buffer)?)),
            _ => Err(Error::UnknownTypeId {
                context: "evm chain transaction",
                type_id,
            }),
        }
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Transaction::Import(tx) => tx.to_binary(buffer),
            Transaction::Export(tx) => tx.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Transaction::Import(tx) => tx.encoded_size(),
            Transaction::Export(tx) => tx.encoded_size(),
        }
    }

    fn supports_codec(codec: Codec) -> bool {
        codec == Codec::V0
    }

    fn is_credential_type(type_id: u32) -> bool {
        type_id == SECP_CREDENTIAL_ID
    }

    /// Import credentials follow the import inputs; export credentials follow the EVM inputs in
    /// their written order.
    fn sign(&self, _codec: Codec, message: &[u8; 32], keychain: &dyn KeyChain) -> Result<Vec<Credential>> {
        match self {
            Transaction::Import(tx) => {
                sign_input_list(&tx.import_ins, SECP_CREDENTIAL_ID, message, keychain)
            }
            Transaction::Export(tx) => {
                let mut creds = Vec::with_capacity(tx.ins.len());
                for input in sorted_inputs(&tx.ins) {
                    if input.sig_idxs.is_empty() {
                        return Err(Error::TransferableInput(format!(
                            "evm input of account {} has no signers",
                            input.address
                        )));
                    }
                    trace!("signing evm input of account {}", input.address);
                    creds.push(sign_sig_idxs(
                        SECP_CREDENTIAL_ID,
                        &input.sig_idxs,
                        message,
                        keychain,
                    )?);
                }
                Ok(creds)
            }
        }
    }
}
