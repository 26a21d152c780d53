use crate::common::encoding::{check_codecs, list_size, read_list, write_list};
use crate::common::transferable::canonical_inputs;
use crate::common::tx::sign_input_list;
use crate::common::{
    canonical_order, read_var_bytes, write_var_bytes, Codec, Credential, Encodable, Id, KeyChain,
    TransferableInput, TransferableOutput, TypedInput, TypedOutput,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// The fields every transaction starts with: where it belongs, what it spends, what it creates.
///
/// Outputs and inputs are kept in the order the caller gave; the encoding writes them in
/// canonical order without changing the struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTx<O, I> {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outs: Vec<TransferableOutput<O>>,
    pub ins: Vec<TransferableInput<I>>,
    pub memo: Vec<u8>,
}

impl<O: TypedOutput, I: TypedInput> BaseTx<O, I> {
    pub fn builder(network_id: u32) -> BaseTxBuilder<O, I> {
        BaseTxBuilder::new(network_id)
    }

    /// Sign the inputs in canonical order, one credential per input.
    pub fn sign_inputs(
        &self,
        credential_type_id: u32,
        message: &[u8; 32],
        keychain: &dyn KeyChain,
    ) -> Result<Vec<Credential>> {
        sign_input_list(&self.ins, credential_type_id, message, keychain)
    }

    /// Put every output and input under the codec.
    pub fn set_codec(&mut self, codec: Codec) {
        self.outs.iter_mut().for_each(|o| o.codec = codec);
        self.ins.iter_mut().for_each(|i| i.codec = codec);
    }

    /// Fail with [Error::CodecId] if an output or input is under another codec.
    pub fn check_codec(&self, codec: Codec) -> Result<()> {
        check_codecs(
            codec,
            self.outs.iter().map(|o| o.codec).chain(self.ins.iter().map(|i| i.codec)),
        )
    }
}

impl<O: TypedOutput, I: TypedInput> Encodable for BaseTx<O, I> {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let network_id = buffer.try_get_u32()?;
        let blockchain_id = Id::from_binary(buffer)?;
        let outs = read_list(buffer)?;
        let ins = read_list(buffer)?;
        let memo = read_var_bytes(buffer)?;
        Ok(BaseTx {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.network_id);
        self.blockchain_id.to_binary(buffer)?;
        write_list(buffer, canonical_order(&self.outs)?)?;
        write_list(buffer, canonical_inputs(&self.ins))?;
        write_var_bytes(buffer, &self.memo)
    }

    fn encoded_size(&self) -> u64 {
        4 + Id::SIZE + list_size(&self.outs) + list_size(&self.ins) + 4 + self.memo.len() as u64
    }
}

/// Builds a [BaseTx]. The blockchain id has no sensible default and must be set.
pub struct BaseTxBuilder<O, I> {
    network_id: u32,
    blockchain_id: Option<Id>,
    outs: Vec<TransferableOutput<O>>,
    ins: Vec<TransferableInput<I>>,
    memo: Vec<u8>,
}

impl<O: TypedOutput, I: TypedInput> BaseTxBuilder<O, I> {
    pub fn new(network_id: u32) -> Self {
        BaseTxBuilder {
            network_id,
            blockchain_id: None,
            outs: vec![],
            ins: vec![],
            memo: vec![],
        }
    }

    /// Set the chain the transaction is issued on.
    ///
    /// Can be used in a chain.
    pub fn set_blockchain_id(&mut self, blockchain_id: Id) -> &mut Self {
        self.blockchain_id = Some(blockchain_id);
        self
    }

    /// Add an output.
    ///
    /// Can be used in a chain.
    pub fn add_output(&mut self, output: TransferableOutput<O>) -> &mut Self {
        self.outs.push(output);
        self
    }

    /// Add several outputs.
    pub fn add_outputs(
        &mut self,
        outputs: impl IntoIterator<Item = TransferableOutput<O>>,
    ) -> &mut Self {
        self.outs.extend(outputs);
        self
    }

    /// Add an input.
    ///
    /// Can be used in a chain.
    pub fn add_input(&mut self, input: TransferableInput<I>) -> &mut Self {
        self.ins.push(input);
        self
    }

    pub fn add_inputs(&mut self, inputs: impl IntoIterator<Item = TransferableInput<I>>) -> &mut Self {
        self.ins.extend(inputs);
        self
    }

    /// Set the memo, an arbitrary note stored with the transaction.
    pub fn set_memo(&mut self, memo: &[u8]) -> &mut Self {
        self.memo = memo.to_vec();
        self
    }

    /// Build the transaction.
    pub fn build(&self) -> Result<BaseTx<O, I>> {
        let blockchain_id = self
            .blockchain_id
            .ok_or_else(|| Error::ChainId("blockchain id of base tx".to_string()))?;
        Ok(BaseTx {
            network_id: self.network_id,
            blockchain_id,
            outs: self.outs.clone(),
            ins: self.ins.clone(),
            memo: self.memo.clone(),
        })
    }
}
