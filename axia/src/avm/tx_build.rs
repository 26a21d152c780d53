use super::{
    BaseTx, CreateAssetTx, ExportTx, ImportTx, InitialState, Input, Operation, OperationTx, Output,
    SecpMintOperation, Transaction, TransferableOperation,
};
use crate::common::spend::{import_inputs, import_outputs};
use crate::common::{
    spend, Address, Codec, Id, NetworkConfig, SecpMintOutput, SecpTransferOutput, SpendRequest,
    TransferableInput, TransferableOutput, UnsignedTx, UtxoId, UtxoSet,
};
use crate::{Error, Result};
use log::debug;

/// Builds asset chain transactions from a UTXO set and the caller's intent.
///
/// Fees are taken from the network configuration and burnt from the `from` addresses' UTXOs;
/// change goes back to the `change` addresses.
pub struct TxBuilder {
    config: NetworkConfig,
    codec: Codec,
    as_of: u64,
    memo: Vec<u8>,
}

impl TxBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        TxBuilder {
            config,
            codec: Codec::default(),
            as_of: 0,
            memo: vec![],
        }
    }

    /// Set the codec of the built transactions.
    ///
    /// Can be used in a chain.
    pub fn set_codec(&mut self, codec: Codec) -> &mut Self {
        self.codec = codec;
        self
    }

    /// Set the time used to decide whether UTXOs are still locked.
    pub fn set_as_of(&mut self, as_of: u64) -> &mut Self {
        self.as_of = as_of;
        self
    }

    pub fn set_memo(&mut self, memo: &[u8]) -> &mut Self {
        self.memo = memo.to_vec();
        self
    }

    fn request(&self, from: &[Address], change: &[Address]) -> SpendRequest {
        let mut req = SpendRequest::new(from.to_vec(), change.to_vec());
        req.set_as_of(self.as_of).set_codec(self.codec);
        req
    }

    fn base(
        &self,
        outs: Vec<TransferableOutput<Output>>,
        ins: Vec<TransferableInput<Input>>,
    ) -> Result<BaseTx> {
        BaseTx::builder(self.config.network_id)
            .set_blockchain_id(self.config.asset_chain_id()?)
            .add_outputs(outs)
            .add_inputs(ins)
            .set_memo(&self.memo)
            .build()
    }

    fn wrap(&self, tx: Transaction) -> Result<UnsignedTx<Transaction>> {
        UnsignedTx::new(self.codec, tx)
    }

    /// Send `amount` of the asset to the `to` addresses.
    pub fn build_base_tx(
        &self,
        utxos: &UtxoSet<Output>,
        asset_id: Id,
        amount: u64,
        to: &[Address],
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let mut req = self.request(from, change);
        req.add_amount(asset_id, amount, 0)?
            .add_amount(self.config.fee_asset_id()?, 0, self.config.tx_fee)?
            .set_destinations(to.to_vec(), 0, 1);
        let mut r = spend(utxos, &req)?;
        r.outs.append(&mut r.change);
        debug!("building base tx sending {} of {}", amount, asset_id);
        let base = self.base(r.outs, r.ins)?;
        self.wrap(Transaction::Base(base))
    }

    /// Export `amount` of the asset to the `to` addresses on the destination chain.
    #[allow(clippy::too_many_arguments)]
    pub fn build_export_tx(
        &self,
        utxos: &UtxoSet<Output>,
        asset_id: Id,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let mut req = self.request(from, change);
        req.add_amount(asset_id, amount, 0)?
            .add_amount(self.config.fee_asset_id()?, 0, self.config.tx_fee)?
            .set_destinations(to.to_vec(), 0, 1);
        let r = spend(utxos, &req)?;
        debug!(
            "building export tx of {} {} to chain {}",
            amount, asset_id, destination_chain
        );
        let base = self.base(r.change, r.ins)?;
        self.wrap(Transaction::Export(ExportTx {
            base,
            destination_chain,
            export_outs: r.outs,
        }))
    }

    /// Import every atomic UTXO the `from` addresses can spend, paying the fee out of the
    /// imported fee asset.
    pub fn build_import_tx(
        &self,
        atomic_utxos: &UtxoSet<Output>,
        source_chain: Id,
        to: &[Address],
        from: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let fee_asset = self.config.fee_asset_id()?;
        let (import_ins, totals) = import_inputs(atomic_utxos, from, self.as_of, self.codec);
        if import_ins.is_empty() {
            return Err(Error::BadArgument(format!(
                "no atomic utxos from chain {} can be imported",
                source_chain
            )));
        }
        let outs = import_outputs(totals, fee_asset, self.config.tx_fee, to, self.codec)?;
        debug!(
            "building import tx of {} utxos from chain {}",
            import_ins.len(),
            source_chain
        );
        let base = self.base(outs, vec![])?;
        self.wrap(Transaction::Import(ImportTx {
            base,
            source_chain,
            import_ins,
        }))
    }

    /// Create an asset.
    #[allow(clippy::too_many_arguments)]
    pub fn build_create_asset_tx(
        &self,
        utxos: &UtxoSet<Output>,
        name: &str,
        symbol: &str,
        denomination: u8,
        initial_states: Vec<InitialState>,
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let mut req = self.request(from, change);
        req.add_amount(self.config.fee_asset_id()?, 0, self.config.create_asset_fee)?;
        let r = spend(utxos, &req)?;
        let initial_states = initial_states
            .into_iter()
            .map(|s| s.with_codec(self.codec))
            .collect();
        debug!("building create asset tx for {} ({})", name, symbol);
        let base = self.base(r.change, r.ins)?;
        let tx = CreateAssetTx::new(base, name, symbol, denomination, initial_states)?;
        self.wrap(Transaction::CreateAsset(tx))
    }

    /// Mint with the secp mint output `mint_utxo_id`: the mint right passes to `mint_output` and
    /// the minted amount is `transfer_output`.
    pub fn build_secp_mint_tx(
        &self,
        utxos: &UtxoSet<Output>,
        mint_utxo_id: &UtxoId,
        mint_output: SecpMintOutput,
        transfer_output: SecpTransferOutput,
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let utxo = utxos.get_utxo(mint_utxo_id).ok_or_else(|| {
            Error::BadArgument(format!("mint utxo {} not in the set", mint_utxo_id))
        })?;
        let Output::SecpMint(current) = &utxo.output else {
            return Err(Error::TransferableOutput(format!(
                "utxo {} is not a secp mint output",
                mint_utxo_id
            )));
        };
        let sig_idxs = current
            .owners
            .get_spenders(from, self.as_of)
            .ok_or_else(|| {
                Error::BadArgument(format!("cannot sign for mint utxo {}", mint_utxo_id))
            })?;
        let op = TransferableOperation::new(
            utxo.asset_id,
            vec![*mint_utxo_id],
            Operation::SecpMint(SecpMintOperation {
                sig_idxs,
                mint_output,
                transfer_output,
            }),
        )
        .with_codec(self.codec);

        let mut req = self.request(from, change);
        req.add_amount(self.config.fee_asset_id()?, 0, self.config.tx_fee)?;
        let r = spend(utxos, &req)?;
        debug!("building mint tx for asset {}", utxo.asset_id);
        let base = self.base(r.change, r.ins)?;
        self.wrap(Transaction::Operation(OperationTx {
            base,
            ops: vec![op],
        }))
    }
}
