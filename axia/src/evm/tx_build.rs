use super::{EvmInput, EvmOutput, ExportTx, ImportTx, Output, Transaction};
use crate::common::spend::import_inputs;
use crate::common::{
    Address, Codec, Id, NetworkConfig, SecpTransferOutput, ShortId, TransferableOutput,
    UnsignedTx, UtxoSet,
};
use crate::{Error, Result};
use log::debug;
use std::collections::BTreeMap;

/// Builds the EVM chain's atomic transactions.
///
/// The fee is burnt from the imported or exported fee asset.
pub struct TxBuilder {
    config: NetworkConfig,
    as_of: u64,
}

impl TxBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        TxBuilder { config, as_of: 0 }
    }

    /// Set the time used to decide whether atomic UTXOs are still locked.
    pub fn set_as_of(&mut self, as_of: u64) -> &mut Self {
        self.as_of = as_of;
        self
    }

    fn wrap(&self, tx: Transaction) -> Result<UnsignedTx<Transaction>> {
        UnsignedTx::new(Codec::V0, tx)
    }

    /// Import every atomic UTXO the `from` addresses can spend into the EVM account `to`.
    pub fn build_import_tx(
        &self,
        atomic_utxos: &UtxoSet<Output>,
        source_chain: Id,
        to: ShortId,
        from: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let fee_asset = self.config.fee_asset_id()?;
        let (import_ins, totals) = import_inputs(atomic_utxos, from, self.as_of, Codec::V0);
        if import_ins.is_empty() {
            return Err(Error::BadArgument(format!(
                "no atomic utxos from chain {} can be imported",
                source_chain
            )));
        }
        let outs = credit(totals, fee_asset, self.config.tx_fee, to)?;
        debug!(
            "building evm import of {} utxos from chain {} into {}",
            import_ins.len(),
            source_chain,
            to
        );
        self.wrap(Transaction::Import(ImportTx {
            network_id: self.config.network_id,
            blockchain_id: self.config.evm_chain_id()?,
            source_chain,
            import_ins,
            outs,
        }))
    }

    /// Export `amount` of the asset from the EVM account `from`, controlled by the key of
    /// `signer`, to the `to` addresses on the destination chain.
    ///
    /// The fee is debited from the same account; when the asset is not the fee asset a second
    /// input carries the fee.
    #[allow(clippy::too_many_arguments)]
    pub fn build_export_tx(
        &self,
        asset_id: Id,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        from: ShortId,
        signer: Address,
        nonce: u64,
    ) -> Result<UnsignedTx<Transaction>> {
        let fee_asset = self.config.fee_asset_id()?;
        let fee = self.config.tx_fee;
        let mut ins = vec![];
        if asset_id == fee_asset {
            let total = amount.checked_add(fee).ok_or_else(|| {
                Error::BadArgument(format!("export of {} plus fee overflows", amount))
            })?;
            ins.push(EvmInput::new(from, total, asset_id, nonce));
        } else {
            ins.push(EvmInput::new(from, amount, asset_id, nonce));
            ins.push(EvmInput::new(from, fee, fee_asset, nonce));
        }
        for input in ins.iter_mut() {
            input.add_signature_idx(0, signer);
        }
        let out = SecpTransferOutput::to_addresses(amount, to.to_vec(), 0, 1)?;
        debug!(
            "building evm export of {} {} from {} to chain {}",
            amount, asset_id, from, destination_chain
        );
        self.wrap(Transaction::Export(ExportTx {
            network_id: self.config.network_id,
            blockchain_id: self.config.evm_chain_id()?,
            destination_chain,
            ins,
            export_outs: vec![TransferableOutput::new(asset_id, Output::from(out))],
        }))
    }
}

fn credit(totals: BTreeMap<Id, u64>, fee_asset: Id, fee: u64, to: ShortId) -> Result<Vec<EvmOutput>> {
    let available = totals.get(&fee_asset).copied().unwrap_or(0);
    if available < fee {
        return Err(Error::InsufficientFunds {
            asset_id: fee_asset,
            required: fee,
            available,
        });
    }
    Ok(totals
        .into_iter()
        .map(|(asset_id, total)| {
            let amount = if asset_id == fee_asset { total - fee } else { total };
            EvmOutput::new(to, amount, asset_id)
        })
        .filter(|o| o.amount > 0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{KeyChain, Network, SoftKeyChain, TxBody, Utxo, UtxoId};

    fn setup() -> (TxBuilder, SoftKeyChain, Address, Id) {
        let fee_asset = Id::sha256(b"fee asset");
        let config = NetworkConfig::new(Network::Local)
            .with_evm_chain_id(Id::sha256(b"evm"))
            .with_fee_asset_id(fee_asset);
        let mut kc = SoftKeyChain::new();
        let addr = kc.make_key();
        (TxBuilder::new(config), kc, addr, fee_asset)
    }

    #[test]
    fn import_credits_account() {
        let (builder, kc, addr, fee_asset) = setup();
        let other = Id::sha256(b"other asset");
        let mut atomic = UtxoSet::new();
        for (i, asset) in [fee_asset, other].into_iter().enumerate() {
            atomic.add_utxo(Utxo::new(
                UtxoId::new(Id::sha256(&[i as u8]), 0),
                asset,
                Output::from(SecpTransferOutput::to_addresses(3_000_000, vec![addr], 0, 1).unwrap()),
            ));
        }
        let account = ShortId::new([0xee; 20]);
        let unsigned = builder
            .build_import_tx(&atomic, Id::ZERO, account, &[addr])
            .unwrap();
        let Transaction::Import(tx) = unsigned.tx() else {
            panic!("not an import tx");
        };
        let fee_out = tx.outs.iter().find(|o| o.asset_id == fee_asset).unwrap();
        assert_eq!(fee_out.amount, 2_000_000);
        assert_eq!(tx.outs.len(), 2);
        assert_eq!(unsigned.sign(&kc).unwrap().credentials().len(), 2);
    }

    #[test]
    fn export_fee_input() {
        let (builder, kc, addr, fee_asset) = setup();
        let account = ShortId::new([0xee; 20]);
        let unsigned = builder
            .build_export_tx(fee_asset, 5, Id::ZERO, &[addr], account, addr, 7)
            .unwrap();
        let Transaction::Export(tx) = unsigned.tx() else {
            panic!("not an export tx");
        };
        assert_eq!(tx.ins.len(), 1);
        assert_eq!(tx.ins[0].amount, 1_000_005);
        assert_eq!(tx.ins[0].nonce, 7);

        let unsigned = builder
            .build_export_tx(Id::sha256(b"other"), 5, Id::ZERO, &[addr], account, addr, 7)
            .unwrap();
        assert_eq!(unsigned.tx().type_id(), 1);
        let message = unsigned.message().unwrap();
        let signed = unsigned.sign(&kc).unwrap();
        assert_eq!(signed.credentials().len(), 2);
        assert_eq!(
            signed.credentials()[0].signatures[0],
            kc.get_key(&addr).unwrap().sign(&message)
        );
    }

    #[test]
    fn evm_chain_must_be_configured() {
        let builder = TxBuilder::new(
            NetworkConfig::new(Network::Local).with_fee_asset_id(Id::sha256(b"fee asset")),
        );
        assert!(matches!(
            builder.build_export_tx(Id::ZERO, 1, Id::ZERO, &[ShortId::new([1; 20])], ShortId::ZERO, ShortId::ZERO, 0),
            Err(Error::ChainId(_))
        ));
    }
}
