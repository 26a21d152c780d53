use super::{
    AddAllyChainValidatorTx, AddDelegatorTx, AddValidatorTx, AllyChainAuth, BaseTx,
    CreateAllyChainTx, CreateChainTx, ExportTx, ImportTx, Input, Output, StakeableLockOut,
    Transaction, Validator,
};
use crate::common::spend::{import_inputs, import_outputs};
use crate::common::{
    spend, Address, Codec, Id, NetworkConfig, OutputOwners, SecpTransferOutput, SpendRequest,
    TransferableInput, TransferableOutput, TypedOutput, UnsignedTx, UtxoSet,
};
use crate::{Error, Result};
use log::{debug, trace};

/// Builds platform chain transactions.
///
/// Fees are burnt from the `from` addresses' unlocked UTXOs. Stake comes first from stake
/// locked UTXOs, which stay locked in the stake outputs, and then from unlocked ones.
pub struct TxBuilder {
    config: NetworkConfig,
    as_of: u64,
    memo: Vec<u8>,
}

struct StakeSpend {
    ins: Vec<TransferableInput<Input>>,
    stake: Vec<TransferableOutput<Output>>,
    change: Vec<TransferableOutput<Output>>,
}

impl TxBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        TxBuilder {
            config,
            as_of: 0,
            memo: vec![],
        }
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

    fn base(
        &self,
        outs: Vec<TransferableOutput<Output>>,
        ins: Vec<TransferableInput<Input>>,
    ) -> Result<BaseTx> {
        BaseTx::builder(self.config.network_id)
            .set_blockchain_id(self.config.platform_chain_id)
            .add_outputs(outs)
            .add_inputs(ins)
            .set_memo(&self.memo)
            .build()
    }

    /// Burn `fee` from the `from` addresses and build the base of the transaction.
    fn pay_fee(
        &self,
        utxos: &UtxoSet<Output>,
        fee: u64,
        from: &[Address],
        change: &[Address],
    ) -> Result<BaseTx> {
        let mut req = SpendRequest::new(from.to_vec(), change.to_vec());
        req.add_amount(self.config.fee_asset_id()?, 0, fee)?
            .set_as_of(self.as_of);
        let r = spend(utxos, &req)?;
        self.base(r.change, r.ins)
    }

    fn wrap(&self, tx: Transaction) -> Result<UnsignedTx<Transaction>> {
        UnsignedTx::new(Codec::V0, tx)
    }

    /// Select UTXOs for `amount` of stake plus `burn`, locked UTXOs first.
    fn spend_stake(
        &self,
        utxos: &UtxoSet<Output>,
        amount: u64,
        burn: u64,
        from: &[Address],
        change: &[Address],
    ) -> Result<StakeSpend> {
        let asset_id = self.config.fee_asset_id()?;
        let mut ins = vec![];
        let mut stake = vec![];
        let mut change_outs = vec![];
        let mut staked = 0u64;

        for utxo in utxos.get_all_utxos() {
            if staked >= amount {
                break;
            }
            if utxo.asset_id != asset_id {
                continue;
            }
            let Output::StakeableLock(lock) = &utxo.output else {
                continue;
            };
            if lock.locktime <= self.as_of {
                continue;
            }
            let Some(sig_idxs) = lock.output.owners.get_spenders(from, self.as_of) else {
                continue;
            };
            let Some(input) = utxo.output.spend(sig_idxs, self.as_of) else {
                continue;
            };
            trace!("staking locked utxo {}", utxo.utxo_id);
            let available = lock.output.amount;
            let used = available.min(amount - staked);
            staked += used;
            ins.push(TransferableInput::new(utxo.utxo_id, asset_id, input));
            stake.push(TransferableOutput::new(
                asset_id,
                Output::StakeableLock(StakeableLockOut {
                    locktime: lock.locktime,
                    output: SecpTransferOutput::new(used, lock.output.owners.clone()),
                }),
            ));
            if available > used {
                change_outs.push(TransferableOutput::new(
                    asset_id,
                    Output::StakeableLock(StakeableLockOut {
                        locktime: lock.locktime,
                        output: SecpTransferOutput::new(available - used, lock.output.owners.clone()),
                    }),
                ));
            }
        }

        let mut burned = 0u64;
        let mut unlocked_stake = 0u64;
        let mut unlocked_change = 0u64;
        for utxo in utxos.get_all_utxos() {
            if staked >= amount && burned >= burn {
                break;
            }
            if utxo.asset_id != asset_id || utxo.output.stake_locktime() > self.as_of {
                continue;
            }
            let Some(available) = utxo.output.amount() else {
                continue;
            };
            let Some(sig_idxs) = utxo.output.owners().get_spenders(from, self.as_of) else {
                continue;
            };
            let Some(input) = utxo.output.spend(sig_idxs, self.as_of) else {
                continue;
            };
            ins.push(TransferableInput::new(utxo.utxo_id, asset_id, input));
            let mut remaining = available;
            let to_burn = remaining.min(burn - burned);
            burned += to_burn;
            remaining -= to_burn;
            let to_stake = remaining.min(amount - staked);
            staked += to_stake;
            unlocked_stake += to_stake;
            unlocked_change += remaining - to_stake;
        }

        if staked < amount || burned < burn {
            return Err(Error::InsufficientFunds {
                asset_id,
                required: amount.saturating_add(burn),
                available: staked + burned,
            });
        }
        if unlocked_stake > 0 {
            let out = SecpTransferOutput::to_addresses(unlocked_stake, change.to_vec(), 0, 1)?;
            stake.push(TransferableOutput::new(asset_id, Output::from(out)));
        }
        if unlocked_change > 0 {
            let out = SecpTransferOutput::to_addresses(unlocked_change, change.to_vec(), 0, 1)?;
            change_outs.push(TransferableOutput::new(asset_id, Output::from(out)));
        }
        debug!(
            "stake spend of {} with {} inputs, {} stake outputs",
            amount,
            ins.len(),
            stake.len()
        );
        Ok(StakeSpend {
            ins,
            stake,
            change: change_outs,
        })
    }

    /// Import every atomic UTXO the `from` addresses can spend from the source chain.
    pub fn build_import_tx(
        &self,
        atomic_utxos: &UtxoSet<Output>,
        source_chain: Id,
        to: &[Address],
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
        let outs = import_outputs(totals, fee_asset, self.config.tx_fee, to, Codec::V0)?;
        debug!(
            "building platform import tx of {} utxos from chain {}",
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

    /// Export `amount` of the fee asset to the `to` addresses on the destination chain.
    pub fn build_export_tx(
        &self,
        utxos: &UtxoSet<Output>,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let mut req = SpendRequest::new(from.to_vec(), change.to_vec());
        req.add_amount(self.config.fee_asset_id()?, amount, self.config.tx_fee)?
            .set_destinations(to.to_vec(), 0, 1)
            .set_as_of(self.as_of);
        let r = spend(utxos, &req)?;
        debug!(
            "building platform export tx of {} to chain {}",
            amount, destination_chain
        );
        let base = self.base(r.change, r.ins)?;
        self.wrap(Transaction::Export(ExportTx {
            base,
            destination_chain,
            export_outs: r.outs,
        }))
    }

    /// Stake `validator.weight` to validate; rewards go to the reward addresses.
    pub fn build_add_validator_tx(
        &self,
        utxos: &UtxoSet<Output>,
        validator: Validator,
        reward_addresses: &[Address],
        shares: u32,
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let s = self.spend_stake(utxos, validator.weight, 0, from, change)?;
        let reward_owner = OutputOwners::new(reward_addresses.to_vec(), 0, 1)?;
        debug!(
            "building add validator tx for {} staking {}",
            validator.node_id, validator.weight
        );
        let base = self.base(s.change, s.ins)?;
        let tx = AddValidatorTx::new(base, validator, s.stake, reward_owner, shares)?;
        self.wrap(Transaction::AddValidator(tx))
    }

    /// Delegate `validator.weight` to the validator.
    pub fn build_add_delegator_tx(
        &self,
        utxos: &UtxoSet<Output>,
        validator: Validator,
        reward_addresses: &[Address],
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let s = self.spend_stake(utxos, validator.weight, 0, from, change)?;
        let reward_owner = OutputOwners::new(reward_addresses.to_vec(), 0, 1)?;
        debug!(
            "building add delegator tx for {} staking {}",
            validator.node_id, validator.weight
        );
        let base = self.base(s.change, s.ins)?;
        let tx = AddDelegatorTx::new(base, validator, s.stake, reward_owner)?;
        self.wrap(Transaction::AddDelegator(tx))
    }

    /// Add a validator to an ally-chain, authorized by `signers` among its owners.
    #[allow(clippy::too_many_arguments)]
    pub fn build_add_allychain_validator_tx(
        &self,
        utxos: &UtxoSet<Output>,
        validator: Validator,
        allychain_id: Id,
        allychain_owners: &OutputOwners,
        signers: &[Address],
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let allychain_auth = self.auth(allychain_id, allychain_owners, signers)?;
        let base = self.pay_fee(utxos, self.config.tx_fee, from, change)?;
        debug!(
            "building add ally-chain validator tx for {} on {}",
            validator.node_id, allychain_id
        );
        self.wrap(Transaction::AddAllyChainValidator(AddAllyChainValidatorTx {
            base,
            validator,
            allychain_id,
            allychain_auth,
        }))
    }

    /// Create an ally-chain owned by `threshold` of the owner addresses.
    pub fn build_create_allychain_tx(
        &self,
        utxos: &UtxoSet<Output>,
        owner_addresses: &[Address],
        threshold: u32,
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let owner = OutputOwners::new(owner_addresses.to_vec(), 0, threshold)
            .map_err(|e| Error::AllyChainOwner(e.to_string()))?;
        let base = self.pay_fee(utxos, self.config.create_allychain_fee, from, change)?;
        debug!(
            "building create ally-chain tx with {} of {} owners",
            threshold,
            owner_addresses.len()
        );
        let tx = CreateAllyChainTx::new(base, owner)?;
        self.wrap(Transaction::CreateAllyChain(tx))
    }

    /// Create a chain on an ally-chain, authorized by `signers` among its owners.
    #[allow(clippy::too_many_arguments)]
    pub fn build_create_chain_tx(
        &self,
        utxos: &UtxoSet<Output>,
        allychain_id: Id,
        allychain_owners: &OutputOwners,
        signers: &[Address],
        chain_name: &str,
        vm_id: Id,
        fx_ids: Vec<Id>,
        genesis_data: Vec<u8>,
        from: &[Address],
        change: &[Address],
    ) -> Result<UnsignedTx<Transaction>> {
        let allychain_auth = self.auth(allychain_id, allychain_owners, signers)?;
        let base = self.pay_fee(utxos, self.config.create_chain_fee, from, change)?;
        debug!("building create chain tx {:?} on {}", chain_name, allychain_id);
        let tx = CreateChainTx::new(
            base,
            allychain_id,
            chain_name,
            vm_id,
            fx_ids,
            genesis_data,
            allychain_auth,
        )?;
        self.wrap(Transaction::CreateChain(tx))
    }

    fn auth(&self, allychain_id: Id, owners: &OutputOwners, signers: &[Address]) -> Result<AllyChainAuth> {
        AllyChainAuth::from_owners(owners, signers, self.as_of).ok_or_else(|| {
            Error::AllyChainOwner(format!(
                "signers do not meet the threshold of ally-chain {}",
                allychain_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{
        KeyChain, Network, NodeId, ShortId, SoftKeyChain, TxBody, TypedInput, Utxo, UtxoId,
    };

    fn setup() -> (TxBuilder, SoftKeyChain, Address, Id) {
        let fee_asset = Id::sha256(b"fee asset");
        let config = NetworkConfig::new(Network::Local).with_fee_asset_id(fee_asset);
        let mut kc = SoftKeyChain::new();
        let addr = kc.make_key();
        (TxBuilder::new(config), kc, addr, fee_asset)
    }

    fn add(set: &mut UtxoSet<Output>, n: u8, asset: Id, output: Output) {
        set.add_utxo(Utxo::new(UtxoId::new(Id::sha256(&[n]), 0), asset, output));
    }

    fn unlocked(amount: u64, owner: Address) -> Output {
        Output::from(SecpTransferOutput::to_addresses(amount, vec![owner], 0, 1).unwrap())
    }

    fn validator(weight: u64) -> Validator {
        Validator::new(NodeId(ShortId::new([1; 20])), 100, 200, weight).unwrap()
    }

    #[test]
    fn stake_uses_locked_first() {
        let (mut builder, kc, addr, fee_asset) = setup();
        builder.set_as_of(50);
        let mut utxos = UtxoSet::new();
        add(
            &mut utxos,
            1,
            fee_asset,
            Output::StakeableLock(StakeableLockOut {
                locktime: 1_000,
                output: SecpTransferOutput::to_addresses(600, vec![addr], 0, 1).unwrap(),
            }),
        );
        add(&mut utxos, 2, fee_asset, unlocked(1_000, addr));
        let unsigned = builder
            .build_add_validator_tx(&utxos, validator(800), &[addr], 20_000, &[addr], &[addr])
            .unwrap();
        let Transaction::AddValidator(tx) = unsigned.tx() else {
            panic!("not an add validator tx");
        };
        assert_eq!(tx.base.ins.len(), 2);
        let locked_stake: u64 = tx
            .stake_outs
            .iter()
            .filter(|o| o.output.stake_locktime() == 1_000)
            .map(|o| o.amount().unwrap())
            .sum();
        assert_eq!(locked_stake, 600);
        let total: u64 = tx.stake_outs.iter().map(|o| o.amount().unwrap()).sum();
        assert_eq!(total, 800);
        // the unlocked utxo returns what it did not stake
        assert_eq!(tx.base.outs.len(), 1);
        assert_eq!(tx.base.outs[0].amount().unwrap(), 800);
        assert!(tx.base.ins.iter().any(|i| matches!(i.input, Input::StakeableLock(_))));
        assert_eq!(unsigned.sign(&kc).unwrap().credentials().len(), 2);
    }

    #[test]
    fn stake_insufficient() {
        let (builder, _, addr, fee_asset) = setup();
        let mut utxos = UtxoSet::new();
        add(&mut utxos, 1, fee_asset, unlocked(10, addr));
        assert!(matches!(
            builder.build_add_delegator_tx(&utxos, validator(11), &[addr], &[addr], &[addr]),
            Err(Error::InsufficientFunds {
                required: 11,
                available: 10,
                ..
            })
        ));
        let unsigned = builder
            .build_add_delegator_tx(&utxos, validator(10), &[addr], &[addr], &[addr])
            .unwrap();
        assert_eq!(unsigned.tx().type_id(), 14);
    }

    #[test]
    fn allychain_lifecycle() {
        let (builder, mut kc, addr, fee_asset) = setup();
        let controller = kc.make_key();
        let mut utxos = UtxoSet::new();
        add(&mut utxos, 1, fee_asset, unlocked(5_000_000_000, addr));

        let unsigned = builder
            .build_create_allychain_tx(&utxos, &[controller], 1, &[addr], &[addr])
            .unwrap();
        let Transaction::CreateAllyChain(create) = unsigned.tx() else {
            panic!("not a create ally-chain tx");
        };
        assert_eq!(create.base.outs[0].amount().unwrap(), 4_000_000_000);
        let owners = create.owner.clone();
        let allychain_id = unsigned.sign(&kc).unwrap().id().unwrap();
        assert!(builder
            .build_create_allychain_tx(&utxos, &[controller], 2, &[addr], &[addr])
            .is_err());

        let unsigned = builder
            .build_add_allychain_validator_tx(
                &utxos,
                validator(1),
                allychain_id,
                &owners,
                &[controller],
                &[addr],
                &[addr],
            )
            .unwrap();
        let message = unsigned.message().unwrap();
        let signed = unsigned.sign(&kc).unwrap();
        assert_eq!(signed.credentials().len(), 2);
        assert_eq!(
            signed.credentials()[1].signatures[0],
            kc.get_key(&controller).unwrap().sign(&message)
        );
        assert!(matches!(
            builder.build_add_allychain_validator_tx(
                &utxos,
                validator(1),
                allychain_id,
                &owners,
                &[addr],
                &[addr],
                &[addr],
            ),
            Err(Error::AllyChainOwner(_))
        ));

        let unsigned = builder
            .build_create_chain_tx(
                &utxos,
                allychain_id,
                &owners,
                &[controller],
                "chain",
                Id::sha256(b"vm"),
                vec![],
                b"genesis".to_vec(),
                &[addr],
                &[addr],
            )
            .unwrap();
        let Transaction::CreateChain(chain) = unsigned.tx() else {
            panic!("not a create chain tx");
        };
        assert_eq!(chain.allychain_auth.sig_idxs[0].source, controller);
        assert_eq!(chain.base.ins[0].input.amount(), 5_000_000_000);
    }

    #[test]
    fn export_then_import() {
        let (builder, kc, addr, fee_asset) = setup();
        let mut utxos = UtxoSet::new();
        add(&mut utxos, 1, fee_asset, unlocked(10_000_000, addr));
        let chain = Id::sha256(b"other chain");
        let unsigned = builder
            .build_export_tx(&utxos, 4_000_000, chain, &[addr], &[addr], &[addr])
            .unwrap();
        let Transaction::Export(export) = unsigned.tx() else {
            panic!("not an export tx");
        };
        assert_eq!(export.export_outs[0].amount().unwrap(), 4_000_000);
        assert_eq!(export.base.outs[0].amount().unwrap(), 5_000_000);
        let export_outs = export.export_outs.clone();
        let export_id = unsigned.sign(&kc).unwrap().id().unwrap();

        let mut atomic = UtxoSet::new();
        for (i, out) in export_outs.into_iter().enumerate() {
            atomic.add_utxo(Utxo::new(UtxoId::new(export_id, i as u32), out.asset_id, out.output));
        }
        let unsigned = builder
            .build_import_tx(&atomic, chain, &[addr], &[addr])
            .unwrap();
        let Transaction::Import(import) = unsigned.tx() else {
            panic!("not an import tx");
        };
        assert_eq!(import.import_ins[0].utxo_id.tx_id, export_id);
        assert_eq!(import.base.outs[0].amount().unwrap(), 3_000_000);
    }
}
