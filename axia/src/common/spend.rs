use crate::common::{
    Address, Codec, Id, SecpTransferOutput, TransferableInput, TransferableOutput, TypedOutput,
    UtxoSet,
};
use crate::{Error, Result};
use log::{debug, trace};
use std::collections::BTreeMap;

/// An amount of one asset to move, and how much of it to burn as the fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendAmount {
    pub asset_id: Id,
    pub amount: u64,
    pub burn: u64,
}

/// What to spend, from whom, and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendRequest {
    pub amounts: Vec<SpendAmount>,
    /// Addresses whose UTXOs may be spent.
    pub from: Vec<Address>,
    /// Owners of the outputs carrying the sent amounts.
    pub destinations: Vec<Address>,
    pub locktime: u64,
    pub threshold: u32,
    /// Owners of the change outputs.
    pub change_addresses: Vec<Address>,
    /// UTXOs locked past this time are not spent.
    pub as_of: u64,
    pub codec: Codec,
}

impl SpendRequest {
    pub fn new(from: Vec<Address>, change_addresses: Vec<Address>) -> SpendRequest {
        SpendRequest {
            amounts: vec![],
            from,
            destinations: vec![],
            locktime: 0,
            threshold: 1,
            change_addresses,
            as_of: 0,
            codec: Codec::default(),
        }
    }

    /// Send `amount` of the asset to the destinations and burn `burn` more.
    ///
    /// Amounts of the same asset add up, failing with [Error::BadArgument] if they overflow.
    /// Can be used in a chain.
    pub fn add_amount(&mut self, asset_id: Id, amount: u64, burn: u64) -> Result<&mut Self> {
        match self.amounts.iter_mut().find(|a| a.asset_id == asset_id) {
            Some(a) => {
                let overflow =
                    || Error::BadArgument(format!("amounts of asset {} overflow", asset_id));
                let total = a.amount.checked_add(amount).ok_or_else(overflow)?;
                let total_burn = a.burn.checked_add(burn).ok_or_else(overflow)?;
                a.amount = total;
                a.burn = total_burn;
            }
            None => self.amounts.push(SpendAmount {
                asset_id,
                amount,
                burn,
            }),
        }
        Ok(self)
    }

    pub fn set_destinations(
        &mut self,
        destinations: Vec<Address>,
        locktime: u64,
        threshold: u32,
    ) -> &mut Self {
        self.destinations = destinations;
        self.locktime = locktime;
        self.threshold = threshold;
        self
    }

    pub fn set_as_of(&mut self, as_of: u64) -> &mut Self {
        self.as_of = as_of;
        self
    }

    pub fn set_codec(&mut self, codec: Codec) -> &mut Self {
        self.codec = codec;
        self
    }
}

/// The inputs chosen and the outputs they fund.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendResult<O: TypedOutput> {
    pub ins: Vec<TransferableInput<O::Input>>,
    /// Outputs carrying the sent amounts to the destinations.
    pub outs: Vec<TransferableOutput<O>>,
    /// Outputs returning the excess to the change addresses.
    pub change: Vec<TransferableOutput<O>>,
}

struct Progress {
    needed: u64,
    spent: u64,
}

/// Pick UTXOs from the set to cover the request.
///
/// UTXOs are considered in id order so the same set and request always give the same result.
/// A UTXO is skipped when it is time locked or stake locked at `as_of`, when it carries no
/// amount, or when the `from` addresses cannot meet its threshold.
pub fn spend<O: TypedOutput>(utxos: &UtxoSet<O>, request: &SpendRequest) -> Result<SpendResult<O>> {
    let mut progress = BTreeMap::new();
    for a in &request.amounts {
        let needed = a.amount.checked_add(a.burn).ok_or_else(|| {
            Error::BadArgument(format!("amount and burn of asset {} overflow", a.asset_id))
        })?;
        progress.insert(a.asset_id, Progress { needed, spent: 0 });
    }

    let mut ins = vec![];
    for utxo in utxos.get_all_utxos() {
        let Some(p) = progress.get_mut(&utxo.asset_id) else {
            continue;
        };
        if p.spent >= p.needed {
            continue;
        }
        if utxo.output.stake_locktime() > request.as_of {
            trace!("skipping stake locked utxo {}", utxo.utxo_id);
            continue;
        }
        let Some(amount) = utxo.output.amount() else {
            continue;
        };
        let Some(sig_idxs) = utxo
            .output
            .owners()
            .get_spenders(&request.from, request.as_of)
        else {
            trace!("cannot spend utxo {}", utxo.utxo_id);
            continue;
        };
        let Some(input) = utxo.output.spend(sig_idxs, request.as_of) else {
            continue;
        };
        ins.push(TransferableInput::new(utxo.utxo_id, utxo.asset_id, input).with_codec(request.codec));
        p.spent = p.spent.saturating_add(amount);
    }

    let mut outs = vec![];
    let mut change = vec![];
    for a in &request.amounts {
        let Some(p) = progress.get(&a.asset_id) else {
            continue;
        };
        if p.spent < p.needed {
            return Err(Error::InsufficientFunds {
                asset_id: a.asset_id,
                required: p.needed,
                available: p.spent,
            });
        }
        if a.amount > 0 {
            let out = SecpTransferOutput::to_addresses(
                a.amount,
                request.destinations.clone(),
                request.locktime,
                request.threshold,
            )?;
            outs.push(TransferableOutput::new(a.asset_id, O::from(out)).with_codec(request.codec));
        }
        let excess = p.spent - p.needed;
        if excess > 0 {
            let out = SecpTransferOutput::to_addresses(excess, request.change_addresses.clone(), 0, 1)?;
            change.push(TransferableOutput::new(a.asset_id, O::from(out)).with_codec(request.codec));
        }
    }
    debug!(
        "spend selected {} inputs, {} outputs, {} change outputs",
        ins.len(),
        outs.len(),
        change.len()
    );
    Ok(SpendResult { ins, outs, change })
}

/// Inputs for every atomic UTXO the addresses can spend, with the total imported per asset.
pub(crate) fn import_inputs<O: TypedOutput>(
    atomic_utxos: &UtxoSet<O>,
    from: &[Address],
    as_of: u64,
    codec: Codec,
) -> (Vec<TransferableInput<O::Input>>, BTreeMap<Id, u64>) {
    let mut ins = vec![];
    let mut totals = BTreeMap::new();
    for utxo in atomic_utxos.get_all_utxos() {
        if utxo.output.stake_locktime() > as_of {
            continue;
        }
        let Some(amount) = utxo.output.amount() else {
            continue;
        };
        let Some(sig_idxs) = utxo.output.owners().get_spenders(from, as_of) else {
            continue;
        };
        let Some(input) = utxo.output.spend(sig_idxs, as_of) else {
            continue;
        };
        ins.push(TransferableInput::new(utxo.utxo_id, utxo.asset_id, input).with_codec(codec));
        let total: &mut u64 = totals.entry(utxo.asset_id).or_default();
        *total = total.saturating_add(amount);
    }
    (ins, totals)
}

/// One output per imported asset, less the fee.
pub(crate) fn import_outputs<O: TypedOutput>(
    totals: BTreeMap<Id, u64>,
    fee_asset: Id,
    fee: u64,
    to: &[Address],
    codec: Codec,
) -> Result<Vec<TransferableOutput<O>>> {
    let available = totals.get(&fee_asset).copied().unwrap_or(0);
    if available < fee {
        return Err(Error::InsufficientFunds {
            asset_id: fee_asset,
            required: fee,
            available,
        });
    }
    let mut outs = vec![];
    for (asset_id, total) in totals {
        let amount = if asset_id == fee_asset { total - fee } else { total };
        if amount == 0 {
            continue;
        }
        let out = SecpTransferOutput::to_addresses(amount, to.to_vec(), 0, 1)?;
        outs.push(TransferableOutput::new(asset_id, O::from(out)).with_codec(codec));
    }
    Ok(outs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avm::Output;
    use crate::common::{TypedInput, Utxo, UtxoId};

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn asset() -> Id {
        Id::new([9; 32])
    }

    fn set_with(amounts: &[(u8, u64, u64)]) -> UtxoSet<Output> {
        let mut set = UtxoSet::new();
        for (tx, amount, locktime) in amounts {
            let out = SecpTransferOutput::to_addresses(*amount, vec![addr(1)], *locktime, 1).unwrap();
            set.add_utxo(Utxo::new(
                UtxoId::new(Id::new([*tx; 32]), 0),
                asset(),
                Output::SecpTransfer(out),
            ));
        }
        set
    }

    #[test]
    fn spend_with_change() {
        let set = set_with(&[(2, 30, 0), (1, 50, 0), (3, 100, 0)]);
        let mut req = SpendRequest::new(vec![addr(1)], vec![addr(7)]);
        req.add_amount(asset(), 60, 10)
            .unwrap()
            .set_destinations(vec![addr(5)], 0, 1);
        let r = spend(&set, &req).unwrap();
        // taken in id order: 50 then 30
        assert_eq!(r.ins.len(), 2);
        assert_eq!(r.ins[0].utxo_id.tx_id, Id::new([1; 32]));
        assert_eq!(r.ins[0].input.amount(), 50);
        assert_eq!(r.ins[0].input.sig_idxs()[0].source, addr(1));
        assert_eq!(r.outs.len(), 1);
        assert_eq!(r.outs[0].amount().unwrap(), 60);
        assert_eq!(r.outs[0].output.owners().addresses(), &[addr(5)]);
        assert_eq!(r.change.len(), 1);
        assert_eq!(r.change[0].amount().unwrap(), 10);
        assert_eq!(r.change[0].output.owners().addresses(), &[addr(7)]);
    }

    #[test]
    fn exact_burn_has_no_outputs() {
        let set = set_with(&[(1, 10, 0)]);
        let mut req = SpendRequest::new(vec![addr(1)], vec![addr(1)]);
        req.add_amount(asset(), 0, 10).unwrap();
        let r = spend(&set, &req).unwrap();
        assert_eq!(r.ins.len(), 1);
        assert!(r.outs.is_empty());
        assert!(r.change.is_empty());
    }

    #[test]
    fn locked_and_foreign_utxos_are_skipped() {
        let set = set_with(&[(1, 10, 100), (2, 5, 0)]);
        let mut req = SpendRequest::new(vec![addr(1)], vec![addr(1)]);
        req.add_amount(asset(), 0, 12).unwrap();
        match spend(&set, &req) {
            Err(Error::InsufficientFunds {
                required,
                available,
                ..
            }) => {
                assert_eq!(required, 12);
                assert_eq!(available, 5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        req.set_as_of(100);
        assert_eq!(spend(&set, &req).unwrap().ins.len(), 2);

        let mut other = SpendRequest::new(vec![addr(2)], vec![addr(2)]);
        other.add_amount(asset(), 0, 1).unwrap();
        assert!(matches!(
            spend(&set, &other),
            Err(Error::InsufficientFunds { available: 0, .. })
        ));
    }

    #[test]
    fn amounts_of_same_asset_add_up() {
        let mut req = SpendRequest::new(vec![], vec![]);
        req.add_amount(asset(), 1, 2)
            .unwrap()
            .add_amount(asset(), 3, 4)
            .unwrap();
        assert_eq!(req.amounts.len(), 1);
        assert_eq!(req.amounts[0].amount, 4);
        assert_eq!(req.amounts[0].burn, 6);
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let mut req = SpendRequest::new(vec![], vec![]);
        req.add_amount(asset(), u64::MAX, 0).unwrap();
        assert!(matches!(
            req.add_amount(asset(), 1, 0),
            Err(Error::BadArgument(_))
        ));
        assert!(matches!(
            req.add_amount(asset(), 0, 1).and_then(|r| r.add_amount(asset(), 0, u64::MAX)),
            Err(Error::BadArgument(_))
        ));
        // the failed additions left the request as it was
        assert_eq!(req.amounts[0].amount, u64::MAX);
        assert_eq!(req.amounts[0].burn, 1);
    }
}
