use crate::common::{cb58, Address, Codec, Encodable, Id, TypedOutput, UtxoId};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// An unspent output, as returned by a node.
///
/// The wire form is `codec, tx_id, output_index, asset_id, type_id, body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo<O> {
    pub codec: Codec,
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub output: O,
}

impl<O: TypedOutput> Utxo<O> {
    pub fn new(utxo_id: UtxoId, asset_id: Id, output: O) -> Utxo<O> {
        Utxo {
            codec: Codec::default(),
            utxo_id,
            asset_id,
            output,
        }
    }

    /// Parse the string form returned by nodes: cb58, or hex with a `0x` prefix.
    pub fn from_str_encoded(s: &str) -> Result<Utxo<O>> {
        let bytes = match s.strip_prefix("0x") {
            Some(h) => hex::decode(h)?,
            None => cb58::decode(s)?,
        };
        Utxo::from_binary_buf(&bytes)
    }
}

impl<O: TypedOutput> Encodable for Utxo<O> {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let codec = Codec::from_binary(buffer)?;
        let utxo_id = UtxoId::from_binary(buffer)?;
        let asset_id = Id::from_binary(buffer)?;
        let (output, output_codec) = O::read_typed(buffer)?;
        if output_codec != codec {
            return Err(Error::BadData(format!(
                "utxo {} has codec {} but its output has a codec {} type id",
                utxo_id,
                codec.id(),
                output_codec.id()
            )));
        }
        Ok(Utxo {
            codec,
            utxo_id,
            asset_id,
            output,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.codec.to_binary(buffer)?;
        self.utxo_id.to_binary(buffer)?;
        self.asset_id.to_binary(buffer)?;
        self.output.write_typed(self.codec, buffer)
    }

    fn encoded_size(&self) -> u64 {
        Codec::SIZE + UtxoId::SIZE + Id::SIZE + self.output.typed_size()
    }
}

/// A set of UTXOs keyed by [UtxoId], with an index from owner address to UTXO.
#[derive(Debug, Clone, Default)]
pub struct UtxoSet<O> {
    utxos: HashMap<UtxoId, Utxo<O>>,
    address_index: HashMap<Address, BTreeSet<UtxoId>>,
}

impl<O: TypedOutput> UtxoSet<O> {
    pub fn new() -> UtxoSet<O> {
        UtxoSet {
            utxos: HashMap::new(),
            address_index: HashMap::new(),
        }
    }

    /// Add a UTXO, replacing any UTXO with the same id.
    pub fn add_utxo(&mut self, utxo: Utxo<O>) {
        let id = utxo.utxo_id;
        self.remove_utxo(&id);
        for address in utxo.output.owners().addresses() {
            self.address_index.entry(*address).or_default().insert(id);
        }
        trace!("added utxo {}", id);
        self.utxos.insert(id, utxo);
    }

    pub fn add_utxos(&mut self, utxos: impl IntoIterator<Item = Utxo<O>>) {
        for utxo in utxos {
            self.add_utxo(utxo);
        }
    }

    /// Add a UTXO from the string form returned by nodes.
    pub fn add_utxo_str(&mut self, s: &str) -> Result<UtxoId> {
        let utxo = Utxo::from_str_encoded(s)?;
        let id = utxo.utxo_id;
        self.add_utxo(utxo);
        Ok(id)
    }

    pub fn get_utxo(&self, id: &UtxoId) -> Option<&Utxo<O>> {
        self.utxos.get(id)
    }

    /// All the UTXOs, ordered by id.
    pub fn get_all_utxos(&self) -> Vec<&Utxo<O>> {
        let mut all: Vec<&Utxo<O>> = self.utxos.values().collect();
        all.sort_by_key(|u| u.utxo_id);
        all
    }

    /// All the ids, in order.
    pub fn get_utxo_ids(&self) -> Vec<UtxoId> {
        let mut ids: Vec<UtxoId> = self.utxos.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn remove_utxo(&mut self, id: &UtxoId) -> Option<Utxo<O>> {
        let removed = self.utxos.remove(id)?;
        for address in removed.output.owners().addresses() {
            if let Some(ids) = self.address_index.get_mut(address) {
                ids.remove(id);
                if ids.is_empty() {
                    self.address_index.remove(address);
                }
            }
        }
        Some(removed)
    }

    pub fn includes(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// The ids of the UTXOs owned (in part) by any of the addresses, in order.
    pub fn get_utxo_ids_by_address(&self, addresses: &[Address]) -> Vec<UtxoId> {
        let mut ids = BTreeSet::new();
        for address in addresses {
            if let Some(owned) = self.address_index.get(address) {
                ids.extend(owned.iter().copied());
            }
        }
        ids.into_iter().collect()
    }

    /// The amount of the asset the addresses can spend at time `as_of`.
    pub fn get_balance(&self, addresses: &[Address], asset_id: &Id, as_of: u64) -> u64 {
        self.get_utxo_ids_by_address(addresses)
            .iter()
            .filter_map(|id| self.utxos.get(id))
            .filter(|u| u.asset_id == *asset_id && u.output.owners().meets_threshold(addresses, as_of))
            .filter_map(|u| u.output.amount())
            .fold(0u64, |total, amount| total.saturating_add(amount))
    }

    /// The distinct assets held in the set, in order.
    pub fn get_asset_ids(&self) -> Vec<Id> {
        let ids: BTreeSet<Id> = self.utxos.values().map(|u| u.asset_id).collect();
        ids.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}
