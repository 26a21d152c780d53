#![allow(dead_code)]

use axia::common::{
    Address, Id, KeyPair, Network, NetworkConfig, PrivateKey, SecpTransferOutput, SoftKeyChain,
    TypedOutput, Utxo, UtxoId, UtxoSet,
};

/// The asset that pays fees in the test networks.
pub fn fee_asset() -> Id {
    Id::sha256(b"test fee asset")
}

/// A local network with every chain id set.
pub fn local_config() -> NetworkConfig {
    NetworkConfig::new(Network::Local)
        .with_asset_chain_id(Id::sha256(b"asset chain"))
        .with_evm_chain_id(Id::sha256(b"evm chain"))
        .with_fee_asset_id(fee_asset())
}

/// Deterministic keys `1..=n`, the keychain holding them and their addresses.
pub fn keys(n: u8) -> (SoftKeyChain, Vec<KeyPair>) {
    let pairs: Vec<KeyPair> = (1..=n)
        .map(|b| KeyPair::new(PrivateKey::from_slice(&[b; 32]).unwrap()))
        .collect();
    let kc = pairs.iter().map(|k| *k.private_key()).collect();
    (kc, pairs)
}

/// A set of single-owner UTXOs of the fee asset, one per amount.
pub fn funded<O: TypedOutput>(owner: Address, amounts: &[u64]) -> UtxoSet<O> {
    let mut set = UtxoSet::new();
    for (i, amount) in amounts.iter().enumerate() {
        let out = SecpTransferOutput::to_addresses(*amount, vec![owner], 0, 1).unwrap();
        set.add_utxo(Utxo::new(
            UtxoId::new(Id::sha256(&(i as u32).to_be_bytes()), i as u32),
            fee_asset(),
            O::from(out),
        ));
    }
    set
}
