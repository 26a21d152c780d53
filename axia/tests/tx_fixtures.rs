//! Decoding of known platform chain transaction bodies.

use axia::common::{Encodable, Id, NodeId, ShortId};
use axia::platformvm::{AddAllyChainValidatorTx, CreateAllyChainTx};
use hex_literal::hex;

const ADD_ALLYCHAIN_VALIDATOR: [u8; 308] = hex!(
    "00000539"
    "0000000000000000000000000000000000000000000000000000000000000000"
    "00000001"
    "3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d"
    "00000007" "00000000003d0900" "0000000000000000" "00000001"
    "00000001" "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"
    "00000001"
    "7777777777777777777777777777777777777777777777777777777777777777" "00000001"
    "3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d"
    "00000005" "00000000004c4b40" "00000001" "00000000"
    "00000000"
    "e9e9e9e9e9e9e9e9e9e9e9e9e9e9e9e9e9e9e9e9"
    "000000006279e79c" "00000000628c5c9c" "0000000000000001"
    "a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
    "0000000a" "00000002" "00000000" "00000002"
);

const CREATE_ALLYCHAIN: [u8; 296] = hex!(
    "00000539"
    "0000000000000000000000000000000000000000000000000000000000000000"
    "00000001"
    "3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d"
    "00000007" "00000001dcd65000" "0000000000000000" "00000001"
    "00000001" "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"
    "00000001"
    "7777777777777777777777777777777777777777777777777777777777777777" "00000001"
    "3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d3d"
    "00000005" "0000000218711a00" "00000001" "00000000"
    "00000000"
    "0000000b" "0000000000000000" "00000002" "00000003"
    "1111111111111111111111111111111111111111"
    "2222222222222222222222222222222222222222"
    "3333333333333333333333333333333333333333"
);

#[test]
fn add_allychain_validator_fixture() {
    let tx = AddAllyChainValidatorTx::from_binary_buf(&ADD_ALLYCHAIN_VALIDATOR).unwrap();
    assert_eq!(tx.base.network_id, 1337);
    assert_eq!(tx.base.blockchain_id, Id::ZERO);
    assert_eq!(tx.validator.start_time, 1652156316);
    assert_eq!(tx.validator.duration(), 14 * 86400);
    assert_eq!(tx.validator.weight, 1);
    assert_eq!(tx.validator.node_id, NodeId::from(ShortId::new([0xe9; 20])));
    assert_eq!(tx.allychain_id, Id::new([0xa1; 32]));
    let idxs: Vec<u32> = tx
        .allychain_auth
        .sig_idxs
        .iter()
        .map(|s| s.address_index)
        .collect();
    assert_eq!(idxs, vec![0, 2]);

    let bytes = tx.to_binary_buf().unwrap();
    assert_eq!(bytes.len() as u64, tx.encoded_size());
    assert_eq!(&bytes[..], &ADD_ALLYCHAIN_VALIDATOR[..]);
}

#[test]
fn create_allychain_fixture() {
    let tx = CreateAllyChainTx::from_binary_buf(&CREATE_ALLYCHAIN).unwrap();
    assert_eq!(tx.owner.addresses().len(), 3);
    assert_eq!(tx.owner.threshold(), 2);
    assert_eq!(tx.owner.locktime, 0);
    assert_eq!(tx.owner.addresses()[1], ShortId::new([0x22; 20]));
    assert_eq!(tx.to_binary_buf().unwrap(), CREATE_ALLYCHAIN.to_vec());
}

#[test]
fn truncated_fixture_fails() {
    let short = &ADD_ALLYCHAIN_VALIDATOR[..ADD_ALLYCHAIN_VALIDATOR.len() - 4];
    assert!(AddAllyChainValidatorTx::from_binary_buf(short).is_err());
}

#[test]
fn owner_type_id_is_checked() {
    let mut bad = CREATE_ALLYCHAIN;
    // owner output: type id, locktime, threshold, three addresses
    let at = CREATE_ALLYCHAIN.len() - 80;
    assert_eq!(&bad[at..at + 4], &hex!("0000000b"));
    bad[at + 3] = 0x07;
    assert!(matches!(
        CreateAllyChainTx::from_binary_buf(&bad),
        Err(axia::Error::AllyChainOwner(_))
    ));
}
