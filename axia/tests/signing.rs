//! Signatures line up with the signature indices they answer.

mod common;

use axia::avm::{self, Transaction};
use axia::common::{
    canonical_inputs, Encodable, FromHex, Id, PublicKey, SecpTransferOutput, SoftKeyChain, Tx,
    TypedInput, Utxo, UtxoId, UtxoSet,
};
use axia::Error;
use common::{fee_asset, keys, local_config};

fn multisig_utxos(owners: Vec<axia::common::Address>) -> UtxoSet<avm::Output> {
    let mut set = UtxoSet::new();
    set.add_utxo(Utxo::new(
        UtxoId::new(Id::sha256(b"multisig"), 3),
        fee_asset(),
        avm::Output::from(SecpTransferOutput::to_addresses(5_000_000, owners, 0, 2).unwrap()),
    ));
    set
}

#[test]
fn signatures_recover_to_indexed_owners() {
    let (kc, pairs) = keys(3);
    let addrs: Vec<_> = pairs.iter().map(|k| k.address()).collect();
    let utxos = multisig_utxos(addrs.clone());
    let owners = match &utxos.get_all_utxos()[0].output {
        avm::Output::SecpTransfer(o) => o.owners.clone(),
        _ => unreachable!(),
    };

    let unsigned = avm::TxBuilder::new(local_config())
        .build_base_tx(
            &utxos,
            fee_asset(),
            1_000_000,
            &[addrs[1]],
            &[addrs[0], addrs[2]],
            &[addrs[0]],
        )
        .unwrap();
    let message = unsigned.message().unwrap();
    let signed = unsigned.sign(&kc).unwrap();

    let Transaction::Base(base) = signed.tx() else {
        panic!("not a base tx");
    };
    let ins = canonical_inputs(&base.ins);
    assert_eq!(ins.len(), signed.credentials().len());
    for (input, cred) in ins.iter().zip(signed.credentials()) {
        let idxs = input.input.sig_idxs();
        assert_eq!(idxs.len(), 2);
        assert_eq!(cred.signatures.len(), idxs.len());
        for (idx, sig) in idxs.iter().zip(&cred.signatures) {
            let recovered = PublicKey::recover(&message, sig).unwrap();
            assert_eq!(
                Some(recovered.address()),
                owners.get_address(idx.address_index)
            );
        }
    }
}

#[test]
fn signing_is_deterministic_and_survives_hex() {
    let (kc, pairs) = keys(3);
    let addrs: Vec<_> = pairs.iter().map(|k| k.address()).collect();
    let utxos = multisig_utxos(addrs.clone());
    let build = || {
        avm::TxBuilder::new(local_config())
            .build_base_tx(&utxos, fee_asset(), 1_000_000, &[addrs[1]], &addrs, &[addrs[0]])
            .unwrap()
    };
    let a = build().sign(&kc).unwrap();
    let b = build().sign(&kc).unwrap();
    assert_eq!(a.to_hex().unwrap(), b.to_hex().unwrap());

    let decoded = Tx::<Transaction>::from_hex(a.to_hex().unwrap()).unwrap();
    assert_eq!(decoded.id().unwrap(), a.id().unwrap());
    assert_eq!(decoded.credentials(), a.credentials());
    assert_eq!(decoded.encoded_size(), a.encoded_size());
}

#[test]
fn missing_key_fails_whole_signing() {
    let (_, pairs) = keys(3);
    let addrs: Vec<_> = pairs.iter().map(|k| k.address()).collect();
    let utxos = multisig_utxos(addrs.clone());
    let partial: SoftKeyChain = [*pairs[0].private_key()].into_iter().collect();
    let unsigned = avm::TxBuilder::new(local_config())
        .build_base_tx(
            &utxos,
            fee_asset(),
            1_000_000,
            &[addrs[1]],
            &[addrs[0], addrs[2]],
            &[addrs[0]],
        )
        .unwrap();
    match unsigned.sign(&partial) {
        Err(Error::KeyNotFound(addr)) => assert_eq!(addr, addrs[2]),
        other => panic!("expected a missing key, got {:?}", other.map(|t| t.credentials().len())),
    }
}

#[test]
fn input_without_signers_is_rejected() {
    let (kc, _) = keys(1);
    let base = avm::BaseTx::builder(1337)
        .set_blockchain_id(Id::sha256(b"asset chain"))
        .add_input(axia::common::TransferableInput::new(
            UtxoId::new(Id::sha256(b"unsigned"), 0),
            fee_asset(),
            avm::Input::from(axia::common::SecpTransferInput::new(10)),
        ))
        .build()
        .unwrap();
    let unsigned = axia::common::UnsignedTx::new(axia::common::Codec::V0, Transaction::Base(base)).unwrap();
    assert!(matches!(unsigned.sign(&kc), Err(Error::TransferableInput(_))));
}
