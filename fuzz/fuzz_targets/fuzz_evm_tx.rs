#![no_main]

use axia::common::{Encodable, Tx};
use axia::evm::Transaction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buffer = data;
    if let Ok(tx) = Tx::<Transaction>::from_binary(&mut buffer) {
        let consumed = data.len() - buffer.len();

        // sizes must agree with what is written
        let encoded = tx.to_binary_buf().expect("decoded tx must encode");
        assert_eq!(encoded.len() as u64, tx.encoded_size());

        // input that was already canonical re-encodes identically
        if encoded.len() == consumed && encoded == data[..consumed] {
            let again = Tx::<Transaction>::from_binary_buf(&encoded).expect("re-decode");
            assert_eq!(again.to_binary_buf().expect("re-encode"), encoded);
        }

        let _ = tx.id();
    }
});
