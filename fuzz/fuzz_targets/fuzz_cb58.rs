#![no_main]

use axia::common::{cb58, Id, ShortId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // encoding round trip
    if !data.is_empty() {
        let encoded = cb58::encode(data);
        assert_eq!(cb58::decode(&encoded).expect("round trip"), data);
    }

    // arbitrary strings must never panic
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = cb58::decode(s);
        let _ = Id::from_cb58(s);
        let _ = ShortId::from_cb58(s);
    }
});
