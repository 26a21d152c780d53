//! Property-based tests for the shared encodings.

#[cfg(test)]
mod tests {
    use crate::common::*;
    use crate::util::Amount;
    use proptest::prelude::*;

    fn byte_array_32() -> impl Strategy<Value = [u8; 32]> {
        prop::array::uniform32(any::<u8>())
    }

    fn address() -> impl Strategy<Value = Address> {
        prop::array::uniform20(any::<u8>()).prop_map(ShortId::new)
    }

    fn owners() -> impl Strategy<Value = OutputOwners> {
        (prop::collection::vec(address(), 1..6), any::<u64>()).prop_flat_map(|(addrs, locktime)| {
            let n = addrs.len() as u32;
            (1..=n).prop_map(move |threshold| {
                OutputOwners::new(addrs.clone(), locktime, threshold).unwrap()
            })
        })
    }

    proptest! {
        #[test]
        fn test_cb58_roundtrip(data in prop::collection::vec(any::<u8>(), 1..128)) {
            let encoded = cb58::encode(&data);
            let decoded = cb58::decode(&encoded).unwrap();
            prop_assert_eq!(data, decoded);
        }

        #[test]
        fn test_cb58_detects_corruption(data in prop::collection::vec(any::<u8>(), 1..64), flip in any::<u8>()) {
            use base58::{FromBase58, ToBase58};
            let mut raw = cb58::encode(&data).from_base58().unwrap();
            let i = flip as usize % data.len();
            raw[i] ^= 0x01;
            let corrupted = raw.to_base58();
            prop_assert!(cb58::decode(&corrupted).is_err());
        }

        #[test]
        fn test_id_hex_roundtrip(bytes in byte_array_32()) {
            let id = Id::new(bytes);
            let hex_string = id.encode_hex::<String>();
            prop_assert_eq!(Id::from_hex(&hex_string).unwrap(), id);
            prop_assert_eq!(Id::from_cb58(&id.to_cb58()).unwrap(), id);
        }

        #[test]
        fn test_owners_sorted_and_roundtrip(owners in owners()) {
            let addrs = owners.addresses();
            prop_assert!(addrs.windows(2).all(|w| w[0] <= w[1]));
            let bytes = owners.to_binary_buf().unwrap();
            prop_assert_eq!(bytes.len() as u64, owners.encoded_size());
            prop_assert_eq!(OutputOwners::from_binary_buf(&bytes).unwrap(), owners);
        }

        #[test]
        fn test_transfer_output_size(amount: u64, owners in owners()) {
            let out = SecpTransferOutput::new(amount, owners);
            let bytes = out.to_binary_buf().unwrap();
            prop_assert_eq!(bytes.len() as u64, out.encoded_size());
            prop_assert_eq!(&bytes[..8], &amount.to_be_bytes()[..]);
        }

        #[test]
        fn test_canonical_order_ignores_input_order(
            mut ids in prop::collection::vec(byte_array_32().prop_map(Id::new), 0..12),
            seed: u64
        ) {
            let first: Vec<Id> = canonical_order(&ids).unwrap().into_iter().copied().collect();
            if !ids.is_empty() {
                let k = (seed % ids.len() as u64) as usize;
                ids.rotate_left(k);
                ids.reverse();
            }
            let second: Vec<Id> = canonical_order(&ids).unwrap().into_iter().copied().collect();
            prop_assert_eq!(&first, &second);
            prop_assert!(first.windows(2).all(|w| w[0].as_bytes() <= w[1].as_bytes()));
        }

        #[test]
        fn test_amount_display_parse_roundtrip(units: u64) {
            let amount = Amount(units);
            prop_assert_eq!(amount.to_string().parse::<Amount>().unwrap(), amount);
        }
    }
}
