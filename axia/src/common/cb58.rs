use crate::common::Id;
use crate::{Error, Result};
use base58::{FromBase58, ToBase58};

/// Functions for cb58, the base-58 encoding with checksum used for identifiers and keys.
///
/// The checksum is the first 4 bytes of the SHA256D hash of the payload and is appended to the
/// payload before the base-58 encoding.

const CHECKSUM_SIZE: usize = 4;

fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let mut ck = [0u8; CHECKSUM_SIZE];
    ck.copy_from_slice(&Id::sha256d(data).as_bytes()[..CHECKSUM_SIZE]);
    ck
}

/// Encodes `data` as a cb58 string.
pub fn encode(data: &[u8]) -> String {
    let mut ck_data = Vec::with_capacity(data.len() + CHECKSUM_SIZE);
    ck_data.extend_from_slice(data);
    ck_data.extend_from_slice(&checksum(data));
    ck_data.to_base58()
}

/// Decode a cb58 string, verifying and removing the checksum.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let mut data = encoded.from_base58()?;
    let l = data.len();
    if l <= CHECKSUM_SIZE {
        return Err(Error::BadData(format!(
            "cb58 string too short to contain checksum: {}",
            encoded
        )));
    }
    if checksum(&data[..l - CHECKSUM_SIZE]) != data[l - CHECKSUM_SIZE..] {
        return Err(Error::ChecksumMismatch);
    }
    data.truncate(l - CHECKSUM_SIZE);
    Ok(data)
}

/// Decode a cb58 string whose payload must be exactly `N` bytes.
pub fn decode_array<const N: usize>(encoded: &str) -> Result<[u8; N]> {
    let data = decode(encoded)?;
    <[u8; N]>::try_from(data.as_slice()).map_err(|_| {
        Error::BadData(format!(
            "cb58 payload of {} must be {} bytes, got {}",
            encoded,
            N,
            data.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn cb58_round_trip() {
        let data = hex!("00010203040506070809");
        let s = encode(&data);
        assert_eq!(decode(&s).unwrap(), data.to_vec());
        assert_eq!(decode_array::<10>(&s).unwrap(), data);
        assert!(decode_array::<11>(&s).is_err());
    }

    #[test]
    fn cb58_checksum_mismatch() {
        let mut raw = encode(&[1, 2, 3, 4, 5]).from_base58().unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        assert!(matches!(
            decode(&raw.to_base58()),
            Err(Error::ChecksumMismatch)
        ));
    }

    #[test]
    fn cb58_bad_input() {
        // 0, O, I and l are not in the alphabet
        assert!(matches!(decode("0OIl"), Err(Error::FromBase58Error(_))));
        // decodes to fewer than 5 bytes
        assert!(matches!(decode("2g"), Err(Error::BadData(_))));
        assert!(matches!(decode(""), Err(Error::BadData(_))));
    }

    #[test]
    fn empty_payload_is_rejected() {
        // a bare checksum decodes to exactly 4 bytes
        let s = encode(&[]);
        assert!(decode(&s).is_err());
    }
}
