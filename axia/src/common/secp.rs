use crate::common::encoding::{read_list, write_list};
use crate::common::{Address, Encodable, OutputOwners, SigIdx};
use crate::Result;
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// The secp256k1 fx amount output: an amount of an asset owned by a set of addresses.
///
/// This is the body only; the type id is written by whoever holds the output.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecpTransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

impl SecpTransferOutput {
    pub fn new(amount: u64, owners: OutputOwners) -> SecpTransferOutput {
        SecpTransferOutput { amount, owners }
    }

    /// An output owned by the addresses, checking the threshold.
    pub fn to_addresses(
        amount: u64,
        addresses: Vec<Address>,
        locktime: u64,
        threshold: u32,
    ) -> Result<SecpTransferOutput> {
        Ok(SecpTransferOutput {
            amount,
            owners: OutputOwners::new(addresses, locktime, threshold)?,
        })
    }
}

impl Encodable for SecpTransferOutput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let amount = buffer.try_get_u64()?;
        let owners = OutputOwners::from_binary(buffer)?;
        Ok(SecpTransferOutput { amount, owners })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u64(self.amount);
        self.owners.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        8 + self.owners.encoded_size()
    }
}

/// The secp256k1 fx mint output: the right to mint more of a variable-cap asset.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecpMintOutput {
    pub owners: OutputOwners,
}

impl SecpMintOutput {
    pub fn new(owners: OutputOwners) -> SecpMintOutput {
        SecpMintOutput { owners }
    }
}

impl Encodable for SecpMintOutput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(SecpMintOutput {
            owners: OutputOwners::from_binary(buffer)?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.owners.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        self.owners.encoded_size()
    }
}

/// The secp256k1 fx amount input: spends an amount output with the signatures of the owners at
/// the listed indices.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecpTransferInput {
    pub amount: u64,
    pub sig_idxs: Vec<SigIdx>,
}

impl SecpTransferInput {
    pub fn new(amount: u64) -> SecpTransferInput {
        SecpTransferInput {
            amount,
            sig_idxs: Vec::new(),
        }
    }

    /// Add a signer. Indices are kept in the order they are added.
    pub fn add_signature_idx(&mut self, address_index: u32, address: Address) {
        self.sig_idxs.push(SigIdx::new(address_index, address));
    }
}

impl Encodable for SecpTransferInput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let amount = buffer.try_get_u64()?;
        let sig_idxs = read_list(buffer)?;
        Ok(SecpTransferInput { amount, sig_idxs })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u64(self.amount);
        write_list(buffer, &self.sig_idxs)
    }

    fn encoded_size(&self) -> u64 {
        8 + 4 + 4 * self.sig_idxs.len() as u64
    }
}
