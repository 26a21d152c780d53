use crate::common::{read_var_bytes, write_var_bytes, Encodable, OutputOwners};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Largest payload an NFT may carry.
pub const MAX_PAYLOAD_SIZE: usize = 1024;

pub(crate) fn check_payload(payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::BadArgument(format!(
            "nft payload of {} bytes exceeds {}",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// The right to mint NFTs of a group.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NftMintOutput {
    pub group_id: u32,
    pub owners: OutputOwners,
}

impl NftMintOutput {
    pub fn new(group_id: u32, owners: OutputOwners) -> NftMintOutput {
        NftMintOutput { group_id, owners }
    }
}

impl Encodable for NftMintOutput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let group_id = buffer.try_get_u32()?;
        let owners = OutputOwners::from_binary(buffer)?;
        Ok(NftMintOutput { group_id, owners })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.group_id);
        self.owners.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        4 + self.owners.encoded_size()
    }
}

/// An NFT: a group id, an opaque payload and its owners.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NftTransferOutput {
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub owners: OutputOwners,
}

impl NftTransferOutput {
    pub fn new(group_id: u32, payload: Vec<u8>, owners: OutputOwners) -> Result<NftTransferOutput> {
        check_payload(&payload)?;
        Ok(NftTransferOutput {
            group_id,
            payload,
            owners,
        })
    }
}

impl Encodable for NftTransferOutput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let group_id = buffer.try_get_u32()?;
        let payload = read_var_bytes(buffer)?;
        check_payload(&payload)?;
        let owners = OutputOwners::from_binary(buffer)?;
        Ok(NftTransferOutput {
            group_id,
            payload,
            owners,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.group_id);
        write_var_bytes(buffer, &self.payload)?;
        self.owners.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        4 + 4 + self.payload.len() as u64 + self.owners.encoded_size()
    }
}
