use crate::common::encoding::read_array;
use crate::common::{Codec, Encodable, Id, OutputOwners, SecpTransferOutput, SigIdx, Typed};
use crate::{Error, Result};
use base58::{FromBase58, ToBase58};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The output kinds of a chain.
///
/// Each chain has a closed set of outputs; the enum of that set implements this trait so the
/// UTXO set, spend selection and builders can work on any chain.
pub trait TypedOutput: Typed + Clone + PartialEq + fmt::Debug + From<SecpTransferOutput> {
    /// The input kind that spends these outputs.
    type Input: TypedInput;

    /// The owners that must sign to spend the output.
    fn owners(&self) -> &OutputOwners;

    /// The amount carried, for the kinds that carry one.
    fn amount(&self) -> Option<u64>;

    /// The time until which the output can only be used for staking.
    fn stake_locktime(&self) -> u64 {
        0
    }

    /// Build the input spending this output with the given signers, or None when the kind is
    /// not spendable as an input.
    fn spend(&self, sig_idxs: Vec<SigIdx>, as_of: u64) -> Option<Self::Input>;
}

/// The input kinds of a chain.
pub trait TypedInput: Typed + Clone + PartialEq + fmt::Debug {
    /// The signers, one credential signature per entry.
    fn sig_idxs(&self) -> &[SigIdx];

    fn sig_idxs_mut(&mut self) -> &mut Vec<SigIdx>;

    /// The amount consumed.
    fn amount(&self) -> u64;
}

/// Identifies an output of a transaction: the transaction id and the output's position.
///
/// Ordering is by transaction id then index, which is the canonical order of inputs.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_id: Id,
    pub output_index: u32,
}

impl UtxoId {
    pub const SIZE: u64 = 36;

    pub fn new(tx_id: Id, output_index: u32) -> UtxoId {
        UtxoId {
            tx_id,
            output_index,
        }
    }

    pub fn to_bytes(&self) -> [u8; 36] {
        let mut key = [0u8; 36];
        key[..32].copy_from_slice(self.tx_id.as_bytes());
        key[32..].copy_from_slice(&self.output_index.to_be_bytes());
        key
    }
}

impl Encodable for UtxoId {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let tx_id = Id::from(read_array::<32>(buffer)?);
        let output_index = buffer.try_get_u32()?;
        Ok(UtxoId {
            tx_id,
            output_index,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.tx_id.to_binary(buffer)?;
        buffer.put_u32(self.output_index);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE
    }
}

/// The string form is plain base-58 (no checksum) of the 36 key bytes.
impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_bytes().to_base58())
    }
}

impl fmt::Debug for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

impl FromStr for UtxoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.from_base58()?;
        if bytes.len() != Self::SIZE as usize {
            return Err(Error::BadData(format!(
                "utxo id {} must decode to {} bytes, got {}",
                s,
                Self::SIZE,
                bytes.len()
            )));
        }
        UtxoId::from_binary_buf(&bytes)
    }
}

/// An output of a specific asset. The wire form is `asset_id, type_id, body`.
///
/// The codec decides which type id table is used for the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableOutput<O> {
    pub asset_id: Id,
    pub output: O,
    pub codec: Codec,
}

impl<O: Typed> TransferableOutput<O> {
    pub fn new(asset_id: Id, output: O) -> TransferableOutput<O> {
        TransferableOutput {
            asset_id,
            output,
            codec: Codec::default(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> TransferableOutput<O> {
        self.codec = codec;
        self
    }

    pub fn type_id(&self) -> u32 {
        self.output.type_id(self.codec)
    }
}

impl<O: TypedOutput> TransferableOutput<O> {
    /// The amount of the output, failing for kinds that carry none.
    pub fn amount(&self) -> Result<u64> {
        self.output.amount().ok_or_else(|| {
            Error::TransferableOutput(format!(
                "output of type {} for asset {} carries no amount",
                self.type_id(),
                self.asset_id
            ))
        })
    }
}

impl<O: Typed> Encodable for TransferableOutput<O> {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let asset_id = Id::from_binary(buffer)?;
        let (output, codec) = O::read_typed(buffer)?;
        Ok(TransferableOutput {
            asset_id,
            output,
            codec,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.asset_id.to_binary(buffer)?;
        self.output.write_typed(self.codec, buffer)
    }

    fn encoded_size(&self) -> u64 {
        Id::SIZE + self.output.typed_size()
    }
}

/// An input spending a previous output. The wire form is
/// `tx_id, output_index, asset_id, type_id, body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableInput<I> {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub input: I,
    pub codec: Codec,
}

impl<I: Typed> TransferableInput<I> {
    pub fn new(utxo_id: UtxoId, asset_id: Id, input: I) -> TransferableInput<I> {
        TransferableInput {
            utxo_id,
            asset_id,
            input,
            codec: Codec::default(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> TransferableInput<I> {
        self.codec = codec;
        self
    }
}

impl<I: TypedInput> TransferableInput<I> {
    /// Check the input has at least one signer.
    pub fn validate(&self) -> Result<()> {
        if self.input.sig_idxs().is_empty() {
            return Err(Error::TransferableInput(format!(
                "input spending {:?} has no signers",
                self.utxo_id
            )));
        }
        Ok(())
    }
}

impl<I: Typed> Encodable for TransferableInput<I> {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let utxo_id = UtxoId::from_binary(buffer)?;
        let asset_id = Id::from_binary(buffer)?;
        let (input, codec) = I::read_typed(buffer)?;
        Ok(TransferableInput {
            utxo_id,
            asset_id,
            input,
            codec,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.utxo_id.to_binary(buffer)?;
        self.asset_id.to_binary(buffer)?;
        self.input.write_typed(self.codec, buffer)
    }

    fn encoded_size(&self) -> u64 {
        UtxoId::SIZE + Id::SIZE + self.input.typed_size()
    }
}

/// Order inputs by the output they spend, the canonical order of inputs. The slice is untouched.
pub fn canonical_inputs<I>(inputs: &[TransferableInput<I>]) -> Vec<&TransferableInput<I>> {
    let mut sorted: Vec<&TransferableInput<I>> = inputs.iter().collect();
    sorted.sort_by_key(|i| i.utxo_id);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utxo_id_order() {
        let a = UtxoId::new(Id::new([1; 32]), 5);
        let b = UtxoId::new(Id::new([1; 32]), 6);
        let c = UtxoId::new(Id::new([2; 32]), 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn utxo_id_string() {
        let id = UtxoId::new(Id::sha256(b"tx"), 3);
        let s = id.to_string();
        assert_eq!(UtxoId::from_str(&s).unwrap(), id);
        assert!(UtxoId::from_str(&[1u8; 35].to_base58()).is_err());
    }

    #[test]
    fn utxo_id_layout() {
        let id = UtxoId::new(Id::new([0xee; 32]), 0x01020304);
        let bytes = id.to_binary_buf().unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[32..], &[1, 2, 3, 4]);
        assert_eq!(bytes, id.to_bytes().to_vec());
    }
}
