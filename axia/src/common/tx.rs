use crate::common::encoding::{list_size, read_list, write_list};
use crate::common::transferable::canonical_inputs;
use crate::common::{
    Codec, Credential, Encodable, Id, KeyChain, SigIdx, TransferableInput, TypedInput,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use hex::FromHex;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The set of transaction variants of one chain.
///
/// Each chain has an enum of its variants; the envelope writes the variant's type id, then the
/// body, and asks the variant for its credentials when signing.
pub trait TxBody: Sized + Clone + PartialEq + fmt::Debug {
    /// The type id of the variant.
    fn type_id(&self) -> u32;

    /// Decode the body of the variant selected by `type_id`.
    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<Self>;

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()>;

    fn body_size(&self) -> u64;

    /// Whether the chain accepts transactions in the codec.
    fn supports_codec(codec: Codec) -> bool;

    /// Whether the type id is a credential kind of the chain.
    fn is_credential_type(type_id: u32) -> bool;

    /// Put every transferable of the variant under the codec. Chains with a single type id
    /// table have nothing to do.
    fn set_codec(&mut self, _codec: Codec) {}

    /// Fail with [Error::CodecId] if a decoded transferable is under another codec than the
    /// envelope.
    fn check_codec(&self, _codec: Codec) -> Result<()> {
        Ok(())
    }

    /// Produce the credentials: one per input in canonical input order, then any the variant
    /// needs for its own authorizations.
    fn sign(
        &self,
        codec: Codec,
        message: &[u8; 32],
        keychain: &dyn KeyChain,
    ) -> Result<Vec<Credential>>;
}

/// Sign with the key of each signer's address, in order.
pub(crate) fn sign_sig_idxs(
    credential_type_id: u32,
    sig_idxs: &[SigIdx],
    message: &[u8; 32],
    keychain: &dyn KeyChain,
) -> Result<Credential> {
    let mut cred = Credential::new(credential_type_id);
    for sig in sig_idxs {
        let key = keychain.get_key(&sig.source)?;
        cred.add_signature(key.sign(message));
    }
    Ok(cred)
}

/// One credential per input, in canonical input order.
pub(crate) fn sign_input_list<I: TypedInput>(
    ins: &[TransferableInput<I>],
    credential_type_id: u32,
    message: &[u8; 32],
    keychain: &dyn KeyChain,
) -> Result<Vec<Credential>> {
    let mut creds = Vec::with_capacity(ins.len());
    for input in canonical_inputs(ins) {
        input.validate()?;
        trace!(
            "signing input {:?} with {} signers",
            input.utxo_id,
            input.input.sig_idxs().len()
        );
        creds.push(sign_sig_idxs(
            credential_type_id,
            input.input.sig_idxs(),
            message,
            keychain,
        )?);
    }
    Ok(creds)
}

/// A built transaction that has not been signed yet.
///
/// Signing consumes it and gives a [Tx]; there is no way back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx<T> {
    codec: Codec,
    tx: T,
}

impl<T: TxBody> UnsignedTx<T> {
    /// Wrap a variant, failing with [Error::CodecId] when the chain does not know the codec.
    ///
    /// Every output, input and operation of the variant is put under the codec, so the type ids
    /// written match the header.
    pub fn new(codec: Codec, mut tx: T) -> Result<UnsignedTx<T>> {
        if !T::supports_codec(codec) {
            return Err(Error::CodecId(codec.id()));
        }
        tx.set_codec(codec);
        Ok(UnsignedTx { codec, tx })
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn tx(&self) -> &T {
        &self.tx
    }

    pub fn into_tx(self) -> T {
        self.tx
    }

    /// The message that is signed: SHA-256 of the unsigned bytes.
    pub fn message(&self) -> Result<[u8; 32]> {
        Ok(*Id::sha256(&self.to_binary_buf()?).as_bytes())
    }

    /// Sign with the keys in the keychain. Fails with [Error::KeyNotFound] if any signer's key is
    /// missing, in which case nothing is returned.
    pub fn sign(self, keychain: &dyn KeyChain) -> Result<Tx<T>> {
        let message = self.message()?;
        let credentials = self.tx.sign(self.codec, &message, keychain)?;
        debug!(
            "signed tx of type {} with {} credentials",
            self.tx.type_id(),
            credentials.len()
        );
        Ok(Tx {
            unsigned: self,
            credentials,
        })
    }
}

impl<T: TxBody> Encodable for UnsignedTx<T> {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let codec = Codec::from_binary(buffer)?;
        if !T::supports_codec(codec) {
            return Err(Error::CodecId(codec.id()));
        }
        let type_id = buffer.try_get_u32()?;
        let tx = T::from_typed_binary(type_id, buffer)?;
        tx.check_codec(codec)?;
        Ok(UnsignedTx { codec, tx })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.codec.to_binary(buffer)?;
        buffer.put_u32(self.tx.type_id());
        self.tx.body_to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        Codec::SIZE + 4 + self.tx.body_size()
    }
}

/// A signed transaction: the unsigned transaction and its credentials, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx<T> {
    unsigned: UnsignedTx<T>,
    credentials: Vec<Credential>,
}

impl<T: TxBody> Tx<T> {
    pub fn unsigned(&self) -> &UnsignedTx<T> {
        &self.unsigned
    }

    pub fn tx(&self) -> &T {
        &self.unsigned.tx
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// The transaction id, SHA-256 of the signed bytes.
    pub fn id(&self) -> Result<Id> {
        Ok(Id::sha256(&self.to_binary_buf()?))
    }

    /// The signed bytes in hex, as submitted to a node.
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.to_binary_buf()?))
    }
}

impl<T: TxBody> Encodable for Tx<T> {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let unsigned = UnsignedTx::from_binary(buffer)?;
        let credentials: Vec<Credential> = read_list(buffer)?;
        if let Some(c) = credentials.iter().find(|c| !T::is_credential_type(c.type_id)) {
            return Err(Error::UnknownTypeId {
                context: "credential",
                type_id: c.type_id,
            });
        }
        Ok(Tx {
            unsigned,
            credentials,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.unsigned.to_binary(buffer)?;
        write_list(buffer, &self.credentials)
    }

    fn encoded_size(&self) -> u64 {
        self.unsigned.encoded_size() + list_size(&self.credentials)
    }
}

impl<T: TxBody> FromHex for Tx<T> {
    type Error = Error;

    fn from_hex<H: AsRef<[u8]>>(hex: H) -> Result<Self> {
        let bytes = hex::decode(hex)?;
        Tx::from_binary_buf(&bytes)
    }
}
