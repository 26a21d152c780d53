/// The common module contains the types shared by all chains.

mod base_tx;
pub mod cb58;
mod credential;
mod crypto;
pub(crate) mod encoding;
mod id;
mod keychain;
mod owners;
mod params;
mod proptest_tests;
mod secp;
mod short_id;
pub(crate) mod spend;
pub(crate) mod transferable;
pub(crate) mod tx;
mod utxo;

pub use self::base_tx::{BaseTx, BaseTxBuilder};
pub use self::credential::{Credential, Signature};
pub use self::crypto::{KeyPair, PrivateKey, PublicKey};
pub use self::encoding::{
    canonical_order, read_list, read_short_string, read_var_bytes, write_list, write_short_string,
    write_var_bytes, Codec, Encodable, Typed,
};
pub use self::id::Id;
pub use self::keychain::{KeyChain, SoftKeyChain};
pub use self::owners::{OutputOwners, SigIdx};
pub use self::params::{Network, NetworkConfig, PLATFORM_CHAIN_ID};
pub use self::secp::{SecpMintOutput, SecpTransferInput, SecpTransferOutput};
pub use self::short_id::{Address, NodeId, ShortId};
pub use self::spend::{spend, SpendAmount, SpendRequest, SpendResult};
pub use self::transferable::{
    canonical_inputs, TransferableInput, TransferableOutput, TypedInput, TypedOutput, UtxoId,
};
pub use self::tx::{Tx, TxBody, UnsignedTx};
pub use self::utxo::{Utxo, UtxoSet};
pub use hex::{FromHex, ToHex};
