use super::{
    Input, Output, ADD_ALLYCHAIN_VALIDATOR_TX_ID, ADD_DELEGATOR_TX_ID, ADD_VALIDATOR_TX_ID,
    ALLYCHAIN_AUTH_ID, CREATE_ALLYCHAIN_TX_ID, CREATE_CHAIN_TX_ID, EXPORT_TX_ID, IMPORT_TX_ID,
    SECP_CREDENTIAL_ID, SECP_OWNER_OUTPUT_ID,
};
use crate::common::encoding::list_size;
use crate::common::tx::{sign_input_list, sign_sig_idxs};
use crate::common::{
    canonical_inputs, canonical_order, read_list, read_short_string, read_var_bytes, write_list,
    write_short_string, write_var_bytes, Address, Codec, Credential, Encodable, Id, KeyChain,
    NodeId, OutputOwners, SigIdx, TransferableInput, TransferableOutput, TxBody,
};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use log::trace;
use serde::{Deserialize, Serialize};

/// The fields every platform chain transaction starts with.
pub type BaseTx = crate::common::BaseTx<Output, Input>;

pub const MAX_CHAIN_NAME_LEN: usize = 128;

/// Delegation fees are in units of 1/10000 of a percent, so this is 100%.
pub const MAX_DELEGATION_SHARES: u32 = 1_000_000;

fn read_owner(buffer: &mut dyn Buf) -> Result<OutputOwners> {
    let type_id = buffer.try_get_u32()?;
    if type_id != SECP_OWNER_OUTPUT_ID {
        return Err(Error::UnknownTypeId {
            context: "owner output",
            type_id,
        });
    }
    OutputOwners::from_binary(buffer)
}

fn write_owner(buffer: &mut dyn BufMut, owners: &OutputOwners) -> Result<()> {
    buffer.put_u32(SECP_OWNER_OUTPUT_ID);
    owners.to_binary(buffer)
}

fn owner_size(owners: &OutputOwners) -> u64 {
    4 + owners.encoded_size()
}

/// The node, period and weight of a validator or delegation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub node_id: NodeId,
    pub start_time: u64,
    pub end_time: u64,
    pub weight: u64,
}

impl Validator {
    pub fn new(node_id: NodeId, start_time: u64, end_time: u64, weight: u64) -> Result<Validator> {
        if end_time <= start_time {
            return Err(Error::BadArgument(format!(
                "validation must end after it starts: {} <= {}",
                end_time, start_time
            )));
        }
        Ok(Validator {
            node_id,
            start_time,
            end_time,
            weight,
        })
    }

    /// Seconds between start and end.
    pub fn duration(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }
}

impl Encodable for Validator {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Ok(Validator {
            node_id: NodeId::from_binary(buffer)?,
            start_time: buffer.try_get_u64()?,
            end_time: buffer.try_get_u64()?,
            weight: buffer.try_get_u64()?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.node_id.to_binary(buffer)?;
        buffer.put_u64(self.start_time);
        buffer.put_u64(self.end_time);
        buffer.put_u64(self.weight);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        20 + 8 + 8 + 8
    }
}

/// Authorizes an action on an ally-chain: the indices of the signing addresses in the
/// ally-chain's owner record.
///
/// Like [SigIdx] elsewhere, only the indices are on the wire. Decoded auths have zero source
/// addresses until [AllyChainAuth::resolve] is called with the owners.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllyChainAuth {
    pub sig_idxs: Vec<SigIdx>,
}

impl AllyChainAuth {
    pub fn new() -> AllyChainAuth {
        AllyChainAuth::default()
    }

    /// The auth for the first owners that can meet the threshold at `as_of`, if any.
    pub fn from_owners(owners: &OutputOwners, signers: &[Address], as_of: u64) -> Option<AllyChainAuth> {
        owners
            .get_spenders(signers, as_of)
            .map(|sig_idxs| AllyChainAuth { sig_idxs })
    }

    /// Add a signer. Indices are kept in the order they are added.
    pub fn add_signature_idx(&mut self, address_index: u32, address: Address) {
        self.sig_idxs.push(SigIdx::new(address_index, address));
    }

    /// Fill in the source addresses from the ally-chain's owners.
    pub fn resolve(&mut self, owners: &OutputOwners) -> Result<()> {
        owners.resolve_sig_idxs(&mut self.sig_idxs)
    }

    fn sign(&self, message: &[u8; 32], keychain: &dyn KeyChain) -> Result<Credential> {
        trace!("signing ally-chain auth with {} signers", self.sig_idxs.len());
        sign_sig_idxs(SECP_CREDENTIAL_ID, &self.sig_idxs, message, keychain)
    }
}

impl Encodable for AllyChainAuth {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let type_id = buffer.try_get_u32()?;
        if type_id != ALLYCHAIN_AUTH_ID {
            return Err(Error::UnknownTypeId {
                context: "ally-chain auth",
                type_id,
            });
        }
        Ok(AllyChainAuth {
            sig_idxs: read_list(buffer)?,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(ALLYCHAIN_AUTH_ID);
        write_list(buffer, &self.sig_idxs)
    }

    fn encoded_size(&self) -> u64 {
        4 + list_size(&self.sig_idxs)
    }
}

fn stake_total(stake_outs: &[TransferableOutput<Output>]) -> Result<u64> {
    let mut total = 0u64;
    for out in stake_outs {
        total = total
            .checked_add(out.amount()?)
            .ok_or_else(|| Error::TransferableOutput("stake amounts overflow".to_string()))?;
    }
    Ok(total)
}

fn check_stake(validator: &Validator, stake_outs: &[TransferableOutput<Output>]) -> Result<()> {
    let total = stake_total(stake_outs)?;
    if total != validator.weight {
        return Err(Error::BadArgument(format!(
            "stake of {} does not match weight {}",
            total, validator.weight
        )));
    }
    Ok(())
}

/// Adds a validator to the primary network. The stake is locked in `stake_outs` for the
/// validation period and returned afterwards; rewards go to `reward_owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput<Output>>,
    pub reward_owner: OutputOwners,
    /// The fee charged to delegators, in 1/10000 of a percent.
    pub shares: u32,
}

impl AddValidatorTx {
    /// Checks the stake adds up to the weight and the fee is at most 100%.
    pub fn new(
        base: BaseTx,
        validator: Validator,
        stake_outs: Vec<TransferableOutput<Output>>,
        reward_owner: OutputOwners,
        shares: u32,
    ) -> Result<AddValidatorTx> {
        if shares > MAX_DELEGATION_SHARES {
            return Err(Error::BadArgument(format!(
                "delegation shares {} above {}",
                shares, MAX_DELEGATION_SHARES
            )));
        }
        check_stake(&validator, &stake_outs)?;
        Ok(AddValidatorTx {
            base,
            validator,
            stake_outs,
            reward_owner,
            shares,
        })
    }
}

impl Encodable for AddValidatorTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let validator = Validator::from_binary(buffer)?;
        let stake_outs = read_list(buffer)?;
        let reward_owner = read_owner(buffer)?;
        let shares = buffer.try_get_u32()?;
        Ok(AddValidatorTx {
            base,
            validator,
            stake_outs,
            reward_owner,
            shares,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.validator.to_binary(buffer)?;
        write_list(buffer, canonical_order(&self.stake_outs)?)?;
        write_owner(buffer, &self.reward_owner)?;
        buffer.put_u32(self.shares);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size()
            + self.validator.encoded_size()
            + list_size(&self.stake_outs)
            + owner_size(&self.reward_owner)
            + 4
    }
}

/// Delegates stake to a validator of the primary network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDelegatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput<Output>>,
    pub reward_owner: OutputOwners,
}

impl AddDelegatorTx {
    pub fn new(
        base: BaseTx,
        validator: Validator,
        stake_outs: Vec<TransferableOutput<Output>>,
        reward_owner: OutputOwners,
    ) -> Result<AddDelegatorTx> {
        check_stake(&validator, &stake_outs)?;
        Ok(AddDelegatorTx {
            base,
            validator,
            stake_outs,
            reward_owner,
        })
    }
}

impl Encodable for AddDelegatorTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let validator = Validator::from_binary(buffer)?;
        let stake_outs = read_list(buffer)?;
        let reward_owner = read_owner(buffer)?;
        Ok(AddDelegatorTx {
            base,
            validator,
            stake_outs,
            reward_owner,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.validator.to_binary(buffer)?;
        write_list(buffer, canonical_order(&self.stake_outs)?)?;
        write_owner(buffer, &self.reward_owner)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size()
            + self.validator.encoded_size()
            + list_size(&self.stake_outs)
            + owner_size(&self.reward_owner)
    }
}

/// Adds a validator of the primary network to an ally-chain, authorized by the ally-chain's
/// owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAllyChainValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub allychain_id: Id,
    pub allychain_auth: AllyChainAuth,
}

impl Encodable for AddAllyChainValidatorTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let validator = Validator::from_binary(buffer)?;
        let allychain_id = Id::from_binary(buffer)?;
        let allychain_auth = AllyChainAuth::from_binary(buffer)?;
        Ok(AddAllyChainValidatorTx {
            base,
            validator,
            allychain_id,
            allychain_auth,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.validator.to_binary(buffer)?;
        self.allychain_id.to_binary(buffer)?;
        self.allychain_auth.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size()
            + self.validator.encoded_size()
            + Id::SIZE
            + self.allychain_auth.encoded_size()
    }
}

/// Creates an ally-chain controlled by `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAllyChainTx {
    pub base: BaseTx,
    pub owner: OutputOwners,
}

impl CreateAllyChainTx {
    /// The owner must have at least one address and a threshold of at least one.
    pub fn new(base: BaseTx, owner: OutputOwners) -> Result<CreateAllyChainTx> {
        if owner.addresses().is_empty() || owner.threshold() == 0 {
            return Err(Error::AllyChainOwner(format!(
                "threshold {} with {} addresses",
                owner.threshold(),
                owner.addresses().len()
            )));
        }
        Ok(CreateAllyChainTx { base, owner })
    }
}

impl Encodable for CreateAllyChainTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let owner = read_owner(buffer).map_err(|e| match e {
            Error::UnknownTypeId { type_id, .. } => {
                Error::AllyChainOwner(format!("type id {} is not an owner output", type_id))
            }
            e => e,
        })?;
        Ok(CreateAllyChainTx { base, owner })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        write_owner(buffer, &self.owner)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size() + owner_size(&self.owner)
    }
}

/// Creates a blockchain running `vm_id` on an ally-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChainTx {
    pub base: BaseTx,
    pub allychain_id: Id,
    pub chain_name: String,
    pub vm_id: Id,
    /// Written in sorted order.
    pub fx_ids: Vec<Id>,
    pub genesis_data: Vec<u8>,
    pub allychain_auth: AllyChainAuth,
}

impl CreateChainTx {
    /// Checks the name is printable ASCII of at most 128 bytes.
    pub fn new(
        base: BaseTx,
        allychain_id: Id,
        chain_name: &str,
        vm_id: Id,
        fx_ids: Vec<Id>,
        genesis_data: Vec<u8>,
        allychain_auth: AllyChainAuth,
    ) -> Result<CreateChainTx> {
        if chain_name.len() > MAX_CHAIN_NAME_LEN {
            return Err(Error::BadArgument(format!(
                "chain name longer than {} bytes",
                MAX_CHAIN_NAME_LEN
            )));
        }
        if !chain_name.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
            return Err(Error::BadArgument(format!(
                "chain name is not printable ascii: {:?}",
                chain_name
            )));
        }
        Ok(CreateChainTx {
            base,
            allychain_id,
            chain_name: chain_name.to_string(),
            vm_id,
            fx_ids,
            genesis_data,
            allychain_auth,
        })
    }
}

impl Encodable for CreateChainTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let allychain_id = Id::from_binary(buffer)?;
        let chain_name = read_short_string(buffer)?;
        let vm_id = Id::from_binary(buffer)?;
        let fx_ids = read_list(buffer)?;
        let genesis_data = read_var_bytes(buffer)?;
        let allychain_auth = AllyChainAuth::from_binary(buffer)?;
        Ok(CreateChainTx {
            base,
            allychain_id,
            chain_name,
            vm_id,
            fx_ids,
            genesis_data,
            allychain_auth,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.allychain_id.to_binary(buffer)?;
        write_short_string(buffer, &self.chain_name)?;
        self.vm_id.to_binary(buffer)?;
        let mut fx_ids: Vec<&Id> = self.fx_ids.iter().collect();
        fx_ids.sort();
        write_list(buffer, fx_ids)?;
        write_var_bytes(buffer, &self.genesis_data)?;
        self.allychain_auth.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size()
            + Id::SIZE
            + 2
            + self.chain_name.len() as u64
            + Id::SIZE
            + list_size(&self.fx_ids)
            + 4
            + self.genesis_data.len() as u64
            + self.allychain_auth.encoded_size()
    }
}

/// Consumes UTXOs exported to the platform chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: Id,
    pub import_ins: Vec<TransferableInput<Input>>,
}

impl Encodable for ImportTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let source_chain = Id::from_binary(buffer)?;
        let import_ins = read_list(buffer)?;
        Ok(ImportTx {
            base,
            source_chain,
            import_ins,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.source_chain.to_binary(buffer)?;
        write_list(buffer, canonical_inputs(&self.import_ins))
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size() + Id::SIZE + list_size(&self.import_ins)
    }
}

/// Sends outputs from the platform chain to another chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: Id,
    pub export_outs: Vec<TransferableOutput<Output>>,
}

impl Encodable for ExportTx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let base = BaseTx::from_binary(buffer)?;
        let destination_chain = Id::from_binary(buffer)?;
        let export_outs = read_list(buffer)?;
        Ok(ExportTx {
            base,
            destination_chain,
            export_outs,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.base.to_binary(buffer)?;
        self.destination_chain.to_binary(buffer)?;
        write_list(buffer, canonical_order(&self.export_outs)?)
    }

    fn encoded_size(&self) -> u64 {
        self.base.encoded_size() + Id::SIZE + list_size(&self.export_outs)
    }
}

/// The transactions of the platform chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    AddValidator(AddValidatorTx),
    AddAllyChainValidator(AddAllyChainValidatorTx),
    AddDelegator(AddDelegatorTx),
    CreateChain(CreateChainTx),
    CreateAllyChain(CreateAllyChainTx),
    Import(ImportTx),
    Export(ExportTx),
}

impl Transaction {
    pub fn base(&self) -> &BaseTx {
        match self {
            Transaction::AddValidator(tx) => &tx.base,
            Transaction::AddAllyChainValidator(tx) => &tx.base,
            Transaction::AddDelegator(tx) => &tx.base,
            Transaction::CreateChain(tx) => &tx.base,
            Transaction::CreateAllyChain(tx) => &tx.base,
            Transaction::Import(tx) => &tx.base,
            Transaction::Export(tx) => &tx.base,
        }
    }

    /// The credential kind for every input and auth of the chain.
    pub fn credential_type_id(&self) -> u32 {
        SECP_CREDENTIAL_ID
    }

    /// The ally-chain auth of the variants that carry one.
    pub fn allychain_auth_mut(&mut self) -> Option<&mut AllyChainAuth> {
        match self {
            Transaction::AddAllyChainValidator(tx) => Some(&mut tx.allychain_auth),
            Transaction::CreateChain(tx) => Some(&mut tx.allychain_auth),
            _ => None,
        }
    }
}

impl TxBody for Transaction {
    fn type_id(&self) -> u32 {
        match self {
            Transaction::AddValidator(_) => ADD_VALIDATOR_TX_ID,
            Transaction::AddAllyChainValidator(_) => ADD_ALLYCHAIN_VALIDATOR_TX_ID,
            Transaction::AddDelegator(_) => ADD_DELEGATOR_TX_ID,
            Transaction::CreateChain(_) => CREATE_CHAIN_TX_ID,
            Transaction::CreateAllyChain(_) => CREATE_ALLYCHAIN_TX_ID,
            Transaction::Import(_) => IMPORT_TX_ID,
            Transaction::Export(_) => EXPORT_TX_ID,
        }
    }

    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<Self> {
        match type_id {
            ADD_VALIDATOR_TX_ID => Ok(Transaction::AddValidator(AddValidatorTx::from_binary(buffer)?)),
            ADD_ALLYCHAIN_VALIDATOR_TX_ID => Ok(Transaction::AddAllyChainValidator(
                AddAllyChainValidatorTx::from_binary(buffer)?,
            )),
            ADD_DELEGATOR_TX_ID => Ok(Transaction::AddDelegator(AddDelegatorTx::from_binary(buffer)?)),
            CREATE_CHAIN_TX_ID => Ok(Transaction::CreateChain(CreateChainTx::from_binary(buffer)?)),
            CREATE_ALLYCHAIN_TX_ID => Ok(Transaction::CreateAllyChain(CreateAllyChainTx::from_binary(
                buffer,
            )?)),
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::from_binary(buffer)?)),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::from_binary(buffer)?)),
            _ => Err(Error::UnknownTypeId {
                context: "platform chain transaction",
                type_id,
            }),
        }
    }

    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        match self {
            Transaction::AddValidator(tx) => tx.to_binary(buffer),
            Transaction::AddAllyChainValidator(tx) => tx.to_binary(buffer),
            Transaction::AddDelegator(tx) => tx.to_binary(buffer),
            Transaction::CreateChain(tx) => tx.to_binary(buffer),
            Transaction::CreateAllyChain(tx) => tx.to_binary(buffer),
            Transaction::Import(tx) => tx.to_binary(buffer),
            Transaction::Export(tx) => tx.to_binary(buffer),
        }
    }

    fn body_size(&self) -> u64 {
        match self {
            Transaction::AddValidator(tx) => tx.encoded_size(),
            Transaction::AddAllyChainValidator(tx) => tx.encoded_size(),
            Transaction::AddDelegator(tx) => tx.encoded_size(),
            Transaction::CreateChain(tx) => tx.encoded_size(),
            Transaction::CreateAllyChain(tx) => tx.encoded_size(),
            Transaction::Import(tx) => tx.encoded_size(),
            Transaction::Export(tx) => tx.encoded_size(),
        }
    }

    fn supports_codec(codec: Codec) -> bool {
        codec == Codec::V0
    }

    fn is_credential_type(type_id: u32) -> bool {
        type_id == SECP_CREDENTIAL_ID
    }

    fn sign(&self, _codec: Codec, message: &[u8; 32], keychain: &dyn KeyChain) -> Result<Vec<Credential>> {
        let mut creds = self
            .base()
            .sign_inputs(self.credential_type_id(), message, keychain)?;
        match self {
            Transaction::Import(tx) => {
                creds.extend(sign_input_list(
                    &tx.import_ins,
                    self.credential_type_id(),
                    message,
                    keychain,
                )?);
            }
            Transaction::AddAllyChainValidator(tx) => {
                creds.push(tx.allychain_auth.sign(message, keychain)?);
            }
            Transaction::CreateChain(tx) => {
                creds.push(tx.allychain_auth.sign(message, keychain)?);
            }
            _ => {}
        }
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{
        KeyPair, PrivateKey, SecpTransferInput, SecpTransferOutput, ShortId, SoftKeyChain,
        UnsignedTx, UtxoId, PLATFORM_CHAIN_ID,
    };
    use crate::platformvm::StakeableLockOut;
    use hex_literal::hex;

    fn key(b: u8) -> PrivateKey {
        PrivateKey::from_slice(&[b; 32]).unwrap()
    }

    fn base(signer: Address) -> BaseTx {
        let mut secp = SecpTransferInput::new(3_000);
        secp.add_signature_idx(0, signer);
        BaseTx::builder(1337)
            .set_blockchain_id(PLATFORM_CHAIN_ID)
            .add_input(TransferableInput::new(
                UtxoId::new(Id::new([1; 32]), 0),
                Id::new([0xaa; 32]),
                Input::from(secp),
            ))
            .build()
            .unwrap()
    }

    fn stake(amount: u64, owner: Address, locktime: u64) -> TransferableOutput<Output> {
        let output = SecpTransferOutput::to_addresses(amount, vec![owner], 0, 1).unwrap();
        let output = if locktime > 0 {
            Output::StakeableLock(StakeableLockOut { locktime, output })
        } else {
            Output::SecpTransfer(output)
        };
        TransferableOutput::new(Id::new([0xaa; 32]), output)
    }

    fn validator(weight: u64) -> Validator {
        Validator::new(NodeId(ShortId::new([0xee; 20])), 1000, 2000, weight).unwrap()
    }

    #[test]
    fn validator_layout() {
        let v = validator(7);
        let bytes = v.to_binary_buf().unwrap();
        assert_eq!(bytes.len(), 44);
        assert_eq!(&bytes[20..28], &hex!("00000000000003e8"));
        assert_eq!(&bytes[36..44], &7u64.to_be_bytes());
        assert_eq!(v.duration(), 1000);
        assert!(Validator::new(NodeId::default(), 5, 5, 1).is_err());
    }

    #[test]
    fn add_validator_round_trip() {
        let owner = Address::new([3; 20]);
        let stake_outs = vec![stake(2_000, owner, 0), stake(500, owner, 9_999)];
        let reward = OutputOwners::new(vec![owner], 0, 1).unwrap();
        assert!(AddValidatorTx::new(base(owner), validator(2_000), stake_outs.clone(), reward.clone(), 20_000).is_err());
        assert!(AddValidatorTx::new(base(owner), validator(2_500), stake_outs.clone(), reward.clone(), 1_000_001).is_err());
        let tx = AddValidatorTx::new(base(owner), validator(2_500), stake_outs, reward, 20_000).unwrap();
        let bytes = tx.to_binary_buf().unwrap();
        assert_eq!(bytes.len() as u64, tx.encoded_size());
        // the reward owner follows the stake with its type id, then the shares
        let tail = &bytes[bytes.len() - 4 - 40..];
        assert_eq!(&tail[..4], &[0, 0, 0, 11]);
        assert_eq!(&bytes[bytes.len() - 4..], &20_000u32.to_be_bytes());
        let back = AddValidatorTx::from_binary_buf(&bytes).unwrap();
        assert_eq!(back.validator, tx.validator);
        assert_eq!(back.shares, 20_000);
        assert_eq!(back.to_binary_buf().unwrap(), bytes);
    }

    #[test]
    fn add_delegator_round_trip() {
        let owner = Address::new([3; 20]);
        let reward = OutputOwners::new(vec![owner], 0, 1).unwrap();
        let tx = AddDelegatorTx::new(base(owner), validator(100), vec![stake(100, owner, 0)], reward).unwrap();
        let bytes = tx.to_binary_buf().unwrap();
        assert_eq!(bytes.len() as u64, tx.encoded_size());
        let back = AddDelegatorTx::from_binary_buf(&bytes).unwrap();
        assert_eq!(back.stake_outs, tx.stake_outs);
    }

    #[test]
    fn create_allychain_owner() {
        let owner = OutputOwners::new(vec![Address::new([1; 20]), Address::new([2; 20])], 0, 2).unwrap();
        assert!(matches!(
            CreateAllyChainTx::new(base(Address::ZERO), OutputOwners::default()),
            Err(Error::AllyChainOwner(_))
        ));
        let tx = CreateAllyChainTx::new(base(Address::ZERO), owner).unwrap();
        let mut bytes = tx.to_binary_buf().unwrap();
        let back = CreateAllyChainTx::from_binary_buf(&bytes).unwrap();
        assert_eq!(back.owner.threshold(), 2);
        let at = tx.base.encoded_size() as usize;
        bytes[at + 3] = 7;
        assert!(matches!(
            CreateAllyChainTx::from_binary_buf(&bytes),
            Err(Error::AllyChainOwner(_))
        ));
    }

    #[test]
    fn create_chain_name_and_fx_order() {
        let b = base(Address::ZERO);
        let auth = AllyChainAuth::new();
        assert!(CreateChainTx::new(b.clone(), Id::ZERO, &"n".repeat(129), Id::ZERO, vec![], vec![], auth.clone()).is_err());
        assert!(CreateChainTx::new(b.clone(), Id::ZERO, "bad\nname", Id::ZERO, vec![], vec![], auth.clone()).is_err());
        let tx = CreateChainTx::new(
            b,
            Id::new([4; 32]),
            "my chain",
            Id::new([5; 32]),
            vec![Id::new([9; 32]), Id::new([8; 32])],
            b"{}".to_vec(),
            auth,
        )
        .unwrap();
        let bytes = tx.to_binary_buf().unwrap();
        assert_eq!(bytes.len() as u64, tx.encoded_size());
        let back = CreateChainTx::from_binary_buf(&bytes).unwrap();
        assert_eq!(back.fx_ids, vec![Id::new([8; 32]), Id::new([9; 32])]);
        assert_eq!(back.chain_name, "my chain");
        assert_eq!(back.genesis_data, b"{}".to_vec());
        assert_eq!(&bytes[bytes.len() - 8..], &hex!("0000000a00000000"));
    }

    #[test]
    fn auth_credential_comes_last() {
        let payer = KeyPair::new(key(1));
        let controller = KeyPair::new(key(2));
        let kc: SoftKeyChain = [key(1), key(2)].into_iter().collect();
        let owners = OutputOwners::new(vec![controller.address()], 0, 1).unwrap();
        let auth = AllyChainAuth::from_owners(&owners, &[controller.address()], 0).unwrap();
        let tx = Transaction::AddAllyChainValidator(AddAllyChainValidatorTx {
            base: base(payer.address()),
            validator: validator(1),
            allychain_id: Id::new([7; 32]),
            allychain_auth: auth,
        });
        let unsigned = UnsignedTx::new(Codec::V0, tx).unwrap();
        let message = unsigned.message().unwrap();
        let signed = unsigned.sign(&kc).unwrap();
        let creds = signed.credentials();
        assert_eq!(creds.len(), 2);
        assert_eq!(creds[0].signatures, vec![payer.sign(&message)]);
        assert_eq!(creds[1].type_id, SECP_CREDENTIAL_ID);
        assert_eq!(creds[1].signatures, vec![controller.sign(&message)]);

        // a decoded auth signs once its sources are resolved
        let mut decoded = crate::common::Tx::<Transaction>::from_binary_buf(&signed.to_binary_buf().unwrap())
            .unwrap()
            .unsigned()
            .clone()
            .into_tx();
        let auth = decoded.allychain_auth_mut().unwrap();
        assert_eq!(auth.sig_idxs[0].source, Address::ZERO);
        auth.resolve(&owners).unwrap();
        assert_eq!(auth.sig_idxs[0].source, controller.address());
    }

    #[test]
    fn codec_one_rejected() {
        let tx = Transaction::CreateAllyChain(CreateAllyChainTx {
            base: base(Address::ZERO),
            owner: OutputOwners::default(),
        });
        assert!(matches!(UnsignedTx::new(Codec::V1, tx), Err(Error::CodecId(1))));
    }
}
