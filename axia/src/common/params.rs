use crate::common::Id;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The platform chain's blockchain id is all zeroes on every network.
pub const PLATFORM_CHAIN_ID: Id = Id::ZERO;

/// The networks the library knows the parameters of.
///
/// Other networks are described with a [NetworkConfig] built field by field, or loaded from JSON.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[serde(alias = "mainnet")]
    Main,
    #[serde(alias = "testnet")]
    Test,
    Local,
}

impl Network {
    /// The network id written into every transaction.
    pub fn network_id(&self) -> u32 {
        match self {
            Network::Main => 1,
            Network::Test => 5,
            Network::Local => 1337,
        }
    }
}

/// Everything a transaction builder needs to know about the network it builds for.
///
/// The asset chain and EVM chain ids are assigned when a network is created, so they are only
/// known from configuration. Builders fail with [Error::ChainId] when the one they need is unset.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network_id: u32,
    #[serde(default)]
    pub asset_chain_id: Option<Id>,
    #[serde(default = "platform_chain_id")]
    pub platform_chain_id: Id,
    #[serde(default)]
    pub evm_chain_id: Option<Id>,
    /// The asset fees are paid in.
    #[serde(default)]
    pub fee_asset_id: Option<Id>,
    pub tx_fee: u64,
    pub create_asset_fee: u64,
    pub create_allychain_fee: u64,
    pub create_chain_fee: u64,
}

fn platform_chain_id() -> Id {
    PLATFORM_CHAIN_ID
}

impl NetworkConfig {
    /// The configuration of a known network, with its standard fees and no chain ids.
    pub fn new(network: Network) -> NetworkConfig {
        NetworkConfig {
            network_id: network.network_id(),
            asset_chain_id: None,
            platform_chain_id: PLATFORM_CHAIN_ID,
            evm_chain_id: None,
            fee_asset_id: None,
            tx_fee: 1_000_000,
            create_asset_fee: 10_000_000,
            create_allychain_fee: 1_000_000_000,
            create_chain_fee: 1_000_000_000,
        }
    }

    pub fn with_asset_chain_id(mut self, id: Id) -> NetworkConfig {
        self.asset_chain_id = Some(id);
        self
    }

    pub fn with_evm_chain_id(mut self, id: Id) -> NetworkConfig {
        self.evm_chain_id = Some(id);
        self
    }

    pub fn with_fee_asset_id(mut self, id: Id) -> NetworkConfig {
        self.fee_asset_id = Some(id);
        self
    }

    pub fn asset_chain_id(&self) -> Result<Id> {
        self.asset_chain_id
            .ok_or_else(|| Error::ChainId("asset chain".to_string()))
    }

    pub fn evm_chain_id(&self) -> Result<Id> {
        self.evm_chain_id
            .ok_or_else(|| Error::ChainId("evm chain".to_string()))
    }

    pub fn fee_asset_id(&self) -> Result<Id> {
        self.fee_asset_id
            .ok_or_else(|| Error::BadArgument("fee asset id not configured".to_string()))
    }

    /// Load the configuration from its JSON form.
    pub fn from_json(json: &str) -> Result<NetworkConfig> {
        serde_json::from_str(json).map_err(|e| Error::BadData(format!("network config: {}", e)))
    }
}

impl From<Network> for NetworkConfig {
    fn from(value: Network) -> Self {
        NetworkConfig::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_serialize_network() {
        assert_eq!(serde_json::to_string(&Network::Main).unwrap(), "\"main\"");
        assert_eq!(serde_json::to_string(&Network::Test).unwrap(), "\"test\"");
        assert_eq!(serde_json::to_string(&Network::Local).unwrap(), "\"local\"");
    }

    #[test]
    fn json_deserialize_old_names() {
        let n: Network = serde_json::from_str("\"mainnet\"").unwrap();
        assert_eq!(n, Network::Main);
        let n: Network = serde_json::from_str("\"testnet\"").unwrap();
        assert_eq!(n, Network::Test);
    }

    #[test]
    fn config_round_trip() {
        let cfg = NetworkConfig::new(Network::Local)
            .with_asset_chain_id(Id::sha256(b"asset chain"))
            .with_fee_asset_id(Id::sha256(b"fee asset"));
        let json = serde_json::to_string(&cfg).unwrap();
        let back = NetworkConfig::from_json(&json).unwrap();
        assert_eq!(back, cfg);
        assert_eq!(back.network_id, 1337);
        assert_eq!(back.platform_chain_id, PLATFORM_CHAIN_ID);
    }

    #[test]
    fn unset_chain_id() {
        let cfg = NetworkConfig::new(Network::Test);
        assert!(matches!(cfg.asset_chain_id(), Err(Error::ChainId(_))));
        assert!(matches!(cfg.evm_chain_id(), Err(Error::ChainId(_))));
    }

    #[test]
    fn minimal_json() {
        let json = r#"{"network_id": 12345, "tx_fee": 1, "create_asset_fee": 2,
            "create_allychain_fee": 3, "create_chain_fee": 4}"#;
        let cfg = NetworkConfig::from_json(json).unwrap();
        assert_eq!(cfg.network_id, 12345);
        assert_eq!(cfg.asset_chain_id, None);
        assert_eq!(cfg.platform_chain_id, Id::ZERO);
    }
}
