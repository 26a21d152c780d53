use crate::common::{Address, KeyPair, PrivateKey};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A source of signing keys, looked up by address.
pub trait KeyChain {
    /// Return the key pair for the address, or [Error::KeyNotFound].
    fn get_key(&self, address: &Address) -> Result<&KeyPair>;

    /// All the addresses the keychain can sign for, in ascending order.
    fn addresses(&self) -> Vec<Address>;

    fn has_key(&self, address: &Address) -> bool {
        self.get_key(address).is_ok()
    }
}

/// A keychain holding the private keys in memory.
#[derive(Debug, Default, Clone)]
pub struct SoftKeyChain {
    keys: BTreeMap<Address, KeyPair>,
}

impl SoftKeyChain {
    pub fn new() -> SoftKeyChain {
        SoftKeyChain::default()
    }

    /// Add a key, returning its address. Adding the same key twice is harmless.
    pub fn add_key(&mut self, key: PrivateKey) -> Address {
        let pair = KeyPair::new(key);
        let address = pair.address();
        self.keys.insert(address, pair);
        address
    }

    /// Add a key from its `PrivateKey-<cb58>` string form.
    pub fn import_key(&mut self, key: &str) -> Result<Address> {
        Ok(self.add_key(PrivateKey::from_str(key)?))
    }

    /// Generate and add a new random key.
    pub fn make_key(&mut self) -> Address {
        self.add_key(PrivateKey::generate())
    }

    pub fn remove_key(&mut self, address: &Address) -> Option<KeyPair> {
        self.keys.remove(address)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyChain for SoftKeyChain {
    fn get_key(&self, address: &Address) -> Result<&KeyPair> {
        self.keys.get(address).ok_or(Error::KeyNotFound(*address))
    }

    fn addresses(&self) -> Vec<Address> {
        self.keys.keys().copied().collect()
    }
}

impl FromIterator<PrivateKey> for SoftKeyChain {
    fn from_iter<T: IntoIterator<Item = PrivateKey>>(iter: T) -> Self {
        let mut kc = SoftKeyChain::new();
        for key in iter {
            kc.add_key(key);
        }
        kc
    }
}
