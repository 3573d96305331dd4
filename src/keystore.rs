//! Issuer master key storage under a usage/algorithm/mode policy.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::definitions::KeyPolicy;
use crate::tdes;

/// Length in bytes of double-length TDES key material.
pub const KEY_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    fn generate() -> Self {
        KeyId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for KeyId {
    fn from(s: String) -> KeyId {
        KeyId(s)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Six uppercase hex digits identifying key material without revealing
/// it: the first three bytes of the key's encryption of a zero block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCheckValue(String);

impl KeyCheckValue {
    fn compute(material: &[u8; KEY_LENGTH]) -> Self {
        let block = tdes::ede2_encrypt(material, [0u8; 8]);
        KeyCheckValue(hex::encode_upper(&block[..3]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyCheckValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct KeyMaterial([u8; KEY_LENGTH]);

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("KeyMaterial(..)")
    }
}

/// A stored issuer master key. Immutable after creation; leaves the
/// store only through [`KeyStore::delete_key`].
#[derive(Debug, Clone)]
pub struct IssuerMasterKey {
    id: KeyId,
    policy: KeyPolicy,
    material: KeyMaterial,
    check_value: KeyCheckValue,
    created_at: OffsetDateTime,
}

impl IssuerMasterKey {
    pub fn id(&self) -> &KeyId {
        &self.id
    }

    pub fn policy(&self) -> &KeyPolicy {
        &self.policy
    }

    pub fn check_value(&self) -> &KeyCheckValue {
        &self.check_value
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub(crate) fn material(&self) -> &[u8; KEY_LENGTH] {
        &self.material.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("key algorithm, usage and modes of use are not a combination this host implements")]
    UnsupportedPolicy,
    #[error("no key found for the given identifier")]
    NotFound,
    #[error("key is not exportable under its policy")]
    NotExportable,
}

#[derive(Debug, Default)]
pub struct KeyStore {
    keys: RwLock<BTreeMap<KeyId, IssuerMasterKey>>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate fresh key material under the given policy. Fails before
    /// any material is generated if the policy is not the supported
    /// derive triple.
    pub fn create_key(&self, policy: KeyPolicy) -> Result<IssuerMasterKey, Error> {
        if !policy.is_supported() {
            return Err(Error::UnsupportedPolicy);
        }
        let mut material = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut material);
        tdes::adjust_parity(&mut material);
        Ok(self.insert(policy, material))
    }

    /// Load a known issuer master key from raw material, under the same
    /// policy gate as [`create_key`](Self::create_key).
    pub fn import_key(
        &self,
        policy: KeyPolicy,
        material: [u8; KEY_LENGTH],
    ) -> Result<IssuerMasterKey, Error> {
        if !policy.is_supported() {
            return Err(Error::UnsupportedPolicy);
        }
        Ok(self.insert(policy, material))
    }

    fn insert(&self, policy: KeyPolicy, material: [u8; KEY_LENGTH]) -> IssuerMasterKey {
        let key = IssuerMasterKey {
            id: KeyId::generate(),
            policy,
            check_value: KeyCheckValue::compute(&material),
            material: KeyMaterial(material),
            created_at: OffsetDateTime::now_utc(),
        };
        self.keys
            .write()
            .unwrap()
            .insert(key.id.clone(), key.clone());
        tracing::info!(key_id = %key.id, kcv = %key.check_value, "stored issuer master key");
        key
    }

    pub fn get_key(&self, id: &KeyId) -> Result<IssuerMasterKey, Error> {
        self.keys
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    pub fn delete_key(&self, id: &KeyId) -> Result<(), Error> {
        self.keys
            .write()
            .unwrap()
            .remove(id)
            .map(|_| tracing::info!(key_id = %id, "deleted issuer master key"))
            .ok_or(Error::NotFound)
    }

    /// Raw key material, only for keys whose policy marks them
    /// exportable.
    pub fn export_key(&self, id: &KeyId) -> Result<[u8; KEY_LENGTH], Error> {
        let key = self.get_key(id)?;
        if !key.policy.exportable {
            return Err(Error::NotExportable);
        }
        Ok(key.material.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> KeyPolicy {
        KeyPolicy::issuer_master_key(false)
    }

    #[test]
    fn create_and_get_round_trip() {
        let store = KeyStore::new();
        let key = store.create_key(policy()).unwrap();
        let fetched = store.get_key(key.id()).unwrap();
        assert_eq!(fetched.id(), key.id());
        assert_eq!(fetched.check_value(), key.check_value());
        assert_eq!(fetched.material(), key.material());
    }

    #[test]
    fn created_material_has_odd_parity() {
        let store = KeyStore::new();
        let key = store.create_key(policy()).unwrap();
        assert!(key.material().iter().all(|b| b.count_ones() % 2 == 1));
    }

    #[test]
    fn unsupported_policy_stores_nothing() {
        let store = KeyStore::new();
        let mut bad = policy();
        bad.usage = crate::definitions::KeyUsage::CardVerificationKey;
        assert!(matches!(
            store.create_key(bad),
            Err(Error::UnsupportedPolicy)
        ));
        assert!(store.keys.read().unwrap().is_empty());
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let store = KeyStore::new();
        let id = KeyId::from("no-such-key".to_string());
        assert!(matches!(store.get_key(&id), Err(Error::NotFound)));
        assert!(matches!(store.delete_key(&id), Err(Error::NotFound)));
    }

    #[test]
    fn delete_removes_the_key() {
        let store = KeyStore::new();
        let key = store.create_key(policy()).unwrap();
        store.delete_key(key.id()).unwrap();
        assert!(matches!(store.get_key(key.id()), Err(Error::NotFound)));
    }

    #[test]
    fn export_respects_the_policy_flag() {
        let store = KeyStore::new();
        let locked = store.create_key(KeyPolicy::issuer_master_key(false)).unwrap();
        assert!(matches!(
            store.export_key(locked.id()),
            Err(Error::NotExportable)
        ));

        let material = *b"\x01\x23\x45\x67\x89\xAB\xCD\xEF\x01\x23\x45\x67\x89\xAB\xCD\xEF";
        let open = store
            .import_key(KeyPolicy::issuer_master_key(true), material)
            .unwrap();
        assert_eq!(store.export_key(open.id()).unwrap(), material);
    }

    #[test]
    fn check_value_is_six_hex_digits() {
        let store = KeyStore::new();
        let key = store.create_key(policy()).unwrap();
        let kcv = key.check_value().as_str();
        assert_eq!(kcv.len(), 6);
        assert!(kcv.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_output_redacts_material() {
        let store = KeyStore::new();
        let key = store.create_key(policy()).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("KeyMaterial(..)"));
        assert!(!debug.contains(&hex::encode(key.material())));
    }
}
