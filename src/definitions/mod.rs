//! Validated value objects for every externally supplied field, plus the
//! key policy vocabulary the key store enforces.

pub mod key_policy;
pub mod transaction;

pub use key_policy::{KeyAlgorithm, KeyModesOfUse, KeyPolicy, KeyUsage};
pub use transaction::{
    Atc, Expiry, Pan, PanSequenceNumber, ServiceCode, TransactionContext, ValidationData,
};
