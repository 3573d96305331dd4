use serde::{Deserialize, Serialize};

/// Key material algorithm requested at creation time.
///
/// Only double-length TDES is usable for dCVV2 session key derivation;
/// the other variants exist so that a policy naming them is rejected
/// explicitly rather than silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    #[serde(rename = "TDES_2KEY")]
    Tdes2Key,
    #[serde(rename = "TDES_3KEY")]
    Tdes3Key,
    #[serde(rename = "AES_128")]
    Aes128,
}

/// Usage tag bound to the key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyUsage {
    /// EMV issuer master key, "other" category. The tag required for
    /// session key derivation.
    #[serde(rename = "EMV_MASTER_KEY_OTHER")]
    EmvMasterKeyOther,
    /// Static card verification key. Not usable for derivation.
    #[serde(rename = "CARD_VERIFICATION_KEY")]
    CardVerificationKey,
}

/// Operations the key is permitted to perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyModesOfUse {
    pub derive_key: bool,
    pub encrypt: bool,
    pub decrypt: bool,
    pub verify: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPolicy {
    pub algorithm: KeyAlgorithm,
    pub usage: KeyUsage,
    pub modes_of_use: KeyModesOfUse,
    pub exportable: bool,
}

impl KeyPolicy {
    /// The one triple this host implements: a double-length TDES EMV
    /// master key permitted to derive. Checked before any key material
    /// is generated or stored.
    pub fn is_supported(&self) -> bool {
        self.algorithm == KeyAlgorithm::Tdes2Key
            && self.usage == KeyUsage::EmvMasterKeyOther
            && self.modes_of_use.derive_key
    }

    /// Policy for an issuer master key usable by this host.
    pub fn issuer_master_key(exportable: bool) -> Self {
        Self {
            algorithm: KeyAlgorithm::Tdes2Key,
            usage: KeyUsage::EmvMasterKeyOther,
            modes_of_use: KeyModesOfUse {
                derive_key: true,
                ..Default::default()
            },
            exportable,
        }
    }
}
