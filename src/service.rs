//! The request/response surface of the issuer host: key creation plus
//! the generate and verify operations an authorization system calls.

use serde::{Deserialize, Serialize};

use crate::dcvv;
use crate::definitions::transaction;
use crate::definitions::{KeyPolicy, TransactionContext, ValidationData};
use crate::derivation;
use crate::keystore::{self, KeyCheckValue, KeyId, KeyStore};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no key found for the given identifier")]
    NotFound,
    #[error("key algorithm, usage and modes of use are not a combination this host implements")]
    UnsupportedPolicy,
    #[error("malformed transaction field: {0}")]
    Derivation(#[from] transaction::Error),
    /// Fixed message, no field-level diagnostics: the caller learns only
    /// that the value did not check out.
    #[error("card validation data did not match")]
    VerificationFailed,
}

impl From<keystore::Error> for Error {
    fn from(e: keystore::Error) -> Self {
        match e {
            keystore::Error::NotFound => Error::NotFound,
            keystore::Error::UnsupportedPolicy | keystore::Error::NotExportable => {
                Error::UnsupportedPolicy
            }
        }
    }
}

impl From<dcvv::Error> for Error {
    fn from(_: dcvv::Error) -> Self {
        Error::VerificationFailed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub policy: KeyPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyResponse {
    pub key_identifier: KeyId,
    pub key_check_value: KeyCheckValue,
}

/// The attribute bundle both operations carry alongside the PAN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub expiry_date: String,
    pub pan_sequence_number: String,
    pub application_transaction_counter: String,
    pub service_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateValidationDataRequest {
    pub key_identifier: KeyId,
    pub primary_account_number: String,
    pub attributes: TransactionAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateValidationDataResponse {
    pub key_identifier: KeyId,
    pub key_check_value: KeyCheckValue,
    pub validation_data: ValidationData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyValidationDataRequest {
    pub key_identifier: KeyId,
    pub primary_account_number: String,
    pub validation_data: String,
    pub attributes: TransactionAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyValidationDataResponse {
    pub key_identifier: KeyId,
    pub key_check_value: KeyCheckValue,
}

/// Entry point tying the key store, deriver and codec together. All
/// operations are synchronous and safe to call concurrently.
#[derive(Debug, Default)]
pub struct IssuerHost {
    keys: KeyStore,
}

impl IssuerHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access to the underlying store, for loading known key
    /// material or housekeeping.
    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    pub fn create_key(&self, request: CreateKeyRequest) -> Result<CreateKeyResponse, Error> {
        let key = self.keys.create_key(request.policy)?;
        Ok(CreateKeyResponse {
            key_identifier: key.id().clone(),
            key_check_value: key.check_value().clone(),
        })
    }

    pub fn generate_validation_data(
        &self,
        request: GenerateValidationDataRequest,
    ) -> Result<GenerateValidationDataResponse, Error> {
        let context = context_from(&request.primary_account_number, &request.attributes)?;
        let key = self.keys.get_key(&request.key_identifier)?;

        let session_key = derivation::derive_session_key(
            &key,
            &context.pan,
            &context.pan_sequence_number,
            &context.atc,
        );
        let validation_data = dcvv::generate(
            &session_key,
            &context.pan,
            &context.expiry,
            &context.service_code,
        );

        tracing::debug!(
            key_id = %key.id(),
            pan = %context.pan.masked(),
            atc = %context.atc,
            "generated validation data"
        );
        Ok(GenerateValidationDataResponse {
            key_identifier: key.id().clone(),
            key_check_value: key.check_value().clone(),
            validation_data,
        })
    }

    pub fn verify_validation_data(
        &self,
        request: VerifyValidationDataRequest,
    ) -> Result<VerifyValidationDataResponse, Error> {
        let context = context_from(&request.primary_account_number, &request.attributes)?;
        let key = self.keys.get_key(&request.key_identifier)?;

        // A submitted value that does not even parse can never match.
        let submitted: ValidationData = request
            .validation_data
            .parse()
            .map_err(|_| Error::VerificationFailed)?;

        let session_key = derivation::derive_session_key(
            &key,
            &context.pan,
            &context.pan_sequence_number,
            &context.atc,
        );
        let outcome = dcvv::verify(
            &session_key,
            &context.pan,
            &context.expiry,
            &context.service_code,
            &submitted,
        );

        tracing::debug!(
            key_id = %key.id(),
            pan = %context.pan.masked(),
            atc = %context.atc,
            matched = outcome.is_ok(),
            "verified validation data"
        );
        outcome?;
        Ok(VerifyValidationDataResponse {
            key_identifier: key.id().clone(),
            key_check_value: key.check_value().clone(),
        })
    }
}

fn context_from(
    pan: &str,
    attributes: &TransactionAttributes,
) -> Result<TransactionContext, Error> {
    Ok(TransactionContext::new(
        pan,
        &attributes.pan_sequence_number,
        &attributes.expiry_date,
        &attributes.application_transaction_counter,
        &attributes.service_code,
    )?)
}
