use anyhow::{Context, Result};

use dcvv2::definitions::{KeyAlgorithm, KeyPolicy};
use dcvv2::keystore::KeyId;
use dcvv2::service::{
    CreateKeyRequest, Error, GenerateValidationDataRequest, IssuerHost, TransactionAttributes,
    VerifyValidationDataRequest,
};

const PAN: &str = "4012345678901234";
const EXPIRY: &str = "2512";
const PSN: &str = "01";
const ATC: &str = "0001";
const SERVICE_CODE: &str = "101";

#[test]
fn generate_and_verify_round_trip() -> Result<()> {
    let host = IssuerHost::new();
    let key_identifier = create_issuer_key(&host)?;

    let generated = host
        .generate_validation_data(generate_request(&key_identifier, ATC))
        .context("could not generate validation data")?;

    assert_eq!(generated.validation_data.as_str().len(), 3);
    assert!(generated
        .validation_data
        .as_str()
        .bytes()
        .all(|b| b.is_ascii_digit()));

    let verified = host
        .verify_validation_data(verify_request(
            &key_identifier,
            ATC,
            generated.validation_data.as_str(),
        ))
        .context("round trip must verify")?;

    assert_eq!(verified.key_identifier, generated.key_identifier);
    assert_eq!(verified.key_check_value, generated.key_check_value);
    Ok(())
}

#[test]
fn generate_is_deterministic() -> Result<()> {
    let host = IssuerHost::new();
    let key_identifier = create_issuer_key(&host)?;

    let first = host.generate_validation_data(generate_request(&key_identifier, ATC))?;
    let second = host.generate_validation_data(generate_request(&key_identifier, ATC))?;
    assert_eq!(first.validation_data, second.validation_data);
    Ok(())
}

#[test]
fn counter_perturbation_fails_verification() -> Result<()> {
    let host = IssuerHost::new();
    let key_identifier = create_issuer_key(&host)?;

    let generated = host.generate_validation_data(generate_request(&key_identifier, "0001"))?;
    let result = host.verify_validation_data(verify_request(
        &key_identifier,
        "0009",
        generated.validation_data.as_str(),
    ));

    assert!(matches!(result, Err(Error::VerificationFailed)));
    Ok(())
}

#[test]
fn mismatched_values_never_verify() -> Result<()> {
    let host = IssuerHost::new();
    let key_identifier = create_issuer_key(&host)?;

    let generated = host.generate_validation_data(generate_request(&key_identifier, ATC))?;
    let genuine: u32 = generated.validation_data.as_str().parse()?;

    // Every other candidate in the three digit space must be rejected.
    for candidate in (0..1000u32).filter(|c| *c != genuine) {
        let result = host.verify_validation_data(verify_request(
            &key_identifier,
            ATC,
            &format!("{candidate:03}"),
        ));
        assert!(matches!(result, Err(Error::VerificationFailed)));
    }
    Ok(())
}

#[test]
fn verification_error_carries_no_diagnostics() -> Result<()> {
    let host = IssuerHost::new();
    let key_identifier = create_issuer_key(&host)?;

    let generated = host.generate_validation_data(generate_request(&key_identifier, "0001"))?;
    let err = host
        .verify_validation_data(verify_request(
            &key_identifier,
            "0009",
            generated.validation_data.as_str(),
        ))
        .unwrap_err();

    let message = err.to_string();
    assert_eq!(message, "card validation data did not match");
    assert!(!message.contains("atc"));
    assert!(!message.contains("0009"));
    Ok(())
}

#[test]
fn unknown_key_identifier_is_not_found() {
    let host = IssuerHost::new();
    let result = host.generate_validation_data(generate_request(
        &KeyId::from("never-created".to_string()),
        ATC,
    ));
    assert!(matches!(result, Err(Error::NotFound)));
}

#[test]
fn unsupported_policy_is_rejected() {
    let host = IssuerHost::new();
    let mut policy = KeyPolicy::issuer_master_key(false);
    policy.algorithm = KeyAlgorithm::Aes128;
    let result = host.create_key(CreateKeyRequest { policy });
    assert!(matches!(result, Err(Error::UnsupportedPolicy)));
}

#[test]
fn deleted_key_is_not_found() -> Result<()> {
    let host = IssuerHost::new();
    let key_identifier = create_issuer_key(&host)?;

    host.key_store().delete_key(&key_identifier)?;
    let result = host.generate_validation_data(generate_request(&key_identifier, ATC));
    assert!(matches!(result, Err(Error::NotFound)));
    Ok(())
}

#[test]
fn independent_keys_are_isolated() -> Result<()> {
    let host = IssuerHost::new();
    let first = create_issuer_key(&host)?;
    let second = create_issuer_key(&host)?;

    let generated = host.generate_validation_data(generate_request(&first, ATC))?;
    // The other key recomputes a different value with overwhelming
    // probability; when it happens to collide, verification legitimately
    // succeeds, so only assert on the recomputation.
    let other = host.generate_validation_data(generate_request(&second, ATC))?;
    if other.validation_data != generated.validation_data {
        let result = host.verify_validation_data(verify_request(
            &second,
            ATC,
            generated.validation_data.as_str(),
        ));
        assert!(matches!(result, Err(Error::VerificationFailed)));
    }
    Ok(())
}

#[test]
fn concurrent_generate_and_verify() -> Result<()> {
    let host = std::sync::Arc::new(IssuerHost::new());
    let key_identifier = create_issuer_key(&host)?;
    let expected = host
        .generate_validation_data(generate_request(&key_identifier, ATC))?
        .validation_data;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let host = host.clone();
            let key_identifier = key_identifier.clone();
            let expected = expected.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let generated = host
                        .generate_validation_data(generate_request(&key_identifier, ATC))
                        .unwrap();
                    assert_eq!(generated.validation_data, expected);
                    host.verify_validation_data(verify_request(
                        &key_identifier,
                        ATC,
                        expected.as_str(),
                    ))
                    .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    Ok(())
}

fn create_issuer_key(host: &IssuerHost) -> Result<KeyId> {
    let response = host
        .create_key(CreateKeyRequest {
            policy: KeyPolicy::issuer_master_key(false),
        })
        .context("could not create issuer master key")?;
    assert_eq!(response.key_check_value.as_str().len(), 6);
    Ok(response.key_identifier)
}

fn attributes(atc: &str) -> TransactionAttributes {
    TransactionAttributes {
        expiry_date: EXPIRY.to_string(),
        pan_sequence_number: PSN.to_string(),
        application_transaction_counter: atc.to_string(),
        service_code: SERVICE_CODE.to_string(),
    }
}

fn generate_request(key_identifier: &KeyId, atc: &str) -> GenerateValidationDataRequest {
    GenerateValidationDataRequest {
        key_identifier: key_identifier.clone(),
        primary_account_number: PAN.to_string(),
        attributes: attributes(atc),
    }
}

fn verify_request(
    key_identifier: &KeyId,
    atc: &str,
    validation_data: &str,
) -> VerifyValidationDataRequest {
    VerifyValidationDataRequest {
        key_identifier: key_identifier.clone(),
        primary_account_number: PAN.to_string(),
        validation_data: validation_data.to_string(),
        attributes: attributes(atc),
    }
}
