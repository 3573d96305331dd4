use anyhow::{anyhow, Context, Error};
use clap::Parser;

use dcvv2::definitions::KeyPolicy;
use dcvv2::keystore::{KeyId, KEY_LENGTH};
use dcvv2::service::{
    GenerateValidationDataRequest, IssuerHost, TransactionAttributes, VerifyValidationDataRequest,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, clap::Subcommand)]
enum Action {
    /// Generate a dCVV2 value for a transaction under the given issuer
    /// master key.
    Generate {
        #[command(flatten)]
        fields: Fields,
    },
    /// Verify a submitted dCVV2 value against the given issuer master
    /// key and transaction.
    Verify {
        #[command(flatten)]
        fields: Fields,
        /// The value to verify, three digits.
        #[arg(long)]
        validation_data: String,
    },
}

#[derive(Debug, clap::Args)]
struct Fields {
    /// Issuer master key as 32 hex digits.
    #[arg(long)]
    imk: String,
    /// Primary account number, 12 to 19 digits.
    #[arg(long)]
    pan: String,
    /// Card expiry as four digits (YYMM).
    #[arg(long)]
    expiry: String,
    /// PAN sequence number, two digits.
    #[arg(long, default_value = "00")]
    psn: String,
    /// Application transaction counter, four hex digits.
    #[arg(long)]
    atc: String,
    /// Service code, three digits.
    #[arg(long)]
    service_code: String,
}

fn main() -> Result<(), Error> {
    match Args::parse().action {
        Action::Generate { fields } => generate(fields),
        Action::Verify {
            fields,
            validation_data,
        } => verify(fields, validation_data),
    }
}

fn generate(fields: Fields) -> Result<(), Error> {
    let host = IssuerHost::new();
    let key_identifier = load_key(&host, &fields.imk)?;
    let attributes = attributes(&fields);
    let response = host
        .generate_validation_data(GenerateValidationDataRequest {
            key_identifier,
            primary_account_number: fields.pan,
            attributes,
        })
        .context("could not generate validation data")?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn verify(fields: Fields, validation_data: String) -> Result<(), Error> {
    let host = IssuerHost::new();
    let key_identifier = load_key(&host, &fields.imk)?;
    let attributes = attributes(&fields);
    let response = host.verify_validation_data(VerifyValidationDataRequest {
        key_identifier,
        primary_account_number: fields.pan,
        validation_data,
        attributes,
    })?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn load_key(host: &IssuerHost, imk: &str) -> Result<KeyId, Error> {
    let material: [u8; KEY_LENGTH] = hex::decode(imk)
        .context("imk must be hex")?
        .try_into()
        .map_err(|_| anyhow!("imk must be {} hex digits", KEY_LENGTH * 2))?;
    let key = host
        .key_store()
        .import_key(KeyPolicy::issuer_master_key(false), material)?;
    Ok(key.id().clone())
}

fn attributes(fields: &Fields) -> TransactionAttributes {
    TransactionAttributes {
        expiry_date: fields.expiry.clone(),
        pan_sequence_number: fields.psn.clone(),
        application_transaction_counter: fields.atc.clone(),
        service_code: fields.service_code.clone(),
    }
}
