//! dCVV2 computation and verification.
//!
//! The checksum is the card scheme's CVV construction keyed with the
//! session key halves: field data built from PAN, expiry and service
//! code is run through a two block DES CBC-style chain and the result
//! decimalized to a fixed width value.

use subtle::ConstantTimeEq;

use crate::definitions::{Expiry, Pan, ServiceCode, ValidationData};
use crate::derivation::SessionKey;
use crate::tdes;

/// Width of the computed value in decimal digits.
pub const VALIDATION_DATA_LENGTH: usize = 3;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Recomputation did not match the submitted value. Carries no
    /// detail about which input disagreed.
    #[error("card validation data did not match")]
    VerificationFailed,
}

/// Compute the validation value for the given session key and card
/// fields.
pub fn generate(
    session_key: &SessionKey,
    pan: &Pan,
    expiry: &Expiry,
    service_code: &ServiceCode,
) -> ValidationData {
    let (block_one, block_two) = field_data(pan, expiry, service_code);
    let key_a = session_key.half_a();
    let key_b = session_key.half_b();

    let mut state = tdes::des_encrypt(&key_a, block_one);
    for (state_byte, data_byte) in state.iter_mut().zip(block_two) {
        *state_byte ^= data_byte;
    }
    state = tdes::des_encrypt(&key_a, state);
    state = tdes::des_decrypt(&key_b, state);
    state = tdes::des_encrypt(&key_a, state);

    ValidationData::from_digits(decimalize(&state, VALIDATION_DATA_LENGTH))
}

/// Recompute and compare in constant time.
pub fn verify(
    session_key: &SessionKey,
    pan: &Pan,
    expiry: &Expiry,
    service_code: &ServiceCode,
    submitted: &ValidationData,
) -> Result<(), Error> {
    let expected = generate(session_key, pan, expiry, service_code);
    let matches = expected
        .as_str()
        .as_bytes()
        .ct_eq(submitted.as_str().as_bytes());
    if matches.into() {
        Ok(())
    } else {
        Err(Error::VerificationFailed)
    }
}

/// PAN || expiry || service code, right-padded with zeros to 32 digits
/// and packed into two 8 byte blocks.
fn field_data(pan: &Pan, expiry: &Expiry, service_code: &ServiceCode) -> ([u8; 8], [u8; 8]) {
    let mut digits = format!(
        "{}{}{}",
        pan.as_str(),
        expiry.as_str(),
        service_code.as_str()
    );
    digits.truncate(32);
    let padded = format!("{digits:0<32}");

    let mut packed = [0u8; 16];
    for (i, pair) in padded.as_bytes().chunks(2).enumerate() {
        packed[i] = ((pair[0] - b'0') << 4) | (pair[1] - b'0');
    }
    (
        packed[..8].try_into().unwrap(),
        packed[8..].try_into().unwrap(),
    )
}

/// Extract `n` decimal digits from the result block: decimal nibbles
/// first in scan order, then hex nibbles A-F reduced by ten.
fn decimalize(block: &[u8; 8], n: usize) -> String {
    let nibbles: Vec<u8> = block.iter().flat_map(|b| [b >> 4, b & 0x0F]).collect();

    let mut digits = String::with_capacity(n);
    for nibble in nibbles.iter().filter(|nibble| **nibble < 10) {
        if digits.len() == n {
            break;
        }
        digits.push(char::from(b'0' + nibble));
    }
    for nibble in nibbles.iter().filter(|nibble| **nibble >= 10) {
        if digits.len() == n {
            break;
        }
        digits.push(char::from(b'0' + (nibble - 10)));
    }
    digits
}
