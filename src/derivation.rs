//! EMV session key derivation.
//!
//! Two stages, both pure: the card's master key is diversified from the
//! issuer master key over PAN and PAN sequence number (option A), then a
//! session key is derived from the card master key over the application
//! transaction counter (common session key derivation). Identical inputs
//! always produce identical session keys; the scheme tolerates no
//! approximation, since the verifying host must reproduce exactly what
//! the personalization system and chip computed.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::definitions::{Atc, Pan, PanSequenceNumber};
use crate::keystore::IssuerMasterKey;
use crate::tdes;

/// Double-length TDES session key. Exists only for the span of a single
/// generate or verify call; zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; 16]);

impl SessionKey {
    pub(crate) fn from_bytes(bytes: [u8; 16]) -> Self {
        SessionKey(bytes)
    }

    pub(crate) fn half_a(&self) -> [u8; 8] {
        self.0[..8].try_into().unwrap()
    }

    pub(crate) fn half_b(&self) -> [u8; 8] {
        self.0[8..].try_into().unwrap()
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Derive the per-transaction session key for the given card and
/// counter.
pub fn derive_session_key(
    master_key: &IssuerMasterKey,
    pan: &Pan,
    pan_sequence_number: &PanSequenceNumber,
    atc: &Atc,
) -> SessionKey {
    let mut card_key = card_master_key(master_key.material(), pan, pan_sequence_number);

    // Common session key derivation: R = ATC || zeros, branch byte F0/0F.
    let mut r = [0u8; 8];
    r[..2].copy_from_slice(&atc.to_bytes());
    let mut f1 = r;
    f1[2] = 0xF0;
    let mut f2 = r;
    f2[2] = 0x0F;

    let mut session = [0u8; 16];
    session[..8].copy_from_slice(&tdes::ede2_encrypt(&card_key, f1));
    session[8..].copy_from_slice(&tdes::ede2_encrypt(&card_key, f2));
    tdes::adjust_parity(&mut session);

    card_key.zeroize();
    SessionKey(session)
}

/// Card master key derivation, option A: diversify the issuer master
/// key over Y and its complement.
fn card_master_key(imk: &[u8; 16], pan: &Pan, psn: &PanSequenceNumber) -> [u8; 16] {
    let y = diversification_value(pan, psn);
    let mut y_complement = y;
    for byte in y_complement.iter_mut() {
        *byte ^= 0xFF;
    }

    let mut card_key = [0u8; 16];
    card_key[..8].copy_from_slice(&tdes::ede2_encrypt(imk, y));
    card_key[8..].copy_from_slice(&tdes::ede2_encrypt(imk, y_complement));
    tdes::adjust_parity(&mut card_key);
    card_key
}

/// Y: the rightmost 16 digits of PAN || PSN, left-padded with zeros,
/// packed as BCD.
fn diversification_value(pan: &Pan, psn: &PanSequenceNumber) -> [u8; 8] {
    let digits = format!("{}{}", pan.as_str(), psn.as_str());
    let rightmost = if digits.len() > 16 {
        digits[digits.len() - 16..].to_string()
    } else {
        format!("{digits:0>16}")
    };

    let mut packed = [0u8; 8];
    for (i, pair) in rightmost.as_bytes().chunks(2).enumerate() {
        packed[i] = ((pair[0] - b'0') << 4) | (pair[1] - b'0');
    }
    packed
}
