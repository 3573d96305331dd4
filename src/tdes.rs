//! Single and double-length DES block operations shared by key
//! derivation, check value computation and the dCVV2 checksum.

use des::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde2};

/// Encrypt one block under a double-length key in EDE two-key mode.
pub(crate) fn ede2_encrypt(key: &[u8; 16], block: [u8; 8]) -> [u8; 8] {
    let cipher = TdesEde2::new(GenericArray::from_slice(key));
    let mut block = GenericArray::from(block);
    cipher.encrypt_block(&mut block);
    block.into()
}

pub(crate) fn des_encrypt(key: &[u8; 8], block: [u8; 8]) -> [u8; 8] {
    let cipher = Des::new(GenericArray::from_slice(key));
    let mut block = GenericArray::from(block);
    cipher.encrypt_block(&mut block);
    block.into()
}

pub(crate) fn des_decrypt(key: &[u8; 8], block: [u8; 8]) -> [u8; 8] {
    let cipher = Des::new(GenericArray::from_slice(key));
    let mut block = GenericArray::from(block);
    cipher.decrypt_block(&mut block);
    block.into()
}

/// Force every byte of DES key material to odd parity.
pub(crate) fn adjust_parity(key: &mut [u8]) {
    for byte in key.iter_mut() {
        if byte.count_ones() % 2 == 0 {
            *byte ^= 0x01;
        }
    }
}
