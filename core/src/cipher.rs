// Copyright (c) 2022-2023 The MobileCoin Foundation

//! TEA block cipher
//!
//! 64-bit blocks (two 32-bit words) under a 128-bit [Key], 32 cycles.
//! Used both to protect the balance at rest and to authenticate the
//! terminal (see [crate::engine::auth]).

use byteorder::{BigEndian, ByteOrder};
use static_assertions::const_assert_eq;
use zeroize::Zeroize;

use crate::apdu::KEY_LEN;

/// Key schedule constant
pub const DELTA: u32 = 0x9E37_79B9;

/// Number of cycles
pub const ROUNDS: usize = 32;

/// Initial accumulator for decryption (`ROUNDS * DELTA`)
const DECRYPT_SUM: u32 = 0xC6EF_3720;

const_assert_eq!(DELTA.wrapping_mul(ROUNDS as u32), DECRYPT_SUM);

/// 64-bit cipher block
pub type Block = [u32; 2];

/// 128-bit cipher key, cleared on drop
#[derive(Clone, PartialEq, Default)]
pub struct Key([u32; 4]);

impl Key {
    /// Create a key from four words
    pub const fn new(words: [u32; 4]) -> Self {
        Self(words)
    }

    /// Create a key from its wire encoding (four big-endian words)
    pub fn from_bytes(b: &[u8; KEY_LEN]) -> Self {
        let mut k = [0u32; 4];
        BigEndian::read_u32_into(b, &mut k);
        Self(k)
    }

    /// Encode the key to wire format
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        let mut b = [0u8; KEY_LEN];
        BigEndian::write_u32_into(&self.0, &mut b);
        b
    }

    pub fn words(&self) -> &[u32; 4] {
        &self.0
    }
}

impl Zeroize for Key {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Keys are never printed
impl core::fmt::Debug for Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Key(..)")
    }
}

/// Encrypt a single block
pub fn encrypt_block(plaintext: &Block, key: &Key) -> Block {
    let k = &key.0;
    let [mut y, mut z] = *plaintext;
    let mut sum = 0u32;

    for _ in 0..ROUNDS {
        sum = sum.wrapping_add(DELTA);
        y = y.wrapping_add(
            (z << 4).wrapping_add(k[0]) ^ z.wrapping_add(sum) ^ (z >> 5).wrapping_add(k[1]),
        );
        z = z.wrapping_add(
            (y << 4).wrapping_add(k[2]) ^ y.wrapping_add(sum) ^ (y >> 5).wrapping_add(k[3]),
        );
    }

    [y, z]
}

/// Decrypt a single block, inverse of [encrypt_block]
pub fn decrypt_block(ciphertext: &Block, key: &Key) -> Block {
    let k = &key.0;
    let [mut y, mut z] = *ciphertext;
    let mut sum = DECRYPT_SUM;

    for _ in 0..ROUNDS {
        z = z.wrapping_sub(
            (y << 4).wrapping_add(k[2]) ^ y.wrapping_add(sum) ^ (y >> 5).wrapping_add(k[3]),
        );
        y = y.wrapping_sub(
            (z << 4).wrapping_add(k[0]) ^ z.wrapping_add(sum) ^ (z >> 5).wrapping_add(k[1]),
        );
        sum = sum.wrapping_sub(DELTA);
    }

    [y, z]
}
