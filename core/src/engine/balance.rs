// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Encrypted balance store
//!
//! The balance `v` is held as the single TEA block `(B, B)` with
//! `B = (v << 16) | v`, encrypted under the session key. The redundancy
//! lets a key be checked against the stored ciphertext without a MAC
//! (see [is_redundant]), every update re-encrypts the whole pattern.

use byteorder::{ByteOrder, LittleEndian};

use super::Error;
use crate::{
    cipher::{decrypt_block, encrypt_block, Block, Key},
    storage::{Slot, Storage, BALANCE_0, BALANCE_1},
    transaction::{execute, Operation},
};

/// Maximum balance
pub const MAX_BALANCE: u16 = u16::MAX;

/// Expand a balance to its redundant plaintext word
pub const fn pattern(value: u16) -> u32 {
    (value as u32) << 16 | value as u32
}

/// Encrypt a balance to its stored ciphertext
pub fn encode(value: u16, key: &Key) -> Block {
    encrypt_block(&[pattern(value); 2], key)
}

/// Check a decrypted block carries the balance redundancy pattern
pub fn is_redundant(plaintext: &Block) -> bool {
    let [a, b] = *plaintext;
    a == b && (a >> 16) == (a & 0xffff)
}

/// Fetch the stored ciphertext words
pub fn ciphertext<S: Storage>(storage: &S) -> Block {
    let mut c = [0u8; 8];
    storage.read_into(BALANCE_0, &mut c[..4]);
    storage.read_into(BALANCE_1, &mut c[4..]);

    [LittleEndian::read_u32(&c[..4]), LittleEndian::read_u32(&c[4..])]
}

/// Decrypt the stored ciphertext under `key`
pub fn decrypt<S: Storage>(storage: &S, key: &Key) -> Block {
    decrypt_block(&ciphertext(storage), key)
}

/// Read the balance (low half of the first plaintext word).
///
/// Redundancy is not checked here, callers are expected to have
/// passed a key test under the same key.
pub fn read<S: Storage>(storage: &S, key: &Key) -> u16 {
    decrypt(storage, key)[0] as u16
}

/// Encrypt and store a balance as a single two-word transaction
pub fn store<S: Storage>(storage: &mut S, key: &Key, value: u16) -> Result<(), Error> {
    let [c0, c1] = encode(value, key);
    let (w0, w1) = (c0.to_le_bytes(), c1.to_le_bytes());

    execute(
        storage,
        &[
            Operation::new(Slot::BalanceWord0, &w0),
            Operation::new(Slot::BalanceWord1, &w1),
        ],
    )
}

/// Credit the purse, returning the new balance
#[cfg_attr(feature = "noinline", inline(never))]
pub fn credit<S: Storage>(storage: &mut S, key: &Key, amount: u16) -> Result<u16, Error> {
    let current = read(storage, key);

    let value = current
        .checked_add(amount)
        .ok_or(Error::BalanceOverflow)?;

    store(storage, key, value)?;

    Ok(value)
}

/// Debit the purse, returning the new balance
#[cfg_attr(feature = "noinline", inline(never))]
pub fn debit<S: Storage>(storage: &mut S, key: &Key, amount: u16) -> Result<u16, Error> {
    let current = read(storage, key);

    let value = current
        .checked_sub(amount)
        .ok_or(Error::InsufficientFunds)?;

    store(storage, key, value)?;

    Ok(value)
}
