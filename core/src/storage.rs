// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Non-volatile storage abstraction and persisted layout
//!
//! The card persists everything that must survive power loss in a small,
//! byte-addressable EEPROM-style memory. Single byte writes are atomic,
//! multi-byte updates go through the [transaction][crate::transaction] engine.
//!
//! ## Layout
//!
//! | Offset | Size | Contents                                   |
//! |--------|------|--------------------------------------------|
//! | 0      | 1    | pending transaction state                  |
//! | 1      | 1    | pending operation count                    |
//! | 2      | 3    | pending operation lengths                  |
//! | 5      | 3    | pending operation destinations ([Slot])    |
//! | 8      | 64   | pending payload                            |
//! | 72     | 20   | owner identity                             |
//! | 92     | 1    | owner identity length                      |
//! | 93     | 4    | balance ciphertext word 0 (little-endian)  |
//! | 97     | 4    | balance ciphertext word 1 (little-endian)  |
//! | 101    | 1    | retry counter                              |

use num_enum::TryFromPrimitive;
use static_assertions::const_assert_eq;
use strum::{Display, EnumIter};

use crate::{
    apdu::OWNER_MAX_LEN,
    transaction::{MAX_OPS, MAX_PAYLOAD},
};

/// Pending transaction state byte
pub const PENDING_STATE: usize = 0;
/// Pending operation count
pub const PENDING_COUNT: usize = PENDING_STATE + 1;
/// Pending operation lengths, one byte per operation
pub const PENDING_LENGTHS: usize = PENDING_COUNT + 1;
/// Pending operation destinations, one [Slot] byte per operation
pub const PENDING_SLOTS: usize = PENDING_LENGTHS + MAX_OPS;
/// Pending payload, operation sources concatenated in order
pub const PENDING_PAYLOAD: usize = PENDING_SLOTS + MAX_OPS;
/// Owner identity bytes
pub const OWNER: usize = PENDING_PAYLOAD + MAX_PAYLOAD;
/// Owner identity length
pub const OWNER_LEN: usize = OWNER + OWNER_MAX_LEN;
/// First balance ciphertext word
pub const BALANCE_0: usize = OWNER_LEN + 1;
/// Second balance ciphertext word
pub const BALANCE_1: usize = BALANCE_0 + 4;
/// Retry counter
pub const RETRY_COUNTER: usize = BALANCE_1 + 4;

/// Total persisted size
pub const STORAGE_SIZE: usize = RETRY_COUNTER + 1;

const_assert_eq!(STORAGE_SIZE, 102);

/// Erased memory value
pub const ERASED: u8 = 0xff;

/// Byte-addressable non-volatile memory
pub trait Storage {
    /// Read a single byte
    fn read(&self, addr: usize) -> u8;

    /// Write a single byte, writes of a single byte are atomic
    fn write(&mut self, addr: usize, value: u8);

    /// Read a contiguous range into `buff`
    fn read_into(&self, addr: usize, buff: &mut [u8]) {
        for (i, b) in buff.iter_mut().enumerate() {
            *b = self.read(addr + i);
        }
    }

    /// Write a contiguous range (_not_ atomic, see [crate::transaction])
    fn write_from(&mut self, addr: usize, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            self.write(addr + i, *b);
        }
    }
}

impl<T: Storage> Storage for &mut T {
    fn read(&self, addr: usize) -> u8 {
        T::read(self, addr)
    }

    fn write(&mut self, addr: usize, value: u8) {
        T::write(self, addr, value)
    }
}

/// Logical destinations for transaction operations, resolved to
/// storage ranges by [Slot::addr] and [Slot::capacity]
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum Slot {
    BalanceWord0 = 0x01,
    BalanceWord1 = 0x02,
    OwnerBytes = 0x03,
    OwnerLength = 0x04,
    RetryCounter = 0x05,
}

impl Slot {
    /// Storage address of the slot
    pub const fn addr(&self) -> usize {
        match self {
            Slot::BalanceWord0 => BALANCE_0,
            Slot::BalanceWord1 => BALANCE_1,
            Slot::OwnerBytes => OWNER,
            Slot::OwnerLength => OWNER_LEN,
            Slot::RetryCounter => RETRY_COUNTER,
        }
    }

    /// Maximum number of bytes the slot holds
    pub const fn capacity(&self) -> usize {
        match self {
            Slot::BalanceWord0 | Slot::BalanceWord1 => 4,
            Slot::OwnerBytes => OWNER_MAX_LEN,
            Slot::OwnerLength | Slot::RetryCounter => 1,
        }
    }
}

/// In-memory storage, used for host simulation and testing
#[derive(Clone, PartialEq, Debug)]
pub struct MemStorage {
    data: [u8; STORAGE_SIZE],
}

impl MemStorage {
    /// Create an erased storage instance
    pub const fn new() -> Self {
        Self {
            data: [ERASED; STORAGE_SIZE],
        }
    }

    /// Create a storage instance from an existing image,
    /// missing bytes are left erased
    pub fn from_image(image: &[u8]) -> Self {
        let mut s = Self::new();
        let n = image.len().min(STORAGE_SIZE);
        s.data[..n].copy_from_slice(&image[..n]);
        s
    }

    /// Fetch the raw storage image
    pub fn image(&self) -> &[u8; STORAGE_SIZE] {
        &self.data
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemStorage {
    fn read(&self, addr: usize) -> u8 {
        self.data[addr]
    }

    fn write(&mut self, addr: usize, value: u8) {
        self.data[addr] = value;
    }
}

/// Storage wrapper cutting power after a fixed number of writes.
///
/// Once the write budget is spent every further write is dropped, leaving
/// the inner storage exactly as a power loss at that point would.
#[derive(Clone, Debug)]
pub struct Tearing<S: Storage> {
    inner: S,
    remaining: usize,
    torn: bool,
}

impl<S: Storage> Tearing<S> {
    /// Wrap `inner`, allowing `writes` byte writes before power is cut
    pub fn new(inner: S, writes: usize) -> Self {
        Self {
            inner,
            remaining: writes,
            torn: false,
        }
    }

    /// Whether power has been cut (at least one write was dropped)
    pub fn is_torn(&self) -> bool {
        self.torn
    }

    /// Fetch the inner storage, ie. to power up again
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Storage> Storage for Tearing<S> {
    fn read(&self, addr: usize) -> u8 {
        self.inner.read(addr)
    }

    fn write(&mut self, addr: usize, value: u8) {
        if self.remaining == 0 {
            self.torn = true;
            return;
        }

        self.remaining -= 1;
        self.inner.write(addr, value);
    }
}
