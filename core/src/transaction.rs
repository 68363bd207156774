// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Atomic multi-destination writes to non-volatile [Storage]
//!
//! Updates spanning more than one byte are performed in two phases:
//!
//! 1. [stage] records every [Operation] (source bytes and destination [Slot])
//!    in the single pending transaction area, then marks it [PendingState::Full].
//!    No destination is touched.
//! 2. [commit] copies each staged operation to its destination byte by byte,
//!    then marks the area [PendingState::Empty].
//!
//! Both state markers are single byte writes, so a power loss either leaves
//! the prior state untouched (before `Full`) or leaves a complete record that
//! [commit] replays from the start on the next power up. Replaying copies the
//! same bytes to the same addresses, so interrupting a replay is also safe.
//!
//! There is exactly one pending transaction area, staging discards whatever
//! an unfinished transaction left behind. This relies on commands being
//! processed strictly one at a time with recovery run before the first.

use num_enum::TryFromPrimitive;

use crate::{
    engine::Error,
    storage::{
        Slot, Storage, PENDING_COUNT, PENDING_LENGTHS, PENDING_PAYLOAD, PENDING_SLOTS,
        PENDING_STATE,
    },
};

/// Maximum number of operations per transaction
pub const MAX_OPS: usize = 3;

/// Maximum total payload across all operations
pub const MAX_PAYLOAD: usize = 64;

/// Pending transaction state.
///
/// `Full` is a sentinel rather than `1` to reduce the chance of erased or
/// uninitialised memory reading as a staged transaction.
#[derive(Copy, Clone, PartialEq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum PendingState {
    Empty = 0x00,
    Full = 0x1c,
}

/// A single staged write
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Operation<'a> {
    /// Destination slot
    pub dst: Slot,
    /// Bytes to be written to the start of the slot
    pub src: &'a [u8],
}

impl<'a> Operation<'a> {
    pub const fn new(dst: Slot, src: &'a [u8]) -> Self {
        Self { dst, src }
    }
}

/// Read the pending transaction state, anything other than
/// [PendingState::Full] is treated as empty
pub fn pending<S: Storage>(storage: &S) -> PendingState {
    match PendingState::try_from(storage.read(PENDING_STATE)) {
        Ok(PendingState::Full) => PendingState::Full,
        _ => PendingState::Empty,
    }
}

/// Check a set of operations fits the pending transaction area
pub fn validate(ops: &[Operation]) -> Result<(), Error> {
    if ops.len() > MAX_OPS {
        return Err(Error::TooManyOperations);
    }

    if ops.iter().any(|o| o.src.len() > o.dst.capacity()) {
        return Err(Error::SlotOverflow);
    }

    let total: usize = ops.iter().map(|o| o.src.len()).sum();
    if total > MAX_PAYLOAD {
        return Err(Error::TransactionTooLarge);
    }

    Ok(())
}

/// Stage a set of operations, replacing any pending transaction.
///
/// Operations are validated up front, on error storage is left untouched.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn stage<S: Storage>(storage: &mut S, ops: &[Operation]) -> Result<(), Error> {
    validate(ops)?;

    #[cfg(feature = "log")]
    log::debug!("staging {} operation(s)", ops.len());

    // Invalidate any prior transaction before overwriting its record
    storage.write(PENDING_STATE, PendingState::Empty as u8);

    let mut offset = PENDING_PAYLOAD;
    for (i, op) in ops.iter().enumerate() {
        storage.write_from(offset, op.src);
        offset += op.src.len();

        storage.write(PENDING_SLOTS + i, op.dst as u8);
        storage.write(PENDING_LENGTHS + i, op.src.len() as u8);
    }
    storage.write(PENDING_COUNT, ops.len() as u8);

    // Engage the transaction
    storage.write(PENDING_STATE, PendingState::Full as u8);

    Ok(())
}

/// Apply a staged transaction to its destinations, returning the
/// number of bytes copied.
///
/// A no-op when nothing is staged. Also used for recovery on power up,
/// where a transaction interrupted at any point is replayed from the start.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn commit<S: Storage>(storage: &mut S) -> usize {
    if pending(storage) != PendingState::Full {
        return 0;
    }

    let count = (storage.read(PENDING_COUNT) as usize).min(MAX_OPS);

    #[cfg(feature = "log")]
    log::debug!("committing {} operation(s)", count);

    let mut src = PENDING_PAYLOAD;
    let mut copied = 0;

    for i in 0..count {
        let len = storage.read(PENDING_LENGTHS + i) as usize;
        let slot = storage.read(PENDING_SLOTS + i);

        // Records are only marked full once complete, a bad entry
        // means the area was never written by `stage`
        let dst = match Slot::try_from(slot) {
            Ok(s) if len <= s.capacity() && src + len <= PENDING_PAYLOAD + MAX_PAYLOAD => s,
            _ => {
                #[cfg(feature = "log")]
                log::error!("invalid pending operation {}: slot {:02x} len {}", i, slot, len);
                break;
            }
        };

        for j in 0..len {
            let b = storage.read(src + j);
            storage.write(dst.addr() + j, b);
        }

        src += len;
        copied += len;
    }

    storage.write(PENDING_STATE, PendingState::Empty as u8);

    copied
}

/// Stage and commit a set of operations
pub fn execute<S: Storage>(storage: &mut S, ops: &[Operation]) -> Result<(), Error> {
    stage(storage, ops)?;
    commit(storage);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::{MemStorage, Tearing, BALANCE_0, BALANCE_1, OWNER, RETRY_COUNTER};

    #[test]
    fn stage_leaves_destinations_untouched() {
        let mut s = MemStorage::new();

        stage(
            &mut s,
            &[
                Operation::new(Slot::BalanceWord0, &[1, 2, 3, 4]),
                Operation::new(Slot::RetryCounter, &[3]),
            ],
        )
        .unwrap();

        assert_eq!(pending(&s), PendingState::Full);
        assert_eq!(&s.image()[BALANCE_0..][..4], &[0xff; 4]);
        assert_eq!(s.image()[RETRY_COUNTER], 0xff);

        assert_eq!(commit(&mut s), 5);

        assert_eq!(pending(&s), PendingState::Empty);
        assert_eq!(&s.image()[BALANCE_0..][..4], &[1, 2, 3, 4]);
        assert_eq!(s.image()[RETRY_COUNTER], 3);
    }

    #[test]
    fn commit_when_empty_writes_nothing() {
        let mut s = MemStorage::new();
        s.write(PENDING_STATE, PendingState::Empty as u8);

        // Zero write budget, any write would tear
        let mut t = Tearing::new(s, 0);
        assert_eq!(commit(&mut t), 0);
        assert!(!t.is_torn());
    }

    #[test]
    fn erased_memory_is_not_pending() {
        assert_eq!(pending(&MemStorage::new()), PendingState::Empty);
    }

    #[test]
    fn validate_limits() {
        let b = [0u8; 20];

        assert_eq!(
            validate(&[Operation::new(Slot::RetryCounter, &[1]); MAX_OPS + 1]),
            Err(Error::TooManyOperations)
        );
        assert_eq!(
            validate(&[Operation::new(Slot::BalanceWord0, &b[..5])]),
            Err(Error::SlotOverflow)
        );
        assert_eq!(
            validate(&[
                Operation::new(Slot::OwnerBytes, &b),
                Operation::new(Slot::OwnerBytes, &b),
                Operation::new(Slot::OwnerBytes, &b),
            ]),
            Ok(())
        );
    }

    #[test]
    fn invalid_stage_leaves_storage_untouched() {
        let mut s = MemStorage::new();
        let before = s.clone();

        let r = stage(&mut s, &[Operation::new(Slot::OwnerLength, &[1, 2])]);

        assert_eq!(r, Err(Error::SlotOverflow));
        assert_eq!(s, before);
    }

    #[test]
    fn new_stage_discards_unfinished_transaction() {
        let mut s = MemStorage::new();

        stage(&mut s, &[Operation::new(Slot::BalanceWord1, &[9, 9, 9, 9])]).unwrap();
        stage(&mut s, &[Operation::new(Slot::OwnerBytes, &[7])]).unwrap();
        commit(&mut s);

        assert_eq!(&s.image()[BALANCE_1..][..4], &[0xff; 4]);
        assert_eq!(s.image()[OWNER], 7);
    }
}
