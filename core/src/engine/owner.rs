// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Owner identity store

use heapless::Vec;

use super::Error;
use crate::{
    apdu::OWNER_MAX_LEN,
    storage::{Slot, Storage, OWNER, OWNER_LEN},
    transaction::{execute, Operation},
};

/// Stored identity length, `0` when unset (or when the length
/// byte is out of range)
pub fn len<S: Storage>(storage: &S) -> usize {
    match storage.read(OWNER_LEN) as usize {
        n if n <= OWNER_MAX_LEN => n,
        _ => 0,
    }
}

/// Read the stored identity
pub fn read<S: Storage>(storage: &S) -> Result<Vec<u8, OWNER_MAX_LEN>, Error> {
    let n = len(storage);
    if n == 0 {
        return Err(Error::OwnerUnset);
    }

    let mut b = [0u8; OWNER_MAX_LEN];
    storage.read_into(OWNER, &mut b[..n]);

    Vec::from_slice(&b[..n]).map_err(|_| Error::InvalidLength)
}

/// Write the identity, an empty identity clears the stored owner
pub fn write<S: Storage>(storage: &mut S, owner: &[u8]) -> Result<(), Error> {
    if owner.len() > OWNER_MAX_LEN {
        return Err(Error::InvalidLength);
    }

    let n = [owner.len() as u8];

    match owner.is_empty() {
        true => execute(storage, &[Operation::new(Slot::OwnerLength, &n)]),
        false => execute(
            storage,
            &[
                Operation::new(Slot::OwnerBytes, owner),
                Operation::new(Slot::OwnerLength, &n),
            ],
        ),
    }
}
