// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Card personalisation
//!
//! Writes a complete fresh image: no pending transaction, no owner,
//! an encrypted opening balance and a full retry budget.

use crate::{
    apdu::KEY_LEN,
    cipher::Key,
    engine::{auth::RETRY_LIMIT, balance, Error},
    storage::{Storage, OWNER_LEN, PENDING_STATE, RETRY_COUNTER},
    transaction::PendingState,
};

/// Reference key for factory cards
pub const FACTORY_KEY: [u8; KEY_LEN] = [
    0x54, 0xba, 0x93, 0x54, 0xd5, 0x67, 0x6c, 0xe6, 0x4c, 0xa7, 0xcf, 0x93, 0x83, 0x71, 0xb9, 0x30,
];

/// Opening balance for factory cards
pub const FACTORY_BALANCE: u16 = 100;

/// Personalise a card with the provided key and opening balance.
///
/// This writes storage directly and is not power-loss safe,
/// personalisation is expected to run before the card is issued.
pub fn personalise<S: Storage>(storage: &mut S, key: &Key, balance: u16) -> Result<(), Error> {
    #[cfg(feature = "log")]
    log::info!("personalising card, balance {}", balance);

    storage.write(PENDING_STATE, PendingState::Empty as u8);
    storage.write(OWNER_LEN, 0);
    storage.write(RETRY_COUNTER, RETRY_LIMIT);

    balance::store(storage, key, balance)
}

/// Write the factory image
pub fn factory<S: Storage>(storage: &mut S) -> Result<(), Error> {
    personalise(storage, &Key::from_bytes(&FACTORY_KEY), FACTORY_BALANCE)
}
