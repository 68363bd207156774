// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Key test and retry counter
//!
//! A candidate key is accepted when the stored balance decrypts to the
//! redundancy pattern. Each failure spends one attempt from a persisted
//! budget of [RETRY_LIMIT], a success restores it. Once the budget is
//! spent the card is blocked for good.

use super::{balance, Error};
use crate::{
    cipher::Key,
    storage::{Slot, Storage, RETRY_COUNTER},
    transaction::{execute, Operation},
};

/// Retry budget restored by a successful key test
pub const RETRY_LIMIT: u8 = 3;

/// Key test result
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct KeyTest {
    /// Candidate key matches the stored balance
    pub valid: bool,
    /// Remaining attempts after this test
    pub retries: u8,
}

/// Read the persisted retry counter, values outside the budget
/// (ie. erased memory) read as [RETRY_LIMIT]
pub fn retries<S: Storage>(storage: &S) -> u8 {
    storage.read(RETRY_COUNTER).min(RETRY_LIMIT)
}

/// Test a candidate key, updating the retry counter
#[cfg_attr(feature = "noinline", inline(never))]
pub fn test_key<S: Storage>(storage: &mut S, key: &Key) -> Result<KeyTest, Error> {
    let valid = balance::is_redundant(&balance::decrypt(storage, key));

    let retries = match valid {
        true => RETRY_LIMIT,
        false => retries(storage).saturating_sub(1),
    };

    execute(storage, &[Operation::new(Slot::RetryCounter, &[retries])])?;

    #[cfg(feature = "log")]
    log::debug!("key test valid: {}, retries: {}", valid, retries);

    Ok(KeyTest { valid, retries })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::MemStorage;

    #[test]
    fn erased_counter_reads_full() {
        assert_eq!(retries(&MemStorage::new()), RETRY_LIMIT);
    }

    #[test]
    fn counter_floors_at_zero() {
        let mut s = MemStorage::new();
        let good = Key::new([5, 6, 7, 8]);
        let bad = Key::new([8, 7, 6, 5]);

        balance::store(&mut s, &good, 42).unwrap();

        for n in (0..RETRY_LIMIT).rev() {
            let r = test_key(&mut s, &bad).unwrap();
            assert_eq!(r, KeyTest { valid: false, retries: n });
        }

        let r = test_key(&mut s, &bad).unwrap();
        assert_eq!(r.retries, 0);
        assert_eq!(retries(&s), 0);
    }

    #[test]
    fn success_restores_budget() {
        let mut s = MemStorage::new();
        let good = Key::new([5, 6, 7, 8]);

        balance::store(&mut s, &good, 42).unwrap();
        test_key(&mut s, &Key::default()).unwrap();
        assert_eq!(retries(&s), RETRY_LIMIT - 1);

        let r = test_key(&mut s, &good).unwrap();
        assert_eq!(r, KeyTest { valid: true, retries: RETRY_LIMIT });
        assert_eq!(retries(&s), RETRY_LIMIT);
    }
}
