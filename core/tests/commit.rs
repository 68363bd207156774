//! Power loss injection for transactional updates

use bourse_core::{
    cipher::Key,
    engine::{auth, balance, owner},
    provision::FACTORY_KEY,
    storage::{MemStorage, Slot, Tearing},
    transaction::{commit, execute, pending, stage, Operation, PendingState},
};

mod helpers;
use helpers::*;

/// Count byte writes for an uninterrupted run of `f`
fn count_writes<F: Fn(&mut Tearing<MemStorage>)>(image: &MemStorage, f: F) -> usize {
    (0..)
        .find(|n| !with_tearing(image, *n, &f).1)
        .unwrap()
}

/// Interrupt `f` at every write and check recovery always lands on
/// either the prior image or the completed one
fn check_atomic<F>(image: &MemStorage, f: F)
where
    F: Fn(&mut Tearing<MemStorage>),
{
    let (complete, _) = with_tearing(image, usize::MAX, &f);
    let before = recover(image.clone());

    let total = count_writes(image, &f);
    assert!(total > 0);

    for n in 0..total {
        let (torn, was_torn) = with_tearing(image, n, &f);
        assert!(was_torn);

        let recovered = recover(torn);
        assert!(
            persisted(&recovered) == persisted(&complete)
                || persisted(&recovered) == persisted(&before),
            "recovery after {n} of {total} writes left a partial update"
        );
        assert_eq!(pending(&recovered), PendingState::Empty);
    }
}

#[test]
fn credit_is_atomic() {
    setup_logging();

    let key = Key::from_bytes(&FACTORY_KEY);
    check_atomic(&factory_card(), |s| {
        balance::credit(s, &key, 50).unwrap();
    });
}

#[test]
fn owner_write_is_atomic() {
    setup_logging();

    let mut image = factory_card();
    owner::write(&mut image, b"Alice").unwrap();

    check_atomic(&image, |s| {
        owner::write(s, b"Bartholomew Smith").unwrap();
    });
}

#[test]
fn key_test_counter_is_atomic() {
    setup_logging();

    check_atomic(&factory_card(), |s| {
        auth::test_key(s, &Key::default()).unwrap();
    });
}

#[test]
fn staged_transaction_completes_on_recovery() {
    setup_logging();

    let key = Key::from_bytes(&FACTORY_KEY);
    let image = factory_card();

    let (complete, _) = with_tearing(&image, usize::MAX, |s| {
        balance::credit(s, &key, 50).unwrap();
    });

    // Cut power during commit, after staging has completed
    let [c0, c1] = balance::encode(150, &key);
    let (w0, w1) = (c0.to_le_bytes(), c1.to_le_bytes());
    let ops = [
        Operation::new(Slot::BalanceWord0, &w0),
        Operation::new(Slot::BalanceWord1, &w1),
    ];

    let mut staged = image.clone();
    stage(&mut staged, &ops).unwrap();
    assert_eq!(pending(&staged), PendingState::Full);

    for n in 0..=8 {
        let (torn, _) = with_tearing(&staged, n, |s| {
            commit(s);
        });

        let recovered = recover(torn);
        assert_eq!(
            persisted(&recovered),
            persisted(&complete),
            "commit interrupted after {n} writes"
        );
        assert_eq!(balance::read(&recovered, &key), 150);
    }
}

#[test]
fn interrupted_recovery_is_replayed() {
    setup_logging();

    let key = Key::from_bytes(&FACTORY_KEY);
    let image = factory_card();

    let (complete, _) = with_tearing(&image, usize::MAX, |s| {
        balance::debit(s, &key, 30).unwrap();
    });

    // Stop after staging (state, payload, slots, lengths, count, state)
    // plus part of the commit
    let staged_writes = 1 + 8 + 2 + 2 + 1 + 1;
    let (torn, _) = with_tearing(&image, staged_writes + 3, |s| {
        balance::debit(s, &key, 30).unwrap();
    });

    // First recovery is itself interrupted
    let (torn, was_torn) = with_tearing(&torn, 2, |s| {
        commit(s);
    });
    assert!(was_torn);

    assert_eq!(persisted(&recover(torn)), persisted(&complete));
}

#[test]
fn commit_without_pending_writes_nothing() {
    let mut t = Tearing::new(factory_card(), 0);

    assert_eq!(commit(&mut t), 0);
    assert!(!t.is_torn());
}

#[test]
fn execute_leaves_nothing_pending() {
    let mut s = factory_card();

    execute(
        &mut s,
        &[Operation::new(Slot::RetryCounter, &[2])],
    )
    .unwrap();

    assert_eq!(pending(&s), PendingState::Empty);
    assert_eq!(auth::retries(&s), 2);
}
