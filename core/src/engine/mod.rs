// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides the electronic purse functionality.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.
//!
//! All persisted state lives in the provided [Storage], the engine itself
//! only holds the volatile session key and lock state, both of which are
//! lost on power down.

use strum::{Display, EnumIter};

use crate::{
    cipher::Key,
    consts::VERSION,
    storage::Storage,
    transaction,
};

pub mod auth;
pub mod balance;
pub mod owner;

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod error;
pub use error::Error;

/// Engine session state
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter)]
pub enum State {
    /// Initial state, key test required before purse operations
    Locked,
    /// Key test passed for the installed session key
    Unlocked,
    /// Retry budget exhausted, no further commands are accepted
    Blocked,
}

/// [Engine] provides hardware-independent support for purse operations
pub struct Engine<S: Storage> {
    state: State,
    key: Key,
    storage: S,
}

impl<S: Storage> Engine<S> {
    /// Create a new engine instance on power up.
    ///
    /// This replays any transaction interrupted by a prior power loss
    /// before reading persisted state.
    pub fn new(mut storage: S) -> Self {
        transaction::commit(&mut storage);

        let state = match auth::retries(&storage) {
            0 => State::Blocked,
            _ => State::Locked,
        };

        Self {
            state,
            key: Key::default(),
            storage,
        }
    }

    /// Handle incoming events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        if self.state == State::Blocked {
            return Err(Error::Blocked);
        }

        if evt.is_gated() && self.state != State::Unlocked {
            #[cfg(feature = "log")]
            log::warn!("rejected locked event");

            return Err(Error::Locked);
        }

        match evt {
            Event::GetVersion => return Ok(Output::Version { version: VERSION }),

            // A new key must pass a key test before use
            Event::InstallKey(key) => {
                self.key = key.clone();
                self.state = State::Locked;
            }

            Event::TestKey => {
                let r = auth::test_key(&mut self.storage, &self.key)?;

                self.state = match (r.valid, r.retries) {
                    (true, _) => State::Unlocked,
                    (false, 0) => State::Blocked,
                    (false, _) => State::Locked,
                };

                #[cfg(feature = "log")]
                log::info!("key test: {}", self.state);

                return Ok(Output::KeyTest {
                    valid: r.valid,
                    retries: r.retries,
                });
            }

            Event::WriteOwner(o) => owner::write(&mut self.storage, o)?,

            Event::ReadOwner => return owner::read(&self.storage).map(Output::Owner),

            Event::ReadBalance => {
                return Ok(Output::Balance(balance::read(&self.storage, &self.key)))
            }

            Event::Credit { amount } => {
                let _v = balance::credit(&mut self.storage, &self.key, *amount)?;

                #[cfg(feature = "log")]
                log::debug!("credit {}, balance {}", amount, _v);
            }

            Event::Debit { amount } => {
                let _v = balance::debit(&mut self.storage, &self.key, *amount)?;

                #[cfg(feature = "log")]
                log::debug!("debit {}, balance {}", amount, _v);
            }
        }

        Ok(Output::None)
    }

    /// Fetch the current session state
    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == State::Unlocked
    }

    pub fn is_blocked(&self) -> bool {
        self.state == State::Blocked
    }

    /// Remaining key test attempts
    pub fn retries(&self) -> u8 {
        auth::retries(&self.storage)
    }

    /// Stored owner identity length (`0` if unset)
    pub fn owner_len(&self) -> usize {
        owner::len(&self.storage)
    }

    /// Lock the session, the installed key must pass a new key test
    pub fn lock(&mut self) {
        if self.state == State::Unlocked {
            self.state = State::Locked;
        }
    }

    /// Access the underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Power down, returning the underlying storage
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        provision::{factory, FACTORY_KEY},
        storage::MemStorage,
    };

    fn factory_engine() -> Engine<MemStorage> {
        let mut s = MemStorage::new();
        factory(&mut s).unwrap();
        Engine::new(s)
    }

    #[test]
    fn starts_locked() {
        let mut e = factory_engine();
        assert_eq!(e.state(), State::Locked);

        assert_eq!(e.update(&Event::ReadBalance), Err(Error::Locked));
        assert_eq!(e.update(&Event::Credit { amount: 1 }), Err(Error::Locked));
        assert_eq!(
            e.update(&Event::GetVersion),
            Ok(Output::Version { version: "1.00" })
        );
    }

    #[test]
    fn unlock_with_factory_key() {
        let mut e = factory_engine();

        e.update(&Event::InstallKey(Key::from_bytes(&FACTORY_KEY)))
            .unwrap();
        assert_eq!(
            e.update(&Event::TestKey),
            Ok(Output::KeyTest {
                valid: true,
                retries: 3
            })
        );
        assert!(e.is_unlocked());
        assert_eq!(e.update(&Event::ReadBalance), Ok(Output::Balance(100)));

        // Installing a new key relocks the session
        e.update(&Event::InstallKey(Key::default())).unwrap();
        assert_eq!(e.state(), State::Locked);
        assert_eq!(e.update(&Event::ReadBalance), Err(Error::Locked));
    }

    #[test]
    fn blocks_after_retries() {
        let mut e = factory_engine();

        for n in [2, 1, 0] {
            assert_eq!(
                e.update(&Event::TestKey),
                Ok(Output::KeyTest {
                    valid: false,
                    retries: n
                })
            );
        }

        assert!(e.is_blocked());
        assert_eq!(e.update(&Event::GetVersion), Err(Error::Blocked));

        // Persisted across power cycles
        let e = Engine::new(e.into_storage());
        assert!(e.is_blocked());
    }

    #[test]
    fn lock_requires_key_test() {
        let mut e = factory_engine();

        e.update(&Event::InstallKey(Key::from_bytes(&FACTORY_KEY)))
            .unwrap();
        e.update(&Event::TestKey).unwrap();
        e.lock();

        assert_eq!(e.state(), State::Locked);
        assert_eq!(e.update(&Event::ReadBalance), Err(Error::Locked));

        // Installed key is retained
        assert_eq!(
            e.update(&Event::TestKey),
            Ok(Output::KeyTest {
                valid: true,
                retries: 3
            })
        );
        assert!(e.is_unlocked());
    }
}
