#![allow(unused)]

use log::{debug, LevelFilter};

use bourse_core::{
    cipher::Key,
    engine::Engine,
    loopback::Terminal,
    provision::{factory, personalise, FACTORY_KEY},
    storage::{MemStorage, Storage, Tearing, OWNER},
};

/// Setup test logging
pub fn setup_logging() {
    let _ = simplelog::SimpleLogger::init(LevelFilter::Debug, Default::default());
}

/// Fresh factory card image
pub fn factory_card() -> MemStorage {
    let mut s = MemStorage::new();
    factory(&mut s).unwrap();
    s
}

/// Card personalised with a random key and the provided balance
pub fn random_card(balance: u16) -> (MemStorage, [u8; 16]) {
    let key: [u8; 16] = rand::random();

    let mut s = MemStorage::new();
    personalise(&mut s, &Key::from_bytes(&key), balance).unwrap();

    (s, key)
}

/// Connect to a factory card and unlock it
pub fn unlocked_terminal() -> Terminal<MemStorage> {
    let mut t = Terminal::connect(factory_card()).unwrap();

    let r = t.unlock(&FACTORY_KEY).unwrap();
    assert!(r.valid);

    t
}

/// Run `f` on `image` with power cut after `writes` byte writes,
/// returning the resulting image and whether power was cut
pub fn with_tearing<F>(image: &MemStorage, writes: usize, f: F) -> (MemStorage, bool)
where
    F: FnOnce(&mut Tearing<MemStorage>),
{
    let mut t = Tearing::new(image.clone(), writes);
    f(&mut t);

    let torn = t.is_torn();
    debug!("writes: {writes}, torn: {torn}");

    (t.into_inner(), torn)
}

/// Power up an engine on `image` (running recovery) and return the
/// recovered image
pub fn recover(image: MemStorage) -> MemStorage {
    Engine::new(image).into_storage()
}

/// Persisted state outside the pending transaction area
pub fn persisted(image: &MemStorage) -> &[u8] {
    &image.image()[OWNER..]
}
