//! Image file persistence across simulated power cycles

use std::path::PathBuf;

use bourse_core::{
    cipher::Key,
    loopback::Terminal,
    provision::{factory, FACTORY_KEY},
    storage::{Storage, Tearing, STORAGE_SIZE},
};
use bourse_sim::{describe, FileStorage, SimError};

fn temp_image() -> PathBuf {
    std::env::temp_dir().join(format!("bourse-{:016x}.img", rand::random::<u64>()))
}

#[test]
fn image_persists_sessions() -> anyhow::Result<()> {
    let path = temp_image();

    let mut s = FileStorage::create(&path);
    factory(&mut s)?;
    s.save()?;

    // First session credits the purse
    let mut t = Terminal::connect(FileStorage::open(&path)?)?;
    t.unlock(&FACTORY_KEY)?;
    t.credit(20)?;
    t.set_owner(b"Alice")?;
    t.into_storage().save()?;

    // Second session sees the update
    let mut t = Terminal::connect(FileStorage::open(&path)?)?;
    t.unlock(&FACTORY_KEY)?;
    assert_eq!(t.balance()?, 120);
    assert_eq!(t.owner()?, Some(b"Alice".to_vec()));

    let d = describe(t.applet().engine().storage());
    assert!(d.contains("\"Alice\""), "{d}");
    assert!(d.contains("retries:  3"), "{d}");
    assert_eq!(d.lines().count(), 4, "{d}");
    assert!(d.starts_with("pending:  empty (00), "), "{d}");

    std::fs::remove_file(&path)?;

    Ok(())
}

#[test]
fn torn_image_is_repaired_on_open() -> anyhow::Result<()> {
    let path = temp_image();

    let mut s = FileStorage::create(&path);
    factory(&mut s)?;
    s.save()?;

    // Cut power after the key test (8 writes) and staging (15 writes)
    let mut t = Terminal::connect(Tearing::new(FileStorage::open(&path)?, 8 + 15))?;
    t.unlock(&FACTORY_KEY)?;
    t.debit(40).ok();

    let torn = t.into_storage();
    assert!(torn.is_torn());
    torn.into_inner().save()?;

    assert!(describe(&FileStorage::open(&path)?).contains("pending:  full"));

    let mut t = Terminal::connect(FileStorage::open(&path)?)?;
    t.unlock(&FACTORY_KEY)?;
    assert_eq!(t.balance()?, 60);

    std::fs::remove_file(&path)?;

    Ok(())
}

#[test]
fn rejects_truncated_image() -> anyhow::Result<()> {
    let path = temp_image();
    std::fs::write(&path, [0u8; STORAGE_SIZE - 1])?;

    let r = FileStorage::open(&path);
    assert!(matches!(
        r,
        Err(SimError::ImageSize {
            expected: STORAGE_SIZE,
            ..
        })
    ));

    std::fs::remove_file(&path)?;

    Ok(())
}

#[test]
fn personalised_key_is_required() -> anyhow::Result<()> {
    let path = temp_image();
    let key: [u8; 16] = rand::random();

    let mut s = FileStorage::create(&path);
    bourse_core::provision::personalise(&mut s, &Key::from_bytes(&key), 500)?;

    let mut t = Terminal::connect(s)?;
    assert!(!t.unlock(&FACTORY_KEY)?.valid);
    assert!(t.unlock(&key)?.valid);
    assert_eq!(t.balance()?, 500);

    let s = t.into_storage();
    assert_eq!(s.read(0), 0);

    Ok(())
}
