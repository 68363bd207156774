// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line simulator for the electronic purse card
//!
//! Each invocation powers up the card on the stored image, runs a single
//! command through the loopback terminal and writes the image back.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, warn, LevelFilter};

use bourse_core::{
    cipher::Key,
    loopback::Terminal,
    provision::personalise,
    storage::{Storage, Tearing},
};
use bourse_sim::{describe, FileStorage, HexData};

/// Electronic purse card simulator
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Card EEPROM image file
    #[clap(long, env = "BOURSE_IMAGE", default_value = "bourse.img")]
    image: PathBuf,

    /// Session key (hex encoded)
    #[clap(long, env = "BOURSE_KEY", default_value = "54ba9354d5676ce64ca7cf938371b930")]
    key: HexData,

    /// Cut power after N non-volatile writes
    #[clap(long)]
    tear_after: Option<usize>,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Log level
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
enum Actions {
    /// Personalise a new card image with the session key
    Init {
        /// Opening balance
        #[clap(long, default_value = "100")]
        balance: u16,
    },

    /// Fetch the applet version
    Version,

    /// Test the session key
    TestKey,

    /// Read the balance
    Balance,

    /// Credit the purse
    Credit { amount: u16 },

    /// Debit the purse
    Debit { amount: u16 },

    /// Set the owner identity (empty to clear)
    SetOwner { name: String },

    /// Read the owner identity
    Owner,

    /// Show the persisted card state
    Dump,
}

impl Actions {
    /// Whether the action requires an unlocked session
    fn is_purse(&self) -> bool {
        matches!(
            self,
            Actions::Balance
                | Actions::Credit { .. }
                | Actions::Debit { .. }
                | Actions::SetOwner { .. }
                | Actions::Owner
        )
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    match &args.cmd {
        Actions::Init { balance } => {
            let mut s = FileStorage::create(&args.image);
            personalise(&mut s, &Key::from_bytes(args.key.as_ref()), *balance)?;
            s.save()?;

            info!("created {} with balance {}", args.image.display(), balance);
        }
        Actions::Dump => {
            let s = FileStorage::open(&args.image)?;
            println!("{}", describe(&s));
        }
        _ => session(&args)?,
    }

    Ok(())
}

/// Run a single power cycle, saving the image whatever the outcome
fn session(args: &Options) -> anyhow::Result<()> {
    let s = FileStorage::open(&args.image)?;
    let s = Tearing::new(s, args.tear_after.unwrap_or(usize::MAX));

    let mut t = Terminal::connect(s)?;
    let r = execute(&mut t, args);

    let s = t.into_storage();
    if s.is_torn() {
        warn!("power cut after {} write(s)", args.tear_after.unwrap_or_default());
    }
    s.into_inner().save()?;

    r
}

fn execute<S: Storage>(t: &mut Terminal<S>, args: &Options) -> anyhow::Result<()> {
    if args.cmd.is_purse() {
        let r = t.unlock(args.key.as_ref())?;
        if !r.valid {
            return Err(anyhow::anyhow!(
                "key rejected, {} attempt(s) remaining",
                r.retries
            ));
        }
        debug!("session unlocked");
    }

    match &args.cmd {
        Actions::Version => println!("{}", t.version()?),
        Actions::TestKey => {
            t.install_key(args.key.as_ref())?;
            let r = t.test_key()?;
            println!("valid: {}, retries: {}", r.valid, r.retries);
        }
        Actions::Balance => println!("{}", t.balance()?),
        Actions::Credit { amount } => {
            t.credit(*amount)?;
            println!("{}", t.balance()?);
        }
        Actions::Debit { amount } => {
            t.debit(*amount)?;
            println!("{}", t.balance()?);
        }
        Actions::SetOwner { name } => t.set_owner(name.as_bytes())?,
        Actions::Owner => match t.owner()? {
            Some(o) => println!("{}", String::from_utf8_lossy(&o)),
            None => println!("(unset)"),
        },
        // Handled without a session
        Actions::Init { .. } | Actions::Dump => (),
    }

    Ok(())
}
