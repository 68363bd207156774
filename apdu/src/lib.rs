// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for electronic purse ("bourse") card communication
//!
//! Commands follow the classic contact card framing: a five byte header
//! (`CLA INS P1 P2 P3`, see [CommandHeader]) where `P3` declares the payload
//! length, a procedure byte (the echoed instruction) acknowledging the header,
//! the payload itself (flowing in or out depending on the command) and a
//! two byte [StatusWord].
//!
//! Payload encodings are fixed-size and byte oriented to keep card side parsing
//! trivial. Multi-byte integers on the wire (amounts, balances) are big-endian,
//! matching the ordering terminals already use for status words.
//!
//! Two instruction classes are defined:
//!
//! - [BOURSE_ADMIN_CLA] for [AdminInstruction]s, always available
//! - [BOURSE_PURSE_CLA] for [PurseInstruction]s, only available once the
//!   session has been unlocked by a successful key test
//!

#![no_std]

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

pub use ledger_proto::{ApduError, ApduStatic};

pub mod balance;
pub mod header;
pub mod key;
pub mod owner;
pub mod prelude;
pub mod status;
pub mod version;

mod helpers;

pub use header::{Command, CommandHeader, Direction, Length};
pub use status::StatusWord;

/// Administrative APDU class (version, key management)
pub const BOURSE_ADMIN_CLA: u8 = 0x80;

/// Purse APDU class (identity and balance operations)
pub const BOURSE_PURSE_CLA: u8 = 0x81;

/// Maximum owner identity length in bytes
pub const OWNER_MAX_LEN: usize = 20;

/// Session key length in bytes
pub const KEY_LEN: usize = 16;

/// Administrative instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum AdminInstruction {
    /// Fetch the applet version string
    GetVersion = 0x00,

    /// Install the session key (volatile, lost on reset)
    InstallKey = 0x01,

    /// Test the installed session key against the stored balance
    TestKey = 0x02,
}

/// Purse instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum PurseInstruction {
    /// Write the owner identity
    WriteOwner = 0x02,

    /// Read the owner identity
    ReadOwner = 0x03,

    /// Read the current balance
    ReadBalance = 0x04,

    /// Credit the purse
    Credit = 0x05,

    /// Debit the purse
    Debit = 0x06,
}
