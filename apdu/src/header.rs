// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command header and instruction routing
//!

use encdec::{Decode, Encode};
use strum::{Display, EnumIter};

use crate::{
    AdminInstruction, ApduError, PurseInstruction, StatusWord, BOURSE_ADMIN_CLA,
    BOURSE_PURSE_CLA, KEY_LEN, OWNER_MAX_LEN,
};

/// Command header, sent by the terminal ahead of every command
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      CLA      |      INS      |      P1       |      P2       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      P3       |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct CommandHeader {
    /// Instruction class
    pub cla: u8,
    /// Instruction code
    pub ins: u8,
    /// Parameter 1 (unused by this applet)
    pub p1: u8,
    /// Parameter 2 (unused by this applet)
    pub p2: u8,
    /// Declared payload length
    pub p3: u8,
}

impl CommandHeader {
    /// Encoded header length
    pub const LEN: usize = 5;

    /// Create a new command header
    pub const fn new(cla: u8, ins: u8, p3: u8) -> Self {
        Self {
            cla,
            ins,
            p1: 0,
            p2: 0,
            p3,
        }
    }

    /// Resolve the header to a [Command], returning the matching
    /// status word for unknown classes or instructions
    pub fn command(&self) -> Result<Command, StatusWord> {
        match self.cla {
            BOURSE_ADMIN_CLA => AdminInstruction::try_from(self.ins)
                .map(Command::from)
                .map_err(|_| StatusWord::UNKNOWN_INS),
            BOURSE_PURSE_CLA => PurseInstruction::try_from(self.ins)
                .map(Command::from)
                .map_err(|_| StatusWord::UNKNOWN_INS),
            _ => Err(StatusWord::UNKNOWN_CLA),
        }
    }
}

/// Commands supported by the applet, decoded from a [CommandHeader]
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter)]
pub enum Command {
    GetVersion,
    InstallKey,
    TestKey,
    WriteOwner,
    ReadOwner,
    ReadBalance,
    Credit,
    Debit,
}

/// Payload direction for a command
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Direction {
    /// Terminal sends `P3` bytes to the card
    In,
    /// Card sends `P3` bytes to the terminal
    Out,
}

/// Expected `P3` for a command
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Length {
    /// `P3` must equal this value
    Exact(u8),
    /// `P3` must not exceed this value
    AtMost(u8),
    /// `P3` must equal a length held by the card
    Stored,
}

impl Length {
    /// Check a declared `P3` against a fixed expectation,
    /// returning the wrong length status on mismatch.
    ///
    /// [Length::Stored] must be resolved by the card and always passes here.
    pub fn check(&self, p3: u8) -> Result<(), StatusWord> {
        match *self {
            Length::Exact(n) if p3 != n => Err(StatusWord::wrong_length(n)),
            Length::AtMost(n) if p3 > n => Err(StatusWord::wrong_length(n)),
            _ => Ok(()),
        }
    }
}

impl Command {
    /// Instruction class for the command
    pub const fn cla(&self) -> u8 {
        match self {
            Command::GetVersion | Command::InstallKey | Command::TestKey => BOURSE_ADMIN_CLA,
            _ => BOURSE_PURSE_CLA,
        }
    }

    /// Instruction code for the command
    pub const fn ins(&self) -> u8 {
        match self {
            Command::GetVersion => AdminInstruction::GetVersion as u8,
            Command::InstallKey => AdminInstruction::InstallKey as u8,
            Command::TestKey => AdminInstruction::TestKey as u8,
            Command::WriteOwner => PurseInstruction::WriteOwner as u8,
            Command::ReadOwner => PurseInstruction::ReadOwner as u8,
            Command::ReadBalance => PurseInstruction::ReadBalance as u8,
            Command::Credit => PurseInstruction::Credit as u8,
            Command::Debit => PurseInstruction::Debit as u8,
        }
    }

    /// Direction of the command payload
    pub const fn direction(&self) -> Direction {
        match self {
            Command::InstallKey | Command::WriteOwner | Command::Credit | Command::Debit => {
                Direction::In
            }
            _ => Direction::Out,
        }
    }

    /// Expected `P3` for the command
    pub const fn length(&self) -> Length {
        match self {
            Command::GetVersion => Length::Exact(4),
            Command::InstallKey => Length::Exact(KEY_LEN as u8),
            Command::TestKey => Length::Exact(2),
            Command::WriteOwner => Length::AtMost(OWNER_MAX_LEN as u8),
            Command::ReadOwner => Length::Stored,
            Command::ReadBalance | Command::Credit | Command::Debit => Length::Exact(2),
        }
    }

    /// Build a header for this command with the provided `P3`
    pub const fn header(&self, p3: u8) -> CommandHeader {
        CommandHeader::new(self.cla(), self.ins(), p3)
    }
}

impl From<AdminInstruction> for Command {
    fn from(ins: AdminInstruction) -> Self {
        match ins {
            AdminInstruction::GetVersion => Command::GetVersion,
            AdminInstruction::InstallKey => Command::InstallKey,
            AdminInstruction::TestKey => Command::TestKey,
        }
    }
}

impl From<PurseInstruction> for Command {
    fn from(ins: PurseInstruction) -> Self {
        match ins {
            PurseInstruction::WriteOwner => Command::WriteOwner,
            PurseInstruction::ReadOwner => Command::ReadOwner,
            PurseInstruction::ReadBalance => Command::ReadBalance,
            PurseInstruction::Credit => Command::Credit,
            PurseInstruction::Debit => Command::Debit,
        }
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn header_apdu() {
        let mut buff = [0u8; 8];

        let n = encode_decode_apdu(&mut buff, &Command::Credit.header(2));
        assert_eq!(n, CommandHeader::LEN);
        assert_eq!(&buff[..n], &[0x81, 0x05, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn header_resolves_commands() {
        for c in Command::iter() {
            assert_eq!(c.header(0).command(), Ok(c));
        }
    }

    #[test]
    fn unknown_class_and_instruction() {
        assert_eq!(
            CommandHeader::new(0x00, 0x01, 0).command(),
            Err(StatusWord::UNKNOWN_CLA)
        );
        assert_eq!(
            CommandHeader::new(BOURSE_ADMIN_CLA, 0x07, 0).command(),
            Err(StatusWord::UNKNOWN_INS)
        );
        assert_eq!(
            CommandHeader::new(BOURSE_PURSE_CLA, 0x01, 0).command(),
            Err(StatusWord::UNKNOWN_INS)
        );
    }

    #[test]
    fn length_check() {
        assert_eq!(Length::Exact(2).check(2), Ok(()));
        assert_eq!(
            Length::Exact(16).check(15),
            Err(StatusWord::wrong_length(16))
        );
        assert_eq!(Length::AtMost(20).check(0), Ok(()));
        assert_eq!(
            Length::AtMost(20).check(21),
            Err(StatusWord::wrong_length(20))
        );
    }
}
