// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Status words returned at the end of every command
//!

use encdec::{DecodeOwned, Encode};

use crate::ApduError;

/// Two byte status word (`SW1 SW2`) completing a command
///
/// Values are reproduced bit-exact from existing terminals:
///
/// | SW        | Meaning                                      |
/// |-----------|----------------------------------------------|
/// | `9000`    | success                                      |
/// | `6Cxx`    | wrong length, `xx` is the expected length    |
/// | `6100`    | no data available (owner identity unset)     |
/// | `6D00`    | unknown instruction                          |
/// | `6E00`    | unknown class                                |
/// | `91BE`    | balance overflow or insufficient funds       |
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct StatusWord(u16);

impl StatusWord {
    /// Command completed successfully
    pub const OK: Self = Self(0x9000);

    /// No data available
    pub const NO_DATA: Self = Self(0x6100);

    /// Instruction not supported for this class
    pub const UNKNOWN_INS: Self = Self(0x6D00);

    /// Class not supported
    pub const UNKNOWN_CLA: Self = Self(0x6E00);

    /// Credit would overflow the balance, or debit exceeds it
    pub const BALANCE_LIMIT: Self = Self(0x91BE);

    /// Create a status word from its raw value
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Create a status word from `SW1` and `SW2`
    pub const fn from_bytes(sw1: u8, sw2: u8) -> Self {
        Self(((sw1 as u16) << 8) | sw2 as u16)
    }

    /// Wrong length status, carrying the expected `P3`
    pub const fn wrong_length(expected: u8) -> Self {
        Self(0x6C00 | expected as u16)
    }

    /// Raw status word value
    pub const fn value(&self) -> u16 {
        self.0
    }

    pub const fn sw1(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn sw2(&self) -> u8 {
        self.0 as u8
    }

    /// Check whether this status indicates success
    pub const fn is_ok(&self) -> bool {
        self.0 == Self::OK.0
    }

    /// Fetch the expected length from a wrong length status
    pub const fn expected_length(&self) -> Option<u8> {
        match self.sw1() {
            0x6C => Some(self.sw2()),
            _ => None,
        }
    }
}

impl From<StatusWord> for u16 {
    fn from(sw: StatusWord) -> Self {
        sw.0
    }
}

/// Debug format [StatusWord] as hex
impl core::fmt::Debug for StatusWord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "StatusWord({:04x})", self.0)
    }
}

/// Display [StatusWord] as hex
impl core::fmt::Display for StatusWord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl Encode for StatusWord {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(2)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.sw1();
        buff[1] = self.sw2();

        Ok(2)
    }
}

impl DecodeOwned for StatusWord {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        Ok((Self::from_bytes(buff[0], buff[1]), 2))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_word_bytes() {
        let mut buff = [0u8; 2];

        StatusWord::BALANCE_LIMIT.encode(&mut buff).unwrap();
        assert_eq!(buff, [0x91, 0xBE]);

        StatusWord::wrong_length(16).encode(&mut buff).unwrap();
        assert_eq!(buff, [0x6C, 0x10]);
    }

    #[test]
    fn wrong_length_carries_expected() {
        assert_eq!(StatusWord::wrong_length(20).expected_length(), Some(20));
        assert_eq!(StatusWord::OK.expected_length(), None);
        assert_eq!(StatusWord::UNKNOWN_INS.expected_length(), None);
    }

    #[test]
    fn decode_status_word() {
        let (sw, n) = StatusWord::decode_owned(&[0x90, 0x00, 0xff]).unwrap();
        assert_eq!(n, 2);
        assert!(sw.is_ok());

        assert!(matches!(
            StatusWord::decode_owned(&[0x90]),
            Err(ApduError::InvalidLength)
        ));
    }
}
