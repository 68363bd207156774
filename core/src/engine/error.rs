// Copyright (c) 2022-2023 The MobileCoin Foundation

use crate::apdu::StatusWord;

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength = 0x00,

    /// Session locked, a successful key test is required
    #[cfg_attr(feature = "thiserror", error("session locked"))]
    Locked = 0x01,

    /// Retry budget exhausted, card permanently blocked
    #[cfg_attr(feature = "thiserror", error("card blocked"))]
    Blocked = 0x02,

    /// Credit would exceed the maximum balance
    #[cfg_attr(feature = "thiserror", error("balance overflow"))]
    BalanceOverflow = 0x03,

    /// Debit exceeds the current balance
    #[cfg_attr(feature = "thiserror", error("insufficient funds"))]
    InsufficientFunds = 0x04,

    /// Owner identity not set
    #[cfg_attr(feature = "thiserror", error("owner identity unset"))]
    OwnerUnset = 0x05,

    /// Staged payload exceeds the pending transaction area
    #[cfg_attr(feature = "thiserror", error("transaction too large"))]
    TransactionTooLarge = 0x06,

    /// Too many operations in a single transaction
    #[cfg_attr(feature = "thiserror", error("too many operations"))]
    TooManyOperations = 0x07,

    /// Operation exceeds the capacity of its destination slot
    #[cfg_attr(feature = "thiserror", error("slot overflow"))]
    SlotOverflow = 0x08,

    /// Message encoding failed
    #[cfg_attr(feature = "thiserror", error("message encoding failed"))]
    EncodingFailed = 0x09,
}

impl Error {
    /// Status word reported to the terminal for this error.
    ///
    /// Returns `None` where the session must halt without replying.
    pub const fn status(&self) -> Option<StatusWord> {
        match self {
            Error::Locked | Error::Blocked => None,
            Error::BalanceOverflow | Error::InsufficientFunds => Some(StatusWord::BALANCE_LIMIT),
            Error::OwnerUnset => Some(StatusWord::NO_DATA),
            _ => Some(StatusWord::new(0x6F00 | *self as u16)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_words() {
        assert_eq!(
            Error::BalanceOverflow.status(),
            Some(StatusWord::new(0x91BE))
        );
        assert_eq!(
            Error::InsufficientFunds.status(),
            Some(StatusWord::new(0x91BE))
        );
        assert_eq!(Error::OwnerUnset.status(), Some(StatusWord::new(0x6100)));
        assert_eq!(Error::Locked.status(), None);
        assert_eq!(Error::Blocked.status(), None);
        assert_eq!(
            Error::EncodingFailed.status(),
            Some(StatusWord::new(0x6F09))
        );
    }
}
