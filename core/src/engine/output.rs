// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;
use heapless::Vec;

use ledger_proto::ApduError;

use crate::apdu::{self, OWNER_MAX_LEN};

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    None,

    /// Applet version
    Version { version: &'static str },

    /// Key test result and remaining retries
    KeyTest { valid: bool, retries: u8 },

    /// Owner identity
    Owner(Vec<u8, OWNER_MAX_LEN>),

    /// Current balance
    Balance(u16),
}

impl Output {
    /// Encode an [`Output`] object to a response payload
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None => Ok(0),
            Output::Version { version } => apdu::version::VersionResp::new(version).encode(buff),
            Output::KeyTest { valid, retries } => {
                apdu::key::TestKeyResp::new(*valid, *retries).encode(buff)
            }
            Output::Owner(owner) => apdu::owner::OwnerResp::new(owner).encode(buff),
            Output::Balance(balance) => apdu::balance::BalanceResp::new(*balance).encode(buff),
        }
    }
}
