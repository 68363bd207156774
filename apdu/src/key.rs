// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Session key APDUs, for installing and verifying the purse key

use encdec::{Decode, DecodeOwned, Encode};

use super::{AdminInstruction, ApduError, ApduStatic, BOURSE_ADMIN_CLA, KEY_LEN};
use crate::helpers::arr;

/// Install the session key used for balance operations.
///
/// The key is held in volatile memory only and must be installed
/// (and tested) again following every reset.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             KEY[0]                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             KEY[1]                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             KEY[2]                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             KEY[3]                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Each key word is big-endian.
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct InstallKeyReq {
    #[encdec(with = "arr")]
    pub key: [u8; KEY_LEN],
}

impl InstallKeyReq {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }
}

impl ApduStatic for InstallKeyReq {
    const CLA: u8 = BOURSE_ADMIN_CLA;
    const INS: u8 = AdminInstruction::InstallKey as u8;
}

/// Test the installed session key (no payload), returns [TestKeyResp]
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TestKeyReq;

impl ApduStatic for TestKeyReq {
    const CLA: u8 = BOURSE_ADMIN_CLA;
    const INS: u8 = AdminInstruction::TestKey as u8;
}

/// Key test response
///
/// ## Encoding:
/// ```text
///  0                   1
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     VALID     |    RETRIES    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TestKeyResp {
    /// Key matches the stored balance
    pub valid: bool,
    /// Remaining attempts before the card is blocked
    pub retries: u8,
}

impl TestKeyResp {
    pub fn new(valid: bool, retries: u8) -> Self {
        Self { valid, retries }
    }
}

impl Encode for TestKeyResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(2)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.valid as u8;
        buff[1] = self.retries;

        Ok(2)
    }
}

impl DecodeOwned for TestKeyResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        let valid = match buff[0] {
            0 => false,
            1 => true,
            _ => return Err(ApduError::InvalidEncoding),
        };

        Ok((
            Self {
                valid,
                retries: buff[1],
            },
            2,
        ))
    }
}
