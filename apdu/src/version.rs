// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Answer-to-reset and version APDUs

use encdec::{Decode, Encode};

use super::{AdminInstruction, ApduError, ApduStatic, BOURSE_ADMIN_CLA};
use crate::helpers::raw;

/// Initial character for direct convention cards
pub const ATR_TS: u8 = 0x3b;

/// Answer-to-reset, sent by the card on power up before any command
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   TS (0x3B)   |  HISTORY_LEN  |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
/// /                       HISTORICAL_BYTES                        /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Atr<'a> {
    /// Historical bytes (applet name)
    pub historical: &'a [u8],
}

impl<'a> Atr<'a> {
    pub fn new(historical: &'a [u8]) -> Self {
        Self { historical }
    }
}

impl<'a> Encode for Atr<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(2 + self.historical.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 2 + self.historical.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = ATR_TS;
        buff[1] = self.historical.len() as u8;

        let n = raw::enc(self.historical, &mut buff[2..])?;

        Ok(2 + n)
    }
}

impl<'a> Decode<'a> for Atr<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        if buff[0] != ATR_TS {
            return Err(ApduError::InvalidEncoding);
        }

        let len = buff[1] as usize;
        if buff.len() < 2 + len {
            return Err(ApduError::InvalidLength);
        }

        Ok((
            Self {
                historical: &buff[2..][..len],
            },
            2 + len,
        ))
    }
}

/// Fetch applet version APDU (no payload)
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct VersionReq;

impl ApduStatic for VersionReq {
    const CLA: u8 = BOURSE_ADMIN_CLA;
    const INS: u8 = AdminInstruction::GetVersion as u8;
}

/// Applet version response, a short ASCII version string (ie. `1.00`)
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct VersionResp<'a> {
    pub version: &'a str,
}

impl<'a> VersionResp<'a> {
    pub fn new(version: &'a str) -> Self {
        Self { version }
    }
}

impl<'a> Encode for VersionResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.version.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        raw::enc(self.version.as_bytes(), buff)
    }
}

impl<'a> Decode<'a> for VersionResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let version = core::str::from_utf8(buff).map_err(|_| ApduError::InvalidEncoding)?;

        Ok((Self { version }, buff.len()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn atr_apdu() {
        let mut buff = [0u8; 16];

        let n = encode_decode_apdu(&mut buff, &Atr::new(b"bourse"));
        assert_eq!(n, 8);
    }

    #[test]
    fn atr_rejects_inverse_convention() {
        assert!(matches!(
            Atr::decode(&[0x3f, 0x00]),
            Err(ApduError::InvalidEncoding)
        ));
    }

    #[test]
    fn version_resp_apdu() {
        let mut buff = [0u8; 16];

        encode_decode_apdu(&mut buff, &VersionResp::new("1.00"));
    }
}
