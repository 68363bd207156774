// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Owner identity APDUs
//!
//! Identity payloads are raw bytes with the length carried by `P3`,
//! limited to [OWNER_MAX_LEN] bytes.

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, PurseInstruction, BOURSE_PURSE_CLA, OWNER_MAX_LEN};
use crate::helpers::raw;

/// Write the owner identity, an empty identity clears the stored owner
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct WriteOwnerReq<'a> {
    pub owner: &'a [u8],
}

impl<'a> WriteOwnerReq<'a> {
    pub fn new(owner: &'a [u8]) -> Self {
        Self { owner }
    }
}

impl<'a> ApduStatic for WriteOwnerReq<'a> {
    const CLA: u8 = BOURSE_PURSE_CLA;
    const INS: u8 = PurseInstruction::WriteOwner as u8;
}

impl<'a> Encode for WriteOwnerReq<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.owner.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if self.owner.len() > OWNER_MAX_LEN {
            return Err(ApduError::InvalidLength);
        }

        raw::enc(self.owner, buff)
    }
}

impl<'a> Decode<'a> for WriteOwnerReq<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() > OWNER_MAX_LEN {
            return Err(ApduError::InvalidLength);
        }

        Ok((Self { owner: buff }, buff.len()))
    }
}

/// Read the owner identity (no payload), returns [OwnerResp].
///
/// `P3` must match the stored identity length.
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct ReadOwnerReq;

impl ApduStatic for ReadOwnerReq {
    const CLA: u8 = BOURSE_PURSE_CLA;
    const INS: u8 = PurseInstruction::ReadOwner as u8;
}

/// Owner identity response
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct OwnerResp<'a> {
    pub owner: &'a [u8],
}

impl<'a> OwnerResp<'a> {
    pub fn new(owner: &'a [u8]) -> Self {
        Self { owner }
    }
}

impl<'a> Encode for OwnerResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.owner.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        raw::enc(self.owner, buff)
    }
}

impl<'a> Decode<'a> for OwnerResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        Ok((Self { owner: buff }, buff.len()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn write_owner_apdu() {
        let mut buff = [0u8; 32];
        encode_decode_apdu(&mut buff, &WriteOwnerReq::new(b"Alice Martin"));
    }

    #[test]
    fn write_owner_limit() {
        let owner = [0x41u8; OWNER_MAX_LEN + 1];
        let mut buff = [0u8; 32];

        assert!(matches!(
            WriteOwnerReq::new(&owner).encode(&mut buff),
            Err(ApduError::InvalidLength)
        ));
        assert!(matches!(
            WriteOwnerReq::decode(&owner),
            Err(ApduError::InvalidLength)
        ));
    }
}
