// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Balance APDUs, for reading, crediting and debiting the purse

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, PurseInstruction, BOURSE_PURSE_CLA};
use crate::helpers::be16;

/// Read the current balance (no payload), returns [BalanceResp]
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct ReadBalanceReq;

impl ApduStatic for ReadBalanceReq {
    const CLA: u8 = BOURSE_PURSE_CLA;
    const INS: u8 = PurseInstruction::ReadBalance as u8;
}

/// Balance response
///
/// ## Encoding:
/// ```text
///  0                   1
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      BALANCE (u16, BE)        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct BalanceResp {
    #[encdec(with = "be16")]
    pub balance: u16,
}

impl BalanceResp {
    pub fn new(balance: u16) -> Self {
        Self { balance }
    }
}

/// Credit the purse by `amount`
///
/// ## Encoding:
/// ```text
///  0                   1
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       AMOUNT (u16, BE)        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct CreditReq {
    #[encdec(with = "be16")]
    pub amount: u16,
}

impl CreditReq {
    pub fn new(amount: u16) -> Self {
        Self { amount }
    }
}

impl ApduStatic for CreditReq {
    const CLA: u8 = BOURSE_PURSE_CLA;
    const INS: u8 = PurseInstruction::Credit as u8;
}

/// Debit the purse by `amount`, encoded as for [CreditReq]
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct DebitReq {
    #[encdec(with = "be16")]
    pub amount: u16,
}

impl DebitReq {
    pub fn new(amount: u16) -> Self {
        Self { amount }
    }
}

impl ApduStatic for DebitReq {
    const CLA: u8 = BOURSE_PURSE_CLA;
    const INS: u8 = PurseInstruction::Debit as u8;
}
