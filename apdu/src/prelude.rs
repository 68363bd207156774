//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    balance::{BalanceResp, CreditReq, DebitReq, ReadBalanceReq},
    header::{Command, CommandHeader, Direction, Length},
    key::{InstallKeyReq, TestKeyReq, TestKeyResp},
    owner::{OwnerResp, ReadOwnerReq, WriteOwnerReq},
    status::StatusWord,
    version::{Atr, VersionReq, VersionResp},
};
