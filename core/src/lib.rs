// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Electronic purse ("bourse") smart card core
//!
//! This provides a common [Engine][engine] implementing an encrypted,
//! power-loss safe purse for execution on smart cards, along with the
//! [Applet][applet::Applet] command loop framing engine operations over a
//! byte transport.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and [Output][engine::Output]s,
//! see [bourse_apdu] for APDU objects and wire encodings.
//!
//! ## Persistence
//!
//! All state that must survive power loss lives in [Storage][storage::Storage]
//! (see [storage] for the layout). Multi-byte updates are made atomic by the
//! [transaction] engine, and any transaction interrupted by power loss is
//! completed on the next power up, before the first command is read.
//!
//! ## Operations
//!
//! Each session begins locked.
//!
//! 1. Issue [`InstallKeyReq`][bourse_apdu::key::InstallKeyReq] to load the
//!    (volatile) session key
//! 2. Issue [`TestKeyReq`][bourse_apdu::key::TestKeyReq] to check the key
//!    against the stored balance, returning a
//!    [`TestKeyResp`][bourse_apdu::key::TestKeyResp] with the result and the
//!    remaining retry count. A valid key unlocks the session, each invalid
//!    key spends one of three attempts and the card is blocked permanently
//!    once none remain.
//! 3. Once unlocked, purse operations are available:
//!     - [`ReadBalanceReq`][bourse_apdu::balance::ReadBalanceReq]
//!     - [`CreditReq`][bourse_apdu::balance::CreditReq] /
//!       [`DebitReq`][bourse_apdu::balance::DebitReq], failing with `0x91BE`
//!       where the balance would leave `0..=65535`
//!     - [`WriteOwnerReq`][bourse_apdu::owner::WriteOwnerReq] /
//!       [`ReadOwnerReq`][bourse_apdu::owner::ReadOwnerReq]
//!
//! Any purse command issued while locked ends the session without a reply.
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub use bourse_apdu::{self as apdu};

pub mod applet;

pub mod cipher;

pub mod consts;

pub mod engine;

#[cfg(feature = "std")]
pub mod loopback;

pub mod provision;

pub mod storage;

pub mod transaction;
