// Copyright (c) 2022-2023 The MobileCoin Foundation

//! In-process terminal, driving an [Applet] over a loopback [Transport].
//!
//! Used by the simulator and tests in place of a physical card reader.

use std::collections::VecDeque;

use encdec::{Decode, DecodeOwned, Encode};

use crate::{
    apdu::{prelude::*, ApduError},
    applet::{Applet, Flow, Transport},
    storage::Storage,
};

/// Terminal errors
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    /// Card halted the session without replying
    #[error("card halted without response")]
    Mute,

    /// Card attempted to read past the supplied command
    #[error("link underrun")]
    Link,

    /// APDU encode / decode failed
    #[error("APDU encoding error: {0:?}")]
    Apdu(ApduError),

    /// Malformed response
    #[error("unexpected response")]
    UnexpectedResponse,

    /// Command completed with a non-success status word
    #[error("command failed with status {0}")]
    Status(StatusWord),
}

impl From<ApduError> for TerminalError {
    fn from(e: ApduError) -> Self {
        TerminalError::Apdu(e)
    }
}

/// Loopback byte transport, the terminal side fills `rx`
/// and collects `tx`
#[derive(Clone, Debug, Default)]
pub struct Loopback {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl Transport for Loopback {
    type Error = TerminalError;

    fn send(&mut self, b: u8) -> Result<(), TerminalError> {
        self.tx.push(b);
        Ok(())
    }

    fn recv(&mut self) -> Result<u8, TerminalError> {
        self.rx.pop_front().ok_or(TerminalError::Link)
    }
}

/// Command response
#[derive(Clone, PartialEq, Debug)]
pub struct Response {
    /// Procedure byte received (card accepted the header)
    pub ack: bool,
    /// Response payload
    pub data: Vec<u8>,
    /// Completion status
    pub status: StatusWord,
}

/// Terminal connected to an in-process [Applet]
pub struct Terminal<S: Storage> {
    applet: Applet<S>,
    link: Loopback,
    atr: Vec<u8>,
    halted: bool,
}

impl<S: Storage> Terminal<S> {
    /// Power up a card on the provided storage and read its ATR
    pub fn connect(storage: S) -> Result<Self, TerminalError> {
        let mut applet = Applet::power_up(storage);
        let mut link = Loopback::default();

        applet.atr(&mut link)?;

        let atr = core::mem::take(&mut link.tx);
        let (_atr, _n) = Atr::decode(&atr)?;

        #[cfg(feature = "log")]
        log::debug!("ATR: {}", String::from_utf8_lossy(_atr.historical));

        Ok(Self {
            applet,
            link,
            atr,
            halted: false,
        })
    }

    /// Raw ATR bytes received on connection
    pub fn atr(&self) -> &[u8] {
        &self.atr
    }

    /// Exchange a single command.
    ///
    /// `data` is only delivered if the card acknowledges the header,
    /// any bytes the card does not consume are discarded. Once the card
    /// halts, all exchanges fail until [Terminal::power_cycle].
    pub fn exchange(
        &mut self,
        header: CommandHeader,
        data: &[u8],
    ) -> Result<Response, TerminalError> {
        if self.halted {
            return Err(TerminalError::Mute);
        }

        let mut h = [0u8; CommandHeader::LEN];
        header.encode(&mut h)?;

        self.link.rx.clear();
        self.link.tx.clear();
        self.link.rx.extend(h.iter());
        self.link.rx.extend(data.iter());

        let flow = self.applet.process(&mut self.link)?;
        self.link.rx.clear();

        let tx = core::mem::take(&mut self.link.tx);
        if flow == Flow::Halt {
            self.halted = true;
        }
        if tx.is_empty() {
            return Err(TerminalError::Mute);
        }

        let (body, sw) = match tx.len() {
            n if n >= 2 => tx.split_at(n - 2),
            _ => return Err(TerminalError::UnexpectedResponse),
        };
        let (status, _) = StatusWord::decode_owned(sw)?;

        let (ack, data) = match body.split_first() {
            Some((b, d)) if *b == header.ins => (true, d.to_vec()),
            None => (false, vec![]),
            _ => return Err(TerminalError::UnexpectedResponse),
        };

        #[cfg(feature = "log")]
        log::debug!("{:02x?} -> {:02x?} ({})", header, data, status);

        Ok(Response { ack, data, status })
    }

    /// Exchange a command, failing on non-success status
    fn command(&mut self, cmd: Command, p3: u8, data: &[u8]) -> Result<Vec<u8>, TerminalError> {
        let r = self.exchange(cmd.header(p3), data)?;

        match r.status.is_ok() {
            true => Ok(r.data),
            false => Err(TerminalError::Status(r.status)),
        }
    }

    /// Exchange a command with an encoded request payload
    fn request<R: Encode<Error = ApduError>>(
        &mut self,
        cmd: Command,
        req: &R,
    ) -> Result<Vec<u8>, TerminalError> {
        let mut buff = [0u8; 32];
        let n = req.encode(&mut buff)?;

        self.command(cmd, n as u8, &buff[..n])
    }

    /// Fetch the applet version
    pub fn version(&mut self) -> Result<String, TerminalError> {
        let d = self.command(Command::GetVersion, 4, &[])?;
        let (v, _) = VersionResp::decode(&d)?;

        Ok(v.version.to_string())
    }

    /// Install the session key
    pub fn install_key(&mut self, key: &[u8; 16]) -> Result<(), TerminalError> {
        self.request(Command::InstallKey, &InstallKeyReq::new(*key))
            .map(|_| ())
    }

    /// Test the installed session key
    pub fn test_key(&mut self) -> Result<TestKeyResp, TerminalError> {
        let d = self.command(Command::TestKey, 2, &[])?;
        let (r, _) = TestKeyResp::decode_owned(&d)?;

        Ok(r)
    }

    /// Install and test a key
    pub fn unlock(&mut self, key: &[u8; 16]) -> Result<TestKeyResp, TerminalError> {
        self.install_key(key)?;

        let r = self.test_key()?;
        if !r.valid {
            #[cfg(feature = "log")]
            log::warn!("key rejected, {} attempt(s) remaining", r.retries);
        }

        Ok(r)
    }

    /// Read the balance
    pub fn balance(&mut self) -> Result<u16, TerminalError> {
        let d = self.command(Command::ReadBalance, 2, &[])?;
        let (r, _) = BalanceResp::decode(&d)?;

        Ok(r.balance)
    }

    /// Credit the purse
    pub fn credit(&mut self, amount: u16) -> Result<(), TerminalError> {
        self.request(Command::Credit, &CreditReq::new(amount))
            .map(|_| ())
    }

    /// Debit the purse
    pub fn debit(&mut self, amount: u16) -> Result<(), TerminalError> {
        self.request(Command::Debit, &DebitReq::new(amount))
            .map(|_| ())
    }

    /// Write the owner identity
    pub fn set_owner(&mut self, owner: &[u8]) -> Result<(), TerminalError> {
        self.request(Command::WriteOwner, &WriteOwnerReq::new(owner))
            .map(|_| ())
    }

    /// Read the owner identity, `None` if unset
    pub fn owner(&mut self) -> Result<Option<Vec<u8>>, TerminalError> {
        // Probe with an empty request for the stored length
        let r = self.exchange(Command::ReadOwner.header(0), &[])?;

        let n = match (r.status, r.status.expected_length()) {
            (StatusWord::NO_DATA, _) => return Ok(None),
            (_, Some(n)) => n,
            _ => return Err(TerminalError::Status(r.status)),
        };

        let d = self.command(Command::ReadOwner, n, &[])?;
        let (o, _) = OwnerResp::decode(&d)?;

        Ok(Some(o.owner.to_vec()))
    }

    /// Whether the card has halted the session
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Access the applet
    pub fn applet(&self) -> &Applet<S> {
        &self.applet
    }

    /// Cut and restore power, reconnecting to the card
    pub fn power_cycle(self) -> Result<Self, TerminalError> {
        Self::connect(self.applet.into_storage())
    }

    /// Disconnect, returning the card storage
    pub fn into_storage(self) -> S {
        self.applet.into_storage()
    }
}
