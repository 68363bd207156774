// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Card side command loop
//!
//! [Applet] drives an [Engine] over a byte-oriented [Transport], handling
//! command framing: header, length check, procedure byte, payload and
//! status word (see [apdu][crate::apdu]).
//!
//! Commands are processed strictly one at a time, each running to
//! completion (including any non-volatile commit) before the next header
//! is read.

use encdec::Encode;
use static_assertions::const_assert;

use crate::{
    apdu::{
        prelude::*, version::Atr, BOURSE_ADMIN_CLA, KEY_LEN, OWNER_MAX_LEN,
    },
    consts::{ATR_HISTORICAL, BUFF_LEN},
    engine::{Engine, Error, Event},
    storage::Storage,
};

const_assert!(BUFF_LEN >= KEY_LEN && BUFF_LEN >= OWNER_MAX_LEN);

/// Byte transport to the terminal
pub trait Transport {
    type Error;

    /// Send a single byte
    fn send(&mut self, b: u8) -> Result<(), Self::Error>;

    /// Receive a single byte, blocking until available
    fn recv(&mut self) -> Result<u8, Self::Error>;

    /// Send a sequence of bytes
    fn send_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for b in data {
            self.send(*b)?;
        }
        Ok(())
    }
}

impl<T: Transport> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, b: u8) -> Result<(), Self::Error> {
        T::send(self, b)
    }

    fn recv(&mut self) -> Result<u8, Self::Error> {
        T::recv(self)
    }
}

/// Command loop control
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Flow {
    /// Ready for the next command
    Continue,
    /// Session halted, no further commands are processed
    Halt,
}

/// Card applet, an [Engine] with command framing
pub struct Applet<S: Storage> {
    engine: Engine<S>,
    buff: [u8; BUFF_LEN],
}

impl<S: Storage> Applet<S> {
    /// Power up the applet, recovering any interrupted transaction.
    ///
    /// Nothing is sent to the terminal.
    pub fn power_up(storage: S) -> Self {
        Self {
            engine: Engine::new(storage),
            buff: [0u8; BUFF_LEN],
        }
    }

    /// Send the answer to reset
    pub fn atr<T: Transport>(&mut self, mut t: T) -> Result<(), T::Error> {
        // Historical bytes always fit `buff`
        let n = Atr::new(ATR_HISTORICAL).encode(&mut self.buff).unwrap_or(0);

        t.send_all(&self.buff[..n])
    }

    /// Process a single command
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn process<T: Transport>(&mut self, mut t: T) -> Result<Flow, T::Error> {
        // Blocked cards do not read further commands
        if self.engine.is_blocked() || self.engine.retries() == 0 {
            #[cfg(feature = "log")]
            log::warn!("card blocked, halting");

            return Ok(Flow::Halt);
        }

        let mut h = [0u8; CommandHeader::LEN];
        for b in h.iter_mut() {
            *b = t.recv()?;
        }
        let header = CommandHeader {
            cla: h[0],
            ins: h[1],
            p1: h[2],
            p2: h[3],
            p3: h[4],
        };

        #[cfg(feature = "log")]
        log::debug!("header: {:02x?}", header);

        // Anything but the admin class requires an unlocked session,
        // the session ends without a reply otherwise
        if header.cla != BOURSE_ADMIN_CLA && !self.engine.is_unlocked() {
            #[cfg(feature = "log")]
            log::warn!("class {:02x} while locked, halting", header.cla);

            return Ok(Flow::Halt);
        }

        let sw = match self.handle(&mut t, &header)? {
            Some(sw) => sw,
            None => return Ok(Flow::Halt),
        };

        #[cfg(feature = "log")]
        log::debug!("status: {}", sw);

        t.send(sw.sw1())?;
        t.send(sw.sw2())?;

        Ok(Flow::Continue)
    }

    /// Process commands until the session halts
    pub fn run<T: Transport>(&mut self, mut t: T) -> Result<(), T::Error> {
        while self.process(&mut t)? == Flow::Continue {}

        Ok(())
    }

    /// Handle a single command, returning the status word to send
    /// or `None` to halt
    fn handle<T: Transport>(
        &mut self,
        t: &mut T,
        header: &CommandHeader,
    ) -> Result<Option<StatusWord>, T::Error> {
        let cmd = match header.command() {
            Ok(c) => c,
            Err(sw) => return Ok(Some(sw)),
        };

        let p3 = header.p3;

        // Check declared length before acknowledging
        let len = match cmd.length() {
            Length::Stored => match self.engine.owner_len() {
                0 => return Ok(Error::OwnerUnset.status()),
                n => Length::Exact(n as u8),
            },
            l => l,
        };
        if let Err(sw) = len.check(p3) {
            // A malformed key test still ends any unlocked session
            if cmd == Command::TestKey {
                self.engine.lock();
            }

            return Ok(Some(sw));
        }

        // Procedure byte
        t.send(header.ins)?;

        let n = match cmd.direction() {
            Direction::In => p3 as usize,
            Direction::Out => 0,
        };
        for b in self.buff[..n].iter_mut() {
            *b = t.recv()?;
        }

        let evt = match Event::parse(cmd, &self.buff[..n]) {
            Ok(e) => e,
            Err(_e) => {
                #[cfg(feature = "log")]
                log::error!("failed to parse {} payload: {:?}", cmd, _e);

                return Ok(Error::InvalidLength.status());
            }
        };

        let out = match self.engine.update(&evt) {
            Ok(o) => o,
            Err(e) => {
                #[cfg(feature = "log")]
                log::debug!("{} failed: {:?}", cmd, e);

                return Ok(e.status());
            }
        };

        let mut r = [0u8; BUFF_LEN];
        let n = match out.encode(&mut r) {
            Ok(n) => n,
            Err(_) => return Ok(Error::EncodingFailed.status()),
        };
        t.send_all(&r[..n])?;

        Ok(Some(StatusWord::OK))
    }

    /// Access the underlying engine
    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    /// Power down, returning the underlying storage
    pub fn into_storage(self) -> S {
        self.engine.into_storage()
    }
}
