// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Decode;

use crate::{
    apdu::{prelude::*, ApduError},
    cipher::Key,
};

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Event<'a> {
    /// Fetch applet version
    GetVersion,

    /// Install session key (volatile)
    InstallKey(Key),

    /// Test the session key against the stored balance
    TestKey,

    /// Write owner identity
    WriteOwner(&'a [u8]),

    /// Read owner identity
    ReadOwner,

    /// Read current balance
    ReadBalance,

    /// Credit the purse
    Credit { amount: u16 },

    /// Debit the purse
    Debit { amount: u16 },
}

/// Helper for decoding APDUs to events
fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event, ApduError>
where
    T: Decode<'a, Error = ApduError>,
    Event<'a>: From<T::Output>,
{
    T::decode(buff).map(|(v, _n)| Event::from(v))
}

impl<'a> Event<'a> {
    /// Parse an incoming command payload to engine event.
    ///
    /// For commands returning data the payload is empty.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(cmd: Command, buff: &'a [u8]) -> Result<Self, ApduError> {
        match cmd {
            Command::GetVersion => decode_event::<VersionReq>(buff),
            Command::InstallKey => decode_event::<InstallKeyReq>(buff),
            Command::TestKey => decode_event::<TestKeyReq>(buff),
            Command::WriteOwner => decode_event::<WriteOwnerReq>(buff),
            Command::ReadOwner => decode_event::<ReadOwnerReq>(buff),
            Command::ReadBalance => decode_event::<ReadBalanceReq>(buff),
            Command::Credit => decode_event::<CreditReq>(buff),
            Command::Debit => decode_event::<DebitReq>(buff),
        }
    }

    /// Whether the event requires an unlocked session
    pub fn is_gated(&self) -> bool {
        matches!(
            self,
            Event::WriteOwner(_)
                | Event::ReadOwner
                | Event::ReadBalance
                | Event::Credit { .. }
                | Event::Debit { .. }
        )
    }
}

impl<'a> From<VersionReq> for Event<'a> {
    fn from(_: VersionReq) -> Self {
        Event::GetVersion
    }
}

impl<'a> From<InstallKeyReq> for Event<'a> {
    fn from(a: InstallKeyReq) -> Self {
        Event::InstallKey(Key::from_bytes(&a.key))
    }
}

impl<'a> From<TestKeyReq> for Event<'a> {
    fn from(_: TestKeyReq) -> Self {
        Event::TestKey
    }
}

impl<'a> From<WriteOwnerReq<'a>> for Event<'a> {
    fn from(a: WriteOwnerReq<'a>) -> Self {
        Event::WriteOwner(a.owner)
    }
}

impl<'a> From<ReadOwnerReq> for Event<'a> {
    fn from(_: ReadOwnerReq) -> Self {
        Event::ReadOwner
    }
}

impl<'a> From<ReadBalanceReq> for Event<'a> {
    fn from(_: ReadBalanceReq) -> Self {
        Event::ReadBalance
    }
}

impl<'a> From<CreditReq> for Event<'a> {
    fn from(a: CreditReq) -> Self {
        Event::Credit { amount: a.amount }
    }
}

impl<'a> From<DebitReq> for Event<'a> {
    fn from(a: DebitReq) -> Self {
        Event::Debit { amount: a.amount }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_amounts() {
        assert_eq!(
            Event::parse(Command::Credit, &[0x01, 0x02]).unwrap(),
            Event::Credit { amount: 0x0102 }
        );
        assert_eq!(
            Event::parse(Command::Debit, &[0x00, 0xc8]).unwrap(),
            Event::Debit { amount: 200 }
        );
    }

    #[test]
    fn parse_key() {
        let b = [0u8, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4];

        let e = Event::parse(Command::InstallKey, &b).unwrap();
        assert_eq!(e, Event::InstallKey(Key::new([1, 2, 3, 4])));
    }

    #[test]
    fn parse_owner() {
        let e = Event::parse(Command::WriteOwner, b"alice").unwrap();
        assert_eq!(e, Event::WriteOwner(b"alice"));
        assert!(e.is_gated());

        assert!(Event::parse(Command::WriteOwner, &[0x41; 21]).is_err());
    }

    #[test]
    fn parse_short_payload() {
        assert!(Event::parse(Command::Credit, &[0x01]).is_err());
        assert!(Event::parse(Command::InstallKey, &[0u8; 15]).is_err());
    }
}
