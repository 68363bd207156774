// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Encoding helper for fixed size byte arrays (pending nightly array constructors)
pub(crate) mod arr {
    use encdec::Error;

    pub fn enc<const N: usize>(d: &[u8; N], buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < d.len() {
            return Err(Error::Length);
        }

        buff[..d.len()].copy_from_slice(&d[..]);

        Ok(d.len())
    }

    pub fn enc_len<const N: usize>(d: &[u8; N]) -> Result<usize, Error> {
        Ok(d.len())
    }

    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), Error> {
        if buff.len() < N {
            return Err(Error::Length);
        }

        let mut d = [0u8; N];
        d.copy_from_slice(&buff[..N]);

        Ok((d, N))
    }
}

/// Encoding helper for big-endian `u16` fields (amounts and balances)
pub(crate) mod be16 {
    use byteorder::{BigEndian, ByteOrder};
    use encdec::Error;

    pub fn enc(v: &u16, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < 2 {
            return Err(Error::Length);
        }

        BigEndian::write_u16(buff, *v);

        Ok(2)
    }

    pub fn enc_len(_v: &u16) -> Result<usize, Error> {
        Ok(2)
    }

    pub fn dec(buff: &[u8]) -> Result<(u16, usize), Error> {
        if buff.len() < 2 {
            return Err(Error::Length);
        }

        Ok((BigEndian::read_u16(buff), 2))
    }
}

/// Encoding helper for length-delimited byte payloads (length carried by `P3`)
pub(crate) mod raw {
    use crate::ApduError;

    pub fn enc(d: &[u8], buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < d.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..d.len()].copy_from_slice(d);

        Ok(d.len())
    }
}
