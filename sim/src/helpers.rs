// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Fixed length hex-encoded argument
#[derive(Clone, PartialEq, Debug)]
pub struct HexData<const N: usize = 16>(pub [u8; N]);

impl<const N: usize> std::str::FromStr for HexData<N> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; N];

        hex::decode_to_slice(s, &mut b)?;

        Ok(HexData(b))
    }
}

impl<const N: usize> AsRef<[u8; N]> for HexData<N> {
    fn as_ref(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> std::fmt::Display for HexData<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_key() {
        let k: HexData = "54ba9354d5676ce64ca7cf938371b930".parse().unwrap();
        assert_eq!(k.0[..4], [0x54, 0xba, 0x93, 0x54]);
        assert_eq!(k.to_string(), "54ba9354d5676ce64ca7cf938371b930");

        assert!("54ba".parse::<HexData>().is_err());
    }
}
