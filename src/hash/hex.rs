// Fixed-width hexadecimal encoding of CRC32 values

use std::fmt;
use std::str::FromStr;

/// Eight ASCII hex digits, most-significant nibble first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexDigest {
    value: u32,
    text: [u8; 8],
}

impl HexDigest {
    /// Numeric CRC this digest encodes
    pub fn value(&self) -> u32 {
        self.value
    }

    /// The encoded digits
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.text
    }

    /// Same value, re-encoded in the requested case
    pub fn with_case(self, lowercase: bool) -> Self {
        encode(self.value, lowercase)
    }
}

/// Encode `value` as exactly eight hex digits.
///
/// Spreads the nibbles into the eight bytes of a `u64` and converts all of
/// them to ASCII at once instead of formatting digit by digit.
pub fn encode(value: u32, lowercase: bool) -> HexDigest {
    let mut x = u64::from(value);

    // One nibble per byte, ordered so the little-endian bytes read MSB first.
    // 0x1234FACE => 0x0E0C0A0F04030201
    x = ((x & 0xFFFF) << 32) | ((x & 0xFFFF_0000) >> 16);
    x = ((x & 0x0000_FF00_0000_FF00) >> 8) | ((x & 0x0000_00FF_0000_00FF) << 16);
    x = ((x & 0x00F0_00F0_00F0_00F0) >> 4) | ((x & 0x000F_000F_000F_000F) << 8);

    // 0x01 in every byte holding a digit above 9
    let alpha_mask = ((x + 0x0606_0606_0606_0606) >> 4) & 0x0101_0101_0101_0101;

    x |= 0x3030_3030_3030_3030;
    // ':'..='?' lands on 'a'..='f' (+0x27) or 'A'..='F' (+0x07)
    let alpha_offset: u64 = if lowercase { 0x27 } else { 0x07 };
    x += alpha_offset * alpha_mask;

    HexDigest {
        value,
        text: x.to_le_bytes(),
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.text {
            fmt::Write::write_char(f, char::from(b))?;
        }
        Ok(())
    }
}

/// Error returned when a manifest digest is not eight hex digits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHexError(pub String);

impl fmt::Display for ParseHexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an 8-digit hex CRC32", self.0)
    }
}

impl std::error::Error for ParseHexError {}

impl FromStr for HexDigest {
    type Err = ParseHexError;

    /// Case-insensitive; keeps the case of the input text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseHexError(s.to_string()));
        }
        let value = u32::from_str_radix(s, 16).map_err(|_| ParseHexError(s.to_string()))?;
        let lowercase = !s.bytes().any(|b| b.is_ascii_uppercase());
        Ok(encode(value, lowercase))
    }
}

impl PartialEq<str> for HexDigest {
    fn eq(&self, other: &str) -> bool {
        self.text.as_slice() == other.as_bytes()
    }
}

impl PartialEq<&str> for HexDigest {
    fn eq(&self, other: &&str) -> bool {
        self.text.as_slice() == other.as_bytes()
    }
}

impl serde::Serialize for HexDigest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
