// Tests for fixed-width hex encoding

use proptest::prelude::*;
use sfvcrc::hash::{encode, HexDigest};

#[test]
fn test_leading_zeros_kept() {
    assert_eq!(encode(0, true), "00000000");
    assert_eq!(encode(0x0000_00AB, false), "000000AB");
    assert_eq!(encode(0xDEAD_BEEF, true).as_bytes(), b"deadbeef");
}

#[test]
fn test_parse_is_case_insensitive() {
    let lower: HexDigest = "cbf43926".parse().unwrap();
    let upper: HexDigest = "CBF43926".parse().unwrap();
    assert_eq!(lower.value(), upper.value());
    assert_eq!(upper.to_string(), "CBF43926");
    assert_eq!(upper.with_case(true), "cbf43926");
}

#[test]
fn test_parse_rejects_wrong_width() {
    assert!("cbf4392".parse::<HexDigest>().is_err());
    assert!("0cbf43926".parse::<HexDigest>().is_err());
    assert!("cbf4392g".parse::<HexDigest>().is_err());
    assert!("".parse::<HexDigest>().is_err());
}

proptest! {
    #[test]
    fn prop_encode_matches_format(value in any::<u32>()) {
        prop_assert_eq!(encode(value, true).to_string(), format!("{:08x}", value));
        prop_assert_eq!(encode(value, false).to_string(), format!("{:08X}", value));
        for lowercase in [true, false] {
            let decoded: HexDigest = encode(value, lowercase).to_string().parse().unwrap();
            prop_assert_eq!(decoded.value(), value);
        }
    }
}
