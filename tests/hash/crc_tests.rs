// Tests for the CRC32 primitives and the combine law

use proptest::prelude::*;
use sfvcrc::hash::{combine, crc32, Algorithm, PartialResult};

#[test]
fn test_check_value() {
    assert_eq!(crc32(b"123456789", 0), 0xCBF4_3926);
}

#[test]
fn test_combine_with_empty_suffix_is_identity() {
    let a = crc32(b"some prefix", 0);
    assert_eq!(combine(a, 0, 0), a);
}

#[test]
fn test_partial_results_chain_in_order() {
    let data = crate::pattern(10_000, 3);
    let (a, rest) = data.split_at(1234);
    let (b, c) = rest.split_at(4321);

    let chained = PartialResult::new(crc32(a, 0), a.len() as u64)
        .append(PartialResult::new(crc32(b, 0), b.len() as u64))
        .append(PartialResult::new(crc32(c, 0), c.len() as u64));

    assert_eq!(chained.length, 10_000);
    assert_eq!(chained.crc, crc32(&data, 0));
}

#[test]
fn test_algorithm_names() {
    assert_eq!("CRC32".parse::<Algorithm>(), Ok(Algorithm::Crc32));
    assert_eq!("crc".parse::<Algorithm>(), Ok(Algorithm::Crc32));
    assert_eq!("md5".parse::<Algorithm>(), Ok(Algorithm::Md5));
    assert!("sha1".parse::<Algorithm>().is_err());
    assert_eq!(Algorithm::default(), Algorithm::Crc32);
}

proptest! {
    #[test]
    fn prop_combine_matches_concatenation(
        a in prop::collection::vec(any::<u8>(), 0..2048),
        b in prop::collection::vec(any::<u8>(), 0..2048),
    ) {
        let whole: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
        let combined = combine(crc32(&a, 0), crc32(&b, 0), b.len() as u64);
        prop_assert_eq!(combined, crc32(&whole, 0));
    }

    #[test]
    fn prop_continuation_matches_concatenation(
        a in prop::collection::vec(any::<u8>(), 0..2048),
        b in prop::collection::vec(any::<u8>(), 0..2048),
    ) {
        let whole: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
        prop_assert_eq!(crc32(&b, crc32(&a, 0)), crc32(&whole, 0));
    }
}
