use lzw16::channel::CodeReader;
use lzw16::{Decoder, Encoder};
use proptest::prelude::*;

fn code_count(encoded: &[u8]) -> usize {
    CodeReader::new(encoded).count()
}

/// Inputs over a small alphabet repeat a lot, which grows and freezes the table quickly.
fn repetitive() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c')], 1..2048)
}

proptest! {
    #[test]
    fn roundtrip_any(data in proptest::collection::vec(any::<u8>(), 1..1024), bits in 9u8..=16) {
        let encoded = Encoder::new(bits).unwrap().encode(&data).unwrap();
        let decoded = Decoder::new(bits).unwrap().decode(&encoded).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn roundtrip_repetitive(data in repetitive(), bits in 9u8..=12) {
        let encoded = Encoder::new(bits).unwrap().encode(&data).unwrap();
        let decoded = Decoder::new(bits).unwrap().decode(&encoded).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn encoding_is_deterministic(data in repetitive(), bits in 9u8..=16) {
        let first = Encoder::new(bits).unwrap().encode(&data).unwrap();
        let second = Encoder::new(bits).unwrap().encode(&data).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn table_grows_once_per_code(data in repetitive(), bits in 9u8..=16) {
        let mut encoder = Encoder::new(bits).unwrap();
        let encoded = encoder.encode(&data).unwrap();
        let mut decoder = Decoder::new(bits).unwrap();
        decoder.decode(&encoded).unwrap();

        let codes = code_count(&encoded);
        let expected = (256 + codes - 1).min(1 << bits);
        prop_assert_eq!(encoder.dictionary_len(), expected);
        prop_assert_eq!(decoder.dictionary_len(), expected);
        prop_assert_eq!(encoder.is_frozen(), decoder.is_frozen());
    }

    #[test]
    fn never_longer_than_two_bytes_per_byte(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let encoded = Encoder::new(16).unwrap().encode(&data).unwrap();
        prop_assert!(encoded.len() <= 2 * data.len());
    }

    #[test]
    fn decoding_garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256), bits in 1u8..=16) {
        let _ = Decoder::new(bits).unwrap().decode(&data);
    }
}
