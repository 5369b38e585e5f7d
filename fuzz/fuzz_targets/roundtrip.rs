#![no_main]
use libfuzzer_sys::fuzz_target;
use lzw16::{Decoder, Encoder};

fuzz_target!(|input: (u8, &[u8])| {
    let (bits, data) = input;
    let bits = 1 + bits % 16;
    let encoded = Encoder::new(bits).unwrap().encode(data).unwrap();
    let decoded = Decoder::new(bits).unwrap().decode(&encoded);
    assert_eq!(decoded.as_deref(), Ok(data));
});
