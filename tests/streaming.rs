use lzw16::{Decoder, Encoder, LzwStatus};

const TEXT: &[u8] = b"It was the best of times, it was the worst of times, it was the age of \
    wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch of \
    incredulity, it was the season of Light, it was the season of Darkness";

/// Drive the encoder with `chunk` input bytes and `room` output bytes per call.
fn encode_chunked(data: &[u8], bits: u8, chunk: usize, room: usize) -> Vec<u8> {
    let mut encoder = Encoder::new(bits).unwrap();
    let mut encoded = vec![];
    let mut target = vec![0u8; room];
    let mut inp = data;
    loop {
        let part = &inp[..inp.len().min(chunk)];
        if part.is_empty() {
            encoder.finish();
        }
        let result = encoder.encode_bytes(part, &mut target);
        inp = &inp[result.consumed_in..];
        encoded.extend_from_slice(&target[..result.consumed_out]);
        match result.status.unwrap() {
            LzwStatus::Done => return encoded,
            LzwStatus::NoProgress if room < 2 => panic!("no room for a code"),
            _ => {}
        }
    }
}

fn decode_chunked(data: &[u8], bits: u8, chunk: usize, room: usize) -> Vec<u8> {
    let mut decoder = Decoder::new(bits).unwrap();
    let mut decoded = vec![];
    let mut target = vec![0u8; room];
    let mut inp = data;
    loop {
        let part = &inp[..inp.len().min(chunk)];
        if part.is_empty() {
            decoder.finish();
        }
        let result = decoder.decode_bytes(part, &mut target);
        inp = &inp[result.consumed_in..];
        decoded.extend_from_slice(&target[..result.consumed_out]);
        if let LzwStatus::Done = result.status.unwrap() {
            return decoded;
        }
    }
}

#[test]
fn encode_any_split() {
    let whole = Encoder::new(12).unwrap().encode(TEXT).unwrap();
    for &(chunk, room) in &[(1, 2), (1, 3), (3, 2), (7, 5), (1000, 2), (1, 1000)] {
        assert_eq!(encode_chunked(TEXT, 12, chunk, room), whole, "{} {}", chunk, room);
    }
}

#[test]
fn decode_any_split() {
    let encoded = Encoder::new(12).unwrap().encode(TEXT).unwrap();
    for &(chunk, room) in &[(1, 1), (1, 7), (3, 1), (5, 2), (1000, 1), (1, 1000)] {
        assert_eq!(decode_chunked(&encoded, 12, chunk, room), TEXT, "{} {}", chunk, room);
    }
}

#[test]
fn encoder_without_room() {
    let mut encoder = Encoder::new(12).unwrap();
    let result = encoder.encode_bytes(b"abc", &mut []);
    // The first byte never needs output.
    assert_eq!(result.consumed_in, 1);
    let result = encoder.encode_bytes(b"bc", &mut []);
    assert_eq!(result.consumed_in, 0);
    assert_eq!(result.status, Ok(LzwStatus::NoProgress));
}

#[test]
fn stream_in_parts() {
    let (head, tail) = TEXT.split_at(TEXT.len() / 3);

    let mut encoder = Encoder::new(16).unwrap();
    let mut encoded = vec![];
    let mut stream = encoder.into_stream(&mut encoded);
    assert!(stream.encode(head).status.is_ok());
    assert!(stream.encode_all(tail).status.is_ok());
    assert_eq!(encoded, Encoder::new(16).unwrap().encode(TEXT).unwrap());

    // Split inside a code on purpose.
    let (head, tail) = encoded.split_at(encoded.len() / 2 | 1);
    let mut decoder = Decoder::new(16).unwrap();
    let mut decoded = vec![];
    let mut stream = decoder.into_stream(&mut decoded);
    let result = stream.decode(head);
    assert!(result.status.is_ok());
    assert_eq!(result.bytes_read, head.len());
    assert!(stream.decode_all(tail).status.is_ok());
    assert_eq!(decoded, TEXT);
}

#[test]
fn stream_decode_flushes_long_output() {
    // A run of one byte yields words of growing length, so for these sizes the last word
    // crosses the boundary of the internal output buffer.
    for len in (65_530..65_900).step_by(7) {
        let data = vec![b'a'; len];
        let encoded = Encoder::new(16).unwrap().encode(&data).unwrap();

        let mut decoder = Decoder::new(16).unwrap();
        let mut decoded = vec![];
        let result = decoder.into_stream(&mut decoded).decode(&encoded[..]);
        assert!(result.status.is_ok(), "{}", len);
        assert_eq!(result.bytes_read, encoded.len(), "{}", len);
        assert_eq!(result.bytes_written, len, "{}", len);
        assert_eq!(decoded.len(), len, "{}", len);
        assert!(decoded.iter().all(|&byte| byte == b'a'));
    }
}
