//! # LZW encoder and decoder with fixed 16-bit codes
//!
//! This crate provides an [`Encoder`] and a [`Decoder`] for the classic adaptive dictionary LZW
//! scheme over byte streams. Codes are always written as two bytes, most significant byte first,
//! without any header, clear code or end code. The bit length configured on both sides only
//! limits how large the dictionary may grow, that is to `1 << bit_length` entries. It must be
//! communicated out of band: decoding with a different bit length than was used for encoding
//! produces garbage or an error, never a reliable diagnosis.
//!
//! The codes `0..=255` stand for the single bytes. New codes are handed out in increasing order
//! starting at `256`, and both sides stop adding entries once the cap has been reached. For bit
//! lengths of 8 or less the dictionary is frozen from the start and every code is a raw byte.
//!
//! Example use of the encoder and decoder:
//!
//! ```
//! use lzw16::{Decoder, Encoder};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let compressed = Encoder::new(12).unwrap().encode(data).unwrap();
//! let decompressed = Decoder::new(12).unwrap().decode(&compressed).unwrap();
//! assert_eq!(&decompressed[..], &data[..]);
//! ```
#![forbid(unsafe_code)]

/// The largest supported bit length, codes never exceed 16 bits on the wire.
pub const MAX_BIT_LENGTH: u8 = 16;
/// The bit length used when nothing else is configured.
pub const DEFAULT_BIT_LENGTH: u8 = 16;
/// Number of codes that are reserved for the single byte sequences.
pub(crate) const BASE_ENTRIES: usize = 256;
/// The first code assigned to a multi-byte sequence.
pub(crate) const FIRST_FREE_CODE: Code = 256;

/// Alias for a LZW code point
pub type Code = u16;

pub mod channel;
pub mod decode;
pub mod encode;
mod error;
mod table;
mod tree;

pub use crate::decode::Decoder;
pub use crate::encode::Encoder;
pub use crate::error::LzwError;

/// The result of a coding operation on a pair of buffer.
#[must_use = "Contains a status with potential error information"]
pub struct StreamResult {
    /// The number of bytes consumed from the input buffer.
    pub consumed_in: usize,
    /// The number of bytes written into the output buffer.
    pub consumed_out: usize,
    /// The status after returning from the write call.
    pub status: Result<LzwStatus, LzwError>,
}

/// The result of coding into an output stream.
#[must_use = "Contains a status with potential error information"]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The possible error that occurred.
    ///
    /// Note that when writing into streams this may also contain errors of the underlying
    /// writer or reader, as well as coding errors converted with `io::ErrorKind::InvalidData`.
    pub status: std::io::Result<()>,
}

/// The status after successful coding of an LZW stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwStatus {
    /// Everything went well.
    Ok,
    /// No bytes were read or written and no internal state advanced.
    ///
    /// If this is returned but your application can not provide more input data then coding is
    /// definitely stuck for good and it should stop trying and report some error of its own.
    NoProgress,
    /// All input was processed after `finish` and nothing remains to be written.
    Done,
}

/// Hands out new codes, identically on both sides of the stream.
///
/// The encoder and decoder each own one of these. Advancing it after every admitted entry is
/// what keeps both dictionaries in lock-step.
#[derive(Clone, Debug)]
pub(crate) struct CodeCounter {
    /// The code the next admitted entry receives.
    next: Code,
    /// The largest code the configured table may hold, `(1 << bit_length) - 1`.
    last: u32,
    /// Whether the table has been frozen.
    full: bool,
}

impl CodeCounter {
    pub(crate) fn new(bit_length: u8) -> Self {
        let last = (1u32 << bit_length) - 1;
        CodeCounter {
            next: FIRST_FREE_CODE,
            last,
            full: u32::from(FIRST_FREE_CODE) > last,
        }
    }

    /// The code for the next entry, or `None` once frozen.
    pub(crate) fn next(&self) -> Option<Code> {
        if self.full {
            None
        } else {
            Some(self.next)
        }
    }

    /// Account for one admitted entry.
    ///
    /// The entry that took the largest code freezes the table instead of moving on.
    pub(crate) fn advance(&mut self) {
        if self.full {
            return;
        }

        if u32::from(self.next) == self.last {
            self.full = true;
        } else {
            self.next += 1;
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.full
    }

    /// The number of entries the table may hold.
    ///
    /// The single bytes are always present, even when the configured cap is smaller.
    pub(crate) fn capacity(&self) -> usize {
        (self.last as usize + 1).max(BASE_ENTRIES)
    }
}

/// Check a configured bit length.
pub(crate) fn check_bit_length(bit_length: u8) -> Result<u8, LzwError> {
    if bit_length == 0 || bit_length > MAX_BIT_LENGTH {
        Err(LzwError::InvalidBitLength(bit_length))
    } else {
        Ok(bit_length)
    }
}

#[cfg(test)]
mod tests {
    use super::{check_bit_length, CodeCounter, LzwError};

    #[test]
    fn counter_freezes_on_last_code() {
        let mut counter = CodeCounter::new(9);
        assert_eq!(counter.capacity(), 512);
        for expected in 256..512 {
            assert_eq!(counter.next(), Some(expected));
            counter.advance();
        }
        assert!(counter.is_full());
        assert_eq!(counter.next(), None);
    }

    #[test]
    fn small_bit_lengths_start_frozen() {
        for bits in 1..=8 {
            let counter = CodeCounter::new(bits);
            assert!(counter.is_full(), "{}", bits);
            assert_eq!(counter.capacity(), 256);
        }
    }

    #[test]
    fn counter_full_width() {
        let mut counter = CodeCounter::new(16);
        for _ in 256..65536 {
            counter.advance();
        }
        assert!(counter.is_full());
    }

    #[test]
    fn bit_length_range() {
        assert_eq!(check_bit_length(0), Err(LzwError::InvalidBitLength(0)));
        assert_eq!(check_bit_length(17), Err(LzwError::InvalidBitLength(17)));
        assert_eq!(check_bit_length(1), Ok(1));
        assert_eq!(check_bit_length(16), Ok(16));
    }
}
