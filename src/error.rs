use std::io;

use thiserror::Error;

use crate::Code;

/// The error kind after unsuccessful coding of an LZW stream.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwError {
    /// The configured bit length is not within `1..=16`.
    #[error("bit length {0} is not supported, expected a value from 1 to 16")]
    InvalidBitLength(u8),

    /// The input contained a code that the dictionary can not know at this point.
    ///
    /// This is also the error for a first code that is not a single byte.
    #[error("invalid code {0} in the code stream")]
    InvalidCode(Code),

    /// The code stream ended in the middle of a code.
    ///
    /// Everything decoded up to the last complete code has been delivered.
    #[error("code stream is truncated, one trailing byte does not form a code")]
    TruncatedInput,

    /// A dictionary was asked to admit an entry beyond its capacity.
    #[error("dictionary is full")]
    DictionaryFull,
}

impl From<LzwError> for io::Error {
    fn from(err: LzwError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}
