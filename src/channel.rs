//! The code channel: codes as two bytes, most significant byte first.
//!
//! The width on the wire does not depend on the configured bit length, every code occupies
//! exactly [`CODE_BYTES`] bytes. The stream has no header and no terminator.
use std::io::{self, Read, Write};

use crate::{Code, LzwError};

/// The number of bytes of one code on the wire.
pub const CODE_BYTES: usize = 2;

/// Put one code at the front of `out` and advance it.
///
/// Returns `false` without writing anything if less than a full code fits.
pub(crate) fn put_code(out: &mut &mut [u8], code: Code) -> bool {
    if out.len() < CODE_BYTES {
        return false;
    }

    let (bytes, tail) = core::mem::replace(out, &mut []).split_at_mut(CODE_BYTES);
    bytes.copy_from_slice(&code.to_be_bytes());
    *out = tail;
    true
}

/// Reassembles codes from input slices that may end inside a code.
#[derive(Default, Debug)]
pub(crate) struct CodeBuffer {
    /// The high byte of a code whose low byte has not been seen yet.
    high: Option<u8>,
}

impl CodeBuffer {
    /// Take the next complete code from `inp`, advancing it.
    ///
    /// A single remaining byte is consumed and kept for the next call.
    pub(crate) fn take_code(&mut self, inp: &mut &[u8]) -> Option<Code> {
        loop {
            let (&byte, rest) = inp.split_first()?;
            *inp = rest;
            match self.high.take() {
                Some(high) => return Some(u16::from_be_bytes([high, byte])),
                None => self.high = Some(byte),
            }
        }
    }

    /// Whether half a code is buffered.
    pub(crate) fn has_partial(&self) -> bool {
        self.high.is_some()
    }

    /// Drop a buffered half code.
    pub(crate) fn discard(&mut self) {
        self.high = None;
    }
}

/// Writes codes into an `io::Write`.
pub struct CodeWriter<W> {
    inner: W,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(inner: W) -> Self {
        CodeWriter { inner }
    }

    pub fn write_code(&mut self, code: Code) -> io::Result<()> {
        self.inner.write_all(&code.to_be_bytes())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads codes from an `io::Read`.
pub struct CodeReader<R> {
    inner: R,
}

impl<R: Read> CodeReader<R> {
    pub fn new(inner: R) -> Self {
        CodeReader { inner }
    }

    /// Read the next code.
    ///
    /// Returns `Ok(None)` when the reader is exhausted on a code boundary. A single trailing byte
    /// is reported as [`LzwError::TruncatedInput`] with `io::ErrorKind::InvalidData`.
    pub fn read_code(&mut self) -> io::Result<Option<Code>> {
        let mut bytes = [0u8; CODE_BYTES];
        let mut filled = 0;
        while filled < CODE_BYTES {
            match self.inner.read(&mut bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }

        match filled {
            0 => Ok(None),
            CODE_BYTES => Ok(Some(u16::from_be_bytes(bytes))),
            _ => Err(LzwError::TruncatedInput.into()),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for CodeReader<R> {
    type Item = io::Result<Code>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_code().transpose()
    }
}
