//! A module for all decoding needs.
use core::ops::Range;
use std::io::{self, BufRead, Write};

use crate::channel::CodeBuffer;
use crate::encode::STREAM_BUF_SIZE;
use crate::table::Table;
use crate::{check_bit_length, AllResult, Code, CodeCounter, LzwError, LzwStatus, StreamResult};

/// The state for decoding data with an LZW algorithm.
///
/// The same structure can be utilized with streams as well as your own buffers and driver logic.
/// It may even be possible to mix them if you are sufficiently careful not to lose or skip any
/// already decode data in the process.
///
/// The stream has no end marker. Call [`Decoder::finish`] once all input has been supplied to
/// learn whether it ended on a code boundary.
pub struct Decoder {
    state: Box<DecodeState>,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

struct DecodeState {
    /// The configured bit length.
    bit_length: u8,
    /// The table of decoded codes.
    table: Table,
    /// Assignment of codes, in lock-step with the encoder.
    counter: CodeCounter,
    /// The code of the previously decoded word, `None` before the first code.
    previous: Option<Code>,
    /// The part of the last word, within the table bytes, that was not written yet.
    pending: Range<usize>,
    /// Input bytes that did not make up a whole code yet.
    buffer: CodeBuffer,
    /// If the end of input has been signalled.
    has_ended: bool,
}

impl Decoder {
    /// Create a new decoder whose dictionary may grow to `1 << bit_length` entries.
    ///
    /// This must be the bit length the data was encoded with.
    pub fn new(bit_length: u8) -> Result<Self, LzwError> {
        let bit_length = check_bit_length(bit_length)?;
        Ok(Decoder {
            state: Box::new(DecodeState::new(bit_length)),
        })
    }

    /// Decode some bytes from `inp` and write result to `out`.
    ///
    /// This will consume a prefix of the input buffer and write decoded output into a prefix of
    /// the output buffer. See the respective fields of the return value for the count of consumed
    /// and written bytes. For the next call you should have adjusted the inputs accordingly.
    ///
    /// The input may end within a code, that byte is kept until the next call.
    pub fn decode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Decode a whole slice into a vector, starting from a fresh dictionary.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        self.reset();
        self.finish();

        let mut output = vec![];
        let mut outbuf = vec![0; STREAM_BUF_SIZE];
        let mut inp = data;
        loop {
            let result = self.decode_bytes(inp, &mut outbuf);
            inp = &inp[result.consumed_in..];
            output.extend_from_slice(&outbuf[..result.consumed_out]);
            match result.status? {
                LzwStatus::Done => return Ok(output),
                // With a non-empty buffer every call writes, consumes, or is done.
                LzwStatus::Ok | LzwStatus::NoProgress => {}
            }
        }
    }

    /// Construct a decoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Mark the input as complete.
    ///
    /// Once all input is consumed, the next call to `decode_bytes` reports `Done`, or
    /// [`LzwError::TruncatedInput`] if the input ended in the middle of a code. In the latter case
    /// the dangling byte is dropped and any later call reports `Done`.
    pub fn finish(&mut self) {
        self.state.has_ended = true;
    }

    /// Drop the dictionary and all progress, ready to decode another stream.
    pub fn reset(&mut self) {
        *self.state = DecodeState::new(self.state.bit_length);
    }

    /// The number of entries in the dictionary, including the 256 single bytes.
    pub fn dictionary_len(&self) -> usize {
        self.state.table.len()
    }

    /// Whether the dictionary stopped admitting new entries.
    pub fn is_frozen(&self) -> bool {
        self.state.counter.is_full()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decode data from a reader.
    ///
    /// This will read data until the stream is empty and write out every complete word. A
    /// dangling half code stays buffered.
    pub fn decode(&mut self, read: impl BufRead) -> AllResult {
        self.decode_part(read, false)
    }

    /// Decode data from a reader, requiring the stream to end on a code boundary.
    ///
    /// All data decoded before a truncated code is written before the error is returned.
    pub fn decode_all(mut self, read: impl BufRead) -> AllResult {
        self.decode_part(read, true)
    }

    fn decode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream { decoder, writer } = self;

        enum Progress {
            Ok,
            Done,
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        // Hack to avoid `FnMut` closure capturing the count and borrowing it mutably.
        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut outbuf = vec![0; STREAM_BUF_SIZE];
        let once = move || -> io::Result<Progress> {
            // Try to grab one buffer of input data.
            let data = read.fill_buf()?;

            if data.is_empty() {
                if finish {
                    decoder.finish();
                } else {
                    // The last word may not have fit into the buffer, flush it before stopping.
                    let result = decoder.decode_bytes(&[], &mut outbuf[..]);
                    *write_bytes += result.consumed_out;
                    writer.write_all(&outbuf[..result.consumed_out])?;
                    result.status?;
                    return Ok(if result.consumed_out == 0 {
                        Progress::Done
                    } else {
                        Progress::Ok
                    });
                }
            }

            // Decode as much of the buffer as fits.
            let result = decoder.decode_bytes(data, &mut outbuf[..]);
            // Do the bookkeeping and consume the buffer.
            *read_bytes += result.consumed_in;
            *write_bytes += result.consumed_out;
            read.consume(result.consumed_in);

            // Output everything before looking at the status.
            writer.write_all(&outbuf[..result.consumed_out])?;

            match result.status? {
                LzwStatus::Done => Ok(Progress::Done),
                LzwStatus::NoProgress => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "No more data but the decoder made no progress",
                )),
                LzwStatus::Ok => Ok(Progress::Ok),
            }
        };

        // Decode chunks of input data until we're done.
        let status = core::iter::repeat_with(once)
            // scan+fuse can be replaced with map_while
            .scan((), |(), result| match result {
                Ok(Progress::Ok) => Some(Ok(())),
                Err(err) => Some(Err(err)),
                Ok(Progress::Done) => None,
            })
            .fuse()
            .collect();

        tracing::debug!(bytes_read, bytes_written, "decoded stream");
        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl DecodeState {
    fn new(bit_length: u8) -> Self {
        let counter = CodeCounter::new(bit_length);
        DecodeState {
            bit_length,
            table: Table::new(counter.capacity()),
            counter,
            previous: None,
            pending: 0..0,
            buffer: CodeBuffer::default(),
            has_ended: false,
        }
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        let c_in = inp.len();
        let c_out = out.len();
        let mut status = Ok(LzwStatus::Ok);

        loop {
            if !self.pending.is_empty() {
                let remain = &self.table.bytes()[self.pending.clone()];
                let count = remain.len().min(out.len());
                let (into, tail) = core::mem::replace(&mut out, &mut []).split_at_mut(count);
                into.copy_from_slice(&remain[..count]);
                out = tail;
                self.pending.start += count;

                if !self.pending.is_empty() {
                    break;
                }
            }

            let code = match self.buffer.take_code(&mut inp) {
                Some(code) => code,
                None => break,
            };

            match self.next_word(code) {
                Ok(word) => self.pending = word,
                Err(err) => {
                    status = Err(err);
                    break;
                }
            }
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();

        if status.is_ok() && self.has_ended && inp.is_empty() && self.pending.is_empty() {
            if self.buffer.has_partial() {
                self.buffer.discard();
                tracing::warn!("code stream ends inside a code, dropping the trailing byte");
                status = Err(LzwError::TruncatedInput);
            } else {
                status = Ok(LzwStatus::Done);
            }
        } else if status.is_ok() && consumed_in == 0 && consumed_out == 0 {
            status = Ok(LzwStatus::NoProgress);
        }

        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    /// Decode one code, extending the table, and return the range of its word.
    fn next_word(&mut self, code: Code) -> Result<Range<usize>, LzwError> {
        let previous = match self.previous {
            Some(previous) => previous,
            None => {
                // Nothing to derive a word from, the first code must be a single byte.
                let word = self.table.span(code).ok_or(LzwError::InvalidCode(code))?;
                self.previous = Some(code);
                return Ok(word);
            }
        };

        let first = match self.table.lookup(code) {
            Some(word) => word[0],
            // The encoder used the code it assigned right before. That word is the previous one
            // followed by its own first byte.
            None if self.counter.next() == Some(code) => match self.table.lookup(previous) {
                Some(word) => word[0],
                None => return Err(LzwError::InvalidCode(code)),
            },
            None => return Err(LzwError::InvalidCode(code)),
        };

        if let Some(next) = self.counter.next() {
            if let Ok(true) = self.table.derive(next, previous, first) {
                self.counter.advance();
                if self.counter.is_full() {
                    tracing::debug!(
                        bit_length = self.bit_length,
                        entries = self.table.len(),
                        "decoding dictionary frozen"
                    );
                }
            }
        }

        self.previous = Some(code);
        self.table.span(code).ok_or(LzwError::InvalidCode(code))
    }
}
