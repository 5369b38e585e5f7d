//! A module for all encoding needs.
use std::io::{self, BufRead, Write};

use crate::channel::{put_code, CODE_BYTES};
use crate::tree::{NodeId, Tree};
use crate::{check_bit_length, AllResult, CodeCounter, LzwError, LzwStatus, StreamResult};

/// The state for encoding data with an LZW algorithm.
///
/// The same structure can be utilized with streams as well as your own buffers and driver logic.
/// It may even be possible to mix them if you are sufficiently careful not to lose any written
/// data in the process.
///
/// One encoder owns one dictionary. It is created with the encoder, grows while data is encoded
/// and only goes away with the encoder or a call to [`Encoder::reset`].
pub struct Encoder {
    state: Box<EncodeState>,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

struct EncodeState {
    /// The configured bit length.
    bit_length: u8,
    /// The current encoding symbol tree.
    tree: Tree,
    /// Assignment of codes to new words.
    counter: CodeCounter,
    /// The longest word matched so far, `None` before the first byte.
    current: Option<NodeId>,
    /// If the end of input has been signalled.
    has_ended: bool,
    /// If the last word has been written after the end of input.
    is_done: bool,
}

impl Encoder {
    /// Create a new encoder whose dictionary may grow to `1 << bit_length` entries.
    ///
    /// The bit length must be within `1..=16`. Values of 8 or less do not leave any room for new
    /// entries, such an encoder only maps every byte to its own code.
    pub fn new(bit_length: u8) -> Result<Self, LzwError> {
        let bit_length = check_bit_length(bit_length)?;
        Ok(Encoder {
            state: Box::new(EncodeState::new(bit_length)),
        })
    }

    /// Encode some bytes from `inp` into `out`.
    ///
    /// Codes are only ever written as a whole. See [`into_stream`] for high-level functions and
    /// [`finish`] for marking the input data as complete.
    ///
    /// [`into_stream`]: #method.into_stream
    /// [`finish`]: #method.finish
    pub fn encode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Encode a whole slice into a vector, starting from a fresh dictionary.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        self.reset();
        self.finish();
        // Every byte emits at most one code.
        let mut output = vec![0; CODE_BYTES * data.len()];
        let result = self.encode_bytes(data, &mut output);
        result.status?;
        output.truncate(result.consumed_out);
        Ok(output)
    }

    /// Construct a encoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Mark the encoding as finished.
    ///
    /// In following calls to `encode_bytes` the encoder will emit the code of the pending word
    /// after encoding all of `inp`. Nothing is emitted for empty input. Once `Done` has been
    /// reported no more input is consumed until [`Encoder::reset`].
    pub fn finish(&mut self) {
        self.state.has_ended = true;
    }

    /// Drop the dictionary and all progress, ready to encode another stream.
    pub fn reset(&mut self) {
        *self.state = EncodeState::new(self.state.bit_length);
    }

    /// The number of entries in the dictionary, including the 256 single bytes.
    pub fn dictionary_len(&self) -> usize {
        self.state.tree.len()
    }

    /// Whether the dictionary stopped admitting new entries.
    pub fn is_frozen(&self) -> bool {
        self.state.counter.is_full()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not emit the last pending word since more data
    /// may continue it.
    pub fn encode(&mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, false)
    }

    /// Encode all data from a reader, including the last pending word.
    pub fn encode_all(mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, true)
    }

    fn encode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream { encoder, writer } = self;
        enum Progress {
            Ok,
            Done,
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut outbuf = vec![0; STREAM_BUF_SIZE];
        let once = move || -> io::Result<Progress> {
            let data = read.fill_buf()?;

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    return Ok(Progress::Done);
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            *read_bytes += result.consumed_in;
            *write_bytes += result.consumed_out;
            read.consume(result.consumed_in);

            let done = result.status?;
            writer.write_all(&outbuf[..result.consumed_out])?;

            match done {
                LzwStatus::Done => Ok(Progress::Done),
                LzwStatus::NoProgress => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "encoder made no progress",
                )),
                LzwStatus::Ok => Ok(Progress::Ok),
            }
        };

        let status = core::iter::repeat_with(once)
            // scan+fuse can be replaced with map_while
            .scan((), |(), result| match result {
                Ok(Progress::Ok) => Some(Ok(())),
                Err(err) => Some(Err(err)),
                Ok(Progress::Done) => None,
            })
            .fuse()
            .collect();

        tracing::debug!(bytes_read, bytes_written, "encoded stream");
        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

/// The size of the intermediate buffer of the stream interfaces.
pub(crate) const STREAM_BUF_SIZE: usize = 1 << 16;

impl EncodeState {
    fn new(bit_length: u8) -> Self {
        let counter = CodeCounter::new(bit_length);
        EncodeState {
            bit_length,
            tree: Tree::new(counter.capacity()),
            counter,
            current: None,
            has_ended: false,
            is_done: false,
        }
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        // The stream is complete, further input belongs to a new one after `reset`.
        if self.is_done {
            return StreamResult {
                consumed_in: 0,
                consumed_out: 0,
                status: Ok(LzwStatus::Done),
            };
        }

        let c_in = inp.len();
        let c_out = out.len();

        while let Some((&byte, rest)) = inp.split_first() {
            let current = match self.current {
                Some(current) => current,
                None => {
                    self.current = Some(self.tree.base(byte));
                    inp = rest;
                    continue;
                }
            };

            if let Some(next) = self.tree.step(current, byte) {
                self.current = Some(next);
                inp = rest;
                continue;
            }

            // The extension is unknown, so `current` is the longest match.
            if !put_code(&mut out, self.tree.code(current)) {
                break;
            }

            self.admit(current, byte);
            self.current = Some(self.tree.base(byte));
            inp = rest;
        }

        if inp.is_empty() && self.has_ended && !self.is_done {
            match self.current {
                Some(current) => {
                    if put_code(&mut out, self.tree.code(current)) {
                        self.current = None;
                        self.is_done = true;
                    }
                }
                None => self.is_done = true,
            }
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        let status = if self.is_done {
            LzwStatus::Done
        } else if consumed_in == 0 && consumed_out == 0 {
            LzwStatus::NoProgress
        } else {
            LzwStatus::Ok
        };

        StreamResult {
            consumed_in,
            consumed_out,
            status: Ok(status),
        }
    }

    /// Add the word at `current` extended by `byte`, unless the dictionary is frozen.
    fn admit(&mut self, current: NodeId, byte: u8) {
        let code = match self.counter.next() {
            Some(code) => code,
            None => return,
        };

        if self.tree.append(current, byte, code).is_err() {
            // Capacity follows the counter, this means the tree is frozen as well.
            return;
        }

        self.counter.advance();
        if self.counter.is_full() {
            tracing::debug!(
                bit_length = self.bit_length,
                entries = self.tree.len(),
                "encoding dictionary frozen"
            );
        }
    }
}
