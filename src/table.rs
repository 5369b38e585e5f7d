//! The decoding dictionary, a table from code to byte sequence.
use core::ops::Range;

use crate::{Code, LzwError, BASE_ENTRIES};

/// All sequences live back to back in one byte arena, each code points at its range.
///
/// Entries are never modified or removed, so a range stays valid for the life of the table.
pub(crate) struct Table {
    bytes: Vec<u8>,
    spans: Vec<Option<Range<usize>>>,
    entries: usize,
    capacity: usize,
}

impl Table {
    /// Create a table mapping the codes `0..=255` to their byte.
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(BASE_ENTRIES);
        let mut table = Table {
            bytes: Vec::new(),
            spans: Vec::with_capacity(capacity),
            entries: 0,
            capacity,
        };

        for byte in 0..=u8::max_value() {
            let inserted = table.insert(Code::from(byte), &[byte]);
            debug_assert!(inserted.is_ok());
        }

        table
    }

    /// Register `sequence` under `code`, replacing a previous entry for the same code.
    pub(crate) fn insert(&mut self, code: Code, sequence: &[u8]) -> Result<(), LzwError> {
        let start = self.bytes.len();
        self.admit(code, start..start + sequence.len())?;
        self.bytes.extend_from_slice(sequence);
        Ok(())
    }

    /// Register the sequence of `prefix` followed by `byte` under `code`.
    ///
    /// Returns `Ok(false)` if `prefix` is unknown.
    pub(crate) fn derive(&mut self, code: Code, prefix: Code, byte: u8) -> Result<bool, LzwError> {
        let prefix = match self.span(prefix) {
            Some(prefix) => prefix,
            None => return Ok(false),
        };

        let start = self.bytes.len();
        self.admit(code, start..start + prefix.len() + 1)?;
        self.bytes.extend_from_within(prefix);
        self.bytes.push(byte);
        Ok(true)
    }

    /// The sequence of `code`.
    pub(crate) fn lookup(&self, code: Code) -> Option<&[u8]> {
        self.span(code).map(|span| &self.bytes[span])
    }

    /// The range of the sequence of `code` within [`Table::bytes`].
    pub(crate) fn span(&self, code: Code) -> Option<Range<usize>> {
        self.spans.get(usize::from(code)).cloned().flatten()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of codes with a sequence.
    pub(crate) fn len(&self) -> usize {
        self.entries
    }

    fn admit(&mut self, code: Code, span: Range<usize>) -> Result<(), LzwError> {
        let idx = usize::from(code);
        let known = matches!(self.spans.get(idx), Some(Some(_)));
        if !known && (self.entries >= self.capacity || idx >= self.capacity) {
            return Err(LzwError::DictionaryFull);
        }

        if idx >= self.spans.len() {
            self.spans.resize(idx + 1, None);
        }
        self.spans[idx] = Some(span);
        if !known {
            self.entries += 1;
        }
        Ok(())
    }
}
