////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Backtracking parse input.
////////////////////////////////////////////////////////////////////////////////

// External library imports.
use encoding_rs_io::DecodeReaderBytes;
use tracing::event;
use tracing::Level;

// Standard library imports.
use std::io::Read;


////////////////////////////////////////////////////////////////////////////////
// Source
////////////////////////////////////////////////////////////////////////////////
/// A backtracking parse input.
///
/// Every `char` ever pulled from the underlying text is retained in an
/// append-only buffer, so the cursor can be restored to any earlier offset
/// and failed regions can be redisplayed. Positions are `char` offsets into
/// the buffer.
pub struct Source {
    /// Every unit read from the input so far.
    chars: Vec<char>,
    /// The current read position.
    cursor: usize,
    /// The remaining streamed input, if any. `None` once exhausted.
    reader: Option<Box<dyn Read>>,
    /// Decoded bytes not yet forming a complete `char`.
    pending: Vec<u8>,
}

impl Source {
    /// Constructs a new `Source` over the given text.
    pub fn new<S>(text: S) -> Self
        where S: AsRef<str>
    {
        Source {
            chars: text.as_ref().chars().collect(),
            cursor: 0,
            reader: None,
            pending: Vec::new(),
        }
    }

    /// Constructs a new `Source` over a streamed input. The stream is decoded
    /// as UTF-8 and pulled lazily; every unit read is cached so restores
    /// remain valid.
    pub fn from_reader<R>(reader: R) -> Self
        where R: Read + 'static
    {
        Source {
            chars: Vec::new(),
            cursor: 0,
            reader: Some(Box::new(DecodeReaderBytes::new(reader))),
            pending: Vec::new(),
        }
    }

    /// Returns the current cursor offset.
    pub fn pos(&self) -> usize {
        self.cursor
    }

    /// Restores the cursor to the given offset. The offset must not exceed
    /// the buffered length.
    pub fn restore_to(&mut self, pos: usize) {
        assert!(pos <= self.chars.len(),
            "restore offset {} exceeds buffered length {}",
            pos, self.chars.len());
        self.cursor = pos;
    }

    /// Returns true if the cursor is at the logical end of the input.
    pub fn at_end(&mut self) -> bool {
        self.fill_to(self.cursor + 1);
        self.cursor >= self.chars.len()
    }

    /// Reads up to `n` units, advancing the cursor past them.
    pub fn read(&mut self, n: usize) -> String {
        self.fill_to(self.cursor + n);
        let end = self.chars.len().min(self.cursor + n);
        let text: String = self.chars[self.cursor..end].iter().collect();
        self.cursor = end;
        text
    }

    /// Reads everything remaining, advancing the cursor to the end.
    pub fn read_all(&mut self) -> String {
        self.fill_all();
        let text: String = self.chars[self.cursor..].iter().collect();
        self.cursor = self.chars.len();
        text
    }

    /// Reads up to `n` units without advancing the cursor.
    pub fn peek(&mut self, n: usize) -> String {
        self.fill_to(self.cursor + n);
        let end = self.chars.len().min(self.cursor + n);
        self.chars[self.cursor..end].iter().collect()
    }

    /// Returns the unit under the cursor without advancing.
    pub fn peek_char(&mut self) -> Option<char> {
        self.fill_to(self.cursor + 1);
        self.chars.get(self.cursor).copied()
    }

    /// Reads a single unit, advancing the cursor past it.
    pub fn next_char(&mut self) -> Option<char> {
        self.fill_to(self.cursor + 1);
        let c = self.chars.get(self.cursor).copied();
        if c.is_some() { self.cursor += 1; }
        c
    }

    /// Returns the text between the given offsets. Offsets beyond the buffer
    /// are clamped.
    pub(crate) fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Returns the 1-based line number and 0-based column of the given
    /// offset, reconstructed by counting newlines in the preceding text.
    pub fn line_col(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.chars.len());
        let mut line = 1;
        let mut line_start = 0;
        for (idx, c) in self.chars[..pos].iter().enumerate() {
            if *c == '\n' {
                line += 1;
                line_start = idx + 1;
            }
        }
        (line, pos - line_start)
    }

    /// Returns the start and end offsets of the line containing the given
    /// offset. The end offset excludes the line terminator.
    pub(crate) fn line_bounds(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.chars.len());
        let start = self.chars[..pos].iter()
            .rposition(|c| *c == '\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let end = self.chars[pos..].iter()
            .position(|c| *c == '\n')
            .map(|idx| pos + idx)
            .unwrap_or(self.chars.len());
        (start, end)
    }

    /// Pulls from the stream until the line containing the given offset is
    /// fully buffered, so it can be displayed in a diagnostic.
    pub(crate) fn fill_through_line(&mut self, pos: usize) {
        let mut idx = pos;
        loop {
            self.fill_to(idx + 1);
            match self.chars.get(idx) {
                None | Some('\n') => break,
                Some(_) => idx += 1,
            }
        }
    }

    /// Pulls from the stream until at least `len` units are buffered or the
    /// stream is exhausted.
    fn fill_to(&mut self, len: usize) {
        while self.chars.len() < len && self.pull_chunk() {}
    }

    /// Pulls the entire remaining stream into the buffer.
    fn fill_all(&mut self) {
        while self.pull_chunk() {}
    }

    /// Pulls one chunk from the stream, returning false once exhausted.
    fn pull_chunk(&mut self) -> bool {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return false,
        };

        let mut buf = [0u8; 4096];
        match reader.read(&mut buf) {
            Ok(0) => {
                self.reader = None;
                false
            },
            Ok(n) => {
                self.pending.extend_from_slice(&buf[..n]);
                self.decode_pending();
                true
            },
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => true,
            Err(e) => {
                // A read error ends the input; the parse sees EOF here.
                event!(Level::WARN, "input stream error: {}", e);
                self.reader = None;
                false
            },
        }
    }

    /// Moves every complete `char` in the pending bytes into the buffer.
    fn decode_pending(&mut self) {
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) => e.valid_up_to(),
        };
        if valid > 0 {
            if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
                self.chars.extend(text.chars());
            }
            let _ = self.pending.drain(..valid);
        }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::new(text)
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::new(text)
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("cursor", &self.cursor)
            .field("buffered", &self.chars.len())
            .field("streaming", &self.reader.is_some())
            .finish()
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_and_restore() {
        let mut source = Source::new("abcdef");
        assert_eq!(source.read(3), "abc");
        assert_eq!(source.pos(), 3);

        source.restore_to(1);
        assert_eq!(source.read(2), "bc");
        assert_eq!(source.read_all(), "def");
        assert!(source.at_end());
    }

    #[test]
    fn peek_does_not_advance() {
        let mut source = Source::new("abc");
        assert_eq!(source.peek(2), "ab");
        assert_eq!(source.pos(), 0);
        assert_eq!(source.peek_char(), Some('a'));
        assert_eq!(source.read(5), "abc");
        assert!(source.at_end());
    }

    #[test]
    fn line_col_reconstruction() {
        let source = Source::new("ab\ncde\nf");
        assert_eq!(source.line_col(0), (1, 0));
        assert_eq!(source.line_col(2), (1, 2));
        assert_eq!(source.line_col(3), (2, 0));
        assert_eq!(source.line_col(5), (2, 2));
        assert_eq!(source.line_col(7), (3, 0));
    }

    #[test]
    fn line_bounds() {
        let source = Source::new("ab\ncde\nf");
        assert_eq!(source.line_bounds(0), (0, 2));
        assert_eq!(source.line_bounds(4), (3, 6));
        assert_eq!(source.line_bounds(7), (7, 8));
    }

    #[test]
    fn streamed_input_restores() {
        let mut source = Source::from_reader(
            std::io::Cursor::new("hello world".as_bytes().to_vec()));
        assert_eq!(source.read(5), "hello");
        source.restore_to(0);
        assert_eq!(source.read_all(), "hello world");
        assert!(source.at_end());
    }

    #[test]
    fn streamed_multibyte_input() {
        let mut source = Source::from_reader(
            std::io::Cursor::new("aβc".as_bytes().to_vec()));
        assert_eq!(source.read(2), "aβ");
        assert_eq!(source.read(2), "c");
        assert!(source.at_end());
    }
}
