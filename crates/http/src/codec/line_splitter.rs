//! CRLF line framing over an append-only byte stream.
//!
//! Bytes may arrive in arbitrarily small or misaligned chunks: a line, or even the CR/LF pair
//! itself, can be split across any number of [`LineSplitter::add_data`] calls. Scanning resumes
//! where the previous call stopped, stepping back a single byte so a CR left at the end of the
//! buffer can still pair with an LF that arrives later.
//!
//! A lone CR is ordinary line content. An immediate CRLF yields an empty line.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::ensure;
use crate::protocol::ParseError;

const CRLF: &[u8; 2] = b"\r\n";

/// Decodes one CRLF-terminated line at a time from a shared buffer.
///
/// Consumed lines, terminator included, are split off the front of the buffer; everything
/// after the last complete line is left in place.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    /// Length of the prefix already scanned without finding a terminator
    next_index: usize,
    max_length: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_length(usize::MAX)
    }

    /// A decoder that rejects lines longer than `max_length` bytes, terminator excluded.
    pub fn with_max_length(max_length: usize) -> Self {
        Self { next_index: 0, max_length }
    }

    /// Forgets scan progress; required whenever the buffer is replaced or drained externally.
    pub fn reset(&mut self) {
        self.next_index = 0;
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineDecoder {
    type Item = String;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let from = self.next_index.saturating_sub(1).min(src.len());

        match find_crlf(&src[from..]) {
            Some(offset) => {
                let line_len = from + offset;
                ensure!(line_len <= self.max_length, ParseError::too_large_header(line_len, self.max_length));

                let line = src.split_to(line_len + CRLF.len());
                self.next_index = 0;
                Ok(Some(String::from_utf8_lossy(&line[..line_len]).into_owned()))
            }
            None => {
                self.next_index = src.len();
                // a trailing CR may still turn out to be half of the terminator
                let pending = src.len() - usize::from(src.last() == Some(&b'\r'));
                ensure!(pending <= self.max_length, ParseError::too_large_header(pending, self.max_length));
                Ok(None)
            }
        }
    }
}

#[inline]
fn find_crlf(bytes: &[u8]) -> Option<usize> {
    bytes.windows(CRLF.len()).position(|window| window == CRLF)
}

/// Owns the receive buffer and splits it into lines on demand.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: BytesMut,
    decoder: LineDecoder,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_length(max_length: usize) -> Self {
        Self { buffer: BytesMut::new(), decoder: LineDecoder::with_max_length(max_length) }
    }

    /// Appends a chunk to the internal buffer.
    pub fn add_data(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Pops the next complete line, or `None` when the buffer holds no terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooLargeHeader`] once a line outgrows the configured maximum.
    pub fn next_line(&mut self) -> Result<Option<String>, ParseError> {
        self.decoder.decode(&mut self.buffer)
    }

    /// Iterates over every complete line currently buffered.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { splitter: self, failed: false }
    }

    /// Bytes received after the last complete line.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer
    }

    /// Hands the unconsumed tail to the caller, leaving the splitter empty.
    pub fn take_remaining(&mut self) -> BytesMut {
        self.decoder.reset();
        self.buffer.split()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Iterator returned by [`LineSplitter::lines`]; stops after the first error.
#[derive(Debug)]
pub struct Lines<'a> {
    splitter: &'a mut LineSplitter,
    failed: bool,
}

impl Iterator for Lines<'_> {
    type Item = Result<String, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.splitter.next_line() {
            Ok(line) => line.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
