//! Content-stream accumulator.
//!
//! Producers assemble one drawing operation's operator sequence in a
//! [`ContentBuffer`] before committing it to the document as a stream
//! object. Short sequences (a line, a small piece of text) stay in the
//! inline buffer; longer ones spill to the heap.

use smallvec::SmallVec;
use std::fmt;

use crate::error::{Error, Result};

/// Bytes kept inline before spilling to the heap.
const INLINE_CAPACITY: usize = 128;

/// Growable byte buffer with small-buffer optimization, used to build
/// content-stream operator text and raw image object bodies.
///
/// Text is appended with [`push_str`] or `write!`; binary payloads (which
/// may contain NUL bytes) with [`push_bytes`]. Length is tracked
/// explicitly, so binary content is never truncated.
///
/// [`push_str`]: ContentBuffer::push_str
/// [`push_bytes`]: ContentBuffer::push_bytes
///
/// # Example
///
/// ```
/// use pdf_scribe::ContentBuffer;
///
/// let mut ops = ContentBuffer::new();
/// write!(ops, "BT {} {} TD ", 72, 720);
/// ops.push_str("(Hello) Tj ET");
/// assert!(ops.as_str().unwrap().starts_with("BT 72 720 TD"));
/// ```
#[derive(Debug, Default)]
pub struct ContentBuffer {
    buf: SmallVec<[u8; INLINE_CAPACITY]>,
}

impl ContentBuffer {
    /// Create an empty buffer. Nothing is heap-allocated until the
    /// content outgrows the inline capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text.
    pub fn push_str(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
    }

    /// Append raw bytes (may contain NUL).
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Formatted append; the sink target of `write!`.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        struct Sink<'a>(&'a mut ContentBuffer);
        impl fmt::Write for Sink<'_> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.0.push_str(s);
                Ok(())
            }
        }
        // Formatting primitives into an infallible sink cannot fail
        let _ = fmt::Write::write_fmt(&mut Sink(self), args);
    }

    /// Reserve room for `additional` bytes up front, reporting
    /// allocation failure instead of aborting.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.buf
            .try_reserve(additional)
            .map_err(|err| Error::OutOfMemory(err.to_string()))
    }

    /// Number of bytes accumulated.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The accumulated content as text, for committing via
    /// [`crate::Document::add_stream`]. Fails if binary bytes were
    /// appended.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.buf)
            .map_err(|err| Error::InvalidArgument(format!("content stream is not UTF-8: {}", err)))
    }

    /// Consume the buffer, returning the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_vec()
    }
}
