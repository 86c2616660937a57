//! Low-level byte stream parser for KSM payload decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary
//! reader designed for the sequential, lookahead-driven structure of KSM payloads. It
//! offers bounds-checked access to binary data in both little-endian and big-endian
//! byte order, dynamic-width unsigned reads for file-declared index widths, and the
//! two-byte section-marker lookahead that drives region transitions.
//!
//! # Architecture
//!
//! The parser is a cursor over an immutable byte slice. It provides:
//!
//! - **Position tracking** - every failure reports the offset at which it occurred
//! - **Bounds checking** - all operations validate data availability before reading
//! - **Non-consuming lookahead** - peeks never move the cursor, so section markers
//!   can be recognized before deciding how to decode what follows
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser`] - the cursor itself
//! - [`crate::file::parser::Parser::read_le`] / [`crate::file::parser::Parser::read_be`] -
//!   typed scalar reads
//! - [`crate::file::parser::Parser::read_le_dyn`] / [`crate::file::parser::Parser::read_be_dyn`] -
//!   unsigned reads of a file-declared width
//! - [`crate::file::parser::Parser::peek_bytes`] / [`crate::file::parser::Parser::at_marker`] /
//!   [`crate::file::parser::Parser::expect_marker`] - section-delimiter lookahead
//! - [`crate::file::parser::Parser::read_prefixed_string_utf8`] - length-prefixed UTF-8
//!
//! # Usage Examples
//!
//! ```rust
//! use ksmscope::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04];
//! let mut parser = Parser::new(&data);
//!
//! let value = parser.read_le::<u16>()?;
//! assert_eq!(value, 0x0201);
//! assert_eq!(parser.pos(), 2);
//! # Ok::<(), ksmscope::Error>(())
//! ```
//!
//! ```rust
//! use ksmscope::Parser;
//!
//! // Lookahead: recognize a section marker without consuming it.
//! let data = *b"%Fabc";
//! let mut parser = Parser::new(&data);
//!
//! assert!(parser.at_marker(*b"%F"));
//! assert_eq!(parser.pos(), 0);
//!
//! parser.expect_marker(*b"%F")?;
//! assert_eq!(parser.pos(), 2);
//! # Ok::<(), ksmscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, read_be_at_dyn, read_le_at, read_le_at_dyn, KsmIO},
    Error, Result,
};

/// A bounds-checked cursor for reading KSM payload structures.
///
/// `Parser` provides sequential reads in both little-endian and big-endian formats
/// over an immutable byte slice, plus the non-consuming lookahead that KSM section
/// parsing depends on: every section transition in the format is announced by a
/// two-byte ASCII delimiter (`%A`, `%F`, `%I`, `%M`, `%D`) which must be recognized
/// before being consumed.
///
/// The parser maintains an internal position and validates every access, so
/// truncated or malformed payloads surface as [`crate::Error::EndOfStream`] with
/// the exact offset instead of panicking.
///
/// # Examples
///
/// ```rust
/// use ksmscope::Parser;
///
/// let data = [0x05, 0x00, 0x01];
/// let mut parser = Parser::new(&data);
///
/// let line: u16 = parser.read_le()?;
/// assert_eq!(line, 5);
///
/// let count: u8 = parser.read_le()?;
/// assert_eq!(count, 1);
/// assert!(!parser.has_more_data());
/// # Ok::<(), ksmscope::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// The debug-map parser uses this as its loop condition: end of buffer between
    /// records is the expected terminator of that section.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ksmscope::Parser;
    /// let data = [0x01];
    /// let mut parser = Parser::new(&data);
    /// assert!(parser.has_more_data());
    ///
    /// let _byte = parser.read_le::<u8>()?;
    /// assert!(!parser.has_more_data());
    /// # Ok::<(), ksmscope::Error>(())
    /// ```
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes left between the current position and the end.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if the position is at or beyond the
    /// data length.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(Error::EndOfStream {
                offset: self.position,
            });
        }
        Ok(self.data[self.position])
    }

    /// Peek at the next `count` bytes without advancing the position.
    ///
    /// # Arguments
    /// * `count` - Number of bytes to look ahead
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if fewer than `count` bytes remain.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ksmscope::Parser;
    /// let data = [0x25, 0x46, 0x4E];
    /// let parser = Parser::new(&data);
    ///
    /// assert_eq!(parser.peek_bytes(2)?, b"%F");
    /// assert_eq!(parser.pos(), 0);
    /// # Ok::<(), ksmscope::Error>(())
    /// ```
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.position + count > self.data.len() {
            return Err(Error::EndOfStream {
                offset: self.position,
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Returns `true` if the next two bytes equal the given section marker.
    ///
    /// Non-consuming. With fewer than two bytes remaining this reports `false`
    /// rather than failing; the caller's subsequent read then reports the
    /// truncation at a deterministic offset.
    #[must_use]
    pub fn at_marker(&self, marker: [u8; 2]) -> bool {
        match self.peek_bytes(2) {
            Ok(bytes) => bytes == marker,
            Err(_) => false,
        }
    }

    /// Consume the given two-byte section marker.
    ///
    /// On mismatch the cursor stays at the offending bytes, so the reported offset
    /// is reproducible and no partial advance occurs.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionOrder`] if the next two bytes are not
    /// `marker`, or [`crate::Error::EndOfStream`] if fewer than two bytes remain.
    pub fn expect_marker(&mut self, marker: [u8; 2]) -> Result<()> {
        let found = self.peek_bytes(2)?;
        if found != marker {
            return Err(Error::SectionOrder {
                expected: marker,
                found: [found[0], found[1]],
                offset: self.position,
            });
        }

        self.position += 2;
        Ok(())
    }

    /// Read a value of type `T` in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if reading `T` would exceed the data
    /// length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ksmscope::Parser;
    /// let data = [0x34, 0x12];
    /// let mut parser = Parser::new(&data);
    ///
    /// let value: u16 = parser.read_le()?;
    /// assert_eq!(value, 0x1234);
    /// # Ok::<(), ksmscope::Error>(())
    /// ```
    pub fn read_le<T: KsmIO>(&mut self) -> Result<T> {
        read_le_at(self.data, &mut self.position)
    }

    /// Read a value of type `T` in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if reading `T` would exceed the data
    /// length.
    pub fn read_be<T: KsmIO>(&mut self) -> Result<T> {
        read_be_at(self.data, &mut self.position)
    }

    /// Read an unsigned little-endian integer of `width` bytes and advance.
    ///
    /// Instruction operand indices use the width declared in the argument-section
    /// header; `width` must lie in `1..=8`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if fewer than `width` bytes remain.
    pub fn read_le_dyn(&mut self, width: usize) -> Result<u64> {
        read_le_at_dyn(self.data, &mut self.position, width)
    }

    /// Read an unsigned big-endian integer of `width` bytes and advance.
    ///
    /// Debug-map range offsets are the big-endian exception of the format;
    /// `width` must lie in `1..=8`.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if fewer than `width` bytes remain.
    pub fn read_be_dyn(&mut self, width: usize) -> Result<u64> {
        read_be_at_dyn(self.data, &mut self.position, width)
    }

    /// Read `length` bytes as a contiguous slice of the underlying buffer.
    ///
    /// # Arguments
    /// * `length` - Number of bytes to read
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        if self.position + length > self.data.len() {
            return Err(Error::EndOfStream {
                offset: self.position,
            });
        }

        let start = self.position;
        self.position += length;
        Ok(&self.data[start..start + length])
    }

    /// Read a length-prefixed UTF-8 string and advance the position.
    ///
    /// The length is a single unsigned byte immediately preceding the payload, as
    /// used by the STRING and STRING_VALUE argument tags.
    ///
    /// # Errors
    /// Returns [`crate::Error::EndOfStream`] if the buffer ends inside the prefix
    /// or payload, or [`crate::Error::InvalidEncoding`] if the payload is not
    /// valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ksmscope::Parser;
    /// let data = [0x03, b'a', b'b', b'c'];
    /// let mut parser = Parser::new(&data);
    ///
    /// assert_eq!(parser.read_prefixed_string_utf8()?, "abc");
    /// assert_eq!(parser.pos(), 4);
    /// # Ok::<(), ksmscope::Error>(())
    /// ```
    pub fn read_prefixed_string_utf8(&mut self) -> Result<String> {
        let length = self.read_le::<u8>()?;
        let offset = self.position;
        let bytes = self.read_bytes(length as usize)?;

        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_owned()),
            Err(source) => Err(Error::InvalidEncoding { offset, source }),
        }
    }
}
