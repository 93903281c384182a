//! Cursor-based binary parser for class file structures.
//!
//! [`crate::file::parser::Parser`] walks a byte slice front to back, reading big-endian
//! integers, raw byte runs and modified UTF-8 strings with bounds checking on every access.
//! It is used by the constant pool, attribute and annotation readers and, over the bytes of a
//! signature string, by the signature tokenizer.
//!
//! # Examples
//!
//! ```rust
//! use classpool::Parser;
//!
//! let data = [0x00, 0x03, b'f', b'o', b'o', 0x2A];
//! let mut parser = Parser::new(&data);
//!
//! let length = parser.read_be::<u16>()?;
//! assert_eq!(parser.read_utf8(length as usize)?, "foo");
//! assert_eq!(parser.read_be::<u8>()?, 0x2A);
//! assert!(!parser.has_more_data());
//! # Ok::<(), classpool::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ClassIO},
    Result,
};

/// A generic binary data parser for reading class file structures.
///
/// `Parser` maintains an internal position cursor and provides bounds checking to prevent
/// buffer overruns when reading malformed or truncated data.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new `Parser` from a byte slice, positioned at offset 0.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if there is more data to parse
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes left between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the cursor to an absolute position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` lies past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the end of the data was reached.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move the position forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `step` bytes remain.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        self.position += step;
        Ok(())
    }

    /// Current cursor position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Peek at the byte under the cursor without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or(out_of_bounds_error!())
    }

    /// Read a big-endian value of type `T` and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data remains.
    pub fn read_be<T: ClassIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `len` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Read `len` bytes of modified UTF-8 and decode them into a `String`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncation or [`crate::Error::Malformed`]
    /// if the bytes are not valid modified UTF-8.
    pub fn read_utf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        decode_modified_utf8(bytes)
    }

    /// Run `f` and restore the cursor if it fails.
    ///
    /// # Errors
    /// Propagates the error returned by `f`.
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let origin = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = origin;
        }
        result
    }
}

/// Decode the modified UTF-8 encoding used by `CONSTANT_Utf8` entries.
///
/// The encoding differs from standard UTF-8 in two places: `U+0000` is written as the two
/// byte sequence `C0 80`, and supplementary characters are written as a surrogate pair with
/// each half encoded as three bytes.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for invalid lead or continuation bytes and for unpaired
/// surrogates.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if bytes.is_ascii() && !bytes.contains(&0) {
        return Ok(bytes.iter().map(|&b| b as char).collect());
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let lead = bytes[index];
        match lead {
            0x01..=0x7F => {
                units.push(u16::from(lead));
                index += 1;
            }
            0xC0..=0xDF => {
                let next = continuation(bytes, index + 1)?;
                units.push((u16::from(lead & 0x1F) << 6) | next);
                index += 2;
            }
            0xE0..=0xEF => {
                let second = continuation(bytes, index + 1)?;
                let third = continuation(bytes, index + 2)?;
                units.push((u16::from(lead & 0x0F) << 12) | (second << 6) | third);
                index += 3;
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 byte 0x{:02X} at offset {}",
                    lead,
                    index
                ))
            }
        }
    }

    String::from_utf16(&units).map_err(|_| malformed_error!("Unpaired surrogate in UTF-8 constant"))
}

fn continuation(bytes: &[u8], index: usize) -> Result<u16> {
    match bytes.get(index) {
        Some(&byte) if byte & 0xC0 == 0x80 => Ok(u16::from(byte & 0x3F)),
        Some(&byte) => Err(malformed_error!(
            "Invalid continuation byte 0x{:02X} at offset {}",
            byte,
            index
        )),
        None => Err(out_of_bounds_error!()),
    }
}
