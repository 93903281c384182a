//! Low-level byte order and safe reading utilities for class file parsing.
//!
//! Every multi-byte quantity in a class file is stored big-endian. This module provides the
//! bounds-checked primitive readers the [`crate::file::parser::Parser`] builds upon.
//!
//! # Key Components
//!
//! - [`crate::file::io::ClassIO`] - Trait defining big-endian decoding for primitive types
//! - [`crate::file::io::read_be`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_be_at`] - Read a value at an offset and advance the offset
//!
//! # Usage Examples
//!
//! ```rust
//! use classpool::file::io::{read_be, read_be_at};
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34];
//! let magic: u32 = read_be(&data)?;
//! assert_eq!(magic, 0xCAFE_BABE);
//!
//! let mut offset = 4;
//! let major: u16 = read_be_at(&data, &mut offset)?;
//! assert_eq!(major, 52);
//! assert_eq!(offset, 6);
//! # Ok::<(), classpool::Error>(())
//! ```

use crate::Result;

/// Trait for primitive types that can be decoded from big-endian bytes.
///
/// Implemented for the unsigned and signed integers up to 64 bits and both floating point
/// types, which covers every fixed-size field of the class file format.
pub trait ClassIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_class_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl ClassIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_class_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Safely reads a value of type `T` in big-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `T`.
pub fn read_be<T: ClassIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at `offset`, advancing the offset
/// by the number of bytes read.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_be_integers() {
        assert_eq!(read_be::<u8>(&TEST_BUFFER).unwrap(), 0x01);
        assert_eq!(read_be::<u16>(&TEST_BUFFER).unwrap(), 0x0102);
        assert_eq!(read_be::<u32>(&TEST_BUFFER).unwrap(), 0x0102_0304);
        assert_eq!(read_be::<u64>(&TEST_BUFFER).unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(read_be::<i16>(&[0xFF, 0xFE]).unwrap(), -2);
    }

    #[test]
    fn read_be_floats() {
        assert_eq!(read_be::<f32>(&1.5_f32.to_be_bytes()).unwrap(), 1.5);
        assert_eq!(read_be::<f64>(&(-0.25_f64).to_be_bytes()).unwrap(), -0.25);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 2;
        let value: u16 = read_be_at(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(value, 0x0304);
        assert_eq!(offset, 4);
    }

    #[test]
    fn read_be_at_out_of_bounds() {
        let mut offset = 6;
        let result = read_be_at::<u32>(&TEST_BUFFER, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds)));
        assert_eq!(offset, 6);

        let mut offset = usize::MAX;
        assert!(matches!(
            read_be_at::<u8>(&TEST_BUFFER, &mut offset),
            Err(Error::OutOfBounds)
        ));
    }
}
