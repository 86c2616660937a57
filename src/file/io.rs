//! Low-level byte order and safe reading/writing utilities for KSM parsing.
//!
//! This module provides endian-aware binary data reading and writing for decoding KSM
//! bytecode containers. It implements safe, bounds-checked operations for reading and
//! writing primitive types from/to byte buffers in both little-endian and big-endian
//! byte order. KSM is little-endian throughout except for debug-map range offsets,
//! which are big-endian, so both directions are first-class here.
//!
//! # Architecture
//!
//! The module is built around the [`crate::file::io::KsmIO`] trait which provides a
//! unified interface for converting between primitive values and fixed-size byte
//! arrays. On top of it sit free functions for reading and writing at tracked offsets,
//! plus dynamic-width unsigned reads for the file-declared index widths used by
//! instruction operands and debug ranges.
//!
//! # Key Components
//!
//! - [`crate::file::io::KsmIO`] - Trait defining endian-aware conversions for primitive types
//! - [`crate::file::io::read_le`] / [`crate::file::io::read_be`] - Read a value from the buffer start
//! - [`crate::file::io::read_le_at`] / [`crate::file::io::read_be_at`] - Read at an offset with auto-advance
//! - [`crate::file::io::read_le_at_dyn`] / [`crate::file::io::read_be_at_dyn`] - Unsigned reads of a
//!   runtime-determined width (1..=8 bytes), promoted to `u64`
//! - [`crate::file::io::write_le`] / [`crate::file::io::write_be`] and the `_at` variants - The
//!   encoding mirror, used by tests to build wire-exact fixtures
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use ksmscope::file::io::{read_le, read_be, read_le_at_dyn};
//!
//! let data = [0x01, 0x00]; // little-endian u16: 1
//! let value: u16 = read_le(&data)?;
//! assert_eq!(value, 1);
//!
//! // Debug ranges are the big-endian exception.
//! let data = [0x00, 0x01];
//! let value: u16 = read_be(&data)?;
//! assert_eq!(value, 1);
//!
//! // Operand indices use a width declared in the file, not a fixed type.
//! let data = [0x0A, 0x00, 0x00];
//! let mut offset = 0;
//! let index = read_le_at_dyn(&data, &mut offset, 3)?;
//! assert_eq!(index, 10);
//! # Ok::<(), ksmscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All reading and writing functions return [`crate::Result<T>`] and fail with
//! [`crate::Error::EndOfStream`] (carrying the offset at which the shortfall was
//! detected) when the buffer holds fewer bytes than the operation needs.
//!
//! # Thread Safety
//!
//! Everything here is a pure operation over caller-owned buffers; all functions are
//! safe to call concurrently from multiple threads.

use crate::{Error, Result};

/// Trait for implementing type-specific safe binary data conversions.
///
/// This trait provides a unified interface for converting primitive types to and from
/// byte arrays in both little-endian and big-endian formats. It abstracts the
/// `from_le_bytes`/`from_be_bytes` family of the primitive types behind one generic
/// surface so the reading functions can be written once.
///
/// Each implementation defines a `Bytes` associated type representing the fixed-size
/// byte array for that particular type (e.g. `[u8; 4]` for `u32`). The array is
/// convertible from a byte slice (for reads) and viewable as one (for writes).
///
/// # Thread Safety
///
/// All implementations are pure conversions over primitive types and are thread-safe.
pub trait KsmIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]> + AsRef<[u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_ksm_io {
    ($($ty:ty => $len:expr),+ $(,)?) => {
        $(
            impl KsmIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )+
    };
}

impl_ksm_io! {
    u8 => 1, i8 => 1,
    u16 => 2, i16 => 2,
    u32 => 4, i32 => 4,
    u64 => 8, i64 => 8,
    f32 => 4, f64 => 8,
}

/// Safely reads a value of type `T` in little-endian byte order from a data buffer.
///
/// Reads from the beginning of the buffer. Supports all types implementing
/// [`crate::file::io::KsmIO`] (u8, i8, u16, i16, u32, i32, u64, i64, f32, f64).
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if the buffer holds fewer bytes than
/// `size_of::<T>()`.
pub fn read_le<T: KsmIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// Reads from `*offset` and advances it by the number of bytes consumed, so
/// successive calls walk the buffer.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if fewer than `size_of::<T>()` bytes remain
/// past `*offset`; the offset is not advanced on failure.
pub fn read_le_at<T: KsmIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Error::EndOfStream { offset: *offset });
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(Error::EndOfStream { offset: *offset });
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Reads an unsigned little-endian integer of a runtime-determined width.
///
/// KSM references arguments by a file-declared index width (one byte in the `%A`
/// header) rather than a fixed type; this reads `width` bytes at `*offset`, advances
/// the offset, and promotes the result to `u64`. `width` must already have been
/// validated to lie in `1..=8`.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if fewer than `width` bytes remain.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, width: usize) -> Result<u64> {
    debug_assert!((1..=8).contains(&width));

    if (width + *offset) > data.len() {
        return Err(Error::EndOfStream { offset: *offset });
    }

    let mut value = 0_u64;
    for (i, byte) in data[*offset..*offset + width].iter().enumerate() {
        value |= u64::from(*byte) << (8 * i);
    }

    *offset += width;

    Ok(value)
}

/// Safely reads a value of type `T` in big-endian byte order from a data buffer.
///
/// KSM is little-endian except for debug-map range offsets; this exists for that
/// asymmetry.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if the buffer holds fewer bytes than
/// `size_of::<T>()`.
pub fn read_be<T: KsmIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at a specific offset.
///
/// Reads from `*offset` and advances it by the number of bytes consumed.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if fewer than `size_of::<T>()` bytes remain
/// past `*offset`; the offset is not advanced on failure.
pub fn read_be_at<T: KsmIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Error::EndOfStream { offset: *offset });
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(Error::EndOfStream { offset: *offset });
    };

    *offset += type_len;

    Ok(T::from_be_bytes(read))
}

/// Reads an unsigned big-endian integer of a runtime-determined width.
///
/// The big-endian counterpart of [`read_le_at_dyn`], used for debug-map range
/// offsets whose width is declared in the `%D` header. `width` must already have
/// been validated to lie in `1..=8`.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if fewer than `width` bytes remain.
pub fn read_be_at_dyn(data: &[u8], offset: &mut usize, width: usize) -> Result<u64> {
    debug_assert!((1..=8).contains(&width));

    if (width + *offset) > data.len() {
        return Err(Error::EndOfStream { offset: *offset });
    }

    let mut value = 0_u64;
    for byte in &data[*offset..*offset + width] {
        value = (value << 8) | u64::from(*byte);
    }

    *offset += width;

    Ok(value)
}

/// Safely writes a value of type `T` in little-endian byte order to a data buffer.
///
/// The encoding mirror of [`read_le`]; the decoder itself never writes, but tests
/// use these to build wire-exact fixtures.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if the buffer is shorter than
/// `size_of::<T>()`.
pub fn write_le<T: KsmIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_le_at(data, &mut offset, value)
}

/// Safely writes a value of type `T` in little-endian byte order at a specific offset.
///
/// Writes at `*offset` and advances it by the number of bytes written.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if fewer than `size_of::<T>()` bytes remain
/// past `*offset`.
pub fn write_le_at<T: KsmIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Error::EndOfStream { offset: *offset });
    }

    data[*offset..*offset + type_len].copy_from_slice(value.to_le_bytes().as_ref());
    *offset += type_len;

    Ok(())
}

/// Safely writes a value of type `T` in big-endian byte order to a data buffer.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if the buffer is shorter than
/// `size_of::<T>()`.
pub fn write_be<T: KsmIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_be_at(data, &mut offset, value)
}

/// Safely writes a value of type `T` in big-endian byte order at a specific offset.
///
/// Writes at `*offset` and advances it by the number of bytes written.
///
/// # Errors
///
/// Returns [`crate::Error::EndOfStream`] if fewer than `size_of::<T>()` bytes remain
/// past `*offset`.
pub fn write_be_at<T: KsmIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Error::EndOfStream { offset: *offset });
    }

    data[*offset..*offset + type_len].copy_from_slice(value.to_be_bytes().as_ref());
    *offset += type_len;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_u16() {
        let result = read_le::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0201);
    }

    #[test]
    fn read_be_u16() {
        let result = read_be::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102);
    }

    #[test]
    fn read_le_i16() {
        let result = read_le::<i16>(&[0xFF, 0xFF]).unwrap();
        assert_eq!(result, -1);
    }

    #[test]
    fn read_le_f32() {
        let result = read_le::<f32>(&[0x00, 0x00, 0x80, 0x3F]).unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn read_le_f64() {
        let result = read_le::<f64>(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F]).unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn read_le_at_advances() {
        let mut offset = 2_usize;
        let result = read_le_at::<u16>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(result, 0x0403);
        assert_eq!(offset, 4);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 2_usize;
        let result = read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(result, 0x0304);
        assert_eq!(offset, 4);
    }

    #[test]
    fn read_le_dyn_widths() {
        for (width, expected) in [
            (1_usize, 0x01_u64),
            (2, 0x0201),
            (3, 0x0302_01),
            (4, 0x0403_0201),
            (8, 0x0807_0605_0403_0201),
        ] {
            let mut offset = 0;
            let result = read_le_at_dyn(&TEST_BUFFER, &mut offset, width).unwrap();
            assert_eq!(result, expected);
            assert_eq!(offset, width);
        }
    }

    #[test]
    fn read_be_dyn_widths() {
        for (width, expected) in [
            (1_usize, 0x01_u64),
            (2, 0x0102),
            (3, 0x01_0203),
            (4, 0x0102_0304),
            (8, 0x0102_0304_0506_0708),
        ] {
            let mut offset = 0;
            let result = read_be_at_dyn(&TEST_BUFFER, &mut offset, width).unwrap();
            assert_eq!(result, expected);
            assert_eq!(offset, width);
        }
    }

    #[test]
    fn errors_carry_offset() {
        let buffer = [0xFF, 0xFF, 0xFF, 0xFF];

        let result = read_le::<u64>(&buffer);
        assert!(matches!(result, Err(Error::EndOfStream { offset: 0 })));

        let mut offset = 3_usize;
        let result = read_be_at::<u16>(&buffer, &mut offset);
        assert!(matches!(result, Err(Error::EndOfStream { offset: 3 })));
        assert_eq!(offset, 3);

        let mut offset = 2_usize;
        let result = read_le_at_dyn(&buffer, &mut offset, 4);
        assert!(matches!(result, Err(Error::EndOfStream { offset: 2 })));
    }

    #[test]
    fn write_le_then_read_le() {
        let mut buffer = [0u8; 8];
        let mut offset = 0;

        write_le_at(&mut buffer, &mut offset, 0x1234_u16).unwrap();
        write_le_at(&mut buffer, &mut offset, -5_i16).unwrap();
        write_le_at(&mut buffer, &mut offset, 1.5_f32).unwrap();
        assert_eq!(offset, 8);

        let mut offset = 0;
        assert_eq!(read_le_at::<u16>(&buffer, &mut offset).unwrap(), 0x1234);
        assert_eq!(read_le_at::<i16>(&buffer, &mut offset).unwrap(), -5);
        assert_eq!(read_le_at::<f32>(&buffer, &mut offset).unwrap(), 1.5);
    }

    #[test]
    fn write_be_layout() {
        let mut buffer = [0u8; 2];
        write_be(&mut buffer, 0x1234_u16).unwrap();
        assert_eq!(buffer, [0x12, 0x34]);

        write_le(&mut buffer, 0x1234_u16).unwrap();
        assert_eq!(buffer, [0x34, 0x12]);
    }

    #[test]
    fn write_errors() {
        let mut buffer = [0u8; 2];

        let result = write_le(&mut buffer, 0x1234_5678_u32);
        assert!(matches!(result, Err(Error::EndOfStream { offset: 0 })));

        let result = write_be(&mut buffer, 0x1234_5678_u32);
        assert!(matches!(result, Err(Error::EndOfStream { offset: 0 })));
    }
}
