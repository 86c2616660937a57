//! Argument pool decoding for KSM files.
//!
//! The argument pool is the first section of a KSM payload. It is a packed
//! sequence of tagged values (strings, numbers, booleans and marshalling
//! markers) that instructions reference by *byte offset*: an instruction
//! operand is the position of an argument's tag byte within the payload, not an
//! ordinal. That convention comes straight from the compiler, which writes
//! operands as raw buffer offsets, and it is why every decoded [`Argument`]
//! records the offset it was read from.
//!
//! # Key Components
//!
//! - [`ArgumentTag`] - the tag byte alphabet, one variant per wire tag
//! - [`ArgumentValue`] - a decoded payload, one variant per tag
//! - [`Argument`] - a value plus the offset of its tag byte
//! - [`decode_argument`] - decodes a single tagged value
//! - [`decode_argument_pool`] - decodes the index width and the whole pool
//!
//! # Usage Examples
//!
//! ```rust
//! use ksmscope::{disassembler::ArgumentValue, Parser};
//!
//! // Tag 0x07 (STRING), length 3, "abc"
//! let mut parser = Parser::new(&[0x07, 0x03, b'a', b'b', b'c']);
//! let arg = ksmscope::disassembler::decode_argument(&mut parser).unwrap();
//!
//! assert_eq!(arg.offset, 0);
//! assert_eq!(arg.value, ArgumentValue::String("abc".to_string()));
//! ```

use strum::{Display, EnumIter};

use crate::{disassembler::MARKER_FUNCTION, file::parser::Parser, Error, Result};

/// Tag byte alphabet of the argument pool.
///
/// Each pool entry starts with one of these tags, which selects the payload
/// layout that follows:
///
/// | Tag  | Variant             | Payload                          |
/// |------|---------------------|----------------------------------|
/// | 0x00 | `Null`              | none                             |
/// | 0x01 | `Bool`              | 1 byte, nonzero is `true`        |
/// | 0x02 | `Byte`              | signed 8-bit                     |
/// | 0x03 | `Sword`             | signed 16-bit little-endian      |
/// | 0x04 | `Word`              | unsigned 16-bit little-endian    |
/// | 0x05 | `Float`             | 32-bit IEEE 754 little-endian    |
/// | 0x06 | `Double`            | 64-bit IEEE 754 little-endian    |
/// | 0x07 | `String`            | 1-byte length, then UTF-8 bytes  |
/// | 0x08 | `ArgMarker`         | none                             |
/// | 0x09 | `ScalarIntValue`    | signed 32-bit little-endian      |
/// | 0x0A | `ScalarDoubleValue` | 64-bit IEEE 754 little-endian    |
/// | 0x0B | `BoolValue`         | 1 byte, nonzero is `true`        |
/// | 0x0C | `StringValue`       | 1-byte length, then UTF-8 bytes  |
///
/// The `*Value` tags are the boxed scalar forms newer compilers emit; their
/// payloads decode identically to the plain forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ArgumentTag {
    /// Absence of a value
    Null,
    /// Plain boolean
    Bool,
    /// Signed 8-bit integer
    Byte,
    /// Signed 16-bit integer
    Sword,
    /// Unsigned 16-bit integer
    Word,
    /// 32-bit floating point number
    Float,
    /// 64-bit floating point number
    Double,
    /// Length-prefixed UTF-8 string
    String,
    /// Marks the bottom of a call's argument list on the stack
    ArgMarker,
    /// Boxed 32-bit integer scalar
    ScalarIntValue,
    /// Boxed 64-bit floating point scalar
    ScalarDoubleValue,
    /// Boxed boolean
    BoolValue,
    /// Boxed length-prefixed UTF-8 string
    StringValue,
}

impl ArgumentTag {
    /// Maps a wire tag byte to its [`ArgumentTag`], or `None` for bytes outside
    /// the alphabet.
    #[must_use]
    pub fn from_byte(tag: u8) -> Option<ArgumentTag> {
        match tag {
            0x00 => Some(ArgumentTag::Null),
            0x01 => Some(ArgumentTag::Bool),
            0x02 => Some(ArgumentTag::Byte),
            0x03 => Some(ArgumentTag::Sword),
            0x04 => Some(ArgumentTag::Word),
            0x05 => Some(ArgumentTag::Float),
            0x06 => Some(ArgumentTag::Double),
            0x07 => Some(ArgumentTag::String),
            0x08 => Some(ArgumentTag::ArgMarker),
            0x09 => Some(ArgumentTag::ScalarIntValue),
            0x0A => Some(ArgumentTag::ScalarDoubleValue),
            0x0B => Some(ArgumentTag::BoolValue),
            0x0C => Some(ArgumentTag::StringValue),
            _ => None,
        }
    }

    /// Wire encoding of this tag.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            ArgumentTag::Null => 0x00,
            ArgumentTag::Bool => 0x01,
            ArgumentTag::Byte => 0x02,
            ArgumentTag::Sword => 0x03,
            ArgumentTag::Word => 0x04,
            ArgumentTag::Float => 0x05,
            ArgumentTag::Double => 0x06,
            ArgumentTag::String => 0x07,
            ArgumentTag::ArgMarker => 0x08,
            ArgumentTag::ScalarIntValue => 0x09,
            ArgumentTag::ScalarDoubleValue => 0x0A,
            ArgumentTag::BoolValue => 0x0B,
            ArgumentTag::StringValue => 0x0C,
        }
    }
}

/// A decoded argument pool value.
///
/// Variant names mirror [`ArgumentTag`]; [`ArgumentValue::tag`] recovers the
/// tag without a second bookkeeping field.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// Absence of a value
    Null,
    /// Plain boolean
    Bool(bool),
    /// Signed 8-bit integer
    Byte(i8),
    /// Signed 16-bit integer
    Sword(i16),
    /// Unsigned 16-bit integer
    Word(u16),
    /// 32-bit floating point number
    Float(f32),
    /// 64-bit floating point number
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Marks the bottom of a call's argument list on the stack
    ArgMarker,
    /// Boxed 32-bit integer scalar
    ScalarIntValue(i32),
    /// Boxed 64-bit floating point scalar
    ScalarDoubleValue(f64),
    /// Boxed boolean
    BoolValue(bool),
    /// Boxed UTF-8 string
    StringValue(String),
}

impl ArgumentValue {
    /// The wire tag this value was decoded from.
    #[must_use]
    pub fn tag(&self) -> ArgumentTag {
        match self {
            ArgumentValue::Null => ArgumentTag::Null,
            ArgumentValue::Bool(_) => ArgumentTag::Bool,
            ArgumentValue::Byte(_) => ArgumentTag::Byte,
            ArgumentValue::Sword(_) => ArgumentTag::Sword,
            ArgumentValue::Word(_) => ArgumentTag::Word,
            ArgumentValue::Float(_) => ArgumentTag::Float,
            ArgumentValue::Double(_) => ArgumentTag::Double,
            ArgumentValue::String(_) => ArgumentTag::String,
            ArgumentValue::ArgMarker => ArgumentTag::ArgMarker,
            ArgumentValue::ScalarIntValue(_) => ArgumentTag::ScalarIntValue,
            ArgumentValue::ScalarDoubleValue(_) => ArgumentTag::ScalarDoubleValue,
            ArgumentValue::BoolValue(_) => ArgumentTag::BoolValue,
            ArgumentValue::StringValue(_) => ArgumentTag::StringValue,
        }
    }
}

/// One entry of the argument pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Payload position of this argument's tag byte. Instruction operands
    /// reference arguments by this offset.
    pub offset: usize,
    /// The decoded value
    pub value: ArgumentValue,
}

impl Argument {
    /// The wire tag of this argument's value.
    #[must_use]
    pub fn tag(&self) -> ArgumentTag {
        self.value.tag()
    }
}

/// Decodes a single tagged argument at the parser's current position.
///
/// The recorded [`Argument::offset`] is the position of the tag byte, captured
/// before any reads advance the cursor.
///
/// # Errors
///
/// Returns [`Error::UnknownArgumentTag`] for a tag byte outside the alphabet
/// and [`Error::EndOfStream`] / [`Error::InvalidEncoding`] when the payload
/// is truncated or carries invalid UTF-8.
pub fn decode_argument(parser: &mut Parser) -> Result<Argument> {
    let offset = parser.pos();
    let tag_byte = parser.read_le::<u8>()?;
    let Some(tag) = ArgumentTag::from_byte(tag_byte) else {
        return Err(Error::UnknownArgumentTag {
            tag: tag_byte,
            offset,
        });
    };

    let value = match tag {
        ArgumentTag::Null => ArgumentValue::Null,
        ArgumentTag::Bool => ArgumentValue::Bool(parser.read_le::<u8>()? != 0),
        ArgumentTag::Byte => ArgumentValue::Byte(parser.read_le::<i8>()?),
        ArgumentTag::Sword => ArgumentValue::Sword(parser.read_le::<i16>()?),
        ArgumentTag::Word => ArgumentValue::Word(parser.read_le::<u16>()?),
        ArgumentTag::Float => ArgumentValue::Float(parser.read_le::<f32>()?),
        ArgumentTag::Double => ArgumentValue::Double(parser.read_le::<f64>()?),
        ArgumentTag::String => ArgumentValue::String(parser.read_prefixed_string_utf8()?),
        ArgumentTag::ArgMarker => ArgumentValue::ArgMarker,
        ArgumentTag::ScalarIntValue => ArgumentValue::ScalarIntValue(parser.read_le::<i32>()?),
        ArgumentTag::ScalarDoubleValue => {
            ArgumentValue::ScalarDoubleValue(parser.read_le::<f64>()?)
        }
        ArgumentTag::BoolValue => ArgumentValue::BoolValue(parser.read_le::<u8>()? != 0),
        ArgumentTag::StringValue => ArgumentValue::StringValue(parser.read_prefixed_string_utf8()?),
    };

    Ok(Argument { offset, value })
}

/// Decodes the argument pool: the index width byte followed by tagged values
/// up to (excluding) the first `%F` function marker.
///
/// Expects the parser positioned just past the `%A` section marker. Returns
/// the operand index width together with the decoded pool; arguments come back
/// in payload order, so their offsets are strictly increasing.
///
/// # Errors
///
/// Returns [`Error::UnsupportedIndexWidth`] for a width outside `1..=8`, plus
/// anything [`decode_argument`] can produce. A pool that runs out of bytes
/// before a `%F` marker surfaces as an error from the argument decode at the
/// truncation point.
pub fn decode_argument_pool(parser: &mut Parser) -> Result<(u8, Vec<Argument>)> {
    let width_offset = parser.pos();
    let index_width = parser.read_le::<u8>()?;
    if !(1..=8).contains(&index_width) {
        return Err(Error::UnsupportedIndexWidth {
            width: index_width,
            offset: width_offset,
        });
    }

    let mut arguments = Vec::new();
    while !parser.at_marker(MARKER_FUNCTION) {
        arguments.push(decode_argument(parser)?);
    }

    Ok((index_width, arguments))
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    /// Wire bytes and expected value for one representative of each tag.
    fn sample(tag: ArgumentTag) -> (Vec<u8>, ArgumentValue) {
        match tag {
            ArgumentTag::Null => (vec![0x00], ArgumentValue::Null),
            ArgumentTag::Bool => (vec![0x01, 0x01], ArgumentValue::Bool(true)),
            ArgumentTag::Byte => (vec![0x02, 0xFE], ArgumentValue::Byte(-2)),
            ArgumentTag::Sword => (vec![0x03, 0xFE, 0xFF], ArgumentValue::Sword(-2)),
            ArgumentTag::Word => (vec![0x04, 0x34, 0x12], ArgumentValue::Word(0x1234)),
            ArgumentTag::Float => {
                let mut bytes = vec![0x05];
                bytes.extend_from_slice(&1.5f32.to_le_bytes());
                (bytes, ArgumentValue::Float(1.5))
            }
            ArgumentTag::Double => {
                let mut bytes = vec![0x06];
                bytes.extend_from_slice(&(-2.25f64).to_le_bytes());
                (bytes, ArgumentValue::Double(-2.25))
            }
            ArgumentTag::String => (
                vec![0x07, 0x03, b'a', b'b', b'c'],
                ArgumentValue::String("abc".to_string()),
            ),
            ArgumentTag::ArgMarker => (vec![0x08], ArgumentValue::ArgMarker),
            ArgumentTag::ScalarIntValue => (
                vec![0x09, 0x78, 0x56, 0x34, 0x12],
                ArgumentValue::ScalarIntValue(0x1234_5678),
            ),
            ArgumentTag::ScalarDoubleValue => {
                let mut bytes = vec![0x0A];
                bytes.extend_from_slice(&3.5f64.to_le_bytes());
                (bytes, ArgumentValue::ScalarDoubleValue(3.5))
            }
            ArgumentTag::BoolValue => (vec![0x0B, 0x00], ArgumentValue::BoolValue(false)),
            ArgumentTag::StringValue => (
                vec![0x0C, 0x02, b'h', b'i'],
                ArgumentValue::StringValue("hi".to_string()),
            ),
        }
    }

    #[test]
    fn decodes_every_tag() {
        for tag in ArgumentTag::iter() {
            let (bytes, expected) = sample(tag);
            let mut parser = Parser::new(&bytes);
            let arg = decode_argument(&mut parser).unwrap();
            assert_eq!(arg.offset, 0);
            assert_eq!(arg.value, expected, "tag {tag}");
            assert_eq!(arg.tag(), tag);
            assert!(!parser.has_more_data(), "tag {tag} left trailing bytes");
        }
    }

    #[test]
    fn tag_byte_round_trip() {
        for tag in ArgumentTag::iter() {
            assert_eq!(ArgumentTag::from_byte(tag.to_byte()), Some(tag));
        }
        assert_eq!(ArgumentTag::from_byte(0x0D), None);
        assert_eq!(ArgumentTag::from_byte(0xFF), None);
    }

    #[test]
    fn tag_display_names() {
        assert_eq!(ArgumentTag::String.to_string(), "STRING");
        assert_eq!(ArgumentTag::ArgMarker.to_string(), "ARG_MARKER");
        assert_eq!(ArgumentTag::ScalarIntValue.to_string(), "SCALAR_INT_VALUE");
    }

    #[test]
    fn nonzero_bool_is_true() {
        let mut parser = Parser::new(&[0x01, 0x02]);
        let arg = decode_argument(&mut parser).unwrap();
        assert_eq!(arg.value, ArgumentValue::Bool(true));
    }

    #[test]
    fn offset_is_tag_byte_position() {
        // NULL at 0, BOOL at 1, STRING at 3
        let data = [0x00, 0x01, 0x01, 0x07, 0x01, b'x'];
        let mut parser = Parser::new(&data);

        assert_eq!(decode_argument(&mut parser).unwrap().offset, 0);
        assert_eq!(decode_argument(&mut parser).unwrap().offset, 1);
        assert_eq!(decode_argument(&mut parser).unwrap().offset, 3);
    }

    #[test]
    fn unknown_tag_fails() {
        let mut parser = Parser::new(&[0x00, 0x0D]);
        decode_argument(&mut parser).unwrap();

        let err = decode_argument(&mut parser).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownArgumentTag {
                tag: 0x0D,
                offset: 1
            }
        ));
    }

    #[test]
    fn truncated_string_fails() {
        let mut parser = Parser::new(&[0x07, 0x05, b'a', b'b']);
        let err = decode_argument(&mut parser).unwrap_err();
        assert!(matches!(err, Error::EndOfStream { .. }));
    }

    #[test]
    fn invalid_utf8_string_fails() {
        let mut parser = Parser::new(&[0x07, 0x02, 0xFF, 0xFE]);
        let err = decode_argument(&mut parser).unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding { .. }));
    }

    #[test]
    fn pool_stops_at_function_marker() {
        let data = [
            0x02, // index width
            0x08, // ARG_MARKER
            0x07, 0x02, b'o', b'k', // STRING "ok"
            b'%', b'F',
        ];
        let mut parser = Parser::new(&data);

        let (width, args) = decode_argument_pool(&mut parser).unwrap();
        assert_eq!(width, 2);
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].offset, 1);
        assert_eq!(args[1].offset, 2);
        assert_eq!(args[1].value, ArgumentValue::String("ok".to_string()));

        // The marker itself is left for the caller.
        assert!(parser.at_marker(MARKER_FUNCTION));
    }

    #[test]
    fn empty_pool() {
        let mut parser = Parser::new(&[0x01, b'%', b'F']);
        let (width, args) = decode_argument_pool(&mut parser).unwrap();
        assert_eq!(width, 1);
        assert!(args.is_empty());
    }

    #[test]
    fn index_width_out_of_range_fails() {
        for width in [0x00, 0x09, 0xFF] {
            let data = [width, b'%', b'F'];
            let mut parser = Parser::new(&data);
            let err = decode_argument_pool(&mut parser).unwrap_err();
            assert!(matches!(
                err,
                Error::UnsupportedIndexWidth { width: w, offset: 0 } if w == width
            ));
        }
    }

    #[test]
    fn pool_without_function_marker_fails() {
        let mut parser = Parser::new(&[0x01, 0x00, 0x00]);
        let err = decode_argument_pool(&mut parser).unwrap_err();
        assert!(matches!(err, Error::EndOfStream { .. }));
    }
}
