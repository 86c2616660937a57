//! Debug map decoding: source line to bytecode range mapping.
//!
//! The final section of a KSM payload, introduced by `%D`, maps KerboScript
//! source lines to the payload byte ranges their compiled instructions occupy.
//! Each record is a little-endian 16-bit line number, a one-byte range count,
//! and that many `[start, end]` offset pairs. The pairs are stored
//! **big-endian**, the single deviation from the otherwise little-endian
//! format, and their width is declared by the section's own header byte,
//! independent of the argument index width.
//!
//! The section has no length field and no terminator: records run to the end
//! of the buffer, so an empty remainder after the width byte is a valid, empty
//! map.

use crate::{file::parser::Parser, Error, Result};

/// One debug map record: a source line and the payload ranges compiled from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLine {
    /// KerboScript source line number
    pub line_number: u16,
    /// Inclusive `(start, end)` payload offset pairs
    pub ranges: Vec<(u64, u64)>,
}

/// The decoded `%D` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugTable {
    /// Byte width of the range offsets, declared by this section's header
    pub index_width: u8,
    /// Records in payload order
    pub lines: Vec<DebugLine>,
}

/// Decodes the debug map from the parser's current position to the end of the
/// buffer.
///
/// Expects the parser positioned just past the `%D` marker. The first byte is
/// the range offset width; the remainder is consumed as records, and running
/// out of bytes *between* records is the section's normal end.
///
/// # Errors
///
/// Returns [`Error::UnsupportedIndexWidth`] for a width outside `1..=8`, and
/// [`Error::EndOfStream`] if the buffer ends in the middle of a record.
///
/// # Examples
///
/// ```rust
/// use ksmscope::{disassembler::decode_debug_table, Parser};
///
/// // Width 1; line 5 covers payload bytes 10 through 20.
/// let mut parser = Parser::new(&[0x01, 0x05, 0x00, 0x01, 0x0A, 0x14]);
/// let table = decode_debug_table(&mut parser).unwrap();
///
/// assert_eq!(table.lines[0].line_number, 5);
/// assert_eq!(table.lines[0].ranges, vec![(10, 20)]);
/// ```
pub fn decode_debug_table(parser: &mut Parser) -> Result<DebugTable> {
    let width_offset = parser.pos();
    let index_width = parser.read_le::<u8>()?;
    if !(1..=8).contains(&index_width) {
        return Err(Error::UnsupportedIndexWidth {
            width: index_width,
            offset: width_offset,
        });
    }

    let mut lines = Vec::new();
    while parser.has_more_data() {
        let line_number = parser.read_le::<u16>()?;
        let range_count = parser.read_le::<u8>()?;

        let mut ranges = Vec::with_capacity(range_count as usize);
        for _ in 0..range_count {
            let start = parser.read_be_dyn(index_width as usize)?;
            let end = parser.read_be_dyn(index_width as usize)?;
            ranges.push((start, end));
        }

        lines.push(DebugLine {
            line_number,
            ranges,
        });
    }

    Ok(DebugTable { index_width, lines })
}
