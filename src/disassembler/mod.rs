//! KSM bytecode disassembly engine.
//!
//! This module decodes the payload of a KSM (compiled KerboScript) file into
//! structured form: the argument pool, the code units with their decoded
//! instruction streams, and the debug map. Decoding is a single sequential
//! pass; sections are recognized by two-byte ASCII markers (`%A`, `%F`, `%I`,
//! `%M`, `%D`) and the sizes of everything else derive from the opcode table
//! and the index widths the file itself declares.
//!
//! # Key Types
//! - [`KsmFile`] - a fully decoded payload
//! - [`Argument`] / [`ArgumentValue`] / [`ArgumentTag`] - argument pool entries
//! - [`Instruction`] / [`CodeUnit`] - decoded code regions
//! - [`DebugTable`] / [`DebugLine`] - the source line map
//! - [`Opcode`] - static instruction descriptors
//!
//! # Main Functions
//! - [`KsmFile::parse`] - decode a decompressed payload
//! - [`decode_instruction`] - decode a single instruction
//! - [`decode_unit`] - decode one `%F`/`%I`/`%M` region triple
//! - [`decode_argument_pool`] / [`decode_debug_table`] - decode one section
//!
//! # Example
//! ```rust
//! use ksmscope::KsmFile;
//!
//! // Pool: STRING "hi"; one unit pushing it and returning; one debug record.
//! let mut payload = b"%A\x01".to_vec();
//! payload.extend_from_slice(&[0x07, 0x02, b'h', b'i']);
//! payload.extend_from_slice(b"%F%I%M");
//! payload.extend_from_slice(&[0x4E, 0x03, 0x32]);
//! payload.extend_from_slice(b"%D\x01");
//! payload.extend_from_slice(&[0x01, 0x00, 0x01, 0x09, 0x0B]);
//!
//! let ksm = KsmFile::parse(&payload)?;
//! assert_eq!(ksm.units().len(), 1);
//! assert_eq!(ksm.units()[0].main[0].opcode.mnemonic, "PUSH");
//! assert_eq!(ksm.argument_at(3).unwrap().tag().to_string(), "STRING");
//! # Ok::<(), ksmscope::Error>(())
//! ```

mod argument;
mod debug;
mod decoder;
mod instructions;

use std::path::Path;

pub use argument::{decode_argument, decode_argument_pool, Argument, ArgumentTag, ArgumentValue};
pub use debug::{decode_debug_table, DebugLine, DebugTable};
pub use decoder::{decode_instruction, decode_unit, CodeUnit, Instruction};
pub use instructions::{Opcode, BOGUS, OPCODES};

use crate::{
    file::{parser::Parser, File},
    Result,
};

/// Section marker opening the argument pool.
pub const MARKER_ARGUMENTS: [u8; 2] = *b"%A";
/// Section marker opening a function region; by lookahead it also ends the
/// argument pool and the previous unit's main region.
pub const MARKER_FUNCTION: [u8; 2] = *b"%F";
/// Section marker opening an initialization region.
pub const MARKER_INIT: [u8; 2] = *b"%I";
/// Section marker opening a main region.
pub const MARKER_MAIN: [u8; 2] = *b"%M";
/// Section marker opening the debug map.
pub const MARKER_DEBUG: [u8; 2] = *b"%D";

/// A fully decoded KSM payload.
///
/// Produced by one sequential pass over the payload: argument pool first, then
/// every code unit, then the debug map. The structure is plain owned data;
/// parsing the same bytes twice yields equal values.
///
/// # Examples
///
/// ```rust,no_run
/// use ksmscope::KsmFile;
///
/// let ksm = KsmFile::from_file(std::path::Path::new("boot.ksm"))?;
/// for unit in ksm.units() {
///     for instruction in &unit.main {
///         println!("{}", instruction.opcode.mnemonic);
///     }
/// }
/// # Ok::<(), ksmscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KsmFile {
    /// Operand index width declared by the argument section
    index_width: u8,
    /// Argument pool in payload order
    arguments: Vec<Argument>,
    /// Code units in payload order
    units: Vec<CodeUnit>,
    /// The `%D` source line map
    debug: DebugTable,
}

impl KsmFile {
    /// Decodes a decompressed KSM payload.
    ///
    /// The payload is the content that follows the container's magic bytes:
    /// `%A` argument pool, one or more code units, `%D` debug map. Use
    /// [`KsmFile::from_file`] or [`KsmFile::from_mem`] to start from the
    /// gzip container instead.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SectionOrder`] when a section marker is missing
    /// or out of place, and otherwise whatever the section decoders produce
    /// for malformed content. Offsets in errors are payload-relative.
    pub fn parse(payload: &[u8]) -> Result<KsmFile> {
        let mut parser = Parser::new(payload);

        parser.expect_marker(MARKER_ARGUMENTS)?;
        let (index_width, arguments) = decode_argument_pool(&mut parser)?;

        let mut units = Vec::new();
        while !parser.at_marker(MARKER_DEBUG) {
            units.push(decode_unit(&mut parser, index_width)?);
        }

        parser.expect_marker(MARKER_DEBUG)?;
        let debug = decode_debug_table(&mut parser)?;

        Ok(KsmFile {
            index_width,
            arguments,
            units,
            debug,
        })
    }

    /// Loads a KSM container from disk and decodes its payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] / [`crate::Error::InvalidMagic`]
    /// for container-level problems, plus anything [`KsmFile::parse`] can
    /// produce.
    pub fn from_file(path: &Path) -> Result<KsmFile> {
        File::from_file(path)?.disassemble()
    }

    /// Decodes a KSM container already held in memory.
    ///
    /// # Errors
    ///
    /// See [`KsmFile::from_file`]; the only difference is the source of the
    /// bytes.
    pub fn from_mem(data: Vec<u8>) -> Result<KsmFile> {
        File::from_mem(data)?.disassemble()
    }

    /// Operand index width in bytes, as declared by the argument section.
    #[must_use]
    pub fn index_width(&self) -> u8 {
        self.index_width
    }

    /// The argument pool in payload order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Looks up the argument whose tag byte sits at `offset` in the payload.
    ///
    /// This is the resolution instruction operands use. Pool offsets are
    /// strictly increasing, so the lookup is a binary search.
    #[must_use]
    pub fn argument_at(&self, offset: u64) -> Option<&Argument> {
        self.arguments
            .binary_search_by_key(&offset, |arg| arg.offset as u64)
            .ok()
            .map(|index| &self.arguments[index])
    }

    /// Code units in payload order.
    #[must_use]
    pub fn units(&self) -> &[CodeUnit] {
        &self.units
    }

    /// The decoded debug map.
    #[must_use]
    pub fn debug(&self) -> &DebugTable {
        &self.debug
    }

    /// Total instruction count across all units and regions.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.units.iter().map(CodeUnit::instruction_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    use super::*;
    use crate::file::KSM_MAGIC;

    /// Two units, three pool entries, two debug records.
    fn sample_payload() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"%A");
        payload.push(0x01); // index width
        payload.push(0x08); // ARG_MARKER at offset 3
        payload.extend_from_slice(&[0x07, 0x05, b'p', b'r', b'i', b'n', b't']); // STRING at 4
        payload.extend_from_slice(&[0x09, 0x2A, 0x00, 0x00, 0x00]); // SCALAR_INT_VALUE at 11

        payload.extend_from_slice(b"%F");
        payload.extend_from_slice(&[0x4E, 0x0B]); // PUSH 11
        payload.extend_from_slice(b"%I");
        payload.extend_from_slice(b"%M");
        payload.extend_from_slice(&[0x4E, 0x03, 0x4C, 0x04, 0x03, 0x32]); // PUSH 3, CALL 4 3, EOP

        payload.extend_from_slice(b"%F%I%M");
        payload.push(0x32); // EOP

        payload.extend_from_slice(b"%D");
        payload.push(0x01);
        payload.extend_from_slice(&[0x01, 0x00, 0x01, 0x10, 0x14]); // line 1: [16, 20]
        payload.extend_from_slice(&[0x02, 0x00, 0x02, 0x15, 0x18, 0x19, 0x1C]); // line 2
        payload
    }

    #[test]
    fn parses_sample_payload() {
        let ksm = KsmFile::parse(&sample_payload()).unwrap();

        assert_eq!(ksm.index_width(), 1);
        assert_eq!(ksm.arguments().len(), 3);
        assert_eq!(ksm.units().len(), 2);
        assert_eq!(ksm.instruction_count(), 5);

        let first = &ksm.units()[0];
        assert_eq!(first.function.len(), 1);
        assert_eq!(first.function[0].operands, vec![11]);
        assert!(first.init.is_empty());
        assert_eq!(first.main.len(), 3);
        assert_eq!(first.main[1].opcode.mnemonic, "CALL");
        assert_eq!(first.main[1].operands, vec![4, 3]);

        let second = &ksm.units()[1];
        assert_eq!(second.instruction_count(), 1);
        assert_eq!(second.main[0].opcode.mnemonic, "EOP");

        assert_eq!(ksm.debug().index_width, 1);
        assert_eq!(ksm.debug().lines.len(), 2);
        assert_eq!(ksm.debug().lines[0].ranges, vec![(16, 20)]);
        assert_eq!(ksm.debug().lines[1].ranges, vec![(21, 24), (25, 28)]);
    }

    #[test]
    fn operand_offsets_resolve_to_arguments() {
        let ksm = KsmFile::parse(&sample_payload()).unwrap();

        let push = &ksm.units()[0].main[0];
        let target = ksm.argument_at(push.operands[0]).unwrap();
        assert_eq!(target.value, ArgumentValue::String("print".to_string()));

        assert_eq!(
            ksm.argument_at(11).unwrap().value,
            ArgumentValue::ScalarIntValue(42)
        );
        assert_eq!(ksm.argument_at(3).unwrap().value, ArgumentValue::ArgMarker);
        assert!(ksm.argument_at(5).is_none());
        assert!(ksm.argument_at(9999).is_none());
    }

    #[test]
    fn parsing_is_deterministic() {
        let payload = sample_payload();
        let first = KsmFile::parse(&payload).unwrap();
        let second = KsmFile::parse(&payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn payload_must_start_with_argument_marker() {
        let err = KsmFile::parse(b"%F%I%M%D\x01").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::SectionOrder {
                expected,
                found,
                offset: 0,
            } if expected == *b"%A" && found == *b"%F"
        ));
    }

    #[test]
    fn debug_marker_directly_after_pool_fails() {
        // The pool only ends at %F, so the '%' of %D reads as a tag byte.
        let err = KsmFile::parse(b"%A\x01%D\x01").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::UnknownArgumentTag {
                tag: 0x25,
                offset: 3
            }
        ));
    }

    #[test]
    fn missing_debug_section_fails() {
        let err = KsmFile::parse(b"%A\x01%F%I%M\x32").unwrap_err();
        assert!(matches!(err, crate::Error::EndOfStream { .. }));
    }

    #[test]
    fn from_mem_unwraps_the_container() {
        let payload = sample_payload();

        let mut content = KSM_MAGIC.to_vec();
        content.extend_from_slice(&payload);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&content).unwrap();
        let container = encoder.finish().unwrap();

        let ksm = KsmFile::from_mem(container).unwrap();
        assert_eq!(ksm, KsmFile::parse(&payload).unwrap());
    }
}
