//! Instruction stream and code region decoding.
//!
//! After the argument pool, a KSM payload carries one or more code units, each
//! a fixed triple of regions introduced by the markers `%F` (function bodies),
//! `%I` (initialization) and `%M` (main). Instructions inside a region are a
//! code byte followed by zero or more operand indices whose byte width was
//! declared in the argument section header; operands reference pool entries by
//! the payload offset of their tag byte.
//!
//! Because instructions carry no length prefix, decoding is strictly
//! sequential: the opcode table supplies the operand count, and a two-byte
//! lookahead for the next section marker decides where a region ends. Regions
//! may also end at end of buffer, which lets a unit be decoded in isolation;
//! when a whole file is parsed the surrounding structure still demands the
//! debug section marker, so a truncated file does not pass silently.
//!
//! # Usage Examples
//!
//! ```rust
//! use ksmscope::{disassembler::decode_unit, Parser};
//!
//! // One unit: empty function and init regions, EOP in main.
//! let mut parser = Parser::new(b"%F%I%M\x32");
//! let unit = decode_unit(&mut parser, 1).unwrap();
//!
//! assert!(unit.function.is_empty());
//! assert!(unit.init.is_empty());
//! assert_eq!(unit.main[0].opcode.mnemonic, "EOP");
//! ```

use crate::{
    disassembler::{
        instructions::Opcode, MARKER_DEBUG, MARKER_FUNCTION, MARKER_INIT, MARKER_MAIN,
    },
    file::parser::Parser,
    Error, Result,
};

/// A single decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Descriptor from the static opcode table
    pub opcode: &'static Opcode,
    /// Operand indices, each the payload offset of an argument pool entry
    pub operands: Vec<u64>,
}

/// One compiled code unit: the three instruction regions of a program.
///
/// The compiler emits regions in a fixed order; files produced by it always
/// contain all three markers even when a region holds no instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeUnit {
    /// Instructions of the `%F` function region
    pub function: Vec<Instruction>,
    /// Instructions of the `%I` initialization region
    pub init: Vec<Instruction>,
    /// Instructions of the `%M` main region
    pub main: Vec<Instruction>,
}

impl CodeUnit {
    /// Total instruction count across the three regions.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.function.len() + self.init.len() + self.main.len()
    }
}

/// Decodes a single instruction at the parser's current position.
///
/// `index_width` is the operand index width declared in the argument section
/// header; every operand of every instruction in the payload uses it.
///
/// # Errors
///
/// Returns [`Error::UnknownOpcode`] if the code byte resolves to the sentinel
/// descriptor, whose operand count is unknown; decoding cannot continue past
/// such a byte without desynchronizing. Returns [`Error::EndOfStream`] if the
/// buffer ends inside the instruction.
///
/// # Examples
///
/// ```rust
/// use ksmscope::{disassembler::decode_instruction, Parser};
///
/// let mut parser = Parser::new(&[0x4E, 0x06]);
/// let instruction = decode_instruction(&mut parser, 1).unwrap();
///
/// assert_eq!(instruction.opcode.mnemonic, "PUSH");
/// assert_eq!(instruction.operands, vec![6]);
/// ```
pub fn decode_instruction(parser: &mut Parser, index_width: u8) -> Result<Instruction> {
    let offset = parser.pos();
    let code = parser.read_le::<u8>()?;

    let opcode = Opcode::lookup(code);
    let Some(operand_count) = opcode.operand_count else {
        return Err(Error::UnknownOpcode { code, offset });
    };

    let mut operands = Vec::with_capacity(operand_count as usize);
    for _ in 0..operand_count {
        operands.push(parser.read_le_dyn(index_width as usize)?);
    }

    Ok(Instruction { opcode, operands })
}

/// Decodes one code unit: `%F` region, `%I` region, `%M` region, in that
/// order.
///
/// Stops before the next section marker (`%F` of a following unit, or `%D` of
/// the debug map) or at end of buffer, leaving the marker for the caller.
///
/// # Errors
///
/// Returns [`Error::SectionOrder`] when the expected region marker is missing,
/// with the cursor left at the offending bytes, plus anything
/// [`decode_instruction`] can produce.
pub fn decode_unit(parser: &mut Parser, index_width: u8) -> Result<CodeUnit> {
    parser.expect_marker(MARKER_FUNCTION)?;
    let function = decode_section(parser, index_width)?;

    parser.expect_marker(MARKER_INIT)?;
    let init = decode_section(parser, index_width)?;

    parser.expect_marker(MARKER_MAIN)?;
    let main = decode_section(parser, index_width)?;

    Ok(CodeUnit {
        function,
        init,
        main,
    })
}

/// Decodes instructions up to the next section marker or end of buffer.
fn decode_section(parser: &mut Parser, index_width: u8) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    while parser.has_more_data() && !at_section_marker(parser) {
        instructions.push(decode_instruction(parser, index_width)?);
    }
    Ok(instructions)
}

/// Two-byte lookahead for any of the section markers that end a region.
///
/// With fewer than two bytes remaining no marker can match; the region then
/// runs to end of buffer and any trailing fragment fails inside the
/// instruction decode instead.
fn at_section_marker(parser: &Parser) -> bool {
    match parser.peek_bytes(2) {
        Ok(bytes) => {
            let marker = [bytes[0], bytes[1]];
            marker == MARKER_FUNCTION
                || marker == MARKER_INIT
                || marker == MARKER_MAIN
                || marker == MARKER_DEBUG
        }
        Err(_) => false,
    }
}
