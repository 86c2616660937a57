//! Static descriptor table for the KSM instruction set.
//!
//! Every instruction the kOS compiler emits is identified by a single code byte.
//! This module maps that byte to an [`crate::disassembler::Opcode`] descriptor
//! carrying the mnemonic used in listings and the number of operand indices that
//! follow the code byte in the instruction stream. The operand count is what makes
//! sequential decoding possible at all: KSM instructions have no length prefix, so
//! the only way to find the next instruction is to know how many index fields the
//! current one carries.
//!
//! # Architecture
//!
//! The instruction set is a fixed, process-lifetime table: a `static` array sorted
//! by code, searched with a binary search on lookup. A code byte without a table
//! entry resolves to the [`crate::disassembler::BOGUS`] sentinel, whose operand
//! count is explicitly unknown; the decoder turns that into a hard error instead
//! of guessing a width and desynchronizing the rest of the stream.
//!
//! # Usage Examples
//!
//! ```rust
//! use ksmscope::disassembler::Opcode;
//!
//! let push = Opcode::lookup(0x4E);
//! assert_eq!(push.mnemonic, "PUSH");
//! assert_eq!(push.operand_count, Some(1));
//!
//! // Codes outside the instruction set resolve to the sentinel.
//! let unknown = Opcode::lookup(0x99);
//! assert_eq!(unknown.mnemonic, "BOGUS");
//! assert_eq!(unknown.operand_count, None);
//! ```

/// Descriptor for one KSM instruction.
///
/// Descriptors live in the static [`OPCODES`] table and are immutable for the
/// lifetime of the process; decoded [`crate::disassembler::Instruction`]s hold
/// references into the table rather than copies.
///
/// # Examples
///
/// ```rust
/// use ksmscope::disassembler::Opcode;
///
/// let call = Opcode::lookup(0x4C);
/// assert_eq!(call.code, 0x4C);
/// assert_eq!(call.mnemonic, "CALL");
/// assert_eq!(call.operand_count, Some(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// Numeric code as it appears in the instruction stream
    pub code: u8,
    /// Mnemonic used in disassembly listings
    pub mnemonic: &'static str,
    /// Number of operand indices following the code byte; `None` only for the
    /// lookup-miss sentinel, whose operand count cannot be known
    pub operand_count: Option<u8>,
}

impl Opcode {
    /// Look up the descriptor for a code byte.
    ///
    /// Returns the matching entry of [`OPCODES`], or the [`BOGUS`] sentinel if
    /// the code has no entry. The lookup itself is total; it is the decoder's
    /// decision what to do with a sentinel (it refuses to decode, since the
    /// sentinel's operand count is unknown).
    #[must_use]
    pub fn lookup(code: u8) -> &'static Opcode {
        match OPCODES.binary_search_by(|op| op.code.cmp(&code)) {
            Ok(index) => &OPCODES[index],
            Err(_) => &BOGUS,
        }
    }
}

/// Sentinel descriptor for code bytes outside the instruction set.
///
/// The source format names unmatched codes `BOGUS`, the same name as the real
/// zero-operand table entry at code `0x00`; the two are distinguished by the
/// sentinel's `operand_count` of `None`.
pub static BOGUS: Opcode = Opcode {
    code: 0x00,
    mnemonic: "BOGUS",
    operand_count: None,
};

const fn op(code: u8, mnemonic: &'static str, operand_count: u8) -> Opcode {
    Opcode {
        code,
        mnemonic,
        operand_count: Some(operand_count),
    }
}

/// The KSM instruction set, sorted by code for binary-search lookup.
///
/// Codes `0xCD`, `0xCE` and `0xF0` are relocation placeholders the compiler
/// patches before a program runs; they still appear in freshly compiled files.
pub static OPCODES: [Opcode; 55] = [
    // Structural
    op(0x00, "BOGUS", 0),
    op(0x25, "DELIMITER", 0),
    op(0x31, "EOF", 0),
    op(0x32, "EOP", 0),
    op(0x33, "NOP", 0),
    // Variables and members
    op(0x34, "STORE", 1),
    op(0x35, "UNSET", 0),
    op(0x36, "GETMEMBER", 1),
    op(0x37, "SETMEMBER", 1),
    op(0x38, "GETINDEX", 0),
    op(0x39, "SETINDEX", 0),
    // Branches
    op(0x3A, "BRANCHFALSE", 1),
    op(0x3B, "JUMP", 1),
    // Arithmetic
    op(0x3C, "ADD", 0),
    op(0x3D, "SUB", 0),
    op(0x3E, "MULT", 0),
    op(0x3F, "DIV", 0),
    op(0x40, "POW", 0),
    // Comparison
    op(0x41, "GT", 0),
    op(0x42, "LT", 0),
    op(0x43, "GTE", 0),
    op(0x44, "LTE", 0),
    op(0x45, "EQ", 0),
    op(0x46, "NE", 0),
    // Logic
    op(0x47, "NEGATE", 0),
    op(0x48, "BOOL", 0),
    op(0x49, "NOT", 0),
    op(0x4A, "AND", 0),
    op(0x4B, "OR", 0),
    // Calls and stack
    op(0x4C, "CALL", 2),
    op(0x4D, "RETURN", 1),
    op(0x4E, "PUSH", 1),
    op(0x4F, "POP", 0),
    op(0x50, "DUP", 0),
    op(0x51, "SWAP", 0),
    op(0x52, "EVAL", 0),
    // Triggers and waits
    op(0x53, "ADDTRIGGER", 2),
    op(0x54, "REMOVETRIGGER", 0),
    op(0x55, "WAIT", 1),
    op(0x56, "ENDWAIT", 0),
    // Scoped variables
    op(0x57, "GETMETHOD", 1),
    op(0x58, "STORELOCAL", 1),
    op(0x59, "STOREGLOBAL", 1),
    op(0x5A, "PUSHSCOPE", 2),
    op(0x5B, "POPSCOPE", 1),
    op(0x5C, "STOREEXIST", 1),
    op(0x5D, "PUSHDELEGATE", 2),
    op(0x5E, "BRANCHTRUE", 1),
    op(0x5F, "EXISTS", 0),
    // Argument marshalling
    op(0x60, "ARGBOTTOM", 0),
    op(0x61, "TESTARGBOTTOM", 0),
    op(0x62, "TESTCANCELLED", 0),
    // Relocation placeholders
    op(0xCD, "PUSHDELEGATERELOCATELATER", 2),
    op(0xCE, "PUSHRELOCATELATER", 1),
    op(0xF0, "LABELRESET", 1),
];
