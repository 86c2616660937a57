//! # ksmscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the ksmscope library. Import this module to get quick access to the
//! essential types for working with compiled KerboScript programs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ksmscope operations
pub use crate::Error;

/// The result type used throughout ksmscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point for decoded KSM payloads
pub use crate::KsmFile;

/// Low-level container loading and payload parsing utilities
pub use crate::{File, Parser};

/// The 4-byte prefix of a decompressed KSM container
pub use crate::KSM_MAGIC;

// ================================================================================================
// Decoded Structures
// ================================================================================================

/// Argument pool entries and their tags
pub use crate::disassembler::{Argument, ArgumentTag, ArgumentValue};

/// Decoded instructions and code units
pub use crate::disassembler::{CodeUnit, Instruction, Opcode};

/// The source line map
pub use crate::disassembler::{DebugLine, DebugTable};

// ================================================================================================
// Section Markers
// ================================================================================================

/// Two-byte section delimiters of the payload
pub use crate::disassembler::{
    MARKER_ARGUMENTS, MARKER_DEBUG, MARKER_FUNCTION, MARKER_INIT, MARKER_MAIN,
};
