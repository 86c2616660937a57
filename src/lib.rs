// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(dead_code)]

//! # ksmscope
//!
//! [![Crates.io](https://img.shields.io/crates/v/ksmscope.svg)](https://crates.io/crates/ksmscope)
//! [![Documentation](https://docs.rs/ksmscope/badge.svg)](https://docs.rs/ksmscope)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/ksmscope/blob/main/LICENSE-APACHE)
//!
//! A parser and disassembler for KSM files, the compiled KerboScript bytecode
//! produced by the [kOS](https://github.com/KSP-KOS/KOS) mod for Kerbal Space
//! Program. Built in pure Rust, `ksmscope` unwraps the gzip container, decodes
//! the argument pool, every code unit and the debug map, and hands back plain
//! owned structures ready for inspection or listing generation.
//!
//! ## Features
//!
//! - **📦 Container handling** - Transparent gzip decompression and magic verification
//! - **🔍 Complete payload decoding** - Argument pool, code units, and the debug map
//! - **⚡ Single sequential pass** - Marker lookahead instead of backtracking, no
//!   intermediate copies of the payload
//! - **🛡️ Malformed-input safe** - Every failure is a typed error carrying the
//!   payload offset; no panics on hostile input
//! - **🔧 Cross-platform** - Works anywhere Rust does; no game installation required
//!
//! ## Quick Start
//!
//! Add `ksmscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! ksmscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use ksmscope::prelude::*;
//!
//! let ksm = KsmFile::from_file("boot.ksm".as_ref())?;
//! println!("{} instructions", ksm.instruction_count());
//! # Ok::<(), ksmscope::Error>(())
//! ```
//!
//! ### Basic Usage
//!
//! ```rust,no_run
//! use ksmscope::KsmFile;
//! use std::path::Path;
//!
//! let ksm = KsmFile::from_file(Path::new("boot.ksm"))?;
//!
//! // Walk the decoded instruction stream.
//! for unit in ksm.units() {
//!     for instruction in &unit.main {
//!         print!("{}", instruction.opcode.mnemonic);
//!         for operand in &instruction.operands {
//!             // Operands reference pool entries by payload offset.
//!             if let Some(argument) = ksm.argument_at(*operand) {
//!                 print!(" {:?}", argument.value);
//!             }
//!         }
//!         println!();
//!     }
//! }
//! # Ok::<(), ksmscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `ksmscope` is organized into a small set of modules:
//!
//! - [`prelude`] - Convenient re-exports of the commonly used types
//! - [`disassembler`] - Section and instruction decoding, the [`KsmFile`] entry point
//! - [`Error`] and [`Result`] - Typed error handling with payload offsets
//!
//! ### File Format
//!
//! A `.ksm` file is a gzip stream. Decompressed, it starts with the 4-byte magic
//! `k 0x03 X E`; everything after is the payload:
//!
//! - `%A` - argument pool: an operand index width byte, then tagged values
//!   (strings, numbers, booleans, markers)
//! - `%F` / `%I` / `%M` - per code unit: function, initialization and main
//!   instruction regions
//! - `%D` - debug map: source lines mapped to payload byte ranges
//!
//! Instruction operands are payload byte offsets into the argument pool, using
//! the width the file declares. All multi-byte integers are little-endian with
//! one deliberate exception: debug map range offsets are big-endian.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result); decode errors carry the
//! payload offset at which decoding stopped:
//!
//! ```rust,no_run
//! use ksmscope::{Error, KsmFile};
//!
//! match KsmFile::from_file(std::path::Path::new("boot.ksm")) {
//!     Ok(ksm) => println!("{} code units", ksm.units().len()),
//!     Err(Error::InvalidMagic { found }) => {
//!         println!("not a KSM container, starts with {:?}", found);
//!     }
//!     Err(Error::UnknownOpcode { code, offset }) => {
//!         println!("undecodable opcode {code:#04x} at payload offset {offset}");
//!     }
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! The decoder is fuzzed against arbitrary payloads:
//!
//! ```bash
//! # Install fuzzing tools
//! cargo install cargo-fuzz
//!
//! # Run the payload fuzzer
//! cargo +nightly fuzz run ksmfile --release
//! ```
//!
//! The test suite covers every section decoder plus end-to-end containers:
//!
//! ```bash
//! cargo test
//! ```

pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use ksmscope::prelude::*;
///
/// let ksm = KsmFile::from_file("boot.ksm".as_ref())?;
/// println!("{} arguments in the pool", ksm.arguments().len());
/// # Ok::<(), ksmscope::Error>(())
/// ```
pub mod prelude;

/// KSM bytecode decoding: sections, instructions, and the [`KsmFile`] entry point.
///
/// # Key Types
///
/// - [`disassembler::KsmFile`] - a fully decoded payload
/// - [`disassembler::Argument`] - one argument pool entry with its payload offset
/// - [`disassembler::Instruction`] / [`disassembler::CodeUnit`] - decoded code
/// - [`disassembler::DebugTable`] - the source line map
///
/// # Main Functions
///
/// - [`disassembler::decode_instruction`] - decode a single instruction
/// - [`disassembler::decode_unit`] - decode one `%F`/`%I`/`%M` triple
/// - [`disassembler::decode_argument_pool`] / [`disassembler::decode_debug_table`] -
///   decode one section
///
/// # Examples
///
/// ```rust
/// use ksmscope::{disassembler::decode_instruction, Parser};
///
/// let bytecode = [0x4E, 0x06]; // PUSH, operand index 6
/// let mut parser = Parser::new(&bytecode);
/// let instruction = decode_instruction(&mut parser, 1)?;
///
/// assert_eq!(instruction.opcode.mnemonic, "PUSH");
/// # Ok::<(), ksmscope::Error>(())
/// ```
pub mod disassembler;

/// `ksmscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
///
/// # Examples
///
/// ```rust,no_run
/// use ksmscope::{KsmFile, Result};
///
/// fn load(path: &str) -> Result<KsmFile> {
///     KsmFile::from_file(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `ksmscope` Error type
///
/// The error type for every operation in this crate. Container-level failures
/// ([`Error::FileError`], [`Error::InvalidMagic`]) identify a file that is not
/// a KSM container at all; every decode failure carries the payload offset at
/// which it occurred.
pub use error::Error;

/// Main entry point for working with compiled KerboScript programs.
///
/// # Example
///
/// ```rust,no_run
/// use ksmscope::KsmFile;
/// let ksm = KsmFile::from_file(std::path::Path::new("boot.ksm"))?;
/// println!("{} code units", ksm.units().len());
/// # Ok::<(), ksmscope::Error>(())
/// ```
pub use disassembler::KsmFile;

/// Provides access to low-level container loading and payload parsing.
///
/// [`File`] unwraps the gzip container and strips the magic; [`Parser`] is the
/// bounds-checked cursor the decoders are built on.
///
/// # Example
///
/// ```rust
/// use ksmscope::Parser;
///
/// let mut parser = Parser::new(b"%F");
/// parser.expect_marker(*b"%F")?;
/// assert!(!parser.has_more_data());
/// # Ok::<(), ksmscope::Error>(())
/// ```
pub use file::{parser::Parser, File};

/// The 4-byte prefix every decompressed KSM container must start with.
pub use file::KSM_MAGIC;
