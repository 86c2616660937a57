use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers every failure mode of KSM container loading and bytecode decoding. A decode
/// failure is terminal for the current run; there is no partial-result mode. Each parsing
/// variant carries the byte offset (relative to the start of the decompressed, magic-stripped
/// payload) at which decoding stopped.
///
/// # Error Categories
///
/// ## Container Errors
/// - [`Error::InvalidMagic`] - Content does not start with the KSM magic prefix
/// - [`Error::FileError`] - Filesystem or gzip decompression I/O errors
///
/// ## Decode Errors
/// - [`Error::EndOfStream`] - Ran out of bytes where the format required more
/// - [`Error::UnknownArgumentTag`] - Argument tag byte outside the defined enumeration
/// - [`Error::UnknownOpcode`] - Opcode byte with no instruction-table entry
/// - [`Error::SectionOrder`] - Section delimiters out of their mandatory order
/// - [`Error::UnsupportedIndexWidth`] - Declared index width that cannot be decoded
/// - [`Error::InvalidEncoding`] - String payload that is not valid UTF-8
///
/// # Examples
///
/// ```rust
/// use ksmscope::{Error, KsmFile};
/// use std::path::Path;
///
/// match KsmFile::from_file(Path::new("program.ksm")) {
///     Ok(ksm) => {
///         println!("decoded {} code units", ksm.units().len());
///     }
///     Err(Error::InvalidMagic { found }) => {
///         eprintln!("not a KSM file (starts with `{}`)", found.escape_ascii());
///     }
///     Err(Error::EndOfStream { offset }) => {
///         eprintln!("file is truncated at offset {offset}");
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Container Errors
    /// The decompressed content does not begin with the `k 0x03 X E` magic.
    ///
    /// Raised by the container loader before any decoding starts; the core
    /// parser itself never sees the magic bytes.
    ///
    /// # Fields
    ///
    /// * `found` - The four bytes found where the magic was expected (zero
    ///   padded when the content is shorter than four bytes)
    #[error("not a KSM container - expected magic `k\\x03XE`, found `{}`", .found.escape_ascii())]
    InvalidMagic {
        /// The bytes found in place of the magic prefix
        found: [u8; 4],
    },

    /// The buffer was exhausted where the format required more bytes.
    ///
    /// Fatal everywhere except between debug-map records, where end of
    /// buffer is the expected terminator and is checked for explicitly.
    #[error("unexpected end of stream at offset {offset}")]
    EndOfStream {
        /// Position of the read cursor when the shortfall was detected
        offset: usize,
    },

    /// An argument tag byte outside the defined enumeration was read.
    ///
    /// The argument pool is a dense tagged stream; an unknown tag means the
    /// payload width that follows is unknowable, so decoding cannot continue.
    #[error("unknown argument tag {tag:#04x} at offset {offset}")]
    UnknownArgumentTag {
        /// The unrecognized tag byte
        tag: u8,
        /// Position of the tag byte
        offset: usize,
    },

    /// An opcode byte with no entry in the instruction table was read.
    ///
    /// The operand count of an unknown opcode is unknowable, and the format
    /// has no resynchronization point, so this is a hard failure rather than
    /// a guessed zero-operand decode.
    #[error("unknown opcode {code:#04x} at offset {offset}")]
    UnknownOpcode {
        /// The unrecognized opcode byte
        code: u8,
        /// Position of the opcode byte
        offset: usize,
    },

    /// Section delimiters appeared outside their mandatory order.
    ///
    /// Code regions must run `%F` then `%I` then `%M` within a unit, and the
    /// file must run `%A`, code units, `%D`. Any deviation aborts the decode;
    /// the cursor is left at the offending marker.
    ///
    /// # Fields
    ///
    /// * `expected` - The delimiter the format required next
    /// * `found` - The two bytes actually present
    /// * `offset` - Position of the found bytes
    #[error("section order violation at offset {offset} - expected `{}`, found `{}`", .expected.escape_ascii(), .found.escape_ascii())]
    SectionOrder {
        /// The delimiter the format required next
        expected: [u8; 2],
        /// The two bytes actually present
        found: [u8; 2],
        /// Position of the found bytes
        offset: usize,
    },

    /// A declared argument or debug index width cannot be decoded.
    ///
    /// The width byte is free-form in the file; values outside `1..=8` do
    /// not fit the unsigned decode and are rejected up front.
    #[error("unsupported index width {width} at offset {offset}")]
    UnsupportedIndexWidth {
        /// The declared width in bytes
        width: u8,
        /// Position of the width byte
        offset: usize,
    },

    /// A length-prefixed string payload is not valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidEncoding {
        /// Position of the first byte of the string payload
        offset: usize,
        /// The underlying UTF-8 validation failure
        #[source]
        source: std::str::Utf8Error,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors from reading the container from disk or
    /// from gzip decompression of its content.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
