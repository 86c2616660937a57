//! KSM container abstraction and payload access.
//!
//! This module owns everything that happens to a KSM file before the bytecode decoder
//! sees a single byte: reading the container from disk or memory, transparently
//! gunzipping it, verifying the 4-byte magic prefix, and stripping that prefix. The
//! decoder layers above consume only the resulting payload.
//!
//! # Architecture
//!
//! - **Container loading** - [`crate::file::File`] reads and decompresses a `.ksm`
//!   container from a path or an in-memory buffer
//! - **Magic verification** - the decompressed content must begin with
//!   [`crate::file::KSM_MAGIC`] (`k 0x03 X E`); the prefix is stripped before decoding
//! - **Parsing infrastructure** - [`crate::file::parser::Parser`] and
//!   [`crate::file::io`] provide the bounds-checked reads the decoder is built on
//!
//! # Examples
//!
//! ```rust,no_run
//! use ksmscope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("program.ksm"))?;
//! println!("payload is {} bytes", file.len());
//! # Ok::<(), ksmscope::Error>(())
//! ```

pub mod io;
pub mod parser;

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::{Error, Result};

/// The 4-byte prefix every decompressed KSM container starts with.
pub const KSM_MAGIC: [u8; 4] = *b"k\x03XE";

/// A loaded KSM container, reduced to its decodable payload.
///
/// `File` performs the container-level work the bytecode decoder deliberately knows
/// nothing about: gzip decompression and magic verification. What it retains is the
/// payload (the bytes after the stripped magic), which is exactly the input
/// [`crate::KsmFile::parse`] expects.
///
/// # Examples
///
/// ```rust
/// use ksmscope::File;
/// use flate2::{write::GzEncoder, Compression};
/// use std::io::Write;
///
/// // A container is gzip around magic + payload.
/// let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(b"k\x03XE").unwrap();
/// encoder.write_all(b"%A\x01%F%I%M%D\x01").unwrap();
/// let container = encoder.finish().unwrap();
///
/// let file = File::from_mem(container)?;
/// assert!(file.data().starts_with(b"%A"));
/// # Ok::<(), ksmscope::Error>(())
/// ```
pub struct File {
    /// Decompressed content with the magic prefix stripped
    data: Vec<u8>,
}

impl File {
    /// Load a KSM container from disk.
    ///
    /// Reads the file at `path`, gunzips it, verifies the magic, and strips it.
    ///
    /// # Arguments
    /// * `path` - Path to a `.ksm` file
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read or is not a
    /// gzip stream, or [`crate::Error::InvalidMagic`] if the decompressed content
    /// does not start with the KSM magic.
    pub fn from_file(path: &Path) -> Result<File> {
        File::from_mem(std::fs::read(path)?)
    }

    /// Load a KSM container from an in-memory buffer.
    ///
    /// The buffer holds the container as it exists on disk, gzip framing included.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the content is not a gzip stream, or
    /// [`crate::Error::InvalidMagic`] if the decompressed content does not start
    /// with the KSM magic.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let mut decompressed = Vec::new();
        GzDecoder::new(data.as_slice()).read_to_end(&mut decompressed)?;

        if decompressed.len() < KSM_MAGIC.len() || decompressed[..KSM_MAGIC.len()] != KSM_MAGIC {
            let mut found = [0u8; 4];
            let available = decompressed.len().min(4);
            found[..available].copy_from_slice(&decompressed[..available]);
            return Err(Error::InvalidMagic { found });
        }

        decompressed.drain(..KSM_MAGIC.len());
        Ok(File { data: decompressed })
    }

    /// Access the payload: the decompressed content after the stripped magic.
    ///
    /// Offsets reported by decode errors and argument `byteOffset` values are
    /// relative to the start of this slice.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode the payload into a [`crate::KsmFile`].
    ///
    /// Convenience for the common load-then-decode sequence; the container can
    /// still be inspected afterwards.
    ///
    /// # Errors
    /// Propagates every decoding failure of [`crate::KsmFile::parse`].
    pub fn disassemble(&self) -> Result<crate::KsmFile> {
        crate::KsmFile::parse(&self.data)
    }
}
