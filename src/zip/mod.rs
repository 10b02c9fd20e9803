//! Streaming ZIP parsing.
//!
//! This module reads an archive strictly front to back, the way it comes off
//! a pipe or a network socket. It never looks for the central directory.
//!
//! ## Architecture
//!
//! - [`structures`]: record layout, signatures and the decoded [`ZipHeader`]
//! - [`header`]: little-endian integer readers and the record decoder
//! - [`skip`]: entry name boundary and the payload skipper
//! - [`inflate`]: the [`Decompressor`] seam and its deflate implementation
//! - [`walker`]: [`ZipWalker`], entry-by-entry traversal and extraction
//!
//! ## Stream layout
//!
//! Each entry is a 30-byte Local File Header, the entry name, an extra field
//! and the payload. When general purpose flag bit 3 is set on a compressed
//! entry, the header sizes are zero placeholders. The only way to find the end
//! of the payload is then to inflate it, after which a 16-byte data descriptor
//! carries the real CRC and sizes.
//!
//! ## Limitations
//!
//! - No encryption support
//! - No ZIP64 sizes
//! - No BZIP2, LZMA, or other compression methods

pub mod header;
pub mod inflate;
pub mod skip;
pub mod structures;
pub mod walker;

pub use header::{Decoded, decode, read_u16, read_u32};
pub use inflate::{Decompressor, Inflater};
pub use skip::{read_name, skip_entry, skip_entry_with};
pub use structures::*;
pub use walker::{ZipEntry, ZipWalker};
