//! # zipwalk
//!
//! A forward-only ZIP reader.
//!
//! Archives are read entry by entry from their Local File Headers, so they can
//! be listed and extracted while they are still arriving over a pipe or an
//! HTTP response, without ever holding the whole file or seeking backwards.
//! Entries written by streaming encoders, whose headers carry no sizes, are
//! measured by inflating them.
//!
//! ## Features
//!
//! - Read archives from local files, standard input, or HTTP/HTTPS URLs
//! - Support for STORED (uncompressed) and DEFLATE compression methods
//! - Deferred-size entries followed by data descriptors
//! - CRC-32 verification of extracted data
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use zipwalk::{ZipWalker, open_file};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut walker = ZipWalker::new(open_file(Path::new("book.epub"))?);
//!
//!     while let Some(entry) = walker.next_entry()? {
//!         println!("{} ({} bytes)", entry.name, entry.header.uncompressed_size);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use io::{ArchiveStream, ByteStream, open_file, open_stdin, open_url};
pub use zip::{ZipEntry, ZipHeader, ZipWalker};
