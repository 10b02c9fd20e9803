use super::ArchiveStream;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, StdinLock};
use std::path::Path;

/// Read buffer size for local sources.
const BUFFER_SIZE: usize = 64 * 1024;

/// Open a local archive file as a forward stream.
pub fn open_file(path: &Path) -> Result<ArchiveStream<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(ArchiveStream::new(BufReader::with_capacity(BUFFER_SIZE, file)))
}

/// Stream an archive piped in on standard input.
///
/// The stdin lock is already buffered, so it is used as is.
pub fn open_stdin() -> ArchiveStream<StdinLock<'static>> {
    ArchiveStream::new(std::io::stdin().lock())
}
