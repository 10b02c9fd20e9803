mod http;
mod local;

pub use http::open_url;
pub use local::{open_file, open_stdin};

use anyhow::Result;
use std::io::{BufRead, ErrorKind};

/// Sequential byte source that can only move forward.
///
/// Implementors provide buffered access (`fill_buf`/`consume`) and an offset
/// counter; reading and forward seeking are built on top of those, so a
/// decompressor can stop exactly at the end of its data without overshooting
/// into the next record.
pub trait ByteStream {
    /// Number of bytes consumed since the start of the stream.
    fn offset(&self) -> u64;

    /// Return buffered bytes, refilling from the source when empty.
    ///
    /// An empty slice means end of input.
    fn fill_buf(&mut self) -> Result<&[u8]>;

    /// Mark `n` bytes of the current buffer as consumed.
    fn consume(&mut self, n: usize);

    /// Read up to `buf.len()` bytes; fewer only at end of input.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let available = self.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let n = available.len().min(buf.len() - filled);
            buf[filled..filled + n].copy_from_slice(&available[..n]);
            self.consume(n);
            filled += n;
        }
        Ok(filled)
    }

    /// Move forward by `n` bytes; returns how many were actually skipped.
    fn skip(&mut self, n: u64) -> Result<u64> {
        let mut remaining = n;
        while remaining > 0 {
            let available = self.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let step = (available.len() as u64).min(remaining) as usize;
            self.consume(step);
            remaining -= step as u64;
        }
        Ok(n - remaining)
    }
}

/// [`ByteStream`] over any buffered reader, tracking the consumed offset.
pub struct ArchiveStream<R> {
    inner: R,
    offset: u64,
}

impl<R: BufRead> ArchiveStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> ByteStream for ArchiveStream<R> {
    fn offset(&self) -> u64 {
        self.offset
    }

    fn fill_buf(&mut self) -> Result<&[u8]> {
        // Retry on EINTR; the borrow of the buffer must end before looping.
        loop {
            match self.inner.fill_buf() {
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.inner.fill_buf()?)
    }

    fn consume(&mut self, n: usize) {
        self.inner.consume(n);
        self.offset += n as u64;
    }
}
