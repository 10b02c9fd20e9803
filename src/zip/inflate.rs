use anyhow::{Context, Result, bail};
use flate2::{Decompress, FlushDecompress, Status};

use crate::io::ByteStream;

/// Pull-based decompressor bound to the current stream position.
pub trait Decompressor {
    /// Decompress into `out`, returning the number of bytes written.
    ///
    /// A count below `out.len()` means the entry's compressed data is done.
    fn decompress<S: ByteStream + ?Sized>(&mut self, stream: &mut S, out: &mut [u8])
    -> Result<usize>;
}

/// Raw deflate decoder (method 8) reading straight from a [`ByteStream`].
///
/// Input is taken through `fill_buf`/`consume`, so once the final deflate
/// block has been decoded the stream sits on the first byte after it.
pub struct Inflater {
    inner: Decompress,
    remaining_input: Option<u64>,
    finished: bool,
}

impl Inflater {
    /// Decoder with no limit on compressed input; the deflate stream itself
    /// marks the end.
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(false),
            remaining_input: None,
            finished: false,
        }
    }

    /// Decoder that never consumes more than `compressed_size` bytes.
    pub fn bounded(compressed_size: u64) -> Self {
        Self {
            remaining_input: Some(compressed_size),
            ..Self::new()
        }
    }

    /// Compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress<S: ByteStream + ?Sized>(
        &mut self,
        stream: &mut S,
        out: &mut [u8],
    ) -> Result<usize> {
        let mut produced = 0;

        while produced < out.len() && !self.finished {
            let available = stream.fill_buf()?;
            let limit = match self.remaining_input {
                Some(n) => n.min(available.len() as u64) as usize,
                None => available.len(),
            };
            let input = &available[..limit];

            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .decompress(input, &mut out[produced..], FlushDecompress::None)
                .context("corrupt deflate data")?;
            let consumed = (self.inner.total_in() - before_in) as usize;
            let written = (self.inner.total_out() - before_out) as usize;

            stream.consume(consumed);
            if let Some(n) = self.remaining_input.as_mut() {
                *n -= consumed as u64;
            }
            produced += written;

            if status == Status::StreamEnd {
                self.finished = true;
            } else if consumed == 0 && written == 0 {
                if limit == 0 {
                    bail!("compressed data ends before the deflate stream is complete");
                }
                bail!("deflate stream made no progress");
            }
        }

        Ok(produced)
    }
}
