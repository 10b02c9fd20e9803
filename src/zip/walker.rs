//! Front-to-back traversal of the local entries of an archive.
//!
//! [`ZipWalker`] decodes one Local File Header at a time, hands out the entry
//! and then either skips or copies its payload before moving on. Data
//! descriptors that trail deferred-size entries are read and folded into the
//! final header. The walk ends at the first record that is not a valid local
//! header or descriptor, which for a well-formed archive is the central
//! directory.

use anyhow::{Result, anyhow, bail};
use std::io::Write;

use crate::io::ByteStream;

use super::header::{Decoded, decode};
use super::inflate::{Decompressor, Inflater};
use super::skip::{read_name, skip_entry};
use super::structures::*;

/// Buffer size for copying entry payloads.
const COPY_BUFFER: usize = 64 * 1024;

/// An entry found while walking the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    /// Entry name, decoded lossily as UTF-8.
    pub name: String,
    /// Header as declared in the Local File Header.
    pub header: ZipHeader,
    /// Offset of the Local File Header's signature.
    pub header_offset: u64,
    /// Offset of the first payload byte, past the name and extra field.
    pub data_offset: u64,
}

impl ZipEntry {
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Sequential reader over the entries of a ZIP stream.
pub struct ZipWalker<S: ByteStream> {
    stream: S,
    /// Entry whose extra field and payload are still in the stream.
    current: Option<ZipEntry>,
    /// Record decoded while looking for a descriptor that was not one.
    lookahead: Option<(u64, Decoded)>,
    done: bool,
}

impl<S: ByteStream> ZipWalker<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            current: None,
            lookahead: None,
            done: false,
        }
    }

    /// Bytes consumed from the underlying stream.
    pub fn offset(&self) -> u64 {
        self.stream.offset()
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Advance to the next entry, skipping whatever is left of the current one.
    ///
    /// Returns `None` once a record is reached that is not a local header.
    pub fn next_entry(&mut self) -> Result<Option<ZipEntry>> {
        if self.current.is_some() {
            self.skip_data()?;
        }

        while !self.done {
            let (start, decoded) = match self.lookahead.take() {
                Some(pending) => pending,
                None => {
                    let start = self.stream.offset();
                    (start, decode(&mut self.stream)?)
                }
            };

            if !decoded.valid {
                log::debug!(
                    "[ZIP] No local header at offset {} (signature {:#010x}), end of entries",
                    start,
                    decoded.header.signature
                );
                self.done = true;
                break;
            }
            if let Some(warning) = decoded.warning {
                log::warn!("[ZIP] Entry at offset {}: {}", start, warning);
            }

            let header = decoded.header;
            match header.kind() {
                HeaderKind::LocalFile => {}
                // Descriptor without a deferred-size entry in front of it.
                _ => {
                    log::debug!("[ZIP] Skipping stray data descriptor at offset {}", start);
                    continue;
                }
            }

            let Some(name) = read_name(&mut self.stream, &header)? else {
                log::warn!("[ZIP] Archive ends inside the name of entry at offset {}", start);
                self.done = true;
                break;
            };

            let entry = ZipEntry {
                name: String::from_utf8_lossy(&name).into_owned(),
                header,
                header_offset: start,
                data_offset: self.stream.offset() + u64::from(header.extra_length),
            };
            self.current = Some(entry.clone());
            return Ok(Some(entry));
        }

        Ok(None)
    }

    /// Skip the payload of the current entry.
    ///
    /// Returns the final header: measured size for deferred-size entries, and
    /// CRC and compressed size from the trailing descriptor when there is one.
    pub fn skip_data(&mut self) -> Result<ZipHeader> {
        let entry = self
            .current
            .take()
            .ok_or_else(|| anyhow!("no current entry to skip"))?;
        let result = skip_entry(&mut self.stream, &entry.header)
            .and_then(|header| self.finish_entry(&entry, header));
        if result.is_err() {
            self.done = true;
        }
        result
    }

    /// Copy the uncompressed payload of the current entry to `out`.
    ///
    /// The CRC-32 is checked against the header, or against the trailing
    /// descriptor for entries that carry one.
    pub fn copy_data<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<ZipHeader> {
        let entry = self
            .current
            .as_ref()
            .ok_or_else(|| anyhow!("no current entry to read"))?;
        let method = entry.header.method();
        if let CompressionMethod::Unknown(_) = method {
            bail!(
                "Unsupported compression method {} for {} (only STORED and DEFLATE are supported)",
                method.as_u16(),
                entry.name
            );
        }

        let entry = self.current.take().ok_or_else(|| anyhow!("no current entry to read"))?;
        let result = self.copy_payload(&entry, out);
        if result.is_err() {
            self.done = true;
        }
        result
    }

    /// Read the uncompressed payload of the current entry into memory.
    ///
    /// The declared size only hints the initial allocation, capped at one
    /// copy buffer; the vector grows as data actually arrives.
    pub fn read_data(&mut self) -> Result<Vec<u8>> {
        let capacity = self
            .current
            .as_ref()
            .filter(|e| !e.header.has_deferred_size())
            .map_or(0, |e| (e.header.uncompressed_size as usize).min(COPY_BUFFER));
        let mut data = Vec::with_capacity(capacity);
        self.copy_data(&mut data)?;
        Ok(data)
    }

    /// Walk forward to the entry called `name` and return its contents.
    ///
    /// Entries before it are skipped; `None` if the archive ends first.
    pub fn find(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        while let Some(entry) = self.next_entry()? {
            if entry.name == name {
                return self.read_data().map(Some);
            }
        }
        Ok(None)
    }

    fn copy_payload<W: Write + ?Sized>(&mut self, entry: &ZipEntry, out: &mut W) -> Result<ZipHeader> {
        let mut header = entry.header;
        self.stream.skip(u64::from(header.extra_length))?;

        let mut hasher = crc32fast::Hasher::new();
        let mut buf = vec![0u8; COPY_BUFFER];
        let mut written: u64 = 0;

        if header.method() == CompressionMethod::Stored {
            let mut remaining = u64::from(header.compressed_size);
            while remaining > 0 {
                let want = remaining.min(buf.len() as u64) as usize;
                let n = self.stream.read(&mut buf[..want])?;
                if n == 0 {
                    bail!("Archive ends inside the data of {}", entry.name);
                }
                hasher.update(&buf[..n]);
                out.write_all(&buf[..n])?;
                remaining -= n as u64;
                written += n as u64;
            }
        } else {
            let deferred = header.has_deferred_size();
            let mut inflater = if deferred {
                Inflater::new()
            } else {
                Inflater::bounded(u64::from(header.compressed_size))
            };
            loop {
                let n = inflater.decompress(&mut self.stream, &mut buf)?;
                hasher.update(&buf[..n]);
                out.write_all(&buf[..n])?;
                written += n as u64;
                if n < buf.len() {
                    break;
                }
            }
            if deferred {
                header.uncompressed_size = u32::try_from(written).unwrap_or(u32::MAX);
            } else {
                // Tolerate padding between the end of the deflate stream and the declared size.
                let rest = u64::from(header.compressed_size).saturating_sub(inflater.total_in());
                self.stream.skip(rest)?;
            }
        }

        if written != u64::from(header.uncompressed_size) {
            bail!(
                "Size mismatch for {}: header says {} bytes, got {}",
                entry.name,
                header.uncompressed_size,
                written
            );
        }

        let header = self.finish_entry(entry, header)?;
        let crc = hasher.finalize();
        if crc != header.crc32 {
            bail!(
                "CRC mismatch for {}: expected {:08x}, got {:08x}",
                entry.name,
                header.crc32,
                crc
            );
        }
        Ok(header)
    }

    /// Fold the trailing data descriptor, if any, into an entry's header.
    fn finish_entry(&mut self, entry: &ZipEntry, mut header: ZipHeader) -> Result<ZipHeader> {
        if header.flags & FLAG_DATA_DESCRIPTOR == 0 {
            return Ok(header);
        }

        let start = self.stream.offset();
        let decoded = decode(&mut self.stream)?;
        if !(decoded.valid && decoded.header.kind() == HeaderKind::DataDescriptor) {
            // Unsigned or missing descriptor; let the walk look at this record.
            log::debug!("[ZIP] No data descriptor after {}", entry.name);
            self.lookahead = Some((start, decoded));
            return Ok(header);
        }

        let descriptor = decoded.header;
        if header.has_deferred_size() && descriptor.uncompressed_size != header.uncompressed_size {
            log::warn!(
                "[ZIP] {}: descriptor declares {} bytes but {} were decompressed",
                entry.name,
                descriptor.uncompressed_size,
                header.uncompressed_size
            );
        } else if !header.has_deferred_size() {
            header.uncompressed_size = descriptor.uncompressed_size;
        }
        header.crc32 = descriptor.crc32;
        header.compressed_size = descriptor.compressed_size;
        Ok(header)
    }
}
