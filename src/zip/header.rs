//! Decoding of Local File Headers and data descriptors from a forward stream.
//!
//! The decoder never fails on bad data: an unknown signature, a truncated
//! record or an empty entry name all come back as an invalid [`Decoded`].
//! During a walk that is also how the end of the local entries shows up, since
//! the central directory that follows them starts with a different signature.
//! Only I/O errors from the stream itself are returned as `Err`.

use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};

use crate::io::ByteStream;

use super::structures::*;

/// Result of one decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub header: ZipHeader,
    /// The bytes formed a complete, recognized record.
    pub valid: bool,
    pub warning: Option<HeaderWarning>,
}

/// Read a little-endian `u16`; zero if the stream ends first.
pub fn read_u16<S: ByteStream + ?Sized>(stream: &mut S) -> Result<u16> {
    let mut buf = [0u8; 2];
    Ok(if stream.read(&mut buf)? == buf.len() {
        LittleEndian::read_u16(&buf)
    } else {
        0
    })
}

/// Read a little-endian `u32`; zero if the stream ends first.
pub fn read_u32<S: ByteStream + ?Sized>(stream: &mut S) -> Result<u32> {
    let mut buf = [0u8; 4];
    Ok(if stream.read(&mut buf)? == buf.len() {
        LittleEndian::read_u32(&buf)
    } else {
        0
    })
}

/// Decode the record starting at the current stream position.
///
/// A Local File Header consumes exactly its 30 fixed bytes; the name and extra
/// field are left in the stream. A data descriptor consumes 16 bytes. For an
/// unknown signature only the 4 signature bytes are consumed.
pub fn decode<S: ByteStream + ?Sized>(stream: &mut S) -> Result<Decoded> {
    let start = stream.offset();
    let mut header = ZipHeader {
        signature: read_u32(stream)?,
        ..Default::default()
    };
    let mut warning = None;

    let valid = match header.kind() {
        HeaderKind::Unknown => false,
        HeaderKind::LocalFile => {
            header.version = read_u16(stream)?;
            header.flags = read_u16(stream)?;
            header.compression_method = read_u16(stream)?;
            header.mod_time = read_u16(stream)?;
            header.mod_date = read_u16(stream)?;
            header.crc32 = read_u32(stream)?;
            header.compressed_size = read_u32(stream)?;
            header.uncompressed_size = read_u32(stream)?;
            // Some writers put a bogus compressed size on stored entries.
            if header.method() == CompressionMethod::Stored
                && header.compressed_size != header.uncompressed_size
            {
                warning = Some(HeaderWarning::StoredSizeMismatch {
                    compressed: header.compressed_size,
                    uncompressed: header.uncompressed_size,
                });
                header.compressed_size = header.uncompressed_size;
            }
            header.name_length = read_u16(stream)?;
            header.extra_length = read_u16(stream)?;
            stream.offset() == start + LOCAL_FILE_HEADER_SIZE && header.name_length != 0
        }
        HeaderKind::DataDescriptor => {
            header.crc32 = read_u32(stream)?;
            header.compressed_size = read_u32(stream)?;
            header.uncompressed_size = read_u32(stream)?;
            stream.offset() == start + DATA_DESCRIPTOR_SIZE
        }
    };

    Ok(Decoded {
        header,
        valid,
        warning,
    })
}
