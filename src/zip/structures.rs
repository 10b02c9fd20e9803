use std::fmt;

/// Local File Header signature (`PK\x03\x04`).
pub const LOCAL_FILE_SIGNATURE: u32 = 0x04034B50;
/// Fixed part of a Local File Header, signature included.
pub const LOCAL_FILE_HEADER_SIZE: u64 = 30;

/// Data descriptor signature (`PK\x07\x08`).
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x08074B50;
/// Signed data descriptor: signature, CRC-32 and both sizes.
pub const DATA_DESCRIPTOR_SIZE: u64 = 16;

/// General purpose flag bit 3: sizes and CRC follow the data in a descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x08;

/// Decompressed chunk size used when measuring a deferred-size entry.
pub const INFLATE_CHUNK: usize = 2048;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Record kind selected by the leading signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    LocalFile,
    DataDescriptor,
    Unknown,
}

/// Fields of a Local File Header or a data descriptor.
///
/// Descriptor records only carry `crc32` and the two sizes; their name and
/// extra lengths are always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZipHeader {
    pub signature: u32,
    pub version: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_length: u16,
    pub extra_length: u16,
}

impl ZipHeader {
    pub fn kind(&self) -> HeaderKind {
        match self.signature {
            LOCAL_FILE_SIGNATURE => HeaderKind::LocalFile,
            DATA_DESCRIPTOR_SIGNATURE => HeaderKind::DataDescriptor,
            _ => HeaderKind::Unknown,
        }
    }

    pub fn method(&self) -> CompressionMethod {
        CompressionMethod::from_u16(self.compression_method)
    }

    /// True when the sizes in this header are placeholders and the entry has
    /// to be measured by decompressing it.
    ///
    /// Stored entries never qualify: their length must be known to read them.
    pub fn has_deferred_size(&self) -> bool {
        self.method() != CompressionMethod::Stored && self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.mod_date & 0x1F) as u8;
        let month = ((self.mod_date >> 5) & 0x0F) as u8;
        let year = ((self.mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.mod_time & 0x1F) * 2) as u8;
        let minute = ((self.mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

/// Non-fatal irregularity repaired while decoding a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderWarning {
    /// A stored entry declared a compressed size different from its
    /// uncompressed size; the uncompressed one was kept.
    StoredSizeMismatch { compressed: u32, uncompressed: u32 },
}

impl fmt::Display for HeaderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderWarning::StoredSizeMismatch {
                compressed,
                uncompressed,
            } => write!(
                f,
                "stored entry declares compressed size {} but uncompressed size {}; using {}",
                compressed, uncompressed, uncompressed
            ),
        }
    }
}
