#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::{Cursor, Write};

use zipwalk::ArchiveStream;

pub type MemStream = ArchiveStream<Cursor<Vec<u8>>>;

pub fn stream(bytes: Vec<u8>) -> MemStream {
    ArchiveStream::new(Cursor::new(bytes))
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Raw Local File Header fields, written verbatim.
#[derive(Clone, Copy, Debug)]
pub struct Lfh {
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    pub compressed: u32,
    pub uncompressed: u32,
    pub name_len: u16,
    pub extra_len: u16,
}

impl Lfh {
    pub fn bytes(&self) -> Vec<u8> {
        let mut b = vec![0x50, 0x4B, 0x03, 0x04];
        b.extend_from_slice(&20u16.to_le_bytes());
        b.extend_from_slice(&self.flags.to_le_bytes());
        b.extend_from_slice(&self.method.to_le_bytes());
        b.extend_from_slice(&0x7d1cu16.to_le_bytes());
        b.extend_from_slice(&0x5a21u16.to_le_bytes());
        b.extend_from_slice(&self.crc32.to_le_bytes());
        b.extend_from_slice(&self.compressed.to_le_bytes());
        b.extend_from_slice(&self.uncompressed.to_le_bytes());
        b.extend_from_slice(&self.name_len.to_le_bytes());
        b.extend_from_slice(&self.extra_len.to_le_bytes());
        b
    }
}

pub fn descriptor(crc32: u32, compressed: u32, uncompressed: u32) -> Vec<u8> {
    let mut b = vec![0x50, 0x4B, 0x07, 0x08];
    b.extend_from_slice(&crc32.to_le_bytes());
    b.extend_from_slice(&compressed.to_le_bytes());
    b.extend_from_slice(&uncompressed.to_le_bytes());
    b
}

/// Entry with sizes in the header.
pub fn entry(name: &str, extra: &[u8], method: u16, data: &[u8]) -> Vec<u8> {
    let payload = if method == 8 { deflate(data) } else { data.to_vec() };
    let mut b = Lfh {
        flags: 0,
        method,
        crc32: crc32fast::hash(data),
        compressed: payload.len() as u32,
        uncompressed: data.len() as u32,
        name_len: name.len() as u16,
        extra_len: extra.len() as u16,
    }
    .bytes();
    b.extend_from_slice(name.as_bytes());
    b.extend_from_slice(extra);
    b.extend_from_slice(&payload);
    b
}

/// Deflated entry written the way streaming encoders do: zero sizes in the
/// header and a data descriptor after the payload.
pub fn streamed_entry(name: &str, extra: &[u8], data: &[u8]) -> Vec<u8> {
    let payload = deflate(data);
    let mut b = Lfh {
        flags: 0x08,
        method: 8,
        crc32: 0,
        compressed: 0,
        uncompressed: 0,
        name_len: name.len() as u16,
        extra_len: extra.len() as u16,
    }
    .bytes();
    b.extend_from_slice(name.as_bytes());
    b.extend_from_slice(extra);
    b.extend_from_slice(&payload);
    b.extend(descriptor(crc32fast::hash(data), payload.len() as u32, data.len() as u32));
    b
}

/// Start of a central directory, enough to end a walk.
pub fn central_directory() -> Vec<u8> {
    let mut b = vec![0x50, 0x4B, 0x01, 0x02];
    b.extend_from_slice(&[0u8; 42]);
    b
}

pub fn sample_text(len: usize) -> Vec<u8> {
    b"<p>It was a bright cold day in April, and the clocks were striking thirteen.</p>\n"
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}
