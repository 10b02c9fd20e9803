use anyhow::Result;

use crate::io::ByteStream;

use super::inflate::{Decompressor, Inflater};
use super::structures::*;

/// Read the entry name that follows a Local File Header.
///
/// This is the step between [`decode`](super::header::decode) and
/// [`skip_entry`]: afterwards the stream sits on the extra field. Returns
/// `None` if the stream ends inside the name.
pub fn read_name<S: ByteStream + ?Sized>(
    stream: &mut S,
    header: &ZipHeader,
) -> Result<Option<Vec<u8>>> {
    let mut name = vec![0u8; header.name_length as usize];
    if stream.read(&mut name)? != name.len() {
        return Ok(None);
    }
    Ok(Some(name))
}

/// Move past the extra field and payload of a local entry, inflating
/// deferred-size entries to find where they end.
///
/// The stream must be positioned just after the entry name (see
/// [`read_name`]). Returns the header with `uncompressed_size` replaced by
/// the measured size when the entry had to be inflated; descriptors and
/// unknown records are returned unchanged without touching the stream.
pub fn skip_entry<S: ByteStream + ?Sized>(stream: &mut S, header: &ZipHeader) -> Result<ZipHeader> {
    skip_entry_with(stream, header, Inflater::new)
}

/// [`skip_entry`] with a caller-supplied decompressor.
///
/// `make_decompressor` runs only for deferred-size entries.
pub fn skip_entry_with<S, D, F>(stream: &mut S, header: &ZipHeader, make_decompressor: F) -> Result<ZipHeader>
where
    S: ByteStream + ?Sized,
    D: Decompressor,
    F: FnOnce() -> D,
{
    let mut header = *header;
    if header.kind() != HeaderKind::LocalFile {
        return Ok(header);
    }

    if header.has_deferred_size() {
        stream.skip(u64::from(header.extra_length))?;

        let mut decompressor = make_decompressor();
        let mut chunk = [0u8; INFLATE_CHUNK];
        let mut measured: u64 = 0;
        loop {
            let n = decompressor.decompress(stream, &mut chunk)?;
            measured += n as u64;
            if n != INFLATE_CHUNK {
                break;
            }
        }
        // The stream now points at the data descriptor, left for the caller.
        header.uncompressed_size = u32::try_from(measured).unwrap_or(u32::MAX);
    } else {
        stream.skip(u64::from(header.extra_length) + u64::from(header.compressed_size))?;
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ArchiveStream;
    use std::io::Cursor;

    /// Hands out a fixed sequence of chunk sizes without touching the stream.
    struct Scripted {
        sizes: Vec<usize>,
    }

    impl Decompressor for Scripted {
        fn decompress<S: ByteStream + ?Sized>(&mut self, _: &mut S, out: &mut [u8]) -> Result<usize> {
            let n = if self.sizes.is_empty() { 0 } else { self.sizes.remove(0) };
            assert!(n <= out.len());
            Ok(n)
        }
    }

    fn local(method: u16, flags: u16, compressed: u32, extra: u16) -> ZipHeader {
        ZipHeader {
            signature: LOCAL_FILE_SIGNATURE,
            compression_method: method,
            flags,
            compressed_size: compressed,
            uncompressed_size: 999,
            name_length: 4,
            extra_length: extra,
            ..Default::default()
        }
    }

    fn stream(len: usize) -> ArchiveStream<Cursor<Vec<u8>>> {
        ArchiveStream::new(Cursor::new(vec![0u8; len]))
    }

    #[test]
    fn read_name_consumes_name_bytes() {
        let mut s = ArchiveStream::new(Cursor::new(b"file.txtEXTRA".to_vec()));
        let header = ZipHeader {
            name_length: 8,
            ..local(0, 0, 0, 5)
        };
        assert_eq!(read_name(&mut s, &header).unwrap().unwrap(), b"file.txt");
        assert_eq!(s.offset(), 8);
    }

    #[test]
    fn read_name_reports_truncation() {
        let mut s = ArchiveStream::new(Cursor::new(b"fi".to_vec()));
        assert!(read_name(&mut s, &local(0, 0, 0, 0)).unwrap().is_none());
    }

    #[test]
    fn declared_size_is_trusted_without_decompressing() {
        let mut s = stream(100);
        let header = local(8, 0, 40, 6);
        let skipped = skip_entry_with(&mut s, &header, || -> Scripted {
            panic!("decompressor must not be created")
        })
        .unwrap();
        assert_eq!(s.offset(), 46);
        assert_eq!(skipped, header);
    }

    #[test]
    fn stored_with_descriptor_flag_uses_declared_size() {
        let mut s = stream(100);
        let header = local(0, FLAG_DATA_DESCRIPTOR, 10, 2);
        skip_entry_with(&mut s, &header, || -> Scripted { panic!("stored entry inflated") }).unwrap();
        assert_eq!(s.offset(), 12);
    }

    #[test]
    fn deferred_size_is_measured_from_chunks() {
        let mut s = stream(100);
        let header = local(8, FLAG_DATA_DESCRIPTOR, 0, 3);
        let skipped = skip_entry_with(&mut s, &header, || Scripted {
            sizes: vec![2048, 2048, 17, 2048],
        })
        .unwrap();
        assert_eq!(skipped.uncompressed_size, 2048 * 2 + 17);
        assert_eq!(s.offset(), 3);
        // Only the returned copy changes.
        assert_eq!(header.uncompressed_size, 999);
    }

    #[test]
    fn deferred_size_stops_on_empty_chunk() {
        let mut s = stream(10);
        let header = local(8, FLAG_DATA_DESCRIPTOR, 0, 0);
        let skipped = skip_entry_with(&mut s, &header, || Scripted {
            sizes: vec![2048, 0],
        })
        .unwrap();
        assert_eq!(skipped.uncompressed_size, 2048);
    }

    #[test]
    fn descriptor_records_are_left_alone() {
        let mut s = stream(10);
        let header = ZipHeader {
            signature: DATA_DESCRIPTOR_SIGNATURE,
            compressed_size: 5,
            ..Default::default()
        };
        assert_eq!(skip_entry(&mut s, &header).unwrap(), header);
        assert_eq!(s.offset(), 0);
    }
}
