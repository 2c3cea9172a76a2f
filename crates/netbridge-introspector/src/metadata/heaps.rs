//! Metadata root, stream headers and the `#Strings`/`#Blob` heaps.

use super::MetadataError;
use super::reader::{Cursor, slice_at, u16_at, u32_at};

const METADATA_SIGNATURE: u32 = 0x424A_5342; // "BSJB"

/// The streams of a metadata root that the reader uses.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Streams<'a> {
    /// Runtime version string recorded in the root
    pub version: &'a str,
    /// `#~` (compressed) or `#-` (uncompressed) table stream
    pub tables: &'a [u8],
    pub strings: StringsHeap<'a>,
    pub blobs: BlobHeap<'a>,
}

impl<'a> Streams<'a> {
    /// Parses the metadata root header and its stream directory (II.24.2.1).
    pub(crate) fn parse(root: &'a [u8]) -> Result<Self, MetadataError> {
        if u32_at(root, 0).ok() != Some(METADATA_SIGNATURE) {
            return Err(MetadataError::NotManaged(
                "metadata root has no BSJB signature".to_string(),
            ));
        }

        let version_len = u32_at(root, 12)? as usize;
        let version_bytes = slice_at(root, 16, version_len)?;
        let version = std::str::from_utf8(version_bytes)
            .map_err(|_| MetadataError::Malformed("runtime version is not UTF-8".to_string()))?
            .trim_end_matches('\0');

        let flags_offset = 16 + version_len;
        let stream_count = u16_at(root, flags_offset + 2)?;
        let mut header = flags_offset + 4;

        let mut tables = None;
        let mut strings = None;
        let mut blobs = None;

        for _ in 0..stream_count {
            let offset = u32_at(root, header)? as usize;
            let size = u32_at(root, header + 4)? as usize;
            let name = read_stream_name(root, header + 8)?;
            let body = slice_at(root, offset, size)?;

            match name {
                "#~" | "#-" => tables = Some(body),
                "#Strings" => strings = Some(body),
                "#Blob" => blobs = Some(body),
                _ => {}
            }

            // Name is null-terminated and padded to a 4-byte boundary.
            header += 8 + (name.len() + 4) / 4 * 4;
        }

        Ok(Self {
            version,
            tables: tables
                .ok_or_else(|| MetadataError::Malformed("missing #~ table stream".to_string()))?,
            strings: StringsHeap(strings.unwrap_or_default()),
            blobs: BlobHeap(blobs.unwrap_or_default()),
        })
    }
}

fn read_stream_name(root: &[u8], offset: usize) -> Result<&str, MetadataError> {
    let tail = root.get(offset..).ok_or(MetadataError::Truncated { offset, len: 1 })?;
    let end = tail
        .iter()
        .take(32)
        .position(|&b| b == 0)
        .ok_or_else(|| MetadataError::Malformed("unterminated stream name".to_string()))?;
    std::str::from_utf8(&tail[..end])
        .map_err(|_| MetadataError::Malformed("stream name is not UTF-8".to_string()))
}

/// The `#Strings` heap: null-terminated UTF-8 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StringsHeap<'a>(&'a [u8]);

impl<'a> StringsHeap<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self(data)
    }

    /// Returns the string at byte offset `index`.
    pub(crate) fn get(&self, index: u32) -> Result<&'a str, MetadataError> {
        let start = index as usize;
        let tail = self.0.get(start..).ok_or(MetadataError::InvalidIndex {
            table: "#Strings",
            row: index,
        })?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        std::str::from_utf8(&tail[..end])
            .map_err(|_| MetadataError::Malformed(format!("string at 0x{index:X} is not UTF-8")))
    }
}

/// The `#Blob` heap: length-prefixed byte sequences.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BlobHeap<'a>(&'a [u8]);

impl<'a> BlobHeap<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self(data)
    }

    /// Returns the blob at byte offset `index`.
    pub(crate) fn get(&self, index: u32) -> Result<&'a [u8], MetadataError> {
        let start = index as usize;
        let tail = self.0.get(start..).ok_or(MetadataError::InvalidIndex {
            table: "#Blob",
            row: index,
        })?;
        let mut cursor = Cursor::new(tail);
        let len = cursor.compressed_u32()? as usize;
        slice_at(tail, cursor.position(), len)
    }
}
