//! Bounds-checked little-endian reads over an image buffer.

use super::MetadataError;

/// Reads a little-endian `u16` at `offset`.
pub(crate) fn u16_at(data: &[u8], offset: usize) -> Result<u16, MetadataError> {
    let bytes = slice_at(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Reads a little-endian `u32` at `offset`.
pub(crate) fn u32_at(data: &[u8], offset: usize) -> Result<u32, MetadataError> {
    let bytes = slice_at(data, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Reads a little-endian `u64` at `offset`.
pub(crate) fn u64_at(data: &[u8], offset: usize) -> Result<u64, MetadataError> {
    let bytes = slice_at(data, offset, 8)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(buf))
}

/// Reads an unsigned value of 1, 2 or 4 bytes at `offset`.
pub(crate) fn uint_at(data: &[u8], offset: usize, width: usize) -> Result<u32, MetadataError> {
    match width {
        1 => slice_at(data, offset, 1).map(|b| u32::from(b[0])),
        2 => u16_at(data, offset).map(u32::from),
        4 => u32_at(data, offset),
        _ => Err(MetadataError::Malformed(format!("unsupported column width {width}"))),
    }
}

/// Returns `len` bytes starting at `offset`.
pub(crate) fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8], MetadataError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(MetadataError::Truncated { offset, len })
}

/// Forward-only cursor used for signature blobs.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn u8(&mut self) -> Result<u8, MetadataError> {
        let byte = *self.data.get(self.pos).ok_or(MetadataError::Truncated {
            offset: self.pos,
            len: 1,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Reads an ECMA-335 compressed unsigned integer (II.23.2).
    pub(crate) fn compressed_u32(&mut self) -> Result<u32, MetadataError> {
        let first = self.u8()?;
        if first & 0x80 == 0 {
            Ok(u32::from(first))
        } else if first & 0xC0 == 0x80 {
            let second = self.u8()?;
            Ok((u32::from(first & 0x3F) << 8) | u32::from(second))
        } else if first & 0xE0 == 0xC0 {
            let rest = [self.u8()?, self.u8()?, self.u8()?];
            Ok((u32::from(first & 0x1F) << 24)
                | (u32::from(rest[0]) << 16)
                | (u32::from(rest[1]) << 8)
                | u32::from(rest[2]))
        } else {
            Err(MetadataError::Malformed(format!(
                "invalid compressed integer lead byte 0x{first:02X}"
            )))
        }
    }

    /// Number of bytes consumed so far.
    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_reads() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(u16_at(&data, 0).unwrap(), 0x1234);
        assert_eq!(u32_at(&data, 0).unwrap(), 0x5678_1234);
        assert_eq!(u64_at(&data, 0).unwrap(), 0x5678_1234);
        assert_eq!(uint_at(&data, 2, 1).unwrap(), 0x78);
        assert!(u32_at(&data, 6).is_err());
        assert!(slice_at(&data, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_compressed_integers() {
        // Examples from ECMA-335 II.23.2.
        let cases: [(&[u8], u32); 6] = [
            (&[0x03], 0x03),
            (&[0x7F], 0x7F),
            (&[0x80, 0x80], 0x80),
            (&[0xAE, 0x57], 0x2E57),
            (&[0xBF, 0xFF], 0x3FFF),
            (&[0xC0, 0x00, 0x40, 0x00], 0x4000),
        ];
        for (bytes, expected) in cases {
            let mut cursor = Cursor::new(bytes);
            assert_eq!(cursor.compressed_u32().unwrap(), expected);
            assert!(cursor.is_empty());
        }
    }

    #[test]
    fn test_position_tracks_bytes_read() {
        let mut cursor = Cursor::new(&[0x80, 0x05, 0x03]);
        assert_eq!(cursor.compressed_u32().unwrap(), 5);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.compressed_u32().unwrap(), 3);
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_compressed_integer_errors() {
        assert!(Cursor::new(&[0xFF]).compressed_u32().is_err());
        assert!(Cursor::new(&[0x80]).compressed_u32().is_err());
        assert!(Cursor::new(&[]).compressed_u32().is_err());
    }
}
