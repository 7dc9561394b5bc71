//! Magic-byte compression detection.
//!
//! The archive's compression codec is sniffed from its leading bytes, not
//! from a file extension — callers may hand us an archive with an
//! arbitrary or missing suffix.

use std::io::Read;

use crate::Result;

use super::compression::CompressionCodec;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZIP2_MAGIC: [u8; 3] = *b"BZh";
const XZ_MAGIC: [u8; 6] = [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];

/// Sniffs the compression codec from the first bytes of `reader`.
///
/// Returns `None` when the bytes match none of the known magics, meaning
/// the stream is an uncompressed (or already-unwrapped) TAR.
///
/// # Errors
///
/// Returns [`crate::ExtractionError::Io`] if reading the magic prefix
/// fails for a reason other than short input.
pub fn sniff_codec<R: Read>(reader: &mut R) -> Result<Option<CompressionCodec>> {
    let mut magic = [0u8; 6];
    let mut filled = 0usize;
    while filled < magic.len() {
        match reader.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    let magic = &magic[..filled];

    if magic.len() >= 2 && magic[..2] == GZIP_MAGIC {
        return Ok(Some(CompressionCodec::Gzip));
    }
    if magic.len() >= 3 && magic[..3] == BZIP2_MAGIC {
        return Ok(Some(CompressionCodec::Bzip2));
    }
    if magic.len() >= 6 && magic[..6] == XZ_MAGIC {
        return Ok(Some(CompressionCodec::Xz));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sniff_gzip() {
        let mut data = Cursor::new(vec![0x1f, 0x8b, 0x08, 0x00]);
        assert_eq!(sniff_codec(&mut data).unwrap(), Some(CompressionCodec::Gzip));
    }

    #[test]
    fn test_sniff_bzip2() {
        let mut data = Cursor::new(b"BZh91AY".to_vec());
        assert_eq!(sniff_codec(&mut data).unwrap(), Some(CompressionCodec::Bzip2));
    }

    #[test]
    fn test_sniff_xz() {
        let mut data = Cursor::new(vec![0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00, 0x00]);
        assert_eq!(sniff_codec(&mut data).unwrap(), Some(CompressionCodec::Xz));
    }

    #[test]
    fn test_sniff_plain_tar() {
        let mut data = Cursor::new(b"ustar\0".to_vec());
        assert_eq!(sniff_codec(&mut data).unwrap(), None);
    }

    #[test]
    fn test_sniff_short_input() {
        let mut data = Cursor::new(vec![0x1f]);
        assert_eq!(sniff_codec(&mut data).unwrap(), None);
    }

    #[test]
    fn test_sniff_empty_input() {
        let mut data = Cursor::new(Vec::<u8>::new());
        assert_eq!(sniff_codec(&mut data).unwrap(), None);
    }
}
