//! Transparent decompression codecs wrapped around the raw archive bytes.
//!
//! The codec is auto-detected from the first few bytes of the archive
//! (see [`super::detect::sniff_codec`]) rather than from a file extension —
//! an archive named without a `.gz` suffix still decompresses correctly.

use std::io::Read;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

/// Compression codec transparently wrapped around a TAR byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    /// Gzip (deflate), magic bytes `1F 8B`.
    Gzip,
    /// Bzip2 (Burrows-Wheeler), magic bytes `BZh`.
    Bzip2,
    /// Xz (LZMA2), magic bytes `FD 37 7A 58 5A 00`.
    Xz,
}

impl CompressionCodec {
    /// Human-readable codec name, used in diagnostics and CLI output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        }
    }

    /// Wraps `reader` in the decompressor for this codec, type-erased so
    /// callers can treat plain and compressed archives uniformly.
    pub fn wrap<'a, R: Read + 'a>(self, reader: R) -> Box<dyn Read + 'a> {
        match self {
            Self::Gzip => Box::new(GzDecoder::new(reader)),
            Self::Bzip2 => Box::new(BzDecoder::new(reader)),
            Self::Xz => Box::new(XzDecoder::new(reader)),
        }
    }
}
