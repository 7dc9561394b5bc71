//! TAR archive handling: compression detection, codec wrapping, and the
//! extraction pipeline itself.

pub mod compression;
pub mod detect;
pub mod tar;

pub use compression::CompressionCodec;
pub use detect::sniff_codec;
pub use tar::{extract, list_members, Preflight};
