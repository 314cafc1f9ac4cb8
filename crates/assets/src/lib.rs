//! zpl-courier asset codecs.
//!
//! Converts raster images and fonts into printer-resident download objects:
//! PNG chunk parsing with CRC verification, CRC-32/Adler-32 checksums,
//! hex/base64 text framing, and the `~DY` download-object builder.

#![warn(missing_docs)]

/// CRC-32 and Adler-32 checksum computation.
pub mod checksum;
/// `~DY` download-object construction.
pub mod download;
/// Hex and base64 byte-to-text encoders.
pub mod encode;
/// PNG signature and chunk-stream parsing.
pub mod png;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use checksum::{Crc32, adler32, crc32};
pub use download::{DownloadError, DownloadObject, Drive, PayloadEncoding};
pub use encode::{to_base64, to_hex};
pub use png::{Chunk, ChunkData, PngError};
