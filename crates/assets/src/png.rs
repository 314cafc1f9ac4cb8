//! PNG signature and chunk-stream parser.
//!
//! Reads the 8-byte file signature, then streams chunks: a 4-byte
//! big-endian length, a 4-character tag, `length` bytes of data, and a
//! 4-byte CRC computed over tag + data. Every chunk's CRC is recomputed and
//! compared; a mismatch is recorded on the chunk (`crc_matched = false`) and
//! must be checked before the data is trusted — corruption is surfaced,
//! never silently accepted.
//!
//! Recognized chunk types get a field-by-field structured decode; anything
//! else is retained with raw data only. The parser stops after `IEND`.

use std::io::{self, Read};

use crate::checksum::Crc32;

/// The 8-byte PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Chunks larger than this are treated as corruption rather than read into
/// memory. Printer-bound images are far smaller.
const MAX_CHUNK_LEN: u32 = 64 * 1024 * 1024;

/// PNG parsing failures.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PngError {
    /// The stream does not begin with the PNG signature.
    #[error("not a PNG: bad signature")]
    BadSignature,

    /// The stream ended in the middle of a chunk.
    #[error("unexpected end of stream while reading {context}")]
    Truncated {
        /// What was being read when the stream ended.
        context: &'static str,
    },

    /// A chunk tag contained non-ASCII-letter bytes.
    #[error("invalid chunk tag {bytes:02X?}")]
    InvalidChunkTag {
        /// The offending tag bytes.
        bytes: [u8; 4],
    },

    /// A declared chunk length exceeds the sanity limit.
    #[error("chunk {chunk_type} declares an implausible length of {length} bytes")]
    ChunkTooLarge {
        /// The chunk tag.
        chunk_type: String,
        /// The declared data length.
        length: u32,
    },

    /// A recognized chunk's data did not match its fixed field layout.
    #[error("chunk {chunk_type} is malformed: {details}")]
    MalformedChunk {
        /// The chunk tag.
        chunk_type: String,
        /// What was wrong with the layout.
        details: String,
    },

    /// Reading from the underlying stream failed.
    #[error("read failed: {0}")]
    ReadFailed(#[source] io::Error),
}

/// Structured decode of a recognized chunk type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkData {
    /// `IHDR` — image header.
    ImageHeader {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Bits per sample or palette index.
        bit_depth: u8,
        /// Color type code.
        color_type: u8,
        /// Compression method (always 0 in well-formed files).
        compression: u8,
        /// Filter method (always 0 in well-formed files).
        filter: u8,
        /// Interlace method (0 none, 1 Adam7).
        interlace: u8,
    },
    /// `PLTE` — palette entries as RGB triples.
    Palette(Vec<[u8; 3]>),
    /// `pHYs` — intended physical pixel density.
    PhysicalDimensions {
        /// Pixels per unit along the X axis.
        x_pixels_per_unit: u32,
        /// Pixels per unit along the Y axis.
        y_pixels_per_unit: u32,
        /// Unit code (0 unspecified, 1 metre).
        unit: u8,
    },
    /// `sRGB` — rendering intent.
    SrgbIntent(u8),
    /// `gAMA` — image gamma times 100000.
    Gamma(u32),
    /// `iCCP` — embedded ICC profile.
    ///
    /// The profile payload is carried as the raw zlib stream it arrives in:
    /// decompressing it is out of scope for this parser.
    IccProfile {
        /// Profile name (1–79 bytes before the null separator).
        name: String,
        /// Compression method byte (0 = deflate).
        compression_method: u8,
        /// The still-compressed profile stream.
        compressed_profile: Vec<u8>,
    },
}

/// One parsed chunk. Read-only once produced.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Four-character chunk tag, e.g. `IHDR`.
    pub chunk_type: String,
    /// Declared data length.
    pub length: u32,
    /// Raw chunk data. Only trustworthy when `crc_matched` is true.
    pub data: Vec<u8>,
    /// CRC stored in the file.
    pub stored_crc: u32,
    /// CRC computed over tag + data.
    pub computed_crc: u32,
    /// Whether the stored and computed CRCs agree.
    pub crc_matched: bool,
    /// Tag case bit: ancillary (true) vs critical (false).
    pub ancillary: bool,
    /// Tag case bit: private (true) vs public (false).
    pub private: bool,
    /// Tag case bit: safe to copy through editors that do not understand it.
    pub safe_to_copy: bool,
    /// Structured decode, present for recognized types with a matching CRC.
    pub decoded: Option<ChunkData>,
}

/// Parse a PNG chunk stream from a byte slice.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<Chunk>, PngError> {
    parse(&mut io::Cursor::new(bytes))
}

/// Parse a PNG chunk stream from a reader.
///
/// Verifies the signature, then reads chunks until `IEND` (or a clean end
/// of stream at a chunk boundary). CRC mismatches are recorded per chunk,
/// not raised — the caller decides how to treat corruption.
pub fn parse(reader: &mut impl Read) -> Result<Vec<Chunk>, PngError> {
    let mut signature = [0u8; 8];
    read_fully(reader, &mut signature, "signature")?;
    if signature != SIGNATURE {
        return Err(PngError::BadSignature);
    }

    let mut chunks = Vec::new();
    loop {
        let mut len_buf = [0u8; 4];
        if !read_fully_or_eof(reader, &mut len_buf, "chunk length")? {
            break;
        }
        let length = u32::from_be_bytes(len_buf);

        let mut tag = [0u8; 4];
        read_fully(reader, &mut tag, "chunk tag")?;
        if !tag.iter().all(u8::is_ascii_alphabetic) {
            return Err(PngError::InvalidChunkTag { bytes: tag });
        }
        let chunk_type: String = tag.iter().map(|&b| b as char).collect();

        if length > MAX_CHUNK_LEN {
            return Err(PngError::ChunkTooLarge { chunk_type, length });
        }

        let mut data = vec![0u8; length as usize];
        read_fully(reader, &mut data, "chunk data")?;

        let mut crc_buf = [0u8; 4];
        read_fully(reader, &mut crc_buf, "chunk CRC")?;
        let stored_crc = u32::from_be_bytes(crc_buf);

        let mut crc = Crc32::new();
        crc.update(&tag);
        crc.update(&data);
        let computed_crc = crc.finalize();
        let crc_matched = stored_crc == computed_crc;

        let decoded = if crc_matched {
            decode_chunk(&chunk_type, &data)?
        } else {
            None
        };

        let is_end = chunk_type == "IEND";
        chunks.push(Chunk {
            // Bit 5 of each tag byte is the PNG property bit.
            ancillary: tag[0] & 0x20 != 0,
            private: tag[1] & 0x20 != 0,
            safe_to_copy: tag[3] & 0x20 != 0,
            chunk_type,
            length,
            data,
            stored_crc,
            computed_crc,
            crc_matched,
            decoded,
        });

        if is_end {
            break;
        }
    }

    Ok(chunks)
}

/// Field-by-field decode for recognized chunk types.
fn decode_chunk(chunk_type: &str, data: &[u8]) -> Result<Option<ChunkData>, PngError> {
    let malformed = |details: String| PngError::MalformedChunk {
        chunk_type: chunk_type.to_string(),
        details,
    };

    match chunk_type {
        "IHDR" => {
            if data.len() != 13 {
                return Err(malformed(format!("expected 13 bytes, got {}", data.len())));
            }
            Ok(Some(ChunkData::ImageHeader {
                width: be_u32(&data[0..4]),
                height: be_u32(&data[4..8]),
                bit_depth: data[8],
                color_type: data[9],
                compression: data[10],
                filter: data[11],
                interlace: data[12],
            }))
        }
        "PLTE" => {
            if data.len() % 3 != 0 {
                return Err(malformed(format!(
                    "palette length {} is not a multiple of 3",
                    data.len()
                )));
            }
            let entries = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
            Ok(Some(ChunkData::Palette(entries)))
        }
        "pHYs" => {
            if data.len() != 9 {
                return Err(malformed(format!("expected 9 bytes, got {}", data.len())));
            }
            Ok(Some(ChunkData::PhysicalDimensions {
                x_pixels_per_unit: be_u32(&data[0..4]),
                y_pixels_per_unit: be_u32(&data[4..8]),
                unit: data[8],
            }))
        }
        "sRGB" => {
            if data.len() != 1 {
                return Err(malformed(format!("expected 1 byte, got {}", data.len())));
            }
            Ok(Some(ChunkData::SrgbIntent(data[0])))
        }
        "gAMA" => {
            if data.len() != 4 {
                return Err(malformed(format!("expected 4 bytes, got {}", data.len())));
            }
            Ok(Some(ChunkData::Gamma(be_u32(data))))
        }
        "iCCP" => {
            let Some(null_pos) = data.iter().position(|&b| b == 0) else {
                return Err(malformed("missing null after profile name".to_string()));
            };
            if null_pos == 0 || null_pos > 79 {
                return Err(malformed(format!("profile name length {null_pos}")));
            }
            if null_pos + 1 >= data.len() {
                return Err(malformed("missing compression method byte".to_string()));
            }
            Ok(Some(ChunkData::IccProfile {
                name: String::from_utf8_lossy(&data[..null_pos]).into_owned(),
                compression_method: data[null_pos + 1],
                compressed_profile: data[null_pos + 2..].to_vec(),
            }))
        }
        _ => Ok(None),
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Fill `buf` completely, mapping a short read to [`PngError::Truncated`].
fn read_fully(
    reader: &mut impl Read,
    buf: &mut [u8],
    context: &'static str,
) -> Result<(), PngError> {
    if read_fully_or_eof(reader, buf, context)? {
        Ok(())
    } else {
        Err(PngError::Truncated { context })
    }
}

/// Fill `buf` completely. Returns `Ok(false)` on a clean end of stream
/// before the first byte, `Err(Truncated)` on a partial fill.
fn read_fully_or_eof(
    reader: &mut impl Read,
    buf: &mut [u8],
    context: &'static str,
) -> Result<bool, PngError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(PngError::Truncated { context }),
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(PngError::ReadFailed(e)),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::crc32;

    /// Serialize one chunk: length, tag, data, CRC over tag + data.
    fn make_chunk(tag: &str, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(tag.as_bytes());
        out.extend_from_slice(data);
        let mut checksummed = tag.as_bytes().to_vec();
        checksummed.extend_from_slice(data);
        out.extend_from_slice(&crc32(&checksummed).to_be_bytes());
        out
    }

    fn ihdr_data(width: u32, height: u32) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&width.to_be_bytes());
        d.extend_from_slice(&height.to_be_bytes());
        d.extend_from_slice(&[8, 2, 0, 0, 0]);
        d
    }

    fn minimal_png() -> Vec<u8> {
        let mut png = SIGNATURE.to_vec();
        png.extend(make_chunk("IHDR", &ihdr_data(4, 2)));
        png.extend(make_chunk("IDAT", &[1, 2, 3, 4]));
        png.extend(make_chunk("IEND", &[]));
        png
    }

    #[test]
    fn rejects_bad_signature() {
        let result = parse_bytes(b"GIF89a..");
        assert!(matches!(result, Err(PngError::BadSignature)));
    }

    #[test]
    fn parses_minimal_chunk_stream() {
        let chunks = parse_bytes(&minimal_png()).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chunk_type, "IHDR");
        assert_eq!(chunks[1].chunk_type, "IDAT");
        assert_eq!(chunks[2].chunk_type, "IEND");
        assert!(chunks.iter().all(|c| c.crc_matched));
    }

    #[test]
    fn decodes_image_header_fields() {
        let chunks = parse_bytes(&minimal_png()).unwrap();
        match chunks[0].decoded.as_ref().unwrap() {
            ChunkData::ImageHeader {
                width,
                height,
                bit_depth,
                color_type,
                ..
            } => {
                assert_eq!(*width, 4);
                assert_eq!(*height, 2);
                assert_eq!(*bit_depth, 8);
                assert_eq!(*color_type, 2);
            }
            other => panic!("expected ImageHeader, got {other:?}"),
        }
    }

    #[test]
    fn corrupted_crc_is_reported_not_fatal() {
        let mut png = minimal_png();
        // Flip a byte inside the IDAT data (signature 8 + IHDR 25 +
        // IDAT length/tag 8 puts data at offset 41).
        png[41] ^= 0xFF;
        let chunks = parse_bytes(&png).unwrap();
        let idat = &chunks[1];
        assert_eq!(idat.chunk_type, "IDAT");
        assert!(!idat.crc_matched);
        assert_ne!(idat.stored_crc, idat.computed_crc);
        // Type, length, and data are still returned.
        assert_eq!(idat.length, 4);
        assert_eq!(idat.data.len(), 4);
        // Others are unaffected.
        assert!(chunks[0].crc_matched);
        assert!(chunks[2].crc_matched);
    }

    #[test]
    fn tag_case_bits_drive_property_flags() {
        let mut png = SIGNATURE.to_vec();
        png.extend(make_chunk("IHDR", &ihdr_data(1, 1)));
        png.extend(make_chunk("tEXt", b"k\0v"));
        png.extend(make_chunk("IEND", &[]));
        let chunks = parse_bytes(&png).unwrap();

        let ihdr = &chunks[0];
        assert!(!ihdr.ancillary);
        assert!(!ihdr.private);
        assert!(!ihdr.safe_to_copy);

        let text = &chunks[1];
        assert!(text.ancillary);
        assert!(!text.private);
        assert!(text.safe_to_copy);
        assert!(text.decoded.is_none());
    }

    #[test]
    fn decodes_phys_srgb_gama() {
        let mut phys = Vec::new();
        phys.extend_from_slice(&2835u32.to_be_bytes());
        phys.extend_from_slice(&2835u32.to_be_bytes());
        phys.push(1);

        let mut png = SIGNATURE.to_vec();
        png.extend(make_chunk("IHDR", &ihdr_data(1, 1)));
        png.extend(make_chunk("pHYs", &phys));
        png.extend(make_chunk("sRGB", &[0]));
        png.extend(make_chunk("gAMA", &45455u32.to_be_bytes()));
        png.extend(make_chunk("IEND", &[]));

        let chunks = parse_bytes(&png).unwrap();
        assert_eq!(
            chunks[1].decoded,
            Some(ChunkData::PhysicalDimensions {
                x_pixels_per_unit: 2835,
                y_pixels_per_unit: 2835,
                unit: 1,
            })
        );
        assert_eq!(chunks[2].decoded, Some(ChunkData::SrgbIntent(0)));
        assert_eq!(chunks[3].decoded, Some(ChunkData::Gamma(45455)));
    }

    #[test]
    fn decodes_palette_triples() {
        let mut png = SIGNATURE.to_vec();
        png.extend(make_chunk("IHDR", &ihdr_data(1, 1)));
        png.extend(make_chunk("PLTE", &[255, 0, 0, 0, 255, 0]));
        png.extend(make_chunk("IEND", &[]));
        let chunks = parse_bytes(&png).unwrap();
        assert_eq!(
            chunks[1].decoded,
            Some(ChunkData::Palette(vec![[255, 0, 0], [0, 255, 0]]))
        );
    }

    #[test]
    fn iccp_profile_stays_compressed() {
        let mut iccp = b"sRGB IEC61966".to_vec();
        iccp.push(0);
        iccp.push(0); // deflate
        iccp.extend_from_slice(&[0x78, 0x9C, 0x01, 0x02]);

        let mut png = SIGNATURE.to_vec();
        png.extend(make_chunk("IHDR", &ihdr_data(1, 1)));
        png.extend(make_chunk("iCCP", &iccp));
        png.extend(make_chunk("IEND", &[]));

        let chunks = parse_bytes(&png).unwrap();
        match chunks[1].decoded.as_ref().unwrap() {
            ChunkData::IccProfile {
                name,
                compression_method,
                compressed_profile,
            } => {
                assert_eq!(name, "sRGB IEC61966");
                assert_eq!(*compression_method, 0);
                assert_eq!(compressed_profile, &[0x78, 0x9C, 0x01, 0x02]);
            }
            other => panic!("expected IccProfile, got {other:?}"),
        }
    }

    #[test]
    fn malformed_recognized_chunk_is_an_error() {
        let mut png = SIGNATURE.to_vec();
        png.extend(make_chunk("IHDR", &[0, 0, 0, 1])); // 4 bytes, not 13
        let result = parse_bytes(&png);
        assert!(matches!(result, Err(PngError::MalformedChunk { .. })));
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut png = minimal_png();
        png.truncate(png.len() - 3);
        let result = parse_bytes(&png);
        assert!(matches!(result, Err(PngError::Truncated { .. })));
    }

    #[test]
    fn invalid_tag_is_an_error() {
        let mut png = SIGNATURE.to_vec();
        png.extend_from_slice(&4u32.to_be_bytes());
        png.extend_from_slice(&[0x00, b'H', b'D', b'R']);
        png.extend_from_slice(&[0; 8]);
        let result = parse_bytes(&png);
        assert!(matches!(result, Err(PngError::InvalidChunkTag { .. })));
    }

    #[test]
    fn stops_after_iend() {
        let mut png = minimal_png();
        png.extend_from_slice(b"trailing junk that is not chunk data");
        let chunks = parse_bytes(&png).unwrap();
        assert_eq!(chunks.len(), 3);
    }
}
