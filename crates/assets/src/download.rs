//! Printer download objects (`~DY`).
//!
//! Converts a named binary asset into the byte sequence that stores it in
//! printer memory, where drawing commands can reference it later. Payloads
//! are always hex-framed: the printer's CRC-16 variant for base64-framed
//! downloads is proprietary and cannot be verified on this side, so that
//! framing is rejected outright rather than sent unchecked.

use zpl_courier_core::template::ValidationError;
use zpl_courier_core::{ParamValues, commands};

use crate::encode;
use crate::png;

/// Printer storage drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drive {
    /// Volatile RAM (`R:`).
    #[default]
    Ram,
    /// Onboard flash (`E:`).
    Flash,
    /// Memory card (`B:`).
    Card,
    /// USB storage (`A:`).
    Usb,
}

impl Drive {
    /// The single-letter drive code.
    pub fn letter(self) -> &'static str {
        match self {
            Drive::Ram => "R",
            Drive::Flash => "E",
            Drive::Card => "B",
            Drive::Usb => "A",
        }
    }
}

/// Payload framing for a download object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadEncoding {
    /// Two uppercase hex digits per byte. The only verifiable framing.
    #[default]
    Hex,
    /// Base64 framing. Always rejected — see [`DownloadError::Base64Unverifiable`].
    Base64,
}

/// Failures while building a download object.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The source image could not be parsed at all.
    #[error(transparent)]
    Png(#[from] png::PngError),

    /// A chunk failed CRC verification; the image is corrupt and must not
    /// be stored on the printer.
    #[error("refusing corrupt image: chunk {chunk_type} failed CRC verification")]
    CorruptImage {
        /// The tag of the first chunk whose CRC did not match.
        chunk_type: String,
    },

    /// Object name or other parameter rejected by the command grammar.
    #[error(transparent)]
    InvalidParams(#[from] ValidationError),

    /// Base64 framing was requested. The printer checks base64-framed
    /// downloads with a proprietary CRC-16 this client cannot compute, so
    /// the upload would be unverifiable end to end.
    #[error("base64 download framing is unverifiable; use hex")]
    Base64Unverifiable,
}

/// A named asset ready to become a printer-resident object.
#[derive(Debug, Clone)]
pub struct DownloadObject {
    drive: Drive,
    name: String,
    format: &'static str,
    extension: &'static str,
    payload: Vec<u8>,
}

impl DownloadObject {
    /// A PNG image object.
    ///
    /// The image is parsed and every chunk's CRC verified first: a corrupt
    /// file is refused here rather than discovered as garbage output on
    /// the printed label.
    pub fn png(drive: Drive, name: &str, image: &[u8]) -> Result<Self, DownloadError> {
        let chunks = png::parse_bytes(image)?;
        if let Some(bad) = chunks.iter().find(|c| !c.crc_matched) {
            return Err(DownloadError::CorruptImage {
                chunk_type: bad.chunk_type.clone(),
            });
        }
        Ok(Self {
            drive,
            name: name.to_string(),
            format: "P",
            extension: "P",
            payload: image.to_vec(),
        })
    }

    /// A TrueType/OpenType font object. The font file is treated as an
    /// opaque binary payload.
    pub fn font(drive: Drive, name: &str, font: &[u8]) -> Result<Self, DownloadError> {
        Ok(Self {
            drive,
            name: name.to_string(),
            format: "B",
            extension: "T",
            payload: font.to_vec(),
        })
    }

    /// The storage drive this object will land on.
    pub fn drive(&self) -> Drive {
        self.drive
    }

    /// The object name (1–8 alphanumeric characters, validated at render).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw payload size in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Render the `~DY` command bytes with hex payload framing.
    pub fn render(&self) -> Result<Vec<u8>, DownloadError> {
        self.render_with_encoding(PayloadEncoding::Hex)
    }

    /// Render with an explicit framing choice. Base64 is always rejected.
    pub fn render_with_encoding(
        &self,
        encoding: PayloadEncoding,
    ) -> Result<Vec<u8>, DownloadError> {
        let framed = match encoding {
            PayloadEncoding::Hex => encode::to_hex(&self.payload),
            PayloadEncoding::Base64 => return Err(DownloadError::Base64Unverifiable),
        };

        let total = self.payload.len() as i64;
        let values = ParamValues::new()
            .set("drive", self.drive.letter())
            .set("name", self.name.as_str())
            .set("format", self.format)
            .set("ext", self.extension)
            .set("total", total)
            .set("row", total)
            .set("data", framed);
        Ok(commands::DOWNLOAD_OBJECT.render_bytes(&values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::crc32;

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

    fn tiny_png() -> Vec<u8> {
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);

        let mut png = png::SIGNATURE.to_vec();
        png.extend(make_chunk("IHDR", &ihdr));
        png.extend(make_chunk("IDAT", &[0xAB, 0xCD]));
        png.extend(make_chunk("IEND", &[]));
        png
    }

    #[test]
    fn png_object_renders_hex_framed_dy() {
        let image = tiny_png();
        let object = DownloadObject::png(Drive::Ram, "LOGO", &image).unwrap();
        let rendered = object.render().unwrap();
        let text = String::from_utf8(rendered).unwrap();

        let expected_prefix = format!("~DYR:LOGO,P,P,{},{},", image.len(), image.len());
        assert!(text.starts_with(&expected_prefix), "rendered: {text}");
        assert!(text.ends_with(&encode::to_hex(&image)), "rendered: {text}");
    }

    #[test]
    fn corrupt_png_is_refused() {
        let mut image = tiny_png();
        let idx = image.len() - 1; // last byte of IEND's stored CRC
        image[idx] ^= 0xFF;
        let err = DownloadObject::png(Drive::Ram, "LOGO", &image).unwrap_err();
        match err {
            DownloadError::CorruptImage { chunk_type } => assert_eq!(chunk_type, "IEND"),
            other => panic!("expected CorruptImage, got {other:?}"),
        }
    }

    #[test]
    fn base64_framing_is_rejected() {
        let object = DownloadObject::png(Drive::Ram, "LOGO", &tiny_png()).unwrap();
        let err = object
            .render_with_encoding(PayloadEncoding::Base64)
            .unwrap_err();
        assert!(matches!(err, DownloadError::Base64Unverifiable));
    }

    #[test]
    fn invalid_object_name_is_rejected_at_render() {
        let object = DownloadObject::png(Drive::Ram, "NINECHARS", &tiny_png()).unwrap();
        let err = object.render().unwrap_err();
        match err {
            DownloadError::InvalidParams(v) => assert!(v.errors.contains_key("name")),
            other => panic!("expected InvalidParams, got {other:?}"),
        }
    }

    #[test]
    fn font_objects_are_opaque_binary() {
        let font = vec![0x00, 0x01, 0x00, 0x00, 0xDE, 0xAD];
        let object = DownloadObject::font(Drive::Flash, "BODY", &font).unwrap();
        let text = String::from_utf8(object.render().unwrap()).unwrap();
        assert!(text.starts_with("~DYE:BODY,B,T,6,6,"), "rendered: {text}");
        assert!(text.ends_with("00010000DEAD"), "rendered: {text}");
    }
}
