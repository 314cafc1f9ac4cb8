//! QR Code sizing for the `^BQ` barcode field.
//!
//! The printer renders the symbol itself; this module only decides what to
//! tell it: the data input mode, the error-correction level, a magnification
//! that approximates the caller's target width, and the `^FD` payload prefix
//! that encodes those choices.

use std::fmt;

/// QR error-correction level, in increasing order of redundancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcLevel {
    /// ~7% recovery (ZPL `L`, "high density").
    Low,
    /// ~15% recovery (ZPL `M`, "standard").
    Medium,
    /// ~25% recovery (ZPL `Q`, "high reliability").
    Quartile,
    /// ~30% recovery (ZPL `H`, "ultra-high reliability").
    High,
}

impl EcLevel {
    /// The ZPL letter code for this level.
    pub fn letter(self) -> char {
        match self {
            EcLevel::Low => 'L',
            EcLevel::Medium => 'M',
            EcLevel::Quartile => 'Q',
            EcLevel::High => 'H',
        }
    }

    fn index(self) -> usize {
        match self {
            EcLevel::Low => 0,
            EcLevel::Medium => 1,
            EcLevel::Quartile => 2,
            EcLevel::High => 3,
        }
    }
}

/// QR data input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrMode {
    /// Digits only.
    Numeric,
    /// The restricted QR alphanumeric charset
    /// (digits, uppercase letters, space, `$%*+-./:`).
    Alphanumeric,
    /// Arbitrary 8-bit data.
    Byte,
}

impl QrMode {
    /// The ZPL character-mode letter.
    pub fn letter(self) -> char {
        match self {
            QrMode::Numeric => 'N',
            QrMode::Alphanumeric => 'A',
            QrMode::Byte => 'B',
        }
    }

    fn index(self) -> usize {
        match self {
            QrMode::Numeric => 0,
            QrMode::Alphanumeric => 1,
            QrMode::Byte => 2,
        }
    }
}

/// Payload exceeds the capacity of every supported QR version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayloadTooLarge {
    /// Payload length in characters.
    pub len: usize,
    /// The data mode the capacity was checked against.
    pub mode: QrMode,
    /// The requested error-correction level.
    pub ec: EcLevel,
}

impl fmt::Display for QrPayloadTooLarge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QR payload of {} characters exceeds version {MAX_VERSION} capacity for mode {} at level {}",
            self.len,
            self.mode.letter(),
            self.ec.letter(),
        )
    }
}

impl std::error::Error for QrPayloadTooLarge {}

/// Highest QR version this table covers. Label-scale payloads fit well
/// within it; longer data is rejected rather than mis-sized.
pub const MAX_VERSION: u32 = 10;

/// Character capacities for model 2 QR versions 1–10.
/// Indexed `[version - 1][mode][ec]` with modes N/A/B and levels L/M/Q/H.
const CAPACITY: [[[u16; 4]; 3]; MAX_VERSION as usize] = [
    [[41, 34, 27, 17], [25, 20, 16, 10], [17, 14, 11, 7]],
    [[77, 63, 48, 34], [47, 38, 29, 20], [32, 26, 20, 14]],
    [[127, 101, 77, 58], [77, 61, 47, 35], [53, 42, 32, 24]],
    [[187, 149, 111, 82], [114, 90, 67, 50], [78, 62, 46, 34]],
    [[255, 202, 144, 106], [154, 122, 87, 64], [106, 84, 60, 44]],
    [[322, 255, 178, 139], [195, 154, 108, 84], [134, 106, 74, 58]],
    [[370, 293, 207, 154], [224, 178, 125, 93], [154, 122, 86, 64]],
    [[461, 365, 259, 202], [279, 221, 157, 122], [192, 152, 108, 84]],
    [[552, 432, 312, 235], [335, 262, 189, 143], [230, 180, 130, 98]],
    [[652, 513, 364, 288], [395, 311, 221, 174], [271, 213, 151, 119]],
];

/// Classify payload text into the densest QR mode that can carry it.
pub fn classify(data: &str) -> QrMode {
    if !data.is_empty() && data.bytes().all(|b| b.is_ascii_digit()) {
        return QrMode::Numeric;
    }
    if !data.is_empty() && data.bytes().all(is_qr_alphanumeric) {
        return QrMode::Alphanumeric;
    }
    QrMode::Byte
}

fn is_qr_alphanumeric(b: u8) -> bool {
    b.is_ascii_digit()
        || b.is_ascii_uppercase()
        || matches!(b, b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':')
}

/// The smallest version whose `[mode][ec]` capacity covers `len` characters.
pub fn min_version(mode: QrMode, ec: EcLevel, len: usize) -> Result<u32, QrPayloadTooLarge> {
    for (i, caps) in CAPACITY.iter().enumerate() {
        if usize::from(caps[mode.index()][ec.index()]) >= len {
            return Ok(i as u32 + 1);
        }
    }
    Err(QrPayloadTooLarge { len, mode, ec })
}

/// Symbol dimension in modules for a model 2 QR version.
pub fn version_dimension(version: u32) -> u32 {
    17 + 4 * version
}

/// Magnification that brings the symbol closest to (but not past)
/// `target_width_dots`, clamped to the printer's 1–10 range.
pub fn magnification(target_width_dots: u32, version: u32) -> u32 {
    (target_width_dots / version_dimension(version)).clamp(1, 10)
}

/// A fully resolved QR field: `^BQ` sizing plus the `^FD` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPlan {
    /// Selected QR version (1–10).
    pub version: u32,
    /// `^BQ` magnification factor (1–10).
    pub magnification: u32,
    /// Complete `^FD` payload, switch prefix included.
    pub field_data: String,
}

/// Resolve sizing and field data for a QR payload.
///
/// With `auto_mode`, classification is skipped and the printer is told to
/// detect the data mode itself; version selection then assumes byte mode,
/// the most conservative capacity. Otherwise the payload is classified and
/// the manual-mode prefix carries the mode letter (byte mode additionally a
/// 4-digit character count, as the printer requires).
pub fn plan(
    data: &str,
    ec: EcLevel,
    target_width_dots: u32,
    auto_mode: bool,
) -> Result<QrPlan, QrPayloadTooLarge> {
    let (mode, field_data) = if auto_mode {
        (QrMode::Byte, format!("{}A,{data}", ec.letter()))
    } else {
        let mode = classify(data);
        let field_data = match mode {
            QrMode::Byte => format!("{}M,B{:04}{data}", ec.letter(), data.len()),
            _ => format!("{}M,{}{data}", ec.letter(), mode.letter()),
        };
        (mode, field_data)
    };

    let version = min_version(mode, ec, data.len())?;
    Ok(QrPlan {
        version,
        magnification: magnification(target_width_dots, version),
        field_data,
    })
}
