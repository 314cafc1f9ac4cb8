//! Measurement units and conversion to printer dots.
//!
//! Callers position label fields in whichever unit their layout data uses;
//! everything is converted to device dots before a command is rendered.

use serde::Serialize;

/// Unit system for caller-supplied coordinates and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Units {
    /// Values are already in printer dots.
    #[default]
    Dots,
    /// Values are expressed in inches.
    Inches,
    /// Values are expressed in device-independent pixels (1/96 inch).
    Pixels,
}

/// Convert a value from the given unit system to dots.
///
/// `dpi` is the printer's dot density; it is ignored for [`Units::Dots`].
pub fn convert_to_dots(value: f64, units: Units, dpi: u32) -> f64 {
    match units {
        Units::Dots => value,
        Units::Inches => value * f64::from(dpi),
        Units::Pixels => value * f64::from(dpi) / 96.0,
    }
}
