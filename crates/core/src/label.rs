//! Label program builder.
//!
//! A [`Label`] is an append-only, ordered sequence of
//! `(template, parameter values)` pairs — one label's drawing program.
//! Drawing operations convert caller coordinates to device dots, validate
//! eagerly through the command templates, and keep just enough state (the
//! last `^FW` orientation) to avoid emitting redundant commands.
//!
//! Rendering walks the program in append order, brackets it with the
//! start/end format markers, and is pure: repeated renders of the same label
//! produce identical output.

use crate::commands;
use crate::qr::{self, EcLevel};
use crate::template::{CommandTemplate, ParamValues, ValidationError};
use crate::units::{Units, convert_to_dots};

/// Field orientation, in the printer's four rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Upright.
    #[default]
    Normal,
    /// Rotated 90° clockwise.
    Rotated,
    /// Inverted 180°.
    Inverted,
    /// Read from bottom up, 270°.
    BottomUp,
}

impl Orientation {
    /// The ZPL letter code.
    pub fn letter(self) -> &'static str {
        match self {
            Orientation::Normal => "N",
            Orientation::Rotated => "R",
            Orientation::Inverted => "I",
            Orientation::BottomUp => "B",
        }
    }
}

/// Explicit per-field font override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    /// Printer font identifier (`0`–`9`, `A`–`Z`).
    pub id: char,
    /// Character height, in the label's configured units.
    pub height: f64,
    /// Character width, in the label's configured units. Omit to let the
    /// printer derive it from the height.
    pub width: Option<f64>,
}

/// Errors from label construction and drawing operations.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    /// A non-dot unit system needs a DPI to convert against.
    #[error("unit system {units:?} requires a DPI for dot conversion")]
    MissingDpi {
        /// The unit system that was requested.
        units: Units,
    },

    /// A drawing operation produced parameters its command rejected.
    #[error(transparent)]
    InvalidParams(#[from] ValidationError),

    /// QR payload exceeds every supported version's capacity.
    #[error(transparent)]
    QrPayloadTooLarge(#[from] qr::QrPayloadTooLarge),
}

/// One appended command: a shared template plus this invocation's values.
#[derive(Debug, Clone)]
struct Entry {
    template: &'static CommandTemplate,
    values: ParamValues,
}

/// An ordered, append-only label drawing program.
#[derive(Debug, Clone)]
pub struct Label {
    entries: Vec<Entry>,
    units: Units,
    dpi: Option<u32>,
    /// Last orientation set via `^FW`, so consecutive fields sharing an
    /// orientation do not repeat the command.
    last_orientation: Option<Orientation>,
}

impl Label {
    /// Create an empty label program.
    ///
    /// Fails when `units` is not [`Units::Dots`] and no DPI is given —
    /// without one there is no defined conversion to device dots.
    pub fn new(units: Units, dpi: Option<u32>) -> Result<Self, LabelError> {
        if units != Units::Dots && dpi.is_none() {
            return Err(LabelError::MissingDpi { units });
        }
        Ok(Self {
            entries: Vec::new(),
            units,
            dpi,
            last_orientation: None,
        })
    }

    /// A label measured directly in device dots.
    pub fn in_dots() -> Self {
        Self {
            entries: Vec::new(),
            units: Units::Dots,
            dpi: None,
            last_orientation: None,
        }
    }

    /// Number of appended commands (excluding the format markers).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no commands have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate `values` against `template` and append the pair.
    ///
    /// This is the low-level primitive beneath every drawing operation;
    /// it accepts any command template, so callers can add commands this
    /// builder has no convenience method for.
    pub fn append(
        &mut self,
        template: &'static CommandTemplate,
        values: ParamValues,
    ) -> Result<(), ValidationError> {
        template.validate_args(&values)?;
        self.entries.push(Entry { template, values });
        Ok(())
    }

    // ── Drawing operations ──────────────────────────────────────────────

    /// A positioned text field.
    ///
    /// Without a font override, orientation is managed via `^FW` and only
    /// emitted when it differs from the previous field's. With `font`, the
    /// `^A` command always carries the orientation itself and the tracked
    /// `^FW` state is left untouched.
    pub fn text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        orientation: Orientation,
        font: Option<Font>,
    ) -> Result<(), LabelError> {
        match font {
            Some(font) => {
                self.field_origin(x, y)?;
                let mut values = ParamValues::new()
                    .set("font", font.id.to_string())
                    .set("o", orientation.letter())
                    .set("h", self.dots(font.height));
                if let Some(w) = font.width {
                    values.insert("w", self.dots(w));
                }
                self.append(&commands::FONT, values)?;
            }
            None => {
                if self.last_orientation != Some(orientation) {
                    self.append(
                        &commands::FIELD_ORIENTATION,
                        ParamValues::new().set("o", orientation.letter()),
                    )?;
                    self.last_orientation = Some(orientation);
                }
                self.field_origin(x, y)?;
            }
        }
        self.append(
            &commands::FIELD_DATA,
            ParamValues::new().set("data", content),
        )?;
        self.field_separator()
    }

    /// A straight line between two points.
    ///
    /// Perfectly horizontal or vertical segments (the delta rounds below one
    /// dot) are drawn as a box with the near-zero dimension collapsed to the
    /// stroke thickness; everything else becomes a diagonal-line primitive
    /// whose direction is `L` when the slope signs match (both deltas
    /// positive or both negative), `R` otherwise.
    pub fn line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        thickness: f64,
    ) -> Result<(), LabelError> {
        let (x1, y1) = (self.dots(x1), self.dots(y1));
        let (x2, y2) = (self.dots(x2), self.dots(y2));
        let t = self.dots(thickness).max(1);
        let dx = x2 - x1;
        let dy = y2 - y1;

        self.field_origin_dots(x1.min(x2), y1.min(y2))?;

        if dx.abs() < 1 || dy.abs() < 1 {
            // Axis-aligned: a box whose near-zero dimension is the stroke.
            let values = ParamValues::new()
                .set("w", dx.abs().max(t))
                .set("h", dy.abs().max(t))
                .set("t", t);
            self.append(&commands::GRAPHIC_BOX, values)?;
        } else {
            let left = (dx > 0) == (dy > 0);
            let values = ParamValues::new()
                .set("w", dx.abs().max(3))
                .set("h", dy.abs().max(3))
                .set("t", t)
                .set("o", left);
            self.append(&commands::GRAPHIC_DIAGONAL, values)?;
        }
        self.field_separator()
    }

    /// A rectangular box outline with optional corner rounding (0–8).
    pub fn rectangle(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        thickness: f64,
        rounding: Option<i64>,
    ) -> Result<(), LabelError> {
        self.field_origin(x, y)?;
        let mut values = ParamValues::new()
            .set("w", self.dots(width).max(1))
            .set("h", self.dots(height).max(1))
            .set("t", self.dots(thickness).max(1));
        if let Some(r) = rounding {
            values.insert("r", r);
        }
        self.append(&commands::GRAPHIC_BOX, values)?;
        self.field_separator()
    }

    /// A circle outline, positioned by its bounding-box corner.
    pub fn circle(
        &mut self,
        x: f64,
        y: f64,
        diameter: f64,
        thickness: f64,
    ) -> Result<(), LabelError> {
        self.field_origin(x, y)?;
        let values = ParamValues::new()
            .set("d", self.dots(diameter).max(3))
            .set("t", self.dots(thickness).max(2));
        self.append(&commands::GRAPHIC_CIRCLE, values)?;
        self.field_separator()
    }

    /// An ellipse outline, positioned by its bounding-box corner.
    pub fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        thickness: f64,
    ) -> Result<(), LabelError> {
        self.field_origin(x, y)?;
        let values = ParamValues::new()
            .set("w", self.dots(width).max(3))
            .set("h", self.dots(height).max(3))
            .set("t", self.dots(thickness).max(2));
        self.append(&commands::GRAPHIC_ELLIPSE, values)?;
        self.field_separator()
    }

    /// A QR Code field sized to approximate `target_width`.
    ///
    /// `auto_mode` skips data-mode classification and lets the printer
    /// detect the mode (sizing then assumes the conservative byte-mode
    /// capacity). See [`qr::plan`] for the selection rules.
    pub fn qr(
        &mut self,
        x: f64,
        y: f64,
        data: &str,
        ec: EcLevel,
        target_width: f64,
        auto_mode: bool,
    ) -> Result<(), LabelError> {
        let target = self.dots(target_width).max(0) as u32;
        let plan = qr::plan(data, ec, target, auto_mode)?;

        self.field_origin(x, y)?;
        let values = ParamValues::new()
            .set("o", Orientation::Normal.letter())
            .set("model", 2)
            .set("mag", i64::from(plan.magnification))
            .set("ec", ec.letter().to_string());
        self.append(&commands::QR_BARCODE, values)?;
        self.append(
            &commands::FIELD_DATA,
            ParamValues::new().set("data", plan.field_data),
        )?;
        self.field_separator()
    }

    /// Load a previously downloaded image object onto the label.
    pub fn image(&mut self, drive: &str, name: &str, ext: &str) -> Result<(), LabelError> {
        let values = ParamValues::new()
            .set("drive", drive)
            .set("name", name)
            .set("ext", ext);
        self.append(&commands::LOAD_OBJECT, values)?;
        Ok(())
    }

    /// Set the print width, in the label's configured units.
    pub fn print_width(&mut self, width: f64) -> Result<(), LabelError> {
        let values = ParamValues::new().set("w", self.dots(width));
        self.append(&commands::PRINT_WIDTH, values)?;
        Ok(())
    }

    /// Set the print rate (inches per second).
    pub fn print_rate(&mut self, print: i64, slew: Option<i64>) -> Result<(), LabelError> {
        let mut values = ParamValues::new().set("p", print);
        if let Some(s) = slew {
            values.insert("s", s);
        }
        self.append(&commands::PRINT_RATE, values)?;
        Ok(())
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Render the full program as a display string, bracketed by the
    /// start/end format markers. Idempotent and side-effect free.
    pub fn render_string(&self) -> String {
        let empty = ParamValues::new();
        let mut out = String::new();
        commands::START_FORMAT.render_string_into(&empty, &mut out);
        for entry in &self.entries {
            entry.template.render_string_into(&entry.values, &mut out);
        }
        commands::END_FORMAT.render_string_into(&empty, &mut out);
        out
    }

    /// Render the full program as exact wire bytes.
    ///
    /// The total size is computed up front so the output buffer is
    /// allocated once.
    pub fn render_bytes(&self) -> Vec<u8> {
        let empty = ParamValues::new();
        let total = commands::START_FORMAT.byte_len(&empty)
            + self
                .entries
                .iter()
                .map(|e| e.template.byte_len(&e.values))
                .sum::<usize>()
            + commands::END_FORMAT.byte_len(&empty);

        let mut out = Vec::with_capacity(total);
        commands::START_FORMAT.render_bytes_into(&empty, &mut out);
        for entry in &self.entries {
            entry.template.render_bytes_into(&entry.values, &mut out);
        }
        commands::END_FORMAT.render_bytes_into(&empty, &mut out);
        debug_assert_eq!(out.len(), total);
        out
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    /// Convert a caller-supplied measure to whole dots.
    fn dots(&self, value: f64) -> i64 {
        // `dpi` is only `None` for dot units, where it is ignored.
        convert_to_dots(value, self.units, self.dpi.unwrap_or(0)).round() as i64
    }

    fn field_origin(&mut self, x: f64, y: f64) -> Result<(), LabelError> {
        self.field_origin_dots(self.dots(x), self.dots(y))
    }

    fn field_origin_dots(&mut self, x: i64, y: i64) -> Result<(), LabelError> {
        let values = ParamValues::new().set("x", x).set("y", y);
        self.append(&commands::FIELD_ORIGIN, values)?;
        Ok(())
    }

    fn field_separator(&mut self) -> Result<(), LabelError> {
        self.append(&commands::FIELD_SEPARATOR, ParamValues::new())?;
        Ok(())
    }
}
