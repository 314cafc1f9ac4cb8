//! Shared ZPL command templates.
//!
//! One [`CommandTemplate`] per wire command, constructed on first use and
//! shared read-only for the life of the process. A malformed definition here
//! is a programming error, so the statics panic at first touch instead of
//! threading an unreachable `Result` through every call site.
//!
//! Parameter grammars (ranges, letter codes, name lengths) follow the ZPL II
//! programming guide for each command.

use std::sync::LazyLock;

use crate::param::ParamType;
use crate::template::{CommandTemplate, ParamSpec};

/// Drive location letter codes: RAM, onboard flash, memory card, USB.
pub const DRIVES: [&str; 4] = ["R", "E", "B", "A"];

/// Field / barcode orientation letter codes.
pub const ORIENTATIONS: [&str; 4] = ["N", "R", "I", "B"];

fn drive() -> ParamType {
    ParamType::one_of(DRIVES).expect("drive codes")
}

fn orientation() -> ParamType {
    ParamType::one_of(ORIENTATIONS).expect("orientation codes")
}

fn object_name() -> ParamType {
    ParamType::alphanumeric(Some(1), Some(8)).expect("object name bounds")
}

fn dots(max: i64) -> ParamType {
    ParamType::int_range(0, max).expect("dot range")
}

/// `^XA` — start of label format.
pub static START_FORMAT: LazyLock<CommandTemplate> =
    LazyLock::new(|| CommandTemplate::new("^XA", vec![]).expect("^XA template"));

/// `^XZ` — end of label format.
pub static END_FORMAT: LazyLock<CommandTemplate> =
    LazyLock::new(|| CommandTemplate::new("^XZ", vec![]).expect("^XZ template"));

/// `~DY` — download object into printer storage.
///
/// Drive, 1–8 character alphanumeric name, format code, extension code,
/// total byte count, per-row byte count, then the framed payload. The
/// payload parameter accepts either raw bytes or pre-encoded text framing.
pub static DOWNLOAD_OBJECT: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "~DY{drive}:{name},{format},{ext},{total},{row},{data}",
        vec![
            ParamSpec::required("drive", drive()),
            ParamSpec::required("name", object_name()),
            ParamSpec::required("format", ParamType::one_of(["A", "B", "C", "P"]).expect("format codes")),
            ParamSpec::required("ext", ParamType::one_of(["B", "E", "G", "P", "T", "X"]).expect("extension codes")),
            ParamSpec::required("total", ParamType::int_range(1, 99_999_999).expect("total bytes")),
            ParamSpec::required("row", ParamType::int_range(1, 99_999).expect("row bytes")),
            ParamSpec::required(
                "data",
                ParamType::any_of([
                    ParamType::Binary,
                    ParamType::text(Some(1), None).expect("framed payload"),
                ])
                .expect("payload union"),
            ),
        ],
    )
    .expect("~DY template")
});

/// `^IL` — load a stored object onto the current label.
pub static LOAD_OBJECT: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^IL{drive}:{name}.{ext}",
        vec![
            ParamSpec::required("drive", drive()),
            ParamSpec::required("name", object_name()),
            ParamSpec::required("ext", ParamType::one_of(["GRF", "PNG"]).expect("image extensions")),
        ],
    )
    .expect("^IL template")
});

/// `^ID` — delete a stored object from printer storage.
pub static DELETE_OBJECT: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^ID{drive}:{name}.{ext}",
        vec![
            ParamSpec::required("drive", drive()),
            ParamSpec::required("name", object_name()),
            ParamSpec::required("ext", ParamType::one_of(["GRF", "PNG"]).expect("image extensions")),
        ],
    )
    .expect("^ID template")
});

/// `^FO` — field origin in dots from the label home.
pub static FIELD_ORIGIN: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^FO{x},{y}",
        vec![
            ParamSpec::required("x", dots(32000)),
            ParamSpec::required("y", dots(32000)),
        ],
    )
    .expect("^FO template")
});

/// `^FD` — field data (the drawable content of the current field).
pub static FIELD_DATA: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^FD{data}",
        vec![ParamSpec::required(
            "data",
            ParamType::text(None, Some(3072)).expect("field data bounds"),
        )],
    )
    .expect("^FD template")
});

/// `^FS` — field separator, closes the current field.
pub static FIELD_SEPARATOR: LazyLock<CommandTemplate> =
    LazyLock::new(|| CommandTemplate::new("^FS", vec![]).expect("^FS template"));

/// `^FW` — default field orientation for subsequent fields.
pub static FIELD_ORIENTATION: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^FW{o}",
        vec![ParamSpec::required("o", orientation())],
    )
    .expect("^FW template")
});

/// `^A` — font selection with optional per-field orientation and size.
pub static FONT: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^A{font}{o},{h},{w}",
        vec![
            ParamSpec::required("font", ParamType::alphanumeric(Some(1), Some(1)).expect("font id")),
            ParamSpec::optional("o", orientation()),
            ParamSpec::optional("h", ParamType::int_range(10, 32000).expect("font height")),
            ParamSpec::optional("w", ParamType::int_range(10, 32000).expect("font width")),
        ],
    )
    .expect("^A template")
});

/// `^GB` — graphic box: width, height, border thickness, color, rounding.
pub static GRAPHIC_BOX: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^GB{w}{h}{t}{c}{r}",
        vec![
            ParamSpec::required("w", ParamType::int_range(1, 32000).expect("box width")).delimited(","),
            ParamSpec::required("h", ParamType::int_range(1, 32000).expect("box height")).delimited(","),
            ParamSpec::optional("t", ParamType::int_range(1, 32000).expect("box border")).delimited(","),
            ParamSpec::optional("c", ParamType::one_of(["B", "W"]).expect("line colors")).delimited(","),
            ParamSpec::optional("r", ParamType::int_range(0, 8).expect("corner rounding")),
        ],
    )
    .expect("^GB template")
});

/// `^GC` — graphic circle: diameter, border thickness, color.
pub static GRAPHIC_CIRCLE: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^GC{d}{t}{c}",
        vec![
            ParamSpec::required("d", ParamType::int_range(3, 4095).expect("circle diameter")).delimited(","),
            ParamSpec::optional("t", ParamType::int_range(2, 4095).expect("circle border")).delimited(","),
            ParamSpec::optional("c", ParamType::one_of(["B", "W"]).expect("line colors")),
        ],
    )
    .expect("^GC template")
});

/// `^GE` — graphic ellipse: width, height, border thickness, color.
pub static GRAPHIC_ELLIPSE: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^GE{w}{h}{t}{c}",
        vec![
            ParamSpec::required("w", ParamType::int_range(3, 4095).expect("ellipse width")).delimited(","),
            ParamSpec::required("h", ParamType::int_range(3, 4095).expect("ellipse height")).delimited(","),
            ParamSpec::optional("t", ParamType::int_range(2, 4095).expect("ellipse border")).delimited(","),
            ParamSpec::optional("c", ParamType::one_of(["B", "W"]).expect("line colors")),
        ],
    )
    .expect("^GE template")
});

/// `^GD` — graphic diagonal line: width, height, thickness, color,
/// direction (`L` bottom-left to top-right, `R` top-left to bottom-right).
pub static GRAPHIC_DIAGONAL: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^GD{w}{h}{t}{c}{o}",
        vec![
            ParamSpec::required("w", ParamType::int_range(3, 32000).expect("line width")).delimited(","),
            ParamSpec::required("h", ParamType::int_range(3, 32000).expect("line height")).delimited(","),
            ParamSpec::optional("t", ParamType::int_range(1, 32000).expect("line thickness")).delimited(","),
            ParamSpec::optional("c", ParamType::one_of(["B", "W"]).expect("line colors")).delimited(","),
            ParamSpec::required("o", ParamType::flag("L", "R")),
        ],
    )
    .expect("^GD template")
});

/// `^BQ` — QR Code barcode field.
pub static QR_BARCODE: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^BQ{o}{model}{mag}{ec}{mask}",
        vec![
            ParamSpec::optional("o", orientation()).delimited(","),
            ParamSpec::optional("model", ParamType::int_range(1, 2).expect("qr model")).delimited(","),
            ParamSpec::optional("mag", ParamType::int_range(1, 10).expect("qr magnification")).delimited(","),
            ParamSpec::optional("ec", ParamType::one_of(["H", "Q", "M", "L"]).expect("qr ec levels")).delimited(","),
            ParamSpec::optional("mask", ParamType::int_range(0, 7).expect("qr mask")),
        ],
    )
    .expect("^BQ template")
});

/// `^PW` — print width in dots.
pub static PRINT_WIDTH: LazyLock<CommandTemplate> = LazyLock::new(|| {
    CommandTemplate::new(
        "^PW{w}",
        vec![ParamSpec::required("w", ParamType::int_range(2, 32000).expect("print width"))],
    )
    .expect("^PW template")
});

/// `^PR` — print rate: print, slew, and backfeed speeds, each either a
/// numeric speed (inches per second) or a letter code.
pub static PRINT_RATE: LazyLock<CommandTemplate> = LazyLock::new(|| {
    let speed = || {
        ParamType::any_of([
            ParamType::int_range(1, 14).expect("speed range"),
            ParamType::one_of(["A", "B", "C", "D", "E"]).expect("speed codes"),
        ])
        .expect("speed union")
    };
    CommandTemplate::new(
        "^PR{p}{s}{b}",
        vec![
            ParamSpec::required("p", speed()).delimited(","),
            ParamSpec::optional("s", speed()).delimited(","),
            ParamSpec::optional("b", speed()),
        ],
    )
    .expect("^PR template")
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ParamValues;

    #[test]
    fn zero_arg_markers() {
        assert_eq!(
            START_FORMAT.render_string(&ParamValues::new()).unwrap(),
            "^XA"
        );
        assert_eq!(END_FORMAT.render_string(&ParamValues::new()).unwrap(), "^XZ");
    }

    #[test]
    fn field_origin_renders() {
        let v = ParamValues::new().set("x", 50).set("y", 120);
        assert_eq!(FIELD_ORIGIN.render_string(&v).unwrap(), "^FO50,120");
    }

    #[test]
    fn download_object_rejects_long_names() {
        let v = ParamValues::new()
            .set("drive", "R")
            .set("name", "TOOLONGNAME")
            .set("format", "P")
            .set("ext", "P")
            .set("total", 10)
            .set("row", 10)
            .set("data", "AA");
        let err = DOWNLOAD_OBJECT.validate_args(&v).unwrap_err();
        assert!(err.errors.contains_key("name"));
    }

    #[test]
    fn load_object_renders_drive_path() {
        let v = ParamValues::new()
            .set("drive", "E")
            .set("name", "LOGO")
            .set("ext", "PNG");
        assert_eq!(LOAD_OBJECT.render_string(&v).unwrap(), "^ILE:LOGO.PNG");
    }

    #[test]
    fn graphic_box_with_unset_optionals() {
        let v = ParamValues::new().set("w", 100).set("h", 1);
        assert_eq!(GRAPHIC_BOX.render_string(&v).unwrap(), "^GB100,1,,,");
    }

    #[test]
    fn diagonal_direction_tokens() {
        let v = ParamValues::new()
            .set("w", 80)
            .set("h", 40)
            .set("t", 2)
            .set("o", true);
        assert_eq!(GRAPHIC_DIAGONAL.render_string(&v).unwrap(), "^GD80,40,2,,L");
    }

    #[test]
    fn print_rate_accepts_numbers_and_letters() {
        assert!(
            PRINT_RATE
                .validate_args(&ParamValues::new().set("p", 4))
                .is_ok()
        );
        assert!(
            PRINT_RATE
                .validate_args(&ParamValues::new().set("p", "C"))
                .is_ok()
        );
        assert!(
            PRINT_RATE
                .validate_args(&ParamValues::new().set("p", "Z"))
                .is_err()
        );
    }

    #[test]
    fn qr_barcode_renders_sizing() {
        let v = ParamValues::new()
            .set("o", "N")
            .set("model", 2)
            .set("mag", 5)
            .set("ec", "Q");
        assert_eq!(QR_BARCODE.render_string(&v).unwrap(), "^BQN,2,5,Q,");
    }
}
