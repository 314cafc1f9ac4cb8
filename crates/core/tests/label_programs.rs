//! Whole-program tests: drawing operations composed into complete labels.

use zpl_courier_core::commands;
use zpl_courier_core::{EcLevel, Font, Label, Orientation, ParamValues, Units};

#[test]
fn shelf_label_program_end_to_end() {
    let mut label = Label::new(Units::Dots, None).unwrap();
    label.print_width(600.0).unwrap();
    label.rectangle(10.0, 10.0, 580.0, 380.0, 3.0, None).unwrap();
    label
        .text(30.0, 30.0, "AISLE 4", Orientation::Normal, None)
        .unwrap();
    label
        .text(
            30.0,
            80.0,
            "GRANOLA 500G",
            Orientation::Normal,
            Some(Font {
                id: '0',
                height: 40.0,
                width: None,
            }),
        )
        .unwrap();
    label.line(10.0, 140.0, 590.0, 140.0, 2.0).unwrap();
    label
        .qr(430.0, 180.0, "4006381333931", EcLevel::Medium, 150.0, false)
        .unwrap();

    let out = label.render_string();
    assert!(out.starts_with("^XA^PW600"), "output: {out}");
    assert!(out.ends_with("^XZ"), "output: {out}");

    // Field structure: every drawable is origin-positioned and closed.
    assert_eq!(out.matches("^FO").count(), 5);
    assert_eq!(out.matches("^FS").count(), 5);

    // 13 numeric digits at M: version 1 capacity is 34, 21 modules,
    // 150 / 21 = 7.
    assert!(out.contains("^BQN,2,7,M,"), "output: {out}");
    assert!(out.contains("^FDMM,N4006381333931"), "output: {out}");

    // The plain-text field uses ^FW once; the font-override field carries
    // its orientation in ^A instead.
    assert_eq!(out.matches("^FWN").count(), 1);
    assert!(out.contains("^A0N,40,"), "output: {out}");
}

#[test]
fn append_order_is_render_order() {
    let mut label = Label::in_dots();
    label
        .append(
            &commands::PRINT_WIDTH,
            ParamValues::new().set("w", 400),
        )
        .unwrap();
    label
        .append(
            &commands::PRINT_RATE,
            ParamValues::new().set("p", 4).set("s", 6),
        )
        .unwrap();
    label
        .append(
            &commands::DELETE_OBJECT,
            ParamValues::new()
                .set("drive", "R")
                .set("name", "OLD")
                .set("ext", "GRF"),
        )
        .unwrap();

    assert_eq!(label.render_string(), "^XA^PW400^PR4,6,^IDR:OLD.GRF^XZ");
}

#[test]
fn byte_render_equals_string_render_for_textual_programs() {
    let mut label = Label::new(Units::Inches, Some(300)).unwrap();
    label.print_width(4.0).unwrap();
    label
        .text(0.25, 0.25, "MATCH", Orientation::Inverted, None)
        .unwrap();
    label.circle(2.0, 1.0, 0.5, 0.02).unwrap();

    assert_eq!(label.render_bytes(), label.render_string().into_bytes());
}
