//! Build and print a small shelf-label program.
//!
//! Run from repository root:
//! `cargo run -p zpl_courier_core --example shelf_label`

use zpl_courier_core::{EcLevel, Font, Label, Orientation, Units};

fn main() -> Result<(), zpl_courier_core::LabelError> {
    let mut label = Label::new(Units::Dots, None)?;

    label.print_width(600.0)?;
    label.rectangle(10.0, 10.0, 580.0, 380.0, 3.0, Some(2))?;
    label.text(30.0, 30.0, "AISLE 4 / BAY 12", Orientation::Normal, None)?;
    label.text(
        30.0,
        90.0,
        "GRANOLA 500G",
        Orientation::Normal,
        Some(Font {
            id: '0',
            height: 48.0,
            width: None,
        }),
    )?;
    label.line(10.0, 160.0, 590.0, 160.0, 2.0)?;
    label.qr(
        420.0,
        200.0,
        "4006381333931",
        EcLevel::Medium,
        150.0,
        false,
    )?;

    println!("{}", label.render_string());
    Ok(())
}
