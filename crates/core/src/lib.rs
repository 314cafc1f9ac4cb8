//! zpl-courier core library.
//!
//! Typed command templates and a label builder for generating ZPL (Zebra
//! Programming Language) print jobs. The main entry points are the shared
//! command definitions in [`commands`], the [`Label`] builder, and the
//! [`CommandTemplate`] engine beneath them.

#![warn(missing_docs)]

/// Shared command template definitions for the ZPL wire grammar.
pub mod commands;
/// Label program builder and drawing operations.
pub mod label;
/// Parameter values, type descriptors, and schema errors.
pub mod param;
/// QR Code sizing and field-data assembly for `^BQ`.
pub mod qr;
/// The command template engine: patterns, validation, rendering.
pub mod template;
/// Measurement units and dot conversion.
pub mod units;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parameter type system
pub use param::{ParamType, ParamValue, SchemaError, TypeMismatch};

// Template engine
pub use template::{CommandTemplate, ParamSpec, ParamValues, ValidationError};

// Label builder
pub use label::{Font, Label, LabelError, Orientation};

// QR sizing
pub use qr::{EcLevel, QrMode, QrPlan};

// Units
pub use units::{Units, convert_to_dots};
