//! Parameter values and type descriptors for command templates.
//!
//! Every command parameter carries a [`ParamType`] describing what values it
//! accepts. Types are composable via [`ParamType::any_of`] and validate
//! without panicking; only malformed *descriptors* (e.g. an inverted range)
//! produce a [`SchemaError`], which is a construction-time failure distinct
//! from runtime validation.

use std::fmt;

/// A single parameter value supplied by the caller.
///
/// Values are owned by the calling code and only borrowed by templates for
/// the duration of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Text value, emitted as-is.
    Str(String),
    /// Integer value, emitted in decimal.
    Int(i64),
    /// Boolean value, emitted using the flag type's configured tokens.
    Bool(bool),
    /// Raw byte sequence, spliced verbatim into byte output.
    Bytes(Vec<u8>),
}

impl ParamValue {
    /// Short kind name used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Str(_) => "string",
            ParamValue::Int(_) => "integer",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Bytes(_) => "byte sequence",
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(v: Vec<u8>) -> Self {
        ParamValue::Bytes(v)
    }
}

impl From<&[u8]> for ParamValue {
    fn from(v: &[u8]) -> Self {
        ParamValue::Bytes(v.to_vec())
    }
}

/// A malformed type or template definition.
///
/// These are programming errors in fixed, shared definitions: they surface
/// once at construction and are never recoverable at runtime.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Integer range with `min > max`.
    #[error("invalid integer range: min {min} > max {max}")]
    InvertedRange {
        /// Lower bound as given.
        min: i64,
        /// Upper bound as given.
        max: i64,
    },

    /// Length bounds with `min > max`.
    #[error("invalid length bounds: min {min} > max {max}")]
    InvertedLengthBounds {
        /// Minimum length as given.
        min: usize,
        /// Maximum length as given.
        max: usize,
    },

    /// An enumerated type with no members can never validate.
    #[error("enumerated type has no members")]
    EmptyEnum,

    /// An any-of union with no alternatives can never validate.
    #[error("any-of union has no alternatives")]
    EmptyUnion,

    /// A pattern placeholder names a parameter that was not declared.
    #[error("pattern references undeclared parameter \"{key}\"")]
    UndeclaredParameter {
        /// The placeholder key found in the pattern.
        key: String,
    },

    /// A declared parameter never appears in the pattern.
    #[error("parameter \"{key}\" does not appear in pattern \"{pattern}\"")]
    UnusedParameter {
        /// The declared parameter key.
        key: String,
        /// The template pattern.
        pattern: String,
    },

    /// The same parameter key was declared twice.
    #[error("parameter \"{key}\" declared more than once")]
    DuplicateParameter {
        /// The duplicated key.
        key: String,
    },

    /// A `{` placeholder was opened but never closed.
    #[error("unterminated placeholder in pattern \"{pattern}\"")]
    UnterminatedPlaceholder {
        /// The template pattern.
        pattern: String,
    },
}

/// Declared type of a command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Integer bounded to an inclusive range.
    IntRange {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// ASCII letters and digits only, with optional length bounds.
    /// Unset bounds mean "one or more" characters.
    Alphanumeric {
        /// Minimum length, if bounded.
        min_len: Option<usize>,
        /// Maximum length, if bounded.
        max_len: Option<usize>,
    },
    /// Free text with optional length bounds (field data, object paths).
    Text {
        /// Minimum length, if bounded.
        min_len: Option<usize>,
        /// Maximum length, if bounded.
        max_len: Option<usize>,
    },
    /// One of a fixed set of literal strings.
    OneOf(Vec<String>),
    /// Boolean rendered as one of two literal tokens.
    Flag {
        /// Token emitted for `true`.
        yes: String,
        /// Token emitted for `false`.
        no: String,
    },
    /// Raw byte sequence.
    Binary,
    /// Accepts a value matching any of the listed types.
    AnyOf(Vec<ParamType>),
}

impl ParamType {
    /// Integer range type. Fails when `min > max`.
    pub fn int_range(min: i64, max: i64) -> Result<Self, SchemaError> {
        if min > max {
            return Err(SchemaError::InvertedRange { min, max });
        }
        Ok(ParamType::IntRange { min, max })
    }

    /// Alphanumeric string type with optional length bounds.
    /// Fails when both bounds are set and `min_len > max_len`.
    pub fn alphanumeric(
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> Result<Self, SchemaError> {
        if let (Some(lo), Some(hi)) = (min_len, max_len)
            && lo > hi
        {
            return Err(SchemaError::InvertedLengthBounds { min: lo, max: hi });
        }
        Ok(ParamType::Alphanumeric { min_len, max_len })
    }

    /// Free text type with optional length bounds.
    /// Fails when both bounds are set and `min_len > max_len`.
    pub fn text(min_len: Option<usize>, max_len: Option<usize>) -> Result<Self, SchemaError> {
        if let (Some(lo), Some(hi)) = (min_len, max_len)
            && lo > hi
        {
            return Err(SchemaError::InvertedLengthBounds { min: lo, max: hi });
        }
        Ok(ParamType::Text { min_len, max_len })
    }

    /// Enumerated string type. Fails on an empty member list.
    pub fn one_of<I, S>(members: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }
        Ok(ParamType::OneOf(members))
    }

    /// Boolean type rendered with the given true/false tokens.
    pub fn flag(yes: &str, no: &str) -> Self {
        ParamType::Flag {
            yes: yes.to_string(),
            no: no.to_string(),
        }
    }

    /// Union type accepting any of the listed alternatives.
    /// Fails on an empty list.
    pub fn any_of<I>(alternatives: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = ParamType>,
    {
        let alternatives: Vec<ParamType> = alternatives.into_iter().collect();
        if alternatives.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }
        Ok(ParamType::AnyOf(alternatives))
    }

    /// Validate a value against this type.
    ///
    /// Returns a human-readable description of the failure, or `Ok(())`.
    /// Never panics for well-formed descriptors.
    pub fn validate(&self, value: &ParamValue) -> Result<(), TypeMismatch> {
        match self {
            ParamType::IntRange { min, max } => match value {
                ParamValue::Int(v) if (*min..=*max).contains(v) => Ok(()),
                ParamValue::Int(v) => Err(TypeMismatch(format!(
                    "{v} is outside the range {min}..={max}"
                ))),
                other => Err(TypeMismatch(format!(
                    "expected an integer, got a {}",
                    other.kind()
                ))),
            },
            ParamType::Alphanumeric { min_len, max_len } => match value {
                ParamValue::Str(s) => validate_alphanumeric(s, *min_len, *max_len),
                other => Err(TypeMismatch(format!(
                    "expected a string, got a {}",
                    other.kind()
                ))),
            },
            ParamType::Text { min_len, max_len } => match value {
                ParamValue::Str(s) => validate_length(s, *min_len, *max_len),
                other => Err(TypeMismatch(format!(
                    "expected a string, got a {}",
                    other.kind()
                ))),
            },
            ParamType::OneOf(members) => match value {
                ParamValue::Str(s) if members.iter().any(|m| m == s) => Ok(()),
                ParamValue::Str(s) => Err(TypeMismatch(format!(
                    "\"{s}\" is not one of {}",
                    members.join(", ")
                ))),
                other => Err(TypeMismatch(format!(
                    "expected a string, got a {}",
                    other.kind()
                ))),
            },
            ParamType::Flag { .. } => match value {
                ParamValue::Bool(_) => Ok(()),
                other => Err(TypeMismatch(format!(
                    "expected a boolean, got a {}",
                    other.kind()
                ))),
            },
            ParamType::Binary => match value {
                ParamValue::Bytes(_) => Ok(()),
                other => Err(TypeMismatch(format!(
                    "expected a byte sequence, got a {}",
                    other.kind()
                ))),
            },
            ParamType::AnyOf(alternatives) => {
                let mut failures = Vec::with_capacity(alternatives.len());
                for alt in alternatives {
                    match alt.validate(value) {
                        Ok(()) => return Ok(()),
                        Err(e) => failures.push(e.0),
                    }
                }
                Err(TypeMismatch(failures.join(" or ")))
            }
        }
    }

    /// The true/false tokens used to render a boolean value, if this type
    /// (or any arm of a union) is a flag.
    pub fn flag_tokens(&self) -> Option<(&str, &str)> {
        match self {
            ParamType::Flag { yes, no } => Some((yes, no)),
            ParamType::AnyOf(alternatives) => {
                alternatives.iter().find_map(ParamType::flag_tokens)
            }
            _ => None,
        }
    }
}

/// A value's failure against its declared type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TypeMismatch(pub String);

fn validate_length(
    s: &str,
    min_len: Option<usize>,
    max_len: Option<usize>,
) -> Result<(), TypeMismatch> {
    let len = s.len();
    if let Some(lo) = min_len
        && len < lo
    {
        return Err(TypeMismatch(format!(
            "length {len} is shorter than the minimum {lo}"
        )));
    }
    if let Some(hi) = max_len
        && len > hi
    {
        return Err(TypeMismatch(format!(
            "length {len} exceeds the maximum {hi}"
        )));
    }
    Ok(())
}

fn validate_alphanumeric(
    s: &str,
    min_len: Option<usize>,
    max_len: Option<usize>,
) -> Result<(), TypeMismatch> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(TypeMismatch(format!(
            "\"{s}\" must contain only ASCII letters and digits (and at least one)"
        )));
    }
    let len = s.len();
    if let Some(lo) = min_len
        && len < lo
    {
        return Err(TypeMismatch(format!(
            "\"{s}\" is shorter than the minimum length {lo}"
        )));
    }
    if let Some(hi) = max_len
        && len > hi
    {
        return Err(TypeMismatch(format!(
            "\"{s}\" exceeds the maximum length {hi}"
        )));
    }
    Ok(())
}

impl fmt::Display for ParamValue {
    /// Display form used by the string render path. Byte sequences are shown
    /// as uppercase hex so binary payloads stay printable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(v) => write!(f, "{v}"),
            // Bare Display has no type context; templates substitute the
            // flag tokens before reaching this fallback.
            ParamValue::Bool(b) => f.write_str(if *b { "Y" } else { "N" }),
            ParamValue::Bytes(bytes) => {
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_range_accepts_bounds_inclusive() {
        let ty = ParamType::int_range(0, 10).unwrap();
        assert!(ty.validate(&ParamValue::Int(0)).is_ok());
        assert!(ty.validate(&ParamValue::Int(10)).is_ok());
        assert!(ty.validate(&ParamValue::Int(-1)).is_err());
        assert!(ty.validate(&ParamValue::Int(11)).is_err());
    }

    #[test]
    fn int_range_rejects_non_integers() {
        let ty = ParamType::int_range(0, 10).unwrap();
        assert!(ty.validate(&ParamValue::Str("5".into())).is_err());
        assert!(ty.validate(&ParamValue::Bool(true)).is_err());
    }

    #[test]
    fn int_range_construction_fails_when_inverted() {
        assert_eq!(
            ParamType::int_range(5, 1),
            Err(SchemaError::InvertedRange { min: 5, max: 1 })
        );
    }

    #[test]
    fn alphanumeric_matches_letters_and_digits_only() {
        let ty = ParamType::alphanumeric(None, None).unwrap();
        assert!(ty.validate(&ParamValue::Str("LOGO1".into())).is_ok());
        assert!(ty.validate(&ParamValue::Str("".into())).is_err());
        assert!(ty.validate(&ParamValue::Str("has space".into())).is_err());
        assert!(ty.validate(&ParamValue::Str("under_score".into())).is_err());
        assert!(ty.validate(&ParamValue::Int(7)).is_err());
    }

    #[test]
    fn alphanumeric_length_bounds() {
        let ty = ParamType::alphanumeric(Some(2), Some(4)).unwrap();
        assert!(ty.validate(&ParamValue::Str("ab".into())).is_ok());
        assert!(ty.validate(&ParamValue::Str("abcd".into())).is_ok());
        assert!(ty.validate(&ParamValue::Str("a".into())).is_err());
        assert!(ty.validate(&ParamValue::Str("abcde".into())).is_err());
    }

    #[test]
    fn alphanumeric_construction_fails_when_inverted() {
        assert_eq!(
            ParamType::alphanumeric(Some(4), Some(2)),
            Err(SchemaError::InvertedLengthBounds { min: 4, max: 2 })
        );
    }

    #[test]
    fn one_of_is_exact_string_equality() {
        let ty = ParamType::one_of(["N", "R", "I", "B"]).unwrap();
        assert!(ty.validate(&ParamValue::Str("R".into())).is_ok());
        assert!(ty.validate(&ParamValue::Str("r".into())).is_err());
        assert!(ty.validate(&ParamValue::Str("X".into())).is_err());
    }

    #[test]
    fn one_of_empty_is_a_schema_error() {
        assert_eq!(
            ParamType::one_of(Vec::<String>::new()),
            Err(SchemaError::EmptyEnum)
        );
    }

    #[test]
    fn flag_requires_boolean() {
        let ty = ParamType::flag("Y", "N");
        assert!(ty.validate(&ParamValue::Bool(true)).is_ok());
        assert!(ty.validate(&ParamValue::Str("Y".into())).is_err());
    }

    #[test]
    fn binary_requires_bytes() {
        assert!(
            ParamType::Binary
                .validate(&ParamValue::Bytes(vec![0, 1, 2]))
                .is_ok()
        );
        assert!(ParamType::Binary.validate(&ParamValue::Str("x".into())).is_err());
    }

    #[test]
    fn any_of_passes_when_one_arm_passes() {
        let ty = ParamType::any_of([
            ParamType::int_range(1, 8).unwrap(),
            ParamType::one_of(["A"]).unwrap(),
        ])
        .unwrap();
        assert!(ty.validate(&ParamValue::Int(3)).is_ok());
        assert!(ty.validate(&ParamValue::Str("A".into())).is_ok());
    }

    #[test]
    fn any_of_joins_all_failures_with_or() {
        let ty = ParamType::any_of([
            ParamType::int_range(1, 8).unwrap(),
            ParamType::one_of(["A"]).unwrap(),
        ])
        .unwrap();
        let err = ty.validate(&ParamValue::Str("Z".into())).unwrap_err();
        assert!(err.0.contains(" or "), "message was: {}", err.0);
    }

    #[test]
    fn flag_tokens_found_inside_unions() {
        let ty = ParamType::any_of([
            ParamType::int_range(0, 1).unwrap(),
            ParamType::flag("L", "R"),
        ])
        .unwrap();
        assert_eq!(ty.flag_tokens(), Some(("L", "R")));
    }

    #[test]
    fn bytes_display_as_hex() {
        assert_eq!(ParamValue::Bytes(vec![0xDE, 0xAD]).to_string(), "DEAD");
    }
}
