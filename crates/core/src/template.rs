//! Command template engine.
//!
//! A [`CommandTemplate`] is an immutable schema: a literal pattern with
//! `{key}` placeholders, split **once at construction** into an alternating
//! literal/parameter segment list, plus a typed spec per parameter. The
//! segment list always starts and ends with a literal (possibly empty), so
//! its length is always odd.
//!
//! Rendering has two paths: [`render_string`](CommandTemplate::render_string)
//! for display and [`render_bytes`](CommandTemplate::render_bytes) for the
//! wire. The byte path splices [`ParamValue::Bytes`] values verbatim —
//! embedded binary payloads must never be pushed through a text encoding.

use std::collections::BTreeMap;
use std::fmt;

use crate::param::{ParamType, ParamValue, SchemaError};

/// Declared spec for one template parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    key: String,
    ty: ParamType,
    required: bool,
    delimiter: String,
}

impl ParamSpec {
    /// A parameter that must be present at render time.
    pub fn required(key: &str, ty: ParamType) -> Self {
        Self {
            key: key.to_string(),
            ty,
            required: true,
            delimiter: String::new(),
        }
    }

    /// A parameter that may be omitted (renders as an empty string).
    pub fn optional(key: &str, ty: ParamType) -> Self {
        Self {
            key: key.to_string(),
            ty,
            required: false,
            delimiter: String::new(),
        }
    }

    /// Set the delimiter emitted after this parameter in serialized output.
    /// Defaults to none.
    pub fn delimited(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    /// The parameter key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The declared type.
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    /// Whether the parameter must be present at render time.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// One segment of a split pattern: literal text or a parameter reference.
#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    /// Index into the template's parameter spec list.
    Param(usize),
}

/// Parameter values for one command invocation, keyed by parameter name.
///
/// Owned by the caller; templates borrow it only while rendering.
#[derive(Debug, Clone, Default)]
pub struct ParamValues(BTreeMap<String, ParamValue>);

impl ParamValues {
    /// An empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Insert a value in place.
    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Exhaustive per-parameter validation failure for one command.
///
/// Carries **every** failing parameter, keyed by name, so callers can fix
/// all input problems in one pass instead of replaying render attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The template pattern the values were checked against.
    pub command: String,
    /// Failure description per parameter key (deterministic key order).
    pub errors: BTreeMap<String, String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid parameters for {}:", self.command)?;
        for (key, msg) in &self.errors {
            write!(f, " {key}: {msg};")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// An immutable command schema: pattern, segments, and parameter specs.
///
/// Constructed once at process start and shared read-only by every command
/// that uses it.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    pattern: String,
    segments: Vec<Segment>,
    params: Vec<ParamSpec>,
}

impl CommandTemplate {
    /// Build a template from a `{key}` placeholder pattern and its specs.
    ///
    /// Fails when a placeholder names an undeclared parameter, a declared
    /// parameter never appears in the pattern, a key is declared twice, or
    /// a placeholder is left unterminated.
    pub fn new(pattern: &str, params: Vec<ParamSpec>) -> Result<Self, SchemaError> {
        for (i, spec) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.key == spec.key) {
                return Err(SchemaError::DuplicateParameter {
                    key: spec.key.clone(),
                });
            }
        }

        let segments = split_pattern(pattern, &params)?;

        let mut used = vec![false; params.len()];
        for seg in &segments {
            if let Segment::Param(idx) = seg {
                used[*idx] = true;
            }
        }
        if let Some(idx) = used.iter().position(|u| !u) {
            return Err(SchemaError::UnusedParameter {
                key: params[idx].key.clone(),
                pattern: pattern.to_string(),
            });
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            params,
        })
    }

    /// The original placeholder pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The declared parameter specs, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Validate a value set against every declared parameter.
    ///
    /// Exhaustive: all failures are collected into the returned error's
    /// per-key map rather than stopping at the first one. Unknown keys in
    /// `values` are reported too.
    pub fn validate_args(&self, values: &ParamValues) -> Result<(), ValidationError> {
        let mut errors = BTreeMap::new();

        for spec in &self.params {
            match values.get(&spec.key) {
                Some(value) => {
                    if let Err(e) = spec.ty.validate(value) {
                        errors.insert(spec.key.clone(), e.0);
                    }
                }
                None if spec.required => {
                    errors.insert(spec.key.clone(), "required parameter is missing".to_string());
                }
                None => {}
            }
        }

        for (key, _) in values.iter() {
            if !self.params.iter().any(|p| p.key == key) {
                errors.insert(key.to_string(), "unknown parameter".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                command: self.pattern.clone(),
                errors,
            })
        }
    }

    /// Render to a display string. Validates first.
    ///
    /// Literal segments are emitted as-is; parameter segments emit the
    /// value's display form (flags use their configured tokens, unset
    /// optional values render as an empty string) followed by the
    /// parameter's delimiter. A template with no parameters renders its
    /// pattern unchanged.
    pub fn render_string(&self, values: &ParamValues) -> Result<String, ValidationError> {
        self.validate_args(values)?;
        let mut out = String::with_capacity(self.pattern.len());
        self.render_string_into(values, &mut out);
        Ok(out)
    }

    /// Render to an exact wire byte sequence. Validates first.
    ///
    /// Identical walk to [`render_string`](Self::render_string), except that
    /// byte-sequence values are spliced in verbatim with no text transform.
    pub fn render_bytes(&self, values: &ParamValues) -> Result<Vec<u8>, ValidationError> {
        self.validate_args(values)?;
        let mut out = Vec::with_capacity(self.byte_len(values));
        self.render_bytes_into(values, &mut out);
        Ok(out)
    }

    /// Exact length in bytes of [`render_bytes`](Self::render_bytes) output
    /// for an already-validated value set. Allocation-free.
    pub(crate) fn byte_len(&self, values: &ParamValues) -> usize {
        let mut total = 0;
        for seg in &self.segments {
            match seg {
                Segment::Literal(lit) => total += lit.len(),
                Segment::Param(idx) => {
                    let spec = &self.params[*idx];
                    total += match values.get(&spec.key) {
                        Some(ParamValue::Str(s)) => s.len(),
                        Some(ParamValue::Int(v)) => decimal_len(*v),
                        Some(ParamValue::Bool(b)) => self.flag_token(spec, *b).len(),
                        Some(ParamValue::Bytes(bytes)) => bytes.len(),
                        None => 0,
                    };
                    total += spec.delimiter.len();
                }
            }
        }
        total
    }

    /// Segment walk for the string path. Assumes `values` already validated.
    pub(crate) fn render_string_into(&self, values: &ParamValues, out: &mut String) {
        for seg in &self.segments {
            match seg {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(idx) => {
                    let spec = &self.params[*idx];
                    match values.get(&spec.key) {
                        Some(ParamValue::Bool(b)) => out.push_str(self.flag_token(spec, *b)),
                        Some(value) => {
                            use std::fmt::Write;
                            // Display never fails when writing to a String.
                            let _ = write!(out, "{value}");
                        }
                        None => {}
                    }
                    out.push_str(&spec.delimiter);
                }
            }
        }
    }

    /// Segment walk for the byte path. Assumes `values` already validated.
    pub(crate) fn render_bytes_into(&self, values: &ParamValues, out: &mut Vec<u8>) {
        for seg in &self.segments {
            match seg {
                Segment::Literal(lit) => out.extend_from_slice(lit.as_bytes()),
                Segment::Param(idx) => {
                    let spec = &self.params[*idx];
                    match values.get(&spec.key) {
                        Some(ParamValue::Str(s)) => out.extend_from_slice(s.as_bytes()),
                        Some(ParamValue::Int(v)) => {
                            out.extend_from_slice(v.to_string().as_bytes());
                        }
                        Some(ParamValue::Bool(b)) => {
                            out.extend_from_slice(self.flag_token(spec, *b).as_bytes());
                        }
                        Some(ParamValue::Bytes(bytes)) => out.extend_from_slice(bytes),
                        None => {}
                    }
                    out.extend_from_slice(spec.delimiter.as_bytes());
                }
            }
        }
    }

    fn flag_token<'a>(&self, spec: &'a ParamSpec, value: bool) -> &'a str {
        match spec.ty.flag_tokens() {
            Some((yes, no)) => {
                if value {
                    yes
                } else {
                    no
                }
            }
            None => {
                if value {
                    "Y"
                } else {
                    "N"
                }
            }
        }
    }
}

/// Split a `{key}` pattern into alternating literal/parameter segments.
///
/// The result always begins and ends with a literal (possibly empty), so the
/// segment count is odd: literal, param, literal, ..., literal.
fn split_pattern(pattern: &str, params: &[ParamSpec]) -> Result<Vec<Segment>, SchemaError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(SchemaError::UnterminatedPlaceholder {
                pattern: pattern.to_string(),
            });
        };
        let key = &after[..close];
        let Some(idx) = params.iter().position(|p| p.key == key) else {
            return Err(SchemaError::UndeclaredParameter {
                key: key.to_string(),
            });
        };
        segments.push(Segment::Literal(std::mem::take(&mut literal)));
        segments.push(Segment::Param(idx));
        rest = &after[close + 1..];
    }

    literal.push_str(rest);
    segments.push(Segment::Literal(literal));
    Ok(segments)
}

/// Number of bytes in the decimal representation of `v`, without allocating.
fn decimal_len(v: i64) -> usize {
    // i64::MIN cannot be negated; its decimal form is 20 bytes.
    let Some(mut n) = v.checked_abs() else {
        return 20;
    };
    let mut len = if v < 0 { 2 } else { 1 };
    while n >= 10 {
        len += 1;
        n /= 10;
    }
    len
}
