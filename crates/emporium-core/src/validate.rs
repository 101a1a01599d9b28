//! The validation engine.
//!
//! One generic routine walks a [`Schema`] against a raw [`Value`], coerces
//! every field to its declared type, checks constraints, and collects a
//! [`FieldError`] for each failing field. Validation never stops at the first
//! failure.
//!
//! Coercion follows the narrowest rule: numeric targets accept JSON numbers
//! and strings holding a finite numeric literal, booleans accept textual
//! literals only when the value came from a textual source, and strings are
//! never produced from numbers.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::error::{FieldError, FieldErrors};
use crate::schema::{Constraint, FieldSpec, FieldType, Schema};

/// Where a raw value came from.
///
/// Textual sources (path, query, header, cookie, form) deliver everything as
/// strings, so booleans are parsed from words as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// A JSON document.
    #[default]
    Json,
    /// A string from a textual request channel.
    Text,
}

/// Validates a raw object against `schema`.
///
/// Returns an object keyed by internal field names in declaration order.
pub fn validate(schema: &Schema, raw: &Value) -> Result<Value, FieldErrors> {
    let Value::Object(obj) = raw else {
        return Err(FieldErrors::single(
            FieldError::new(
                "model_type",
                "Input should be a valid dictionary or object to extract fields from",
            )
            .with_input(raw.clone()),
        ));
    };

    let mut out = Map::new();
    let mut errors = FieldErrors::new();
    for field in schema.fields() {
        let key = field.external_name();
        match validate_field(field, obj.get(key), Mode::Json) {
            Ok(value) => {
                out.insert(field.name().to_string(), value);
            }
            Err(e) => errors.extend(e.at(key)),
        }
    }
    errors.into_result(Value::Object(out))
}

/// Validates a single, possibly absent, value against its field declaration.
///
/// Absent and `null` values resolve to the default (or `null`) for optional
/// fields and to a `missing` error for required ones. Errors carry no field
/// name; callers prefix the location they read the value from.
pub fn validate_field(
    field: &FieldSpec,
    raw: Option<&Value>,
    mode: Mode,
) -> Result<Value, FieldErrors> {
    let raw = match raw {
        None | Some(Value::Null) if field.is_required() => {
            let err = FieldError::missing();
            let err = match raw {
                Some(v) => err.with_input(v.clone()),
                None => err,
            };
            return Err(FieldErrors::single(err));
        }
        None | Some(Value::Null) => {
            return Ok(field.default_value().cloned().unwrap_or(Value::Null));
        }
        Some(v) => v,
    };

    let value = coerce(field.ty(), raw, mode)?;
    check_constraints(field.constraints(), &value)
        .map_err(|e| FieldErrors::single(e.with_input(raw.clone())))?;
    Ok(value)
}

/// Coerces a raw value to `ty`, recursing into containers and models.
pub fn coerce(ty: &FieldType, raw: &Value, mode: Mode) -> Result<Value, FieldErrors> {
    let fail = |kind: &str, msg: String| {
        Err(FieldErrors::single(
            FieldError::new(kind, msg).with_input(raw.clone()),
        ))
    };

    match ty {
        FieldType::Any => Ok(raw.clone()),
        FieldType::String => match raw {
            Value::String(_) => Ok(raw.clone()),
            _ => fail("string_type", "Input should be a valid string".into()),
        },
        FieldType::Integer => match integer(raw) {
            Ok(n) => Ok(Value::from(n)),
            Err((kind, msg)) => fail(kind, msg.into()),
        },
        FieldType::Float => match float(raw) {
            Some(n) => Ok(Number::from_f64(n).map_or(Value::Null, Value::Number)),
            None if matches!(raw, Value::String(_)) => fail(
                "float_parsing",
                "Input should be a valid number, unable to parse string as a number".into(),
            ),
            None => fail("float_type", "Input should be a valid number".into()),
        },
        FieldType::Boolean => match (raw, mode) {
            (Value::Bool(_), _) => Ok(raw.clone()),
            (Value::String(s), Mode::Text) => match parse_bool(s) {
                Some(b) => Ok(Value::Bool(b)),
                None => fail(
                    "bool_parsing",
                    "Input should be a valid boolean, unable to interpret input".into(),
                ),
            },
            _ => fail("bool_type", "Input should be a valid boolean".into()),
        },
        FieldType::Uuid => match raw.as_str().map(Uuid::parse_str) {
            Some(Ok(id)) => Ok(Value::String(id.hyphenated().to_string())),
            Some(Err(e)) => fail(
                "uuid_parsing",
                format!("Input should be a valid UUID, {e}"),
            ),
            None => fail("uuid_type", "UUID input should be a string".into()),
        },
        FieldType::Url => match raw.as_str().map(url::Url::parse) {
            Some(Ok(u)) if matches!(u.scheme(), "http" | "https") && u.has_host() => {
                Ok(Value::String(u.into()))
            }
            Some(Ok(_)) => fail(
                "url_scheme",
                "URL scheme should be 'http' or 'https'".into(),
            ),
            Some(Err(e)) => fail("url_parsing", format!("Input should be a valid URL, {e}")),
            None => fail("url_type", "URL input should be a string".into()),
        },
        FieldType::Email => match raw.as_str() {
            Some(s) if s.validate_email() => Ok(raw.clone()),
            Some(_) => fail(
                "value_error.email",
                "value is not a valid email address".into(),
            ),
            None => fail("string_type", "Input should be a valid string".into()),
        },
        FieldType::Enum(members) => match raw.as_str() {
            Some(s) if members.iter().any(|m| m == s) => Ok(raw.clone()),
            _ => fail("enum", format!("Input should be {}", quoted_choices(members))),
        },
        FieldType::Literal(expected) => match raw.as_str() {
            Some(s) if s == expected => Ok(raw.clone()),
            _ => fail("literal_error", format!("Input should be '{expected}'")),
        },
        FieldType::List(inner) => sequence(inner, raw, mode, false),
        FieldType::Set(inner) => sequence(inner, raw, mode, true),
        FieldType::Map(inner) => {
            let Value::Object(obj) = raw else {
                return fail("dict_type", "Input should be a valid dictionary".into());
            };
            let mut out = Map::new();
            let mut errors = FieldErrors::new();
            for (k, v) in obj {
                match coerce(inner, v, mode) {
                    Ok(v) => {
                        out.insert(k.clone(), v);
                    }
                    Err(e) => errors.extend(e.at(k.as_str())),
                }
            }
            errors.into_result(Value::Object(out))
        }
        FieldType::Model(schema) => validate(schema, raw),
    }
}

fn sequence(inner: &FieldType, raw: &Value, mode: Mode, unique: bool) -> Result<Value, FieldErrors> {
    let single;
    let items: &[Value] = match raw {
        Value::Array(items) => items,
        // A lone textual value is a one-element list.
        Value::String(_) if mode == Mode::Text => {
            single = [raw.clone()];
            &single
        }
        _ => {
            let (kind, what) = if unique {
                ("set_type", "set")
            } else {
                ("list_type", "list")
            };
            return Err(FieldErrors::single(
                FieldError::new(kind, format!("Input should be a valid {what}"))
                    .with_input(raw.clone()),
            ));
        }
    };

    let mut out = Vec::with_capacity(items.len());
    let mut errors = FieldErrors::new();
    for (i, item) in items.iter().enumerate() {
        match coerce(inner, item, mode) {
            Ok(v) => out.push(v),
            Err(e) => errors.extend(e.at(i)),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    if unique {
        let mut seen = HashSet::new();
        out.retain(|v| seen.insert(v.to_string()));
        if out.iter().all(Value::is_string) {
            out.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        }
    }
    Ok(Value::Array(out))
}

fn integer(raw: &Value) -> Result<i64, (&'static str, &'static str)> {
    const OUT_OF_RANGE: (&str, &str) = (
        "int_parsing",
        "Input should be a valid integer, unable to parse number as an integer, out of range",
    );
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(OUT_OF_RANGE);
            }
            match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err((
                    "int_from_float",
                    "Input should be a valid integer, got a number with a fractional part",
                )),
                Some(f) if f.is_finite() && f.abs() < 9.0e15 => Ok(f as i64),
                _ => Err(OUT_OF_RANGE),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            (
                "int_parsing",
                "Input should be a valid integer, unable to parse string as an integer",
            )
        }),
        _ => Err(("int_type", "Input should be a valid integer")),
    }
}

fn float(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_finite(s.trim())?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parses a plain decimal literal. Words such as `inf` or `nan`, which
/// `f64::from_str` accepts, are rejected.
fn parse_finite(s: &str) -> Option<f64> {
    let looks_numeric = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && s.chars().any(|c| c.is_ascii_digit());
    if looks_numeric {
        s.parse::<f64>().ok()
    } else {
        None
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

fn check_constraints(constraints: &[Constraint], value: &Value) -> Result<(), FieldError> {
    for c in constraints {
        check(c, value)?;
    }
    Ok(())
}

fn check(constraint: &Constraint, value: &Value) -> Result<(), FieldError> {
    let len = match value {
        Value::String(s) => Some((s.chars().count(), "String", "character")),
        Value::Array(a) => Some((a.len(), "List", "item")),
        _ => None,
    };
    let num = value.as_f64();

    match (constraint, len, num) {
        (Constraint::MinLength(min), Some((n, what, unit)), _) if n < *min => Err(FieldError::new(
            if what == "String" { "string_too_short" } else { "too_short" },
            format!("{what} should have at least {min} {}", plural(unit, *min)),
        )),
        (Constraint::MaxLength(max), Some((n, what, unit)), _) if n > *max => Err(FieldError::new(
            if what == "String" { "string_too_long" } else { "too_long" },
            format!("{what} should have at most {max} {}", plural(unit, *max)),
        )),
        (Constraint::Gt(b), _, Some(n)) if n <= *b => Err(FieldError::new(
            "greater_than",
            format!("Input should be greater than {}", fmt_bound(*b)),
        )),
        (Constraint::Ge(b), _, Some(n)) if n < *b => Err(FieldError::new(
            "greater_than_equal",
            format!("Input should be greater than or equal to {}", fmt_bound(*b)),
        )),
        (Constraint::Lt(b), _, Some(n)) if n >= *b => Err(FieldError::new(
            "less_than",
            format!("Input should be less than {}", fmt_bound(*b)),
        )),
        (Constraint::Le(b), _, Some(n)) if n > *b => Err(FieldError::new(
            "less_than_equal",
            format!("Input should be less than or equal to {}", fmt_bound(*b)),
        )),
        (Constraint::Pattern(re), _, _) => match value.as_str() {
            Some(s) if !re.is_match(s) => Err(FieldError::new(
                "string_pattern_mismatch",
                format!("String should match pattern '{}'", re.as_str()),
            )),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

fn plural(unit: &str, n: usize) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}

fn fmt_bound(b: f64) -> String {
    if b.fract() == 0.0 && b.abs() < 1e15 {
        format!("{}", b as i64)
    } else {
        format!("{b}")
    }
}

fn quoted_choices(members: &[String]) -> String {
    let quoted: Vec<String> = members.iter().map(|m| format!("'{m}'")).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => "one of no values".to_string(),
    }
}
