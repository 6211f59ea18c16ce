//! Scalar text forms of the export format.
//!
//! These rules are a compatibility surface: downstream tools diff exported
//! text byte for byte, so every scalar has exactly one spelling.

use std::borrow::Cow;
use std::fmt::Write;

use rip_schema::FieldKind;

use crate::node::Scalar;

/// Narrow a widened integer to the declared width of `kind`.
///
/// Integers are stored as `i64`; an `i16` field holding `0xFFFF` exports as
/// `-1` and a `u64` field exports its stored bits unsigned.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn wrap_integer(kind: &FieldKind, value: i64) -> Scalar {
    match kind {
        FieldKind::U8 => Scalar::Int(i64::from(value as u8)),
        FieldKind::I16 => Scalar::Int(i64::from(value as i16)),
        FieldKind::U16 => Scalar::Int(i64::from(value as u16)),
        FieldKind::I32 => Scalar::Int(i64::from(value as i32)),
        FieldKind::U32 => Scalar::Int(i64::from(value as u32)),
        FieldKind::U64 => Scalar::UInt(value.cast_unsigned()),
        _ => Scalar::Int(value),
    }
}

#[must_use]
pub const fn format_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Shortest decimal that reads back as the same `f32`.
///
/// Decimal exponents below -4 or from 15 up switch to `1E-05` / `1E+15`
/// notation.
#[must_use]
pub fn format_f32(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if value == 0.0 {
        let text = if value.is_sign_negative() { "-0" } else { "0" };
        return text.to_string();
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..15).contains(&exponent) {
        value.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}E{sign}{:02}", exponent.unsigned_abs())
    }
}

/// A string scalar: plain unless YAML syntax would misread it, otherwise
/// single-quoted with `''` escapes. Text with control characters is
/// double-quoted.
///
/// Number- and bool-like text stays plain. `flow` marks strings written
/// inside `{...}` or `[...]`, where flow indicators also force quoting.
/// Empty strings render as nothing.
#[must_use]
pub fn format_string(text: &str, flow: bool) -> Cow<'_, str> {
    if text.is_empty() {
        Cow::Borrowed("")
    } else if text.chars().any(char::is_control) {
        Cow::Owned(double_quoted(text))
    } else if is_plain_safe(text, flow) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("'{}'", text.replace('\'', "''")))
    }
}

#[must_use]
pub fn format_scalar(scalar: &Scalar, flow: bool) -> Cow<'_, str> {
    match scalar {
        Scalar::Bool(value) => Cow::Borrowed(format_bool(*value)),
        Scalar::Int(value) => Cow::Owned(value.to_string()),
        Scalar::UInt(value) => Cow::Owned(value.to_string()),
        Scalar::Float(value) => Cow::Owned(format_f32(*value)),
        Scalar::String(text) => format_string(text, flow),
    }
}

fn is_plain_safe(text: &str, flow: bool) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if matches!(
        first,
        '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\''
            | '"' | '%' | '@' | '`'
    ) {
        return false;
    }
    if text.starts_with(' ') || text.ends_with(' ') {
        return false;
    }
    if text.contains(": ") || text.contains(" #") || text.ends_with(':') {
        return false;
    }
    !(flow && text.contains([',', '[', ']', '{', '}']))
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            ch if ch.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(ch));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_float_forms() {
        assert_eq!(format_f32(0.0), "0");
        assert_eq!(format_f32(-0.0), "-0");
        assert_eq!(format_f32(1.0), "1");
        assert_eq!(format_f32(0.05), "0.05");
        assert_eq!(format_f32(0.1), "0.1");
        assert_eq!(format_f32(-2.5), "-2.5");
        assert_eq!(format_f32(0.0001), "0.0001");
        assert_eq!(format_f32(0.00015), "0.00015");
        assert_eq!(format_f32(0.00001), "1E-05");
        assert_eq!(format_f32(-2.5e-5), "-2.5E-05");
        assert_eq!(format_f32(1e-7), "1E-07");
        assert_eq!(format_f32(-1.5e-6), "-1.5E-06");
        assert_eq!(format_f32(1e14), "100000000000000");
        assert_eq!(format_f32(1e15), "1E+15");
        assert_eq!(format_f32(3.4028235e38), "3.4028235E+38");
        assert_eq!(format_f32(f32::NAN), "NaN");
        assert_eq!(format_f32(f32::INFINITY), "Infinity");
        assert_eq!(format_f32(f32::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(format_string("", false), "");
        assert_eq!(format_string("Main Camera", false), "Main Camera");
        assert_eq!(format_string("it's", false), "it's");
        assert_eq!(format_string("'quoted'", false), "'''quoted'''");
        assert_eq!(format_string("key: value", false), "'key: value'");
        assert_eq!(format_string("- item", false), "'- item'");
        assert_eq!(format_string(" padded", false), "' padded'");
        // Readers are typed by the schema, so number-like text stays plain.
        assert_eq!(format_string("42", false), "42");
        assert_eq!(format_string("a, b", false), "a, b");
        assert_eq!(format_string("a, b", true), "'a, b'");
        assert_eq!(format_string("two\nlines", false), "\"two\\nlines\"");
    }

    #[test]
    fn test_integers_wrap_to_declared_width() {
        assert_eq!(wrap_integer(&FieldKind::I16, 0xFFFF), Scalar::Int(-1));
        assert_eq!(wrap_integer(&FieldKind::U8, -1), Scalar::Int(255));
        assert_eq!(wrap_integer(&FieldKind::U32, -1), Scalar::Int(4_294_967_295));
        assert_eq!(wrap_integer(&FieldKind::I32, 7), Scalar::Int(7));
        assert_eq!(wrap_integer(&FieldKind::U64, -1), Scalar::UInt(u64::MAX));
        assert_eq!(format_bool(true), "1");
    }

    proptest! {
        #[test]
        fn finite_floats_read_back(value in any::<f32>().prop_filter("finite", |v| v.is_finite())) {
            let text = format_f32(value);
            let parsed: f32 = text.parse().unwrap();
            prop_assert_eq!(parsed.to_bits(), value.to_bits());
        }
    }
}
