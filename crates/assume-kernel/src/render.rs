//! Compact rendering of values for diagnostics.

use crate::ty::Type;
use crate::value::{Payload, Value};

/// A short rendering of `value` for an error message, or `None` when the
/// value is too complicated to show inline.
///
/// Only null and primitive values render. An unknown string renders as
/// its known prefix, if it has one.
pub fn simple_display(value: &Value) -> Option<String> {
    match value {
        Value::Null { .. } => Some("null".to_string()),
        _ if !value.ty().is_primitive() => None,
        Value::Unknown { ty, refinement } => match (ty, &refinement.string_prefix) {
            (Type::String, Some(prefix)) => Some(format!("(a string starting with {prefix:?})")),
            _ => None,
        },
        Value::Known { payload, .. } => match payload {
            Payload::String(s) => Some(format!("{s:?}")),
            Payload::Number(n) => Some(format_number(*n)),
            Payload::Bool(b) => Some(b.to_string()),
            _ => None,
        },
    }
}

/// Shortest round-trip digits, switching to exponent form below 1e-4 and
/// from 1e21 up, with a signed two-digit minimum exponent (`1e+21`).
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let scientific = format!("{n:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return n.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return n.to_string();
    };
    if n != 0.0 && (exponent < -4 || exponent >= 21) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refinement::Refinement;

    #[test]
    fn primitives_render() {
        assert_eq!(simple_display(&Value::string("hello")).as_deref(), Some("\"hello\""));
        assert_eq!(simple_display(&Value::number(1.5)).as_deref(), Some("1.5"));
        assert_eq!(simple_display(&Value::number(3.0)).as_deref(), Some("3"));
        assert_eq!(simple_display(&Value::bool(false)).as_deref(), Some("false"));
        assert_eq!(simple_display(&Value::null(Type::list(Type::String))).as_deref(), Some("null"));
    }

    #[test]
    fn large_and_small_numbers_use_exponents() {
        let shown = |n: f64| simple_display(&Value::number(n)).unwrap();
        assert_eq!(shown(1e21), "1e+21");
        assert_eq!(shown(1.5e300), "1.5e+300");
        assert_eq!(shown(1e20), "100000000000000000000");
        assert_eq!(shown(0.0001), "0.0001");
        assert_eq!(shown(0.00001), "1e-05");
        assert_eq!(shown(-2.5e-7), "-2.5e-07");
        assert_eq!(shown(0.0), "0");
    }

    #[test]
    fn compound_values_do_not_render() {
        let map = Value::map(Type::String, [("greeting", Value::string("howdy"))]);
        assert_eq!(simple_display(&map), None);
        assert_eq!(simple_display(&Value::dynamic()), None);
    }

    #[test]
    fn unknown_string_renders_prefix() {
        let value = Value::Unknown {
            ty: Type::String,
            refinement: Refinement {
                string_prefix: Some("arn:".into()),
                ..Refinement::default()
            },
        };
        insta::assert_snapshot!(
            simple_display(&value).unwrap(),
            @r#"(a string starting with "arn:")"#
        );
        assert_eq!(simple_display(&Value::unknown(Type::String)), None);
    }
}
