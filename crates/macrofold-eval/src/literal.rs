//! Turning values back into syntax.
//! 将值转换回语法树。

use crate::{Confident, EvalError, Value};
use macrofold_common::{NodeIdGen, Span};
use macrofold_diagnostic::render_all;
use macrofold_parser::parse_expression_with_ids;
use macrofold_syntax::{Expr, ExprKind};
use serde_json::{Map, Number, Value as JsonValue};
use thiserror::Error;

/// Errors raised while encoding a value as a literal.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{0} has no JSON representation")]
    NotSerializable(String),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("encoded literal did not parse back:\n{0}")]
    Reparse(String),
}

/// Build an expression that evaluates to `value`.
///
/// `undefined` becomes the identifier `undefined`. Everything else goes
/// through JSON, so inside containers `undefined` turns into `null` in
/// arrays and disappears from objects, as with `JSON.stringify`.
pub fn build_literal(value: &Value) -> Result<Expr, EncodeError> {
    build_literal_with_ids(value, &mut NodeIdGen::new())
}

/// Like [`build_literal`], numbering the new nodes from `ids`.
pub fn build_literal_with_ids(value: &Value, ids: &mut NodeIdGen) -> Result<Expr, EncodeError> {
    if let Value::Undefined = value {
        return Ok(Expr::new(
            ids.fresh(),
            ExprKind::Ident("undefined".to_string()),
            Span::DUMMY,
        ));
    }

    let json = serde_json::to_string(&to_json(value)?)?;
    let source = format!("a({json})");
    let (expr, next_ids, diagnostics) = parse_expression_with_ids(&source, std::mem::take(ids));
    *ids = next_ids;
    if !diagnostics.is_empty() {
        return Err(EncodeError::Reparse(render_all(&source, "<literal>", &diagnostics)));
    }
    match expr.kind {
        ExprKind::Call { mut arguments, .. } if arguments.len() == 1 => arguments
            .pop()
            .ok_or_else(|| EncodeError::Reparse(source.clone())),
        _ => Err(EncodeError::Reparse(source)),
    }
}

/// Read a confident result and encode it.
pub fn build_literal_from(result: &Confident) -> Result<Expr, EncodeError> {
    build_literal(&result.get()?)
}

/// The JSON form of a value, as `JSON.stringify` would produce it.
/// Top-level `undefined` and non-finite numbers have none.
pub fn to_json(value: &Value) -> Result<JsonValue, EncodeError> {
    Ok(match value {
        Value::Undefined => return Err(EncodeError::NotSerializable("undefined".to_string())),
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => JsonValue::Number(json_number(*n)?),
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Undefined => Ok(JsonValue::Null),
                    other => to_json(other),
                })
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(entries) => {
            let mut map = Map::new();
            for (key, item) in entries.iter() {
                if let Value::Undefined = item {
                    continue;
                }
                map.insert(key.clone(), to_json(item)?);
            }
            JsonValue::Object(map)
        }
    })
}

/// Integral values print without a fraction, like JavaScript does.
fn json_number(n: f64) -> Result<Number, EncodeError> {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return Ok(Number::from(n as i64));
    }
    Number::from_f64(n).ok_or_else(|| EncodeError::NotSerializable(crate::value::number_to_string(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_undefined_is_an_identifier() {
        let expr = build_literal(&Value::Undefined).unwrap();
        assert_eq!(expr.as_ident(), Some("undefined"));
    }

    #[test]
    fn test_numbers() {
        let expr = build_literal(&Value::Number(42.0)).unwrap();
        assert!(matches!(expr.kind, ExprKind::Number(n) if n == 42.0));
        let expr = build_literal(&Value::Number(-1.5)).unwrap();
        assert!(matches!(expr.kind, ExprKind::Unary { .. }));
        assert!(matches!(
            build_literal(&Value::Number(f64::NAN)),
            Err(EncodeError::NotSerializable(_))
        ));
    }

    #[test]
    fn test_container_undefined() {
        let array = Value::array(vec![Value::Number(1.0), Value::Undefined]);
        assert_eq!(to_json(&array).unwrap(), serde_json::json!([1, null]));

        let object = Value::object(vec![
            ("a".into(), Value::Undefined),
            ("b".into(), Value::Bool(true)),
        ]);
        assert_eq!(to_json(&object).unwrap(), serde_json::json!({ "b": true }));
    }

    #[test]
    fn test_string_escapes_survive() {
        let value = Value::from("quote \" and \\ and \n");
        let expr = build_literal(&value).unwrap();
        match expr.kind {
            ExprKind::String(s) => assert_eq!(s, "quote \" and \\ and \n"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_ids_continue() {
        let mut ids = NodeIdGen::starting_at(100);
        let expr = build_literal_with_ids(&Value::Bool(true), &mut ids).unwrap();
        assert!(expr.id.as_u32() >= 100);
        assert!(ids.peek() > 100);
    }
}
