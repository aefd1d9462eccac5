//! Integration tests for re-encoding folded values as literals.

use macrofold::eval::{EncodeError, Evaluator, Value, build_literal};
use macrofold::{ConstantBaseline, MacrosOptions, MacrosState, evaluate_source, fold_source};
use macrofold_syntax::{Expr, ExprKind, Module};
use macrofold_traverse::Semantics;
use pretty_assertions::assert_eq;
use std::rc::Rc;

/// Evaluate a standalone expression tree.
fn evaluate_expr(expr: Expr) -> Option<Value> {
    let module = Module::from_expr(expr);
    let sema = Semantics::analyze(&module);
    let path = sema.tail_path()?;
    let mut evaluator = Evaluator::new().with_baseline(Rc::new(ConstantBaseline));
    evaluator
        .evaluate(&path)
        .unwrap()
        .value()
        .map(|value| value.unwrap())
}

#[test]
fn test_round_trip() {
    for source in [
        "42",
        "'hi'",
        "true",
        "null",
        "[1, 2, 3]",
        "({ a: 1, b: 'x' })",
        "({ b: 1, a: 2 })",
        "undefined",
        "-0.5",
        "({ nested: { list: [true, null, 'é'] } })",
    ] {
        let value = evaluate_source(source, None).unwrap().unwrap();
        let literal = build_literal(&value).unwrap();
        assert_eq!(evaluate_expr(literal), Some(value), "{source}");
    }
}

#[test]
fn test_undefined_inside_containers() {
    let value = Value::array(vec![Value::Undefined, Value::Number(1.0)]);
    let literal = build_literal(&value).unwrap();
    assert_eq!(
        evaluate_expr(literal),
        Some(Value::array(vec![Value::Null, Value::Number(1.0)]))
    );

    let value = Value::object(vec![
        ("gone".into(), Value::Undefined),
        ("kept".into(), Value::Bool(false)),
    ]);
    let literal = build_literal(&value).unwrap();
    assert_eq!(
        evaluate_expr(literal),
        Some(Value::object(vec![("kept".into(), Value::Bool(false))]))
    );
}

#[test]
fn test_non_finite_numbers_fail_loudly() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            build_literal(&Value::Number(value)),
            Err(EncodeError::NotSerializable(_))
        ));
    }
    let nested = Value::array(vec![Value::Number(f64::NAN)]);
    assert!(build_literal(&nested).is_err());
}

#[test]
fn test_fold_source() {
    let state = MacrosState::new(
        MacrosOptions::new().module("ember-source"),
        "/app/index.js",
    );
    let source = "import { moduleExists } from '@embroider/macros'; \
                  moduleExists('ember-source') ? { on: true } : { on: false }";
    let folded = fold_source(source, Some(&state)).unwrap().unwrap();
    assert!(matches!(folded.kind, ExprKind::Object(_)));
    assert_eq!(
        evaluate_expr(folded),
        Some(Value::object(vec![("on".into(), Value::Bool(true))]))
    );

    assert!(fold_source("window.innerWidth", None).unwrap().is_none());
}

#[test]
fn test_fold_source_reports_unreadable_values() {
    let state = MacrosState::new(MacrosOptions::new(), "/app/index.js")
        .with_runtime_import("getConfig", macrofold::macros::RuntimeImport::Config);
    let err = fold_source("getConfig()", Some(&state)).unwrap_err();
    assert!(matches!(err, macrofold::Error::Encode(EncodeError::Eval(_))));
}
