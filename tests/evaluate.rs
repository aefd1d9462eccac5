//! Integration tests for the confidence-tracking evaluator.

use macrofold::eval::{Baseline, ConstantBaseline, EvalError, EvalResult, Evaluator, Value};
use macrofold::evaluate_source;
use macrofold_parser::parse;
use macrofold_traverse::{NodePath, Semantics};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Show evaluator traces with `RUST_LOG=macrofold_eval=trace`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer())
                .with(EnvFilter::from_default_env())
                .try_init();
        }
    });
}

/// Evaluate every expression statement and return the last result.
fn eval_all(source: &str, evaluator: &mut Evaluator<'_>) -> Result<EvalResult, EvalError> {
    init_tracing();
    let (module, diags) = parse(source);
    assert!(diags.is_empty(), "{diags:?}");
    let sema = Semantics::analyze(&module);
    let mut last = EvalResult::Unknown;
    for path in sema.expr_stmt_paths() {
        last = evaluator.evaluate(&path)?;
    }
    Ok(last)
}

fn value_of(source: &str) -> Option<Value> {
    init_tracing();
    evaluate_source(source, None).unwrap()
}

/// A baseline that never knows anything but remembers which identifiers
/// it was asked about.
#[derive(Default)]
struct Recording {
    visited: RefCell<Vec<String>>,
}

impl Baseline for Recording {
    fn infer(&self, path: &NodePath<'_>) -> EvalResult {
        if let Some(name) = path.ident_name() {
            self.visited.borrow_mut().push(name.to_string());
        }
        EvalResult::Unknown
    }
}

// ============================================================================
// Literals and composites
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(value_of("42"), Some(Value::Number(42.0)));
    assert_eq!(value_of("'hi'"), Some(Value::from("hi")));
    assert_eq!(value_of("true"), Some(Value::Bool(true)));
    assert_eq!(value_of("null"), Some(Value::Null));
    assert_eq!(value_of("undefined"), Some(Value::Undefined));
}

#[test]
fn test_objects_are_all_or_nothing() {
    assert_eq!(
        value_of("({ a: 1, b: 'x' })"),
        Some(Value::object(vec![
            ("a".into(), Value::Number(1.0)),
            ("b".into(), Value::from("x")),
        ]))
    );
    assert_eq!(value_of("({ a: 1, b: window })"), None);
    assert_eq!(value_of("({ [key]: 1 })"), None);
}

#[test]
fn test_arrays_are_all_or_nothing() {
    assert_eq!(
        value_of("[1, 2, 3]"),
        Some(Value::array(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ]))
    );
    assert_eq!(value_of("[1, window, 3]"), None);
}

#[test]
fn test_const_bindings_fold() {
    assert_eq!(value_of("const base = 10; base * 2 + 1"), Some(Value::Number(21.0)));
    assert_eq!(value_of("let base = 10; base * 2"), None);
}

// ============================================================================
// Memoization
// ============================================================================

#[test]
fn test_memo_identity() {
    let (module, _) = parse("({ a: [1, 2] }).a");
    let sema = Semantics::analyze(&module);
    let path = sema.tail_path().unwrap();

    let mut evaluator = Evaluator::new();
    let first = evaluator.evaluate(&path).unwrap();
    let second = evaluator.evaluate(&path).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(
        first.value(),
        Some(Ok(Value::array(vec![Value::Number(1.0), Value::Number(2.0)])))
    );
}

#[test]
fn test_memo_skips_the_baseline_on_repeat() {
    let recording = Rc::new(Recording::default());
    let mut evaluator = Evaluator::new().with_baseline(recording.clone());
    let (module, _) = parse("a");
    let sema = Semantics::analyze(&module);
    let path = sema.tail_path().unwrap();
    evaluator.evaluate(&path).unwrap();
    evaluator.evaluate(&path).unwrap();
    assert_eq!(*recording.visited.borrow(), vec!["a".to_string()]);
}

// ============================================================================
// Short-circuiting
// ============================================================================

#[test]
fn test_unknown_left_operand_skips_right() {
    let recording = Rc::new(Recording::default());
    let mut evaluator = Evaluator::new().with_baseline(recording.clone());
    let result = eval_all("left + right", &mut evaluator).unwrap();
    assert!(!result.is_confident());
    assert_eq!(*recording.visited.borrow(), vec!["left".to_string()]);
}

#[test]
fn test_skipped_right_operand_does_not_assign() {
    let mut evaluator = Evaluator::new();
    let result = eval_all("unknown && (flag = 1); flag", &mut evaluator).unwrap();
    assert!(!result.is_confident());
    assert!(!evaluator.locals().contains("flag"));
}

#[test]
fn test_confident_left_operand_still_visits_right() {
    let mut evaluator = Evaluator::new();
    let result = eval_all("false && (flag = 1); flag", &mut evaluator).unwrap();
    assert_eq!(result.value(), Some(Ok(Value::Number(1.0))));
}

#[test]
fn test_ternary_evaluates_one_branch() {
    let recording = Rc::new(Recording::default());
    let mut evaluator = Evaluator::new().with_baseline(recording.clone());
    let result = eval_all("1 ? yes : no", &mut evaluator).unwrap();
    assert!(!result.is_confident());
    assert_eq!(*recording.visited.borrow(), vec!["yes".to_string()]);

    assert_eq!(value_of("0 ? 'a' : 'b'"), Some(Value::from("b")));
    assert_eq!(value_of("cond ? 'a' : 'b'"), None);
}

// ============================================================================
// Assignment and member access
// ============================================================================

#[test]
fn test_assignment_write_then_read() {
    assert_eq!(value_of("x = 3; x + 1"), Some(Value::Number(4.0)));
    assert_eq!(value_of("x = { n: 'deep' }; x.n"), Some(Value::from("deep")));
    assert_eq!(value_of("x = 1; x = 2; x"), Some(Value::Number(2.0)));
}

#[test]
fn test_assignment_result_is_the_value_result() {
    let (module, _) = parse("x = [1]; x");
    let sema = Semantics::analyze(&module);
    let paths = sema.expr_stmt_paths();
    let mut evaluator = Evaluator::new();
    let assigned = evaluator.evaluate(&paths[0]).unwrap();
    let read = evaluator.evaluate(&paths[1]).unwrap();
    assert!(assigned.ptr_eq(&read));
}

#[test]
fn test_member_access() {
    assert_eq!(value_of("({ a: { b: [5, 6] } }).a.b[1]"), Some(Value::Number(6.0)));
    assert_eq!(value_of("[1, 2, 3].length"), Some(Value::Number(3.0)));
    assert_eq!(value_of("({ a: 1 }).missing"), Some(Value::Undefined));
    assert_eq!(value_of("undefined?.a"), Some(Value::Undefined));
    assert_eq!(value_of("window.location"), None);
}

#[test]
fn test_reading_through_null_faults() {
    let err = evaluate_source("null.a", None).unwrap_err();
    assert!(matches!(
        err,
        macrofold::Error::Eval(EvalError::PropertyOfNullish { .. })
    ));
}

#[test]
fn test_prototype_members_are_never_confident_undefined() {
    for source in [
        "[1].map === undefined",
        "'abc'.toUpperCase ? 'method' : 'none'",
        "({}).hasOwnProperty == null",
        "(1.5).toFixed",
    ] {
        let err = evaluate_source(source, None).unwrap_err();
        assert!(
            matches!(err, macrofold::Error::Eval(EvalError::InheritedProperty { .. })),
            "{source}: {err:?}"
        );
    }
}

#[test]
fn test_own_data_still_reads() {
    assert_eq!(value_of("[1, 2].length"), Some(Value::Number(2.0)));
    assert_eq!(value_of("({ map: 3 }).map"), Some(Value::Number(3.0)));
    assert_eq!(value_of("({ a: 1 }).missing"), Some(Value::Undefined));
    assert_eq!(value_of("'abc'[1]"), Some(Value::from("b")));
}

#[test]
fn test_indexing_into_a_surrogate_pair_faults() {
    let err = evaluate_source("'\\u{1F600}'[0] === '\\uFFFD'", None).unwrap_err();
    assert!(matches!(
        err,
        macrofold::Error::Eval(EvalError::LoneSurrogate { index: 0 })
    ));
    assert_eq!(value_of("'\\u{1F600}'.length"), Some(Value::Number(2.0)));
}

// ============================================================================
// Unknowns
// ============================================================================

#[test]
fn test_unsupported_forms_are_unknown() {
    for source in [
        "2 ** 2",
        "typeof 1",
        "(1, 2)",
        "fn()",
        "[...items]",
        "x += 1",
        "obj.prop = 1",
    ] {
        assert_eq!(value_of(source), None, "{source}");
    }
}

#[test]
fn test_parse_errors_are_reported() {
    let err = evaluate_source("1 +", None).unwrap_err();
    assert!(matches!(err, macrofold::Error::Parse(_)));
}

#[test]
fn test_child_evaluators_inherit() {
    let (module, _) = parse("seed = 'planted'; seed");
    let sema = Semantics::analyze(&module);
    let paths = sema.expr_stmt_paths();

    let mut parent = Evaluator::new().with_baseline(Rc::new(ConstantBaseline));
    parent.evaluate(&paths[0]).unwrap();
    let mut child = parent.child();
    let result = child.evaluate(&paths[1]).unwrap();
    assert_eq!(result.value(), Some(Ok(Value::from("planted"))));
    assert!(parent.cached(paths[1].id()).is_none());
}
