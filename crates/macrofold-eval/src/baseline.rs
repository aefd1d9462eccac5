//! Baseline inference.
//! 基础推断。
//!
//! The evaluator asks a baseline first and only applies its own rules when
//! the baseline is not confident.

use crate::{EvalResult, Value};
use macrofold_common::NodeId;
use macrofold_syntax::{ExprKind, VarKind};
use macrofold_traverse::{BindingKind, NodePath};

/// A generic, macro-unaware static evaluator.
pub trait Baseline {
    fn infer(&self, path: &NodePath<'_>) -> EvalResult;
}

/// Never confident. Every answer comes from the evaluator's own rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBaseline;

impl Baseline for NoBaseline {
    fn infer(&self, _path: &NodePath<'_>) -> EvalResult {
        EvalResult::Unknown
    }
}

/// Literals, the `undefined`, `NaN` and `Infinity` globals, and `const`
/// bindings whose initializer is itself one of those.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantBaseline;

impl Baseline for ConstantBaseline {
    fn infer(&self, path: &NodePath<'_>) -> EvalResult {
        infer_constant(path, &mut Vec::new())
    }
}

fn infer_constant(path: &NodePath<'_>, visiting: &mut Vec<NodeId>) -> EvalResult {
    match &path.node().kind {
        ExprKind::Null => EvalResult::confident(Value::Null),
        ExprKind::Bool(b) => EvalResult::confident(Value::Bool(*b)),
        ExprKind::Number(n) => EvalResult::confident(Value::Number(*n)),
        ExprKind::String(s) => EvalResult::confident(Value::from(s.as_str())),
        ExprKind::Ident(name) if path.is_reference() => match path.binding() {
            None => match name.as_str() {
                "undefined" => EvalResult::confident(Value::Undefined),
                "NaN" => EvalResult::confident(Value::Number(f64::NAN)),
                "Infinity" => EvalResult::confident(Value::Number(f64::INFINITY)),
                _ => EvalResult::Unknown,
            },
            Some(binding) => match &binding.kind {
                BindingKind::Var {
                    kind: VarKind::Const,
                    init: Some(init),
                } => {
                    if visiting.contains(init) {
                        return EvalResult::Unknown;
                    }
                    let Some(init_path) = path.semantics().path(*init) else {
                        return EvalResult::Unknown;
                    };
                    visiting.push(*init);
                    let result = infer_constant(&init_path, visiting);
                    visiting.pop();
                    result
                }
                _ => EvalResult::Unknown,
            },
        },
        _ => EvalResult::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofold_parser::parse;
    use macrofold_traverse::Semantics;

    fn infer_tail(source: &str) -> EvalResult {
        let (module, diags) = parse(source);
        assert!(diags.is_empty(), "{diags:?}");
        let sema = Semantics::analyze(&module);
        let tail = sema.tail_path().unwrap();
        ConstantBaseline.infer(&tail)
    }

    #[test]
    fn test_literals_and_globals() {
        assert_eq!(infer_tail("'hi'").value(), Some(Ok(Value::from("hi"))));
        assert_eq!(infer_tail("undefined").value(), Some(Ok(Value::Undefined)));
        assert_eq!(infer_tail("Infinity").value(), Some(Ok(Value::Number(f64::INFINITY))));
        assert!(!infer_tail("window").is_confident());
        assert!(!infer_tail("1 + 2").is_confident());
    }

    #[test]
    fn test_const_chain() {
        let result = infer_tail("const a = 'x'; const b = a; b");
        assert_eq!(result.value(), Some(Ok(Value::from("x"))));
        assert!(!infer_tail("let a = 'x'; a").is_confident());
        assert!(!infer_tail("const a = b; const b = a; a").is_confident());
    }

    #[test]
    fn test_shadowed_global() {
        assert!(!infer_tail("let undefined = 1; undefined").is_confident());
    }

    #[test]
    fn test_no_baseline() {
        let (module, _) = parse("1");
        let sema = Semantics::analyze(&module);
        assert!(!NoBaseline.infer(&sema.tail_path().unwrap()).is_confident());
    }
}
