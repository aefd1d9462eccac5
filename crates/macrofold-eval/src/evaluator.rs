//! The confidence-tracking evaluator.
//! 置信度求值器。
//!
//! Folds the parts of an expression tree whose values are fixed at build
//! time and reports everything else as [`EvalResult::Unknown`]. Results are
//! memoized per node, and a result is confident only when every input it
//! depends on is confident.

use crate::baseline::{Baseline, NoBaseline};
use crate::hooks::{self, MacroContext};
use crate::ops::{BinaryFn, UnaryFn, lookup_binary, lookup_unary};
use crate::{Confident, Environment, EvalError, EvalResult, Value};
use macrofold_common::NodeId;
use macrofold_syntax::{AssignOp, ExprKind};
use macrofold_traverse::{NodePath, Slot};
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluates expressions, remembering every answer by node.
///
/// Evaluation of a node is finished before its result is cached, so the
/// memo never holds a half-built entry. Children spawned with
/// [`Evaluator::child`] start from a copy of the parent's memo and
/// locals; what they learn afterwards stays with them.
pub struct Evaluator<'a> {
    cache: HashMap<NodeId, EvalResult>,
    locals: Environment,
    context: Option<MacroContext<'a>>,
    baseline: Rc<dyn Baseline + 'a>,
}

impl Default for Evaluator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Evaluator<'a> {
    /// An evaluator with no baseline and no macro context.
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            locals: Environment::new(),
            context: None,
            baseline: Rc::new(NoBaseline),
        }
    }

    /// Consult `baseline` before the evaluator's own rules.
    pub fn with_baseline(mut self, baseline: Rc<dyn Baseline + 'a>) -> Self {
        self.baseline = baseline;
        self
    }

    /// Enable the runtime placeholder and macro call hooks.
    pub fn with_context(mut self, context: MacroContext<'a>) -> Self {
        self.context = Some(context);
        self
    }

    /// Start from the given locals.
    pub fn with_locals(mut self, locals: Environment) -> Self {
        self.locals = locals;
        self
    }

    /// Seed memo entries, e.g. answers another pass already knows.
    pub fn with_known(mut self, known: impl IntoIterator<Item = (NodeId, EvalResult)>) -> Self {
        self.cache.extend(known);
        self
    }

    /// A new evaluator sharing this one's context and baseline, seeded with
    /// a copy of its memo and locals.
    pub fn child(&self) -> Evaluator<'a> {
        Evaluator {
            cache: self.cache.clone(),
            locals: self.locals.clone(),
            context: self.context,
            baseline: Rc::clone(&self.baseline),
        }
    }

    pub fn locals(&self) -> &Environment {
        &self.locals
    }

    /// The memoized result for a node, if it has been evaluated.
    pub fn cached(&self, id: NodeId) -> Option<&EvalResult> {
        self.cache.get(&id)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Evaluate the expression at `path`.
    ///
    /// Evaluating the same node twice returns the same result without
    /// walking it again. An `Err` is a structural or macro fault, never a
    /// "don't know".
    #[tracing::instrument(level = "trace", skip_all, fields(node = path.id().as_u32()))]
    pub fn evaluate(&mut self, path: &NodePath<'_>) -> Result<EvalResult, EvalError> {
        if let Some(cached) = self.cache.get(&path.id()) {
            tracing::trace!("memo hit");
            return Ok(cached.clone());
        }
        let result = self.real_evaluate(path)?;
        tracing::trace!(kind = ?path.kind(), confident = result.is_confident(), "evaluated");
        self.cache.insert(path.id(), result.clone());
        Ok(result)
    }

    fn real_evaluate(&mut self, path: &NodePath<'_>) -> Result<EvalResult, EvalError> {
        let builtin = self.baseline.infer(path);
        if builtin.is_confident() {
            return Ok(builtin);
        }

        match &path.node().kind {
            ExprKind::Member {
                computed, optional, ..
            } => self.evaluate_member(path, *computed, *optional),
            ExprKind::Null => Ok(EvalResult::confident(Value::Null)),
            ExprKind::Bool(b) => Ok(EvalResult::confident(Value::Bool(*b))),
            ExprKind::Number(n) => Ok(EvalResult::confident(Value::Number(*n))),
            ExprKind::String(s) => Ok(EvalResult::confident(Value::from(s.as_str()))),
            ExprKind::Object(_) => self.evaluate_object(path),
            ExprKind::Array(_) => self.evaluate_array(path),
            ExprKind::Assign {
                op: AssignOp::Assign,
                target,
                ..
            } => match target.as_ident() {
                Some(name) => self.evaluate_assignment(path, name),
                None => Ok(EvalResult::Unknown),
            },
            ExprKind::Call { .. } => self.evaluate_call(path),
            ExprKind::Binary { op, .. } => match lookup_binary(op.as_str()) {
                Some(apply) => self.evaluate_binary(path, apply),
                None => Ok(EvalResult::Unknown),
            },
            ExprKind::Logical { op, .. } => match lookup_binary(op.as_str()) {
                Some(apply) => self.evaluate_binary(path, apply),
                None => Ok(EvalResult::Unknown),
            },
            ExprKind::Conditional { .. } => self.evaluate_conditional(path),
            ExprKind::Unary { op, .. } => match lookup_unary(op.as_str()) {
                Some(apply) => self.evaluate_unary(path, apply),
                None => Ok(EvalResult::Unknown),
            },
            ExprKind::Ident(name) => Ok(self
                .locals
                .get(name)
                .map(EvalResult::Confident)
                .unwrap_or(EvalResult::Unknown)),
            _ => Ok(EvalResult::Unknown),
        }
    }

    /// Evaluate a property name: generic evaluation first, then the bare
    /// identifier's own name.
    fn evaluate_key(&mut self, path: &NodePath<'_>) -> Result<EvalResult, EvalError> {
        let result = self.evaluate(path)?;
        if result.is_confident() {
            return Ok(result);
        }
        Ok(match path.ident_name() {
            Some(name) => EvalResult::confident(Value::from(name)),
            None => EvalResult::Unknown,
        })
    }

    fn evaluate_member(
        &mut self,
        path: &NodePath<'_>,
        computed: bool,
        optional: bool,
    ) -> Result<EvalResult, EvalError> {
        let property_path = path.child(Slot::Property)?;
        let property = if computed {
            self.evaluate(&property_path)?
        } else {
            self.evaluate_key(&property_path)?
        };
        let EvalResult::Confident(property) = property else {
            return Ok(EvalResult::Unknown);
        };
        let EvalResult::Confident(object) = self.evaluate(&path.child(Slot::Object)?)? else {
            return Ok(EvalResult::Unknown);
        };
        Ok(EvalResult::lazy(move || {
            let object = object.get()?;
            if optional && object.is_nullish() {
                return Ok(object);
            }
            object.get_property(&property.get()?)
        }))
    }

    fn evaluate_object(&mut self, path: &NodePath<'_>) -> Result<EvalResult, EvalError> {
        let members = path.list(Slot::Properties)?;
        let mut entries = Vec::with_capacity(members.len());
        for member in members.into_iter().flatten() {
            let computed = match &member.node().kind {
                ExprKind::Property { computed, .. } => *computed,
                _ => return Ok(EvalResult::Unknown),
            };
            let key_path = member.child(Slot::Key)?;
            let key = if computed {
                self.evaluate(&key_path)?
            } else {
                self.evaluate_key(&key_path)?
            };
            let value = self.evaluate(&member.child(Slot::Value)?)?;
            entries.push((key, value));
        }

        let mut confident = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match (key, value) {
                (EvalResult::Confident(key), EvalResult::Confident(value)) => {
                    confident.push((key, value))
                }
                _ => return Ok(EvalResult::Unknown),
            }
        }
        Ok(EvalResult::lazy(move || {
            let mut object = Vec::with_capacity(confident.len());
            for (key, value) in &confident {
                object.push((key.get()?.to_property_key(), value.get()?));
            }
            Ok(Value::object(object))
        }))
    }

    fn evaluate_array(&mut self, path: &NodePath<'_>) -> Result<EvalResult, EvalError> {
        let elements = path.list(Slot::Elements)?;
        let mut results = Vec::with_capacity(elements.len());
        for element in elements {
            results.push(match element {
                Some(element) => self.evaluate(&element)?,
                None => EvalResult::Unknown,
            });
        }

        let mut confident = Vec::with_capacity(results.len());
        for result in results {
            match result {
                EvalResult::Confident(element) => confident.push(element),
                EvalResult::Unknown => return Ok(EvalResult::Unknown),
            }
        }
        Ok(EvalResult::lazy(move || {
            let items = confident
                .iter()
                .map(Confident::get)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(items))
        }))
    }

    fn evaluate_assignment(
        &mut self,
        path: &NodePath<'_>,
        name: &str,
    ) -> Result<EvalResult, EvalError> {
        let value = self.evaluate(&path.child(Slot::Right)?)?;
        if let EvalResult::Confident(confident) = &value {
            tracing::trace!(%name, "local assigned");
            self.locals.define(name, confident.clone());
        }
        Ok(value)
    }

    fn evaluate_call(&mut self, path: &NodePath<'_>) -> Result<EvalResult, EvalError> {
        let context = self.context.as_ref();
        let placeholder = hooks::runtime_placeholder(path, context)?;
        if placeholder.is_confident() {
            return Ok(placeholder);
        }
        hooks::macro_call(path, context)
    }

    fn evaluate_binary(
        &mut self,
        path: &NodePath<'_>,
        apply: BinaryFn,
    ) -> Result<EvalResult, EvalError> {
        let EvalResult::Confident(left) = self.evaluate(&path.child(Slot::Left)?)? else {
            return Ok(EvalResult::Unknown);
        };
        let EvalResult::Confident(right) = self.evaluate(&path.child(Slot::Right)?)? else {
            return Ok(EvalResult::Unknown);
        };
        Ok(EvalResult::lazy(move || Ok(apply(&left.get()?, &right.get()?))))
    }

    fn evaluate_conditional(&mut self, path: &NodePath<'_>) -> Result<EvalResult, EvalError> {
        let EvalResult::Confident(test) = self.evaluate(&path.child(Slot::Test)?)? else {
            return Ok(EvalResult::Unknown);
        };
        let branch = if test.get()?.is_truthy() {
            Slot::Consequent
        } else {
            Slot::Alternate
        };
        self.evaluate(&path.child(branch)?)
    }

    fn evaluate_unary(
        &mut self,
        path: &NodePath<'_>,
        apply: UnaryFn,
    ) -> Result<EvalResult, EvalError> {
        let EvalResult::Confident(operand) = self.evaluate(&path.child(Slot::Argument)?)? else {
            return Ok(EvalResult::Unknown);
        };
        Ok(EvalResult::lazy(move || Ok(apply(&operand.get()?))))
    }
}
