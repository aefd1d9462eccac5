//! Evaluation results.
//! 求值结果。

use crate::{EvalError, Value};
use std::cell::LazyCell;
use std::fmt;
use std::rc::Rc;

type Thunk = Box<dyn FnOnce() -> Result<Value, EvalError>>;

/// A value the evaluator is sure of, computed on first read.
///
/// Clones share one cell, so a value is computed at most once and a read
/// that faults reports the same fault every time.
#[derive(Clone)]
pub struct Confident(Rc<LazyCell<Result<Value, EvalError>, Thunk>>);

impl Confident {
    /// An already-known value.
    pub fn new(value: Value) -> Self {
        Self::lazy(move || Ok(value))
    }

    /// A value computed on first read.
    pub fn lazy(compute: impl FnOnce() -> Result<Value, EvalError> + 'static) -> Self {
        let thunk: Thunk = Box::new(compute);
        Confident(Rc::new(LazyCell::new(thunk)))
    }

    /// Read the value, computing it if needed.
    pub fn get(&self) -> Result<Value, EvalError> {
        LazyCell::force(&self.0).clone()
    }

    /// Whether both handles share one cell.
    pub fn ptr_eq(&self, other: &Confident) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Confident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Confident(..)")
    }
}

/// What the evaluator knows about an expression.
/// 对表达式的求值结论。
#[derive(Debug, Clone)]
pub enum EvalResult {
    /// The value is known at compile time.
    Confident(Confident),
    /// The value cannot be determined at compile time.
    Unknown,
}

impl EvalResult {
    pub fn confident(value: Value) -> Self {
        EvalResult::Confident(Confident::new(value))
    }

    pub fn lazy(compute: impl FnOnce() -> Result<Value, EvalError> + 'static) -> Self {
        EvalResult::Confident(Confident::lazy(compute))
    }

    pub fn is_confident(&self) -> bool {
        matches!(self, EvalResult::Confident(_))
    }

    pub fn as_confident(&self) -> Option<&Confident> {
        match self {
            EvalResult::Confident(confident) => Some(confident),
            EvalResult::Unknown => None,
        }
    }

    /// Read the value. `None` means the result is unknown.
    pub fn value(&self) -> Option<Result<Value, EvalError>> {
        self.as_confident().map(Confident::get)
    }

    /// Whether two results are the same result, not merely equal ones.
    pub fn ptr_eq(&self, other: &EvalResult) -> bool {
        match (self, other) {
            (EvalResult::Confident(a), EvalResult::Confident(b)) => a.ptr_eq(b),
            (EvalResult::Unknown, EvalResult::Unknown) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_lazy_value_is_computed_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let result = EvalResult::lazy(move || {
            counter.set(counter.get() + 1);
            Ok(Value::Number(1.0))
        });
        let copy = result.clone();
        assert_eq!(calls.get(), 0);
        assert_eq!(result.value(), Some(Ok(Value::Number(1.0))));
        assert_eq!(copy.value(), Some(Ok(Value::Number(1.0))));
        assert_eq!(calls.get(), 1);
        assert!(result.ptr_eq(&copy));
    }

    #[test]
    fn test_faults_repeat() {
        let result = EvalResult::lazy(|| {
            Err(EvalError::DeferredRuntimeValue {
                name: "getConfig".into(),
            })
        });
        assert!(result.is_confident());
        assert!(matches!(result.value(), Some(Err(EvalError::DeferredRuntimeValue { .. }))));
        assert!(matches!(result.value(), Some(Err(EvalError::DeferredRuntimeValue { .. }))));
    }

    #[test]
    fn test_unknown() {
        let result = EvalResult::Unknown;
        assert!(!result.is_confident());
        assert!(result.value().is_none());
        assert!(!result.ptr_eq(&EvalResult::confident(Value::Null)));
        assert!(!EvalResult::confident(Value::Null).ptr_eq(&EvalResult::confident(Value::Null)));
    }
}
