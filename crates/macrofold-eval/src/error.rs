//! Evaluation errors.
//! 求值错误。

use macrofold_macros::MacroError;
use macrofold_traverse::PathError;
use thiserror::Error;

/// Faults raised while evaluating or while reading a confident value.
///
/// These are not "don't know" answers; those are
/// [`EvalResult::Unknown`](crate::EvalResult::Unknown). An error here means
/// the tree was malformed, a macro was called wrongly, or a value was read
/// that must not be read at compile time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Structure(#[from] PathError),

    #[error("the value returned by `{name}()` only exists at run time and cannot be read during the build")]
    DeferredRuntimeValue { name: String },

    #[error("cannot read property `{key}` of {object}")]
    PropertyOfNullish { key: String, object: &'static str },

    /// The key names a prototype member (a method such as `map` or
    /// `toString`), which has no plain-data value.
    #[error("`{key}` is inherited from {prototype} and has no compile-time value")]
    InheritedProperty {
        key: String,
        prototype: &'static str,
    },

    /// A string index landed on half of a surrogate pair.
    #[error("index {index} splits a surrogate pair")]
    LoneSurrogate { index: usize },

    #[error(transparent)]
    Macro(#[from] MacroError),
}
