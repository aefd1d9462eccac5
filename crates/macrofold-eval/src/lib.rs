//! Confidence-tracking partial evaluation.
//! 置信度跟踪的部分求值。
//!
//! [`Evaluator`] folds the statically known parts of an expression tree.
//! Every answer is either [`EvalResult::Confident`] or
//! [`EvalResult::Unknown`]; a wrong confident answer would become wrong
//! code, so confidence is only claimed when every input is confident.

mod baseline;
mod env;
mod error;
mod evaluator;
mod hooks;
pub mod literal;
pub mod ops;
mod result;
pub mod value;

pub use baseline::{Baseline, ConstantBaseline, NoBaseline};
pub use env::Environment;
pub use error::EvalError;
pub use evaluator::Evaluator;
pub use hooks::MacroContext;
pub use literal::{EncodeError, build_literal, build_literal_from, build_literal_with_ids};
pub use result::{Confident, EvalResult};
pub use value::Value;
