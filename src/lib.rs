//! macrofold - compile-time partial evaluation for macro expansion.
//! macrofold - 面向宏展开的编译期部分求值。
//!
//! The pipeline is the usual one: [`lexer`] → [`parser`] → [`traverse`]
//! (scopes and node paths) → [`eval`] (the confidence-tracking evaluator),
//! with [`macros`] supplying the build-time knowledge macro calls fold to.
//!
//! ```
//! use macrofold::evaluate_source;
//!
//! let value = evaluate_source("[1, 2].length + 1", None).unwrap();
//! assert_eq!(value, Some(macrofold::Value::Number(3.0)));
//! ```

use std::rc::Rc;

pub use macrofold_common as common;
pub use macrofold_diagnostic as diagnostic;
pub use macrofold_eval as eval;
pub use macrofold_lexer as lexer;
pub use macrofold_macros as macros;
pub use macrofold_parser as parser;
pub use macrofold_syntax as syntax;
pub use macrofold_traverse as traverse;

pub use macrofold_eval::{
    ConstantBaseline, EncodeError, EvalError, EvalResult, Evaluator, MacroContext, Value,
};
pub use macrofold_macros::{ConfigHandlers, MacrosOptions, MacrosState};

use macrofold_syntax::Expr;
use macrofold_traverse::Semantics;
use thiserror::Error;

/// Errors from the convenience entry points.
#[derive(Debug, Error)]
pub enum Error {
    /// The source did not parse; holds the rendered diagnostics.
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

const SOURCE_NAME: &str = "<input>";

/// Evaluate `source` and return the value of its last expression
/// statement, or `None` if that value is not known at compile time.
///
/// Every expression statement is evaluated in order, so assignments made
/// by earlier ones are visible to later ones. Macro calls fold only when
/// `state` is given.
pub fn evaluate_source(source: &str, state: Option<&MacrosState>) -> Result<Option<Value>, Error> {
    with_last_result(source, state, |result| match result.value() {
        Some(value) => Ok(Some(value?)),
        None => Ok(None),
    })
}

/// Like [`evaluate_source`], but re-encodes a known value as the literal
/// expression that would replace the source.
pub fn fold_source(source: &str, state: Option<&MacrosState>) -> Result<Option<Expr>, Error> {
    with_last_result(source, state, |result| match result.as_confident() {
        Some(confident) => Ok(Some(eval::build_literal_from(confident)?)),
        None => Ok(None),
    })
}

fn with_last_result<T>(
    source: &str,
    state: Option<&MacrosState>,
    finish: impl FnOnce(&EvalResult) -> Result<Option<T>, Error>,
) -> Result<Option<T>, Error> {
    let (module, diagnostics) = parser::parse(source);
    if diagnostics.iter().any(|diagnostic| diagnostic.is_error()) {
        return Err(Error::Parse(diagnostic::render_all(
            source,
            SOURCE_NAME,
            &diagnostics,
        )));
    }

    let sema = Semantics::analyze(&module);
    let handlers = ConfigHandlers;
    let mut evaluator = Evaluator::new().with_baseline(Rc::new(ConstantBaseline));
    if let Some(state) = state {
        evaluator = evaluator.with_context(MacroContext::new(state, &handlers));
    }

    let mut last = None;
    for path in sema.expr_stmt_paths() {
        last = Some(evaluator.evaluate(&path)?);
    }
    tracing::debug!(
        statements = sema.expr_stmt_paths().len(),
        cached = evaluator.cache_len(),
        "source evaluated"
    );
    match last {
        Some(result) => finish(&result),
        None => Ok(None),
    }
}
