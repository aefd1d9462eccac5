//! Call hooks.
//! 调用钩子。
//!
//! Calls are never evaluated generically. They become confident only
//! through the runtime-config placeholder or a recognized macro.

use crate::{EvalError, EvalResult, Value};
use macrofold_macros::{ConfigMode, MACROS_MODULE, MacroHandlers, MacrosState, RuntimeImport};
use macrofold_traverse::{NodePath, Slot};

/// What the evaluator needs to see macros: the file's state and the
/// handlers that answer macro calls.
#[derive(Clone, Copy)]
pub struct MacroContext<'a> {
    pub state: &'a MacrosState,
    pub handlers: &'a dyn MacroHandlers,
}

impl<'a> MacroContext<'a> {
    pub fn new(state: &'a MacrosState, handlers: &'a dyn MacroHandlers) -> Self {
        Self { state, handlers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MacroKind {
    DependencySatisfies,
    ModuleExists,
    Config(ConfigMode),
    IsDevelopingApp,
    IsDevelopingThisPackage,
    IsTesting,
}

/// Macro exports recognized at call sites, by exported name.
const MACROS: &[(&str, MacroKind)] = &[
    ("dependencySatisfies", MacroKind::DependencySatisfies),
    ("moduleExists", MacroKind::ModuleExists),
    ("getConfig", MacroKind::Config(ConfigMode::Package)),
    ("getOwnConfig", MacroKind::Config(ConfigMode::Own)),
    ("getGlobalConfig", MacroKind::Config(ConfigMode::Global)),
    ("isDevelopingApp", MacroKind::IsDevelopingApp),
    ("isDevelopingThisPackage", MacroKind::IsDevelopingThisPackage),
    ("isTesting", MacroKind::IsTesting),
];

/// A call to a local name registered as a runtime config accessor.
///
/// The result is confident so enclosing expressions keep folding, but
/// reading it fails: the real value only exists at run time.
pub fn runtime_placeholder(
    call: &NodePath<'_>,
    context: Option<&MacroContext<'_>>,
) -> Result<EvalResult, EvalError> {
    let Some(context) = context else {
        return Ok(EvalResult::Unknown);
    };
    let callee = call.child(Slot::Callee)?;
    let Some(name) = callee.ident_name() else {
        return Ok(EvalResult::Unknown);
    };
    if context.state.runtime_import(name) != Some(RuntimeImport::Config) {
        return Ok(EvalResult::Unknown);
    }
    tracing::trace!(%name, "runtime config placeholder");
    let name = name.to_string();
    Ok(EvalResult::lazy(move || {
        Err(EvalError::DeferredRuntimeValue { name })
    }))
}

/// A call whose callee is exactly one of the macro exports.
pub fn macro_call(
    call: &NodePath<'_>,
    context: Option<&MacroContext<'_>>,
) -> Result<EvalResult, EvalError> {
    let Some(context) = context else {
        return Ok(EvalResult::Unknown);
    };
    let callee = call.child(Slot::Callee)?;
    let Some((export, kind)) = MACROS
        .iter()
        .find(|(export, _)| callee.references_import(MACROS_MODULE, export))
    else {
        return Ok(EvalResult::Unknown);
    };

    let (state, handlers) = (context.state, context.handlers);
    let json = match kind {
        MacroKind::DependencySatisfies => Some(handlers.dependency_satisfies(call, state)?),
        MacroKind::ModuleExists => Some(handlers.module_exists(call, state)?),
        MacroKind::Config(mode) => handlers.get_config(call, state, *mode)?,
        MacroKind::IsDevelopingApp => Some(handlers.is_developing_app(call, state)?),
        MacroKind::IsDevelopingThisPackage => {
            Some(handlers.is_developing_this_package(call, state)?)
        }
        MacroKind::IsTesting => Some(handlers.is_testing(call, state)?),
    };
    tracing::debug!(macro_name = %export, value = ?json, "macro call folded");
    let value = json.as_ref().map(Value::from).unwrap_or(Value::Undefined);
    Ok(EvalResult::confident(value))
}
