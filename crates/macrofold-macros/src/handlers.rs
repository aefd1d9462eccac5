//! Macro handlers.

use crate::{MacrosState, semver};
use macrofold_syntax::ExprKind;
use macrofold_traverse::{NodePath, PathError, Slot};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// The module the macros are imported from.
pub const MACROS_MODULE: &str = "@embroider/macros";

/// Errors raised by a macro handler for a malformed call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("{macro_name} takes {expected} argument(s), found {found}")]
    ArgumentCount {
        macro_name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of {macro_name} must be a string literal")]
    NotStringLiteral {
        macro_name: &'static str,
        index: usize,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Which config a `getConfig`-family call reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    /// `getConfig(packageName)`
    Package,
    /// `getOwnConfig()`
    Own,
    /// `getGlobalConfig()`
    Global,
}

impl ConfigMode {
    pub fn macro_name(self) -> &'static str {
        match self {
            ConfigMode::Package => "getConfig",
            ConfigMode::Own => "getOwnConfig",
            ConfigMode::Global => "getGlobalConfig",
        }
    }
}

/// Decides the compile-time value of each macro call.
///
/// Handlers receive the call expression and the file's state and return
/// a JSON-compatible value. `get_config` returns `None` for `undefined`.
pub trait MacroHandlers {
    fn dependency_satisfies(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError>;

    fn module_exists(&self, call: &NodePath<'_>, state: &MacrosState)
    -> Result<JsonValue, MacroError>;

    fn get_config(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
        mode: ConfigMode,
    ) -> Result<Option<JsonValue>, MacroError>;

    fn is_developing_app(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError>;

    fn is_developing_this_package(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError>;

    fn is_testing(&self, call: &NodePath<'_>, state: &MacrosState)
    -> Result<JsonValue, MacroError>;
}

/// The stock handlers, answering from [`MacrosOptions`](crate::MacrosOptions).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigHandlers;

impl MacroHandlers for ConfigHandlers {
    fn dependency_satisfies(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError> {
        let args = string_args(call, "dependencySatisfies", 2)?;
        let (name, range) = (&args[0], &args[1]);
        let satisfied = state
            .options
            .find_package(name)
            .is_some_and(|package| semver::satisfies(&package.version, range));
        tracing::trace!(%name, %range, satisfied, "dependencySatisfies");
        Ok(JsonValue::Bool(satisfied))
    }

    fn module_exists(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError> {
        let args = string_args(call, "moduleExists", 1)?;
        let exists = state.options.modules.iter().any(|module| *module == args[0]);
        Ok(JsonValue::Bool(exists))
    }

    fn get_config(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
        mode: ConfigMode,
    ) -> Result<Option<JsonValue>, MacroError> {
        let options = &state.options;
        let root = match mode {
            ConfigMode::Package => {
                let args = string_args(call, mode.macro_name(), 1)?;
                options.find_package(&args[0]).map(|package| package.root.as_str())
            }
            ConfigMode::Own => {
                string_args(call, mode.macro_name(), 0)?;
                state.owning_package().map(|package| package.root.as_str())
            }
            ConfigMode::Global => {
                string_args(call, mode.macro_name(), 0)?;
                return Ok(Some(JsonValue::Object(options.global_config.clone())));
            }
        };
        Ok(root.and_then(|root| options.user_configs.get(root).cloned()))
    }

    fn is_developing_app(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError> {
        string_args(call, "isDevelopingApp", 0)?;
        let developing = state
            .options
            .app_package_root
            .as_deref()
            .is_some_and(|root| state.is_developing(root));
        Ok(JsonValue::Bool(developing))
    }

    fn is_developing_this_package(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError> {
        string_args(call, "isDevelopingThisPackage", 0)?;
        let developing = state
            .owning_package()
            .is_some_and(|package| state.is_developing(&package.root));
        Ok(JsonValue::Bool(developing))
    }

    fn is_testing(
        &self,
        call: &NodePath<'_>,
        state: &MacrosState,
    ) -> Result<JsonValue, MacroError> {
        string_args(call, "isTesting", 0)?;
        let testing = state
            .options
            .global_config
            .get(MACROS_MODULE)
            .and_then(|config| config.get("isTesting"))
            .is_some_and(json_truthy);
        Ok(JsonValue::Bool(testing))
    }
}

/// Collect exactly `expected` string literal arguments.
fn string_args(
    call: &NodePath<'_>,
    macro_name: &'static str,
    expected: usize,
) -> Result<Vec<String>, MacroError> {
    let args = call.list(Slot::Arguments)?;
    if args.len() != expected {
        return Err(MacroError::ArgumentCount {
            macro_name,
            expected,
            found: args.len(),
        });
    }
    args.iter()
        .enumerate()
        .map(|(index, arg)| match arg.map(|arg| &arg.node().kind) {
            Some(ExprKind::String(value)) => Ok(value.clone()),
            _ => Err(MacroError::NotStringLiteral { macro_name, index }),
        })
        .collect()
}

/// JavaScript truthiness of a JSON value.
fn json_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}
