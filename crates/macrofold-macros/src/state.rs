//! Per-file macro state.

use crate::{MacrosOptions, PackageInfo};
use std::collections::HashMap;

/// Why a local name was registered as a runtime import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeImport {
    /// A config accessor whose value only exists at run time. Calls to it
    /// evaluate to a placeholder that must never be read.
    Config,
    /// The runtime `isTesting` helper.
    Testing,
}

/// State threaded through macro expansion of one file.
#[derive(Debug, Clone)]
pub struct MacrosState {
    pub options: MacrosOptions,
    /// The file being transformed.
    pub filename: String,
    /// Local names the expansion has decided to import at run time.
    pub needed_runtime_imports: HashMap<String, RuntimeImport>,
}

impl MacrosState {
    pub fn new(options: MacrosOptions, filename: impl Into<String>) -> Self {
        Self {
            options,
            filename: filename.into(),
            needed_runtime_imports: HashMap::new(),
        }
    }

    /// Register `name` as a runtime import.
    pub fn with_runtime_import(mut self, name: impl Into<String>, kind: RuntimeImport) -> Self {
        self.needed_runtime_imports.insert(name.into(), kind);
        self
    }

    pub fn runtime_import(&self, name: &str) -> Option<RuntimeImport> {
        self.needed_runtime_imports.get(name).copied()
    }

    /// The known package containing the file, by longest root prefix.
    pub fn owning_package(&self) -> Option<&PackageInfo> {
        self.options
            .packages
            .iter()
            .filter(|package| is_within(&self.filename, &package.root))
            .max_by_key(|package| package.root.trim_end_matches('/').len())
    }

    /// Whether the package rooted at `root` is under development.
    pub fn is_developing(&self, root: &str) -> bool {
        let root = root.trim_end_matches('/');
        self.options
            .is_developing_package_roots
            .iter()
            .any(|candidate| candidate.trim_end_matches('/') == root)
    }
}

/// Whether `path` is `root` or lies below it.
fn is_within(path: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> MacrosOptions {
        MacrosOptions::new()
            .package("app", "1.0.0", "/work/app")
            .package("addon", "2.0.0", "/work/app/node_modules/addon/")
            .package("app-two", "1.0.0", "/work/app-two")
    }

    #[test]
    fn test_owning_package_prefers_longest_root() {
        let state = MacrosState::new(options(), "/work/app/node_modules/addon/index.js");
        assert_eq!(state.owning_package().unwrap().name, "addon");

        let state = MacrosState::new(options(), "/work/app/src/main.js");
        assert_eq!(state.owning_package().unwrap().name, "app");
    }

    #[test]
    fn test_owning_package_respects_path_boundaries() {
        let state = MacrosState::new(options(), "/work/app-two/index.js");
        assert_eq!(state.owning_package().unwrap().name, "app-two");

        let state = MacrosState::new(options(), "/elsewhere/index.js");
        assert!(state.owning_package().is_none());
    }

    #[test]
    fn test_runtime_imports() {
        let state = MacrosState::new(MacrosOptions::new(), "/a.js")
            .with_runtime_import("getConfig", RuntimeImport::Config)
            .with_runtime_import("isTesting", RuntimeImport::Testing);
        assert_eq!(state.runtime_import("getConfig"), Some(RuntimeImport::Config));
        assert_eq!(state.runtime_import("isTesting"), Some(RuntimeImport::Testing));
        assert_eq!(state.runtime_import("other"), None);
    }

    #[test]
    fn test_is_developing_ignores_trailing_slash() {
        let state = MacrosState::new(MacrosOptions::new().developing("/work/app/"), "/a.js");
        assert!(state.is_developing("/work/app"));
        assert!(!state.is_developing("/work/addon"));
    }
}
