//! Macro configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A package the build knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    /// Absolute directory of the package.
    pub root: String,
}

/// Everything the stock macro handlers consult.
///
/// Deserializes from camelCase JSON:
///
/// ```json
/// {
///   "appPackageRoot": "/app",
///   "isDevelopingPackageRoots": ["/app"],
///   "packages": [{ "name": "app", "version": "1.0.0", "root": "/app" }],
///   "modules": ["ember-source"],
///   "userConfigs": { "/app": { "flavor": "vanilla" } },
///   "globalConfig": { "@embroider/macros": { "isTesting": false } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MacrosOptions {
    /// Root of the application package, if the build has one.
    pub app_package_root: Option<String>,
    /// Package roots currently under development.
    pub is_developing_package_roots: Vec<String>,
    /// Known packages, used by `dependencySatisfies` and owner lookup.
    pub packages: Vec<PackageInfo>,
    /// Module specifiers that resolve, used by `moduleExists`.
    pub modules: Vec<String>,
    /// Per-package user config, keyed by package root.
    pub user_configs: BTreeMap<String, JsonValue>,
    /// Global config shared by every package.
    pub global_config: Map<String, JsonValue>,
}

impl MacrosOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: MacrosOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading macro options");
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for package in &self.packages {
            if package.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "package at `{}` has no name",
                    package.root
                )));
            }
        }
        Ok(())
    }

    /// Set the application package root.
    pub fn app_package_root(mut self, root: impl Into<String>) -> Self {
        self.app_package_root = Some(root.into());
        self
    }

    /// Mark a package root as under development.
    pub fn developing(mut self, root: impl Into<String>) -> Self {
        self.is_developing_package_roots.push(root.into());
        self
    }

    /// Register a package.
    pub fn package(
        mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        root: impl Into<String>,
    ) -> Self {
        self.packages.push(PackageInfo {
            name: name.into(),
            version: version.into(),
            root: root.into(),
        });
        self
    }

    /// Register a resolvable module specifier.
    pub fn module(mut self, specifier: impl Into<String>) -> Self {
        self.modules.push(specifier.into());
        self
    }

    /// Set the user config of the package rooted at `root`.
    pub fn user_config(mut self, root: impl Into<String>, config: JsonValue) -> Self {
        self.user_configs.insert(root.into(), config);
        self
    }

    /// Set one key of the global config.
    pub fn global_config(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.global_config.insert(key.into(), value);
        self
    }

    /// Look up a package by name.
    pub fn find_package(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.iter().find(|package| package.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_options() {
        let options = MacrosOptions::default();
        assert!(options.app_package_root.is_none());
        assert!(options.packages.is_empty());
        assert!(options.global_config.is_empty());
    }

    #[test]
    fn test_builder() {
        let options = MacrosOptions::new()
            .app_package_root("/app")
            .developing("/app")
            .package("lodash", "4.17.21", "/app/node_modules/lodash")
            .user_config("/app", json!({ "flavor": "vanilla" }))
            .global_config("@embroider/macros", json!({ "isTesting": true }));
        assert_eq!(options.app_package_root.as_deref(), Some("/app"));
        assert_eq!(options.find_package("lodash").unwrap().version, "4.17.21");
        assert!(options.find_package("react").is_none());
        assert_eq!(options.user_configs["/app"]["flavor"], "vanilla");
    }

    #[test]
    fn test_from_json_camel_case() {
        let options = MacrosOptions::from_json_str(
            r#"{
                "appPackageRoot": "/app",
                "isDevelopingPackageRoots": ["/app"],
                "packages": [{ "name": "app", "version": "1.0.0", "root": "/app" }],
                "modules": ["ember-source"]
            }"#,
        )
        .unwrap();
        assert_eq!(options.is_developing_package_roots, vec!["/app".to_string()]);
        assert_eq!(options.modules, vec!["ember-source".to_string()]);
        assert!(options.user_configs.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            MacrosOptions::from_json_str("{ nope"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            MacrosOptions::from_json_str(r#"{ "packages": [{ "name": "", "version": "1.0.0", "root": "/x" }] }"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
