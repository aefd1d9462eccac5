//! Macro extension context for macrofold.
//!
//! This crate provides:
//! - `MacrosOptions` - the build-wide facts macros answer from (packages,
//!   modules, user and global config), loadable from JSON
//! - `MacrosState` - per-file state: options, the file's path and the
//!   runtime-import registry
//! - `MacroHandlers` - the seven handlers behind `@embroider/macros`, with
//!   `ConfigHandlers` as the stock implementation
//! - `semver` - the npm range matcher behind `dependencySatisfies`

mod handlers;
mod options;
pub mod semver;
mod state;

pub use handlers::{ConfigHandlers, ConfigMode, MACROS_MODULE, MacroError, MacroHandlers};
pub use options::{ConfigError, MacrosOptions, PackageInfo};
pub use state::{MacrosState, RuntimeImport};
