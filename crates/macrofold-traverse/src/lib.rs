//! Semantic analysis and node navigation for macrofold.
//! macrofold 的语义分析与节点导航。
//!
//! [`Semantics::analyze`] walks a parsed module once, recording parent
//! links, an id index and lexical scopes. [`NodePath`] is the handle the
//! evaluator works with: it navigates named slots, climbs to parents and
//! answers binding questions such as "is this the `getConfig` import from
//! `@embroider/macros`".

mod error;
mod path;
mod scope;

pub use error::PathError;
pub use path::{Child, NodeKind, NodePath, Slot};
pub use scope::{Binding, BindingKind, ScopeId, Semantics};
