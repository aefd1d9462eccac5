//! AST and syntax definitions for macrofold.
//!
//! This crate defines the JavaScript module/expression tree produced by the
//! parser and navigated by the traversal layer. Every expression node carries
//! a [`NodeId`](macrofold_common::NodeId) that identifies its occurrence.

mod ast;
mod expr;
mod ops;

pub use ast::*;
pub use expr::*;
pub use ops::*;
