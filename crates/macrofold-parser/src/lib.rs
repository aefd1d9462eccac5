//! Parser for macrofold.
//!
//! This crate provides a recursive descent parser that converts
//! JavaScript tokens into the module and expression tree of
//! `macrofold-syntax`.
//!
//! ## Error Recovery
//!
//! The parser implements error recovery to continue parsing after
//! encountering errors, allowing multiple errors to be reported
//! in a single parse pass. Unparseable expressions are left behind as
//! [`ExprKind::Invalid`](macrofold_syntax::ExprKind::Invalid) nodes.

mod parser;
mod recovery;

pub use parser::Parser;
pub use recovery::{DelimiterKind, RecoveryMode};

use macrofold_common::NodeIdGen;
use macrofold_diagnostic::Diagnostic;
use macrofold_lexer::Lexer;
use macrofold_syntax::{Expr, Module};

/// Parse source code into a module.
pub fn parse(source: &str) -> (Module, Vec<Diagnostic>) {
    let lexer = Lexer::new(source);
    let (tokens, mut diagnostics) = lexer.tokenize();

    let mut parser = Parser::new(tokens);
    let module = parser.parse_module();

    diagnostics.extend(parser.diagnostics());
    (module, diagnostics)
}

/// Parse source code that holds exactly one expression.
pub fn parse_expression(source: &str) -> (Expr, Vec<Diagnostic>) {
    let (expr, _, diagnostics) = parse_expression_with_ids(source, NodeIdGen::new());
    (expr, diagnostics)
}

/// Like [`parse_expression`], numbering nodes from `ids` and handing the
/// generator back for the next fragment.
pub fn parse_expression_with_ids(
    source: &str,
    ids: NodeIdGen,
) -> (Expr, NodeIdGen, Vec<Diagnostic>) {
    let lexer = Lexer::new(source);
    let (tokens, mut diagnostics) = lexer.tokenize();

    let mut parser = Parser::with_ids(tokens, ids);
    let expr = parser.parse_standalone_expr();

    let (ids, parse_diagnostics) = parser.finish();
    diagnostics.extend(parse_diagnostics);
    (expr, ids, diagnostics)
}
