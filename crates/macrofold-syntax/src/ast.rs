//! Module-level AST definitions.
//! 模块级 AST 定义。

use crate::Expr;
use macrofold_common::Span;

/// A parsed source file (or a synthesized fragment wrapped as one).
/// 解析后的源文件（或包装成模块的合成片段）。
#[derive(Debug, Clone)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Module {
    /// Wrap a lone expression as a single expression statement.
    pub fn from_expr(expr: Expr) -> Self {
        let span = expr.span;
        Module {
            body: vec![Stmt {
                kind: StmtKind::Expr(expr),
                span,
            }],
            span,
        }
    }

    /// Import declarations, in source order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::Import(import) => Some(import),
            _ => None,
        })
    }

    /// The expression of the last top-level expression statement.
    pub fn tail_expr(&self) -> Option<&Expr> {
        self.body.iter().rev().find_map(|stmt| match &stmt.kind {
            StmtKind::Expr(expr) => Some(expr),
            _ => None,
        })
    }
}

/// A statement.
/// 语句。
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement kind.
/// 语句类型。
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `import a, { b as c } from "m";` / 导入声明
    Import(ImportDecl),
    /// `const x = 1, y;` / 变量声明
    VarDecl(VarDecl),
    /// `{ ... }` / 块语句
    Block(Vec<Stmt>),
    /// `expr;` / 表达式语句
    Expr(Expr),
    /// `;` / 空语句
    Empty,
}

/// A name with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// An import declaration.
/// 导入声明。
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    /// The module specifier string.
    pub source: String,
}

/// One binding introduced by an import declaration.
#[derive(Debug, Clone)]
pub struct ImportSpecifier {
    /// The local binding name.
    pub local: Ident,
    pub imported: ImportName,
    pub span: Span,
}

/// What an import specifier pulls out of the source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// `import { x } from "m"` or `import { x as y } from "m"`
    Named(String),
    /// `import x from "m"`
    Default,
    /// `import * as ns from "m"`
    Namespace,
}

impl ImportName {
    /// Whether this specifier imports the export called `export`.
    ///
    /// `"default"` matches default imports and `"*"` matches namespaces.
    pub fn matches(&self, export: &str) -> bool {
        match self {
            ImportName::Named(name) => name == export,
            ImportName::Default => export == "default",
            ImportName::Namespace => export == "*",
        }
    }
}

/// A `const`/`let`/`var` declaration.
/// 变量声明。
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
}

/// Declaration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

/// `name = init` inside a declaration.
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_name_matching() {
        assert!(ImportName::Named("getConfig".into()).matches("getConfig"));
        assert!(!ImportName::Named("getConfig".into()).matches("getOwnConfig"));
        assert!(ImportName::Default.matches("default"));
        assert!(ImportName::Namespace.matches("*"));
        assert!(!ImportName::Namespace.matches("getConfig"));
    }
}
