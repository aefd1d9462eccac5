//! Scope analysis.
//! 作用域分析。

use crate::NodePath;
use macrofold_common::{NodeId, Span};
use macrofold_syntax::{Expr, ImportName, Module, Stmt, StmtKind, VarKind};
use std::collections::HashMap;

/// Index of a scope inside [`Semantics`].
/// 作用域在 [`Semantics`] 中的索引。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The module scope.
    /// 模块作用域。
    pub const MODULE: ScopeId = ScopeId(0);
}

/// A declared name.
/// 已声明的名称。
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Where the name is declared. / 声明位置。
    pub span: Span,
}

/// How a name was introduced.
/// 名称的引入方式。
#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// `import ... from "source"` / 导入绑定
    Import { source: String, imported: ImportName },
    /// `const`/`let`/`var`, with the initializer node if any / 变量绑定
    Var { kind: VarKind, init: Option<NodeId> },
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    bindings: HashMap<String, Binding>,
}

/// The result of analyzing one module.
/// 对单个模块的分析结果。
///
/// Holds parent links, a node index and the scope tree. Every expression
/// in the module is reachable by id through [`Semantics::path`].
pub struct Semantics<'a> {
    module: &'a Module,
    /// id -> node. / 节点索引。
    nodes: HashMap<NodeId, &'a Expr>,
    /// child id -> parent id. / 父节点链接。
    parents: HashMap<NodeId, NodeId>,
    /// Scope arena; index 0 is the module scope. / 作用域表。
    scopes: Vec<Scope>,
    /// The innermost scope enclosing each node. / 每个节点所在的最内层作用域。
    node_scopes: HashMap<NodeId, ScopeId>,
}

impl<'a> Semantics<'a> {
    /// Analyze a module.
    /// 分析模块。
    pub fn analyze(module: &'a Module) -> Self {
        let mut sema = Semantics {
            module,
            nodes: HashMap::new(),
            parents: HashMap::new(),
            scopes: vec![Scope {
                parent: None,
                bindings: HashMap::new(),
            }],
            node_scopes: HashMap::new(),
        };
        sema.walk_stmts(&module.body, ScopeId::MODULE);
        sema
    }

    pub fn module(&self) -> &'a Module {
        self.module
    }

    /// A handle for the node with this id.
    /// 根据 id 获取节点句柄。
    pub fn path(&'a self, id: NodeId) -> Option<NodePath<'a>> {
        self.nodes.get(&id).map(|node| NodePath::new(self, node))
    }

    /// A handle for the last top-level expression statement.
    /// 最后一个顶层表达式语句的句柄。
    pub fn tail_path(&'a self) -> Option<NodePath<'a>> {
        self.module
            .tail_expr()
            .map(|expr| NodePath::new(self, expr))
    }

    /// Handles for every top-level expression statement, in order.
    pub fn expr_stmt_paths(&'a self) -> Vec<NodePath<'a>> {
        self.module
            .body
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Expr(expr) => Some(NodePath::new(self, expr)),
                _ => None,
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&'a Expr> {
        self.nodes.get(&id).copied()
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// The innermost scope enclosing a node.
    pub fn scope_of(&self, id: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&id).copied()
    }

    /// Resolve `name` starting at `scope` and walking outward.
    /// 从 `scope` 开始向外查找 `name`。
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0 as usize];
            if let Some(binding) = scope.bindings.get(name) {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }

    // ========== Construction ==========

    fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            bindings: HashMap::new(),
        });
        id
    }

    fn declare(&mut self, scope: ScopeId, binding: Binding) {
        // later declarations win, matching sloppy-mode `var` redeclaration
        self.scopes[scope.0 as usize]
            .bindings
            .insert(binding.name.clone(), binding);
    }

    fn walk_stmts(&mut self, stmts: &'a [Stmt], scope: ScopeId) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Import(import) => {
                    for specifier in &import.specifiers {
                        self.declare(
                            ScopeId::MODULE,
                            Binding {
                                name: specifier.local.name.clone(),
                                kind: BindingKind::Import {
                                    source: import.source.clone(),
                                    imported: specifier.imported.clone(),
                                },
                                span: specifier.local.span,
                            },
                        );
                    }
                }
                StmtKind::VarDecl(decl) => {
                    // `var` is hoisted out of blocks
                    let target = match decl.kind {
                        VarKind::Var => ScopeId::MODULE,
                        VarKind::Const | VarKind::Let => scope,
                    };
                    for declarator in &decl.declarators {
                        self.declare(
                            target,
                            Binding {
                                name: declarator.name.name.clone(),
                                kind: BindingKind::Var {
                                    kind: decl.kind,
                                    init: declarator.init.as_ref().map(|init| init.id),
                                },
                                span: declarator.name.span,
                            },
                        );
                        if let Some(init) = &declarator.init {
                            self.walk_expr(init, None, scope);
                        }
                    }
                }
                StmtKind::Block(body) => {
                    let inner = self.push_scope(scope);
                    self.walk_stmts(body, inner);
                }
                StmtKind::Expr(expr) => self.walk_expr(expr, None, scope),
                StmtKind::Empty => {}
            }
        }
    }

    fn walk_expr(&mut self, expr: &'a Expr, parent: Option<NodeId>, scope: ScopeId) {
        self.nodes.insert(expr.id, expr);
        self.node_scopes.insert(expr.id, scope);
        if let Some(parent) = parent {
            self.parents.insert(expr.id, parent);
        }
        for child in expr.children() {
            self.walk_expr(child, Some(expr.id), scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofold_parser::parse;

    #[test]
    fn test_imports_bind_in_module_scope() {
        let (module, diags) = parse("import { getConfig as gc } from '@embroider/macros'; gc");
        assert!(diags.is_empty());
        let sema = Semantics::analyze(&module);
        let binding = sema.lookup(ScopeId::MODULE, "gc").unwrap();
        assert_eq!(
            binding.kind,
            BindingKind::Import {
                source: "@embroider/macros".into(),
                imported: ImportName::Named("getConfig".into()),
            }
        );
        assert!(sema.lookup(ScopeId::MODULE, "getConfig").is_none());
    }

    #[test]
    fn test_block_scopes_shadow() {
        let (module, _) = parse("const a = 1; { const a = 2; a; } a");
        let sema = Semantics::analyze(&module);
        let inner = match &module.body[1].kind {
            StmtKind::Block(body) => match &body[1].kind {
                StmtKind::Expr(expr) => expr.id,
                _ => panic!("expected expression"),
            },
            _ => panic!("expected block"),
        };
        let scope = sema.scope_of(inner).unwrap();
        assert_ne!(scope, ScopeId::MODULE);
        let inner_binding = sema.lookup(scope, "a").unwrap();
        let outer_binding = sema.lookup(ScopeId::MODULE, "a").unwrap();
        assert_ne!(inner_binding.span, outer_binding.span);
    }

    #[test]
    fn test_var_is_hoisted() {
        let (module, _) = parse("{ var v = 1; let l = 2; }");
        let sema = Semantics::analyze(&module);
        assert!(sema.lookup(ScopeId::MODULE, "v").is_some());
        assert!(sema.lookup(ScopeId::MODULE, "l").is_none());
    }

    #[test]
    fn test_every_node_indexed() {
        let (module, _) = parse("const x = [1, 2]; f(x.y, { z })");
        let sema = Semantics::analyze(&module);
        // 1, 2, array, f, x, y, member, z key, z value, property, object, call
        assert_eq!(sema.node_count(), 12);
        let tail = sema.tail_path().unwrap();
        assert_eq!(sema.path(tail.id()).unwrap(), tail);
    }
}
