//! Node handles.
//! 节点句柄。

use crate::{Binding, BindingKind, PathError, Semantics};
use macrofold_common::{NodeId, Span};
use macrofold_syntax::{Expr, ExprKind};
use std::fmt;

/// Closed tag for expression kinds.
/// 表达式类型标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    NullLiteral,
    BooleanLiteral,
    NumericLiteral,
    StringLiteral,
    Identifier,
    ArrayExpression,
    ObjectExpression,
    ObjectProperty,
    SpreadElement,
    MemberExpression,
    CallExpression,
    AssignmentExpression,
    BinaryExpression,
    LogicalExpression,
    UnaryExpression,
    ConditionalExpression,
    SequenceExpression,
    Invalid,
}

impl NodeKind {
    pub fn of(expr: &Expr) -> Self {
        match &expr.kind {
            ExprKind::Null => NodeKind::NullLiteral,
            ExprKind::Bool(_) => NodeKind::BooleanLiteral,
            ExprKind::Number(_) => NodeKind::NumericLiteral,
            ExprKind::String(_) => NodeKind::StringLiteral,
            ExprKind::Ident(_) => NodeKind::Identifier,
            ExprKind::Array(_) => NodeKind::ArrayExpression,
            ExprKind::Object(_) => NodeKind::ObjectExpression,
            ExprKind::Property { .. } => NodeKind::ObjectProperty,
            ExprKind::Spread(_) => NodeKind::SpreadElement,
            ExprKind::Member { .. } => NodeKind::MemberExpression,
            ExprKind::Call { .. } => NodeKind::CallExpression,
            ExprKind::Assign { .. } => NodeKind::AssignmentExpression,
            ExprKind::Binary { .. } => NodeKind::BinaryExpression,
            ExprKind::Logical { .. } => NodeKind::LogicalExpression,
            ExprKind::Unary { .. } => NodeKind::UnaryExpression,
            ExprKind::Conditional { .. } => NodeKind::ConditionalExpression,
            ExprKind::Sequence(_) => NodeKind::SequenceExpression,
            ExprKind::Invalid => NodeKind::Invalid,
        }
    }
}

/// Named child slots.
/// 命名的子节点槽位。
///
/// Assignment uses `left`/`right` for target and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Callee,
    Arguments,
    Left,
    Right,
    Object,
    Property,
    Test,
    Consequent,
    Alternate,
    Argument,
    Elements,
    Properties,
    Key,
    Value,
    Expressions,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Callee => "callee",
            Slot::Arguments => "arguments",
            Slot::Left => "left",
            Slot::Right => "right",
            Slot::Object => "object",
            Slot::Property => "property",
            Slot::Test => "test",
            Slot::Consequent => "consequent",
            Slot::Alternate => "alternate",
            Slot::Argument => "argument",
            Slot::Elements => "elements",
            Slot::Properties => "properties",
            Slot::Key => "key",
            Slot::Value => "value",
            Slot::Expressions => "expressions",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a slot holds.
/// 槽位内容。
#[derive(Debug, Clone)]
pub enum Child<'a> {
    Node(NodePath<'a>),
    /// A list slot; `None` entries are array holes.
    List(Vec<Option<NodePath<'a>>>),
}

/// A handle on one expression node inside an analyzed module.
/// 已分析模块中某个表达式节点的句柄。
///
/// Handles are cheap to copy. Two handles are equal when they point at the
/// same occurrence.
#[derive(Clone, Copy)]
pub struct NodePath<'a> {
    sema: &'a Semantics<'a>,
    node: &'a Expr,
}

impl<'a> NodePath<'a> {
    pub(crate) fn new(sema: &'a Semantics<'a>, node: &'a Expr) -> Self {
        Self { sema, node }
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn node(&self) -> &'a Expr {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::of(self.node)
    }

    pub fn span(&self) -> Span {
        self.node.span
    }

    pub fn semantics(&self) -> &'a Semantics<'a> {
        self.sema
    }

    /// The identifier name, when this node is a bare identifier.
    pub fn ident_name(&self) -> Option<&'a str> {
        self.node.as_ident()
    }

    /// The enclosing expression, if any. Statement-level expressions and
    /// declaration initializers have none.
    /// 外层表达式；语句级表达式没有父节点。
    pub fn parent(&self) -> Option<NodePath<'a>> {
        let parent = self.sema.parent_of(self.id())?;
        self.sema.node(parent).map(|node| NodePath::new(self.sema, node))
    }

    /// Navigate to a named slot.
    /// 按名称导航到子槽位。
    pub fn get(&self, slot: Slot) -> Result<Child<'a>, PathError> {
        let single = |node: &'a Expr| -> Result<Child<'a>, PathError> {
            Ok(Child::Node(NodePath::new(self.sema, node)))
        };
        let list = |nodes: Vec<Option<&'a Expr>>| -> Result<Child<'a>, PathError> {
            Ok(Child::List(
                nodes
                    .into_iter()
                    .map(|node| node.map(|node| NodePath::new(self.sema, node)))
                    .collect(),
            ))
        };

        let node: &'a Expr = self.node;
        match (&node.kind, slot) {
            (ExprKind::Array(elements), Slot::Elements) => {
                list(elements.iter().map(Option::as_ref).collect())
            }
            (ExprKind::Object(members), Slot::Properties) => {
                list(members.iter().map(Some).collect())
            }
            (ExprKind::Property { key, .. }, Slot::Key) => single(&**key),
            (ExprKind::Property { value, .. }, Slot::Value) => single(&**value),
            (ExprKind::Spread(argument), Slot::Argument) => single(&**argument),
            (ExprKind::Member { object, .. }, Slot::Object) => single(&**object),
            (ExprKind::Member { property, .. }, Slot::Property) => single(&**property),
            (ExprKind::Call { callee, .. }, Slot::Callee) => single(&**callee),
            (ExprKind::Call { arguments, .. }, Slot::Arguments) => {
                list(arguments.iter().map(Some).collect())
            }
            (ExprKind::Assign { target, .. }, Slot::Left) => single(&**target),
            (ExprKind::Assign { value, .. }, Slot::Right) => single(&**value),
            (ExprKind::Binary { left, .. } | ExprKind::Logical { left, .. }, Slot::Left) => {
                single(&**left)
            }
            (ExprKind::Binary { right, .. } | ExprKind::Logical { right, .. }, Slot::Right) => {
                single(&**right)
            }
            (ExprKind::Unary { argument, .. }, Slot::Argument) => single(&**argument),
            (ExprKind::Conditional { test, .. }, Slot::Test) => single(&**test),
            (ExprKind::Conditional { consequent, .. }, Slot::Consequent) => single(&**consequent),
            (ExprKind::Conditional { alternate, .. }, Slot::Alternate) => single(&**alternate),
            (ExprKind::Sequence(exprs), Slot::Expressions) => {
                list(exprs.iter().map(Some).collect())
            }
            _ => Err(PathError::MissingSlot {
                node: self.id(),
                kind: self.kind(),
                slot,
            }),
        }
    }

    /// Navigate to a slot that must hold exactly one node.
    pub fn child(&self, slot: Slot) -> Result<NodePath<'a>, PathError> {
        match self.get(slot)? {
            Child::Node(path) => Ok(path),
            Child::List(_) => Err(PathError::ExpectedSingle {
                node: self.id(),
                kind: self.kind(),
                slot,
            }),
        }
    }

    /// Navigate to a slot that must hold a list.
    pub fn list(&self, slot: Slot) -> Result<Vec<Option<NodePath<'a>>>, PathError> {
        match self.get(slot)? {
            Child::List(paths) => Ok(paths),
            Child::Node(_) => Err(PathError::ExpectedSequence {
                node: self.id(),
                kind: self.kind(),
                slot,
            }),
        }
    }

    /// Whether this identifier is read as a variable.
    ///
    /// Non-computed member properties and object keys are names, not
    /// references.
    pub fn is_reference(&self) -> bool {
        if self.ident_name().is_none() {
            return false;
        }
        let Some(parent) = self.parent() else {
            return true;
        };
        match &parent.node.kind {
            ExprKind::Member {
                property,
                computed: false,
                ..
            } => property.id != self.id(),
            ExprKind::Property {
                key,
                computed: false,
                ..
            } => key.id != self.id(),
            _ => true,
        }
    }

    /// The declaration this identifier refers to, if it has one in the
    /// analyzed module.
    /// 标识符所引用的声明。
    pub fn binding(&self) -> Option<&'a Binding> {
        let name = self.ident_name()?;
        if !self.is_reference() {
            return None;
        }
        let scope = self.sema.scope_of(self.id())?;
        self.sema.lookup(scope, name)
    }

    /// Whether this node's value is exactly the export `export` of
    /// `module`.
    /// 判断此节点是否正是 `module` 的导出 `export`。
    ///
    /// Handles renamed imports (`import { a as b }`), default imports
    /// (`"default"`) and namespace member access (`ns.a`, `ns["a"]`).
    /// A nearer declaration of the same name shadows the import.
    pub fn references_import(&self, module: &str, export: &str) -> bool {
        let node: &'a Expr = self.node;
        match &node.kind {
            ExprKind::Ident(_) => match self.binding() {
                Some(Binding {
                    kind: BindingKind::Import { source, imported },
                    ..
                }) => source == module && imported.matches(export),
                _ => false,
            },
            ExprKind::Member {
                object,
                property,
                computed,
                ..
            } => {
                let key = match (&property.kind, *computed) {
                    (ExprKind::Ident(name), false) | (ExprKind::String(name), true) => name,
                    _ => return false,
                };
                key == export
                    && NodePath::new(self.sema, object).references_import(module, "*")
            }
            _ => false,
        }
    }
}

impl PartialEq for NodePath<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.sema, other.sema) && self.id() == other.id()
    }
}

impl Eq for NodePath<'_> {}

impl fmt::Debug for NodePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofold_parser::parse;

    const MACROS: &str = "@embroider/macros";

    fn callee_matches(source: &str, export: &str) -> bool {
        let (module, diags) = parse(source);
        assert!(diags.is_empty(), "{diags:?}");
        let sema = Semantics::analyze(&module);
        let tail = sema.tail_path().unwrap();
        let callee = tail.child(Slot::Callee).unwrap();
        callee.references_import(MACROS, export)
    }

    #[test]
    fn test_named_import() {
        assert!(callee_matches(
            "import { getConfig } from '@embroider/macros'; getConfig('x')",
            "getConfig"
        ));
    }

    #[test]
    fn test_renamed_import() {
        assert!(callee_matches(
            "import { getConfig as gc } from '@embroider/macros'; gc('x')",
            "getConfig"
        ));
    }

    #[test]
    fn test_other_module_does_not_match() {
        assert!(!callee_matches(
            "import { getConfig } from 'not-macros'; getConfig('x')",
            "getConfig"
        ));
    }

    #[test]
    fn test_shadowed_import_does_not_match() {
        let source =
            "import { getConfig } from '@embroider/macros'; { const getConfig = f; getConfig('x'); }";
        let (module, diags) = parse(source);
        assert!(diags.is_empty());
        let sema = Semantics::analyze(&module);
        let call = sema.path(find_call(&module).unwrap()).unwrap();
        let callee = call.child(Slot::Callee).unwrap();
        assert!(!callee.references_import(MACROS, "getConfig"));
    }

    fn find_call(module: &macrofold_syntax::Module) -> Option<NodeId> {
        use macrofold_syntax::StmtKind;
        fn in_stmts(stmts: &[macrofold_syntax::Stmt]) -> Option<NodeId> {
            stmts.iter().find_map(|stmt| match &stmt.kind {
                StmtKind::Block(body) => in_stmts(body),
                StmtKind::Expr(expr) if matches!(expr.kind, ExprKind::Call { .. }) => {
                    Some(expr.id)
                }
                _ => None,
            })
        }
        in_stmts(&module.body)
    }

    #[test]
    fn test_namespace_member() {
        assert!(callee_matches(
            "import * as m from '@embroider/macros'; m.isTesting()",
            "isTesting"
        ));
        assert!(!callee_matches(
            "import * as m from '@embroider/macros'; m.isTesting()",
            "getConfig"
        ));
    }

    #[test]
    fn test_slot_faults() {
        let (module, _) = parse("f(1)");
        let sema = Semantics::analyze(&module);
        let call = sema.tail_path().unwrap();
        assert!(matches!(
            call.child(Slot::Arguments),
            Err(PathError::ExpectedSingle { slot: Slot::Arguments, .. })
        ));
        assert!(matches!(
            call.list(Slot::Callee),
            Err(PathError::ExpectedSequence { slot: Slot::Callee, .. })
        ));
        assert!(matches!(
            call.child(Slot::Test),
            Err(PathError::MissingSlot { kind: NodeKind::CallExpression, .. })
        ));
    }

    #[test]
    fn test_parent_and_property_names() {
        let (module, _) = parse("const config = 1; a.config");
        let sema = Semantics::analyze(&module);
        let member = sema.tail_path().unwrap();
        let property = member.child(Slot::Property).unwrap();
        assert_eq!(property.parent(), Some(member));
        assert!(member.parent().is_none());
        assert!(!property.is_reference());
        assert!(property.binding().is_none());
    }
}
