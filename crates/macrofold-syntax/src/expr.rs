//! Expression AST nodes.
//! 表达式 AST 节点。

use crate::{AssignOp, BinaryOp, LogicalOp, UnaryOp};
use macrofold_common::{NodeId, Span};

/// An expression node.
/// 表达式节点。
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// The identifier name, when this node is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Direct child nodes in source order. Array holes are skipped.
    /// 按源码顺序返回直接子节点，跳过数组空位。
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::Ident(_)
            | ExprKind::Invalid => Vec::new(),
            ExprKind::Array(elements) => elements.iter().flatten().collect(),
            ExprKind::Object(members) => members.iter().collect(),
            ExprKind::Property { key, value, .. } => vec![&**key, &**value],
            ExprKind::Spread(argument) => vec![&**argument],
            ExprKind::Member {
                object, property, ..
            } => vec![&**object, &**property],
            ExprKind::Call {
                callee, arguments, ..
            } => std::iter::once(&**callee).chain(arguments).collect(),
            ExprKind::Assign { target, value, .. } => vec![&**target, &**value],
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                vec![&**left, &**right]
            }
            ExprKind::Unary { argument, .. } => vec![&**argument],
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => vec![&**test, &**consequent, &**alternate],
            ExprKind::Sequence(exprs) => exprs.iter().collect(),
        }
    }
}

/// Expression kind.
/// 表达式类型。
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// `null` / 空值字面量
    Null,
    /// `true`, `false` / 布尔字面量
    Bool(bool),
    /// Numeric literal / 数字字面量
    Number(f64),
    /// String literal / 字符串字面量
    String(String),

    /// Identifier reference / 标识符引用
    Ident(String),

    /// Array literal `[a, , ...b]`; `None` is a hole / 数组字面量，`None` 为空位
    Array(Vec<Option<Expr>>),

    /// Object literal; members are `Property` or `Spread` nodes / 对象字面量
    Object(Vec<Expr>),

    /// Object literal member `key: value`, `[key]: value` or shorthand `key`.
    /// Only appears inside `Object`. / 对象属性，仅出现在 `Object` 中
    Property {
        key: Box<Expr>,
        value: Box<Expr>,
        computed: bool,
        shorthand: bool,
    },

    /// `...argument` inside an array, object or argument list / 展开
    Spread(Box<Expr>),

    /// `a.b`, `a[b]`, `a?.b`, `a?.[b]` / 成员访问
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
        optional: bool,
    },

    /// `f(x)`, `f?.(x)` / 函数调用
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },

    /// `target = value` and compound forms / 赋值
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// Binary operation `a + b` / 二元运算
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical operation `a && b`, `a || b`, `a ?? b` / 逻辑运算
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation `!a`, `void a` / 一元运算
    Unary { op: UnaryOp, argument: Box<Expr> },

    /// `test ? consequent : alternate` / 条件表达式
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    /// `a, b, c` / 逗号表达式
    Sequence(Vec<Expr>),

    /// Placeholder left by parser error recovery / 错误恢复占位
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofold_common::NodeIdGen;

    #[test]
    fn children_in_source_order() {
        let mut ids = NodeIdGen::new();
        let callee = Expr::new(ids.fresh(), ExprKind::Ident("f".into()), Span::new(0, 1));
        let arg = Expr::new(ids.fresh(), ExprKind::Number(1.0), Span::new(2, 3));
        let call = Expr::new(
            ids.fresh(),
            ExprKind::Call {
                callee: Box::new(callee),
                arguments: vec![arg],
                optional: false,
            },
            Span::new(0, 4),
        );

        let children = call.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].as_ident(), Some("f"));
        assert!(matches!(children[1].kind, ExprKind::Number(n) if n == 1.0));
    }

    #[test]
    fn array_holes_are_skipped() {
        let mut ids = NodeIdGen::new();
        let one = Expr::new(ids.fresh(), ExprKind::Number(1.0), Span::DUMMY);
        let array = Expr::new(ids.fresh(), ExprKind::Array(vec![None, Some(one)]), Span::DUMMY);
        assert_eq!(array.children().len(), 1);
    }
}
