//! The macrofold parser.

use macrofold_common::{NodeIdGen, Span};
use macrofold_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use macrofold_lexer::{Token, TokenKind};
use macrofold_syntax::*;

use crate::recovery::{DelimiterKind, RecoveryMode, is_stmt_end, is_stmt_start};

/// An infix operator and the node it builds.
#[derive(Clone, Copy)]
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// Binding power of `**`, the only right-associative infix operator.
const EXPONENT_PREC: u8 = 11;

/// Precedence of the infix operator at `kind`. Higher binds tighter.
///
/// `??` shares the level of `||`; mixing them without parentheses is a
/// syntax error in JavaScript but is accepted here.
fn infix_op(kind: &TokenKind) -> Option<(u8, Infix)> {
    use Infix::{Binary, Logical};
    let op = match kind {
        TokenKind::QuestionQuestion => (1, Logical(LogicalOp::Nullish)),
        TokenKind::OrOr => (1, Logical(LogicalOp::Or)),
        TokenKind::AndAnd => (2, Logical(LogicalOp::And)),
        TokenKind::Pipe => (3, Binary(BinaryOp::BitOr)),
        TokenKind::Caret => (4, Binary(BinaryOp::BitXor)),
        TokenKind::Amp => (5, Binary(BinaryOp::BitAnd)),
        TokenKind::EqEq => (6, Binary(BinaryOp::LooseEq)),
        TokenKind::BangEq => (6, Binary(BinaryOp::LooseNe)),
        TokenKind::EqEqEq => (6, Binary(BinaryOp::StrictEq)),
        TokenKind::BangEqEq => (6, Binary(BinaryOp::StrictNe)),
        TokenKind::Lt => (7, Binary(BinaryOp::Lt)),
        TokenKind::LtEq => (7, Binary(BinaryOp::Le)),
        TokenKind::Gt => (7, Binary(BinaryOp::Gt)),
        TokenKind::GtEq => (7, Binary(BinaryOp::Ge)),
        TokenKind::Shl => (8, Binary(BinaryOp::Shl)),
        TokenKind::Shr => (8, Binary(BinaryOp::Shr)),
        TokenKind::UShr => (8, Binary(BinaryOp::UShr)),
        TokenKind::Plus => (9, Binary(BinaryOp::Add)),
        TokenKind::Minus => (9, Binary(BinaryOp::Sub)),
        TokenKind::Star => (10, Binary(BinaryOp::Mul)),
        TokenKind::Slash => (10, Binary(BinaryOp::Div)),
        TokenKind::Percent => (10, Binary(BinaryOp::Rem)),
        TokenKind::StarStar => (EXPONENT_PREC, Binary(BinaryOp::Exp)),
        _ => return None,
    };
    Some(op)
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::AddAssign,
        TokenKind::MinusEq => AssignOp::SubAssign,
        TokenKind::AndAndEq => AssignOp::AndAssign,
        TokenKind::OrOrEq => AssignOp::OrAssign,
        TokenKind::QuestionQuestionEq => AssignOp::NullishAssign,
        _ => return None,
    };
    Some(op)
}

fn is_assignment_target(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Ident(_) | ExprKind::Member { optional: false, .. }
    )
}

/// The macrofold parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ids: NodeIdGen,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_ids(tokens, NodeIdGen::new())
    }

    /// Create a parser that numbers nodes from an existing generator, so
    /// fragments parsed later never collide with an earlier tree.
    pub fn with_ids(tokens: Vec<Token>, ids: NodeIdGen) -> Self {
        Self {
            tokens,
            pos: 0,
            ids,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Give back the id generator and the collected diagnostics.
    pub fn finish(self) -> (NodeIdGen, Vec<Diagnostic>) {
        (self.ids, self.diagnostics)
    }

    /// Parse a complete module.
    pub fn parse_module(&mut self) -> Module {
        let start = self.current_span();
        let mut body = Vec::new();

        while !self.at_end() {
            match self.parse_stmt() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(),
            }
        }

        Module {
            body,
            span: start.to(self.previous_span()),
        }
    }

    /// Parse a single expression that must span the whole input.
    pub fn parse_standalone_expr(&mut self) -> Expr {
        let expr = self.parse_expr();
        self.eat(TokenKind::Semicolon);
        if !self.at_end() {
            let found = self.current_kind().clone();
            self.error(&format!("expected end of input, found {found}"));
        }
        expr
    }

    // ========== Statements ==========

    fn parse_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();

        let kind = match self.current_kind() {
            TokenKind::Import => {
                self.advance();
                StmtKind::Import(self.parse_import()?)
            }
            TokenKind::Const => {
                self.advance();
                StmtKind::VarDecl(self.parse_var_decl(VarKind::Const))
            }
            TokenKind::Let => {
                self.advance();
                StmtKind::VarDecl(self.parse_var_decl(VarKind::Let))
            }
            TokenKind::Var => {
                self.advance();
                StmtKind::VarDecl(self.parse_var_decl(VarKind::Var))
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block()),
            TokenKind::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::RBrace => {
                self.error("unexpected `}`");
                return None;
            }
            _ => {
                let before = self.pos;
                let expr = self.parse_expr();
                if self.pos == before {
                    // nothing consumed; let the caller skip ahead
                    return None;
                }
                self.consume_semicolon();
                StmtKind::Expr(expr)
            }
        };

        Some(Stmt {
            kind,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_block(&mut self) -> Vec<Stmt> {
        let open = self.current_span();
        self.advance();

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }

        self.expect_closing(DelimiterKind::Brace, open);
        stmts
    }

    /// Parse the rest of an import declaration after `import`.
    ///
    /// Accepts `import "m"`, `import d from "m"`, `import * as ns from "m"`,
    /// `import { a, b as c, "d-e" as f } from "m"` and a default binding
    /// followed by either of the last two forms.
    fn parse_import(&mut self) -> Option<ImportDecl> {
        let mut specifiers = Vec::new();

        if let TokenKind::String(source) = self.current_kind().clone() {
            self.advance();
            self.consume_semicolon();
            return Some(ImportDecl { specifiers, source });
        }

        if let Some(local) = self.parse_binding_ident() {
            specifiers.push(ImportSpecifier {
                span: local.span,
                local,
                imported: ImportName::Default,
            });
            if !self.eat(TokenKind::Comma) {
                return self.finish_import(specifiers);
            }
        }

        if self.check(TokenKind::Star) {
            let start = self.current_span();
            self.advance();
            if !self.eat(TokenKind::As) {
                self.import_error("expected `as` after `*`");
                return None;
            }
            let local = self.expect_binding_ident()?;
            specifiers.push(ImportSpecifier {
                span: start.to(local.span),
                local,
                imported: ImportName::Namespace,
            });
        } else if self.check(TokenKind::LBrace) {
            let open = self.current_span();
            self.advance();
            let named = self.parse_comma_list(TokenKind::RBrace, |p| p.parse_import_specifier());
            specifiers.extend(named);
            if !self.expect_closing(DelimiterKind::Brace, open) {
                return None;
            }
        } else {
            self.import_error("expected import specifiers");
            return None;
        }

        self.finish_import(specifiers)
    }

    fn parse_import_specifier(&mut self) -> Option<ImportSpecifier> {
        let start = self.current_span();
        let (imported, bindable) = match self.current_kind().clone() {
            TokenKind::Ident(name) => (name, true),
            TokenKind::String(name) => (name, false),
            kind => match kind.keyword_str() {
                Some(word) => (word.to_string(), matches!(kind, TokenKind::From | TokenKind::As)),
                None => {
                    self.import_error("expected an imported name");
                    return None;
                }
            },
        };
        self.advance();

        let local = if self.eat(TokenKind::As) {
            self.expect_binding_ident()?
        } else if bindable {
            Ident::new(imported.clone(), start)
        } else {
            self.import_error(&format!("`{imported}` must be renamed with `as`"));
            return None;
        };

        let imported = if imported == "default" {
            ImportName::Default
        } else {
            ImportName::Named(imported)
        };

        Some(ImportSpecifier {
            span: start.to(self.previous_span()),
            local,
            imported,
        })
    }

    fn finish_import(&mut self, specifiers: Vec<ImportSpecifier>) -> Option<ImportDecl> {
        if !self.expect_recover(TokenKind::From, RecoveryMode::None) {
            return None;
        }
        let source = match self.current_kind().clone() {
            TokenKind::String(source) => {
                self.advance();
                source
            }
            _ => {
                self.import_error("expected a module specifier string");
                return None;
            }
        };
        self.consume_semicolon();
        Some(ImportDecl { specifiers, source })
    }

    fn parse_var_decl(&mut self, kind: VarKind) -> VarDecl {
        let mut declarators = Vec::new();

        loop {
            let start = self.current_span();
            let Some(name) = self.expect_binding_ident() else {
                self.recover(RecoveryMode::Statement);
                return VarDecl { kind, declarators };
            };
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assign())
            } else {
                None
            };
            if kind == VarKind::Const && init.is_none() {
                self.push_error(
                    ErrorCode::UnexpectedToken,
                    name.span,
                    "missing initializer in const declaration",
                );
            }
            declarators.push(Declarator {
                name,
                init,
                span: start.to(self.previous_span()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.consume_semicolon();
        VarDecl { kind, declarators }
    }

    // ========== Expression Parsing ==========

    /// Parse a full expression, including the comma operator.
    pub fn parse_expr(&mut self) -> Expr {
        let first = self.parse_assign();
        if !self.check(TokenKind::Comma) {
            return first;
        }

        let start = first.span;
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_assign());
        }
        let span = start.to(self.previous_span());
        self.mk(ExprKind::Sequence(exprs), span)
    }

    fn parse_assign(&mut self) -> Expr {
        let target = self.parse_conditional();
        let Some(op) = assign_op(self.current_kind()) else {
            return target;
        };
        self.advance();

        if !is_assignment_target(&target) {
            self.diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::Parser,
                    target.span,
                    "invalid assignment target",
                )
                .with_code(ErrorCode::InvalidAssignmentTarget)
                .with_label(Label::new(target.span, "cannot assign to this")),
            );
        }

        // right-associative: `a = b = c` is `a = (b = c)`
        let value = self.parse_assign();
        let span = target.span.to(value.span);
        self.mk(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        )
    }

    fn parse_conditional(&mut self) -> Expr {
        let test = self.parse_binary(1);
        if !self.eat(TokenKind::Question) {
            return test;
        }

        let consequent = self.parse_assign();
        self.expect_recover(TokenKind::Colon, RecoveryMode::None);
        let alternate = self.parse_assign();
        let span = test.span.to(alternate.span);
        self.mk(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        )
    }

    /// Precedence climbing over the binary and logical operators.
    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut left = self.parse_unary();

        while let Some((prec, infix)) = infix_op(self.current_kind()) {
            if prec < min_prec {
                break;
            }
            self.advance();

            let next = if prec == EXPONENT_PREC { prec } else { prec + 1 };
            let right = self.parse_binary(next);
            let span = left.span.to(right.span);
            let kind = match infix {
                Infix::Binary(op) => ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Infix::Logical(op) => ExprKind::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
            left = self.mk(kind, span);
        }

        left
    }

    fn parse_unary(&mut self) -> Expr {
        let start = self.current_span();
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Void => UnaryOp::Void,
            TokenKind::Typeof => UnaryOp::Typeof,
            _ => return self.parse_postfix(),
        };
        self.advance();

        let argument = self.parse_unary();
        let span = start.to(argument.span);
        self.mk(
            ExprKind::Unary {
                op,
                argument: Box::new(argument),
            },
            span,
        )
    }

    /// Member access, calls and optional chains.
    ///
    /// Once a `?.` appears, every later link of the same chain is marked
    /// `optional`, so `a?.b.c` guards both reads.
    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        let mut in_chain = false;

        loop {
            if self.eat(TokenKind::Dot) {
                let property = self.parse_property_name();
                expr = self.member(expr, property, false, in_chain);
            } else if self.eat(TokenKind::QuestionDot) {
                in_chain = true;
                if self.check(TokenKind::LBracket) {
                    let property = self.parse_computed_property();
                    expr = self.member(expr, property, true, true);
                } else if self.check(TokenKind::LParen) {
                    let arguments = self.parse_arguments();
                    expr = self.call(expr, arguments, true);
                } else {
                    let property = self.parse_property_name();
                    expr = self.member(expr, property, false, true);
                }
            } else if self.check(TokenKind::LBracket) {
                let property = self.parse_computed_property();
                expr = self.member(expr, property, true, in_chain);
            } else if self.check(TokenKind::LParen) {
                let arguments = self.parse_arguments();
                expr = self.call(expr, arguments, in_chain);
            } else {
                break;
            }
        }

        expr
    }

    fn member(&mut self, object: Expr, property: Expr, computed: bool, optional: bool) -> Expr {
        let span = object.span.to(self.previous_span());
        self.mk(
            ExprKind::Member {
                object: Box::new(object),
                property: Box::new(property),
                computed,
                optional,
            },
            span,
        )
    }

    fn call(&mut self, callee: Expr, arguments: Vec<Expr>, optional: bool) -> Expr {
        let span = callee.span.to(self.previous_span());
        self.mk(
            ExprKind::Call {
                callee: Box::new(callee),
                arguments,
                optional,
            },
            span,
        )
    }

    /// The name after `.` or `?.`. Keywords are valid property names.
    fn parse_property_name(&mut self) -> Expr {
        let span = self.current_span();
        let name = match self.current_kind() {
            TokenKind::Ident(name) => name.clone(),
            kind => match kind.keyword_str() {
                Some(word) => word.to_string(),
                None => {
                    self.push_error(ErrorCode::ExpectedExpression, span, "expected property name");
                    return self.mk(ExprKind::Invalid, span);
                }
            },
        };
        self.advance();
        self.mk(ExprKind::Ident(name), span)
    }

    fn parse_computed_property(&mut self) -> Expr {
        let open = self.current_span();
        self.advance();
        let property = self.parse_expr();
        self.expect_closing(DelimiterKind::Bracket, open);
        property
    }

    fn parse_arguments(&mut self) -> Vec<Expr> {
        let open = self.current_span();
        self.advance();
        let arguments = self.parse_comma_list(TokenKind::RParen, |p| Some(p.parse_element()));
        self.expect_closing(DelimiterKind::Paren, open);
        arguments
    }

    /// An array element or call argument, possibly spread.
    fn parse_element(&mut self) -> Expr {
        let start = self.current_span();
        if self.eat(TokenKind::Ellipsis) {
            let argument = self.parse_assign();
            let span = start.to(argument.span);
            return self.mk(ExprKind::Spread(Box::new(argument)), span);
        }
        self.parse_assign()
    }

    fn parse_primary(&mut self) -> Expr {
        let start = self.current_span();

        let kind = match self.current_kind().clone() {
            TokenKind::Number(n) => ExprKind::Number(n),
            TokenKind::String(s) => ExprKind::String(s),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Ident(name) => ExprKind::Ident(name),
            // contextual keywords are ordinary names in expressions
            TokenKind::From => ExprKind::Ident("from".to_string()),
            TokenKind::As => ExprKind::Ident("as".to_string()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect_closing(DelimiterKind::Paren, start);
                return inner;
            }
            TokenKind::LBracket => return self.parse_array(),
            TokenKind::LBrace => return self.parse_object(),
            found => {
                self.push_error(
                    ErrorCode::ExpectedExpression,
                    start,
                    &format!("expected an expression, found {found}"),
                );
                if !self.at_boundary() {
                    self.advance();
                }
                return self.mk(ExprKind::Invalid, start);
            }
        };

        self.advance();
        self.mk(kind, start)
    }

    fn parse_array(&mut self) -> Expr {
        let open = self.current_span();
        self.advance();

        let mut elements = Vec::new();
        loop {
            if self.check(TokenKind::RBracket) || self.at_end() {
                break;
            }
            if self.eat(TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_element()));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect_closing(DelimiterKind::Bracket, open);
        let span = open.to(self.previous_span());
        self.mk(ExprKind::Array(elements), span)
    }

    fn parse_object(&mut self) -> Expr {
        let open = self.current_span();
        self.advance();
        let members = self.parse_comma_list(TokenKind::RBrace, |p| p.parse_object_member());
        self.expect_closing(DelimiterKind::Brace, open);
        let span = open.to(self.previous_span());
        self.mk(ExprKind::Object(members), span)
    }

    fn parse_object_member(&mut self) -> Option<Expr> {
        let start = self.current_span();

        if self.eat(TokenKind::Ellipsis) {
            let argument = self.parse_assign();
            let span = start.to(argument.span);
            return Some(self.mk(ExprKind::Spread(Box::new(argument)), span));
        }

        // name usable for `{ a }` shorthand
        let mut shorthand = None;
        let (key, computed) = match self.current_kind().clone() {
            TokenKind::LBracket => (self.parse_computed_property(), true),
            TokenKind::String(s) => {
                self.advance();
                (self.mk(ExprKind::String(s), start), false)
            }
            TokenKind::Number(n) => {
                self.advance();
                (self.mk(ExprKind::Number(n), start), false)
            }
            TokenKind::Ident(name) => {
                self.advance();
                shorthand = Some(name.clone());
                (self.mk(ExprKind::Ident(name), start), false)
            }
            kind => match kind.keyword_str() {
                Some(word) => {
                    self.advance();
                    if matches!(kind, TokenKind::From | TokenKind::As) {
                        shorthand = Some(word.to_string());
                    }
                    (self.mk(ExprKind::Ident(word.to_string()), start), false)
                }
                None => {
                    self.error(&format!("expected property name, found {kind}"));
                    return None;
                }
            },
        };

        let (value, is_shorthand) = if self.eat(TokenKind::Colon) {
            (self.parse_assign(), false)
        } else if let Some(name) = shorthand {
            (self.mk(ExprKind::Ident(name), key.span), true)
        } else {
            self.error("expected `:` after property name");
            return None;
        };

        let span = start.to(self.previous_span());
        Some(self.mk(
            ExprKind::Property {
                key: Box::new(key),
                value: Box::new(value),
                computed,
                shorthand: is_shorthand,
            },
            span,
        ))
    }

    fn parse_binding_ident(&mut self) -> Option<Ident> {
        let span = self.current_span();
        let name = match self.current_kind() {
            TokenKind::Ident(name) => name.clone(),
            TokenKind::From => "from".to_string(),
            TokenKind::As => "as".to_string(),
            _ => return None,
        };
        self.advance();
        Some(Ident::new(name, span))
    }

    fn expect_binding_ident(&mut self) -> Option<Ident> {
        let ident = self.parse_binding_ident();
        if ident.is_none() {
            let found = self.current_kind().clone();
            self.error(&format!("expected identifier, found {found}"));
        }
        ident
    }

    // ========== Node Helpers ==========

    fn mk(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr::new(self.ids.fresh(), kind, span)
    }

    // ========== Token Helpers ==========

    fn current(&self) -> &Token {
        // the lexer always ends the stream with `Eof`
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Tokens an expression can never start with and that an enclosing
    /// construct will consume.
    fn at_boundary(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Eof
        )
    }

    fn check(&self, kind: TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(&kind)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Accept a statement terminator. Missing semicolons are tolerated.
    fn consume_semicolon(&mut self) {
        self.eat(TokenKind::Semicolon);
    }

    fn error(&mut self, message: &str) {
        let span = self.current_span();
        self.push_error(ErrorCode::UnexpectedToken, span, message);
    }

    fn import_error(&mut self, message: &str) {
        let span = self.current_span();
        self.push_error(ErrorCode::InvalidImport, span, message);
    }

    fn push_error(&mut self, code: ErrorCode, span: Span, message: &str) {
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Parser, span, message)
                .with_code(code)
                .with_label(Label::new(span, "here")),
        );
    }

    // ========== Error Recovery ==========

    /// Synchronize to the next statement boundary.
    ///
    /// Always consumes at least one token. Stops after a `;`, before a
    /// `}` that may close an enclosing block, or before a declaration
    /// keyword.
    fn synchronize(&mut self) {
        let mut advanced = false;

        while !self.at_end() {
            if advanced {
                if self.pos > 0 && is_stmt_end(&self.tokens[self.pos - 1].kind) {
                    return;
                }
                if self.check(TokenKind::RBrace) || is_stmt_start(self.current_kind()) {
                    return;
                }
            }
            self.advance();
            advanced = true;
        }
    }

    /// Skip until the closing delimiter, respecting nesting. Stops at a
    /// `;` outside nested delimiters.
    fn skip_to_closing_delimiter(&mut self, kind: DelimiterKind) {
        let target = kind.closing_token();
        let mut depth = 1;

        while !self.at_end() {
            let current = self.current_kind().clone();

            if current == kind.opening_token() {
                depth += 1;
            } else if current == target {
                depth -= 1;
                if depth == 0 {
                    return; // Don't consume the closing delimiter
                }
            } else if depth == 1 && current == TokenKind::Semicolon {
                return;
            }

            self.advance();
        }
    }

    fn recover(&mut self, recovery: RecoveryMode) {
        match recovery {
            RecoveryMode::Statement => self.synchronize(),
            RecoveryMode::Delimiter(delim) => self.skip_to_closing_delimiter(delim),
            RecoveryMode::None => {}
        }
    }

    /// Expect a token, with recovery on failure.
    fn expect_recover(&mut self, kind: TokenKind, recovery: RecoveryMode) -> bool {
        if self.eat(kind.clone()) {
            return true;
        }
        let found = self.current_kind().clone();
        self.error(&format!("expected {kind}, found {found}"));
        self.recover(recovery);
        false
    }

    /// Expect the closer for a delimiter opened at `open`.
    ///
    /// On failure, reports an unclosed delimiter and skips to the matching
    /// closer if there is one.
    fn expect_closing(&mut self, kind: DelimiterKind, open: Span) -> bool {
        if self.eat(kind.closing_token()) {
            return true;
        }

        let span = self.current_span();
        let found = self.current_kind().clone();
        self.diagnostics.push(
            Diagnostic::error(
                DiagnosticKind::Parser,
                span,
                format!("expected `{}`, found {found}", kind.closing_char()),
            )
            .with_code(ErrorCode::UnclosedDelimiter)
            .with_label(Label::new(open, "unclosed delimiter opened here"))
            .with_label(Label::new(span, "here")),
        );

        self.recover(RecoveryMode::Delimiter(kind));
        self.eat(kind.closing_token())
    }

    /// Parse a comma-separated list with error recovery.
    fn parse_comma_list<T, F>(&mut self, closing: TokenKind, mut parse_item: F) -> Vec<T>
    where
        F: FnMut(&mut Self) -> Option<T>,
    {
        let mut items = Vec::new();

        while !self.check(closing.clone()) && !self.at_end() {
            if let Some(item) = parse_item(self) {
                items.push(item);
            } else {
                // Recovery: skip to comma or closing delimiter
                while !self.check(TokenKind::Comma)
                    && !self.check(closing.clone())
                    && !self.at_end()
                {
                    self.advance();
                }
            }

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofold_lexer::Lexer;

    fn parse_expr_str(source: &str) -> (Expr, Vec<Diagnostic>) {
        let (tokens, mut diagnostics) = Lexer::new(source).tokenize();
        let mut parser = Parser::new(tokens);
        let expr = parser.parse_standalone_expr();
        diagnostics.extend(parser.diagnostics());
        (expr, diagnostics)
    }

    #[test]
    fn test_precedence_climbing() {
        let (expr, diags) = parse_expr_str("1 + 2 * 3");
        assert!(diags.is_empty());
        match expr.kind {
            ExprKind::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. })),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let (expr, _) = parse_expr_str("2 ** 3 ** 2");
        match expr.kind {
            ExprKind::Binary {
                op: BinaryOp::Exp,
                left,
                right,
            } => {
                assert!(matches!(left.kind, ExprKind::Number(n) if n == 2.0));
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Exp, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_optional_chain_marks_later_links() {
        let (expr, diags) = parse_expr_str("a?.b.c");
        assert!(diags.is_empty());
        match expr.kind {
            ExprKind::Member {
                object, optional, ..
            } => {
                assert!(optional);
                assert!(matches!(object.kind, ExprKind::Member { optional: true, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_node_ids_are_unique() {
        let (expr, _) = parse_expr_str("[a, { b: c }, d(e)]");
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![&expr];
        while let Some(node) = stack.pop() {
            assert!(seen.insert(node.id));
            stack.extend(node.children());
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn test_shorthand_property() {
        let (expr, diags) = parse_expr_str("{ a, b: 1 }");
        assert!(diags.is_empty());
        let ExprKind::Object(members) = expr.kind else {
            panic!("expected object");
        };
        assert!(matches!(members[0].kind, ExprKind::Property { shorthand: true, .. }));
        assert!(matches!(members[1].kind, ExprKind::Property { shorthand: false, .. }));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (_, diags) = parse_expr_str("1 = 2");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(ErrorCode::InvalidAssignmentTarget));
    }

    #[test]
    fn test_recovery_reports_multiple_errors() {
        let (tokens, _) = Lexer::new("const = 1; f(; x").tokenize();
        let mut parser = Parser::new(tokens);
        let module = parser.parse_module();
        let diags = parser.diagnostics();
        assert!(diags.len() >= 2);
        assert!(matches!(module.tail_expr().map(|e| &e.kind), Some(ExprKind::Ident(name)) if name == "x"));
    }
}
