//! Error recovery strategies for the parser.
//!
//! This module provides utilities for recovering from parse errors
//! so the parser can continue and report multiple errors.

use macrofold_lexer::TokenKind;

/// Tokens that typically start a new statement.
pub const STMT_STARTS: &[TokenKind] = &[
    TokenKind::Import,
    TokenKind::Const,
    TokenKind::Let,
    TokenKind::Var,
];

/// Tokens that typically end a statement.
pub const STMT_ENDS: &[TokenKind] = &[TokenKind::Semicolon, TokenKind::RBrace];

/// Check if a token kind is in a set.
pub fn is_in_set(kind: &TokenKind, set: &[TokenKind]) -> bool {
    set.iter()
        .any(|k| std::mem::discriminant(k) == std::mem::discriminant(kind))
}

/// Check if a token starts a statement.
pub fn is_stmt_start(kind: &TokenKind) -> bool {
    is_in_set(kind, STMT_STARTS)
}

/// Check if a token ends a statement.
pub fn is_stmt_end(kind: &TokenKind) -> bool {
    is_in_set(kind, STMT_ENDS)
}

/// Recovery mode for the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    /// Recover to the next statement.
    Statement,
    /// Recover to a closing delimiter.
    Delimiter(DelimiterKind),
    /// No recovery, only report.
    None,
}

/// Delimiter kinds for recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Paren,   // )
    Bracket, // ]
    Brace,   // }
}

impl DelimiterKind {
    pub fn closing_token(&self) -> TokenKind {
        match self {
            DelimiterKind::Paren => TokenKind::RParen,
            DelimiterKind::Bracket => TokenKind::RBracket,
            DelimiterKind::Brace => TokenKind::RBrace,
        }
    }

    pub fn opening_token(&self) -> TokenKind {
        match self {
            DelimiterKind::Paren => TokenKind::LParen,
            DelimiterKind::Bracket => TokenKind::LBracket,
            DelimiterKind::Brace => TokenKind::LBrace,
        }
    }

    /// The closing character, for messages.
    pub fn closing_char(&self) -> char {
        match self {
            DelimiterKind::Paren => ')',
            DelimiterKind::Bracket => ']',
            DelimiterKind::Brace => '}',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stmt_start() {
        assert!(is_stmt_start(&TokenKind::Const));
        assert!(is_stmt_start(&TokenKind::Import));
        assert!(!is_stmt_start(&TokenKind::Plus));
        assert!(!is_stmt_start(&TokenKind::Ident("x".into())));
    }

    #[test]
    fn test_stmt_end() {
        assert!(is_stmt_end(&TokenKind::Semicolon));
        assert!(is_stmt_end(&TokenKind::RBrace));
        assert!(!is_stmt_end(&TokenKind::RParen));
    }

    #[test]
    fn test_delimiter_tokens() {
        assert_eq!(DelimiterKind::Paren.closing_token(), TokenKind::RParen);
        assert_eq!(DelimiterKind::Bracket.opening_token(), TokenKind::LBracket);
        assert_eq!(DelimiterKind::Brace.closing_char(), '}');
    }
}
