//! Token definitions.

use macrofold_common::Span;
use std::fmt;

/// A token with its kind and span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(String),

    // Identifiers
    Ident(String),

    // Keywords
    Import,
    From,
    As,
    Const,
    Let,
    Var,
    True,
    False,
    Null,
    Void,
    Typeof,

    // Delimiters
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }

    // Arithmetic
    Plus,     // +
    Minus,    // -
    Star,     // *
    StarStar, // **
    Slash,    // /
    Percent,  // %

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    Shl,   // <<
    Shr,   // >>
    UShr,  // >>>

    // Comparison
    EqEq,      // ==
    BangEq,    // !=
    EqEqEq,    // ===
    BangEqEq,  // !==
    Lt,        // <
    LtEq,      // <=
    Gt,        // >
    GtEq,      // >=

    // Logical
    AndAnd,           // &&
    OrOr,             // ||
    Bang,             // !
    QuestionQuestion, // ??

    // Assignment
    Eq,                 // =
    PlusEq,             // +=
    MinusEq,            // -=
    AndAndEq,           // &&=
    OrOrEq,             // ||=
    QuestionQuestionEq, // ??=

    // Punctuation
    Question,    // ?
    QuestionDot, // ?.
    Colon,       // :
    Comma,       // ,
    Semicolon,   // ;
    Dot,         // .
    Ellipsis,    // ...

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Returns true if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        self.keyword_str().is_some()
    }

    /// The source spelling of a keyword token.
    ///
    /// Keywords are valid property names (`a.import`, `{ from: 1 }`), so the
    /// parser uses this to turn them back into names.
    pub fn keyword_str(&self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Import => "import",
            TokenKind::From => "from",
            TokenKind::As => "as",
            TokenKind::Const => "const",
            TokenKind::Let => "let",
            TokenKind::Var => "var",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Void => "void",
            TokenKind::Typeof => "typeof",
            _ => return None,
        };
        Some(s)
    }

    /// Returns the keyword for an identifier, if any.
    ///
    /// `from` and `as` are contextual in JavaScript; they lex as keywords and
    /// the parser accepts them wherever a binding name is expected.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "import" => Some(TokenKind::Import),
            "from" => Some(TokenKind::From),
            "as" => Some(TokenKind::As),
            "const" => Some(TokenKind::Const),
            "let" => Some(TokenKind::Let),
            "var" => Some(TokenKind::Var),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "null" => Some(TokenKind::Null),
            "void" => Some(TokenKind::Void),
            "typeof" => Some(TokenKind::Typeof),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(word) = self.keyword_str() {
            return write!(f, "`{word}`");
        }
        let text = match self {
            TokenKind::Number(_) => return write!(f, "number"),
            TokenKind::String(_) => return write!(f, "string"),
            TokenKind::Ident(name) => return write!(f, "`{name}`"),
            TokenKind::Eof => return write!(f, "end of input"),
            TokenKind::Error => return write!(f, "invalid token"),
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::StarStar => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::UShr => ">>>",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::EqEqEq => "===",
            TokenKind::BangEqEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::QuestionQuestion => "??",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::AndAndEq => "&&=",
            TokenKind::OrOrEq => "||=",
            TokenKind::QuestionQuestionEq => "??=",
            TokenKind::Question => "?",
            TokenKind::QuestionDot => "?.",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            // keywords are handled above
            _ => "keyword",
        };
        write!(f, "`{text}`")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trip() {
        for word in ["import", "from", "as", "const", "let", "var", "true", "false", "null", "void", "typeof"] {
            let kind = TokenKind::keyword_from_str(word).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.keyword_str(), Some(word));
        }
        assert!(TokenKind::keyword_from_str("getConfig").is_none());
        assert!(!TokenKind::Plus.is_keyword());
    }

    #[test]
    fn display_for_messages() {
        assert_eq!(TokenKind::RParen.to_string(), "`)`");
        assert_eq!(TokenKind::From.to_string(), "`from`");
        assert_eq!(TokenKind::Ident("x".into()).to_string(), "`x`");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
