//! The JavaScript expression lexer.
//! JavaScript 表达式词法分析器。

use crate::token::{Token, TokenKind};
use macrofold_common::Span;
use macrofold_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};

/// The lexer.
/// 词法分析器。
///
/// Converts source code into a sequence of tokens. Problems are recorded as
/// diagnostics and an `Error` token; lexing always runs to the end.
/// 将源代码转换为 token 序列。错误记录为诊断信息并产生 `Error` token。
pub struct Lexer<'src> {
    /// Character iterator with position info
    /// 带位置信息的字符迭代器
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    /// Current position in source
    /// 当前在源码中的位置
    pos: usize,
    /// Collected diagnostics (errors/warnings)
    /// 收集的诊断信息（错误/警告）
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code.
    /// 为给定的源代码创建新的词法分析器。
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire source and return tokens and diagnostics.
    /// 对整个源代码进行词法分析，返回 token 列表和诊断信息。
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        (tokens, self.diagnostics)
    }

    /// Get the next token.
    /// 获取下一个 token。
    fn next_token(&mut self) -> Token {
        // Skip whitespace and comments - 跳过空白字符和注释
        if let Some(token) = self.skip_trivia() {
            return token;
        }

        let start = self.pos;

        let Some((_pos, ch)) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::new(start, start));
        };

        let kind = match ch {
            // Single character tokens - 单字符 token
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '^' => TokenKind::Caret,
            '%' => TokenKind::Percent,
            '/' => TokenKind::Slash,

            // Dot, ellipsis or a leading-dot number like `.5`
            // 点、展开运算符或以点开头的数字
            '.' => match self.peek_char() {
                Some(c) if c.is_ascii_digit() => self.number(ch),
                Some('.') if self.peek_nth(1) == Some('.') => {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                }
                _ => TokenKind::Dot,
            },

            '+' => {
                if self.eat_char('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }

            '-' => {
                if self.eat_char('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }

            '*' => {
                if self.eat_char('*') {
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }

            // `=`, `==`, `===`
            '=' => {
                if self.eat_char('=') {
                    if self.eat_char('=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else {
                    TokenKind::Eq
                }
            }

            // `!`, `!=`, `!==`
            '!' => {
                if self.eat_char('=') {
                    if self.eat_char('=') {
                        TokenKind::BangEqEq
                    } else {
                        TokenKind::BangEq
                    }
                } else {
                    TokenKind::Bang
                }
            }

            '<' => {
                if self.eat_char('<') {
                    TokenKind::Shl
                } else if self.eat_char('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }

            // `>`, `>=`, `>>`, `>>>`
            '>' => {
                if self.eat_char('>') {
                    if self.eat_char('>') {
                        TokenKind::UShr
                    } else {
                        TokenKind::Shr
                    }
                } else if self.eat_char('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }

            '&' => {
                if self.eat_char('&') {
                    if self.eat_char('=') {
                        TokenKind::AndAndEq
                    } else {
                        TokenKind::AndAnd
                    }
                } else {
                    TokenKind::Amp
                }
            }

            '|' => {
                if self.eat_char('|') {
                    if self.eat_char('=') {
                        TokenKind::OrOrEq
                    } else {
                        TokenKind::OrOr
                    }
                } else {
                    TokenKind::Pipe
                }
            }

            // `?`, `??`, `??=`, `?.`
            // `?.` followed by a digit is a conditional with a number: `a?.5:b`
            '?' => match self.peek_char() {
                Some('?') => {
                    self.advance();
                    if self.eat_char('=') {
                        TokenKind::QuestionQuestionEq
                    } else {
                        TokenKind::QuestionQuestion
                    }
                }
                Some('.') if !self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.advance();
                    TokenKind::QuestionDot
                }
                _ => TokenKind::Question,
            },

            // String literal - 字符串字面量
            '"' | '\'' => self.string_literal(ch),

            // Numbers - 数字
            '0'..='9' => self.number(ch),

            // Identifiers and keywords - 标识符和关键字
            c if is_ident_start(c) => self.identifier(c),

            _ => {
                self.error_unexpected_char(ch, start);
                TokenKind::Error
            }
        };

        Token::new(kind, Span::new(start, self.pos))
    }

    /// Advance to the next character.
    /// 前进到下一个字符。
    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.pos = pos + ch.len_utf8();
        }
        result
    }

    /// Consume the next character if it is `expected`.
    fn eat_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at the next character without consuming it.
    /// 查看下一个字符但不消耗它。
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    /// Peek at the nth character ahead.
    /// 查看前方第 n 个字符。
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, ch)| ch)
    }

    /// Skip whitespace and comments.
    ///
    /// Returns an `Error` token for an unterminated block comment so the
    /// caller still sees a token at that position.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_nth(1) == Some('/') => {
                    while let Some(ch) = self.peek_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_nth(1) == Some('*') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    if !self.skip_block_comment() {
                        let span = Span::new(start, self.pos);
                        self.diagnostics.push(
                            Diagnostic::error(
                                DiagnosticKind::Lexer,
                                span,
                                "unterminated block comment",
                            )
                            .with_code(ErrorCode::UnterminatedComment),
                        );
                        return Some(Token::new(TokenKind::Error, span));
                    }
                }
                _ => return None,
            }
        }
    }

    /// Skip the body of a `/* ... */` comment. Returns false at end of input.
    /// 跳过块注释主体；到达输入末尾时返回 false。
    fn skip_block_comment(&mut self) -> bool {
        while let Some((_, ch)) = self.advance() {
            if ch == '*' && self.eat_char('/') {
                return true;
            }
        }
        false
    }

    /// Parse a string literal delimited by `quote`.
    /// 解析由 `quote` 包围的字符串字面量。
    fn string_literal(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();
        let start = self.pos - 1;
        let mut valid = true;

        loop {
            match self.advance() {
                Some((_, ch)) if ch == quote => break,
                Some((_, '\\')) => match self.escape_char() {
                    Some(Some(escaped)) => value.push(escaped),
                    Some(None) => {}
                    None => valid = false,
                },
                Some((_, '\n')) | None => {
                    let span = Span::new(start, self.pos);
                    self.diagnostics.push(
                        Diagnostic::error(DiagnosticKind::Lexer, span, "unterminated string")
                            .with_code(ErrorCode::UnterminatedString)
                            .with_label(Label::new(span, "string starts here")),
                    );
                    return TokenKind::Error;
                }
                Some((_, ch)) => value.push(ch),
            }
        }

        if valid {
            TokenKind::String(value)
        } else {
            TokenKind::Error
        }
    }

    /// Parse an escape sequence after `\`.
    /// 解析 `\` 之后的转义序列。
    ///
    /// `Some(None)` is a line continuation, which contributes nothing.
    /// `None` means the escape was invalid and a diagnostic was recorded.
    fn escape_char(&mut self) -> Option<Option<char>> {
        let escape_start = self.pos - 1;
        let ch = match self.advance() {
            Some((_, 'n')) => '\n',
            Some((_, 'r')) => '\r',
            Some((_, 't')) => '\t',
            Some((_, 'b')) => '\u{8}',
            Some((_, 'f')) => '\u{c}',
            Some((_, 'v')) => '\u{b}',
            Some((_, '0')) if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) => '\0',
            Some((_, '\n')) => return Some(None),
            Some((_, '\r')) => {
                self.eat_char('\n');
                return Some(None);
            }
            Some((_, 'x')) => return self.hex_escape(escape_start, 2).map(Some),
            Some((_, 'u')) => return self.unicode_escape(escape_start).map(Some),
            Some((_, c)) if c.is_ascii_digit() => {
                self.invalid_escape(escape_start, "octal escape sequences are not allowed");
                return None;
            }
            // Any other character escapes to itself: `\'`, `\"`, `\\`, `\q`
            Some((_, c)) => c,
            None => return Some(None),
        };
        Some(Some(ch))
    }

    /// Read exactly `digits` hex digits as a code point.
    fn hex_escape(&mut self, escape_start: usize, digits: usize) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            match self.peek_char().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    self.advance();
                    code = code * 16 + d;
                }
                None => {
                    self.invalid_escape(escape_start, "malformed hexadecimal escape");
                    return None;
                }
            }
        }
        Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// `\uXXXX` or `\u{X...}`, combining UTF-16 surrogate pairs.
    fn unicode_escape(&mut self, escape_start: usize) -> Option<char> {
        if self.eat_char('{') {
            let mut code = 0u32;
            let mut seen = false;
            while let Some(d) = self.peek_char().and_then(|c| c.to_digit(16)) {
                self.advance();
                seen = true;
                code = code.saturating_mul(16).saturating_add(d);
            }
            if !seen || !self.eat_char('}') || code > 0x10FFFF {
                self.invalid_escape(escape_start, "malformed unicode escape");
                return None;
            }
            return Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        let high = self.hex_escape(escape_start, 4)? as u32;
        if !(0xD800..0xDC00).contains(&high) {
            return Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        // A high surrogate is only meaningful when a low one follows.
        // 高代理项后必须跟随低代理项。
        if self.peek_char() == Some('\\') && self.peek_nth(1) == Some('u') {
            let low_start = self.pos;
            self.advance();
            self.advance();
            let low = self.hex_escape(low_start, 4)? as u32;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
        Some(char::REPLACEMENT_CHARACTER)
    }

    fn invalid_escape(&mut self, start: usize, message: &str) {
        let span = Span::new(start, self.pos);
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Lexer, span, message)
                .with_code(ErrorCode::InvalidEscape),
        );
    }

    /// Parse a number literal. All JavaScript numbers are doubles.
    /// 解析数字字面量；JavaScript 中所有数字都是双精度浮点数。
    fn number(&mut self, first: char) -> TokenKind {
        let start = self.pos - first.len_utf8();

        // Check for hex, octal, binary - 检查十六进制、八进制、二进制
        if first == '0' {
            let radix = match self.peek_char() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                return self.radix_number(start, radix);
            }
        }

        let mut value = String::new();
        value.push(first);

        // Integer part (or the fraction when the literal began with `.`)
        // 整数部分（以 `.` 开头时为小数部分）
        self.digits(&mut value);

        // Decimal part - 小数部分
        if first != '.' && self.peek_char() == Some('.') {
            self.advance();
            value.push('.');
            self.digits(&mut value);
        }

        // Exponent - 指数部分
        if let Some('e' | 'E') = self.peek_char() {
            let sign = self.peek_nth(1);
            let has_digits = match sign {
                Some('+' | '-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                self.advance();
                value.push('e');
                if let Some(sign @ ('+' | '-')) = sign {
                    self.advance();
                    value.push(sign);
                }
                self.digits(&mut value);
            }
        }

        if self.peek_char().is_some_and(is_ident_start) {
            return self.invalid_number(start, "identifier starts immediately after number");
        }

        match value.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => self.invalid_number(start, "invalid number literal"),
        }
    }

    /// Decimal digits with `_` separators.
    fn digits(&mut self, value: &mut String) {
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                value.push(ch);
                self.advance();
            } else if ch == '_' && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse a `0x`/`0o`/`0b` number.
    /// 解析 `0x`/`0o`/`0b` 数字。
    fn radix_number(&mut self, start: usize, radix: u32) -> TokenKind {
        let mut value = 0f64;
        let mut seen = false;

        while let Some(ch) = self.peek_char() {
            if let Some(d) = ch.to_digit(radix) {
                value = value * radix as f64 + d as f64;
                seen = true;
                self.advance();
            } else if ch == '_' && seen {
                self.advance();
            } else {
                break;
            }
        }

        if !seen || self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return self.invalid_number(start, "invalid digit in number literal");
        }
        TokenKind::Number(value)
    }

    fn invalid_number(&mut self, start: usize, message: &str) -> TokenKind {
        while self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let span = Span::new(start, self.pos);
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Lexer, span, message)
                .with_code(ErrorCode::InvalidNumber),
        );
        TokenKind::Error
    }

    /// Parse an identifier or keyword.
    /// 解析标识符或关键字。
    fn identifier(&mut self, first: char) -> TokenKind {
        let mut value = String::from(first);

        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Check for keywords - 检查是否为关键字
        TokenKind::keyword_from_str(&value).unwrap_or(TokenKind::Ident(value))
    }

    /// Report an unexpected character error.
    /// 报告意外字符错误。
    fn error_unexpected_char(&mut self, ch: char, pos: usize) {
        let span = Span::new(pos, self.pos);
        self.diagnostics.push(
            Diagnostic::error(
                DiagnosticKind::Lexer,
                span,
                format!("unexpected character: '{}'", ch),
            )
            .with_code(ErrorCode::UnexpectedCharacter)
            .with_label(Label::new(span, "unexpected character here")),
        );
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("a >>>= b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::UShr,
                TokenKind::Eq,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("!==")[0], TokenKind::BangEqEq);
        assert_eq!(kinds("??=")[0], TokenKind::QuestionQuestionEq);
    }

    #[test]
    fn optional_chain_vs_conditional_number() {
        assert_eq!(kinds("a?.b")[1], TokenKind::QuestionDot);
        assert_eq!(
            kinds("a?.5:1")[1..3],
            [TokenKind::Question, TokenKind::Number(0.5)]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("1 /* two */ + // three\n 4"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(4.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn surrogate_pair_escape() {
        assert_eq!(kinds(r#""\uD83D\uDE00""#)[0], TokenKind::String("😀".into()));
        assert_eq!(kinds(r#"'\u{41}\x42'"#)[0], TokenKind::String("AB".into()));
    }

    #[test]
    fn spans_cover_token_text() {
        let source = "foo.bar";
        let (tokens, _) = Lexer::new(source).tokenize();
        assert_eq!(tokens[2].span.slice(source), "bar");
    }
}
