//! Integration tests for macrofold-lexer crate.

use macrofold_diagnostic::ErrorCode;
use macrofold_lexer::{Lexer, TokenKind};

fn lex(source: &str) -> Vec<TokenKind> {
    let lexer = Lexer::new(source);
    let (tokens, _) = lexer.tokenize();
    tokens.into_iter().map(|t| t.kind).collect()
}

fn lex_with_errors(source: &str) -> (Vec<TokenKind>, Vec<Option<ErrorCode>>) {
    let lexer = Lexer::new(source);
    let (tokens, errors) = lexer.tokenize();
    (
        tokens.into_iter().map(|t| t.kind).collect(),
        errors.into_iter().map(|e| e.code).collect(),
    )
}

// ============================================================================
// Basic Token Tests
// ============================================================================

#[test]
fn test_keywords() {
    assert_eq!(
        lex("import from as const let var true false null void typeof"),
        vec![
            TokenKind::Import,
            TokenKind::From,
            TokenKind::As,
            TokenKind::Const,
            TokenKind::Let,
            TokenKind::Var,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::Void,
            TokenKind::Typeof,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_identifiers() {
    assert_eq!(
        lex("$el _private undefinedValue"),
        vec![
            TokenKind::Ident("$el".into()),
            TokenKind::Ident("_private".into()),
            TokenKind::Ident("undefinedValue".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(
        lex("42 3.5 .25 1e3 0x1F 0o17 0b101"),
        vec![
            TokenKind::Number(42.0),
            TokenKind::Number(3.5),
            TokenKind::Number(0.25),
            TokenKind::Number(1000.0),
            TokenKind::Number(31.0),
            TokenKind::Number(15.0),
            TokenKind::Number(5.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_strings() {
    assert_eq!(
        lex(r#"'single' "double" "tab\tnew\nline" 'it\'s'"#),
        vec![
            TokenKind::String("single".into()),
            TokenKind::String("double".into()),
            TokenKind::String("tab\tnew\nline".into()),
            TokenKind::String("it's".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        lex("a ?? b?.c ... ** === !== >>>"),
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::QuestionQuestion,
            TokenKind::Ident("b".into()),
            TokenKind::QuestionDot,
            TokenKind::Ident("c".into()),
            TokenKind::Ellipsis,
            TokenKind::StarStar,
            TokenKind::EqEqEq,
            TokenKind::BangEqEq,
            TokenKind::UShr,
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_unterminated_string() {
    let (_, errors) = lex_with_errors("'never closed");
    assert_eq!(errors, vec![Some(ErrorCode::UnterminatedString)]);
}

#[test]
fn test_unterminated_comment() {
    let (tokens, errors) = lex_with_errors("1 /* open");
    assert_eq!(tokens.first(), Some(&TokenKind::Number(1.0)));
    assert_eq!(errors, vec![Some(ErrorCode::UnterminatedComment)]);
}

#[test]
fn test_unexpected_character_keeps_going() {
    let (tokens, errors) = lex_with_errors("1 # 2");
    assert_eq!(errors, vec![Some(ErrorCode::UnexpectedCharacter)]);
    assert!(tokens.contains(&TokenKind::Number(2.0)));
    assert_eq!(tokens.last(), Some(&TokenKind::Eof));
}
