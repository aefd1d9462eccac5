//! Error codes for macrofold diagnostics.

/// Error codes for categorizing source-level diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer errors (E0001 - E0099)
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape,
    InvalidNumber,

    // Parser errors (E0100 - E0199)
    UnexpectedToken,
    ExpectedExpression,
    UnclosedDelimiter,
    InvalidAssignmentTarget,
    InvalidImport,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "E0001",
            ErrorCode::UnterminatedString => "E0002",
            ErrorCode::UnterminatedComment => "E0003",
            ErrorCode::InvalidEscape => "E0004",
            ErrorCode::InvalidNumber => "E0005",

            ErrorCode::UnexpectedToken => "E0100",
            ErrorCode::ExpectedExpression => "E0101",
            ErrorCode::UnclosedDelimiter => "E0102",
            ErrorCode::InvalidAssignmentTarget => "E0103",
            ErrorCode::InvalidImport => "E0104",
        }
    }

    /// Get a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "unexpected character in input",
            ErrorCode::UnterminatedString => "string literal is not terminated",
            ErrorCode::UnterminatedComment => "block comment is not terminated",
            ErrorCode::InvalidEscape => "invalid escape sequence in string",
            ErrorCode::InvalidNumber => "invalid number literal",

            ErrorCode::UnexpectedToken => "unexpected token",
            ErrorCode::ExpectedExpression => "expected an expression",
            ErrorCode::UnclosedDelimiter => "unclosed delimiter",
            ErrorCode::InvalidAssignmentTarget => "invalid assignment target",
            ErrorCode::InvalidImport => "malformed import declaration",
        }
    }

    /// Get a suggested fix for the error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorCode::UnterminatedString => Some("add the matching closing quote"),
            ErrorCode::UnterminatedComment => Some("add `*/` to close the comment"),
            ErrorCode::UnclosedDelimiter => Some("add the matching closing delimiter"),
            ErrorCode::InvalidAssignmentTarget => {
                Some("only identifiers and member expressions can be assigned to")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_stage() {
        assert!(ErrorCode::InvalidEscape.as_str().starts_with("E00"));
        assert!(ErrorCode::ExpectedExpression.as_str().starts_with("E01"));
        assert_eq!(ErrorCode::UnexpectedToken.description(), "unexpected token");
        assert!(ErrorCode::UnexpectedToken.suggestion().is_none());
    }
}
