//! Lexical analysis for macrofold.
//! macrofold 词法分析模块。
//!
//! Converts JavaScript source text into tokens for the expression parser.
//! 将 JavaScript 源代码转换为供表达式解析器使用的 token 序列。

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
