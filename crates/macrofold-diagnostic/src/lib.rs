//! Diagnostic and error reporting for macrofold.
//! macrofold 的诊断和错误报告。
//!
//! Lexer and parser problems are collected as [`Diagnostic`]s rather than
//! aborting; this crate renders them with ariadne.
//! 词法和语法问题以 [`Diagnostic`] 的形式收集，由 ariadne 渲染。

mod codes;
mod diagnostic;

pub use codes::ErrorCode;
pub use diagnostic::{Diagnostic, DiagnosticKind, Label, Severity};

use ariadne::{Config, Label as AriadneLabel, Report, ReportKind, Source};

fn build_report<'a>(
    filename: &'a str,
    diagnostic: &Diagnostic,
) -> Report<'a, (&'a str, std::ops::Range<usize>)> {
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };

    let mut report = Report::build(kind, filename, diagnostic.span.start.0 as usize)
        .with_config(Config::default().with_color(false))
        .with_message(&diagnostic.message);

    if let Some(code) = &diagnostic.code {
        report = report.with_code(code.as_str());
    }

    for label in &diagnostic.labels {
        report = report.with_label(
            AriadneLabel::new((filename, label.span.range())).with_message(&label.message),
        );
    }

    if let Some(help) = &diagnostic.help {
        report = report.with_help(help);
    }

    report.finish()
}

/// Render a diagnostic to a plain (uncolored) string.
/// 将诊断信息渲染为不带颜色的字符串。
pub fn render(source: &str, filename: &str, diagnostic: &Diagnostic) -> String {
    let mut out = Vec::new();
    if build_report(filename, diagnostic)
        .write((filename, Source::from(source)), &mut out)
        .is_err()
    {
        return diagnostic.message.clone();
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Render every diagnostic, one after another.
pub fn render_all(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| render(source, filename, d))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofold_common::Span;

    #[test]
    fn render_contains_message_and_code() {
        let span = Span::new(2, 3);
        let diagnostic = Diagnostic::error(DiagnosticKind::Parser, span, "expected expression")
            .with_code(ErrorCode::ExpectedExpression)
            .with_label(Label::new(span, "here"));
        let text = render("a(;", "input.js", &diagnostic);
        assert!(text.contains("expected expression"));
        assert!(text.contains("E0101"));
    }

    #[test]
    fn code_supplies_default_help() {
        let diagnostic = Diagnostic::error(DiagnosticKind::Lexer, Span::DUMMY, "oops")
            .with_code(ErrorCode::UnterminatedString);
        assert_eq!(diagnostic.help.as_deref(), Some("add the matching closing quote"));
        assert!(diagnostic.is_error());
    }
}
