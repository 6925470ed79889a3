// ABOUTME: Maps byte offsets to source lines and renders diagnostics

use crate::error::RuntimeError;
use crate::parser::Diagnostic;

/// 1-based line and column for a byte offset. The column is the 1-based byte
/// offset within its line. A CRLF pair counts as one terminator here, even
/// though the scanner absorbs it as two.
pub fn line_col(source: &[u8], offset: usize) -> (usize, usize) {
    let end = offset.min(source.len());
    let mut line = 1;
    let mut col = 1;
    let mut i = 0;
    while i < end {
        match source[i] {
            b'\n' => {
                line += 1;
                col = 1;
            }
            b'\r' => {
                line += 1;
                col = 1;
                if i + 1 < end && source[i + 1] == b'\n' {
                    i += 1;
                }
            }
            _ => col += 1,
        }
        i += 1;
    }
    (line, col)
}

/// The text of the line containing `offset`, without its terminator.
pub fn line_text(source: &[u8], offset: usize) -> String {
    let clamped = offset.min(source.len());
    let start = source[..clamped]
        .iter()
        .rposition(|&b| b == b'\n' || b == b'\r')
        .map_or(0, |p| p + 1);
    let end = source[clamped..]
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .map_or(source.len(), |p| clamped + p);
    String::from_utf8_lossy(&source[start..end]).into_owned()
}

fn caret_line(col: usize, len: usize) -> String {
    let mut marker = " ".repeat(col.saturating_sub(1));
    marker.push('^');
    marker.push_str(&"~".repeat(len.saturating_sub(1)));
    marker
}

/// Renders a parse diagnostic with its source line and a caret marker
/// covering the offending token.
pub fn render_parse_diagnostic(file: &str, source: &[u8], diagnostic: &Diagnostic) -> String {
    let (line, col) = line_col(source, diagnostic.token.start);
    format!(
        "{file}:{line}:{col}: parse error: {message}\n{text}\n{caret}",
        message = diagnostic.message,
        text = line_text(source, diagnostic.token.start),
        caret = caret_line(col, diagnostic.token.len),
    )
}

/// Renders a runtime error with its file and line.
pub fn render_runtime_error(file: &str, source: &[u8], error: &RuntimeError) -> String {
    let (line, _) = line_col(source, error.token.start);
    format!("{file}:{line} runtime error: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{Token, TokenKind};

    #[test]
    fn test_line_col_on_the_first_line() {
        assert_eq!(line_col(b"print x;", 0), (1, 1));
        assert_eq!(line_col(b"print x;", 6), (1, 7));
    }

    #[test]
    fn test_line_col_across_lines() {
        let source = b"var a = 1;\nvar b = 2;\nprint c;";
        assert_eq!(line_col(source, 11), (2, 1));
        assert_eq!(line_col(source, 28), (3, 7));
    }

    #[test]
    fn test_crlf_counts_as_one_terminator_for_numbering() {
        let source = b"a;\r\nb;";
        assert_eq!(line_col(source, 4), (2, 1));
        let source = b"a;\rb;";
        assert_eq!(line_col(source, 3), (2, 1));
    }

    #[test]
    fn test_line_text_extraction() {
        let source = b"first;\nsecond;\nthird;";
        assert_eq!(line_text(source, 0), "first;");
        assert_eq!(line_text(source, 9), "second;");
        assert_eq!(line_text(source, 16), "third;");
    }

    #[test]
    fn test_parse_diagnostic_rendering() {
        let source = b"var x = ;\n";
        let diagnostic = Diagnostic {
            token: Token {
                kind: TokenKind::Semicolon,
                start: 8,
                len: 1,
            },
            message: "Expected expression".to_string(),
        };
        assert_eq!(
            render_parse_diagnostic("demo.lox", source, &diagnostic),
            "demo.lox:1:9: parse error: Expected expression\nvar x = ;\n        ^"
        );
    }

    #[test]
    fn test_caret_covers_the_whole_token() {
        let source = b"print badname;";
        let diagnostic = Diagnostic {
            token: Token {
                kind: TokenKind::Identifier,
                start: 6,
                len: 7,
            },
            message: "Expected expression".to_string(),
        };
        let rendered = render_parse_diagnostic("a.lox", source, &diagnostic);
        assert!(rendered.ends_with("\n      ^~~~~~~"));
    }

    #[test]
    fn test_runtime_error_rendering() {
        let source = b"var a = 1;\nprint missing;";
        let error = RuntimeError::undefined_variable(
            "missing",
            Token {
                kind: TokenKind::Identifier,
                start: 17,
                len: 7,
            },
        );
        assert_eq!(
            render_runtime_error("demo.lox", source, &error),
            "demo.lox:2 runtime error: Undefined variable \"missing\""
        );
    }
}
