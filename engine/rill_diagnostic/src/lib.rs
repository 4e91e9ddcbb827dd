//! Rill Diagnostic - error presentation for the rill engine.
//!
//! The evaluator reports failures as structured runtime errors; this crate
//! holds the pieces embedders use to present them: severity levels, a
//! renderable [`Diagnostic`], and line/column resolution of byte spans
//! against the original source text. The engine itself never prints.

mod span_utils;

use std::fmt;

use rill_ir::Span;

pub use span_utils::{line_number, offset_to_line_col};

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A presentable diagnostic: message, optional primary span, and the call
/// trail leading to it (innermost first).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    /// Call-trail lines, innermost call first ("in f, called at 12..15").
    pub trail: Vec<TrailLine>,
}

/// One line of a diagnostic's call trail.
#[derive(Clone, Debug)]
pub struct TrailLine {
    /// Function or member name at this frame.
    pub name: String,
    /// Call-site span, when the frame had one.
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create an error diagnostic with no span or trail.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            span: None,
            trail: Vec::new(),
        }
    }

    /// Attach the primary span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach call-trail lines (innermost first).
    #[must_use]
    pub fn with_trail(mut self, trail: Vec<TrailLine>) -> Self {
        self.trail = trail;
        self
    }

    /// Render against the source text, resolving spans to line:column.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        match self.span {
            Some(span) => {
                let (line, col) = offset_to_line_col(source, span.start);
                out.push_str(&format!("{}: {} at {line}:{col}", self.severity, self.message));
            }
            None => out.push_str(&format!("{}: {}", self.severity, self.message)),
        }
        for frame in &self.trail {
            out.push('\n');
            match frame.span {
                Some(span) => {
                    let (line, col) = offset_to_line_col(source, span.start);
                    out.push_str(&format!("  in {}, called at {line}:{col}", frame.name));
                }
                None => out.push_str(&format!("  in {}", frame.name)),
            }
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        for frame in &self.trail {
            write!(f, "\n  in {}", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " at {span}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_resolves_line_and_column() {
        let source = "a\nbb\nccc";
        let diag = Diagnostic::error("undefined variable 'x'").with_span(Span::new(5, 6));
        let rendered = diag.render(source);
        assert_eq!(rendered, "error: undefined variable 'x' at 3:1");
    }

    #[test]
    fn render_includes_trail() {
        let source = "f()\ng()";
        let diag = Diagnostic::error("boom").with_trail(vec![
            TrailLine {
                name: "g".to_owned(),
                span: Some(Span::new(4, 7)),
            },
            TrailLine {
                name: "f".to_owned(),
                span: Some(Span::new(0, 3)),
            },
        ]);
        let rendered = diag.render(source);
        assert!(rendered.contains("in g, called at 2:1"));
        assert!(rendered.contains("in f, called at 1:1"));
    }

    #[test]
    fn display_without_source() {
        let diag = Diagnostic::error("no value specified for parameter 'b'");
        assert_eq!(
            diag.to_string(),
            "error: no value specified for parameter 'b'"
        );
    }
}
