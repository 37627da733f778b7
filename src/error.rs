//! Compiler diagnostics.
//!
//! Every fatal error carries the offending source line where one exists, so
//! the CLI can print the line and its surroundings without consulting any
//! other compiler state.

use std::{fmt::Write, path::PathBuf};

use colored::Colorize;
use thiserror::Error;

use crate::frontend::{SourceFile, lexer::Span};

/// A 1-based source line plus its literal text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub text: String,
}

impl Location {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    pub fn of_span(source: &SourceFile, span: Span) -> Self {
        let line = source.line_for_position(span.start);
        Self::new(line, source.line_text(line).trim_end())
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: `{}`", self.line, self.text.trim())
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("syntax error: {message} ({location})")]
    Syntax { message: String, location: Location },

    #[error("unsupported construct: {construct} ({location})")]
    Unsupported {
        construct: String,
        location: Location,
    },

    #[error("unresolved symbol `{name}` ({location})")]
    UnresolvedSymbol { name: String, location: Location },

    #[error("`{name}` is already declared in scope `{layer}` ({location})")]
    DuplicateSymbol {
        name: String,
        layer: String,
        location: Location,
    },

    #[error("malformed program: {message}{}", display_optional_location(.location))]
    MalformedProgram {
        message: String,
        location: Option<Location>,
        detail: String,
    },

    #[error("failed to write `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_optional_location(location: &Option<Location>) -> String {
    location
        .as_ref()
        .map(|location| format!(" ({location})"))
        .unwrap_or_default()
}

pub type Result<T, E = CompileError> = core::result::Result<T, E>;

impl CompileError {
    pub fn syntax(source: &SourceFile, span: Span, message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            location: Location::of_span(source, span),
        }
    }

    pub fn unsupported(source: &SourceFile, span: Span, construct: impl Into<String>) -> Self {
        Self::Unsupported {
            construct: construct.into(),
            location: Location::of_span(source, span),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedProgram {
            message: message.into(),
            location: None,
            detail: String::new(),
        }
    }

    pub fn with_detail(mut self, extra: impl Into<String>) -> Self {
        if let Self::MalformedProgram { detail, .. } = &mut self {
            *detail = extra.into();
        }

        self
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Syntax { location, .. }
            | Self::Unsupported { location, .. }
            | Self::UnresolvedSymbol { location, .. }
            | Self::DuplicateSymbol { location, .. } => Some(location),
            Self::MalformedProgram { location, .. } => location.as_ref(),
            Self::Io { .. } => None,
        }
    }

    /// Renders the error for a terminal: a header, then the offending line
    /// with up to two lines of context on either side.
    pub fn render(&self, source: &SourceFile) -> String {
        let mut out = format!("{} {}\n", "error:".red().bold(), self);

        if let Some(location) = self.location() {
            let _ = writeln!(out, "  {} {}", "-->".blue(), source.origin);

            let first = location.line.saturating_sub(2).max(1);
            let last = (location.line + 2).min(source.line_count());

            for line in first..=last {
                let gutter = if line == location.line { ">>" } else { "  " };
                let text = source.line_text(line);

                let rendered = if line == location.line {
                    format!("{} {:>4} | {}", gutter.red().bold(), line, text.bold())
                } else {
                    format!("{} {:>4} | {}", gutter, line, text.dimmed())
                };

                let _ = writeln!(out, "{rendered}");
            }
        }

        if let Self::MalformedProgram { detail, .. } = self {
            if !detail.is_empty() {
                let _ = writeln!(out, "{detail}");
            }
        }

        out
    }
}
