use std::path::PathBuf;

use self::lexer::Span;

pub mod ast;
pub mod lexer;
pub mod parser;

#[derive(Debug)]
pub struct SourceFile {
    pub contents: String,
    pub origin: SourceFileOrigin,
    /// Byte offset at which each line starts
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(contents: String, origin: SourceFileOrigin) -> Self {
        let line_starts = std::iter::once(0)
            .chain(contents.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            contents,
            origin,
            line_starts,
        }
    }

    pub fn from_memory(contents: impl Into<String>) -> Self {
        Self::new(contents.into(), SourceFileOrigin::Memory)
    }

    pub fn value_of_span(&self, span: Span) -> &str {
        &self.contents[span.start..span.end]
    }

    /// 1-based line containing the byte at `position`
    pub fn line_for_position(&self, position: usize) -> usize {
        self.line_starts.partition_point(|start| *start <= position)
    }

    pub fn line_count(&self) -> usize {
        match self.contents.ends_with('\n') {
            true => self.line_starts.len() - 1,
            false => self.line_starts.len(),
        }
    }

    /// Text of a 1-based line, without its line terminator. Lines past the end
    /// of the file are empty.
    pub fn line_text(&self, line: usize) -> &str {
        let Some(start) = line.checked_sub(1).and_then(|i| self.line_starts.get(i)) else {
            return "";
        };

        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.contents.len());

        self.contents[*start..end].trim_end_matches(['\n', '\r'])
    }
}

#[derive(Debug, Clone)]
pub enum SourceFileOrigin {
    Memory,
    File(PathBuf),
}

impl core::fmt::Display for SourceFileOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFileOrigin::Memory => f.write_str("<memory>"),
            SourceFileOrigin::File(path) => f.write_fmt(format_args!("{}", path.display())),
        }
    }
}
