//! In-memory line buffer for one output unit.

use crate::GenerateError;
use crate::sink::OutputSink;

/// Rendered once per indent level.
pub const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub indent: usize,
    pub text: String,
}

impl Line {
    pub fn render(&self) -> String {
        format!("{}{}", INDENT.repeat(self.indent), self.text)
    }
}

/// Ordered lines of one output unit, kept in memory until flushed.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    unit: Option<String>,
    lines: Vec<Line>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name given by the last `open_unit`, if any.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn push_line(&mut self, indent: usize, text: impl Into<String>) {
        self.lines.push(Line {
            indent,
            text: text.into(),
        });
    }

    /// Inserts a line so that it ends up at `position`; past the end it is appended.
    pub fn insert_line(&mut self, position: usize, indent: usize, text: impl Into<String>) {
        let position = position.min(self.lines.len());
        self.lines.insert(
            position,
            Line {
                indent,
                text: text.into(),
            },
        );
    }

    pub fn entries(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::render).collect()
    }

    /// Whole unit as text, one line per entry, newline terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.render());
            out.push('\n');
        }
        out
    }
}

impl OutputSink for LineBuffer {
    fn open_unit(&mut self, name: &str) -> Result<(), GenerateError> {
        self.unit = Some(name.to_string());
        self.lines.clear();
        Ok(())
    }

    fn write_line(&mut self, indent: usize, text: &str) -> Result<(), GenerateError> {
        self.push_line(indent, text);
        Ok(())
    }

    fn write_before_line(&mut self, position: usize, text: &str) -> Result<(), GenerateError> {
        self.insert_line(position, 0, text);
        Ok(())
    }

    fn close_unit(&mut self) -> Result<(), GenerateError> {
        Ok(())
    }
}
