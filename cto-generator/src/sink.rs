//! Destinations for generated CTO text.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::GenerateError;
use crate::buffer::LineBuffer;

/// Receives the lines of one output unit at a time.
pub trait OutputSink {
    fn open_unit(&mut self, name: &str) -> Result<(), GenerateError>;

    fn write_line(&mut self, indent: usize, text: &str) -> Result<(), GenerateError>;

    /// Inserts a top-level line at an absolute line position of the open unit.
    fn write_before_line(&mut self, position: usize, text: &str) -> Result<(), GenerateError>;

    fn close_unit(&mut self) -> Result<(), GenerateError>;
}

/// Writes each unit to `<output_dir>/<name>` when it is closed.
#[derive(Debug)]
pub struct FileSink {
    output_dir: PathBuf,
    open: Option<LineBuffer>,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            open: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn current(&mut self) -> Result<&mut LineBuffer, GenerateError> {
        self.open.as_mut().ok_or(GenerateError::NoOpenUnit)
    }
}

impl OutputSink for FileSink {
    fn open_unit(&mut self, name: &str) -> Result<(), GenerateError> {
        let mut buffer = LineBuffer::new();
        buffer.open_unit(name)?;
        self.open = Some(buffer);
        Ok(())
    }

    fn write_line(&mut self, indent: usize, text: &str) -> Result<(), GenerateError> {
        self.current()?.push_line(indent, text);
        Ok(())
    }

    fn write_before_line(&mut self, position: usize, text: &str) -> Result<(), GenerateError> {
        self.current()?.insert_line(position, 0, text);
        Ok(())
    }

    fn close_unit(&mut self) -> Result<(), GenerateError> {
        let buffer = self.open.take().ok_or(GenerateError::NoOpenUnit)?;
        let name = buffer.unit().ok_or(GenerateError::NoOpenUnit)?;
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(name);
        fs::write(&path, buffer.render())?;
        debug!(path = %path.display(), lines = buffer.len(), "wrote output unit");
        Ok(())
    }
}
