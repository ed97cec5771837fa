//! Output formatting and writing utilities
//!
//! Human output renders validation failures as an indented tree. JSON
//! output emits the canonical `ErrorInfo` projection so other tools can
//! consume it.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;
use vigil_schemas::{EngineError, ValidationError};

/// Writes command results in the selected format
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "✓".green(), message.green()))
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = match self.format {
            OutputFormat::Human => serde_json::to_string_pretty(value)?,
            OutputFormat::Json => serde_json::to_string(value)?,
        };
        trace!(bytes = formatted.len(), "Writing data");
        self.writeln(&formatted)
    }

    /// Write an engine failure: a tree for humans, `ErrorInfo` for machines
    pub fn engine_error(&mut self, error: &EngineError) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.data(&error.info()),
            OutputFormat::Human => {
                let rendered = match error {
                    EngineError::Validation(error) => render_error_tree(error, self.use_color),
                    EngineError::Schema(error) => {
                        let line = format!("schema error: '{}' at {} ({})", error.kind, error.scope, error.info);
                        if self.use_color {
                            line.red().to_string()
                        } else {
                            line
                        }
                    }
                };
                self.writeln(&rendered)
            }
        }
    }

    /// Write a list of names, one per line in human mode
    pub fn list(&mut self, title: &str, items: &[&str]) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.data(&items),
            OutputFormat::Human => {
                if !self.quiet {
                    let title = format!("{} ({})", title, items.len());
                    if self.use_color {
                        self.writeln(&title.bold().to_string())?;
                    } else {
                        self.writeln(&title)?;
                    }
                }
                for item in items {
                    self.writeln(&format!("  {}", item))?;
                }
                Ok(())
            }
        }
    }
}

/// Render a validation failure and its causes as an indented tree
pub fn render_error_tree(error: &ValidationError, use_color: bool) -> String {
    let mut lines = Vec::new();
    render_node(error, 0, use_color, &mut lines);
    lines.join("\n")
}

fn render_node(error: &ValidationError, depth: usize, use_color: bool, lines: &mut Vec<String>) {
    let path = if error.path.is_empty() { "/" } else { &error.path };
    let indent = "  ".repeat(depth);
    let line = if use_color {
        format!(
            "{}{} {} at {} {}",
            indent,
            "✗".red(),
            error.kind.bold(),
            path.cyan(),
            format!("({})", error.scope).dimmed()
        )
    } else {
        format!("{}- {} at {} ({})", indent, error.kind, path, error.scope)
    };
    lines.push(line);

    for nested in &error.nested {
        render_node(nested, depth + 1, use_color, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn sample_error() -> ValidationError {
        ValidationError::with_nested(
            "",
            "#/properties",
            "properties",
            vec![ValidationError::new("/a", "#/properties/a/type", "type")],
        )
    }

    #[test]
    fn test_render_error_tree() {
        let rendered = render_error_tree(&sample_error(), false);
        assert_eq!(
            rendered,
            "- properties at / (#/properties)\n  - type at /a (#/properties/a/type)"
        );
    }

    #[test]
    fn test_json_error_output() {
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(buffer.clone()));
        output.engine_error(&EngineError::Validation(sample_error())).unwrap();

        let written: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(
            written,
            json!({
                "type": "properties",
                "path": "",
                "scope": "#/properties",
                "errors": [{"type": "type", "path": "/a", "scope": "#/properties/a/type"}]
            })
        );
    }

    #[test]
    fn test_messages_suppressed_in_json_mode() {
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(buffer.clone()));
        output.info("loading").unwrap();
        output.success("valid").unwrap();
        output.warning("careful").unwrap();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_quiet_human_output() {
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(buffer.clone()));
        output.success("valid").unwrap();
        output.warning("careful").unwrap();
        assert_eq!(buffer.contents(), "WARNING: careful\n");
    }
}
