//! Output management for CLI commands.
//!
//! Run reports and errors go to stderr in either text or JSON form. Stdout
//! is reserved for archive data written to `-` and for the `config` dump.

use crate::error::PipelineError;
use crate::io::exit_code::ExitCode;
use crate::io::format::{JsonResponse, OutputFormat, ResponseMeta};
use crate::pipeline::RunSummary;
use std::io::{self, Write};

/// Manages report formatting and display.
pub struct OutputManager {
    format: OutputFormat,
    stderr: Box<dyn Write>,
}

impl OutputManager {
    /// Create a new output manager with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            stderr: Box::new(io::stderr()),
        }
    }

    /// Create an output manager for testing with a custom writer.
    #[cfg(test)]
    pub fn new_with_writer(format: OutputFormat, stderr: Box<dyn Write>) -> Self {
        Self { format, stderr }
    }

    /// Report a finished run and return the exit code its summary implies.
    pub fn report<S>(&mut self, summary: S, execution_time_ms: u64) -> io::Result<ExitCode>
    where
        S: RunSummary,
    {
        let code = summary.exit_code();
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::from_summary(summary)
                    .with_meta(ResponseMeta::now(Some(execution_time_ms)));
                writeln!(self.stderr, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                writeln!(self.stderr, "{summary}")?;
            }
        }
        self.stderr.flush()?;
        Ok(code)
    }

    /// Output a fatal error with suggestions.
    pub fn error(&mut self, error: &PipelineError) -> io::Result<ExitCode> {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::from_error(error).with_meta(ResponseMeta::now(None));
                writeln!(self.stderr, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                writeln!(self.stderr, "Error: {error}")?;
                for suggestion in error.recovery_suggestions() {
                    writeln!(self.stderr, "  Suggestion: {suggestion}")?;
                }
            }
        }
        self.stderr.flush()?;
        Ok(ExitCode::from_error(error))
    }
}
