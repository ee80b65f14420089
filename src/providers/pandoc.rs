use log::debug;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::app_config::ConverterConfig;
use crate::errors::AbstractError;
use crate::providers::MarkupConverter;

/// Runs pandoc (or a compatible command) over stdin/stdout
#[derive(Debug, Clone)]
pub struct Pandoc {
    command: String,
    args: Vec<String>,
}

impl Pandoc {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl MarkupConverter for Pandoc {
    fn convert(&self, latex: &str) -> Result<String, AbstractError> {
        let unavailable = |reason: String| AbstractError::AbstractConversionUnavailable(reason);

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| unavailable(format!("failed to start '{}': {}", self.command, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(latex.as_bytes())
                .map_err(|e| unavailable(format!("failed to write to '{}': {}", self.command, e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| unavailable(format!("'{}' did not finish: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(unavailable(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let markup = String::from_utf8_lossy(&output.stdout).replace('\n', "");
        debug!("Converter produced {} bytes of markup", markup.len());
        Ok(markup)
    }
}
