//! External markup compiler interface

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Failed to start compiler `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error talking to compiler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compiler exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Compiler rejected markup: {0}")]
    Rejected(String),
}

/// Output of one compiler run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOutput {
    pub html: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl CompilerOutput {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            warnings: Vec::new(),
        }
    }
}

/// Compiles one markup-dialect document into a full HTML document
pub trait MarkupCompiler {
    fn compile(&self, markup: &str) -> Result<CompilerOutput, CompilerError>;
}

impl<F> MarkupCompiler for F
where
    F: Fn(&str) -> Result<CompilerOutput, CompilerError>,
{
    fn compile(&self, markup: &str) -> Result<CompilerOutput, CompilerError> {
        self(markup)
    }
}

/// Runs an external compiler binary: markup on stdin, HTML on stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompiler {
    pub command: String,
    pub args: Vec<String>,
}

impl CommandCompiler {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl Default for CommandCompiler {
    /// `mjml -i -s`: read stdin, write stdout
    fn default() -> Self {
        Self::new("mjml", vec!["-i".to_string(), "-s".to_string()])
    }
}

impl MarkupCompiler for CommandCompiler {
    fn compile(&self, markup: &str) -> Result<CompilerOutput, CompilerError> {
        debug!(command = %self.command, bytes = markup.len(), "Invoking markup compiler");

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompilerError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(markup.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(CompilerError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let warnings = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(CompilerOutput {
            html: String::from_utf8_lossy(&output.stdout).into_owned(),
            warnings,
        })
    }
}
