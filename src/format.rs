use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{FormatError, WriteError};

/// Source formatter applied to each generated file once it is complete.
pub trait Formatter {
    fn format(&self, source: &str, path: &Path) -> Result<String, FormatError>;
}

/// Leaves files exactly as generated.
pub struct NoFormat;

impl Formatter for NoFormat {
    fn format(&self, source: &str, _path: &Path) -> Result<String, FormatError> {
        Ok(source.to_string())
    }
}

/// Pipes the file through prettier's TypeScript parser.
pub struct Prettier {
    program: String,
    leading_args: Vec<String>,
}

impl Default for Prettier {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            leading_args: vec!["--yes".to_string(), "prettier".to_string()],
        }
    }
}

impl Prettier {
    /// Use an explicit prettier executable instead of `npx prettier`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }
}

impl Formatter for Prettier {
    fn format(&self, source: &str, path: &Path) -> Result<String, FormatError> {
        let spawn_error = |source: std::io::Error| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.leading_args)
            .arg("--stdin-filepath")
            .arg(path)
            .args([
                "--parser",
                "typescript",
                "--single-quote",
                "--trailing-comma",
                "all",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(source.as_bytes()) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_error(err));
            }
        }
        let output = child.wait_with_output().map_err(spawn_error)?;

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}

/// Re-read `path`, format it and write it back. The file is left untouched
/// when formatting fails.
pub fn format_file(path: &Path, formatter: &dyn Formatter) -> Result<(), WriteError> {
    let content = fs::read_to_string(path).map_err(|source| WriteError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let formatted = formatter
        .format(&content, path)
        .map_err(|source| WriteError::Format {
            path: path.to_path_buf(),
            source,
        })?;

    if formatted != content {
        fs::write(path, formatted).map_err(|source| WriteError::Append {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
