use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while retrieving the API document. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not connect to {url}: the server is off or the URL is incorrect")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_connection(&self) -> bool {
        matches!(self, FetchError::Connection { .. })
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("document has no `paths` object")]
    MissingPaths,
}

/// Reasons a single endpoint cannot become a declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("path `{api_path}` leaves nothing to name once the base path is removed")]
    EmptyName { api_path: String },

    #[error("`{name}` is already declared in this file (from `{api_path}`)")]
    DuplicateName { name: String, api_path: String },
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {code}: {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("`{program}` produced output that is not UTF-8")]
    InvalidOutput { program: String },
}

/// Per-record or per-file failure. Logged and collected, never fatal.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("failed to write {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read back {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to format {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}
