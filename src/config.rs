use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the generated tree, both in the work dir and at the destination.
pub const OUTPUT_DIR_NAME: &str = "api_docs";

pub const URL_QUESTION: &str = "Copy the correct path to download the swagger.json file, e.g.: http://localhost:5033/swagger/v1/swagger.json: ";
pub const BASE_PATH_QUESTION: &str = "Enter the basepath, e.g.: /api/ to remove from /api/Users/{id} => export const Users_id = (id: any) => `Users/${id}`: ";

/// Everything a run needs, fixed before the first side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub source_url: String,
    pub base_path: String,
    pub output_dir: Option<PathBuf>,
    pub flatten_folders: bool,
    pub lowercase_names: bool,
    /// Holds the scratch files and the default `api_docs` tree.
    pub work_dir: PathBuf,
}

impl GenerationConfig {
    pub fn new(source_url: impl Into<String>, base_path: impl Into<String>) -> Result<Self> {
        let source_url = Into::<String>::into(source_url).trim().to_string();
        let base_path = Into::<String>::into(base_path).trim().to_string();

        reqwest::Url::parse(&source_url)
            .with_context(|| format!("`{source_url}` is not an absolute URL"))?;
        if base_path.is_empty() {
            bail!("base path must not be empty");
        }

        Ok(Self {
            source_url,
            base_path,
            output_dir: None,
            flatten_folders: false,
            lowercase_names: false,
            work_dir: default_work_dir(),
        })
    }

    pub fn output_root(&self) -> PathBuf {
        self.work_dir.join(OUTPUT_DIR_NAME)
    }
}

pub fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("api-docs-generator")
}

/// On-disk copy of the run configuration, kept only while the run lasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchConfig {
    #[serde(rename = "PATH")]
    pub path: String,
    #[serde(rename = "BASEPATH")]
    pub base_path: String,
}

impl From<&GenerationConfig> for ScratchConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            path: config.source_url.clone(),
            base_path: config.base_path.clone(),
        }
    }
}

/// Ask `question` until a non-blank answer arrives. End of input is an error.
pub fn prompt_until_answered<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<String> {
    loop {
        write!(output, "{question}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            ));
        }

        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}
