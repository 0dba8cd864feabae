use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::ScratchConfig;

pub const CONFIG_FILE: &str = "config.json";
pub const DOCUMENT_FILE: &str = "paths.json";

/// Run configuration and fetched document, alive for one run only.
///
/// Both files are removed by [`ScratchState::purge`] and again on drop, so an
/// early return or a panic does not leave them behind.
#[derive(Debug)]
pub struct ScratchState {
    dir: PathBuf,
}

impl ScratchState {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    pub fn save_config(&self, config: &ScratchConfig) -> Result<()> {
        let path = self.config_path();
        let json = serde_json::to_string(config)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn save_document(&self, document: &Value) -> Result<()> {
        let path = self.document_path();
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn load_document(&self) -> Result<Value> {
        let path = self.document_path();
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
    }

    /// Remove both files. Missing files are fine.
    pub fn purge(&self) -> io::Result<()> {
        for path in [self.document_path(), self.config_path()] {
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed scratch file"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

impl Drop for ScratchState {
    fn drop(&mut self) {
        if let Err(err) = self.purge() {
            tracing::warn!(dir = %self.dir.display(), "failed to remove scratch files: {err}");
        }
    }
}
