use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::config::OUTPUT_DIR_NAME;

/// Shows the user where the generated tree ended up.
pub trait Reveal {
    fn reveal(&self, path: &Path) -> io::Result<()>;
}

/// Opens the platform file manager on the path.
pub struct FileManager;

impl FileManager {
    fn command() -> Option<&'static str> {
        if cfg!(target_os = "windows") {
            Some("explorer")
        } else if cfg!(target_os = "macos") {
            Some("open")
        } else if cfg!(target_os = "linux") {
            Some("xdg-open")
        } else {
            None
        }
    }
}

impl Reveal for FileManager {
    fn reveal(&self, path: &Path) -> io::Result<()> {
        let Some(program) = Self::command() else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("no file manager known for {}", std::env::consts::OS),
            ));
        };

        Command::new(program).arg(path).spawn()?;
        Ok(())
    }
}

/// Reveals nothing; the path is still printed by [`surface`].
pub struct PrintPath;

impl Reveal for PrintPath {
    fn reveal(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

pub fn surface(path: &Path, revealer: &dyn Reveal) {
    if let Err(err) = revealer.reveal(path) {
        tracing::warn!(path = %path.display(), "could not open file manager: {err}");
    }
    println!("💾 show result ---> {}", path.display());
}

/// Move the generated tree to `destination/api_docs`, replacing any tree
/// already there. Returns the new location.
///
/// A destination whose `api_docs` already is `tree` leaves the tree where it
/// is; a destination inside `tree` is rejected.
pub fn relocate(tree: &Path, destination: &Path) -> Result<PathBuf> {
    let tree_real = fs::canonicalize(tree)
        .with_context(|| format!("generated output {} is missing", tree.display()))?;
    let destination_real = resolve(destination);

    if destination_real.join(OUTPUT_DIR_NAME) == tree_real {
        tracing::debug!(tree = %tree_real.display(), "output already at destination");
        return Ok(tree_real);
    }
    if destination_real.starts_with(&tree_real) {
        bail!(
            "cannot move {} into {}, which lies inside it",
            tree_real.display(),
            destination.display()
        );
    }

    let target = destination.join(OUTPUT_DIR_NAME);
    if target.exists() {
        fs::remove_dir_all(&target)
            .with_context(|| format!("failed to replace {}", target.display()))?;
    }
    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    if let Err(err) = fs::rename(tree, &target) {
        tracing::debug!("rename failed ({err}), copying instead");
        copy_dir_all(tree, &target)
            .with_context(|| format!("failed to copy output to {}", target.display()))?;
        fs::remove_dir_all(tree)
            .with_context(|| format!("failed to remove {}", tree.display()))?;
    }

    let target = fs::canonicalize(&target).unwrap_or(target);
    tracing::info!(target = %target.display(), "output relocated");
    Ok(target)
}

/// Canonical form of `path`, which may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing tail appended.
fn resolve(path: &Path) -> PathBuf {
    let absolute = match std::env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };

    for ancestor in absolute.ancestors() {
        if let Ok(real) = fs::canonicalize(ancestor) {
            let missing = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return real.join(missing);
        }
    }
    absolute
}

fn copy_dir_all(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
