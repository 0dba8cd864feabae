use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::error::{GenerateError, WriteError};
use crate::format::{format_file, Formatter};
use crate::generator::render_declaration;
use crate::grouping::Group;
use crate::parser::EndpointRecord;

pub const FILE_EXTENSION: &str = "ts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `api_docs/Users/Users.ts`
    Nested,
    /// `api_docs/Users.ts`
    Flat,
}

impl Layout {
    pub fn from_skip_folder(skip_folder: bool) -> Self {
        if skip_folder {
            Layout::Flat
        } else {
            Layout::Nested
        }
    }

    pub fn file_path(self, root: &Path, stem: &str) -> PathBuf {
        let file_name = format!("{stem}.{FILE_EXTENSION}");
        match self {
            Layout::Nested => root.join(stem).join(file_name),
            Layout::Flat => root.join(file_name),
        }
    }
}

#[derive(Debug)]
pub struct RecordOutcome {
    pub api_path: String,
    pub name: Option<String>,
    pub file: PathBuf,
    pub result: Result<(), WriteError>,
}

/// What happened to every record and every file of a batch.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub records: Vec<RecordOutcome>,
    pub files: Vec<PathBuf>,
    pub format_failures: Vec<WriteError>,
}

impl GenerationReport {
    pub fn generated(&self) -> usize {
        self.records.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.records.iter().filter(|r| r.result.is_err())
    }
}

/// Write every group under `root`, replacing whatever was there.
///
/// Failing to lay out the directory tree is fatal. Failures for a single
/// record or while formatting a file are collected in the report.
pub fn write_groups(
    root: &Path,
    groups: &[Group],
    layout: Layout,
    lowercase: bool,
    formatter: &dyn Formatter,
) -> Result<GenerationReport> {
    reset_output_root(root)?;

    let files = group_files(root, groups, layout);
    let mut report = GenerationReport::default();
    for file in &files {
        create_group_file(file)?;
        if !report.files.contains(file) {
            report.files.push(file.clone());
        }
    }

    let mut declared: HashMap<PathBuf, HashSet<String>> = HashMap::new();
    for (group, file) in groups.iter().zip(&files) {
        let names = declared.entry(file.clone()).or_default();

        for record in &group.records {
            let outcome = write_record(record, file, lowercase, names);
            match (&outcome.name, &outcome.result) {
                (Some(name), Ok(())) => println!("✅ Generated: {name}"),
                (_, Err(err)) => {
                    tracing::warn!(api_path = %outcome.api_path, "record skipped: {err}");
                    eprintln!("{} {}", "❌".red(), err.to_string().red());
                }
                (None, Ok(())) => {}
            }
            report.records.push(outcome);
        }
    }

    for file in &report.files {
        if let Err(err) = format_file(file, formatter) {
            tracing::warn!("{err}");
            eprintln!("{} {}", "⚠".yellow(), err.to_string().yellow());
            report.format_failures.push(err);
        }
    }

    Ok(report)
}

/// One file per group. Stems that differ only in case share the first
/// spelling, so `Users` and `users` end up in one file on every filesystem.
fn group_files(root: &Path, groups: &[Group], layout: Layout) -> Vec<PathBuf> {
    let mut spellings: HashMap<String, String> = HashMap::new();
    groups
        .iter()
        .map(|group| {
            let stem = group.file_stem();
            let stem = spellings.entry(stem.to_lowercase()).or_insert(stem);
            layout.file_path(root, stem)
        })
        .collect()
}

fn reset_output_root(root: &Path) -> Result<()> {
    match fs::remove_dir_all(root) {
        Ok(()) => tracing::debug!(root = %root.display(), "removed previous output"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to clear {}", root.display()));
        }
    }
    fs::create_dir_all(root).with_context(|| format!("failed to create {}", root.display()))
}

fn create_group_file(file: &Path) -> Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("failed to create {}", file.display()))?;
    Ok(())
}

fn write_record(
    record: &EndpointRecord,
    file: &Path,
    lowercase: bool,
    declared: &mut HashSet<String>,
) -> RecordOutcome {
    let mut outcome = RecordOutcome {
        api_path: record.api_path.clone(),
        name: None,
        file: file.to_path_buf(),
        result: Ok(()),
    };

    let declaration = match render_declaration(record, lowercase) {
        Ok(declaration) => declaration,
        Err(err) => {
            outcome.result = Err(err.into());
            return outcome;
        }
    };
    outcome.name = Some(declaration.name.clone());

    if declared.contains(&declaration.name) {
        outcome.result = Err(GenerateError::DuplicateName {
            name: declaration.name,
            api_path: record.api_path.clone(),
        }
        .into());
        return outcome;
    }

    outcome.result = append(file, &format!("{}\n", declaration.source));
    if outcome.result.is_ok() {
        declared.insert(declaration.name);
    }
    outcome
}

fn append(file: &Path, text: &str) -> Result<(), WriteError> {
    let to_write_error = |source| WriteError::Append {
        path: file.to_path_buf(),
        source,
    };

    let mut handle = OpenOptions::new()
        .append(true)
        .open(file)
        .map_err(to_write_error)?;
    handle.write_all(text.as_bytes()).map_err(to_write_error)?;
    tracing::debug!(file = %file.display(), bytes = text.len(), "appended declaration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::format::NoFormat;
    use crate::grouping::group_records;
    use crate::parser::Method;

    struct Broken;

    impl Formatter for Broken {
        fn format(&self, _source: &str, _path: &Path) -> Result<String, FormatError> {
            Err(FormatError::Failed {
                program: "prettier".to_string(),
                code: 2,
                stderr: "SyntaxError".to_string(),
            })
        }
    }

    fn record(relative_path: &str) -> EndpointRecord {
        EndpointRecord {
            api_path: format!("/api/{relative_path}"),
            relative_path: relative_path.to_string(),
            methods: vec![Method {
                verb: "get".to_string(),
                summary: None,
            }],
        }
    }

    fn groups(paths: &[&str]) -> Vec<Group> {
        group_records(paths.iter().map(|p| record(p)).collect(), false)
    }

    #[test]
    fn nested_layout_puts_each_group_in_its_folder() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api_docs");

        let report = write_groups(
            &root,
            &groups(&["Users/{id}", "Orders", "Users"]),
            Layout::Nested,
            false,
            &NoFormat,
        )
        .unwrap();

        assert_eq!(report.generated(), 3);
        let users = fs::read_to_string(root.join("Users").join("Users.ts")).unwrap();
        let first = users.find("export const Users_id =").unwrap();
        let second = users.find("export const Users =").unwrap();
        assert!(first < second, "declarations out of order:\n{users}");
        assert!(root.join("Orders").join("Orders.ts").is_file());
    }

    #[test]
    fn flat_layout_writes_files_at_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api_docs");

        write_groups(&root, &groups(&["Users", "Orders"]), Layout::Flat, false, &NoFormat).unwrap();

        assert!(root.join("Users.ts").is_file());
        assert!(root.join("Orders.ts").is_file());
        assert!(!root.join("Users").exists());
    }

    #[test]
    fn previous_output_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api_docs");
        fs::create_dir_all(root.join("Stale")).unwrap();
        fs::write(root.join("Stale").join("Stale.ts"), "old").unwrap();

        write_groups(&root, &groups(&["Users"]), Layout::Nested, false, &NoFormat).unwrap();

        assert!(!root.join("Stale").exists());
    }

    #[test]
    fn failing_record_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api_docs");

        let report = write_groups(
            &root,
            &groups(&["Users/{id}", "Users/id", "", "Users"]),
            Layout::Flat,
            false,
            &NoFormat,
        )
        .unwrap();

        assert_eq!(report.generated(), 2);
        let failed: Vec<_> = report.failed().map(|r| r.api_path.as_str()).collect();
        assert_eq!(failed, ["/api/Users/id", "/api/"]);
        assert!(matches!(
            report.records[1].result,
            Err(WriteError::Generate(GenerateError::DuplicateName { .. }))
        ));

        let users = fs::read_to_string(root.join("Users.ts")).unwrap();
        assert_eq!(users.matches("export const").count(), 2);
        assert!(root.join("root.ts").is_file());
    }

    #[test]
    fn format_failure_keeps_written_declarations() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api_docs");

        let report =
            write_groups(&root, &groups(&["Users"]), Layout::Flat, false, &Broken).unwrap();

        assert_eq!(report.generated(), 1);
        assert_eq!(report.format_failures.len(), 1);
        let users = fs::read_to_string(root.join("Users.ts")).unwrap();
        assert!(users.contains("export const Users = () => `Users`;"));
    }

    #[test]
    fn groups_differing_only_in_case_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api_docs");

        let report = write_groups(
            &root,
            &groups(&["Users", "users/{id}"]),
            Layout::Nested,
            false,
            &NoFormat,
        )
        .unwrap();

        assert_eq!(report.files, [root.join("Users").join("Users.ts")]);
        let users = fs::read_to_string(&report.files[0]).unwrap();
        assert!(users.contains("export const Users = () => `Users`;"));
        assert!(users.contains("export const users_id = (id: any) => `users/${id}`;"));
    }

    #[test]
    fn lowercase_names_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api_docs");
        let groups = group_records(vec![record("Users/{userId}")], true);

        write_groups(&root, &groups, Layout::Flat, true, &NoFormat).unwrap();

        let users = fs::read_to_string(root.join("users.ts")).unwrap();
        assert!(users.contains("export const users_userid = (userId: any) => `Users/${userId}`;"));
    }
}
