//! Generates TypeScript URL helpers from a running backend's OpenAPI/Swagger
//! document: one file per first path segment, one `export const` per path.

pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod generator;
pub mod grouping;
pub mod logging;
pub mod output;
pub mod parser;
pub mod scratch;
pub mod writer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use config::{GenerationConfig, ScratchConfig};
use error::FetchError;
use format::Formatter;
use output::Reveal;
use scratch::ScratchState;
use writer::{GenerationReport, Layout};

#[derive(Debug)]
pub struct RunSummary {
    /// Where the generated tree lives once the run is over.
    pub output_root: PathBuf,
    pub report: GenerationReport,
}

/// Fetch, generate, place. Scratch files are removed whatever the outcome.
pub fn run(
    config: &GenerationConfig,
    formatter: &dyn Formatter,
    revealer: &dyn Reveal,
) -> Result<RunSummary> {
    let scratch = ScratchState::create(&config.work_dir)?;

    let result = generate(config, &scratch, formatter, revealer);

    if let Err(err) = scratch.purge() {
        tracing::warn!("failed to remove scratch files: {err}");
    }
    println!("🧹 Cleaned.");

    result
}

fn generate(
    config: &GenerationConfig,
    scratch: &ScratchState,
    formatter: &dyn Formatter,
    revealer: &dyn Reveal,
) -> Result<RunSummary> {
    scratch.save_config(&ScratchConfig::from(config))?;

    let document = fetch::fetch_document(&config.source_url).map_err(|err| {
        print_fetch_error(&err);
        err
    })?;
    scratch.save_document(&document)?;

    let document = scratch.load_document()?;
    let records = parser::extract_endpoints(&document, &config.base_path)
        .with_context(|| format!("cannot read endpoints from {}", config.source_url))?;
    tracing::info!(endpoints = records.len(), "endpoints extracted");

    let groups = grouping::group_records(records, config.lowercase_names);
    let tree = config.output_root();
    let report = writer::write_groups(
        &tree,
        &groups,
        Layout::from_skip_folder(config.flatten_folders),
        config.lowercase_names,
        formatter,
    )?;

    let output_root = match &config.output_dir {
        Some(destination) => output::relocate(&tree, destination)?,
        None => tree,
    };
    output::surface(&output_root, revealer);

    Ok(RunSummary {
        output_root,
        report,
    })
}

fn print_fetch_error(err: &FetchError) {
    if err.is_connection() {
        println!(
            "{}{}",
            " ERROR ".on_red().white(),
            " Could not connect: The server is off or the URL is incorrect.".red()
        );
    } else {
        println!("{}", format!("✘ unknown error: {err}").red());
    }
}
