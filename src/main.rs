use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use openapi_paths_generator::config::{
    default_work_dir, prompt_until_answered, GenerationConfig, BASE_PATH_QUESTION, URL_QUESTION,
};
use openapi_paths_generator::format::{Formatter, NoFormat, Prettier};
use openapi_paths_generator::output::{FileManager, PrintPath, Reveal};
use openapi_paths_generator::{logging, run};

#[derive(Parser, Debug)]
#[command(name = "openapi_paths_generator")]
#[command(version)]
#[command(about = "Generates TypeScript URL helpers from a Swagger/OpenAPI document")]
struct Args {
    /// URL of the swagger.json document (asked for when missing)
    #[arg(short, long, value_name = "URL")]
    swagger: Option<String>,

    /// Base path removed from every endpoint, e.g. /api/ (asked for when missing)
    #[arg(long = "bp", value_name = "BASE_PATH")]
    base_path: Option<String>,

    /// Directory that receives the api_docs folder
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Write one file per group directly under api_docs
    #[arg(long)]
    skip_folder: bool,

    /// Lower-case constant names and group files
    #[arg(long)]
    lowercase: bool,

    /// Do not run prettier on the generated files
    #[arg(long)]
    no_format: bool,

    /// Print the output path instead of opening a file manager
    #[arg(long)]
    no_open: bool,

    /// Directory for scratch files and the default output
    #[arg(long, value_name = "DIR", default_value_os_t = default_work_dir())]
    work_dir: PathBuf,
}

fn build_config(args: Args) -> Result<GenerationConfig> {
    let interactive = args.swagger.is_none() || args.base_path.is_none();
    if interactive {
        println!(
            "{}",
            "To configure the script correctly, you must ensure that BE is running and you can view the Swagger page."
                .to_uppercase()
                .green()
        );
        println!(
            "{}",
            "Have the PATH of the swagger.json and the BASEPATH which will determine how the endpoints will be returned."
                .red()
        );
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let swagger = match args.swagger {
        Some(url) => url,
        None => prompt_until_answered(&mut input, &mut output, URL_QUESTION)
            .context("no swagger URL given")?,
    };
    let base_path = match args.base_path {
        Some(base_path) => base_path,
        None => prompt_until_answered(&mut input, &mut output, BASE_PATH_QUESTION)
            .context("no base path given")?,
    };
    output.flush()?;

    let mut config = GenerationConfig::new(swagger, base_path)?;
    config.output_dir = args.output;
    config.flatten_folders = args.skip_folder;
    config.lowercase_names = args.lowercase;
    config.work_dir = args.work_dir;
    Ok(config)
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let formatter: Box<dyn Formatter> = if args.no_format {
        Box::new(NoFormat)
    } else {
        Box::new(Prettier::default())
    };
    let revealer: Box<dyn Reveal> = if args.no_open {
        Box::new(PrintPath)
    } else {
        Box::new(FileManager)
    };

    let config = match build_config(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red());
            return ExitCode::FAILURE;
        }
    };
    println!("{} {}", "swagger:".cyan(), config.source_url);
    println!("{} {}", "base path:".cyan(), config.base_path);

    match run(&config, formatter.as_ref(), revealer.as_ref()) {
        Ok(summary) => {
            let failed = summary.report.failed().count();
            if failed > 0 || !summary.report.format_failures.is_empty() {
                println!(
                    "{}",
                    format!(
                        "{} generated, {failed} failed, {} files not formatted",
                        summary.report.generated(),
                        summary.report.format_failures.len()
                    )
                    .yellow()
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red());
            ExitCode::FAILURE
        }
    }
}
