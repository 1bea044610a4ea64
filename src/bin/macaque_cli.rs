//! Experiment config inference CLI
//!
//! # Usage
//!
//! ```bash
//! # Infer series/source correspondence and write macaque.ini
//! macaque_cli infer experiment.ini
//!
//! # Same, without writing anything
//! macaque_cli infer experiment.ini --dry-run -o json
//!
//! # Synthesize a one-dataset config using a reader from an existing config
//! macaque_cli fake --prefix /data --files images.txt --series images \
//!     --reader img_reader --base experiment.ini
//! ```

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use macaque_core::{
    create_fake_config, infer_data_correspondence, infer_from_text, ConfigDocument,
    Correspondence, Diagnostic, FakeConfigRequest, Settings,
};

#[derive(Parser)]
#[command(name = "macaque_cli")]
#[command(version = "0.1.0")]
#[command(about = "Infer data series and their sources from experiment configs")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, yaml, or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer series/source correspondence and write the normalized config
    Infer {
        /// Experiment configuration file
        file: PathBuf,

        /// Where to write the normalized config
        #[arg(long, env = "MACAQUE_OUTPUT_PATH")]
        output: Option<PathBuf>,

        /// Print the normalized config instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a minimal config declaring one dataset
    Fake {
        /// Value for the reader's `prefix` option
        #[arg(long, default_value = "")]
        prefix: String,

        /// File-list expression for the dataset's data
        #[arg(long)]
        files: String,

        /// Series name
        #[arg(long)]
        series: String,

        /// Dataset section name
        #[arg(long, default_value = macaque_core::synth::DEFAULT_DATASET_NAME)]
        dataset_name: String,

        /// Reader section to copy from the base config
        #[arg(long, requires = "base")]
        reader: Option<String>,

        /// Config to copy the reader section from
        #[arg(long)]
        base: Option<PathBuf>,
    },
}

/// Report printed by `infer`
#[derive(Serialize)]
struct InferReport {
    generated_at: DateTime<Utc>,
    input: PathBuf,
    output_path: Option<PathBuf>,
    literal: Vec<Correspondence>,
    reader: Vec<Correspondence>,
    unmatched: Vec<Correspondence>,
    diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    normalized: Option<String>,
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Infer {
            file,
            output,
            dry_run,
        } => cmd_infer(&file, output, dry_run, cli.format),
        Commands::Fake {
            prefix,
            files,
            series,
            dataset_name,
            reader,
            base,
        } => cmd_fake(prefix, files, series, dataset_name, reader, base),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_infer(
    file: &Path,
    output: Option<PathBuf>,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let report = if dry_run {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let inference = infer_from_text(&text)
            .with_context(|| format!("Inference failed for {}", file.display()))?;
        InferReport {
            generated_at: Utc::now(),
            input: file.to_path_buf(),
            output_path: None,
            literal: inference.sets.literal,
            reader: inference.sets.reader,
            unmatched: inference.sets.unmatched,
            diagnostics: inference.diagnostics,
            normalized: Some(inference.config.to_ini_string()),
        }
    } else {
        let settings = match output {
            Some(path) => Settings::new(path),
            None => Settings::from_env(),
        };
        let outcome = infer_data_correspondence(file, &settings)
            .with_context(|| format!("Inference failed for {}", file.display()))?;
        InferReport {
            generated_at: Utc::now(),
            input: file.to_path_buf(),
            output_path: Some(outcome.output_path),
            literal: outcome.literal,
            reader: outcome.reader,
            unmatched: outcome.unmatched,
            diagnostics: outcome.diagnostics,
            normalized: None,
        }
    };

    render_report(&report, format)
}

fn render_report(report: &InferReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).context("JSON serialization failed")?
            );
        }
        OutputFormat::Yaml => {
            print!(
                "{}",
                serde_yaml::to_string(report).context("YAML serialization failed")?
            );
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} series from {}",
                "OK".green().bold(),
                report.literal.len() + report.reader.len() + report.unmatched.len(),
                report.input.display()
            );
            print_group("literal", &report.literal);
            print_group("reader", &report.reader);
            print_group("unmatched", &report.unmatched);
            for diag in &report.diagnostics {
                println!("  {} {}", "!".yellow(), diag);
            }
            match (&report.output_path, &report.normalized) {
                (Some(path), _) => println!("Normalized config written to {}", path.display()),
                (None, Some(text)) => {
                    println!();
                    print!("{}", text);
                }
                (None, None) => {}
            }
        }
    }
    Ok(())
}

fn print_group(label: &str, items: &[Correspondence]) {
    if items.is_empty() {
        return;
    }
    println!("  {}:", label.bold());
    for item in items {
        println!("    {} <- {}", item.series.cyan(), item.target);
    }
}

fn cmd_fake(
    prefix: String,
    files: String,
    series: String,
    dataset_name: String,
    reader: Option<String>,
    base: Option<PathBuf>,
) -> Result<()> {
    let base_config = match &base {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(
                ConfigDocument::parse(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?,
            )
        }
        None => None,
    };

    let mut request = FakeConfigRequest::new(prefix, files, series).with_dataset_name(dataset_name);
    if let Some(reader) = reader {
        let Some(base_config) = base_config.as_ref() else {
            bail!("--reader needs --base to copy the reader section from");
        };
        request = request.with_reader(reader, base_config);
    }

    let lines = create_fake_config(&request)?;
    print!("{}", lines.concat());
    Ok(())
}
