use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use curvelab_core::{InterpretationConfig, ReferenceProfile};
use curvelab_interpret::{interpret_antibiogram_str, interpret_curve_str};
use serde::Serialize;
use tracing::info;

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "curvelab-cli",
    about = "Interpret OGTT curves and antibiograms from JSON payloads."
)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interpret a glycemic/insulin curve payload.
    Curve {
        #[command(flatten)]
        output: OutputArgs,
        /// JSON file with reference profile overrides.
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Interpret an antibiogram payload.
    Antibiogram {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the built-in reference profile.
    Profile,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Path to the payload JSON file.
    #[arg(short, long)]
    input: PathBuf,
    /// Print only the summary sentence.
    #[arg(long)]
    summary_only: bool,
    /// Single-line JSON output.
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match args.command {
        Command::Curve { output, profile } => {
            let mut config = InterpretationConfig::default();
            if let Some(path) = profile {
                config.references = ReferenceProfile::from_json_str(&read_file(&path)?)?;
                info!(profile = %config.references.profile_id, "loaded reference profile");
            }

            let data = read_file(&output.input)?;
            let interpretation = interpret_curve_str(&data, &config)?;
            info!(
                status = interpretation.overall_status.as_str(),
                points = interpretation.glycemic_rows.len() + interpretation.insulin_rows.len(),
                "curve interpreted"
            );
            emit(&output, &interpretation.summary, &interpretation)
        }
        Command::Antibiogram { output } => {
            let data = read_file(&output.input)?;
            let interpretation = interpret_antibiogram_str(&data, &InterpretationConfig::default())?;
            info!(
                recommended = interpretation.recommended.len(),
                patterns = interpretation.resistance_patterns.len(),
                "antibiogram interpreted"
            );
            emit(&output, &interpretation.summary, &interpretation)
        }
        Command::Profile => print_json(&ReferenceProfile::default(), false),
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read file {path:?}"))
}

fn emit<T: Serialize>(output: &OutputArgs, summary: &str, interpretation: &T) -> anyhow::Result<()> {
    if output.summary_only {
        println!("{summary}");
        return Ok(());
    }
    print_json(interpretation, output.compact)
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Could not serialize output")?;
    println!("{rendered}");
    Ok(())
}
