//! CLI binary for etl-binlog.

use clap::{Parser, Subcommand, ValueEnum};
use etl_binlog::{ResolverConfig, read_previous_gtids_from_path, resolve_resume_position_in_file};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// ETL Binlog - Finds where binlog replay should resume.
#[derive(Parser, Debug)]
#[command(name = "etl-binlog")]
#[command(about = "Finds where binlog replay should resume for a set of executed GTIDs")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the offset of the first transaction not contained in the executed GTID set
    Resolve {
        /// Path to the binlog file
        #[arg(long)]
        binlog: PathBuf,

        /// Executed GTID set, e.g. `3E11FA47-71CA-11E1-9E33-C80AA9429562:1-5`
        #[arg(long)]
        executed_gtids: String,

        /// Resume from the last executed transaction instead of the first unexecuted one
        #[arg(long)]
        include_event_before_first: bool,

        /// Check the binlog file marker before scanning
        #[arg(long)]
        verify_magic: bool,
    },
    /// Print the previous-GTIDs snapshot stored at the head of the binlog
    PreviousGtids {
        /// Path to the binlog file
        #[arg(long)]
        binlog: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    binlog: &'a str,
    position: u64,
}

#[derive(Serialize)]
struct PreviousGtidsOutput<'a> {
    binlog: &'a str,
    previous_gtids: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Binlog(#[from] etl_binlog::BinlogError),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Resolve {
            binlog,
            executed_gtids,
            include_event_before_first,
            verify_magic,
        } => {
            let config = ResolverConfig::new()
                .with_include_event_before_first(include_event_before_first)
                .with_verify_magic(verify_magic);

            info!(binlog = %binlog.display(), "Resolving resume position");
            let position = resolve_resume_position_in_file(&binlog, &executed_gtids, &config)?;

            let binlog = binlog.display().to_string();
            print_output(
                args.format,
                &ResolveOutput {
                    binlog: &binlog,
                    position,
                },
                || position.to_string(),
            )
        }
        Command::PreviousGtids { binlog } => {
            info!(binlog = %binlog.display(), "Reading previous GTIDs");
            let previous_gtids = read_previous_gtids_from_path(&binlog)?;

            let binlog = binlog.display().to_string();
            let rendered = previous_gtids.to_string();
            print_output(
                args.format,
                &PreviousGtidsOutput {
                    binlog: &binlog,
                    previous_gtids: rendered.clone(),
                },
                || rendered,
            )
        }
    }
}

fn print_output<T, F>(format: OutputFormat, output: &T, text: F) -> Result<(), CliError>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Text => println!("{}", text()),
        OutputFormat::Json => println!("{}", serde_json::to_string(output)?),
    }

    Ok(())
}
