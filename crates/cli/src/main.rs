// cinder CLI - compiles the national industrial combustion unit inventory
// from the two emissions inventories and the facility registry.

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cinder_io::IoError;
use cinder_recon::{EngineInput, RunConfig};
use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_SCHEMA, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "cinder")]
#[command(about = "Industrial combustion unit inventory compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full compilation from a TOML run config
    #[command(after_help = "\
Examples:
  cinder compile run.toml
  cinder compile run.toml --output inventory.csv
  cinder compile run.toml --json")]
    Compile {
        /// Path to the run config (input paths resolve relative to it)
        config: PathBuf,

        /// Where to write the compiled inventory CSV
        #[arg(long, default_value = "inventory.csv")]
        output: PathBuf,

        /// Print the machine-readable run summary instead of the human one
        #[arg(long)]
        json: bool,
    },

    /// Check the config and input schemas without running the pipeline
    #[command(after_help = "\
Examples:
  cinder validate run.toml")]
    Validate {
        /// Path to the run config
        config: PathBuf,
    },
}

struct CliError {
    code: u8,
    message: String,
}

impl CliError {
    fn new(code: u8, message: impl Into<String>) -> CliError {
        CliError {
            code,
            message: message.into(),
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> CliError {
        let code = match err {
            IoError::Io(_) => EXIT_IO,
            IoError::MissingColumn { .. } | IoError::NumberParse { .. } => EXIT_SCHEMA,
        };
        CliError::new(code, err.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Compile {
            config,
            output,
            json,
        } => cmd_compile(&config, &output, json),
        Commands::Validate { config } => cmd_validate(&config),
    };
    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            ExitCode::from(err.code)
        }
    }
}

fn read_config(path: &Path) -> Result<(RunConfig, PathBuf), CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::new(EXIT_IO, format!("{}: {e}", path.display())))?;
    let config = RunConfig::from_toml(&raw)
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((config, base))
}

fn load_inputs(config: &RunConfig, base: &Path) -> Result<EngineInput, CliError> {
    let resolve = |p: &str| base.join(p);
    Ok(EngineInput {
        ghgrp: cinder_io::load_ghgrp(&resolve(&config.inputs.ghgrp))?,
        nei: cinder_io::load_nei(&resolve(&config.inputs.nei))?,
        secondary_factors: cinder_io::load_secondary_factors(&resolve(
            &config.inputs.secondary_factors,
        ))?,
        identities: cinder_io::load_registry(&resolve(&config.inputs.registry))?,
    })
}

fn cmd_compile(config_path: &Path, output: &Path, json: bool) -> Result<(), CliError> {
    let (config, base) = read_config(config_path)?;
    let input = load_inputs(&config, &base)?;

    let result = cinder_recon::run(&config, &input)
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;

    cinder_io::write_inventory(output, &result.inventory)?;

    if json {
        let summary = serde_json::to_string_pretty(&result.summary)
            .map_err(|e| CliError::new(EXIT_IO, e.to_string()))?;
        println!("{summary}");
    } else {
        print_summary(&config, &result.summary, output);
    }
    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let (config, base) = read_config(config_path)?;
    // Loading validates headers and numeric cells without running the engine.
    let input = load_inputs(&config, &base)?;
    println!(
        "ok: {} ({} tier records, {} emission-factor records, {} factors, {} identities)",
        config.name,
        input.ghgrp.len(),
        input.nei.len(),
        input.secondary_factors.len(),
        input.identities.len()
    );
    Ok(())
}

fn print_summary(config: &RunConfig, summary: &cinder_recon::RunSummary, output: &Path) {
    println!("{} ({})", config.name, config.reporting_year);
    println!(
        "  facilities: {} dual, {} emission-factor only, {} tier-method only",
        summary.facilities_dual, summary.facilities_nei_only, summary.facilities_ghgrp_only
    );
    println!(
        "  units: {} emission-factor, {} tier-method",
        summary.nei_units, summary.ghgrp_units
    );
    println!(
        "  reconciliation: {} OCS retained, {} scaled, {} lumps kept",
        summary.ocs_retained, summary.ocs_scaled, summary.ocs_lumps_kept
    );
    println!(
        "  quality: {} outliers corrected, {} ceiling hits, {} capacity regenerations",
        summary.ef_stats.outliers_corrected,
        summary.ef_stats.ceiling_hits,
        summary.ef_stats.capacity_regenerated
    );
    println!("  {} rows -> {}", summary.rows_out, output.display());
}
