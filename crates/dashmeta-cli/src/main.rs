use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dashmeta_core::{Config, IngestionStatus, ServiceCatalog};
use dashmeta_engine::IngestionRun;

mod snapshot;

const DEFAULT_CONFIG: &str = "dashmeta.toml";

/// dashmeta - Superset dashboard metadata and lineage extraction
#[derive(Parser)]
#[command(name = "dashmeta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: dashmeta.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a Superset snapshot and write catalog requests
    Ingest {
        /// JSON snapshot of the Superset deployment
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Output file for requests as JSON lines (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the status report
        #[arg(long, default_value = "status.json")]
        status: PathBuf,
    },

    /// Validate the configuration and print what it declares
    CheckConfig,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Ingest { snapshot, output, status } => {
            let status = ingest_command(&config, &snapshot, output.as_deref(), &status)?;
            print_summary(&status);
            Ok(())
        }
        Commands::CheckConfig => check_config_command(&config),
    }
}

/// Explicit path, then `dashmeta.toml` in the working directory, then defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(path) = path {
        Config::from_file(path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// Run ingestion over a snapshot, writing requests and the status report
fn ingest_command(
    config: &Config,
    snapshot_path: &Path,
    output: Option<&Path>,
    status_path: &Path,
) -> Result<IngestionStatus> {
    let backend = snapshot::load_backend(snapshot_path, config.source.backend)?;
    let catalog = config.catalog();

    let run = IngestionRun::prepare(backend.as_ref(), &config.source, &catalog)?;
    let mut stream = run.into_stream();

    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for request in stream.by_ref() {
        serde_json::to_writer(&mut writer, &request)?;
        writeln!(writer)?;
        *counts.entry(request.kind()).or_default() += 1;
    }
    writer.flush()?;

    for (kind, count) in &counts {
        eprintln!("  {} {}", format!("{:>5}", count).bold(), kind);
    }

    let status = stream.into_status();
    status
        .save_to_file(status_path)
        .with_context(|| format!("Failed to write {}", status_path.display()))?;
    eprintln!("{} {}", "Status report saved to:".green(), status_path.display());

    Ok(status)
}

fn print_summary(status: &IngestionStatus) {
    let summary = &status.summary;
    eprintln!("{}", "Ingestion summary".bold());
    eprintln!("  scanned:  {}", summary.scanned.to_string().green());
    eprintln!("  filtered: {}", summary.filtered);
    eprintln!("  skipped:  {}", summary.skipped);

    if summary.warnings > 0 {
        eprintln!("  warnings: {}", summary.warnings.to_string().yellow());
    }

    if summary.failed > 0 {
        eprintln!("  failed:   {}", summary.failed.to_string().red());
        for failure in &status.failures {
            eprintln!("    {} {}: {}", "✗".red(), failure.name, failure.error);
        }
    } else {
        eprintln!("  {}", "✓ No failures".green());
    }
}

fn check_config_command(config: &Config) -> Result<()> {
    let source = &config.source;
    println!("{}", "Configuration OK".green().bold());
    println!("{} {:?}", "Backend:".bold(), source.backend);
    println!("{} {}", "Service:".bold(), source.service_name);
    println!("{} {}", "Host:".bold(), source.clean_host());
    println!("{} {}", "Data models:".bold(), source.include_data_models);

    if source.db_service_names.is_empty() {
        println!("{}", "No database services for table lineage".yellow());
    } else {
        let catalog = config.catalog();
        for name in &source.db_service_names {
            match catalog.database_service(name) {
                Some(service) => println!(
                    "  {} {} (database: {})",
                    "✓".green(),
                    name,
                    service.database_name.as_deref().unwrap_or("from backend")
                ),
                None => println!("  {} {} (not declared)", "⚠".yellow(), name),
            }
        }
    }

    Ok(())
}
