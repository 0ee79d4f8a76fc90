//! redshift-dup CLI - Duplicate Redshift schemas and sample rows.

use clap::{Parser, Subcommand};
use redshift_dup::{
    health_check, Config, DupError, ReflectionStrategy, SchemaReport, Session,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "redshift-dup")]
#[command(about = "Duplicate Redshift schemas and sample rows into another database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Also write plain-text logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create schemas and empty tables in the destination
    CreateSchema {
        /// Schema to create (repeatable; defaults to copy.schemas)
        #[arg(long = "schema")]
        schemas: Vec<String>,

        /// Read table definitions from the external table catalog
        #[arg(long)]
        external: bool,

        /// Create only this table in each schema
        #[arg(long)]
        table: Option<String>,
    },

    /// Insert sampled source rows into existing destination tables
    Populate {
        /// Schema to populate (repeatable; defaults to copy.schemas)
        #[arg(long = "schema")]
        schemas: Vec<String>,

        /// Rows sampled per table (defaults to copy.sample_size)
        #[arg(long)]
        sample_size: Option<usize>,

        /// Populate only this table in each schema
        #[arg(long)]
        table: Option<String>,
    },

    /// Create schemas, then populate them
    Copy {
        /// Schema to copy (repeatable; defaults to copy.schemas)
        #[arg(long = "schema")]
        schemas: Vec<String>,

        /// Rows sampled per table (defaults to copy.sample_size)
        #[arg(long)]
        sample_size: Option<usize>,

        /// Read table definitions from the external table catalog
        #[arg(long)]
        external: bool,
    },

    /// Test database connections
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DupError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format, cli.log_file.as_deref())?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::HealthCheck => {
            let result = health_check(&config).await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source (Redshift): {} ({}ms)",
                    status(result.source_connected),
                    result.source_latency_ms
                );
                if let Some(ref err) = result.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Destination: {} ({}ms)",
                    status(result.destination_connected),
                    result.destination_latency_ms
                );
                if let Some(ref err) = result.destination_error {
                    println!("    Error: {}", err);
                }
                println!("  Destination (ODBC): {}", status(result.odbc_connected));
                if let Some(ref err) = result.odbc_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !result.healthy {
                return Err(DupError::pool("Health check failed", "health-check"));
            }
        }

        Commands::CreateSchema {
            schemas,
            external,
            table,
        } => {
            let schemas = resolve_schemas(schemas, &config)?;
            let strategy = resolve_strategy(external, &config);
            let session = Session::connect(config).await?;

            let reports = session
                .create_schemas(&schemas, strategy, table.as_deref())
                .await?;
            print_reports(&reports, cli.output_json)?;
        }

        Commands::Populate {
            schemas,
            sample_size,
            table,
        } => {
            let schemas = resolve_schemas(schemas, &config)?;
            let sample_size = resolve_sample_size(sample_size, &config)?;
            let session = Session::connect(config).await?;

            let reports = session
                .populate_schemas(&schemas, sample_size, table.as_deref())
                .await?;
            print_reports(&reports, cli.output_json)?;
        }

        Commands::Copy {
            schemas,
            sample_size,
            external,
        } => {
            let schemas = resolve_schemas(schemas, &config)?;
            let sample_size = resolve_sample_size(sample_size, &config)?;
            let strategy = resolve_strategy(external, &config);
            let session = Session::connect(config).await?;

            let reports = session
                .copy_schemas(&schemas, strategy, sample_size)
                .await?;
            print_reports(&reports, cli.output_json)?;
        }
    }

    Ok(())
}

fn resolve_schemas(cli_schemas: Vec<String>, config: &Config) -> Result<Vec<String>, DupError> {
    let schemas = if cli_schemas.is_empty() {
        config.copy.schemas.clone()
    } else {
        cli_schemas
    };
    if schemas.is_empty() {
        return Err(DupError::Config(
            "no schemas given: pass --schema or set copy.schemas".to_string(),
        ));
    }
    Ok(schemas)
}

fn resolve_sample_size(cli_size: Option<usize>, config: &Config) -> Result<usize, DupError> {
    match cli_size {
        Some(0) => Err(DupError::Config(
            "--sample-size must be at least 1".to_string(),
        )),
        Some(n) => Ok(n),
        None => Ok(config.copy.sample_size),
    }
}

fn resolve_strategy(external: bool, config: &Config) -> ReflectionStrategy {
    if external {
        ReflectionStrategy::External
    } else {
        config.copy.strategy
    }
}

fn status(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "FAILED"
    }
}

fn print_reports(reports: &[SchemaReport], json: bool) -> Result<(), DupError> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!("\nSchema {}:", report.schema);
        if let Some(created) = report.tables_created {
            println!("  Tables created: {}", created);
        }
        if let Some(ref population) = report.population {
            for table in &population.tables {
                println!("  {}: {} rows", table.table, table.rows);
            }
            println!("  Rows inserted: {}", population.total_rows);
            println!("  Duration: {:.2}s", population.duration_seconds);
        }
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str, log_file: Option<&Path>) -> Result<(), DupError> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let console = if format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file = match log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(File::create(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(console)
        .with(file)
        .init();

    Ok(())
}
