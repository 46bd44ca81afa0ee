//! sqlbridge CLI - validate a data source and inspect what a protocol server
//! would expose from it.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlbridge::{BridgeError, ConnectorRegistry, DataSource, Settings, TableIdentifier};
use tracing::{info, Level};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

#[derive(Parser)]
#[command(name = "sqlbridge")]
#[command(about = "Bootstrap and inspect a relational data source")]
#[command(version)]
struct Cli {
    /// Path to YAML settings file (environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check settings, load the connector and test connectivity
    Validate,

    /// Show server identity and discovered dialect capabilities
    Info,

    /// Resolve the configured table patterns against live metadata
    Tables,
}

/// Summary printed by the `info` command.
#[derive(Debug, Serialize)]
struct InfoReport {
    server_name: String,
    server_version: String,
    resource_scheme: String,
    connector_class: String,
    identifier_quotes: String,
    supports_multiple_catalogs: bool,
    supports_multiple_schemas: bool,
    default_catalog: Option<String>,
    default_schema: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<ExitCode, BridgeError> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;

    setup_logging(&cli.verbosity, &cli.log_format, settings.log_file())?;
    if let Some(path) = &cli.config {
        info!("Loaded settings from {:?}", path);
    }

    let source = DataSource::new(settings, ConnectorRegistry::with_builtins());

    if !source.validate(&mut io::stderr()) {
        return Ok(ExitCode::FAILURE);
    }

    match cli.command {
        Commands::Validate => {
            if cli.output_json {
                print_json(&serde_json::json!({ "valid": true }))?;
            } else {
                println!("Validation completed successfully");
            }
        }

        Commands::Info => {
            let report = InfoReport {
                server_name: source.server_name().to_string(),
                server_version: source.server_version().to_string(),
                resource_scheme: source.resource_scheme(),
                connector_class: source
                    .loaded_connector()
                    .map(|l| l.handle.class_name().to_string())
                    .unwrap_or_default(),
                identifier_quotes: source.identifier_quotes()?,
                supports_multiple_catalogs: source.supports_multiple_catalogs()?,
                supports_multiple_schemas: source.supports_multiple_schemas()?,
                default_catalog: source.default_catalog()?.map(str::to_string),
                default_schema: source.default_schema()?.map(str::to_string),
            };

            if cli.output_json {
                print_json(&report)?;
            } else {
                println!("Server: {} {}", report.server_name, report.server_version);
                println!("  Resource scheme: {}", report.resource_scheme);
                println!("  Connector class: {}", report.connector_class);
                println!("  Identifier quotes: {}", report.identifier_quotes);
                println!(
                    "  Multiple catalogs: {}",
                    yes_no(report.supports_multiple_catalogs)
                );
                println!(
                    "  Multiple schemas: {}",
                    yes_no(report.supports_multiple_schemas)
                );
                println!(
                    "  Default catalog: {}",
                    report.default_catalog.as_deref().unwrap_or("(none)")
                );
                println!(
                    "  Default schema: {}",
                    report.default_schema.as_deref().unwrap_or("(none)")
                );
            }
        }

        Commands::Tables => {
            let tables: Vec<TableIdentifier> = source.get_tables()?;

            if cli.output_json {
                print_json(&tables)?;
            } else {
                for table in &tables {
                    println!(
                        "{}{}",
                        source.resource_scheme(),
                        source.qualify_table(table)?
                    );
                }
                info!("{} tables resolved", tables.len());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BridgeError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| BridgeError::Config(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Install the global subscriber. Logs go to `log_file` when set, stderr
/// otherwise; stdout is reserved for command output.
fn setup_logging(verbosity: &str, format: &str, log_file: Option<&str>) -> Result<(), BridgeError> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
