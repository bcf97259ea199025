//! # prisonstats
//!
//! A CLI and HTTP API for aggregate statistics over a prisoner dataset.
//!
//! ## Overview
//!
//! prisonstats is built on top of prisonstatslib. It ingests the dataset
//! document into a SQLite database, prints the summary report, and serves
//! the report and records over an authenticated JSON API next to a static
//! dashboard.
//!
//! ## Usage
//!
//! ```bash
//! # Ingest the dataset (replaces the database contents)
//! prisonstats ingest coding-test.pdf --db database.db
//!
//! # Print the report from the database, or straight from a source file
//! prisonstats report
//! prisonstats report --source coding-test.pdf --output json
//!
//! # One grouping only
//! prisonstats report --by prison
//!
//! # Look up one record
//! prisonstats show 42
//!
//! # Serve the API and dashboard
//! API_USERNAME=admin API_PASSWORD=secret prisonstats serve --bind 127.0.0.1:8000
//! ```
//!
//! Configuration is read from the environment (and a `.env` file when
//! present); command-line flags take precedence.

mod config;
mod render;
mod server;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use prisonstatslib::{
    load_records, report_sections, run_report, GroupField, IngestOptions, RecordStore,
    SqliteStore,
};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::render::{render_grouping, render_record, render_report, OutputFormat};

fn db_arg() -> Arg {
    Arg::new("db")
        .short('d')
        .long("db")
        .value_parser(value_parser!(PathBuf))
        .help("SQLite database path (defaults to PRISONSTATS_DB_PATH or database.db)")
}

fn skip_pages_arg() -> Arg {
    Arg::new("skip-pages")
        .long("skip-pages")
        .value_parser(value_parser!(usize))
        .default_value("1")
        .help("Number of leading pages to ignore")
}

fn ingest_options(matches: &ArgMatches) -> IngestOptions {
    let skip_pages = matches.get_one::<usize>("skip-pages").copied().unwrap_or(1);
    IngestOptions::new().skip_pages(skip_pages)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_parser(["table", "json"])
        .default_value("table")
        .help("Output format")
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("prisonstats")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Aggregate statistics over a prisoner dataset")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("ingest")
                .about("Extract and parse a dataset document into the database")
                .arg(
                    Arg::new("source")
                        .value_parser(value_parser!(PathBuf))
                        .help("Dataset document, PDF or text (defaults to PRISONSTATS_SOURCE)"),
                )
                .arg(db_arg())
                .arg(skip_pages_arg()),
        )
        .subcommand(
            Command::new("report")
                .about("Print the aggregate report")
                .arg(db_arg())
                .arg(
                    Arg::new("source")
                        .short('s')
                        .long("source")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("db")
                        .help("Read records from a dataset document instead of the database"),
                )
                .arg(skip_pages_arg().requires("source"))
                .arg(
                    Arg::new("by")
                        .short('b')
                        .long("by")
                        .value_parser(["crime", "gender", "prison"])
                        .help("Show a single grouping"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Print one prisoner record")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(u32))
                        .help("Prisoner id"),
                )
                .arg(db_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API and dashboard")
                .arg(db_arg())
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address (defaults to PRISONSTATS_BIND_ADDR or 127.0.0.1:8000)"),
                )
                .arg(
                    Arg::new("static-dir")
                        .long("static-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Dashboard directory (defaults to PRISONSTATS_STATIC_DIR or static)"),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .action(ArgAction::SetTrue)
                        .help("Only log warnings and errors"),
                ),
        )
}

fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn db_path(matches: &ArgMatches, config: &Config) -> PathBuf {
    matches
        .get_one::<PathBuf>("db")
        .cloned()
        .unwrap_or_else(|| config.db_path.clone())
}

fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
    SqliteStore::open(path).with_context(|| format!("failed to open database {}", path.display()))
}

/// Handler for ingest command
fn ingest_handler(matches: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let source = matches
        .get_one::<PathBuf>("source")
        .cloned()
        .unwrap_or_else(|| config.source.clone());
    let db = db_path(matches, config);

    let records = load_records(&source, &ingest_options(matches))
        .with_context(|| format!("failed to ingest {}", source.display()))?;

    let store = open_store(&db)?;
    store
        .replace_all(&records)
        .with_context(|| format!("failed to write records to {}", db.display()))?;

    for section in report_sections(&run_report(&records)) {
        tracing::info!("{}", section.render_plain());
    }

    println!("Ingested {} records into {}", records.len(), db.display());
    Ok(())
}

/// Handler for report command
fn report_handler(matches: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let format = OutputFormat::from_arg(matches.get_one::<String>("output"));

    let records: RecordStore = match matches.get_one::<PathBuf>("source") {
        Some(source) => load_records(source, &ingest_options(matches))
            .with_context(|| format!("failed to read {}", source.display()))?,
        None => open_store(&db_path(matches, config))?.load_all()?,
    };

    let output = match matches.get_one::<String>("by") {
        Some(by) => {
            let field = GroupField::from_str(by).map_err(anyhow::Error::msg)?;
            render_grouping(&records, field, format)?
        }
        None => render_report(&run_report(&records), format)?,
    };
    print!("{}", output);
    Ok(())
}

/// Handler for show command
fn show_handler(matches: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let id = *matches
        .get_one::<u32>("id")
        .context("missing prisoner id")?;
    let format = OutputFormat::from_arg(matches.get_one::<String>("output"));

    let store = open_store(&db_path(matches, config))?;
    let Some(record) = store.get_prisoner(id)? else {
        anyhow::bail!("no prisoner with id {}", id);
    };
    print!("{}", render_record(&record, format)?);
    Ok(())
}

/// Handler for serve command
fn serve_handler(matches: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let credentials = config.require_credentials()?.clone();
    let bind_addr = matches
        .get_one::<SocketAddr>("bind")
        .copied()
        .unwrap_or(config.bind_addr);
    let static_dir = matches
        .get_one::<PathBuf>("static-dir")
        .cloned()
        .unwrap_or_else(|| config.static_dir.clone());
    let db = db_path(matches, config);

    let store = open_store(&db)?;
    let count = store.count()?;
    if count == 0 {
        tracing::warn!(db = %db.display(), "database holds no records; run `prisonstats ingest` first");
    }
    if !static_dir.is_dir() {
        tracing::warn!(static_dir = %static_dir.display(), "static directory does not exist");
    }

    let state = server::AppState::new(store, credentials, static_dir);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", bind_addr))?;
        tracing::info!(bind_addr = %bind_addr, records = count, "prisonstats listening");
        axum::serve(listener, server::build_router(state))
            .await
            .context("server failed")
    })
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();

    // Loaded before the subscriber so RUST_LOG from .env applies
    let config = Config::load();

    let quiet = matches
        .subcommand_matches("serve")
        .is_some_and(|m| m.get_flag("quiet"));
    init_tracing(if quiet { "warn" } else { "info" });

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match matches.subcommand() {
        Some(("ingest", sub)) => ingest_handler(sub, &config),
        Some(("report", sub)) => report_handler(sub, &config),
        Some(("show", sub)) => show_handler(sub, &config),
        Some(("serve", sub)) => serve_handler(sub, &config),
        _ => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        build_command().debug_assert();
    }

    #[test]
    fn test_report_source_conflicts_with_db() {
        let result = build_command().try_get_matches_from([
            "prisonstats",
            "report",
            "--db",
            "a.db",
            "--source",
            "b.pdf",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_show_requires_numeric_id() {
        assert!(build_command()
            .try_get_matches_from(["prisonstats", "show", "abc"])
            .is_err());
        let matches = build_command()
            .try_get_matches_from(["prisonstats", "show", "7"])
            .unwrap();
        let sub = matches.subcommand_matches("show").unwrap();
        assert_eq!(sub.get_one::<u32>("id"), Some(&7));
    }

    #[test]
    fn test_ingest_defaults() {
        let matches = build_command()
            .try_get_matches_from(["prisonstats", "ingest"])
            .unwrap();
        let sub = matches.subcommand_matches("ingest").unwrap();
        assert_eq!(sub.get_one::<usize>("skip-pages"), Some(&1));
        assert!(sub.get_one::<PathBuf>("source").is_none());
    }

    #[test]
    fn test_report_skip_pages() {
        let matches = build_command()
            .try_get_matches_from([
                "prisonstats",
                "report",
                "--source",
                "data.txt",
                "--skip-pages",
                "0",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("report").unwrap();
        assert_eq!(ingest_options(sub).skip_pages, 0);

        let matches = build_command()
            .try_get_matches_from(["prisonstats", "report", "--source", "data.txt"])
            .unwrap();
        let sub = matches.subcommand_matches("report").unwrap();
        assert_eq!(ingest_options(sub).skip_pages, 1);

        assert!(build_command()
            .try_get_matches_from(["prisonstats", "report", "--skip-pages", "0"])
            .is_err());
    }
}
