use super::CliError;
use super::helpers::{load_session_manifest, parse_argument_tokens, resolve_oracle_command};
use anyhow::Context;
use epqref_core::domain::RawTable;
use epqref_core::harness::{OracleSession, render_session_summary};
use epqref_core::modules::builtin_schema_registry;
use epqref_core::oracle::BatchRunner;
use epqref_core::schema::validate_table;
use epqref_core::wire;
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct DumpArgs {
    /// Dump module name (e.g. Element)
    module: String,

    /// key=value arguments for the dump module
    #[arg(value_name = "key=value")]
    arguments: Vec<String>,

    #[command(flatten)]
    oracle: OracleFlags,
}

#[derive(clap::Args)]
pub(super) struct BatchArgs {
    /// Wire-line input file; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    oracle: OracleFlags,
}

#[derive(clap::Args)]
pub(super) struct SessionArgs {
    /// Declaration manifest path
    #[arg(long)]
    manifest: PathBuf,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(flatten)]
    oracle: OracleFlags,
}

#[derive(clap::Args, Default)]
pub(super) struct OracleFlags {
    /// Oracle command line (program plus leading args); EPQREF_ORACLE_CMD
    /// when omitted
    #[arg(long)]
    pub(super) oracle_cmd: Option<String>,

    /// Kill the oracle if it runs longer than this many seconds
    #[arg(long)]
    pub(super) timeout_secs: Option<u64>,
}

pub(super) fn run_dump_command(args: DumpArgs) -> Result<i32, CliError> {
    let oracle = resolve_oracle_command(&args.oracle)?;
    let pairs = parse_argument_tokens(&args.arguments)?;

    tracing::info!(module = %args.module, "invoking oracle in single mode");
    let table = oracle.run_single(&args.module, &pairs)?;

    let registry = builtin_schema_registry();
    if registry.contains(&args.module) {
        let schema = registry.get(&args.module)?;
        let records = validate_table(schema, &table)?;
        tracing::debug!(rows = records.len(), "single-mode table validated");
    } else {
        tracing::warn!(module = %args.module, "no schema registered; printing unvalidated table");
    }

    print_raw_table(&table);
    Ok(0)
}

pub(super) fn run_batch_command(args: BatchArgs) -> Result<i32, CliError> {
    let oracle = resolve_oracle_command(&args.oracle)?;

    let source = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read wire-line input '{}'", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read wire lines from stdin")?;
            buffer
        }
    };

    let mut requests = BTreeSet::new();
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        requests.insert(wire::parse_wire_line(trimmed)?);
    }
    if requests.is_empty() {
        return Err(CliError::Usage(
            "no wire lines supplied; expected one 'module key=value ...' per line".to_string(),
        ));
    }

    tracing::info!(requests = requests.len(), "invoking oracle in batch mode");
    let tables = oracle.run_batch(&requests)?;

    for (request, table) in &tables {
        println!("{}: {} rows", request, table.row_count());
    }
    let mut missing = 0usize;
    for request in &requests {
        if !tables.contains_key(request) {
            println!("{request}: MISSING");
            missing += 1;
        }
    }

    if missing > 0 { Ok(1) } else { Ok(0) }
}

pub(super) fn run_session_command(args: SessionArgs) -> Result<i32, CliError> {
    let oracle = resolve_oracle_command(&args.oracle)?;
    let declarations = load_session_manifest(&args.manifest)?;

    tracing::info!(
        declarations = declarations.len(),
        manifest = %args.manifest.display(),
        "collecting oracle session"
    );
    let mut session = OracleSession::new(builtin_schema_registry());
    let report = session.collect(&declarations, &oracle)?;

    println!("{}", render_session_summary(&report));
    if let Some(path) = &args.report {
        report.write_json(path)?;
        println!("JSON report: {}", path.display());
    }
    Ok(0)
}

pub(super) fn run_modules_command() -> Result<i32, CliError> {
    let registry = builtin_schema_registry();
    for module in registry.module_names() {
        let schema = registry.get(module)?;
        println!("{module}");
        for column in schema.columns {
            let nullable = if column.nullable { " nullable" } else { "" };
            println!("  {} {}{}", column.name, column.kind, nullable);
        }
    }
    Ok(0)
}

fn print_raw_table(table: &RawTable) {
    if table.columns().is_empty() {
        return;
    }
    println!("{}", table.columns().join(","));
    for row in table.rows() {
        println!("{}", row.join(","));
    }
}
