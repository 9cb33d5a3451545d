use super::CliError;
use super::commands::OracleFlags;
use anyhow::Context;
use epqref_core::domain::BridgeError;
use epqref_core::harness::DumpDeclaration;
use epqref_core::oracle::OracleCommand;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub(super) const ORACLE_CMD_ENV: &str = "EPQREF_ORACLE_CMD";

pub(super) fn resolve_oracle_command(flags: &OracleFlags) -> Result<OracleCommand, CliError> {
    let command_line = match &flags.oracle_cmd {
        Some(value) => value.clone(),
        None => std::env::var(ORACLE_CMD_ENV).map_err(|_| {
            CliError::Bridge(BridgeError::oracle_unavailable(
                "ORACLE.COMMAND_UNSET",
                format!("no oracle command configured; pass --oracle-cmd or set {ORACLE_CMD_ENV}"),
            ))
        })?,
    };

    let mut oracle = OracleCommand::from_command_line(&command_line)?;
    if let Some(secs) = flags.timeout_secs {
        oracle = oracle.with_timeout(Duration::from_secs(secs));
    }
    Ok(oracle)
}

pub(super) fn parse_argument_tokens(tokens: &[String]) -> Result<Vec<(String, String)>, CliError> {
    let mut pairs = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            return Err(CliError::Usage(format!(
                "invalid argument '{token}'; expected key=value"
            )));
        };
        pairs.push((key.to_string(), value.to_string()));
    }
    Ok(pairs)
}

#[derive(Debug, Deserialize)]
pub(super) struct SessionManifest {
    pub(super) declarations: Vec<ManifestDeclaration>,
}

/// One declaration entry: explicit `cases` and/or a `grid` of value
/// dimensions that expands to its cartesian product.
#[derive(Debug, Deserialize)]
pub(super) struct ManifestDeclaration {
    pub(super) id: String,
    pub(super) module: String,
    #[serde(default)]
    pub(super) cases: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub(super) grid: BTreeMap<String, Vec<String>>,
}

pub(super) fn load_session_manifest(path: &Path) -> Result<Vec<DumpDeclaration>, CliError> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read session manifest '{}'", path.display()))?;
    let manifest: SessionManifest = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse session manifest '{}'", path.display()))?;

    let mut declarations = Vec::with_capacity(manifest.declarations.len());
    for entry in manifest.declarations {
        let mut declaration = DumpDeclaration::new(entry.id, entry.module);
        for case in entry.cases {
            declaration = declaration.with_case(case);
        }
        if !entry.grid.is_empty() {
            let dimensions: Vec<(&str, Vec<&str>)> = entry
                .grid
                .iter()
                .map(|(key, values)| {
                    (key.as_str(), values.iter().map(String::as_str).collect())
                })
                .collect();
            let borrowed: Vec<(&str, &[&str])> = dimensions
                .iter()
                .map(|(key, values)| (*key, values.as_slice()))
                .collect();
            declaration = declaration.with_parameter_grid(&borrowed);
        }
        declarations.push(declaration);
    }
    Ok(declarations)
}
