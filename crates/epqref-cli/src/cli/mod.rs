mod commands;
mod helpers;

use clap::Parser;
use epqref_core::domain::BridgeError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let bridge_error = error.as_bridge_error();
            eprintln!("{}", bridge_error.diagnostic_line());
            eprintln!("{}", bridge_error.fatal_exit_line());
            bridge_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("epqref-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "epqref-rs", about = "EPQ reference-oracle bridge")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Invoke one dump module directly and print its table (no caching)
    Dump(commands::DumpArgs),
    /// Run wire lines from stdin or a file through one batch invocation
    Batch(commands::BatchArgs),
    /// Run a full collect/batch/populate session from a declaration manifest
    Session(commands::SessionArgs),
    /// List registered dump modules and their schemas
    Modules,
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Dump(args) => commands::run_dump_command(args),
        CliCommand::Batch(args) => commands::run_batch_command(args),
        CliCommand::Session(args) => commands::run_session_command(args),
        CliCommand::Modules => commands::run_modules_command(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Bridge(BridgeError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<BridgeError> for CliError {
    fn from(error: BridgeError) -> Self {
        Self::Bridge(error)
    }
}

impl CliError {
    fn as_bridge_error(&self) -> BridgeError {
        match self {
            Self::Usage(message) => BridgeError::request_construction("CLI.USAGE", message.clone()),
            Self::Bridge(error) => error.clone(),
            Self::Internal(error) => BridgeError::io_system("CLI.INTERNAL", format!("{error:#}")),
        }
    }
}
