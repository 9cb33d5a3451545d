use tracing_subscriber::EnvFilter;

mod cli;

fn main() {
    // Diagnostics go to stderr; stdout is reserved for tables and summaries.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(cli::run_from_env());
}
