mod handlers;
pub mod parse;

use clap::Parser;
pub use parse::Cli;
use tracing_subscriber::EnvFilter;

use crate::core::error::AppError;

/// Default log filter when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "warn";

pub fn run() -> Result<(), AppError> {
    let cli = parse::Cli::parse();
    init_tracing(cli.log_level.as_deref())?;
    match cli.cmd {
        parse::Command::Render(a) => handlers::render(a),
        parse::Command::Parse(a) => handlers::parse_table(&a),
        parse::Command::Renderers => {
            handlers::renderers();
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries the rendered output.
fn init_tracing(level: Option<&str>) -> Result<(), AppError> {
    let filter = match level {
        Some(l) => EnvFilter::try_new(l)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
