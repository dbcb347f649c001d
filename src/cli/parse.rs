use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

/// Top-level CLI structure.
#[derive(Parser, Debug)]
#[command(
    name = "csv-render",
    version,
    about = "Render CSV-backed charts and tables declared in HTML documents"
)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `csv_render=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render every `data-csv-props` node of a document
    Render(RenderArgs),
    /// Parse delimited text and print the table as JSON
    Parse(ParseArgs),
    /// List the registered renderer names
    Renderers,
}

/// `csv-render render …`
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// HTML file path or http(s) URL
    #[arg(value_name = "DOCUMENT")]
    pub document: String,

    /// Per-source fetch timeout in milliseconds
    #[arg(long, value_name = "N")]
    pub timeout_ms: Option<u64>,

    /// Base URL for relative `csvSrc` values (defaults to the document's location)
    #[arg(long, value_name = "URL")]
    pub base: Option<Url>,

    /// Disable ANSI colors
    #[arg(long)]
    pub no_color: bool,
}

/// `csv-render parse …`
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Input path (use `-` for stdin)
    #[arg(value_name = "FILE", default_value = "-")]
    pub file: PathBuf,

    #[arg(long, value_name = "C")]
    pub field_sep: Option<char>,

    /// One or two characters
    #[arg(long, value_name = "S")]
    pub record_sep: Option<String>,

    #[arg(long, value_name = "C")]
    pub quote: Option<char>,

    /// Drop the first row (only meaningful with `--raw`)
    #[arg(long)]
    pub strip_header: bool,

    /// Trim whitespace around every field
    #[arg(long)]
    pub trim: bool,

    /// Print rows of strings instead of the typed table
    #[arg(long)]
    pub raw: bool,
}
