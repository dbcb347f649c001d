//! Centralised error types used across the crate.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::core::color::ColorError;

/// Precise configuration faults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("record separator must be 1 or 2 characters, got {0}")]
    RecordSeparatorLength(usize),
    #[error("`{key}` must be a single character, got {value:?}")]
    NotSingleChar { key: &'static str, value: String },
    #[error("node configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node configuration must be a JSON object")]
    NotAnObject,
    #[error("node configuration missing string field `{0}`")]
    MissingField(&'static str),
}

/// The document itself could not be read. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read document {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid source locator `{locator}`: {source}")]
    InvalidLocator {
        locator: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported source scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fetch timed out after {0:?}")]
    TimedOut(Duration),
    #[error("no such source `{0}`")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("renderer `{name}` not found")]
    NotFound { name: String },
}

/// Faults raised by a renderer while drawing.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("table has no number column to plot")]
    NoNumericColumn,
    #[error("series `{0}` is not a number column")]
    UnknownSeries(String),
    #[error("data set is empty")]
    EmptyData,
    #[error("y range {low}..{high} is empty")]
    InvalidRange { low: f64, high: f64 },
    #[error("option `{key}` must be {want}")]
    BadOption { key: &'static str, want: &'static str },
    #[error("graph too small: need ≥{want_w}×{want_h}, got {got_w}×{got_h}")]
    GraphTooSmall {
        want_w: usize,
        want_h: usize,
        got_w: usize,
        got_h: usize,
    },
    #[error("graph too large: at most {max_w}×{max_h}, got {got_w}×{got_h}")]
    GraphTooLarge {
        max_w: usize,
        max_h: usize,
        got_w: usize,
        got_h: usize,
    },
    #[error("{0}")]
    Color(#[from] ColorError),
    #[error("{0}")]
    Other(String),
}

/// Terminal failure of a single node. Never propagates to siblings.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("draw failed: {0}")]
    Draw(#[from] DrawError),
    #[error("cancelled")]
    Cancelled,
    #[error("renderer panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no renderer package named `{0}`")]
    UnknownPackage(String),
    #[error("loader dropped its readiness signal")]
    SignalDropped,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("resource load failed: {0}")]
    Load(#[from] LoadError),
}

/// Top-level error type bubbled up by public APIs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Discovery(#[from] DiscoveryError),
    #[error("{0}")]
    Dispatch(#[from] DispatchError),
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("bad log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("{failed} of {total} render targets failed")]
    NodesFailed { failed: usize, total: usize },
}
